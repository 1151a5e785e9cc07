pub mod compiling;
pub mod pool;
pub mod running;
pub mod scanning;
