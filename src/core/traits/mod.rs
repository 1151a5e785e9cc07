pub mod compiler;
pub mod directory;
pub mod process;
