/// Native module contains implementations of core traits that run the
/// toolchain and compiled units directly on the host, without any sandbox.
pub mod compiler;
pub mod process;
