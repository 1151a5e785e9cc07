//! Test doubles for the process and compiler seams.
pub mod compiler;
pub mod process;
