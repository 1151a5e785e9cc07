use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error("compilation failed:\n{output}")]
    CompilationFailed { output: String },
    #[error("compilation exceeded its {budget:?} budget")]
    TimedOut { budget: Duration },
    #[error("compiler error: {msg}")]
    Internal { msg: String },
}

/// Turns one source file into an executable at a caller-chosen path.
#[async_trait::async_trait]
pub trait Compiler: std::fmt::Debug + Send + Sync {
    async fn compile(&self, source: &Path, artifact: &Path) -> Result<(), CompileError>;
}
