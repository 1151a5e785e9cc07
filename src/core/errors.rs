use std::path::PathBuf;
use std::time::Duration;

use crate::core::{
    domain::RunResult,
    traits::{
        compiler::CompileError,
        process::{ProcessOutcome, ProcessOutput},
    },
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecutionError {
    #[error("execution exceeded its {budget:?} budget")]
    TimedOut { budget: Duration },
    #[error("exited with status {status}:\n{output}")]
    NonZeroExit { status: i32, output: String },
    #[error("terminated by a signal:\n{output}")]
    Crashed { output: String },
    #[error("failed to launch: {msg}")]
    LaunchFailed { msg: String },
    #[error("input unavailable: {msg}")]
    InputUnavailable { msg: String },
}

impl ExecutionError {
    /// Classifies a finished process. Returns `None` for a clean exit.
    pub fn from_output(output: &ProcessOutput, budget: Duration) -> Option<Self> {
        match &output.outcome {
            ProcessOutcome::Completed { status: Some(0) } => None,
            ProcessOutcome::Completed {
                status: Some(status),
            } => Some(ExecutionError::NonZeroExit {
                status: *status,
                output: output.output.clone(),
            }),
            ProcessOutcome::Completed { status: None } => Some(ExecutionError::Crashed {
                output: output.output.clone(),
            }),
            ProcessOutcome::TimedOut => Some(ExecutionError::TimedOut { budget }),
            ProcessOutcome::LaunchFailed { msg } => {
                Some(ExecutionError::LaunchFailed { msg: msg.clone() })
            }
            ProcessOutcome::InputUnavailable { msg } => {
                Some(ExecutionError::InputUnavailable { msg: msg.clone() })
            }
        }
    }
}

/// Errors scoped to one unit or one directory job.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HarnessError {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Execution(#[from] ExecutionError),
    #[error("{}: {msg}", path.display())]
    Filesystem { path: PathBuf, msg: String },
    #[error("{} should be an existing directory", path.display())]
    NotADirectory { path: PathBuf },
    #[error("internal error: {msg}")]
    Internal { msg: String },
}

impl HarnessError {
    pub fn filesystem(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        HarnessError::Filesystem {
            path: path.into(),
            msg: err.to_string(),
        }
    }
}

/// A unit run that stopped early, together with everything it logged so far.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{error}")]
pub struct UnitFailure {
    pub result: RunResult,
    pub error: HarnessError,
}

impl UnitFailure {
    pub fn new(result: RunResult, error: impl Into<HarnessError>) -> Self {
        Self {
            result,
            error: error.into(),
        }
    }
}
