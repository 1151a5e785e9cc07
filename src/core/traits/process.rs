use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRequest {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    /// File streamed to the process's stdin. Without it stdin is closed.
    pub stdin: Option<PathBuf>,
    pub budget: Duration,
}

impl ProcessRequest {
    pub fn new(program: impl Into<PathBuf>, budget: Duration) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdin: None,
            budget,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn stdin(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdin = Some(path.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// `status` is `None` when the process was terminated by a signal.
    Completed { status: Option<i32> },
    TimedOut,
    LaunchFailed { msg: String },
    InputUnavailable { msg: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Stdout and stderr interleaved in arrival order.
    pub output: String,
    pub outcome: ProcessOutcome,
}

impl ProcessOutput {
    pub fn completed(status: i32, output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            outcome: ProcessOutcome::Completed {
                status: Some(status),
            },
        }
    }

    pub fn timed_out() -> Self {
        Self {
            output: String::new(),
            outcome: ProcessOutcome::TimedOut,
        }
    }

    pub fn launch_failed(msg: impl Into<String>) -> Self {
        Self {
            output: String::new(),
            outcome: ProcessOutcome::LaunchFailed { msg: msg.into() },
        }
    }

    pub fn input_unavailable(msg: impl Into<String>) -> Self {
        Self {
            output: String::new(),
            outcome: ProcessOutcome::InputUnavailable { msg: msg.into() },
        }
    }

    pub fn success(&self) -> bool {
        matches!(self.outcome, ProcessOutcome::Completed { status: Some(0) })
    }
}

#[mockall::automock]
#[async_trait::async_trait]
pub trait ProcessRunner: std::fmt::Debug + Send + Sync {
    async fn run(&self, request: &ProcessRequest) -> ProcessOutput;
}
