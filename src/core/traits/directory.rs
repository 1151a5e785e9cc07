use crate::core::{
    domain::{Job, RunResult},
    errors::HarnessError,
};

/// What a pool worker does with one directory job.
#[mockall::automock]
#[async_trait::async_trait]
pub trait DirectoryRunner: std::fmt::Debug + Send + Sync {
    async fn run_directory(&self, job: &Job) -> Result<RunResult, HarnessError>;
}
