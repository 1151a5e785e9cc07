use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::{
    constants::CXX_FLAGS,
    core::traits::{
        compiler::{CompileError, Compiler},
        process::{ProcessOutcome, ProcessRequest, ProcessRunner},
    },
};

/// `g++` with a fixed flag set: C++17, optimized, warnings enabled.
#[derive(Clone, Debug)]
pub struct GnuCppCompiler {
    gnucpp_path: PathBuf,
    process: Arc<dyn ProcessRunner>,
    budget: Duration,
}

impl GnuCppCompiler {
    pub fn new<T>(gnucpp_path: T, process: Arc<dyn ProcessRunner>, budget: Duration) -> Self
    where
        T: AsRef<Path>,
    {
        Self {
            gnucpp_path: gnucpp_path.as_ref().into(),
            process,
            budget,
        }
    }

    fn request(&self, source: &Path, artifact: &Path) -> ProcessRequest {
        CXX_FLAGS
            .iter()
            .fold(ProcessRequest::new(&self.gnucpp_path, self.budget), |request, flag| {
                request.arg(flag)
            })
            .arg(source)
            .arg("-o")
            .arg(artifact)
    }
}

#[async_trait::async_trait]
impl Compiler for GnuCppCompiler {
    #[tracing::instrument(skip(self))]
    async fn compile(&self, source: &Path, artifact: &Path) -> Result<(), CompileError> {
        let out = self.process.run(&self.request(source, artifact)).await;

        match out.outcome {
            ProcessOutcome::Completed { status: Some(0) } => {}
            ProcessOutcome::Completed { .. } => {
                return Err(CompileError::CompilationFailed { output: out.output });
            }
            ProcessOutcome::TimedOut => {
                return Err(CompileError::TimedOut {
                    budget: self.budget,
                });
            }
            ProcessOutcome::LaunchFailed { msg } | ProcessOutcome::InputUnavailable { msg } => {
                return Err(CompileError::Internal { msg });
            }
        }

        match tokio::fs::try_exists(artifact).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(CompileError::Internal {
                msg: format!("executable was not created at {}", artifact.display()),
            }),
            Err(e) => Err(CompileError::Internal { msg: e.to_string() }),
        }
    }
}
