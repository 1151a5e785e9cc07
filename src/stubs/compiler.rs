use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::core::traits::compiler::{CompileError, Compiler};

/// Compiler double. Writes the source's file name into the artifact, so
/// `ProcessRunnerStub` can tell which unit it is "running".
#[derive(Debug, Clone)]
pub struct CompilerStub {
    result: Result<(), CompileError>,
    overrides: HashMap<String, Result<(), CompileError>>,
    delay: Duration,
}

impl CompilerStub {
    pub fn new(result: Result<(), CompileError>, delay: Duration) -> Self {
        Self {
            result,
            overrides: HashMap::new(),
            delay,
        }
    }

    pub fn fail(mut self, file_name: &str, err: CompileError) -> Self {
        self.overrides.insert(file_name.to_string(), Err(err));
        self
    }
}

#[async_trait::async_trait]
impl Compiler for CompilerStub {
    #[tracing::instrument]
    async fn compile(&self, source: &Path, artifact: &Path) -> Result<(), CompileError> {
        let file_name = source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        tracing::debug!("Start compilation: source={:?}", source);
        tokio::time::sleep(self.delay).await;

        // Compilers may leave partial output behind even when they fail.
        tokio::fs::write(artifact, &file_name)
            .await
            .map_err(|e| CompileError::Internal { msg: e.to_string() })?;

        let result = self.overrides.get(&file_name).unwrap_or(&self.result).clone();
        tracing::debug!("Compilation result: {:?}", result);
        result
    }
}
