use std::sync::Arc;

use crate::core::{
    artifact::{ArtifactStore, TempArtifact},
    domain::SourceUnit,
    traits::compiler::{CompileError, Compiler},
};

/// Compiles `unit` into a freshly allocated artifact. The artifact guard is
/// dropped, and the file removed, when compilation fails.
#[tracing::instrument(skip_all, fields(unit = %unit.path.display()))]
pub async fn compile_unit(
    compiler: &Arc<dyn Compiler>,
    artifacts: &ArtifactStore,
    unit: &SourceUnit,
) -> Result<TempArtifact, CompileError> {
    let artifact = artifacts.allocate();

    tracing::debug!("Start compiling into {}", artifact.path().display());
    let compilation_result = compiler.compile(&unit.path, artifact.path()).await;
    tracing::debug!("Compilation result: {:?}", compilation_result);

    compilation_result.map(|()| artifact)
}
