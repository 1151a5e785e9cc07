use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::fs;

use crate::{
    constants::SOURCE_SUFFIX,
    core::{
        artifact::{ArtifactStore, TempArtifact},
        domain::{Job, LineKind, LogLine, RunResult, SourceUnit},
        errors::{HarnessError, UnitFailure},
        pipeline::{
            compiling::compile_unit,
            running::{run_fixtures, run_once},
            scanning::{discover_fixtures, discover_units},
        },
        traits::{compiler::Compiler, directory::DirectoryRunner, process::ProcessRunner},
    },
};

/// Compiles units and checks them against the fixtures next to them.
#[derive(Clone, Debug)]
pub struct Harness {
    compiler: Arc<dyn Compiler>,
    process: Arc<dyn ProcessRunner>,
    artifacts: ArtifactStore,
    execute_budget: Duration,
}

impl Harness {
    pub fn new(
        compiler: Arc<dyn Compiler>,
        process: Arc<dyn ProcessRunner>,
        artifacts: ArtifactStore,
        execute_budget: Duration,
    ) -> Self {
        Self {
            compiler,
            process,
            artifacts,
            execute_budget,
        }
    }

    /// Compiles `unit` once and runs it against every `*.in` fixture in its
    /// directory. On a compile error no fixture is attempted. The artifact
    /// is removed before this returns, whatever the outcome.
    #[tracing::instrument(skip(self), fields(unit = %unit.path.display()))]
    pub async fn run_unit(&self, unit: &SourceUnit) -> Result<RunResult, UnitFailure> {
        let (artifact, mut result) = self.compile(unit).await?;

        let fixtures = match discover_fixtures(unit.dir()).await {
            Ok(fixtures) => fixtures,
            Err(e) => {
                let err = HarnessError::filesystem(unit.dir(), &e);
                result.push_failure(LineKind::Failed, "fixture discovery", err.clone());
                return Err(UnitFailure::new(result, err));
            }
        };

        run_fixtures(
            &self.process,
            artifact.path(),
            unit,
            &fixtures,
            self.execute_budget,
            &mut result,
        )
        .await;

        tracing::debug!(
            "Unit finished: {} passed, {} failed",
            result.tests_passed,
            result.tests_failed
        );
        Ok(result)
    }

    /// Compiles `unit` and runs it once against `input`, keeping the raw
    /// output instead of scoring it.
    #[tracing::instrument(skip(self), fields(unit = %unit.path.display()))]
    pub async fn run_one(&self, unit: &SourceUnit, input: &Path) -> Result<RunResult, UnitFailure> {
        let (artifact, mut result) = self.compile(unit).await?;

        match run_once(
            &self.process,
            artifact.path(),
            input,
            self.execute_budget,
            &mut result,
        )
        .await
        {
            Ok(()) => Ok(result),
            Err(err) => Err(UnitFailure::new(result, err)),
        }
    }

    /// Starts a unit's log with its compilation. On failure the log holds
    /// the compile-failed line and no artifact is left behind.
    async fn compile(&self, unit: &SourceUnit) -> Result<(TempArtifact, RunResult), UnitFailure> {
        let mut result = RunResult::default();

        match compile_unit(&self.compiler, &self.artifacts, unit).await {
            Ok(artifact) => {
                result.compiled = true;
                result.push(LineKind::Info, format!("{} compiled", unit.path.display()));
                Ok((artifact, result))
            }
            Err(err) => {
                result.push_failure(
                    LineKind::CompileFailed,
                    unit.path.display().to_string(),
                    err.clone(),
                );
                Err(UnitFailure::new(result, err))
            }
        }
    }

    /// Runs every source unit directly inside `job.dir` and keeps one
    /// summary line per unit. One unit failing never stops its siblings.
    #[tracing::instrument(skip(self), fields(dir = %job.dir.display()))]
    pub async fn run_directory(&self, job: &Job) -> Result<RunResult, HarnessError> {
        let metadata = fs::metadata(&job.dir)
            .await
            .map_err(|e| HarnessError::filesystem(&job.dir, &e))?;
        if !metadata.is_dir() {
            return Err(HarnessError::NotADirectory {
                path: job.dir.clone(),
            });
        }

        let units = discover_units(&job.dir)
            .await
            .map_err(|e| HarnessError::filesystem(&job.dir, &e))?;

        let mut result = RunResult {
            compiled: true,
            ..Default::default()
        };
        if units.is_empty() {
            result.push(
                LineKind::Info,
                format!("{}: no {} files", job.dir.display(), SOURCE_SUFFIX),
            );
            return Ok(result);
        }

        for unit in &units {
            let label = if units.len() == 1 {
                job.dir.display().to_string()
            } else {
                unit.file_name()
            };

            match self.run_unit(unit).await {
                Ok(unit_result) => result.lines.push(summary_line(label, &unit_result)),
                Err(UnitFailure { error, .. }) => {
                    tracing::warn!("Unit {} failed: {}", unit.path.display(), error);
                    let kind = match error {
                        HarnessError::Compile(_) => {
                            result.compiled = false;
                            LineKind::CompileFailed
                        }
                        _ => LineKind::Failed,
                    };
                    result.push_failure(kind, label, error);
                }
            }
        }

        Ok(result)
    }
}

fn summary_line(label: String, unit: &RunResult) -> LogLine {
    let kind = if unit.is_failure() {
        LineKind::Failed
    } else {
        LineKind::Passed
    };

    if unit.tests_passed == 0 && unit.tests_failed == 0 {
        return LogLine::new(kind, label);
    }
    LogLine::new(
        kind,
        format!(
            "{label} Tests {} passed, {} failed",
            unit.tests_passed, unit.tests_failed
        ),
    )
}

#[async_trait::async_trait]
impl DirectoryRunner for Harness {
    async fn run_directory(&self, job: &Job) -> Result<RunResult, HarnessError> {
        Harness::run_directory(self, job).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        domain::Failure,
        errors::ExecutionError,
        traits::{compiler::CompileError, process::ProcessOutput},
    };
    use crate::stubs::{compiler::CompilerStub, process::ProcessRunnerStub};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    const BUDGET: Duration = Duration::from_secs(5);

    struct Workspace {
        _root: tempfile::TempDir,
        tasks: PathBuf,
        artifacts: ArtifactStore,
    }

    impl Workspace {
        fn new() -> Self {
            let root = tempfile::tempdir().unwrap();
            let tasks = root.path().join("tasks");
            std::fs::create_dir(&tasks).unwrap();
            let artifacts = ArtifactStore::new(root.path().join("artifacts")).unwrap();
            Self {
                _root: root,
                tasks,
                artifacts,
            }
        }

        fn file(&self, name: &str, contents: &str) -> PathBuf {
            let path = self.tasks.join(name);
            std::fs::write(&path, contents).unwrap();
            path
        }

        fn harness(&self, compiler: CompilerStub, process: Arc<ProcessRunnerStub>) -> Harness {
            Harness::new(Arc::new(compiler), process, self.artifacts.clone(), BUDGET)
        }

        fn leftover_artifacts(&self) -> usize {
            std::fs::read_dir(self.artifacts.dir()).unwrap().count()
        }
    }

    fn ok_compiler() -> CompilerStub {
        CompilerStub::new(Ok(()), Duration::ZERO)
    }

    #[tokio::test]
    async fn test_compile_failure_short_circuits() {
        let ws = Workspace::new();
        let source = ws.file("a.cpp", "");
        ws.file("1.in", "");
        ws.file("1.out", "");
        let process = Arc::new(ProcessRunnerStub::default());
        let harness = ws.harness(
            CompilerStub::new(
                Err(CompileError::CompilationFailed {
                    output: "a.cpp:1: error".to_string(),
                }),
                Duration::ZERO,
            ),
            process.clone(),
        );

        let failure = harness.run_unit(&SourceUnit::new(&source)).await.unwrap_err();

        assert!(!failure.result.compiled);
        assert_eq!(failure.result.tests_passed + failure.result.tests_failed, 0);
        assert!(failure.result.compile_failure().is_some());
        assert!(matches!(failure.error, HarnessError::Compile(_)));
        assert!(process.calls().is_empty());
        assert_eq!(ws.leftover_artifacts(), 0);
    }

    #[tokio::test]
    async fn test_runs_all_fixtures_and_cleans_up() {
        let ws = Workspace::new();
        let source = ws.file("a.cpp", "");
        for case in ["1", "2", "3"] {
            ws.file(&format!("{case}.in"), case);
            ws.file(&format!("{case}.out"), "ok\n");
        }
        let process = Arc::new(
            ProcessRunnerStub::new(ProcessOutput::completed(0, "ok"))
                .respond("2.in", ProcessOutput::timed_out()),
        );
        let harness = ws.harness(ok_compiler(), process.clone());

        let result = harness.run_unit(&SourceUnit::new(&source)).await.unwrap();

        assert!(result.compiled);
        assert_eq!(result.tests_passed, 2);
        assert_eq!(result.tests_failed, 0);
        assert_eq!(process.calls().len(), 3);
        assert!(result.lines.iter().any(|line| matches!(
            line.failure,
            Some(Failure::Execution(ExecutionError::TimedOut { .. }))
        )));
        assert_eq!(ws.leftover_artifacts(), 0);
    }

    #[tokio::test]
    async fn test_every_fixture_reuses_one_artifact() {
        let ws = Workspace::new();
        let source = ws.file("a.cpp", "");
        ws.file("1.in", "");
        ws.file("2.in", "");
        let process = Arc::new(ProcessRunnerStub::default());
        let harness = ws.harness(ok_compiler(), process.clone());

        harness.run_unit(&SourceUnit::new(&source)).await.unwrap();

        let calls = process.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].program, calls[1].program);
        assert!(calls[0].program.starts_with(ws.artifacts.dir()));
        assert_eq!(calls[0].budget, BUDGET);
    }

    #[tokio::test]
    async fn test_run_one_reports_raw_output() {
        let ws = Workspace::new();
        let source = ws.file("a.cpp", "");
        let input = ws.file("custom.in", "3");
        ws.file("1.in", "");
        let process = Arc::new(
            ProcessRunnerStub::default().respond("custom.in", ProcessOutput::completed(0, "9\n")),
        );
        let harness = ws.harness(ok_compiler(), process.clone());

        let result = harness
            .run_one(&SourceUnit::new(&source), &input)
            .await
            .unwrap();

        assert_eq!(process.calls().len(), 1);
        assert_eq!(result.lines.last().unwrap().kind, LineKind::Output);
        assert_eq!(result.lines.last().unwrap().text, "9\n");
        assert_eq!(ws.leftover_artifacts(), 0);
    }

    #[tokio::test]
    async fn test_run_one_execution_failure_is_returned() {
        let ws = Workspace::new();
        let source = ws.file("a.cpp", "");
        let input = ws.file("custom.in", "");
        let process = Arc::new(ProcessRunnerStub::new(ProcessOutput::completed(1, "")));
        let harness = ws.harness(ok_compiler(), process);

        let failure = harness
            .run_one(&SourceUnit::new(&source), &input)
            .await
            .unwrap_err();

        assert!(failure.result.compiled);
        assert!(matches!(
            failure.error,
            HarnessError::Execution(ExecutionError::NonZeroExit { status: 1, .. })
        ));
        assert_eq!(ws.leftover_artifacts(), 0);
    }

    #[tokio::test]
    async fn test_run_one_compile_failure_runs_nothing() {
        let ws = Workspace::new();
        let source = ws.file("a.cpp", "");
        let input = ws.file("custom.in", "");
        let process = Arc::new(ProcessRunnerStub::default());
        let harness = ws.harness(
            CompilerStub::new(
                Err(CompileError::TimedOut { budget: BUDGET }),
                Duration::ZERO,
            ),
            process.clone(),
        );

        let failure = harness
            .run_one(&SourceUnit::new(&source), &input)
            .await
            .unwrap_err();

        assert!(!failure.result.compiled);
        assert_eq!(failure.result.lines.len(), 1);
        assert_eq!(failure.result.lines[0].kind, LineKind::CompileFailed);
        assert_eq!(failure.result.lines[0].text, source.display().to_string());
        assert_eq!(
            failure.error,
            HarnessError::Compile(CompileError::TimedOut { budget: BUDGET })
        );
        assert!(process.calls().is_empty());
        assert_eq!(ws.leftover_artifacts(), 0);
    }

    #[tokio::test]
    async fn test_directory_reports_each_unit() {
        let ws = Workspace::new();
        ws.file("a.cpp", "");
        ws.file("b.cpp", "");
        for case in ["1", "2"] {
            ws.file(&format!("{case}.in"), "");
            ws.file(&format!("{case}.out"), "right");
        }
        let process = Arc::new(
            ProcessRunnerStub::new(ProcessOutput::completed(0, "right"))
                .respond_for("b.cpp", "1.in", ProcessOutput::completed(0, "wrong"))
                .respond_for("b.cpp", "2.in", ProcessOutput::completed(0, "wrong")),
        );
        let harness = ws.harness(ok_compiler(), process);

        let result = harness.run_directory(&Job::new(&ws.tasks)).await.unwrap();

        let summary: Vec<_> = result
            .lines
            .iter()
            .map(|line| (line.kind, line.text.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (LineKind::Passed, "a.cpp Tests 2 passed, 0 failed"),
                (LineKind::Failed, "b.cpp Tests 0 passed, 2 failed"),
            ]
        );
        assert!(result.is_failure());
        assert_eq!(ws.leftover_artifacts(), 0);
    }

    #[tokio::test]
    async fn test_single_unit_directory_is_labelled_by_directory() {
        let ws = Workspace::new();
        ws.file("a.cpp", "");
        let harness = ws.harness(ok_compiler(), Arc::new(ProcessRunnerStub::default()));

        let result = harness.run_directory(&Job::new(&ws.tasks)).await.unwrap();

        assert_eq!(result.lines.len(), 1);
        assert_eq!(result.lines[0].kind, LineKind::Passed);
        assert_eq!(result.lines[0].text, ws.tasks.display().to_string());
        assert!(!result.is_failure());
    }

    #[tokio::test]
    async fn test_compile_failure_does_not_stop_siblings() {
        let ws = Workspace::new();
        ws.file("a.cpp", "");
        ws.file("b.cpp", "");
        ws.file("1.in", "");
        ws.file("1.out", "");
        let process = Arc::new(ProcessRunnerStub::default());
        let harness = ws.harness(
            ok_compiler().fail(
                "a.cpp",
                CompileError::CompilationFailed {
                    output: "error".to_string(),
                },
            ),
            process.clone(),
        );

        let result = harness.run_directory(&Job::new(&ws.tasks)).await.unwrap();

        assert_eq!(result.lines.len(), 2);
        assert_eq!(result.lines[0].kind, LineKind::CompileFailed);
        assert!(matches!(result.lines[0].failure, Some(Failure::Compile(_))));
        assert_eq!(result.lines[1].kind, LineKind::Passed);
        assert_eq!(result.lines[1].text, "b.cpp Tests 1 passed, 0 failed");
        assert!(!result.compiled);
        assert_eq!(process.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_directory_must_exist() {
        let ws = Workspace::new();
        let harness = ws.harness(ok_compiler(), Arc::new(ProcessRunnerStub::default()));

        let missing = harness
            .run_directory(&Job::new(ws.tasks.join("missing")))
            .await;
        assert!(matches!(missing, Err(HarnessError::Filesystem { .. })));

        let file = ws.file("a.cpp", "");
        let not_dir = harness.run_directory(&Job::new(file)).await;
        assert!(matches!(not_dir, Err(HarnessError::NotADirectory { .. })));
    }
}
