use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::{fs, time::Instant};

use crate::core::{
    comparator,
    domain::{Fixture, LineKind, RunResult, SourceUnit},
    errors::{ExecutionError, HarnessError},
    traits::process::{ProcessOutput, ProcessRequest, ProcessRunner},
};

/// Runs every fixture against the same artifact. A failing fixture is
/// logged and skipped; it never stops the fixtures after it.
#[tracing::instrument(skip_all, fields(unit = %unit.path.display(), fixtures = fixtures.len()))]
pub async fn run_fixtures(
    process: &Arc<dyn ProcessRunner>,
    artifact: &Path,
    unit: &SourceUnit,
    fixtures: &[Fixture],
    budget: Duration,
    result: &mut RunResult,
) {
    for fixture in fixtures {
        result.push(
            LineKind::Info,
            format!("run {} {}", unit.file_name(), fixture.input_name()),
        );
        run_fixture(process, artifact, fixture, budget, result).await;
    }
}

async fn run_fixture(
    process: &Arc<dyn ProcessRunner>,
    artifact: &Path,
    fixture: &Fixture,
    budget: Duration,
    result: &mut RunResult,
) {
    let input_name = fixture.input_name();
    let (output, elapsed_ms) = execute(process, artifact, &fixture.input, budget).await;

    if let Some(err) = ExecutionError::from_output(&output, budget) {
        tracing::warn!("Execution of {} failed: {}", input_name, err);
        result.push_failure(LineKind::Failed, format!("{input_name} ({elapsed_ms}ms)"), err);
        return;
    }

    let Some(expected_path) = &fixture.expected else {
        result.push(
            LineKind::Info,
            format!("{input_name} ({elapsed_ms}ms) not verified"),
        );
        result.push(LineKind::Output, output.output);
        return;
    };

    let expected = match fs::read_to_string(expected_path).await {
        Ok(expected) => expected,
        Err(e) => {
            tracing::warn!("Failed to read {}: {}", expected_path.display(), e);
            result.push_failure(
                LineKind::Failed,
                format!("{input_name} ({elapsed_ms}ms)"),
                HarnessError::filesystem(expected_path, &e),
            );
            return;
        }
    };

    match comparator::first_mismatch(&expected, &output.output) {
        None => {
            result.tests_passed += 1;
            result.push(LineKind::Passed, format!("{input_name} ({elapsed_ms}ms)"));
        }
        Some(mismatch) => {
            tracing::debug!("Output of {} differs: {}", input_name, mismatch);
            result.tests_failed += 1;
            result.push_failure(
                LineKind::Failed,
                format!("{input_name} ({elapsed_ms}ms)"),
                mismatch,
            );
        }
    }
}

/// Runs the artifact once and logs its raw output without scoring it.
#[tracing::instrument(skip_all, fields(input = %input.display()))]
pub async fn run_once(
    process: &Arc<dyn ProcessRunner>,
    artifact: &Path,
    input: &Path,
    budget: Duration,
    result: &mut RunResult,
) -> Result<(), ExecutionError> {
    let (output, elapsed_ms) = execute(process, artifact, input, budget).await;
    let input_name = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string());

    match ExecutionError::from_output(&output, budget) {
        None => {
            result.push(LineKind::Info, format!("{input_name} ({elapsed_ms}ms)"));
            result.push(LineKind::Output, output.output);
            Ok(())
        }
        Some(err) => {
            result.push_failure(
                LineKind::Failed,
                format!("{input_name} ({elapsed_ms}ms)"),
                err.clone(),
            );
            Err(err)
        }
    }
}

async fn execute(
    process: &Arc<dyn ProcessRunner>,
    artifact: &Path,
    input: &Path,
    budget: Duration,
) -> (ProcessOutput, u128) {
    let request = ProcessRequest::new(artifact, budget).stdin(input);

    let start_time = Instant::now();
    let output = process.run(&request).await;
    let elapsed_ms = start_time.elapsed().as_millis();

    tracing::debug!("Execution result: {:?}", output.outcome);
    (output, elapsed_ms)
}
