use std::io::Write;

use itertools::{Either, Itertools};
use tokio::time::Instant;

use crate::{
    core::{
        domain::{RunResult, Target},
        errors::UnitFailure,
        harness::Harness,
        pipeline::pool::WorkerPool,
    },
    report::Reporter,
};

/// Drives one invocation: inline targets run here in command-line order
/// while the pool works through the directory jobs.
#[derive(Debug)]
pub struct App<R> {
    harness: Harness,
    pool: WorkerPool,
    reporter: R,
}

impl<R: Reporter> App<R> {
    pub fn new(harness: Harness, pool: WorkerPool, reporter: R) -> Self {
        Self {
            harness,
            pool,
            reporter,
        }
    }

    /// Returns `true` when anything failed anywhere in the run.
    #[tracing::instrument(skip_all, fields(targets = targets.len()))]
    pub async fn execute<W: Write>(&self, targets: Vec<Target>, out: &mut W) -> std::io::Result<bool> {
        let start_time = Instant::now();
        let (jobs, inline): (Vec<_>, Vec<_>) = targets.into_iter().partition_map(|target| match target {
            Target::Directory(job) => Either::Left(job),
            other => Either::Right(other),
        });
        let job_count = jobs.len();

        let pool = self.pool.clone();
        let pool_run = tokio::spawn(async move { pool.run(jobs).await });

        let mut failed = false;
        for target in inline {
            let outcome = match &target {
                Target::Unit(unit) => self.harness.run_unit(unit).await,
                Target::UnitWithInput { unit, input } => self.harness.run_one(unit, input).await,
                Target::Directory(_) => continue,
            };
            let result = self.unit_result(outcome, &mut failed);
            writeln!(out, "{}", self.reporter.render(&result))?;
        }

        let reports = match pool_run.await {
            Ok(reports) => reports,
            Err(e) => {
                tracing::error!("Worker pool failed: {}", e);
                failed = true;
                Vec::new()
            }
        };
        if reports.len() != job_count {
            failed = true;
        }
        for report in &reports {
            failed |= report.is_failure();
            writeln!(out, "{}", self.reporter.render_job(report).trim())?;
        }

        if job_count > 0 {
            writeln!(out, "elapsed time {}ms", start_time.elapsed().as_millis())?;
        }
        Ok(failed)
    }

    fn unit_result(&self, outcome: Result<RunResult, UnitFailure>, failed: &mut bool) -> RunResult {
        match outcome {
            Ok(result) => {
                *failed |= result.is_failure();
                result
            }
            Err(failure) => {
                tracing::debug!("Unit failed: {}", failure);
                *failed = true;
                failure.result
            }
        }
    }
}
