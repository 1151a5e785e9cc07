use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::{
    Mutex,
    mpsc::{self, Receiver, Sender},
};
use tokio_stream::{StreamExt, wrappers::ReceiverStream};

use crate::core::{
    domain::{Job, RunResult},
    errors::HarnessError,
    traits::directory::DirectoryRunner,
};

#[derive(Clone, Debug)]
pub struct JobReport {
    /// Position of the job in the submitted list.
    pub index: usize,
    pub job: Job,
    pub outcome: Result<RunResult, HarnessError>,
}

impl JobReport {
    pub fn is_failure(&self) -> bool {
        match &self.outcome {
            Ok(result) => result.is_failure(),
            Err(_) => true,
        }
    }
}

/// Fixed set of workers pulling directory jobs from a bounded FIFO queue.
#[derive(Clone, Debug)]
pub struct WorkerPool {
    workers: usize,
    queue_capacity: usize,
    runner: Arc<dyn DirectoryRunner>,
}

impl WorkerPool {
    pub fn new(workers: usize, queue_capacity: usize, runner: Arc<dyn DirectoryRunner>) -> Self {
        Self {
            workers: workers.max(1),
            queue_capacity: queue_capacity.max(1),
            runner,
        }
    }

    /// Runs every job exactly once and returns one report per job, ordered
    /// by submission. Completion order across workers is not preserved.
    #[tracing::instrument(skip_all, fields(jobs = jobs.len(), workers = self.workers))]
    pub async fn run(&self, jobs: Vec<Job>) -> Vec<JobReport> {
        let total = jobs.len();
        if total == 0 {
            return Vec::new();
        }

        let (job_tx, job_rx) = mpsc::channel::<(usize, Job)>(self.queue_capacity);
        let (report_tx, report_rx) = mpsc::channel::<JobReport>(self.queue_capacity);
        let job_rx = Arc::new(Mutex::new(job_rx));

        let workers: Vec<_> = (0..self.workers.min(total))
            .map(|id| {
                tokio::spawn(work(
                    id,
                    job_rx.clone(),
                    report_tx.clone(),
                    self.runner.clone(),
                ))
            })
            .collect();
        drop(report_tx);

        // Dispatch runs alongside collection so a full queue cannot block
        // the reports that would drain it.
        let dispatcher = tokio::spawn(dispatch(jobs, job_tx));

        let mut reports: Vec<JobReport> = ReceiverStream::new(report_rx).take(total).collect().await;

        if let Err(e) = dispatcher.await {
            tracing::error!("Job dispatcher failed: {}", e);
        }
        for joined in join_all(workers).await {
            if let Err(e) = joined {
                tracing::error!("Worker failed: {}", e);
            }
        }

        if reports.len() != total {
            tracing::error!("Expected {} job reports, received {}", total, reports.len());
        }
        reports.sort_by_key(|report| report.index);
        reports
    }
}

async fn dispatch(jobs: Vec<Job>, job_tx: Sender<(usize, Job)>) {
    for (index, job) in jobs.into_iter().enumerate() {
        tracing::debug!("Queueing job {}: {}", index, job.dir.display());
        if job_tx.send((index, job)).await.is_err() {
            tracing::error!("All workers stopped before job {} was queued", index);
            break;
        }
    }
}

async fn work(
    id: usize,
    jobs: Arc<Mutex<Receiver<(usize, Job)>>>,
    reports: Sender<JobReport>,
    runner: Arc<dyn DirectoryRunner>,
) {
    loop {
        let next = jobs.lock().await.recv().await;
        let Some((index, job)) = next else {
            break;
        };
        tracing::debug!("Worker {} took job {}: {}", id, index, job.dir.display());

        // A panicking job is turned into an error report instead of a
        // missing one.
        let task = {
            let runner = runner.clone();
            let job = job.clone();
            tokio::spawn(async move { runner.run_directory(&job).await })
        };
        let outcome = match task.await {
            Ok(outcome) => outcome,
            Err(e) => Err(HarnessError::Internal {
                msg: format!("job {} did not finish: {}", job.dir.display(), e),
            }),
        };

        if reports.send(JobReport { index, job, outcome }).await.is_err() {
            break;
        }
    }
    tracing::debug!("Worker {} finished", id);
}
