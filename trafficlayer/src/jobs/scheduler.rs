//! Interval scheduler for [`Job`]s.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::Job;

/// Shortest interval a job may be scheduled at.
const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Runs each registered job on its own fixed interval.
///
/// The first run of every job happens immediately. Runs of the same job
/// never overlap; a run that outlasts its interval skips missed ticks.
#[derive(Default)]
pub struct Scheduler {
    jobs: Vec<(Arc<dyn Job>, Duration)>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `job` to run every `every`. Intervals below one second are
    /// raised to one second.
    pub fn add(&mut self, job: impl Job, every: Duration) -> &mut Self {
        self.jobs.push((Arc::new(job), every.max(MIN_INTERVAL)));
        self
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Runs all jobs until `shutdown` is cancelled.
    ///
    /// A run in progress when shutdown fires is allowed to finish.
    pub async fn run(self, shutdown: CancellationToken) {
        info!(jobs = self.jobs.len(), "Scheduler started");

        let loops = self.jobs.into_iter().map(|(job, every)| {
            let shutdown = shutdown.clone();
            tokio::spawn(run_job(job, every, shutdown))
        });

        for result in join_all(loops).await {
            if let Err(e) = result {
                warn!(error = %e, "Job loop aborted");
            }
        }

        info!("Scheduler stopped");
    }
}

async fn run_job(job: Arc<dyn Job>, every: Duration, shutdown: CancellationToken) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => break,

            _ = ticker.tick() => {
                let start = Instant::now();
                match job.run().await {
                    Ok(summary) => info!(
                        job = job.name(),
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        summary = %summary,
                        "Job finished"
                    ),
                    Err(e) => warn!(
                        job = job.name(),
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        error = %e,
                        "Job failed"
                    ),
                }
            }
        }
    }
}
