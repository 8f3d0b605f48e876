//! Periodic background jobs.
//!
//! # Jobs
//!
//! - [`PrewarmJob`] - Fetches congestion tiles for configured regions
//! - [`QuotaResetJob`] - Zeroes credential request counters on the reset day
//! - [`QuotaSaveJob`] - Writes request counters back to the config file
//!
//! Jobs are driven by the [`Scheduler`], each on its own interval, until a
//! `CancellationToken` fires.
//!
//! # Example
//!
//! ```ignore
//! use trafficlayer::jobs::{PrewarmJob, QuotaResetJob, Scheduler};
//!
//! let mut scheduler = Scheduler::new();
//! scheduler.add(PrewarmJob::new(service, regions, 11), Duration::from_secs(900));
//! scheduler.add(QuotaResetJob::new(store, 1), Duration::from_secs(86_400));
//!
//! let shutdown = CancellationToken::new();
//! scheduler.run(shutdown.clone()).await;
//! ```

mod prewarm;
mod quota_reset;
mod quota_save;
mod scheduler;

pub use prewarm::PrewarmJob;
pub use quota_reset::{QuotaResetJob, DEFAULT_RESET_DAY};
pub use quota_save::QuotaSaveJob;
pub use scheduler::Scheduler;

use thiserror::Error;

use crate::cache::BoxFuture;
use crate::config::ConfigFileError;
use crate::quota::QuotaError;

/// Why a job run did not complete cleanly.
#[derive(Debug, Error)]
pub enum JobError {
    #[error(transparent)]
    Quota(#[from] QuotaError),

    #[error(transparent)]
    Config(#[from] ConfigFileError),

    /// Some units of work failed; the rest completed.
    #[error("Partially failed: {0}")]
    Partial(String),
}

/// A unit of periodic work.
pub trait Job: Send + Sync + 'static {
    /// Short name for logging.
    fn name(&self) -> &str;

    /// Runs the job once, returning a one-line summary.
    fn run(&self) -> BoxFuture<'_, Result<String, JobError>>;
}
