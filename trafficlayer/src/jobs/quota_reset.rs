//! Monthly quota reset job.

use std::sync::Arc;

use chrono::{Datelike, Local};
use tracing::{debug, info};

use super::{Job, JobError};
use crate::cache::BoxFuture;
use crate::quota::QuotaStore;

/// Day of month on which counters are reset unless configured otherwise.
pub const DEFAULT_RESET_DAY: u32 = 1;

/// Resets every credential's request counter on the configured day of month.
///
/// Meant to be scheduled more often than daily; runs on other days are
/// no-ops, and repeated runs on the reset day are harmless.
pub struct QuotaResetJob {
    store: Arc<dyn QuotaStore>,
    reset_day: u32,
}

impl QuotaResetJob {
    /// Creates the job. `reset_day` is clamped to 1..=31.
    pub fn new(store: Arc<dyn QuotaStore>, reset_day: u32) -> Self {
        Self {
            store,
            reset_day: reset_day.clamp(1, 31),
        }
    }

    pub fn reset_day(&self) -> u32 {
        self.reset_day
    }

    /// Resets counters if `day_of_month` is the reset day.
    ///
    /// Returns the number of credentials reset, or `None` on other days.
    pub async fn run_on(&self, day_of_month: u32) -> Result<Option<usize>, JobError> {
        if day_of_month != self.reset_day {
            debug!(day_of_month, reset_day = self.reset_day, "Not the quota reset day");
            return Ok(None);
        }

        let reset = self.store.reset_all().await?;
        info!(credentials = reset, "Quota counters reset");
        Ok(Some(reset))
    }
}

impl Job for QuotaResetJob {
    fn name(&self) -> &str {
        "quota-reset"
    }

    fn run(&self) -> BoxFuture<'_, Result<String, JobError>> {
        Box::pin(async move {
            let today = Local::now().day();
            Ok(match self.run_on(today).await? {
                Some(count) => format!("reset {} credentials", count),
                None => format!("skipped, resets on day {}", self.reset_day),
            })
        })
    }
}
