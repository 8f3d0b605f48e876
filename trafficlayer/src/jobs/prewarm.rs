//! Region pre-warming job.

use std::sync::Arc;

use super::{Job, JobError};
use crate::cache::BoxFuture;
use crate::prewarm::Region;
use crate::provider::TileSource;
use crate::traffic::TrafficService;

/// Warms every configured region in the current time bucket.
pub struct PrewarmJob<S: TileSource + 'static> {
    service: Arc<TrafficService<S>>,
    regions: Vec<Region>,
    zoom: u8,
}

impl<S: TileSource + 'static> PrewarmJob<S> {
    pub fn new(service: Arc<TrafficService<S>>, regions: Vec<Region>, zoom: u8) -> Self {
        Self {
            service,
            regions,
            zoom,
        }
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }
}

impl<S: TileSource + 'static> Job for PrewarmJob<S> {
    fn name(&self) -> &str {
        "prewarm"
    }

    fn run(&self) -> BoxFuture<'_, Result<String, JobError>> {
        Box::pin(async move {
            let report = self.service.prewarm_regions(&self.regions, self.zoom).await;
            if !report.is_complete() {
                return Err(JobError::Partial(format!(
                    "{} of {} regions failed: {}",
                    report.regions_failed.len(),
                    self.regions.len(),
                    report.regions_failed.join(", ")
                )));
            }
            Ok(format!(
                "{} regions, {} tiles ({} fetched, {} cached, {} failed)",
                report.regions_warmed.len(),
                report.stats.tiles_requested,
                report.stats.remote_fetches,
                report.stats.cache_hits,
                report.stats.failed
            ))
        })
    }
}
