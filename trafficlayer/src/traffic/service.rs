//! Congestion fetch orchestration and route adjustment.
//!
//! # Flow
//!
//! ```text
//! bbox ─► tile_range ─► batch_tile_range ─┬─► select_provider(batch size)
//!                                         ├─► one task per tile ─► TileFetcher
//!                                         └─► record_usage(consumed)
//!                                                       │
//! route ─► simplify_route ─► CongestionOverlay ◄────────┘
//!                                 │
//!                                 └─► + turn delays + buffer ─► AdjustedRoute
//! ```
//!
//! Batches run one after another. Within a batch every tile is fetched on
//! its own task and the batch is joined before its quota usage is recorded.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::error::TrafficError;
use super::feature::CongestionFeature;
use super::fetcher::{RequestedTiles, TileFetcher, DEFAULT_TILE_TIMEOUT};
use super::stats::FetchStats;
use crate::cache::{TileStoreClient, TimeBucket};
use crate::coord::{batch_tile_range, tile_range, BoundingBox, TileBatch, TileEnvelope, TileRange};
use crate::geo::simplify_route;
use crate::prewarm::{PrewarmReport, Region};
use crate::provider::TileSource;
use crate::quota::{ProviderCredential, QuotaSelector};
use crate::route::{
    route_turn_delay, AdjustedRoute, CongestionOverlay, Route, TrafficBreakdown,
    DEFAULT_BUFFER_SECS,
};

/// Default zoom for congestion tiles.
pub const DEFAULT_TRAFFIC_ZOOM: u8 = 11;

/// Default maximum tiles per axis in one batch.
pub const DEFAULT_BATCH_SIZE: u32 = 5000;

/// Default pre-simplification grid in degrees.
pub const DEFAULT_SIMPLIFY_GRID: f64 = 0.00001;

/// Default Douglas-Peucker tolerance in degrees.
pub const DEFAULT_SIMPLIFY_TOLERANCE: f64 = 0.0001;

/// Tunables for the traffic service.
#[derive(Debug, Clone, PartialEq)]
pub struct TrafficSettings {
    pub zoom: u8,
    pub batch_size: u32,
    pub envelope: TileEnvelope,
    pub tile_timeout: Duration,
    pub buffer_secs: f64,
    pub simplify_grid: f64,
    pub simplify_tolerance: f64,
}

impl Default for TrafficSettings {
    fn default() -> Self {
        Self {
            zoom: DEFAULT_TRAFFIC_ZOOM,
            batch_size: DEFAULT_BATCH_SIZE,
            envelope: TileEnvelope::default(),
            tile_timeout: DEFAULT_TILE_TIMEOUT,
            buffer_secs: DEFAULT_BUFFER_SECS,
            simplify_grid: DEFAULT_SIMPLIFY_GRID,
            simplify_tolerance: DEFAULT_SIMPLIFY_TOLERANCE,
        }
    }
}

/// Congestion features gathered for one bounding box.
#[derive(Debug, Clone)]
pub struct CongestionSet {
    /// In completion order
    pub features: Vec<CongestionFeature>,
    pub stats: FetchStats,
    /// The tile range fetched, after clamping
    pub range: TileRange,
}

/// What a single tile task ended with.
enum TileOutcome {
    Duplicate,
    Loaded {
        remote: bool,
        stored: bool,
        features: usize,
    },
    Failed { billed: bool },
}

/// Entry point for congestion fetching, route adjustment and pre-warming.
pub struct TrafficService<S: TileSource + 'static> {
    fetcher: Arc<TileFetcher<S>>,
    selector: QuotaSelector,
    settings: TrafficSettings,
}

impl<S: TileSource + 'static> TrafficService<S> {
    /// Creates a service.
    ///
    /// # Arguments
    ///
    /// * `source` - Remote congestion tile source
    /// * `store` - Time-bucketed payload store
    /// * `selector` - Credential selection over the shared quota store
    /// * `settings` - Zoom, batching, timeouts and simplification tunables
    pub fn new(
        source: Arc<S>,
        store: TileStoreClient,
        selector: QuotaSelector,
        settings: TrafficSettings,
    ) -> Self {
        let fetcher = TileFetcher::new(source, store, settings.tile_timeout);
        Self {
            fetcher: Arc::new(fetcher),
            selector,
            settings,
        }
    }

    pub fn settings(&self) -> &TrafficSettings {
        &self.settings
    }

    pub fn fetcher(&self) -> &Arc<TileFetcher<S>> {
        &self.fetcher
    }

    pub fn selector(&self) -> &QuotaSelector {
        &self.selector
    }

    /// Fetches congestion for `bbox` in the current time bucket.
    pub async fn fetch_congestion(
        &self,
        bbox: &BoundingBox,
        zoom: u8,
    ) -> Result<CongestionSet, TrafficError> {
        self.fetch_congestion_at(bbox, zoom, TimeBucket::now()).await
    }

    /// Fetches congestion for `bbox` in `bucket`.
    ///
    /// # Errors
    ///
    /// * `TrafficError::InvalidGeometry` for a non-finite box
    /// * `TrafficError::Coord` for an unsupported zoom
    /// * `TrafficError::NoQuotaAvailable` when a batch finds no credential;
    ///   batches completed before it keep their recorded usage
    pub async fn fetch_congestion_at(
        &self,
        bbox: &BoundingBox,
        zoom: u8,
        bucket: TimeBucket,
    ) -> Result<CongestionSet, TrafficError> {
        let bbox = BoundingBox::new(bbox.north, bbox.south, bbox.east, bbox.west)?;
        let range = tile_range(&bbox, zoom, self.settings.envelope)?;
        if let Some(clamped) = &range.clamped {
            debug!(
                north = clamped.north,
                south = clamped.south,
                east = clamped.east,
                west = clamped.west,
                "Bounding box clamped to tile envelope"
            );
        }

        let batches = batch_tile_range(&range, self.settings.batch_size);
        let requested = Arc::new(RequestedTiles::new());
        let features = Arc::new(Mutex::new(Vec::new()));
        let mut stats = FetchStats {
            tiles_requested: range.tile_count(),
            ..Default::default()
        };

        for batch in &batches {
            let credential = self
                .selector
                .select_provider(batch.tile_count() as u64)
                .await?;

            let batch_stats = self
                .run_batch(batch, &credential, &requested, &features, bucket)
                .await;

            let used = batch_stats.quota_used() as u64;
            if let Err(e) = self.selector.record_usage(&credential.token, used).await {
                warn!(
                    provider = %credential.provider,
                    token = %credential.masked_token(),
                    used,
                    error = %e,
                    "Failed to record quota usage"
                );
            }
            stats += batch_stats;
        }

        let features = std::mem::take(&mut *features.lock());
        stats.features = features.len();

        info!(
            zoom,
            bucket = %bucket,
            tiles = stats.tiles_requested,
            cache_hits = stats.cache_hits,
            remote = stats.remote_fetches,
            failed = stats.failed,
            features = stats.features,
            batches = stats.batches,
            "Congestion fetch complete"
        );

        Ok(CongestionSet {
            features,
            stats,
            range,
        })
    }

    async fn run_batch(
        &self,
        batch: &TileBatch,
        credential: &ProviderCredential,
        requested: &Arc<RequestedTiles>,
        features: &Arc<Mutex<Vec<CongestionFeature>>>,
        bucket: TimeBucket,
    ) -> FetchStats {
        let handles: Vec<_> = batch
            .tiles()
            .map(|tile| {
                let fetcher = Arc::clone(&self.fetcher);
                let requested = Arc::clone(requested);
                let features = Arc::clone(features);
                let credential = credential.clone();

                tokio::spawn(async move {
                    match fetcher
                        .fetch_tile_once(&requested, &credential, tile, &bucket)
                        .await
                    {
                        None => TileOutcome::Duplicate,
                        Some(Ok(fetch)) => {
                            let count = fetch.features.len();
                            if count > 0 {
                                features.lock().extend(fetch.features);
                            }
                            TileOutcome::Loaded {
                                remote: fetch.was_remote_fetch,
                                stored: fetch.stored,
                                features: count,
                            }
                        }
                        Some(Err(e)) => {
                            warn!(
                                tile = %e.tile(),
                                provider = %credential.provider,
                                error = %e,
                                "Tile skipped"
                            );
                            TileOutcome::Failed {
                                billed: e.consumed_quota(),
                            }
                        }
                    }
                })
            })
            .collect();

        let mut stats = FetchStats {
            batches: 1,
            ..Default::default()
        };
        for result in join_all(handles).await {
            match result {
                Ok(TileOutcome::Duplicate) => stats.duplicates += 1,
                Ok(TileOutcome::Loaded {
                    remote,
                    stored,
                    features,
                }) => {
                    if !stored {
                        stats.store_failures += 1;
                    }
                    if remote {
                        stats.remote_fetches += 1;
                    } else {
                        stats.cache_hits += 1;
                    }
                    stats.features += features;
                }
                Ok(TileOutcome::Failed { billed }) => {
                    stats.failed += 1;
                    if billed {
                        stats.remote_fetches += 1;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Tile task aborted");
                    stats.failed += 1;
                }
            }
        }

        debug!(
            provider = %credential.provider,
            tiles = batch.tile_count(),
            remote = stats.remote_fetches,
            cache_hits = stats.cache_hits,
            failed = stats.failed,
            store_failures = stats.store_failures,
            "Batch complete"
        );
        stats
    }

    /// Sets `traffic_duration` on `route` from congestion within `bbox`.
    ///
    /// When no credential has quota the route is returned unadjusted
    /// (`traffic_duration == duration`, `breakdown.applied == false`).
    ///
    /// # Errors
    ///
    /// * `TrafficError::InvalidGeometry` for an empty or non-finite route
    ///   geometry or an invalid box, before anything is fetched
    /// * `TrafficError::Coord` for an unsupported zoom
    /// * `TrafficError::Quota` when the quota store fails
    pub async fn adjust_route_time(
        &self,
        route: Route,
        bbox: &BoundingBox,
        zoom: u8,
    ) -> Result<AdjustedRoute, TrafficError> {
        self.adjust_route_time_at(route, bbox, zoom, TimeBucket::now())
            .await
    }

    /// Like [`adjust_route_time`](Self::adjust_route_time) for a given bucket.
    pub async fn adjust_route_time_at(
        &self,
        route: Route,
        bbox: &BoundingBox,
        zoom: u8,
        bucket: TimeBucket,
    ) -> Result<AdjustedRoute, TrafficError> {
        validate_geometry(&route)?;

        match self.fetch_congestion_at(bbox, zoom, bucket).await {
            Ok(set) => Ok(self.apply_congestion(route, &set.features, set.stats)),
            Err(TrafficError::NoQuotaAvailable { required }) => {
                warn!(required, "No quota for congestion tiles, returning unadjusted route");
                Ok(unadjusted(route))
            }
            Err(e) => Err(e),
        }
    }

    /// Composes the adjusted duration from already fetched `features`.
    pub fn apply_congestion(
        &self,
        mut route: Route,
        features: &[CongestionFeature],
        stats: FetchStats,
    ) -> AdjustedRoute {
        let simplified = simplify_route(
            &route.geometry.coordinates,
            self.settings.simplify_grid,
            self.settings.simplify_tolerance,
        );
        let overlay = CongestionOverlay::new(features).evaluate(&simplified);
        let turn_delay = route_turn_delay(&route);
        let buffer = self.settings.buffer_secs;

        let traffic_duration = route.duration + overlay.congestion_delay + turn_delay + buffer;
        debug!(
            points = route.geometry.coordinates.len(),
            simplified = simplified.len(),
            congested = overlay.segments_congested,
            congestion_delay = overlay.congestion_delay,
            turn_delay,
            traffic_duration,
            "Route adjusted"
        );

        let breakdown = TrafficBreakdown {
            applied: true,
            base_duration: route.duration,
            congestion_delay: overlay.congestion_delay,
            turn_delay,
            buffer,
            segments_evaluated: overlay.segments_evaluated,
            segments_congested: overlay.segments_congested,
            stats,
        };
        route.traffic_duration = Some(traffic_duration);

        AdjustedRoute { route, breakdown }
    }

    /// Fills the store for `bbox` in the current bucket.
    ///
    /// # Errors
    ///
    /// Unlike route adjustment, `NoQuotaAvailable` is returned as an error.
    pub async fn prewarm(&self, bbox: &BoundingBox, zoom: u8) -> Result<FetchStats, TrafficError> {
        let set = self.fetch_congestion(bbox, zoom).await?;
        Ok(set.stats)
    }

    /// Warms `regions` one after another.
    ///
    /// A failing region is logged and skipped.
    pub async fn prewarm_regions(&self, regions: &[Region], zoom: u8) -> PrewarmReport {
        let mut report = PrewarmReport::default();

        for region in regions {
            match self.prewarm(&region.bbox, zoom).await {
                Ok(stats) => {
                    info!(
                        region = %region.name,
                        tiles = stats.tiles_requested,
                        remote = stats.remote_fetches,
                        cache_hits = stats.cache_hits,
                        "Region warmed"
                    );
                    report.stats += stats;
                    report.regions_warmed.push(region.name.clone());
                }
                Err(e) => {
                    warn!(region = %region.name, error = %e, "Region prewarm failed");
                    report.regions_failed.push(region.name.clone());
                }
            }
        }

        report
    }
}

fn validate_geometry(route: &Route) -> Result<(), TrafficError> {
    let points = &route.geometry.coordinates;
    if points.is_empty() {
        return Err(TrafficError::InvalidGeometry("route geometry is empty".to_string()));
    }
    if let Some(point) = points.iter().find(|p| !p.is_finite()) {
        return Err(TrafficError::InvalidGeometry(format!(
            "non-finite coordinate [{}, {}]",
            point.lon, point.lat
        )));
    }
    Ok(())
}

fn unadjusted(route: Route) -> AdjustedRoute {
    let breakdown = TrafficBreakdown {
        applied: false,
        base_duration: route.duration,
        ..Default::default()
    };
    AdjustedRoute {
        route: route.without_traffic(),
        breakdown,
    }
}
