//! Congestion tiles: fetching, parsing and orchestration.
//!
//! [`TrafficService`] is the entry point. It partitions a bounding box into
//! tile batches, reserves quota per batch through the
//! [`QuotaSelector`](crate::quota::QuotaSelector), fetches every tile through
//! the [`TileFetcher`] and hands the aggregated [`CongestionFeature`]s to the
//! route overlay.

mod error;
mod feature;
mod fetcher;
mod service;
mod stats;

pub use error::TrafficError;
pub use feature::{parse_payload, CongestionFeature, CongestionLevel, PayloadError};
pub use fetcher::{RequestedTiles, TileError, TileFetch, TileFetcher, DEFAULT_TILE_TIMEOUT};
pub use service::{
    CongestionSet, TrafficService, TrafficSettings, DEFAULT_BATCH_SIZE, DEFAULT_SIMPLIFY_GRID,
    DEFAULT_SIMPLIFY_TOLERANCE, DEFAULT_TRAFFIC_ZOOM,
};
pub use stats::FetchStats;
