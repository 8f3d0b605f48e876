//! Errors surfaced by the traffic service.

use thiserror::Error;

use crate::coord::CoordError;
use crate::quota::QuotaError;

/// Call-level failures.
///
/// Per-tile problems never show up here; they are absorbed as
/// [`TileError`](super::TileError)s and counted in the fetch statistics.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrafficError {
    /// No credential can serve a batch.
    #[error("No provider credential has quota for a batch of {required} tiles")]
    NoQuotaAvailable { required: u64 },

    /// Route geometry or bounding box unusable.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Tile coordinate problem such as an unsupported zoom.
    #[error(transparent)]
    Coord(CoordError),

    /// The quota store failed.
    #[error(transparent)]
    Quota(QuotaError),
}

impl From<CoordError> for TrafficError {
    fn from(err: CoordError) -> Self {
        match err {
            CoordError::InvalidBoundingBox(msg) => TrafficError::InvalidGeometry(msg),
            other => TrafficError::Coord(other),
        }
    }
}

impl From<QuotaError> for TrafficError {
    fn from(err: QuotaError) -> Self {
        match err {
            QuotaError::NoQuotaAvailable { required } => TrafficError::NoQuotaAvailable { required },
            other => TrafficError::Quota(other),
        }
    }
}
