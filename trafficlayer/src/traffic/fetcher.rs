//! Single-tile fetching with store lookup and de-duplication.
//!
//! For each tile the fetcher:
//!
//! 1. looks up the raw payload for the current [`TimeBucket`] in the store;
//! 2. on a miss, fetches it from the [`TileSource`] under a per-tile timeout;
//! 3. upserts the raw payload into the store, noting when the store refuses it;
//! 4. parses it into [`CongestionFeature`]s.
//!
//! Concurrent callers share a [`RequestedTiles`] set. The first caller to
//! claim a tile does the work; later callers for the same tile get `None`
//! immediately and do not wait for or share the first caller's result.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, warn};

use super::feature::{parse_payload, CongestionFeature, PayloadError};
use crate::cache::{TileStoreClient, TimeBucket};
use crate::coord::TileCoord;
use crate::provider::{ProviderError, TileSource};
use crate::quota::ProviderCredential;

/// Default timeout for one remote tile fetch.
pub const DEFAULT_TILE_TIMEOUT: Duration = Duration::from_secs(10);

/// Features for one tile and where they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct TileFetch {
    pub features: Vec<CongestionFeature>,
    /// True if the payload came from the tile source rather than the store
    pub was_remote_fetch: bool,
    /// False if a remote payload could not be written to the store
    pub stored: bool,
}

/// Why a single tile yielded no features.
#[derive(Debug, Error)]
pub enum TileError {
    #[error("Tile {tile} fetch via {provider} failed: {source}")]
    Fetch {
        tile: TileCoord,
        provider: String,
        source: ProviderError,
    },

    #[error("Tile {tile} fetch via {provider} timed out after {timeout:?}")]
    Timeout {
        tile: TileCoord,
        provider: String,
        timeout: Duration,
    },

    #[error("Tile {tile} payload unreadable: {source}")]
    Parse {
        tile: TileCoord,
        /// True if the bad payload was fetched remotely (and thus billed)
        from_remote: bool,
        source: PayloadError,
    },
}

impl TileError {
    pub fn tile(&self) -> TileCoord {
        match self {
            TileError::Fetch { tile, .. }
            | TileError::Timeout { tile, .. }
            | TileError::Parse { tile, .. } => *tile,
        }
    }

    /// Whether the failed attempt still consumed a provider request.
    pub fn consumed_quota(&self) -> bool {
        matches!(self, TileError::Parse { from_remote: true, .. })
    }
}

/// Set of tiles already claimed within one fetch call.
#[derive(Debug, Default)]
pub struct RequestedTiles {
    tiles: Mutex<HashSet<TileCoord>>,
}

impl RequestedTiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `tile`. Returns false if it was already claimed.
    pub fn try_mark(&self, tile: TileCoord) -> bool {
        self.tiles.lock().insert(tile)
    }

    pub fn contains(&self, tile: &TileCoord) -> bool {
        self.tiles.lock().contains(tile)
    }

    pub fn len(&self) -> usize {
        self.tiles.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.lock().is_empty()
    }
}

/// Fetches congestion tiles through the store.
pub struct TileFetcher<S: TileSource> {
    source: Arc<S>,
    store: TileStoreClient,
    timeout: Duration,
}

impl<S: TileSource> TileFetcher<S> {
    /// Creates a fetcher.
    ///
    /// # Arguments
    ///
    /// * `source` - Remote tile source
    /// * `store` - Time-bucketed payload store
    /// * `timeout` - Upper bound for each remote fetch
    pub fn new(source: Arc<S>, store: TileStoreClient, timeout: Duration) -> Self {
        Self {
            source,
            store,
            timeout,
        }
    }

    pub fn store(&self) -> &TileStoreClient {
        &self.store
    }

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    /// Fetches one tile for `bucket`.
    ///
    /// A store hit performs no network call. A remote payload is persisted
    /// before it is parsed, so even an unreadable payload is not fetched
    /// twice within a bucket.
    pub async fn fetch_tile(
        &self,
        credential: &ProviderCredential,
        tile: TileCoord,
        bucket: &TimeBucket,
    ) -> Result<TileFetch, TileError> {
        if let Some(raw) = self.store.get(&tile, bucket).await {
            debug!(tile = %tile, bucket = %bucket, "Tile store hit");
            let features = parse_payload(&raw).map_err(|source| TileError::Parse {
                tile,
                from_remote: false,
                source,
            })?;
            return Ok(TileFetch {
                features,
                was_remote_fetch: false,
                stored: true,
            });
        }

        let raw = match tokio::time::timeout(self.timeout, self.source.fetch_tile(credential, tile))
            .await
        {
            Ok(Ok(raw)) => raw,
            Ok(Err(source)) => {
                return Err(TileError::Fetch {
                    tile,
                    provider: credential.provider.clone(),
                    source,
                })
            }
            Err(_) => {
                return Err(TileError::Timeout {
                    tile,
                    provider: credential.provider.clone(),
                    timeout: self.timeout,
                })
            }
        };

        let parsed = parse_payload(&raw);
        let stored = self.store.put(&tile, bucket, raw).await;
        if !stored {
            warn!(
                tile = %tile,
                bucket = %bucket,
                "Remote payload not persisted, the next call in this bucket refetches it"
            );
        }

        let features = parsed.map_err(|source| TileError::Parse {
            tile,
            from_remote: true,
            source,
        })?;
        debug!(tile = %tile, features = features.len(), "Tile fetched from source");

        Ok(TileFetch {
            features,
            was_remote_fetch: true,
            stored,
        })
    }

    /// Fetches `tile` unless another caller already claimed it in `requested`.
    ///
    /// Returns `None` for a duplicate.
    pub async fn fetch_tile_once(
        &self,
        requested: &RequestedTiles,
        credential: &ProviderCredential,
        tile: TileCoord,
        bucket: &TimeBucket,
    ) -> Option<Result<TileFetch, TileError>> {
        if !requested.try_mark(tile) {
            debug!(tile = %tile, "Tile already requested, skipping");
            return None;
        }
        Some(self.fetch_tile(credential, tile, bucket).await)
    }
}
