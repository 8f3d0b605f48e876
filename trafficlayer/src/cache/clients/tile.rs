//! Tile store client for raw congestion payloads.
//!
//! This client wraps a generic `Cache` with key translation:
//! `(TileCoord, TimeBucket)` → `"traffic:{zoom}:{x}:{y}:{day}:{hour}:{minute}"`.
//!
//! Example: `traffic:11:1246:898:Monday:8:15`

use std::sync::Arc;

use tracing::warn;

use crate::cache::time_bucket::TimeBucket;
use crate::cache::traits::Cache;
use crate::coord::TileCoord;

/// Time-bucketed store for raw tile payloads.
#[derive(Clone)]
pub struct TileStoreClient {
    cache: Arc<dyn Cache>,
}

impl TileStoreClient {
    /// Create a new tile store client.
    ///
    /// # Arguments
    ///
    /// * `cache` - The underlying cache implementation
    pub fn new(cache: Arc<dyn Cache>) -> Self {
        Self { cache }
    }

    /// Get a payload for the exact tile and bucket.
    ///
    /// Store errors are logged and reported as a miss.
    pub async fn get(&self, tile: &TileCoord, bucket: &TimeBucket) -> Option<Vec<u8>> {
        let key = Self::tile_to_key(tile, bucket);
        match self.cache.get(&key).await {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, key = %key, "Tile store get failed");
                None
            }
        }
    }

    /// Upsert a payload. Returns false if the store rejected the write.
    pub async fn put(&self, tile: &TileCoord, bucket: &TimeBucket, data: Vec<u8>) -> bool {
        let key = Self::tile_to_key(tile, bucket);
        match self.cache.set(&key, data).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, key = %key, "Tile store put failed");
                false
            }
        }
    }

    /// Check if a payload exists for the tile and bucket.
    pub async fn contains(&self, tile: &TileCoord, bucket: &TimeBucket) -> bool {
        let key = Self::tile_to_key(tile, bucket);
        self.cache.contains(&key).await.unwrap_or(false)
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    pub fn size_bytes(&self) -> u64 {
        self.cache.size_bytes()
    }

    /// Name of the backing provider.
    pub fn provider_name(&self) -> &'static str {
        self.cache.name()
    }

    /// Format: `traffic:{zoom}:{x}:{y}:{day}:{hour}:{minute}`
    pub fn tile_to_key(tile: &TileCoord, bucket: &TimeBucket) -> String {
        format!(
            "traffic:{}:{}:{}:{}:{}:{}",
            tile.zoom,
            tile.x,
            tile.y,
            bucket.day_name(),
            bucket.hour,
            bucket.minute
        )
    }
}
