//! Tile store provider configuration.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use super::providers::{DiskCacheProvider, MemoryCacheProvider};
use super::traits::{Cache, ServiceCacheError};

/// Default in-memory budget: 256 MB.
pub const DEFAULT_MEMORY_CACHE_SIZE: u64 = 256 * 1024 * 1024;

/// Which backend stores raw tile payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheProviderConfig {
    /// In-memory store using moka.
    Memory {
        max_size_bytes: u64,
        /// Optional time-to-live for entries.
        ttl: Option<Duration>,
    },

    /// One file per entry under `directory`.
    Disk { directory: PathBuf },
}

impl Default for CacheProviderConfig {
    fn default() -> Self {
        Self::Memory {
            max_size_bytes: DEFAULT_MEMORY_CACHE_SIZE,
            ttl: None,
        }
    }
}

/// Builds the configured provider.
pub async fn open_cache(config: &CacheProviderConfig) -> Result<Arc<dyn Cache>, ServiceCacheError> {
    match config {
        CacheProviderConfig::Memory { max_size_bytes, ttl } => {
            info!(max_bytes = max_size_bytes, "Using memory tile store");
            Ok(Arc::new(MemoryCacheProvider::new(*max_size_bytes, *ttl)))
        }
        CacheProviderConfig::Disk { directory } => {
            let provider = DiskCacheProvider::open(directory.clone()).await?;
            Ok(Arc::new(provider))
        }
    }
}
