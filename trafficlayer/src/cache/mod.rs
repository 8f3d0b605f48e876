//! Time-bucketed tile store.
//!
//! Raw congestion payloads are persisted under a key made of the tile and
//! the [`TimeBucket`] they were fetched in. A later request in the same
//! bucket is served from the store without a network call.
//!
//! ```text
//! TileFetcher ──► TileStoreClient ──► Arc<dyn Cache>
//!                                      ├─ MemoryCacheProvider (moka)
//!                                      └─ DiskCacheProvider (tokio::fs)
//! ```

mod clients;
mod config;
mod providers;
mod time_bucket;
mod traits;

pub use clients::TileStoreClient;
pub use config::{open_cache, CacheProviderConfig, DEFAULT_MEMORY_CACHE_SIZE};
pub use providers::{DiskCacheProvider, MemoryCacheProvider};
pub use time_bucket::{TimeBucket, BUCKET_MINUTES};
pub use traits::{BoxFuture, Cache, ServiceCacheError};
