//! Core traits for the tile store.
//!
//! The `Cache` trait is a domain-agnostic key-value interface. Providers
//! implement it; domain clients such as [`TileStoreClient`](super::TileStoreClient)
//! translate their own keys into strings on top of it.
//!
//! - **String keys**: human-readable, the same format in memory and on disk
//! - **Vec<u8> values**: raw payloads, no serialization imposed
//! - **Upsert semantics**: `set` replaces any existing value, last write wins
//! - **Dyn-compatible**: `Pin<Box<dyn Future>>` returns allow `Arc<dyn Cache>`

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

/// Errors that can occur during cache operations.
#[derive(Debug, Error)]
pub enum ServiceCacheError {
    /// I/O error during cache operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Key cannot be stored by this provider.
    #[error("Invalid cache key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },

    /// Provider-specific error.
    #[error("Provider error: {0}")]
    Provider(String),
}

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Generic key-value store.
///
/// All implementations must be `Send + Sync` for use across async tasks.
pub trait Cache: Send + Sync {
    /// Store a value with the given key, replacing any existing value.
    ///
    /// # Arguments
    ///
    /// * `key` - The cache key
    /// * `value` - The value to store
    fn set(&self, key: &str, value: Vec<u8>) -> BoxFuture<'_, Result<(), ServiceCacheError>>;

    /// Retrieve a value by exact key.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(data))` if the key exists
    /// - `Ok(None)` if the key is not found
    /// - `Err(_)` if an error occurs
    fn get(&self, key: &str) -> BoxFuture<'_, Result<Option<Vec<u8>>, ServiceCacheError>>;

    /// Delete a value by key. Returns whether the key existed.
    fn delete(&self, key: &str) -> BoxFuture<'_, Result<bool, ServiceCacheError>>;

    /// Check if a key exists without retrieving the value.
    fn contains(&self, key: &str) -> BoxFuture<'_, Result<bool, ServiceCacheError>>;

    /// Current number of entries.
    fn entry_count(&self) -> u64;

    /// Current size of all stored values in bytes.
    fn size_bytes(&self) -> u64;

    /// Short provider name for logs.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_error_display() {
        let err = ServiceCacheError::InvalidKey {
            key: "a/../b".into(),
            reason: "path traversal".into(),
        };
        let display = err.to_string();
        assert!(display.contains("a/../b"));
        assert!(display.contains("path traversal"));
    }

    #[test]
    fn test_cache_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cache_err: ServiceCacheError = io_err.into();
        assert!(matches!(cache_err, ServiceCacheError::Io(_)));
    }
}
