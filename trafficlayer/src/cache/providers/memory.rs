//! In-memory cache provider using moka.
//!
//! Wraps `moka::future::Cache` for async-safe, lock-free access with
//! automatic eviction once the configured byte budget is exceeded. Entries
//! are weighted by payload size.

use std::time::Duration;

use moka::future::Cache as MokaCache;

use crate::cache::traits::{BoxFuture, Cache, ServiceCacheError};

/// In-memory cache provider using moka.
pub struct MemoryCacheProvider {
    cache: MokaCache<String, Vec<u8>>,
    max_size_bytes: u64,
}

impl MemoryCacheProvider {
    /// Create a new memory cache provider.
    ///
    /// # Arguments
    ///
    /// * `max_size_bytes` - Maximum total payload size in bytes
    /// * `ttl` - Optional time-to-live for entries
    pub fn new(max_size_bytes: u64, ttl: Option<Duration>) -> Self {
        let mut builder = MokaCache::builder()
            .weigher(|_key: &String, value: &Vec<u8>| -> u32 {
                value.len().min(u32::MAX as usize) as u32
            })
            .max_capacity(max_size_bytes);

        if let Some(ttl) = ttl {
            builder = builder.time_to_live(ttl);
        }

        Self {
            cache: builder.build(),
            max_size_bytes,
        }
    }

    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_bytes
    }

    /// Runs moka's pending maintenance so counters are current.
    pub async fn sync(&self) {
        self.cache.run_pending_tasks().await;
    }
}

impl Cache for MemoryCacheProvider {
    fn set(&self, key: &str, value: Vec<u8>) -> BoxFuture<'_, Result<(), ServiceCacheError>> {
        let key = key.to_string();
        Box::pin(async move {
            self.cache.insert(key, value).await;
            Ok(())
        })
    }

    fn get(&self, key: &str) -> BoxFuture<'_, Result<Option<Vec<u8>>, ServiceCacheError>> {
        let key = key.to_string();
        Box::pin(async move { Ok(self.cache.get(&key).await) })
    }

    fn delete(&self, key: &str) -> BoxFuture<'_, Result<bool, ServiceCacheError>> {
        let key = key.to_string();
        Box::pin(async move { Ok(self.cache.remove(&key).await.is_some()) })
    }

    fn contains(&self, key: &str) -> BoxFuture<'_, Result<bool, ServiceCacheError>> {
        let key = key.to_string();
        Box::pin(async move { Ok(self.cache.contains_key(&key)) })
    }

    fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    fn size_bytes(&self) -> u64 {
        self.cache.weighted_size()
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_provider_new() {
        let provider = MemoryCacheProvider::new(1_000_000, None);
        assert_eq!(provider.max_size_bytes(), 1_000_000);
        assert_eq!(provider.entry_count(), 0);
        assert_eq!(provider.size_bytes(), 0);
    }

    #[tokio::test]
    async fn test_memory_provider_set_and_get() {
        let provider = MemoryCacheProvider::new(1_000_000, None);

        provider.set("key1", vec![1, 2, 3]).await.unwrap();

        let value = provider.get("key1").await.unwrap();
        assert_eq!(value, Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn test_memory_provider_get_missing() {
        let provider = MemoryCacheProvider::new(1_000_000, None);
        assert!(provider.get("nonexistent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_provider_set_replaces() {
        let provider = MemoryCacheProvider::new(1_000_000, None);

        provider.set("key1", vec![1]).await.unwrap();
        provider.set("key1", vec![2, 2]).await.unwrap();

        assert_eq!(provider.get("key1").await.unwrap(), Some(vec![2, 2]));
        provider.sync().await;
        assert_eq!(provider.entry_count(), 1);
    }

    #[tokio::test]
    async fn test_memory_provider_delete() {
        let provider = MemoryCacheProvider::new(1_000_000, None);

        provider.set("key1", vec![1, 2, 3]).await.unwrap();
        assert!(provider.contains("key1").await.unwrap());

        assert!(provider.delete("key1").await.unwrap());
        assert!(!provider.contains("key1").await.unwrap());
        assert!(!provider.delete("key1").await.unwrap());
    }

    #[tokio::test]
    async fn test_memory_provider_size_tracking() {
        let provider = MemoryCacheProvider::new(1_000_000, None);

        provider.set("a", vec![0; 100]).await.unwrap();
        provider.set("b", vec![0; 200]).await.unwrap();
        provider.sync().await;

        assert_eq!(provider.entry_count(), 2);
        assert_eq!(provider.size_bytes(), 300);
    }
}
