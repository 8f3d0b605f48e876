//! On-disk cache provider.
//!
//! Each key maps to one file. The key is split on `:` and every segment but
//! the last becomes a directory, so `traffic:11:1246:898:Monday:8:15` is
//! stored at `{dir}/traffic/11/1246/898/Monday/8/15.bin`. Writes go to a
//! temporary sibling and are renamed into place, so readers never observe a
//! partial payload and concurrent writers resolve as last write wins. The
//! rename and the size bookkeeping happen under one lock so that racing
//! first writers of a key count it once.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, info, warn};

use crate::cache::traits::{BoxFuture, Cache, ServiceCacheError};

const ENTRY_EXTENSION: &str = "bin";

/// On-disk cache provider.
pub struct DiskCacheProvider {
    directory: PathBuf,
    cached_size: AtomicU64,
    cached_count: AtomicU64,
    temp_counter: AtomicU64,
    /// Serialises rename and delete with the counter updates
    commit_lock: tokio::sync::Mutex<()>,
}

impl DiskCacheProvider {
    /// Opens (creating if needed) a cache rooted at `directory` and scans
    /// existing entries to initialise the size and count.
    pub async fn open(directory: impl Into<PathBuf>) -> Result<Self, ServiceCacheError> {
        let directory = directory.into();
        tokio::fs::create_dir_all(&directory).await?;

        let scan_dir = directory.clone();
        let (count, size) = tokio::task::spawn_blocking(move || {
            let mut totals = (0u64, 0u64);
            Self::scan_recursive(&scan_dir, &mut totals);
            totals
        })
        .await
        .map_err(|e| ServiceCacheError::Provider(format!("Cache scan failed: {}", e)))?;

        info!(
            dir = %directory.display(),
            entries = count,
            bytes = size,
            "Disk cache opened"
        );

        Ok(Self {
            directory,
            cached_size: AtomicU64::new(size),
            cached_count: AtomicU64::new(count),
            temp_counter: AtomicU64::new(0),
            commit_lock: tokio::sync::Mutex::new(()),
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn scan_recursive(dir: &Path, totals: &mut (u64, u64)) {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(dir = %dir.display(), error = %e, "Failed to read cache directory");
                return;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                Self::scan_recursive(&path, totals);
            } else if path.extension().is_some_and(|ext| ext == ENTRY_EXTENSION) {
                if let Ok(metadata) = entry.metadata() {
                    totals.0 += 1;
                    totals.1 += metadata.len();
                }
            }
        }
    }

    /// Maps a key to its file path.
    ///
    /// # Errors
    ///
    /// Rejects keys with empty segments, path separators or `..`.
    fn key_path(&self, key: &str) -> Result<PathBuf, ServiceCacheError> {
        let invalid = |reason: &str| ServiceCacheError::InvalidKey {
            key: key.to_string(),
            reason: reason.to_string(),
        };

        let segments: Vec<&str> = key.split(':').collect();
        let mut path = self.directory.clone();
        for (i, segment) in segments.iter().enumerate() {
            if segment.is_empty() {
                return Err(invalid("empty segment"));
            }
            if *segment == "." || *segment == ".." {
                return Err(invalid("relative path segment"));
            }
            if segment.contains(['/', '\\']) {
                return Err(invalid("path separator in segment"));
            }
            if i + 1 == segments.len() {
                path.push(format!("{}.{}", segment, ENTRY_EXTENSION));
            } else {
                path.push(segment);
            }
        }
        Ok(path)
    }

    async fn existing_len(path: &Path) -> Option<u64> {
        tokio::fs::metadata(path).await.ok().map(|m| m.len())
    }

    async fn discard_temp(temp_path: &Path) {
        if let Err(e) = tokio::fs::remove_file(temp_path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %temp_path.display(), error = %e, "Failed to remove temp file");
            }
        }
    }
}

impl Cache for DiskCacheProvider {
    fn set(&self, key: &str, value: Vec<u8>) -> BoxFuture<'_, Result<(), ServiceCacheError>> {
        let path = self.key_path(key);
        Box::pin(async move {
            let path = path?;
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }

            // Unique temp name so concurrent writers never share one
            let n = self.temp_counter.fetch_add(1, Ordering::Relaxed);
            let temp_path = path.with_extension(format!("tmp.{}.{}", std::process::id(), n));
            if let Err(e) = tokio::fs::write(&temp_path, &value).await {
                Self::discard_temp(&temp_path).await;
                return Err(e.into());
            }

            let _commit = self.commit_lock.lock().await;
            let previous = Self::existing_len(&path).await;
            if let Err(e) = tokio::fs::rename(&temp_path, &path).await {
                Self::discard_temp(&temp_path).await;
                return Err(e.into());
            }

            match previous {
                Some(old_len) => {
                    self.cached_size.fetch_sub(
                        old_len.min(self.cached_size.load(Ordering::Relaxed)),
                        Ordering::Relaxed,
                    );
                }
                None => {
                    self.cached_count.fetch_add(1, Ordering::Relaxed);
                }
            }
            self.cached_size.fetch_add(value.len() as u64, Ordering::Relaxed);
            Ok(())
        })
    }

    fn get(&self, key: &str) -> BoxFuture<'_, Result<Option<Vec<u8>>, ServiceCacheError>> {
        let path = self.key_path(key);
        Box::pin(async move {
            match tokio::fs::read(path?).await {
                Ok(data) => Ok(Some(data)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(ServiceCacheError::Io(e)),
            }
        })
    }

    fn delete(&self, key: &str) -> BoxFuture<'_, Result<bool, ServiceCacheError>> {
        let path = self.key_path(key);
        Box::pin(async move {
            let path = path?;
            let _commit = self.commit_lock.lock().await;
            let len = Self::existing_len(&path).await;
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {
                    let len = len.unwrap_or(0);
                    self.cached_size.fetch_sub(
                        len.min(self.cached_size.load(Ordering::Relaxed)),
                        Ordering::Relaxed,
                    );
                    let _ = self
                        .cached_count
                        .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |c| c.checked_sub(1));
                    Ok(true)
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
                Err(e) => Err(ServiceCacheError::Io(e)),
            }
        })
    }

    fn contains(&self, key: &str) -> BoxFuture<'_, Result<bool, ServiceCacheError>> {
        let path = self.key_path(key);
        Box::pin(async move { Ok(tokio::fs::try_exists(path?).await?) })
    }

    fn entry_count(&self) -> u64 {
        self.cached_count.load(Ordering::Relaxed)
    }

    fn size_bytes(&self) -> u64 {
        self.cached_size.load(Ordering::Relaxed)
    }

    fn name(&self) -> &'static str {
        "disk"
    }
}
