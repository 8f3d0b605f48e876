//! Quota counter write-back.
//!
//! Request counters live in the in-memory quota store while the app runs.
//! This job copies them into the `request_count` keys of the config file
//! so the next process starts from the same usage.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use super::{Job, JobError};
use crate::cache::BoxFuture;
use crate::config::ConfigFile;
use crate::quota::QuotaStore;

/// Writes the quota store's counters back to a config file.
pub struct QuotaSaveJob {
    store: Arc<dyn QuotaStore>,
    path: PathBuf,
}

impl QuotaSaveJob {
    pub fn new(store: Arc<dyn QuotaStore>, path: impl Into<PathBuf>) -> Self {
        Self {
            store,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Saves the current counters.
    ///
    /// The file is re-read first so other edits made since startup are
    /// kept, and left untouched when no counter changed.
    ///
    /// Returns the number of credential sections updated.
    pub async fn save(&self) -> Result<usize, JobError> {
        let credentials = self.store.list().await?;

        let mut file = ConfigFile::load_from(&self.path)?;
        let changed = file.apply_quota_counts(&credentials);
        if changed == 0 {
            debug!(path = %self.path.display(), "Quota counters unchanged");
            return Ok(0);
        }

        file.save_to(&self.path)?;
        info!(
            path = %self.path.display(),
            credentials = changed,
            "Quota counters saved"
        );
        Ok(changed)
    }
}

impl Job for QuotaSaveJob {
    fn name(&self) -> &str {
        "quota-save"
    }

    fn run(&self) -> BoxFuture<'_, Result<String, JobError>> {
        Box::pin(async move {
            let changed = self.save().await?;
            Ok(format!("saved {} credential counters", changed))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CredentialSettings;
    use crate::quota::{InMemoryQuotaStore, ProviderCredential};
    use tempfile::TempDir;

    fn write_config(path: &Path) {
        let config = ConfigFile {
            credentials: vec![CredentialSettings {
                name: "primary".to_string(),
                provider: "mapbox".to_string(),
                token: "pk.abc".to_string(),
                request_limit: 500,
                request_count: 3,
            }],
            ..Default::default()
        };
        config.save_to(path).unwrap();
    }

    #[tokio::test]
    async fn test_save_writes_counters() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        write_config(&path);

        let mut used = ProviderCredential::new("mapbox", "pk.abc", 500);
        used.request_count = 120;
        let store = Arc::new(InMemoryQuotaStore::with_credentials([used]));
        let job = QuotaSaveJob::new(store, &path);

        assert_eq!(job.save().await.unwrap(), 1);
        let reloaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(reloaded.credentials[0].request_count, 120);
        assert_eq!(reloaded.credentials[0].request_limit, 500);
    }

    #[tokio::test]
    async fn test_save_keeps_edits_made_after_startup() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        write_config(&path);

        // Someone changes the zoom while the app is running
        let mut edited = ConfigFile::load_from(&path).unwrap();
        edited.traffic.zoom = 13;
        edited.save_to(&path).unwrap();

        let mut used = ProviderCredential::new("mapbox", "pk.abc", 500);
        used.request_count = 9;
        let store = Arc::new(InMemoryQuotaStore::with_credentials([used]));
        QuotaSaveJob::new(store, &path).save().await.unwrap();

        let reloaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(reloaded.traffic.zoom, 13);
        assert_eq!(reloaded.credentials[0].request_count, 9);
    }

    #[tokio::test]
    async fn test_unchanged_counters_leave_file_alone() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        write_config(&path);
        let before = std::fs::read_to_string(&path).unwrap();

        let mut same = ProviderCredential::new("mapbox", "pk.abc", 500);
        same.request_count = 3;
        let store = Arc::new(InMemoryQuotaStore::with_credentials([same]));
        let job = QuotaSaveJob::new(store, &path);

        assert_eq!(job.save().await.unwrap(), 0);
        assert_eq!(job.run().await.unwrap(), "saved 0 credential counters");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }
}
