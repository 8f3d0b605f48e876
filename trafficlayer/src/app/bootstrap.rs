//! Application bootstrap.
//!
//! `TrafficLayerApp` wires the explicitly constructed handles every
//! component needs: tile store, quota store, tile source and the traffic
//! service on top of them.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use super::config::AppConfig;
use super::error::AppError;
use crate::cache::{open_cache, TileStoreClient};
use crate::jobs::{PrewarmJob, QuotaResetJob, QuotaSaveJob, Scheduler};
use crate::provider::{AsyncReqwestClient, DecodeProxySource, TileSource};
use crate::quota::{InMemoryQuotaStore, QuotaSelector, QuotaStore};
use crate::traffic::TrafficService;

/// The production tile source.
pub type ProxySource = DecodeProxySource<AsyncReqwestClient>;

/// Started application: shared handles plus the config they came from.
///
/// # Example
///
/// ```ignore
/// use trafficlayer::app::{AppConfig, TrafficLayerApp};
///
/// let app = TrafficLayerApp::start(AppConfig::from_config_file(&file)).await?;
/// let adjusted = app.service().adjust_route_time(route, &bbox, 11).await?;
/// ```
pub struct TrafficLayerApp<S: TileSource + 'static = ProxySource> {
    service: Arc<TrafficService<S>>,
    quota_store: Arc<dyn QuotaStore>,
    config: AppConfig,
}

impl TrafficLayerApp<ProxySource> {
    /// Starts the application against the configured decode proxy.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or the tile store cannot be
    /// created.
    pub async fn start(config: AppConfig) -> Result<Self, AppError> {
        let http_client =
            AsyncReqwestClient::with_timeout(config.http_timeout).map_err(AppError::HttpClient)?;
        let source = DecodeProxySource::new(http_client, config.proxy_url.clone());
        Self::start_with_source(config, source).await
    }
}

impl<S: TileSource + 'static> TrafficLayerApp<S> {
    /// Starts the application with a caller-supplied tile source.
    pub async fn start_with_source(config: AppConfig, source: S) -> Result<Self, AppError> {
        info!(source = source.name(), "Starting TrafficLayer");

        let cache = open_cache(&config.cache).await?;
        let store = TileStoreClient::new(cache);
        info!(
            provider = store.provider_name(),
            entries = store.entry_count(),
            "Tile store opened"
        );

        let quota_store = InMemoryQuotaStore::new();
        for credential in &config.credentials {
            quota_store.upsert(credential.clone()).await?;
        }
        if quota_store.is_empty() {
            warn!("No provider credentials configured; routes will not be traffic-adjusted");
        } else {
            info!(credentials = quota_store.len(), "Quota store loaded");
        }
        let quota_store: Arc<dyn QuotaStore> = Arc::new(quota_store);

        let service = TrafficService::new(
            Arc::new(source),
            store,
            QuotaSelector::new(Arc::clone(&quota_store)),
            config.traffic.clone(),
        );

        Ok(Self {
            service: Arc::new(service),
            quota_store,
            config,
        })
    }

    pub fn service(&self) -> &Arc<TrafficService<S>> {
        &self.service
    }

    pub fn quota_store(&self) -> &Arc<dyn QuotaStore> {
        &self.quota_store
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Scheduler with the prewarm and quota reset jobs registered.
    pub fn scheduler(&self) -> Scheduler {
        let mut scheduler = Scheduler::new();
        scheduler
            .add(
                PrewarmJob::new(
                    Arc::clone(&self.service),
                    self.config.regions.clone(),
                    self.config.prewarm_zoom,
                ),
                self.config.prewarm_interval,
            )
            .add(
                QuotaResetJob::new(Arc::clone(&self.quota_store), self.config.quota_reset_day),
                self.config.quota_interval,
            );
        scheduler
    }

    /// [`scheduler`](Self::scheduler) plus a job saving quota counters to
    /// `config_path` on the prewarm interval.
    pub fn scheduler_with_quota_file(&self, config_path: impl Into<PathBuf>) -> Scheduler {
        let mut scheduler = self.scheduler();
        scheduler.add(self.quota_save_job(config_path), self.config.prewarm_interval);
        scheduler
    }

    pub fn quota_save_job(&self, config_path: impl Into<PathBuf>) -> QuotaSaveJob {
        QuotaSaveJob::new(Arc::clone(&self.quota_store), config_path)
    }

    /// Writes the current request counters into the `[credential.*]`
    /// sections of the config file at `config_path`.
    ///
    /// Returns the number of sections updated.
    pub async fn save_quota_usage(&self, config_path: &Path) -> Result<usize, AppError> {
        self.quota_save_job(config_path)
            .save()
            .await
            .map_err(AppError::QuotaSave)
    }
}
