//! Application configuration for `TrafficLayerApp`.

use std::time::Duration;

use crate::cache::CacheProviderConfig;
use crate::config::{CacheKind, ConfigFile};
use crate::prewarm::{default_regions, Region};
use crate::quota::ProviderCredential;
use crate::traffic::TrafficSettings;

/// Everything needed to wire the traffic service.
///
/// This is the top-level configuration passed to `TrafficLayerApp::start()`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Decode proxy base URL.
    pub proxy_url: String,

    /// HTTP timeout for proxy requests.
    pub http_timeout: Duration,

    /// Tile store backend.
    pub cache: CacheProviderConfig,

    pub traffic: TrafficSettings,

    /// Credentials seeded into the quota store.
    pub credentials: Vec<ProviderCredential>,

    /// Regions kept warm by the prewarm job.
    pub regions: Vec<Region>,

    pub prewarm_zoom: u8,
    pub prewarm_interval: Duration,

    pub quota_reset_day: u32,
    pub quota_interval: Duration,
}

impl AppConfig {
    /// Builds the application config from the user's `ConfigFile`.
    ///
    /// Falls back to the built-in regions when none are configured.
    pub fn from_config_file(config: &ConfigFile) -> Self {
        let cache = match config.cache.provider {
            CacheKind::Memory => CacheProviderConfig::Memory {
                max_size_bytes: config.cache.memory_size as u64,
                ttl: None,
            },
            CacheKind::Disk => CacheProviderConfig::Disk {
                directory: config.cache.directory.clone(),
            },
        };

        let credentials = config
            .credentials
            .iter()
            .map(|c| {
                let mut credential =
                    ProviderCredential::new(c.provider.clone(), c.token.clone(), c.request_limit);
                credential.request_count = c.request_count;
                credential
            })
            .collect();

        let regions = if config.regions.is_empty() {
            default_regions()
        } else {
            config.regions.clone()
        };

        Self {
            proxy_url: config.proxy.base_url.clone(),
            http_timeout: Duration::from_secs(config.proxy.timeout_secs),
            cache,
            traffic: config.traffic.clone(),
            credentials,
            regions,
            prewarm_zoom: config.prewarm.zoom,
            prewarm_interval: Duration::from_secs(config.prewarm.interval_secs),
            quota_reset_day: config.quota.reset_day,
            quota_interval: Duration::from_secs(config.quota.interval_secs),
        }
    }
}
