//! Default values for all configuration settings.

use std::path::PathBuf;

use super::settings::*;
use crate::cache::DEFAULT_MEMORY_CACHE_SIZE;
use crate::jobs::DEFAULT_RESET_DAY;
use crate::prewarm::DEFAULT_PREWARM_ZOOM;
use crate::provider::DEFAULT_PROXY_URL;
use crate::traffic::TrafficSettings;

/// Default proxy HTTP timeout in seconds.
pub const DEFAULT_PROXY_TIMEOUT_SECS: u64 = 10;

/// Default pre-warm interval: one time bucket.
pub const DEFAULT_PREWARM_INTERVAL_SECS: u64 = 15 * 60;

/// Default interval for the quota reset check.
pub const DEFAULT_QUOTA_INTERVAL_SECS: u64 = 24 * 60 * 60;

/// Default disk cache directory (`~/.cache/trafficlayer` on Linux).
pub fn default_cache_directory() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("trafficlayer")
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            proxy: ProxySettings {
                base_url: DEFAULT_PROXY_URL.to_string(),
                timeout_secs: DEFAULT_PROXY_TIMEOUT_SECS,
            },
            traffic: TrafficSettings::default(),
            cache: CacheSettings {
                provider: CacheKind::Memory,
                directory: default_cache_directory(),
                memory_size: DEFAULT_MEMORY_CACHE_SIZE as usize,
            },
            prewarm: PrewarmSettings {
                interval_secs: DEFAULT_PREWARM_INTERVAL_SECS,
                zoom: DEFAULT_PREWARM_ZOOM,
            },
            quota: QuotaSettings {
                reset_day: DEFAULT_RESET_DAY,
                interval_secs: DEFAULT_QUOTA_INTERVAL_SECS,
            },
            credentials: Vec::new(),
            regions: Vec::new(),
        }
    }
}
