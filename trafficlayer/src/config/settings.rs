//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file. The
//! `[traffic]` section maps onto [`TrafficSettings`] directly and
//! `[region.*]` sections onto [`Region`]s.

use std::path::PathBuf;

use crate::prewarm::Region;
use crate::quota::ProviderCredential;
use crate::traffic::TrafficSettings;

/// Complete configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub proxy: ProxySettings,
    pub traffic: TrafficSettings,
    pub cache: CacheSettings,
    pub prewarm: PrewarmSettings,
    pub quota: QuotaSettings,
    /// One per `[credential.<name>]` section, in file order
    pub credentials: Vec<CredentialSettings>,
    /// One per `[region.<name>]` section; empty means built-in regions
    pub regions: Vec<Region>,
}

/// Decode proxy connection.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxySettings {
    pub base_url: String,
    /// HTTP timeout in seconds
    pub timeout_secs: u64,
}

/// Which tile store backs the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKind {
    Memory,
    Disk,
}

impl CacheKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CacheKind::Memory => "memory",
            CacheKind::Disk => "disk",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheSettings {
    pub provider: CacheKind,
    /// Root directory for the disk provider
    pub directory: PathBuf,
    /// Memory provider capacity in bytes
    pub memory_size: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrewarmSettings {
    pub interval_secs: u64,
    pub zoom: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuotaSettings {
    /// Day of month on which request counters are zeroed
    pub reset_day: u32,
    /// How often the reset job checks the date
    pub interval_secs: u64,
}

/// A provider credential and its request budget.
#[derive(Debug, Clone, PartialEq)]
pub struct CredentialSettings {
    /// Section suffix, e.g. `primary` for `[credential.primary]`
    pub name: String,
    pub provider: String,
    pub token: String,
    pub request_limit: u64,
    pub request_count: u64,
}

impl ConfigFile {
    /// Copies request counters from `credentials` onto the `[credential.*]`
    /// sections with the same token.
    ///
    /// Returns how many sections changed. Credentials with no matching
    /// section are ignored.
    pub fn apply_quota_counts(&mut self, credentials: &[ProviderCredential]) -> usize {
        let mut changed = 0;
        for section in &mut self.credentials {
            let Some(live) = credentials.iter().find(|c| c.token == section.token) else {
                continue;
            };
            if section.request_count != live.request_count {
                section.request_count = live.request_count;
                changed += 1;
            }
        }
        changed
    }
}
