//! Fetch statistics.

use std::ops::AddAssign;

use serde::Serialize;

/// Counters for one congestion fetch (or an aggregate of several).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FetchStats {
    /// Tiles in the (possibly clamped) range
    pub tiles_requested: usize,
    pub cache_hits: usize,
    /// Payloads received from the tile source, readable or not
    pub remote_fetches: usize,
    /// Tiles whose fetch or parse failed
    pub failed: usize,
    /// Tiles skipped because another task already claimed them
    pub duplicates: usize,
    /// Remote payloads the store refused to persist
    pub store_failures: usize,
    pub features: usize,
    pub batches: usize,
}

impl FetchStats {
    /// Requests charged against provider quota.
    pub fn quota_used(&self) -> usize {
        self.remote_fetches
    }
}

impl AddAssign for FetchStats {
    fn add_assign(&mut self, other: Self) {
        self.tiles_requested += other.tiles_requested;
        self.cache_hits += other.cache_hits;
        self.remote_fetches += other.remote_fetches;
        self.failed += other.failed;
        self.duplicates += other.duplicates;
        self.store_failures += other.store_failures;
        self.features += other.features;
        self.batches += other.batches;
    }
}
