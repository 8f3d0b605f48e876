//! Cache pre-warming regions.
//!
//! A region is a named bounding box whose congestion tiles are fetched ahead
//! of demand so route adjustments in that area are served from the store.
//! Regions come from `[region.*]` config sections, falling back to
//! [`default_regions`].

use serde::Serialize;

use crate::coord::BoundingBox;
use crate::traffic::FetchStats;

/// Zoom level used for pre-warming unless configured otherwise.
pub const DEFAULT_PREWARM_ZOOM: u8 = 11;

/// A named area to keep warm.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Region {
    pub name: String,
    pub bbox: BoundingBox,
}

impl Region {
    pub fn new(name: impl Into<String>, bbox: BoundingBox) -> Self {
        Self {
            name: name.into(),
            bbox,
        }
    }
}

/// Outcome of warming a list of regions.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PrewarmReport {
    /// Aggregate over all regions that completed
    pub stats: FetchStats,
    pub regions_warmed: Vec<String>,
    pub regions_failed: Vec<String>,
}

impl PrewarmReport {
    pub fn is_complete(&self) -> bool {
        self.regions_failed.is_empty()
    }
}

// (name, north, south, west, east)
const DEFAULT_REGIONS: &[(&str, f64, f64, f64, f64)] = &[
    ("Jeddah", 21.67, 21.27, 39.07, 39.32),
    ("Makkah", 21.52, 21.23, 39.62, 40.03),
    ("Riyadh", 25.00, 24.56, 46.55, 47.03),
    ("Madinah", 24.67, 24.33, 39.45, 39.75),
    ("Dammam", 26.60, 26.30, 50.00, 50.20),
    ("Tabuk", 28.60, 28.30, 36.50, 36.90),
    ("Buraydah", 26.43, 26.33, 43.95, 44.10),
    ("Abha", 18.30, 18.20, 42.45, 42.55),
    ("Taif", 21.30, 21.15, 40.35, 40.45),
    ("Hofuf", 25.40, 25.30, 49.55, 49.65),
    ("Qatif", 26.70, 26.50, 50.00, 50.20),
    ("Khobar", 26.30, 26.20, 50.10, 50.20),
];

/// Built-in regions used when none are configured.
pub fn default_regions() -> Vec<Region> {
    DEFAULT_REGIONS
        .iter()
        .map(|&(name, north, south, west, east)| {
            Region::new(
                name,
                BoundingBox {
                    north,
                    south,
                    east,
                    west,
                },
            )
        })
        .collect()
}

/// Looks up a region by case-insensitive name.
pub fn find_region<'a>(regions: &'a [Region], name: &str) -> Option<&'a Region> {
    regions.iter().find(|r| r.name.eq_ignore_ascii_case(name))
}
