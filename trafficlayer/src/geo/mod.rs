//! Geometry utilities.
//!
//! Pure functions over `[lon, lat]` points: great-circle distance, planar
//! perpendicular distance, segment intersection, and polyline simplification.
//! Nothing in this module performs I/O.

mod intersect;
pub mod simplify;

pub use intersect::{segments_intersect, Segment};
pub use simplify::{douglas_peucker, pre_simplify, simplify_route};

use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters used by [`haversine_distance`].
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A geographic point in degrees.
///
/// Serialized as a `[lon, lat]` pair, the order used by GeoJSON and OSRM.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    /// Creates a point from longitude and latitude in degrees.
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Returns true if both components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }
}

impl From<[f64; 2]> for LonLat {
    fn from(pair: [f64; 2]) -> Self {
        Self::new(pair[0], pair[1])
    }
}

impl From<LonLat> for [f64; 2] {
    fn from(point: LonLat) -> Self {
        [point.lon, point.lat]
    }
}

/// Converts degrees to radians.
#[inline]
pub fn degrees_to_radians(degrees: f64) -> f64 {
    degrees * std::f64::consts::PI / 180.0
}

/// Converts radians to degrees.
#[inline]
pub fn radians_to_degrees(radians: f64) -> f64 {
    radians * 180.0 / std::f64::consts::PI
}

/// Great-circle distance between two points in meters.
pub fn haversine_distance(a: LonLat, b: LonLat) -> f64 {
    let lat1 = degrees_to_radians(a.lat);
    let lat2 = degrees_to_radians(b.lat);
    let d_lat = lat2 - lat1;
    let d_lon = degrees_to_radians(b.lon - a.lon);

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Planar distance from `point` to the infinite line through `start` and `end`.
///
/// Works directly in degree space. When `start == end` the distance to
/// `start` is returned.
pub fn perpendicular_distance(point: LonLat, start: LonLat, end: LonLat) -> f64 {
    let dx = end.lon - start.lon;
    let dy = end.lat - start.lat;

    if dx == 0.0 && dy == 0.0 {
        return (point.lon - start.lon).hypot(point.lat - start.lat);
    }

    let numerator = (dy * point.lon - dx * point.lat + end.lon * start.lat - end.lat * start.lon).abs();
    numerator / dx.hypot(dy)
}
