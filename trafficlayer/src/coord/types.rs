//! Coordinate type definitions

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::geo::LonLat;

/// Web Mercator valid latitude range
pub const MIN_LAT: f64 = -85.05112878;
pub const MAX_LAT: f64 = 85.05112878;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Supported zoom levels for congestion tiles
pub const MIN_ZOOM: u8 = 0;
pub const MAX_ZOOM: u8 = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TileCoord {
    /// Zoom level (0-18)
    pub zoom: u8,
    /// X coordinate (east-west), 0 at west
    pub x: u32,
    /// Y coordinate (north-south), 0 at north
    pub y: u32,
}

impl TileCoord {
    pub const fn new(zoom: u8, x: u32, y: u32) -> Self {
        Self { zoom, x, y }
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

/// A latitude/longitude rectangle in degrees.
///
/// Always normalized so that `north >= south` and `east >= west`. Boxes
/// crossing the antimeridian are not representable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl BoundingBox {
    /// Creates a normalized bounding box.
    ///
    /// Inverted edges are swapped rather than rejected.
    ///
    /// # Errors
    ///
    /// Returns `CoordError::InvalidBoundingBox` if any edge is not finite.
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Result<Self, CoordError> {
        if ![north, south, east, west].iter().all(|v| v.is_finite()) {
            return Err(CoordError::InvalidBoundingBox(format!(
                "non-finite edge in n={} s={} e={} w={}",
                north, south, east, west
            )));
        }

        Ok(Self {
            north: north.max(south),
            south: north.min(south),
            east: east.max(west),
            west: east.min(west),
        })
    }

    /// Computes the min/max envelope of a point sequence.
    ///
    /// # Errors
    ///
    /// Returns `CoordError::InvalidBoundingBox` for an empty sequence or
    /// one containing non-finite coordinates.
    pub fn from_geometry(points: &[LonLat]) -> Result<Self, CoordError> {
        let first = points
            .first()
            .ok_or_else(|| CoordError::InvalidBoundingBox("empty geometry".to_string()))?;

        let mut bbox = Self {
            north: first.lat,
            south: first.lat,
            east: first.lon,
            west: first.lon,
        };
        for point in points {
            if !point.is_finite() {
                return Err(CoordError::InvalidBoundingBox(format!(
                    "non-finite point [{}, {}]",
                    point.lon, point.lat
                )));
            }
            bbox.north = bbox.north.max(point.lat);
            bbox.south = bbox.south.min(point.lat);
            bbox.east = bbox.east.max(point.lon);
            bbox.west = bbox.west.min(point.lon);
        }

        Ok(bbox)
    }

    /// Center of the box in degrees.
    pub fn center(&self) -> LonLat {
        LonLat::new((self.west + self.east) / 2.0, (self.north + self.south) / 2.0)
    }

    /// Returns true if the point lies inside or on the edge of the box.
    pub fn contains(&self, point: LonLat) -> bool {
        point.lat <= self.north
            && point.lat >= self.south
            && point.lon <= self.east
            && point.lon >= self.west
    }

    /// Returns true if the two boxes share at least one point.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.west <= other.east
            && other.west <= self.east
            && self.south <= other.north
            && other.south <= self.north
    }
}

/// Errors that can occur during coordinate conversion.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordError {
    /// Latitude outside the Web Mercator range
    #[error("Invalid latitude: {0} (must be between {MIN_LAT} and {MAX_LAT})")]
    InvalidLatitude(f64),

    /// Longitude outside -180..180
    #[error("Invalid longitude: {0} (must be between {MIN_LON} and {MAX_LON})")]
    InvalidLongitude(f64),

    /// Zoom level above the supported maximum
    #[error("Invalid zoom level: {0} (must be between {MIN_ZOOM} and {MAX_ZOOM})")]
    InvalidZoom(u8),

    /// Bounding box could not be built
    #[error("Invalid bounding box: {0}")]
    InvalidBoundingBox(String),
}
