//! Coordinate conversion and tile partitioning.
//!
//! Provides conversions between geographic coordinates (latitude/longitude)
//! and Web Mercator tile coordinates, and the partitioning of a bounding box
//! into bounded batches of tiles to fetch.

mod range;
mod types;

pub use range::{
    batch_tile_range, tile_range, TileBatch, TileEnvelope, TileRange, DEFAULT_MAX_TILES_HIGH,
    DEFAULT_MAX_TILES_WIDE,
};
pub use types::{
    BoundingBox, CoordError, TileCoord, MAX_LAT, MAX_LON, MAX_ZOOM, MIN_LAT, MIN_LON, MIN_ZOOM,
};

use std::f64::consts::PI;

/// Number of tiles along each axis at the given zoom.
#[inline]
pub fn tiles_per_axis(zoom: u8) -> u32 {
    1u32 << zoom
}

/// Fractional tile X for a longitude.
#[inline]
pub fn lon_to_tile_x(lon: f64, zoom: u8) -> f64 {
    (lon + 180.0) / 360.0 * f64::from(tiles_per_axis(zoom))
}

/// Fractional tile Y for a latitude.
///
/// Latitudes beyond the Web Mercator limit are clamped to it.
#[inline]
pub fn lat_to_tile_y(lat: f64, zoom: u8) -> f64 {
    let lat_rad = lat.clamp(MIN_LAT, MAX_LAT) * PI / 180.0;
    (1.0 - lat_rad.tan().asinh() / PI) / 2.0 * f64::from(tiles_per_axis(zoom))
}

/// Longitude of a fractional tile X.
#[inline]
pub fn tile_x_to_lon(x: f64, zoom: u8) -> f64 {
    x / f64::from(tiles_per_axis(zoom)) * 360.0 - 180.0
}

/// Latitude of a fractional tile Y (inverse Web Mercator).
#[inline]
pub fn tile_y_to_lat(y: f64, zoom: u8) -> f64 {
    let n = f64::from(tiles_per_axis(zoom));
    let lat_rad = (PI * (1.0 - 2.0 * y / n)).sinh().atan();
    lat_rad * 180.0 / PI
}

/// Converts geographic coordinates to tile coordinates.
///
/// # Arguments
///
/// * `lat` - Latitude in degrees (-85.05112878 to 85.05112878)
/// * `lon` - Longitude in degrees (-180.0 to 180.0)
/// * `zoom` - Zoom level (0 to 18)
///
/// # Returns
///
/// A `Result` containing the tile coordinates or an error if inputs are invalid.
#[inline]
pub fn to_tile_coords(lat: f64, lon: f64, zoom: u8) -> Result<TileCoord, CoordError> {
    if !(MIN_LAT..=MAX_LAT).contains(&lat) {
        return Err(CoordError::InvalidLatitude(lat));
    }
    if !(MIN_LON..=MAX_LON).contains(&lon) {
        return Err(CoordError::InvalidLongitude(lon));
    }
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom));
    }

    let n = tiles_per_axis(zoom);
    Ok(TileCoord {
        zoom,
        x: clamp_index(lon_to_tile_x(lon, zoom), n),
        y: clamp_index(lat_to_tile_y(lat, zoom), n),
    })
}

/// Converts tile coordinates back to geographic coordinates.
///
/// Returns the latitude/longitude of the tile's northwest corner.
#[inline]
pub fn tile_to_lat_lon(tile: &TileCoord) -> (f64, f64) {
    (
        tile_y_to_lat(f64::from(tile.y), tile.zoom),
        tile_x_to_lon(f64::from(tile.x), tile.zoom),
    )
}

/// Floors a fractional tile coordinate into `0..n`.
#[inline]
pub(crate) fn clamp_index(value: f64, n: u32) -> u32 {
    let floored = value.floor().max(0.0);
    if floored >= f64::from(n) {
        n - 1
    } else {
        floored as u32
    }
}
