//! Tile ranges and fetch batches.
//!
//! A bounding box at a given zoom covers a rectangular grid of tiles. Large
//! boxes are clamped to a maximum envelope around their center so a single
//! request never fans out into an unbounded number of tile fetches. The
//! resulting range is then cut into batches; quota is reserved per batch.

use std::ops::RangeInclusive;

use super::types::{BoundingBox, CoordError, TileCoord, MAX_ZOOM};
use super::{clamp_index, lat_to_tile_y, lon_to_tile_x, tile_x_to_lon, tile_y_to_lat, tiles_per_axis};

/// Default maximum number of tiles along the x axis.
pub const DEFAULT_MAX_TILES_WIDE: u32 = 40;

/// Default maximum number of tiles along the y axis.
pub const DEFAULT_MAX_TILES_HIGH: u32 = 50;

/// Maximum tile extent of a single range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileEnvelope {
    pub max_wide: u32,
    pub max_high: u32,
}

impl TileEnvelope {
    /// Creates an envelope. Zero extents are raised to one tile.
    pub fn new(max_wide: u32, max_high: u32) -> Self {
        Self {
            max_wide: max_wide.max(1),
            max_high: max_high.max(1),
        }
    }
}

impl Default for TileEnvelope {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TILES_WIDE, DEFAULT_MAX_TILES_HIGH)
    }
}

/// Inclusive rectangle of tile indices at one zoom level.
#[derive(Debug, Clone, PartialEq)]
pub struct TileRange {
    pub zoom: u8,
    pub x_min: u32,
    pub x_max: u32,
    pub y_min: u32,
    pub y_max: u32,
    /// The recentered box, present only when the input exceeded the envelope.
    pub clamped: Option<BoundingBox>,
}

impl TileRange {
    pub fn xs(&self) -> RangeInclusive<u32> {
        self.x_min..=self.x_max
    }

    pub fn ys(&self) -> RangeInclusive<u32> {
        self.y_min..=self.y_max
    }

    /// Number of tile columns.
    pub fn width(&self) -> u32 {
        self.x_max - self.x_min + 1
    }

    /// Number of tile rows.
    pub fn height(&self) -> u32 {
        self.y_max - self.y_min + 1
    }

    pub fn tile_count(&self) -> usize {
        self.width() as usize * self.height() as usize
    }

    pub fn was_clamped(&self) -> bool {
        self.clamped.is_some()
    }

    /// Iterates tiles row by row.
    pub fn tiles(&self) -> impl Iterator<Item = TileCoord> + '_ {
        self.ys()
            .flat_map(move |y| self.xs().map(move |x| TileCoord::new(self.zoom, x, y)))
    }
}

/// Computes the tile range covering `bbox` at `zoom`.
///
/// Corners are projected with the slippy-map formulas and floored to tile
/// indices. When an axis spans more tiles than `envelope` allows, that axis
/// is recentered on the box center and shrunk to exactly the maximum number
/// of tiles. Latitude recentering happens in projected (tile) space.
///
/// # Arguments
///
/// * `bbox` - Normalized bounding box in degrees
/// * `zoom` - Zoom level (0 to 18)
/// * `envelope` - Maximum tiles per axis
///
/// # Errors
///
/// Returns `CoordError::InvalidZoom` if `zoom` exceeds the supported maximum.
pub fn tile_range(
    bbox: &BoundingBox,
    zoom: u8,
    envelope: TileEnvelope,
) -> Result<TileRange, CoordError> {
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom));
    }

    let n = tiles_per_axis(zoom);
    let mut range = TileRange {
        zoom,
        x_min: clamp_index(lon_to_tile_x(bbox.west, zoom), n),
        x_max: clamp_index(lon_to_tile_x(bbox.east, zoom), n),
        y_min: clamp_index(lat_to_tile_y(bbox.north, zoom), n),
        y_max: clamp_index(lat_to_tile_y(bbox.south, zoom), n),
        clamped: None,
    };

    let exceeds_x = range.width() > envelope.max_wide;
    let exceeds_y = range.height() > envelope.max_high;
    if !exceeds_x && !exceeds_y {
        return Ok(range);
    }

    let center = bbox.center();
    let mut clamped = *bbox;

    if exceeds_x {
        let window = centered_window(lon_to_tile_x(center.lon, zoom), envelope.max_wide, n);
        range.x_min = window.first;
        range.x_max = window.first + envelope.max_wide - 1;
        clamped.west = tile_x_to_lon(window.low, zoom);
        clamped.east = tile_x_to_lon(window.high, zoom);
    }

    if exceeds_y {
        let window = centered_window(lat_to_tile_y(center.lat, zoom), envelope.max_high, n);
        range.y_min = window.first;
        range.y_max = window.first + envelope.max_high - 1;
        // Tile y grows southwards
        clamped.north = tile_y_to_lat(window.low, zoom);
        clamped.south = tile_y_to_lat(window.high, zoom);
    }

    range.clamped = Some(clamped);
    Ok(range)
}

/// A span of `high - low` fractional tiles and the first tile it selects.
struct Window {
    low: f64,
    high: f64,
    first: u32,
}

/// Places a window of `span` tiles around `center`, shifted to stay inside
/// `0..n`. A tile belongs to the window when its center lies in `[low, high)`,
/// which selects exactly `span` tiles.
///
/// Requires `span < n`, which holds whenever an axis exceeds the envelope.
fn centered_window(center: f64, span: u32, n: u32) -> Window {
    let half = f64::from(span) / 2.0;
    let low = (center - half).clamp(0.0, f64::from(n - span));
    let high = low + f64::from(span);
    let first = (low - 0.5).ceil().max(0.0) as u32;

    Window { low, high, first }
}

/// A rectangular sub-grid of tiles fetched under one quota reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileBatch {
    pub zoom: u8,
    pub xs: RangeInclusive<u32>,
    pub ys: RangeInclusive<u32>,
}

impl TileBatch {
    pub fn tile_count(&self) -> usize {
        let width = (*self.xs.end() - *self.xs.start() + 1) as usize;
        let height = (*self.ys.end() - *self.ys.start() + 1) as usize;
        width * height
    }

    pub fn tiles(&self) -> impl Iterator<Item = TileCoord> + '_ {
        self.xs.clone().flat_map(move |x| {
            self.ys
                .clone()
                .map(move |y| TileCoord::new(self.zoom, x, y))
        })
    }
}

/// Splits a range into batches of at most `batch_size` indices per axis.
///
/// The x and y index lists are chunked independently and the batches are
/// the cross product of x-chunks and y-chunks. A `batch_size` of zero is
/// treated as one.
pub fn batch_tile_range(range: &TileRange, batch_size: u32) -> Vec<TileBatch> {
    let size = batch_size.max(1);
    let x_chunks = chunk_indices(range.x_min, range.x_max, size);
    let y_chunks = chunk_indices(range.y_min, range.y_max, size);

    let mut batches = Vec::with_capacity(x_chunks.len() * y_chunks.len());
    for xs in &x_chunks {
        for ys in &y_chunks {
            batches.push(TileBatch {
                zoom: range.zoom,
                xs: xs.clone(),
                ys: ys.clone(),
            });
        }
    }
    batches
}

fn chunk_indices(min: u32, max: u32, size: u32) -> Vec<RangeInclusive<u32>> {
    let mut chunks = Vec::new();
    let mut start = min;
    loop {
        let end = start.saturating_add(size - 1).min(max);
        chunks.push(start..=end);
        if end >= max {
            break;
        }
        start = end + 1;
    }
    chunks
}
