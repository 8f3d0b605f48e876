//! Route geometry simplification.
//!
//! Two passes bound the cost of the congestion overlay:
//!
//! 1. [`pre_simplify`] snaps points to a coarse grid and keeps the first
//!    point seen in each cell. O(n), removes dense GPS-like clusters.
//! 2. [`douglas_peucker`] removes points that deviate from the chord by no
//!    more than the tolerance.
//!
//! Both operate in degree space.

use std::collections::HashSet;

use super::{perpendicular_distance, LonLat};

/// Keeps the first point per occupied grid cell, preserving order.
///
/// Each coordinate is divided by `grid_size` and rounded; points mapping to
/// an already-occupied cell are dropped. A non-positive or non-finite grid
/// size disables bucketing and returns the input unchanged.
pub fn pre_simplify(points: &[LonLat], grid_size: f64) -> Vec<LonLat> {
    if !(grid_size.is_finite() && grid_size > 0.0) {
        return points.to_vec();
    }

    let mut occupied: HashSet<(i64, i64)> = HashSet::with_capacity(points.len());
    let mut simplified = Vec::with_capacity(points.len());

    for point in points {
        let cell = (
            (point.lon / grid_size).round() as i64,
            (point.lat / grid_size).round() as i64,
        );
        if occupied.insert(cell) {
            simplified.push(*point);
        }
    }

    simplified
}

/// Douglas-Peucker polyline simplification.
///
/// The first and last points are always kept. Inputs with fewer than three
/// points are returned unchanged. Ties for the farthest point resolve to the
/// earliest index, which makes the result idempotent.
pub fn douglas_peucker(points: &[LonLat], tolerance: f64) -> Vec<LonLat> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let last = points.len() - 1;
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[last] = true;

    // Pending (start, end) index ranges
    let mut ranges = vec![(0usize, last)];
    while let Some((start, end)) = ranges.pop() {
        if end <= start + 1 {
            continue;
        }

        let mut max_distance = 0.0;
        let mut index = start;
        for (i, point) in points.iter().enumerate().take(end).skip(start + 1) {
            let distance = perpendicular_distance(*point, points[start], points[end]);
            if distance > max_distance {
                max_distance = distance;
                index = i;
            }
        }

        if max_distance > tolerance {
            keep[index] = true;
            ranges.push((index, end));
            ranges.push((start, index));
        }
    }

    points
        .iter()
        .zip(keep)
        .filter_map(|(point, kept)| kept.then_some(*point))
        .collect()
}

/// Grid pre-bucketing followed by Douglas-Peucker.
pub fn simplify_route(points: &[LonLat], grid_size: f64, tolerance: f64) -> Vec<LonLat> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let pre = pre_simplify(points, grid_size);
    douglas_peucker(&pre, tolerance)
}
