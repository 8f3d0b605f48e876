//! Congestion features and payload parsing.
//!
//! A payload is a JSON document of the form
//!
//! ```json
//! {"features": [
//!   {"geometry": {"type": "LineString", "coordinates": [[lon, lat], ...]},
//!    "properties": {"congestion": "severe", "class": "motorway"}}
//! ]}
//! ```
//!
//! `coordinates` may also be a multi-line (`[[[lon, lat], ...], ...]`).
//! Invalid coordinate pairs are dropped; features left without a line of at
//! least two points are skipped.

use std::fmt;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::trace;

use crate::coord::BoundingBox;
use crate::geo::LonLat;

/// Congestion severity reported for a road stretch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CongestionLevel {
    Unknown,
    Low,
    Moderate,
    Heavy,
    Severe,
}

impl CongestionLevel {
    /// Parses a level name. Unrecognized names map to `Unknown`.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "low" => Self::Low,
            "moderate" => Self::Moderate,
            "heavy" => Self::Heavy,
            "severe" => Self::Severe,
            _ => Self::Unknown,
        }
    }

    /// Travel-time multiplier for a segment at this level.
    pub const fn weight(self) -> f64 {
        match self {
            Self::Unknown => 1.0,
            Self::Low => 1.0,
            Self::Moderate => 1.4,
            Self::Heavy => 1.75,
            Self::Severe => 3.0,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::Heavy => "heavy",
            Self::Severe => "severe",
        }
    }
}

impl fmt::Display for CongestionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One congested road stretch.
#[derive(Debug, Clone, PartialEq)]
pub struct CongestionFeature {
    /// One or more polylines, each with at least two points
    pub lines: Vec<Vec<LonLat>>,
    pub level: CongestionLevel,
    /// Road class such as `motorway`; empty when absent
    pub road_class: String,
    /// Envelope of all points in `lines`
    pub bounds: BoundingBox,
}

impl CongestionFeature {
    /// Builds a feature, dropping lines with fewer than two points.
    ///
    /// Returns `None` if no line remains.
    pub fn new(
        lines: Vec<Vec<LonLat>>,
        level: CongestionLevel,
        road_class: impl Into<String>,
    ) -> Option<Self> {
        let lines: Vec<Vec<LonLat>> = lines.into_iter().filter(|l| l.len() >= 2).collect();
        let points: Vec<LonLat> = lines.iter().flatten().copied().collect();
        let bounds = BoundingBox::from_geometry(&points).ok()?;

        Some(Self {
            lines,
            level,
            road_class: road_class.into(),
            bounds,
        })
    }
}

/// A payload that is not a JSON object with an optional `features` array.
#[derive(Debug, Error)]
#[error("Invalid congestion payload: {0}")]
pub struct PayloadError(#[from] serde_json::Error);

#[derive(Deserialize)]
struct RawPayload {
    #[serde(default)]
    features: Vec<Value>,
}

#[derive(Deserialize)]
struct RawFeature {
    geometry: Option<RawGeometry>,
    #[serde(default)]
    properties: RawProperties,
}

#[derive(Deserialize)]
struct RawGeometry {
    #[serde(default)]
    coordinates: Value,
}

#[derive(Deserialize, Default)]
struct RawProperties {
    congestion: Option<String>,
    class: Option<String>,
}

/// Parses a raw tile payload into congestion features.
///
/// # Errors
///
/// Fails only if the document itself is unreadable. Individual malformed
/// features are skipped.
pub fn parse_payload(data: &[u8]) -> Result<Vec<CongestionFeature>, PayloadError> {
    let payload: RawPayload = serde_json::from_slice(data)?;
    let total = payload.features.len();

    let features: Vec<CongestionFeature> = payload
        .features
        .into_iter()
        .filter_map(parse_feature)
        .collect();

    if features.len() < total {
        trace!(total, kept = features.len(), "Skipped invalid congestion features");
    }
    Ok(features)
}

fn parse_feature(value: Value) -> Option<CongestionFeature> {
    let raw: RawFeature = serde_json::from_value(value).ok()?;
    let geometry = raw.geometry?;
    let level = raw
        .properties
        .congestion
        .as_deref()
        .map(CongestionLevel::parse)
        .unwrap_or(CongestionLevel::Unknown);

    CongestionFeature::new(
        parse_lines(&geometry.coordinates),
        level,
        raw.properties.class.unwrap_or_default(),
    )
}

/// Accepts a single line or a multi-line.
fn parse_lines(coordinates: &Value) -> Vec<Vec<LonLat>> {
    let Some(outer) = coordinates.as_array() else {
        return Vec::new();
    };

    let is_multi = outer
        .iter()
        .find_map(|item| item.as_array())
        .and_then(|first| first.first())
        .is_some_and(Value::is_array);

    if is_multi {
        outer
            .iter()
            .filter_map(Value::as_array)
            .map(|line| parse_points(line))
            .collect()
    } else {
        vec![parse_points(outer)]
    }
}

fn parse_points(items: &[Value]) -> Vec<LonLat> {
    items.iter().filter_map(parse_point).collect()
}

fn parse_point(item: &Value) -> Option<LonLat> {
    let pair = item.as_array()?;
    if pair.len() < 2 {
        return None;
    }
    let point = LonLat::new(pair[0].as_f64()?, pair[1].as_f64()?);
    point.is_finite().then_some(point)
}
