//! Congestion overlay.
//!
//! Walks the segments of a simplified route and charges extra time for
//! every segment crossing a congested road stretch. Severe features are
//! tried first; heavy and moderate ones only when no severe feature
//! matches. Within a pass the first intersecting feature wins.

use tracing::trace;

use crate::coord::BoundingBox;
use crate::geo::{haversine_distance, segments_intersect, LonLat, Segment};
use crate::traffic::{CongestionFeature, CongestionLevel};

/// Converts km/h to m/s.
pub const KMH_TO_MS: f64 = 1000.0 / 3600.0;

/// Speed assumed for road classes missing from the table.
pub const DEFAULT_SPEED_KMH: f64 = 25.0;

/// Bounds checks are padded so segments touching a feature's edge still
/// reach the exact intersection test.
const BOUNDS_PADDING: f64 = 1e-9;

/// Free-flow speed in km/h for a road class.
pub fn speed_for_road_class(class: &str) -> f64 {
    match class {
        "motorway" => 100.0,
        "trunk" => 80.0,
        "primary" => 70.0,
        "secondary" => 60.0,
        "tertiary" => 50.0,
        "residential" => 30.0,
        "service" => 20.0,
        "unclassified" => 25.0,
        "pedestrian" => 5.0,
        "motorway_link" => 60.0,
        "trunk_link" => 50.0,
        "primary_link" => 40.0,
        "secondary_link" => 35.0,
        _ => DEFAULT_SPEED_KMH,
    }
}

/// Seconds to travel `segment` at the free-flow speed of `class`.
pub fn segment_time(segment: &Segment, class: &str) -> f64 {
    haversine_distance(segment.start, segment.end) / (speed_for_road_class(class) * KMH_TO_MS)
}

/// Result of overlaying congestion onto a route.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OverlayResult {
    /// Extra seconds charged for congested segments
    pub congestion_delay: f64,
    pub segments_evaluated: usize,
    pub segments_congested: usize,
}

/// Congestion features split by the pass they take part in.
pub struct CongestionOverlay<'a> {
    severe: Vec<&'a CongestionFeature>,
    secondary: Vec<&'a CongestionFeature>,
}

impl<'a> CongestionOverlay<'a> {
    /// Indexes `features`, keeping their order. Low and unknown features
    /// are dropped since they never add time.
    pub fn new(features: &'a [CongestionFeature]) -> Self {
        let mut severe = Vec::new();
        let mut secondary = Vec::new();
        for feature in features {
            match feature.level {
                CongestionLevel::Severe => severe.push(feature),
                CongestionLevel::Heavy | CongestionLevel::Moderate => secondary.push(feature),
                CongestionLevel::Low | CongestionLevel::Unknown => {}
            }
        }
        Self { severe, secondary }
    }

    /// Number of features able to add time.
    pub fn len(&self) -> usize {
        self.severe.len() + self.secondary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The feature charged for `segment`, if any.
    pub fn matching_feature(&self, segment: &Segment) -> Option<&'a CongestionFeature> {
        let bounds = segment_bounds(segment);
        let hit = |feature: &&&'a CongestionFeature| {
            boxes_overlap(&bounds, &feature.bounds) && feature_intersects(feature, segment)
        };

        self.severe
            .iter()
            .find(hit)
            .or_else(|| self.secondary.iter().find(hit))
            .copied()
    }

    /// Charges congestion along consecutive pairs of `points`.
    pub fn evaluate(&self, points: &[LonLat]) -> OverlayResult {
        let mut result = OverlayResult::default();

        for pair in points.windows(2) {
            let segment = Segment::new(pair[0], pair[1]);
            result.segments_evaluated += 1;

            if let Some(feature) = self.matching_feature(&segment) {
                let extra = feature.level.weight() * segment_time(&segment, &feature.road_class);
                trace!(
                    level = %feature.level,
                    class = %feature.road_class,
                    extra_secs = extra,
                    "Segment crosses congestion"
                );
                result.congestion_delay += extra;
                result.segments_congested += 1;
            }
        }

        result
    }
}

fn feature_intersects(feature: &CongestionFeature, segment: &Segment) -> bool {
    feature.lines.iter().any(|line| {
        line.windows(2)
            .any(|pair| segments_intersect(segment, &Segment::new(pair[0], pair[1])))
    })
}

fn segment_bounds(segment: &Segment) -> BoundingBox {
    BoundingBox {
        north: segment.start.lat.max(segment.end.lat),
        south: segment.start.lat.min(segment.end.lat),
        east: segment.start.lon.max(segment.end.lon),
        west: segment.start.lon.min(segment.end.lon),
    }
}

fn boxes_overlap(a: &BoundingBox, b: &BoundingBox) -> bool {
    a.west <= b.east + BOUNDS_PADDING
        && b.west <= a.east + BOUNDS_PADDING
        && a.south <= b.north + BOUNDS_PADDING
        && b.south <= a.north + BOUNDS_PADDING
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature(points: &[(f64, f64)], level: CongestionLevel, class: &str) -> CongestionFeature {
        let line = points.iter().map(|&(lon, lat)| LonLat::new(lon, lat)).collect();
        CongestionFeature::new(vec![line], level, class).unwrap()
    }

    #[test]
    fn test_speed_table() {
        assert_eq!(speed_for_road_class("motorway"), 100.0);
        assert_eq!(speed_for_road_class("secondary_link"), 35.0);
        assert_eq!(speed_for_road_class("pedestrian"), 5.0);
        assert_eq!(speed_for_road_class(""), DEFAULT_SPEED_KMH);
        assert_eq!(speed_for_road_class("bridleway"), DEFAULT_SPEED_KMH);
    }

    #[test]
    fn test_segment_time_motorway() {
        let segment = Segment::new(LonLat::new(39.0, 21.0), LonLat::new(39.01, 21.0));
        let expected = haversine_distance(segment.start, segment.end) / (100.0 * KMH_TO_MS);
        assert!((segment_time(&segment, "motorway") - expected).abs() < 1e-9);
    }

    #[test]
    fn test_severe_overlap_adds_weighted_time() {
        let route = [LonLat::new(39.0, 21.0), LonLat::new(39.01, 21.0)];
        let features = vec![feature(
            &[(39.0, 21.0), (39.01, 21.0)],
            CongestionLevel::Severe,
            "motorway",
        )];

        let result = CongestionOverlay::new(&features).evaluate(&route);
        let expected = 3.0 * haversine_distance(route[0], route[1]) / (100.0 * KMH_TO_MS);

        assert_eq!(result.segments_evaluated, 1);
        assert_eq!(result.segments_congested, 1);
        assert!((result.congestion_delay - expected).abs() < 1e-6);
    }

    #[test]
    fn test_severe_wins_over_earlier_heavy() {
        let route = [LonLat::new(0.0, 0.0), LonLat::new(1.0, 1.0)];
        let features = vec![
            feature(&[(0.0, 1.0), (1.0, 0.0)], CongestionLevel::Heavy, "primary"),
            feature(&[(0.0, 0.8), (0.8, 0.0)], CongestionLevel::Severe, "residential"),
        ];
        let overlay = CongestionOverlay::new(&features);

        let hit = overlay
            .matching_feature(&Segment::new(route[0], route[1]))
            .unwrap();
        assert_eq!(hit.level, CongestionLevel::Severe);
    }

    #[test]
    fn test_first_match_wins_within_pass() {
        let features = vec![
            feature(&[(0.0, 1.0), (1.0, 0.0)], CongestionLevel::Moderate, "primary"),
            feature(&[(0.0, 0.8), (0.8, 0.0)], CongestionLevel::Heavy, "motorway"),
        ];
        let overlay = CongestionOverlay::new(&features);

        let hit = overlay
            .matching_feature(&Segment::new(LonLat::new(0.0, 0.0), LonLat::new(1.0, 1.0)))
            .unwrap();
        assert_eq!(hit.level, CongestionLevel::Moderate);
    }

    #[test]
    fn test_low_and_unknown_never_trigger() {
        let features = vec![
            feature(&[(0.0, 1.0), (1.0, 0.0)], CongestionLevel::Low, "motorway"),
            feature(&[(0.0, 1.0), (1.0, 0.0)], CongestionLevel::Unknown, "motorway"),
        ];
        let overlay = CongestionOverlay::new(&features);
        assert!(overlay.is_empty());

        let result = overlay.evaluate(&[LonLat::new(0.0, 0.0), LonLat::new(1.0, 1.0)]);
        assert_eq!(result.congestion_delay, 0.0);
        assert_eq!(result.segments_evaluated, 1);
    }

    #[test]
    fn test_disjoint_features_add_nothing() {
        let features = vec![feature(
            &[(10.0, 10.0), (11.0, 11.0)],
            CongestionLevel::Severe,
            "motorway",
        )];
        let result = CongestionOverlay::new(&features).evaluate(&[
            LonLat::new(0.0, 0.0),
            LonLat::new(1.0, 0.0),
            LonLat::new(2.0, 0.0),
        ]);

        assert_eq!(result.segments_evaluated, 2);
        assert_eq!(result.segments_congested, 0);
        assert_eq!(result.congestion_delay, 0.0);
    }

    #[test]
    fn test_single_point_route_has_no_segments() {
        let features = Vec::new();
        let result = CongestionOverlay::new(&features).evaluate(&[LonLat::new(0.0, 0.0)]);
        assert_eq!(result, OverlayResult::default());
    }
}
