//! Segment–segment intersection.
//!
//! Classic orientation test: two segments intersect when the endpoints of
//! each lie on opposite sides of the other. Collinear configurations fall
//! back to a bounding-box containment check.

use super::LonLat;

/// Cross products smaller than this are treated as collinear.
const COLLINEAR_EPSILON: f64 = 1e-10;

/// A line segment between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: LonLat,
    pub end: LonLat,
}

impl Segment {
    pub const fn new(start: LonLat, end: LonLat) -> Self {
        Self { start, end }
    }

    /// Returns true if this segment intersects `other`.
    pub fn intersects(&self, other: &Segment) -> bool {
        segments_intersect(self, other)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Orientation {
    Collinear,
    Clockwise,
    CounterClockwise,
}

fn orientation(p: LonLat, q: LonLat, r: LonLat) -> Orientation {
    let val = (q.lat - p.lat) * (r.lon - q.lon) - (q.lon - p.lon) * (r.lat - q.lat);
    if val.abs() < COLLINEAR_EPSILON {
        Orientation::Collinear
    } else if val > 0.0 {
        Orientation::Clockwise
    } else {
        Orientation::CounterClockwise
    }
}

/// Whether `q` lies within the bounding box of segment `p`–`r`.
fn on_segment(p: LonLat, q: LonLat, r: LonLat) -> bool {
    q.lon <= p.lon.max(r.lon)
        && q.lon >= p.lon.min(r.lon)
        && q.lat <= p.lat.max(r.lat)
        && q.lat >= p.lat.min(r.lat)
}

/// Returns true if the two segments share at least one point.
///
/// Segments containing a non-finite coordinate never intersect. The test is
/// symmetric: `segments_intersect(a, b) == segments_intersect(b, a)`.
pub fn segments_intersect(a: &Segment, b: &Segment) -> bool {
    let (p1, q1) = (a.start, a.end);
    let (p2, q2) = (b.start, b.end);

    if !(p1.is_finite() && q1.is_finite() && p2.is_finite() && q2.is_finite()) {
        return false;
    }

    let o1 = orientation(p1, q1, p2);
    let o2 = orientation(p1, q1, q2);
    let o3 = orientation(p2, q2, p1);
    let o4 = orientation(p2, q2, q1);

    if o1 != o2 && o3 != o4 {
        return true;
    }

    (o1 == Orientation::Collinear && on_segment(p1, p2, q1))
        || (o2 == Orientation::Collinear && on_segment(p1, q2, q1))
        || (o3 == Orientation::Collinear && on_segment(p2, p1, q2))
        || (o4 == Orientation::Collinear && on_segment(p2, q1, q2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn seg(a: (f64, f64), b: (f64, f64)) -> Segment {
        Segment::new(LonLat::new(a.0, a.1), LonLat::new(b.0, b.1))
    }

    #[test]
    fn test_crossing_segments() {
        let a = seg((0.0, 0.0), (2.0, 2.0));
        let b = seg((0.0, 2.0), (2.0, 0.0));
        assert!(segments_intersect(&a, &b));
    }

    #[test]
    fn test_parallel_segments_do_not_intersect() {
        let a = seg((0.0, 0.0), (2.0, 0.0));
        let b = seg((0.0, 1.0), (2.0, 1.0));
        assert!(!segments_intersect(&a, &b));
    }

    #[test]
    fn test_collinear_overlapping_segments() {
        let a = seg((0.0, 0.0), (2.0, 0.0));
        let b = seg((1.0, 0.0), (3.0, 0.0));
        assert!(segments_intersect(&a, &b));
    }

    #[test]
    fn test_collinear_disjoint_segments() {
        let a = seg((0.0, 0.0), (1.0, 0.0));
        let b = seg((2.0, 0.0), (3.0, 0.0));
        assert!(!segments_intersect(&a, &b));
    }

    #[test]
    fn test_touching_at_endpoint() {
        let a = seg((0.0, 0.0), (1.0, 1.0));
        let b = seg((1.0, 1.0), (2.0, 0.0));
        assert!(segments_intersect(&a, &b));
    }

    #[test]
    fn test_identical_segments() {
        let a = seg((39.1, 21.5), (39.2, 21.6));
        assert!(segments_intersect(&a, &a));
    }

    #[test]
    fn test_nan_never_intersects() {
        let a = seg((f64::NAN, 0.0), (1.0, 1.0));
        let b = seg((0.0, 1.0), (1.0, 0.0));
        assert!(!segments_intersect(&a, &b));
        assert!(!segments_intersect(&b, &a));
    }

    fn coord() -> impl Strategy<Value = (f64, f64)> {
        (-10.0f64..10.0, -10.0f64..10.0)
    }

    proptest! {
        #[test]
        fn prop_intersection_is_symmetric(a in coord(), b in coord(), c in coord(), d in coord()) {
            let s1 = seg(a, b);
            let s2 = seg(c, d);
            prop_assert_eq!(segments_intersect(&s1, &s2), segments_intersect(&s2, &s1));
        }

        #[test]
        fn prop_segment_intersects_itself(a in coord(), b in coord()) {
            let s = seg(a, b);
            prop_assert!(s.intersects(&s));
        }
    }
}
