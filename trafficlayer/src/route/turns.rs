//! Turn delays at intersections.

use super::model::{Intersection, Leg, Route};

/// Delay for going roughly straight.
pub const STRAIGHT_DELAY_SECS: f64 = 5.0;

/// Delay for a moderate turn.
pub const TURN_DELAY_SECS: f64 = 10.0;

/// Delay for a sharp turn or U-turn.
pub const SHARP_TURN_DELAY_SECS: f64 = 20.0;

/// Delay in seconds for passing through `intersection`.
///
/// The turn angle is the absolute difference of the exit and approach
/// bearings. Intersections without both bearings contribute nothing.
pub fn intersection_delay(intersection: &Intersection) -> f64 {
    let Some((bearing_in, bearing_out)) = intersection.turn_bearings() else {
        return 0.0;
    };

    let angle = (bearing_out - bearing_in).abs();
    if angle < 45 || angle > 315 {
        STRAIGHT_DELAY_SECS
    } else if angle > 135 && angle < 225 {
        SHARP_TURN_DELAY_SECS
    } else {
        TURN_DELAY_SECS
    }
}

/// Sum of intersection delays over every step of `leg`.
pub fn leg_turn_delay(leg: &Leg) -> f64 {
    leg.steps
        .iter()
        .flat_map(|step| &step.intersections)
        .map(intersection_delay)
        .sum()
}

/// Turn delay for a route, taken from its first leg.
pub fn route_turn_delay(route: &Route) -> f64 {
    route.legs.first().map(leg_turn_delay).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::model::Step;

    fn turn(bearing_in: i32, bearing_out: i32) -> Intersection {
        Intersection {
            in_index: Some(0),
            out_index: Some(1),
            bearings: vec![bearing_in, bearing_out],
            ..Default::default()
        }
    }

    #[test]
    fn test_angle_classes() {
        assert_eq!(intersection_delay(&turn(90, 100)), STRAIGHT_DELAY_SECS);
        assert_eq!(intersection_delay(&turn(0, 350)), STRAIGHT_DELAY_SECS);
        assert_eq!(intersection_delay(&turn(0, 180)), SHARP_TURN_DELAY_SECS);
        assert_eq!(intersection_delay(&turn(0, 90)), TURN_DELAY_SECS);
        assert_eq!(intersection_delay(&turn(0, 270)), TURN_DELAY_SECS);
    }

    #[test]
    fn test_boundaries_are_moderate() {
        assert_eq!(intersection_delay(&turn(0, 45)), TURN_DELAY_SECS);
        assert_eq!(intersection_delay(&turn(0, 315)), TURN_DELAY_SECS);
        assert_eq!(intersection_delay(&turn(0, 135)), TURN_DELAY_SECS);
        assert_eq!(intersection_delay(&turn(0, 225)), TURN_DELAY_SECS);
    }

    #[test]
    fn test_missing_bearings_contribute_nothing() {
        let departure = Intersection {
            out_index: Some(0),
            bearings: vec![90],
            ..Default::default()
        };
        assert_eq!(intersection_delay(&departure), 0.0);

        let broken = Intersection {
            in_index: Some(2),
            out_index: Some(0),
            bearings: vec![90],
            ..Default::default()
        };
        assert_eq!(intersection_delay(&broken), 0.0);
    }

    #[test]
    fn test_only_first_leg_counts() {
        let leg = |intersections: Vec<Intersection>| Leg {
            steps: vec![
                Step {
                    intersections,
                    ..Default::default()
                },
                Step {
                    intersections: vec![turn(0, 180)],
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let route = Route {
            geometry: Default::default(),
            legs: vec![leg(vec![turn(0, 10), turn(0, 90)]), leg(vec![turn(0, 90)])],
            distance: 0.0,
            duration: 0.0,
            traffic_duration: None,
            weight_name: None,
            weight: 0.0,
            extra: Default::default(),
        };

        assert_eq!(route_turn_delay(&route), 5.0 + 10.0 + 20.0);
    }
}
