//! Routes and their traffic adjustment.
//!
//! The adjusted duration of a route is
//!
//! ```text
//! traffic_duration = duration + congestion_delay + turn_delay + buffer
//! ```
//!
//! where `congestion_delay` comes from [`CongestionOverlay`] over the
//! simplified geometry and `turn_delay` from the first leg's intersections.

mod model;
pub mod overlay;
pub mod turns;

pub use model::{
    AdjustedRoute, Geometry, Intersection, Leg, Route, RouteResponse, Step, TrafficBreakdown,
};
pub use overlay::{
    segment_time, speed_for_road_class, CongestionOverlay, OverlayResult, DEFAULT_SPEED_KMH,
    KMH_TO_MS,
};
pub use turns::{intersection_delay, leg_turn_delay, route_turn_delay};

/// Fixed allowance added to every adjusted route, in seconds.
pub const DEFAULT_BUFFER_SECS: f64 = 60.0;
