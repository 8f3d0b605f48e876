//! OSRM-shaped route response model.
//!
//! Only the fields the adjustment reads are typed. Everything else a routing
//! engine returns is kept in the `extra` maps so a response survives a
//! read-adjust-write round trip.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::geo::LonLat;
use crate::traffic::FetchStats;

/// Top-level routing-engine response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResponse {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub routes: Vec<Route>,
    #[serde(default)]
    pub waypoints: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RouteResponse {
    /// Parses a response from JSON bytes.
    pub fn from_slice(data: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(data)
    }

    /// The first route, which is the one the engine recommends.
    pub fn first_route(&self) -> Option<&Route> {
        self.routes.first()
    }
}

/// One route alternative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    #[serde(default)]
    pub geometry: Geometry,
    #[serde(default)]
    pub legs: Vec<Leg>,
    /// Meters
    #[serde(default)]
    pub distance: f64,
    /// Seconds, free-flow
    #[serde(default)]
    pub duration: f64,
    /// Seconds, congestion-adjusted. Absent until adjusted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traffic_duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_name: Option<String>,
    #[serde(default)]
    pub weight: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Route {
    /// Marks the route as unadjusted: traffic duration equals duration.
    pub fn without_traffic(mut self) -> Self {
        self.traffic_duration = Some(self.duration);
        self
    }
}

/// GeoJSON line geometry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type", default = "line_string")]
    pub kind: String,
    #[serde(default)]
    pub coordinates: Vec<LonLat>,
}

fn line_string() -> String {
    "LineString".to_string()
}

impl Geometry {
    pub fn line_string(coordinates: Vec<LonLat>) -> Self {
        Self {
            kind: line_string(),
            coordinates,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default)]
    pub distance: f64,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub weight: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Step {
    #[serde(default)]
    pub intersections: Vec<Intersection>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A point where the route meets other roads.
///
/// `bearings` lists every road's bearing in degrees; `in` and `out` index
/// into it for the approach and exit roads. The first intersection of a
/// route has no `in`, the last has no `out`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Intersection {
    #[serde(rename = "in", default, skip_serializing_if = "Option::is_none")]
    pub in_index: Option<usize>,
    #[serde(rename = "out", default, skip_serializing_if = "Option::is_none")]
    pub out_index: Option<usize>,
    #[serde(default)]
    pub bearings: Vec<i32>,
    #[serde(default)]
    pub entry: Vec<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LonLat>,
}

impl Intersection {
    /// Bearings of the approach and exit roads, if both are known.
    pub fn turn_bearings(&self) -> Option<(i32, i32)> {
        let bearing_in = *self.bearings.get(self.in_index?)?;
        let bearing_out = *self.bearings.get(self.out_index?)?;
        Some((bearing_in, bearing_out))
    }
}

/// How an adjusted duration was composed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrafficBreakdown {
    /// False when no congestion data could be used
    pub applied: bool,
    pub base_duration: f64,
    pub congestion_delay: f64,
    pub turn_delay: f64,
    pub buffer: f64,
    /// Simplified segments checked against congestion features
    pub segments_evaluated: usize,
    pub segments_congested: usize,
    pub stats: FetchStats,
}

/// A route with its traffic duration set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjustedRoute {
    pub route: Route,
    pub breakdown: TrafficBreakdown,
}

impl AdjustedRoute {
    /// The adjusted travel time in seconds.
    pub fn traffic_duration(&self) -> f64 {
        self.route.traffic_duration.unwrap_or(self.route.duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"{
        "code": "Ok",
        "routes": [{
            "geometry": {"type": "LineString", "coordinates": [[39.17, 21.54], [39.18, 21.55]]},
            "legs": [{
                "steps": [{
                    "intersections": [
                        {"out": 0, "entry": [true], "bearings": [90], "location": [39.17, 21.54]},
                        {"in": 0, "out": 1, "entry": [false, true], "bearings": [270, 0], "location": [39.175, 21.545]}
                    ],
                    "name": "King Road",
                    "mode": "driving"
                }],
                "distance": 1500.0,
                "duration": 120.0,
                "weight": 120.0,
                "summary": "King Road"
            }],
            "distance": 1500.0,
            "duration": 120.0,
            "weight_name": "routability",
            "weight": 120.0
        }],
        "waypoints": [{"name": "A", "location": [39.17, 21.54]}]
    }"#;

    #[test]
    fn test_parse_osrm_response() {
        let response = RouteResponse::from_slice(RESPONSE.as_bytes()).unwrap();
        assert_eq!(response.code, "Ok");

        let route = response.first_route().unwrap();
        assert_eq!(route.geometry.coordinates.len(), 2);
        assert_eq!(route.geometry.coordinates[0], LonLat::new(39.17, 21.54));
        assert_eq!(route.traffic_duration, None);

        let intersections = &route.legs[0].steps[0].intersections;
        assert_eq!(intersections[0].in_index, None);
        assert_eq!(intersections[1].turn_bearings(), Some((270, 0)));
    }

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let response = RouteResponse::from_slice(RESPONSE.as_bytes()).unwrap();
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["routes"][0]["legs"][0]["summary"], "King Road");
        assert_eq!(json["routes"][0]["legs"][0]["steps"][0]["name"], "King Road");
        assert!(json["routes"][0].get("traffic_duration").is_none());
        assert!(json["routes"][0]["legs"][0]["steps"][0]["intersections"][0]
            .get("in")
            .is_none());
    }

    #[test]
    fn test_turn_bearings_out_of_range() {
        let intersection = Intersection {
            in_index: Some(0),
            out_index: Some(3),
            bearings: vec![10, 20],
            ..Default::default()
        };
        assert_eq!(intersection.turn_bearings(), None);
    }

    #[test]
    fn test_without_traffic() {
        let route = Route {
            geometry: Geometry::default(),
            legs: Vec::new(),
            distance: 10.0,
            duration: 42.0,
            traffic_duration: None,
            weight_name: None,
            weight: 0.0,
            extra: Map::new(),
        }
        .without_traffic();
        assert_eq!(route.traffic_duration, Some(42.0));
    }
}
