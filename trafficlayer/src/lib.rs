//! TrafficLayer - traffic-congestion-adjusted travel times for routes
//!
//! Given a routing-engine response and the area it covers, this library
//! fetches congestion tiles for that area (once per tile, quota-aware and
//! cached per 15-minute time bucket) and overlays them on the route's
//! simplified geometry to produce an adjusted `traffic_duration`.
//!
//! # Modules
//!
//! - [`coord`] - Slippy-map tile math, tile ranges and batches
//! - [`geo`] - Distances, segment intersection and route simplification
//! - [`quota`] - Credential selection under request limits
//! - [`provider`] - Raw congestion tile sources
//! - [`cache`] - Time-bucketed tile store
//! - [`traffic`] - Tile fetching and the [`TrafficService`](traffic::TrafficService)
//! - [`route`] - Route model, congestion overlay and turn delays
//! - [`prewarm`] - Regions kept warm ahead of demand
//! - [`jobs`] - Periodic prewarm and quota reset jobs
//! - [`config`] - `config.ini` loading and saving
//! - [`app`] - Wiring of all of the above

pub mod app;
pub mod cache;
pub mod config;
pub mod coord;
pub mod geo;
pub mod jobs;
pub mod logging;
pub mod prewarm;
pub mod provider;
pub mod quota;
pub mod route;
pub mod traffic;

/// Library version, from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
