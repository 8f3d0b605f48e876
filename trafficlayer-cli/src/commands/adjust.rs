//! Adjust command - add a traffic duration to a saved routing-engine response.

use std::path::{Path, PathBuf};

use tracing::{info, warn};
use trafficlayer::coord::BoundingBox;
use trafficlayer::route::{Route, RouteResponse};
use trafficlayer::traffic::TrafficError;

use super::common::{print_json, resolve_zoom, CacheChoice};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the adjust command.
pub struct AdjustArgs {
    pub route: PathBuf,
    pub zoom: Option<u8>,
    pub no_traffic: bool,
    pub cache: Option<CacheChoice>,
}

/// Run the adjust command.
///
/// Only the first route is adjusted; the response is printed back as JSON
/// with its `traffic_duration` filled in.
pub async fn run(args: AdjustArgs, runner: &CliRunner) -> Result<(), CliError> {
    runner.log_startup("adjust");
    let mut response = load_response(&args.route)?;
    let route = first_route(&response, &args.route)?;

    let adjusted = if args.no_traffic {
        info!("Traffic disabled, using free-flow duration");
        route.without_traffic()
    } else {
        let zoom = resolve_zoom(args.zoom, runner.config());
        let bbox =
            BoundingBox::from_geometry(&route.geometry.coordinates).map_err(TrafficError::from)?;

        let app = runner.start_app(args.cache.map(Into::into)).await?;
        let adjusted = app.service().adjust_route_time(route, &bbox, zoom).await;
        runner.save_quota_usage(&app).await?;
        let adjusted = adjusted?;

        let breakdown = &adjusted.breakdown;
        if !breakdown.applied {
            warn!("Congestion data unavailable, route left unadjusted");
        }
        info!(
            base = breakdown.base_duration,
            congestion = breakdown.congestion_delay,
            turns = breakdown.turn_delay,
            buffer = breakdown.buffer,
            tiles = breakdown.stats.tiles_requested,
            remote = breakdown.stats.remote_fetches,
            failed = breakdown.stats.failed,
            "Route adjusted"
        );
        adjusted.route
    };

    replace_first_route(&mut response, adjusted);
    print_json(&response)
}

fn load_response(path: &Path) -> Result<RouteResponse, CliError> {
    let data = std::fs::read(path).map_err(|error| CliError::RouteRead {
        path: path.to_path_buf(),
        error,
    })?;
    RouteResponse::from_slice(&data).map_err(|error| CliError::RouteParse {
        path: path.to_path_buf(),
        error,
    })
}

fn first_route(response: &RouteResponse, path: &Path) -> Result<Route, CliError> {
    response
        .first_route()
        .cloned()
        .ok_or_else(|| CliError::NoRoute(path.to_path_buf()))
}

fn replace_first_route(response: &mut RouteResponse, route: Route) {
    if let Some(first) = response.routes.first_mut() {
        *first = route;
    }
}
