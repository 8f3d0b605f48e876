//! Integration tests for route adjustment.
//!
//! These tests drive the whole flow through the public API:
//! - bbox → tile batches → quota selection → tile fetch → store
//! - congestion overlay, turn delays and buffer on a real route model
//! - de-duplication and time-bucketed reuse of stored payloads
//! - request counters carried across restarts through the config file
//!
//! Run with: `cargo test --test adjust_integration`

use std::future::Future;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Weekday;
use tempfile::TempDir;

use trafficlayer::app::{AppConfig, TrafficLayerApp};
use trafficlayer::cache::{DiskCacheProvider, MemoryCacheProvider, TileStoreClient, TimeBucket};
use trafficlayer::config::{CacheKind, ConfigFile, CredentialSettings};
use trafficlayer::coord::{BoundingBox, TileCoord};
use trafficlayer::geo::{haversine_distance, LonLat};
use trafficlayer::provider::{ProviderError, TileSource};
use trafficlayer::quota::{InMemoryQuotaStore, ProviderCredential, QuotaSelector, QuotaStore};
use trafficlayer::route::{Intersection, Leg, Route, RouteResponse, Step, KMH_TO_MS};
use trafficlayer::traffic::{RequestedTiles, TrafficError, TrafficService, TrafficSettings};

// ============================================================================
// Helpers
// ============================================================================

/// A short east-west stretch of road in Jeddah, inside a single z11 tile.
const ROAD: [(f64, f64); 2] = [(39.170, 21.540), (39.175, 21.540)];

/// Tile source returning the same payload for every tile.
struct ScriptedSource {
    payload: Vec<u8>,
    delay: Duration,
    calls: AtomicUsize,
}

impl ScriptedSource {
    fn new(payload: String) -> Self {
        Self {
            payload: payload.into_bytes(),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TileSource for ScriptedSource {
    fn fetch_tile(
        &self,
        _credential: &ProviderCredential,
        _tile: TileCoord,
    ) -> impl Future<Output = Result<Vec<u8>, ProviderError>> + Send {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let payload = self.payload.clone();
        let delay = self.delay;
        async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            Ok(payload)
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn feature_payload(points: &[(f64, f64)], congestion: &str, class: &str) -> String {
    let coordinates: Vec<[f64; 2]> = points.iter().map(|&(lon, lat)| [lon, lat]).collect();
    serde_json::json!({
        "features": [{
            "geometry": {"type": "LineString", "coordinates": coordinates},
            "properties": {"congestion": congestion, "class": class}
        }]
    })
    .to_string()
}

fn bucket() -> TimeBucket {
    TimeBucket {
        day_of_week: Weekday::Thu,
        hour: 18,
        minute: 0,
    }
}

fn road_points() -> Vec<LonLat> {
    ROAD.iter().map(|&(lon, lat)| LonLat::new(lon, lat)).collect()
}

fn route_with_legs(legs: Vec<Leg>) -> Route {
    let json = serde_json::json!({
        "geometry": {"type": "LineString", "coordinates": [ROAD[0], ROAD[1]]},
        "legs": [],
        "distance": 520.0,
        "duration": 45.0,
        "weight": 45.0
    });
    let mut route: Route = serde_json::from_value(json).unwrap();
    route.legs = legs;
    route
}

fn turn(bearing_in: i32, bearing_out: i32) -> Intersection {
    Intersection {
        in_index: Some(0),
        out_index: Some(1),
        bearings: vec![bearing_in, bearing_out],
        ..Default::default()
    }
}

fn quota(limit: u64) -> Arc<InMemoryQuotaStore> {
    Arc::new(InMemoryQuotaStore::with_credentials([ProviderCredential::new(
        "mapbox", "pk.test", limit,
    )]))
}

fn memory_service(
    source: Arc<ScriptedSource>,
    quota: Arc<InMemoryQuotaStore>,
) -> TrafficService<ScriptedSource> {
    let store = TileStoreClient::new(Arc::new(MemoryCacheProvider::new(10_000_000, None)));
    TrafficService::new(source, store, QuotaSelector::new(quota), TrafficSettings::default())
}

async fn disk_service(
    dir: &Path,
    source: Arc<ScriptedSource>,
    quota: Arc<InMemoryQuotaStore>,
) -> TrafficService<ScriptedSource> {
    let disk = DiskCacheProvider::open(dir).await.unwrap();
    let store = TileStoreClient::new(Arc::new(disk));
    TrafficService::new(source, store, QuotaSelector::new(quota), TrafficSettings::default())
}

fn count_payload_files(dir: &Path) -> usize {
    let mut count = 0;
    let mut pending = vec![dir.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in std::fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext == "bin") {
                count += 1;
            }
        }
    }
    count
}

// ============================================================================
// Adjustment
// ============================================================================

#[tokio::test]
async fn test_severe_motorway_overlap_triples_segment_time() {
    let source = Arc::new(ScriptedSource::new(feature_payload(&ROAD, "severe", "motorway")));
    let service = memory_service(Arc::clone(&source), quota(1000));
    let route = route_with_legs(Vec::new());
    let bbox = BoundingBox::from_geometry(&route.geometry.coordinates).unwrap();

    let adjusted = service
        .adjust_route_time_at(route, &bbox, 11, bucket())
        .await
        .unwrap();

    let points = road_points();
    let expected_delay = 3.0 * haversine_distance(points[0], points[1]) / (100.0 * KMH_TO_MS);
    assert!(adjusted.breakdown.applied);
    assert!((adjusted.breakdown.congestion_delay - expected_delay).abs() < 1e-6);
    assert!((adjusted.traffic_duration() - (45.0 + expected_delay + 60.0)).abs() < 1e-6);
    assert_eq!(adjusted.breakdown.segments_congested, 1);
    assert_eq!(adjusted.breakdown.stats.remote_fetches, 1);
}

#[tokio::test]
async fn test_no_overlap_adds_only_turns_and_buffer() {
    let elsewhere = [(46.70, 24.70), (46.71, 24.70)];
    let source = Arc::new(ScriptedSource::new(feature_payload(&elsewhere, "severe", "motorway")));
    let service = memory_service(source, quota(1000));

    let leg = Leg {
        steps: vec![Step {
            intersections: vec![turn(0, 10), turn(90, 270)],
            ..Default::default()
        }],
        ..Default::default()
    };
    let route = route_with_legs(vec![leg]);
    let bbox = BoundingBox::from_geometry(&route.geometry.coordinates).unwrap();

    let adjusted = service
        .adjust_route_time_at(route, &bbox, 11, bucket())
        .await
        .unwrap();

    assert_eq!(adjusted.breakdown.congestion_delay, 0.0);
    assert_eq!(adjusted.breakdown.turn_delay, 25.0);
    assert_eq!(adjusted.traffic_duration(), 45.0 + 25.0 + 60.0);
}

#[tokio::test]
async fn test_no_quota_returns_unadjusted_route() {
    let source = Arc::new(ScriptedSource::new(feature_payload(&ROAD, "severe", "motorway")));
    let service = memory_service(Arc::clone(&source), quota(0));
    let route = route_with_legs(Vec::new());
    let bbox = BoundingBox::from_geometry(&route.geometry.coordinates).unwrap();

    let adjusted = service
        .adjust_route_time_at(route, &bbox, 11, bucket())
        .await
        .unwrap();

    assert!(!adjusted.breakdown.applied);
    assert_eq!(adjusted.route.traffic_duration, Some(45.0));
    assert_eq!(source.calls(), 0);
}

#[tokio::test]
async fn test_adjusts_parsed_osrm_response() {
    let body = serde_json::json!({
        "code": "Ok",
        "routes": [{
            "geometry": {"type": "LineString", "coordinates": [ROAD[0], ROAD[1]]},
            "legs": [{"steps": [{"intersections": [
                {"out": 0, "bearings": [90], "entry": [true], "location": ROAD[0]}
            ]}], "summary": "Madinah Road"}],
            "distance": 520.0,
            "duration": 45.0,
            "weight_name": "routability",
            "weight": 45.0
        }],
        "waypoints": []
    })
    .to_string();
    let mut response = RouteResponse::from_slice(body.as_bytes()).unwrap();

    let source = Arc::new(ScriptedSource::new(feature_payload(&ROAD, "heavy", "primary")));
    let service = memory_service(source, quota(1000));
    let route = response.routes.remove(0);
    let bbox = BoundingBox::from_geometry(&route.geometry.coordinates).unwrap();

    let adjusted = service
        .adjust_route_time_at(route, &bbox, 11, bucket())
        .await
        .unwrap();

    let points = road_points();
    let expected = 1.75 * haversine_distance(points[0], points[1]) / (70.0 * KMH_TO_MS);
    assert!((adjusted.breakdown.congestion_delay - expected).abs() < 1e-6);
    // Departure intersection has no approach bearing
    assert_eq!(adjusted.breakdown.turn_delay, 0.0);

    let json = serde_json::to_value(&adjusted.route).unwrap();
    assert_eq!(json["legs"][0]["summary"], "Madinah Road");
    assert!(json["traffic_duration"].as_f64().unwrap() > 45.0);
}

// ============================================================================
// Fetching and storage
// ============================================================================

#[tokio::test]
async fn test_second_call_in_bucket_is_served_from_store() {
    let source = Arc::new(ScriptedSource::new(feature_payload(&ROAD, "severe", "motorway")));
    let quota = quota(1000);
    let service = memory_service(Arc::clone(&source), Arc::clone(&quota));
    let bbox = BoundingBox::new(21.60, 21.50, 39.30, 39.10).unwrap();

    let first = service.fetch_congestion_at(&bbox, 11, bucket()).await.unwrap();
    let second = service.fetch_congestion_at(&bbox, 11, bucket()).await.unwrap();

    let tiles = first.range.tile_count();
    assert_eq!(first.stats.remote_fetches, tiles);
    assert_eq!(second.stats.remote_fetches, 0);
    assert_eq!(second.stats.cache_hits, tiles);
    assert_eq!(second.features.len(), first.features.len());
    assert_eq!(source.calls(), tiles);

    // Only the remote fetches are charged
    let credentials = quota.list().await.unwrap();
    assert_eq!(credentials[0].request_count, tiles as u64);
}

#[tokio::test]
async fn test_new_bucket_fetches_again() {
    let source = Arc::new(ScriptedSource::new(feature_payload(&ROAD, "severe", "motorway")));
    let service = memory_service(Arc::clone(&source), quota(1000));
    let bbox = BoundingBox::from_geometry(&road_points()).unwrap();
    let later = TimeBucket {
        minute: 15,
        ..bucket()
    };

    service.fetch_congestion_at(&bbox, 11, bucket()).await.unwrap();
    let again = service.fetch_congestion_at(&bbox, 11, later).await.unwrap();

    assert_eq!(again.stats.remote_fetches, 1);
    assert_eq!(source.calls(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_fetches_persist_one_payload() {
    let temp = TempDir::new().unwrap();
    let source = Arc::new(ScriptedSource {
        delay: Duration::from_millis(50),
        ..ScriptedSource::new(feature_payload(&ROAD, "severe", "motorway"))
    });
    let service = Arc::new(disk_service(temp.path(), Arc::clone(&source), quota(1000)).await);
    let requested = Arc::new(RequestedTiles::new());
    let credential = ProviderCredential::new("mapbox", "pk.test", 1000);
    let tile = TileCoord::new(11, 1246, 898);

    let tasks: Vec<_> = (0..2)
        .map(|_| {
            let service = Arc::clone(&service);
            let requested = Arc::clone(&requested);
            let credential = credential.clone();
            tokio::spawn(async move {
                service
                    .fetcher()
                    .fetch_tile_once(&requested, &credential, tile, &bucket())
                    .await
            })
        })
        .collect();

    let mut performed = 0;
    for task in tasks {
        if let Some(result) = task.await.unwrap() {
            assert!(result.unwrap().was_remote_fetch);
            performed += 1;
        }
    }

    assert_eq!(performed, 1);
    assert_eq!(requested.len(), 1);
    assert!(requested.contains(&tile));
    assert_eq!(source.calls(), 1);
    assert_eq!(count_payload_files(temp.path()), 1);
}

#[tokio::test]
async fn test_disk_store_survives_restart() {
    let temp = TempDir::new().unwrap();
    let bbox = BoundingBox::from_geometry(&road_points()).unwrap();

    let first_source = Arc::new(ScriptedSource::new(feature_payload(&ROAD, "severe", "motorway")));
    let service = disk_service(temp.path(), Arc::clone(&first_source), quota(1000)).await;
    service.fetch_congestion_at(&bbox, 11, bucket()).await.unwrap();
    assert_eq!(first_source.calls(), 1);
    drop(service);

    let second_source = Arc::new(ScriptedSource::new(feature_payload(&ROAD, "severe", "motorway")));
    let service = disk_service(temp.path(), Arc::clone(&second_source), quota(1000)).await;
    let set = service.fetch_congestion_at(&bbox, 11, bucket()).await.unwrap();

    assert_eq!(set.stats.cache_hits, 1);
    assert_eq!(set.features.len(), 1);
    assert_eq!(second_source.calls(), 0);
}

#[tokio::test]
async fn test_failed_tiles_do_not_abort_the_call() {
    let source = Arc::new(ScriptedSource::new("<html>bad gateway</html>".to_string()));
    let quota = quota(1000);
    let service = memory_service(Arc::clone(&source), Arc::clone(&quota));
    let route = route_with_legs(Vec::new());
    let bbox = BoundingBox::from_geometry(&route.geometry.coordinates).unwrap();

    let adjusted = service
        .adjust_route_time_at(route, &bbox, 11, bucket())
        .await
        .unwrap();

    assert!(adjusted.breakdown.applied);
    assert_eq!(adjusted.breakdown.stats.failed, 1);
    assert_eq!(adjusted.traffic_duration(), 45.0 + 60.0);

    // The unreadable payload was still delivered and billed
    let credentials = quota.list().await.unwrap();
    assert_eq!(credentials[0].request_count, 1);
}

// ============================================================================
// Quota persistence
// ============================================================================

/// Writes a config with one credential and a memory tile store, so every
/// session has to go to the source.
fn write_quota_config(path: &Path, request_limit: u64) {
    let mut file = ConfigFile::default();
    file.cache.provider = CacheKind::Memory;
    file.credentials.push(CredentialSettings {
        name: "primary".into(),
        provider: "mapbox".into(),
        token: "pk.test".into(),
        request_limit,
        request_count: 0,
    });
    file.save_to(path).unwrap();
}

async fn start_session(path: &Path) -> TrafficLayerApp<ScriptedSource> {
    let file = ConfigFile::load_from(path).unwrap();
    let source = ScriptedSource::new(feature_payload(&ROAD, "severe", "motorway"));
    TrafficLayerApp::start_with_source(AppConfig::from_config_file(&file), source)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_exhausted_quota_stays_exhausted_after_restart() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.ini");
    write_quota_config(&path, 1);
    let bbox = BoundingBox::from_geometry(&road_points()).unwrap();

    let first = start_session(&path).await;
    let adjusted = first
        .service()
        .adjust_route_time_at(route_with_legs(Vec::new()), &bbox, 11, bucket())
        .await
        .unwrap();
    assert!(adjusted.breakdown.applied);
    assert_eq!(first.service().fetcher().source().calls(), 1);
    assert_eq!(first.save_quota_usage(&path).await.unwrap(), 1);
    drop(first);

    let second = start_session(&path).await;
    let err = second
        .service()
        .fetch_congestion_at(&bbox, 11, bucket())
        .await
        .unwrap_err();
    assert!(matches!(err, TrafficError::NoQuotaAvailable { .. }));

    let adjusted = second
        .service()
        .adjust_route_time_at(route_with_legs(Vec::new()), &bbox, 11, bucket())
        .await
        .unwrap();
    assert!(!adjusted.breakdown.applied);
    assert_eq!(adjusted.route.traffic_duration, Some(45.0));
    assert_eq!(second.service().fetcher().source().calls(), 0);

    let credentials = second.quota_store().list().await.unwrap();
    assert_eq!(credentials[0].request_count, 1);
}

#[tokio::test]
async fn test_unsaved_session_does_not_touch_config() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.ini");
    write_quota_config(&path, 1);
    let bbox = BoundingBox::from_geometry(&road_points()).unwrap();

    let first = start_session(&path).await;
    first.service().fetch_congestion_at(&bbox, 11, bucket()).await.unwrap();
    drop(first);

    let reloaded = ConfigFile::load_from(&path).unwrap();
    assert_eq!(reloaded.credentials[0].request_count, 0);
}
