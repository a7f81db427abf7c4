//! End-to-end requests through `ChartService` with the fixture backend.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use janma_ephem::FixtureFactory;
use janma_frames::angular_separation_deg;
use janma_rs::{
    Ayanamsa, ChartService, ErrorKind, HouseSystem, HousesRequest, MCHemisphere, ParityProfile,
    PositionsRequest, ResolveRequest, ServiceConfig,
};
use janma_zone::ResolutionMode;

const FORT_KNOX: (f64, f64) = (37.840347, -85.949127);

const FAGAN_BRADLEY: [f64; 12] = [
    166.811025, 198.361114, 227.432154, 255.084027, 283.498943, 314.288955, 346.811025, 18.361114,
    47.432154, 75.084027, 103.498943, 134.288955,
];

fn start(factory: &FixtureFactory) -> ChartService {
    start_with(factory, ServiceConfig::default())
}

fn start_with(factory: &FixtureFactory, config: ServiceConfig) -> ChartService {
    ChartService::start(config, Arc::new(factory.clone())).unwrap()
}

fn houses_request(birth_time: &str, lat: f64, lon: f64) -> HousesRequest {
    HousesRequest {
        birth_time: birth_time.to_string(),
        latitude: lat,
        longitude: lon,
        elevation: 0.0,
        ayanamsa: Ayanamsa::Tropical,
        system: HouseSystem::Placidus,
        mc_hemisphere: MCHemisphere::Auto,
        parity_profile: None,
    }
}

fn positions_request(birth_time: &str, lat: f64, lon: f64) -> PositionsRequest {
    PositionsRequest {
        birth_time: birth_time.to_string(),
        latitude: lat,
        longitude: lon,
        elevation: 0.0,
        ayanamsa: Ayanamsa::Tropical,
        system: None,
        mc_hemisphere: MCHemisphere::Auto,
        parity_profile: None,
        bodies: None,
    }
}

#[test]
fn resolves_louisville_1962() {
    let service = start(&FixtureFactory::new());
    let r = service
        .resolve(&ResolveRequest {
            local_datetime: "1962-07-02T23:33:00".into(),
            latitude: FORT_KNOX.0,
            longitude: FORT_KNOX.1,
            parity_profile: Some(ParityProfile::StrictHistory),
        })
        .unwrap();
    assert_eq!(r.utc.to_rfc3339(), "1962-07-03T04:33:00+00:00");
    assert_eq!(r.offset_seconds, -5 * 3600);
    assert!(!r.dst_active);
    service.shutdown();
}

#[tokio::test]
async fn war_time_patch_reaches_positions() {
    let service = start(&FixtureFactory::new());
    let r = service
        .positions(&positions_request("1943-07-02T23:33:00", FORT_KNOX.0, FORT_KNOX.1))
        .await
        .unwrap();
    let resolved = r.resolved.expect("local time was resolved");
    assert_eq!(resolved.provenance.resolution_mode, ResolutionMode::Patched);
    assert!(!resolved.provenance.patches_applied.is_empty());
    assert_eq!(resolved.offset_seconds, -4 * 3600);
    assert_eq!(r.utc, resolved.utc);
    assert_eq!(r.bodies.len(), 10);
    service.shutdown();
}

#[tokio::test]
async fn placidus_fagan_bradley_at_epoch() {
    let service = start(&FixtureFactory::new());
    let mut request = houses_request("1970-01-01T00:00:00Z", 0.0, 0.0);
    request.ayanamsa = Ayanamsa::FaganBradley;
    request.mc_hemisphere = MCHemisphere::North;

    let r = service.houses(&request).await.unwrap();
    assert!(r.resolved.is_none());
    assert_eq!(r.houses.frame, "ecliptic-of-date");
    assert_eq!(r.metadata.ecliptic_frame, "ECLIPDATE");
    assert_eq!(r.metadata.ut1_source, "utc");
    assert!((r.metadata.ayanamsa_deg - 24.317).abs() < 1e-2);
    for (i, (got, want)) in r.houses.cusps.iter().zip(FAGAN_BRADLEY).enumerate() {
        assert!((got - want).abs() < 0.02, "cusp {}: {got} vs {want}", i + 1);
    }
    for i in 0..6 {
        let sep = angular_separation_deg(r.houses.cusps[i], r.houses.cusps[i + 6]);
        assert!((sep - 180.0).abs() < 1e-6);
    }
    assert_eq!(r.houses.asc, r.houses.cusps[0]);
    service.shutdown();
}

#[tokio::test]
async fn out_of_range_latitude_is_rejected_before_work() {
    let factory = FixtureFactory::new();
    let service = start(&factory);
    let err = service
        .positions(&positions_request("1962-07-02T23:33:00", 91.0, 0.0))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidInput);
    assert!(err.message.contains("latitude"));
    assert_eq!(factory.calls(), 0);
    assert_eq!(service.pool().cache_stats().misses, 0);
    service.shutdown();
}

#[tokio::test]
async fn polar_placidus_is_a_client_error() {
    let service = start(&FixtureFactory::new());
    let err = service
        .houses(&houses_request("1970-01-01T00:00:00Z", 70.0, 25.0))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::PolarUndefined);
    assert_eq!(err.kind.http_status(), 422);
    assert!(err.message.contains("Placidus"));

    let mut equal = houses_request("1970-01-01T00:00:00Z", 70.0, 25.0);
    equal.system = HouseSystem::Equal;
    service.houses(&equal).await.unwrap();
    service.shutdown();
}

#[tokio::test]
async fn polar_placidus_never_reaches_the_pool() {
    let factory = FixtureFactory::new();
    let service = start(&factory);

    let err = service
        .houses(&houses_request("1970-01-01T00:00:00Z", -75.0, 25.0))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::PolarUndefined);

    let mut request = positions_request("1970-01-01T00:00:00Z", 70.0, 25.0);
    request.system = Some(HouseSystem::Placidus);
    let err = service.positions(&request).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::PolarUndefined);

    assert_eq!(factory.calls(), 0);
    let stats = service.pool().cache_stats();
    assert_eq!((stats.hits, stats.misses, stats.entries), (0, 0, 0));
    service.shutdown();
}

#[tokio::test]
async fn elevation_is_validated_and_echoed() {
    let service = start(&FixtureFactory::new());
    let mut request = positions_request("1970-01-01T00:00:00Z", 27.98, 86.92);
    request.elevation = 8848.0;
    let r = service.positions(&request).await.unwrap();
    assert_eq!(r.metadata.elevation_m, 8848.0);

    request.elevation = 12_000.0;
    let err = service.positions(&request).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidInput);
    service.shutdown();
}

#[tokio::test]
async fn repeated_positions_hit_the_cache() {
    let factory = FixtureFactory::new();
    let service = start(&factory);
    let request = positions_request("1970-01-01T00:00:00Z", 51.5, -0.1);

    let first = service.positions(&request).await.unwrap();
    let calls = factory.calls();
    let second = service.positions(&request).await.unwrap();

    assert_eq!(factory.calls(), calls);
    assert_eq!(first.bodies, second.bodies);
    let stats = service.pool().cache_stats();
    assert_eq!((stats.hits, stats.misses), (1, 1));
    assert!(stats.hit_rate_percent > 0.0);
    service.shutdown();
}

#[tokio::test]
async fn sidereal_positions_shift_by_ayanamsa() {
    let service = start(&FixtureFactory::new());
    let mut request = positions_request("1970-01-01T00:00:00Z", 0.0, 0.0);
    let tropical = service.positions(&request).await.unwrap();
    request.ayanamsa = Ayanamsa::Lahiri;
    request.system = Some(HouseSystem::WholeSign);
    let sidereal = service.positions(&request).await.unwrap();

    let shift = sidereal.metadata.ayanamsa_deg;
    for (t, s) in tropical.bodies.iter().zip(&sidereal.bodies) {
        let d = (t.longitude - s.longitude).rem_euclid(360.0);
        assert!((d - shift).abs() < 1e-9, "{:?}", t.body);
    }
    let houses = sidereal.houses.expect("system requested");
    assert_eq!(houses.cusps[0] % 30.0, 0.0);
    service.shutdown();
}

#[tokio::test]
async fn health_reports_every_section() {
    let service = start(&FixtureFactory::new());
    for _ in 0..200 {
        if service.health().pool.status != janma_pool::HealthStatus::Starting {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let v = serde_json::to_value(service.health()).unwrap();
    assert_eq!(v["status"], "healthy");
    assert_eq!(v["kernels"]["ok"], true);
    assert_eq!(v["pool"]["size"], 2);
    assert_eq!(v["pool"]["queue_depth"], 0);
    assert_eq!(v["cache"]["entries"], 0);
    assert_eq!(v["ephemeris"]["policy"], "auto");
    assert!(v["ephemeris"]["de440_range"].is_object());
    assert_eq!(v["time"]["parity_profile_default"], "strict_history");
    assert!(v["time"]["tzdb_version"].as_str().is_some_and(|s| !s.is_empty()));
    assert_eq!(v["service"], "janma");
    service.shutdown();
}

#[tokio::test]
async fn pinned_de440_rejects_far_future() {
    let config = ServiceConfig::from_toml_str("[ephemeris]\npolicy = \"de440\"\n").unwrap();
    let service = start_with(&FixtureFactory::new(), config);
    let err = service
        .positions(&positions_request("3000-01-01T00:00:00Z", 0.0, 0.0))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidInput);
    let health = serde_json::to_value(service.health()).unwrap();
    assert!(health["ephemeris"].get("de440_range").is_none());
    service.shutdown();
}

#[test]
fn config_file_drives_start() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[pool]\nworkers = 3\n\n[time]\nparity_profile_default = \"astro_com\"\n"
    )
    .unwrap();
    let config = ServiceConfig::load(file.path()).unwrap();
    let service = start_with(&FixtureFactory::new(), config);
    assert_eq!(service.pool().size(), 3);
    assert_eq!(
        service.health().time.parity_profile_default,
        ParityProfile::AstroCom
    );
    service.shutdown();
}

#[test]
fn missing_patch_file_fails_start() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = ServiceConfig::default();
    config.time.patches_path = Some(dir.path().join("absent.toml"));
    let err = ChartService::start(config, Arc::new(FixtureFactory::new())).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Internal);
}
