use std::path::Path;

use chrono::{TimeZone, Utc};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use wxfuse_cli::Aggregator;
use wxfuse_config::{AppConfig, EndpointsConfig};
use wxfuse_core::AggregateRecord;

const LAT: f64 = 59.1272412;
const LON: f64 = 18.1027681;
const SMHI_PATH: &str =
    "/api/category/pmp3g/version/2/geotype/point/lon/18.102768/lat/59.127241/data.json";

fn json(body: &'static str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "application/json")
}

async fn mount_feeds(server: &MockServer, calls: Option<u64>) {
    let mocks = [
        Mock::given(method("GET"))
            .and(path(SMHI_PATH))
            .respond_with(json(include_str!("fixtures/smhi.json"))),
        Mock::given(method("GET"))
            .and(path("/v1/forecast.json"))
            .and(query_param("key", "test-key"))
            .and(query_param("aqi", "yes"))
            .respond_with(json(include_str!("fixtures/weatherapi.json"))),
        Mock::given(method("GET"))
            .and(path("/reverse"))
            .and(query_param("format", "jsonv2"))
            .respond_with(json(include_str!("fixtures/nominatim.json"))),
        Mock::given(method("GET"))
            .and(path("/kp.json"))
            .respond_with(json(include_str!("fixtures/kp.json"))),
        Mock::given(method("GET"))
            .and(path("/ovation.json"))
            .respond_with(json(include_str!("fixtures/aurora.json"))),
    ];

    for mock in mocks {
        let mock = match calls {
            Some(n) => mock.expect(n),
            None => mock,
        };
        mock.mount(server).await;
    }
}

fn config(server: &MockServer, cache_dir: Option<&Path>) -> AppConfig {
    let uri = server.uri();
    let mut cfg = AppConfig {
        endpoints: Some(EndpointsConfig {
            smhi: Some(uri.clone()),
            weatherapi: Some(uri.clone()),
            nominatim: Some(uri.clone()),
            kp: Some(format!("{uri}/kp.json")),
            aurora: Some(format!("{uri}/ovation.json")),
        }),
        ..AppConfig::default()
    };
    cfg.set_api_key("test-key".into());
    match cache_dir {
        Some(dir) => cfg.set_cache_dir(dir.to_path_buf()),
        None => cfg.set_cache_enabled(false),
    }
    cfg
}

fn expected() -> AggregateRecord {
    serde_json::from_str(include_str!("fixtures/expected_record.json")).unwrap()
}

#[tokio::test]
async fn all_feeds_merge_into_golden_record() {
    let server = MockServer::start().await;
    mount_feeds(&server, None).await;

    let aggregator = Aggregator::from_config(&config(&server, None)).unwrap();
    let now = Utc.with_ymd_and_hms(2024, 6, 15, 10, 20, 0).unwrap();

    let aggregated = aggregator.aggregate_at(LAT, LON, now).await;

    assert!(!aggregated.cached);
    assert_eq!(aggregated.record, expected());
}

#[tokio::test]
async fn second_request_is_served_from_cache() {
    let server = MockServer::start().await;
    mount_feeds(&server, Some(1)).await;
    let dir = tempfile::tempdir().unwrap();

    let aggregator = Aggregator::from_config(&config(&server, Some(dir.path()))).unwrap();
    let now = Utc.with_ymd_and_hms(2024, 6, 15, 10, 20, 0).unwrap();

    let first = aggregator.aggregate_at(LAT, LON, now).await;
    assert!(!first.cached);
    assert!(dir.path().join("weather_59.13_18.10.json").exists());

    // Rounds to the same key, so no feed is hit again
    let second = aggregator.aggregate_at(59.13, 18.10, now).await;
    assert!(second.cached);
    assert_eq!(second.record, first.record);
}

#[tokio::test]
async fn unwritable_cache_still_returns_record() {
    let server = MockServer::start().await;
    mount_feeds(&server, None).await;
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "file").unwrap();

    let aggregator = Aggregator::from_config(&config(&server, Some(&blocker))).unwrap();
    let now = Utc.with_ymd_and_hms(2024, 6, 15, 10, 20, 0).unwrap();

    let aggregated = aggregator.aggregate_at(LAT, LON, now).await;

    assert!(!aggregated.cached);
    assert_eq!(aggregated.record, expected());
    assert!(blocker.is_file());
}

#[tokio::test]
async fn failing_weather_sources_leave_weather_unknown() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SMHI_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/kp.json"))
        .respond_with(json(include_str!("fixtures/kp.json")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ovation.json"))
        .respond_with(json(include_str!("fixtures/aurora.json")))
        .mount(&server)
        .await;
    // Without a key the secondary source must not be called at all
    Mock::given(method("GET"))
        .and(path("/v1/forecast.json"))
        .respond_with(json(include_str!("fixtures/weatherapi.json")))
        .expect(0)
        .mount(&server)
        .await;

    let mut cfg = config(&server, None);
    cfg.weatherapi = None;
    let aggregator = Aggregator::from_config(&cfg).unwrap();
    let now = Utc.with_ymd_and_hms(2024, 6, 15, 10, 20, 0).unwrap();

    let record = aggregator.aggregate_at(LAT, LON, now).await.record;

    assert_eq!(record.weather, Default::default());
    assert_eq!(record.air_quality, Default::default());
    assert_eq!(record.location.place, None);
    assert_eq!(record.location.latitude, "59.13");
    assert_eq!(record.location.generated_at, Some(now.timestamp()));
    assert_eq!(record.geomagnetic.kp_index, Some(2.33));
    assert_eq!(record.aurora.probability, Some(7.0));
}

#[tokio::test]
async fn unknown_fields_serialize_as_null() {
    let server = MockServer::start().await;
    mount_feeds(&server, None).await;

    let aggregator = Aggregator::from_config(&config(&server, None)).unwrap();
    let now = Utc.with_ymd_and_hms(2024, 6, 15, 10, 20, 0).unwrap();
    let record = aggregator.aggregate_at(LAT, LON, now).await.record;

    let value = serde_json::to_value(&record).unwrap();
    let night = &value["weather"]["forecast"]["1718492400"];
    assert!(night["spp"].is_null());
    assert!(night["uvIndex"].is_null());
    assert_eq!(night["thunderRisk"], serde_json::json!(0.0));
    assert_eq!(value["geomagnetic"]["kp_index"], serde_json::json!(2.33));
}
