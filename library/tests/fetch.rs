mod common;

use common::{config, context, device, Upstream};
use library::FetchOutcome;
use serde_json::json;
use std::time::{Duration, Instant};

#[actix_rt::test]
async fn stores_first_device_reading() {
    let dir = tempfile::tempdir().unwrap();
    let upstream = Upstream::respond_with(device(json!({
        "dateutc": 1_704_067_200_000i64,
        "tempf": 50.0,
        "windspeedmph": 3.1,
        "baromrelin": 29.92
    })));
    let app = context(config(&upstream.url(), &dir));

    let outcome = app.fetcher.fetch_and_store().await;
    assert_eq!(outcome, FetchOutcome::Stored("2024-01-01T00:00:00Z".to_owned()));

    let stored = app.store.latest().unwrap().unwrap();
    assert_eq!(stored.timestamp, "2024-01-01T00:00:00Z");
    assert_eq!(stored.temp_f, Some(50.0));
    assert_eq!(stored.humidity, None);
    assert_eq!(stored.pressure_rel_in, Some(29.92));
    assert_eq!(upstream.hits(), 1);
}

#[actix_rt::test]
async fn repeated_cycles_do_not_duplicate() {
    let dir = tempfile::tempdir().unwrap();
    let upstream = Upstream::respond_with(device(json!({
        "date": "2024-01-01 00:00:00",
        "tempf": 61.0
    })));
    let app = context(config(&upstream.url(), &dir));

    assert_eq!(
        app.fetcher.fetch_and_store().await,
        FetchOutcome::Stored("2024-01-01 00:00:00".to_owned())
    );
    assert_eq!(
        app.fetcher.fetch_and_store().await,
        FetchOutcome::Duplicate("2024-01-01 00:00:00".to_owned())
    );
    assert_eq!(app.store.count().unwrap(), 1);
}

#[actix_rt::test]
async fn empty_device_list_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let upstream = Upstream::respond_with(json!([]));
    let app = context(config(&upstream.url(), &dir));

    assert_eq!(app.fetcher.fetch_and_store().await, FetchOutcome::NoDevices);
    assert_eq!(app.store.count().unwrap(), 0);
}

#[actix_rt::test]
async fn device_without_observation_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let upstream = Upstream::respond_with(json!([{ "macAddress": "00:0E:C6:20:0F:7B" }]));
    let app = context(config(&upstream.url(), &dir));

    assert_eq!(app.fetcher.fetch_and_store().await, FetchOutcome::NoData);

    let upstream = Upstream::respond_with(device(json!({})));
    let app = context(config(&upstream.url(), &dir));
    assert_eq!(app.fetcher.fetch_and_store().await, FetchOutcome::NoData);
    assert_eq!(app.store.count().unwrap(), 0);
}

#[actix_rt::test]
async fn missing_credentials_skip_without_request() {
    let dir = tempfile::tempdir().unwrap();
    let upstream = Upstream::respond_with(device(json!({ "dateutc": 1_704_067_200_000i64 })));
    let mut cfg = config(&upstream.url(), &dir);
    cfg.app_key = None;
    let app = context(cfg);

    assert_eq!(app.fetcher.fetch_and_store().await, FetchOutcome::Skipped);
    assert_eq!(upstream.hits(), 0);
    assert_eq!(app.store.count().unwrap(), 0);
}

#[actix_rt::test]
async fn upstream_error_status_skips_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let upstream = Upstream::failing(500);
    let app = context(config(&upstream.url(), &dir));

    assert_eq!(app.fetcher.fetch_and_store().await, FetchOutcome::Skipped);
    assert_eq!(upstream.hits(), 1);
    assert_eq!(app.store.count().unwrap(), 0);
}

#[actix_rt::test]
async fn unreachable_upstream_skips_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let app = context(config("http://127.0.0.1:9/v1/devices", &dir));

    assert_eq!(app.fetcher.fetch_and_store().await, FetchOutcome::Skipped);
}

#[actix_rt::test]
async fn non_array_payload_skips_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let upstream = Upstream::respond_with(json!({ "error": "invalid key" }));
    let app = context(config(&upstream.url(), &dir));

    assert_eq!(app.fetcher.fetch_and_store().await, FetchOutcome::Skipped);
}

#[actix_rt::test]
async fn observation_without_timestamp_skips_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let upstream = Upstream::respond_with(device(json!({ "tempf": 70.0 })));
    let app = context(config(&upstream.url(), &dir));

    assert_eq!(app.fetcher.fetch_and_store().await, FetchOutcome::Skipped);
    assert_eq!(app.store.count().unwrap(), 0);
}

#[actix_rt::test]
async fn slow_body_is_cut_off_at_the_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let upstream = Upstream::stalling(Duration::from_secs(5));
    let mut cfg = config(&upstream.url(), &dir);
    cfg.fetch_timeout = Duration::from_millis(300);
    let app = context(cfg);

    let started = Instant::now();
    let outcome = app.fetcher.fetch_and_store().await;

    assert_eq!(outcome, FetchOutcome::Skipped);
    assert!(
        started.elapsed() < Duration::from_secs(2),
        "cycle ran for {:?}",
        started.elapsed()
    );
    assert_eq!(upstream.hits(), 1);
}
