//! End-to-end tests for the biodash-ingest binary

#![allow(clippy::unwrap_used, clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mock_api() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/occurrences/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalRecords": 2,
            "occurrences": [
                { "uuid": "u1", "scientificName": "  Erithacus rubecula ", "license": "cc-by" },
                { "uuid": "u2", "vernacularName": "Fallow Deer", "decimalLatitude": "52.1" }
            ]
        })))
        .mount(&server)
        .await;
    server
}

fn read_json(path: &std::path::Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[tokio::test]
async fn test_writes_mapped_records() {
    let server = mock_api().await;
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("records.json");

    Command::cargo_bin("biodash-ingest")
        .unwrap()
        .arg(format!("{}/occurrences/search?q=*:*", server.uri()))
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 2 records to"));

    let records = read_json(&out);
    assert_eq!(records[0]["scientificName"], "Erithacus rubecula");
    assert_eq!(records[0]["speciesKey"], "erithacus rubecula");
    assert_eq!(records[0]["license"], "CC-BY");
    assert_eq!(records[1]["speciesDisplay"], "Fallow Deer");
    assert_eq!(records[1]["lat"], 52.1);
}

#[tokio::test]
async fn test_writes_raw_occurrences() {
    let server = mock_api().await;
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("raw.json");

    Command::cargo_bin("biodash-ingest")
        .unwrap()
        .arg(format!("{}/occurrences/search?q=*:*", server.uri()))
        .args(["--raw", "-o"])
        .arg(&out)
        .assert()
        .success();

    let raw = read_json(&out);
    assert_eq!(raw[0]["scientificName"], "  Erithacus rubecula ");
    assert_eq!(raw[1]["decimalLatitude"], "52.1");
    assert!(raw[1].get("speciesKey").is_none());
}

#[tokio::test]
async fn test_http_error_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("records.json");

    Command::cargo_bin("biodash-ingest")
        .unwrap()
        .arg(format!("{}/occurrences/search", server.uri()))
        .arg("--output")
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Fetch failed"));

    assert!(!out.exists());
}
