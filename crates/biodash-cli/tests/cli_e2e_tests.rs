//! End-to-end tests for the biodash binary against a mock records API

#![allow(clippy::unwrap_used, clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::io::Write;
use tempfile::NamedTempFile;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const NOT_LOADED: &str = "Status reference not loaded.";

async fn mock_api() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/occurrences/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalRecords": 3,
            "occurrences": [
                {
                    "uuid": "c1",
                    "scientificName": "Numenius arquata",
                    "vernacularName": "Curlew",
                    "classs": "Aves",
                    "basisOfRecord": "HumanObservation",
                    "dataProviderName": "BTO",
                    "dataResourceName": "BirdTrack",
                    "license": "cc0",
                    "eventDate": 1714543200000u64,
                    "decimalLatitude": 54.6,
                    "decimalLongitude": -2.1
                },
                {
                    "uuid": "c2",
                    "vernacularName": "curlew",
                    "classs": "Aves",
                    "dataProviderName": "BTO",
                    "dataResourceName": "BirdTrack",
                    "license": "CC0",
                    "eventDate": 1717221600000u64
                },
                {
                    "uuid": "f1",
                    "scientificName": "Vulpes vulpes",
                    "vernacularName": "Red Fox",
                    "classs": "Mammalia",
                    "dataProviderName": "Mammal Society",
                    "dataResourceName": "Mammal Mapper",
                    "license": "CC-BY",
                    "eventDate": 1714543200000u64
                }
            ]
        })))
        .mount(&server)
        .await;

    server
}

fn search_url(server: &MockServer) -> String {
    format!("{}/occurrences/search?q=*:*", server.uri())
}

fn taxonomy_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        "{}",
        json!({
            "lists": [
                { "list": "Red", "species": [
                    { "name": "Curlew", "scientific": "Numenius arquata", "annotation": "BDp1" }
                ] },
                { "list": "Amber", "species": [
                    { "name": "Mallard", "scientific": "Anas platyrhynchos", "annotation": "" }
                ] }
            ]
        })
    )
    .unwrap();
    file
}

fn biodash() -> Command {
    let mut cmd = Command::cargo_bin("biodash").unwrap();
    cmd.env_remove("BIODASH_API_URL")
        .env_remove("BIODASH_TAXONOMY")
        .env_remove("BIODASH_MAX_MAP_POINTS");
    cmd
}

#[tokio::test]
async fn test_fetch_prints_report() {
    let server = mock_api().await;
    let taxonomy = taxonomy_file();

    biodash()
        .arg("fetch")
        .arg(search_url(&server))
        .arg("--taxonomy")
        .arg(taxonomy.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Records: "))
        .stdout(predicate::str::contains("Records by month:"))
        .stdout(predicate::str::contains("2024-05"))
        .stdout(predicate::str::contains("Red Fox"))
        .stdout(predicate::str::contains("BDp1"))
        .stdout(predicate::str::contains("Uses data BTO — BirdTrack, licensed under CC0 (Public Domain)."))
        .stdout(predicate::str::contains(NOT_LOADED).not());
}

#[tokio::test]
async fn test_fetch_json_report() {
    let server = mock_api().await;
    let taxonomy = taxonomy_file();

    let output = biodash()
        .arg("fetch")
        .arg(search_url(&server))
        .args(["--format", "json", "--taxonomy"])
        .arg(taxonomy.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["totalRecords"], 3);
    assert_eq!(report["source"], search_url(&server));
    assert!(report["fetchedAt"].is_string());

    // Both curlew records land on the one taxonomy entry
    let red = &report["status"]["lists"][0];
    assert_eq!(red["list"], "Red");
    assert_eq!(red["species"][0]["occurrenceCount"], 2);
    assert_eq!(red["species"].as_array().unwrap().len(), 1);

    assert_eq!(report["map"]["points"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_fetch_without_taxonomy_shows_placeholder() {
    let server = mock_api().await;

    biodash()
        .arg("fetch")
        .arg(search_url(&server))
        .args(["--taxonomy", "/nonexistent/bocc.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(NOT_LOADED))
        .stdout(predicate::str::contains("Top species:"));
}

#[tokio::test]
async fn test_fetch_drill_down() {
    let server = mock_api().await;
    let taxonomy = taxonomy_file();

    biodash()
        .arg("fetch")
        .arg(search_url(&server))
        .arg("--taxonomy")
        .arg(taxonomy.path())
        .args(["--drill", "list=Red"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Records on the Red list:"))
        .stdout(predicate::str::contains("https://records.nbnatlas.org/occurrences/c1"))
        .stdout(predicate::str::contains("https://records.nbnatlas.org/occurrences/c2"))
        .stdout(predicate::str::contains("2 records"))
        .stdout(predicate::str::contains("occurrences/f1").not());
}

#[tokio::test]
async fn test_fetch_url_from_environment() {
    let server = mock_api().await;

    biodash()
        .arg("fetch")
        .args(["--taxonomy", "/nonexistent/bocc.json", "--drill", "class=mammalia"])
        .env("BIODASH_API_URL", search_url(&server))
        .assert()
        .success()
        .stdout(predicate::str::contains("Red Fox"))
        .stdout(predicate::str::contains("1 records"));
}

#[tokio::test]
async fn test_fetch_http_error_exits_nonzero() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/occurrences/search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    biodash()
        .arg("fetch")
        .arg(search_url(&server))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Fetch failed: HTTP 500"));
}

#[test]
fn test_fetch_requires_url() {
    biodash()
        .arg("fetch")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("No records URL given"));
}

#[test]
fn test_fetch_rejects_bad_url_and_drill() {
    biodash()
        .args(["fetch", "not a url"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid URL"));

    biodash()
        .args(["fetch", "https://records-ws.nbnatlas.org/occurrences/search", "--drill", "colour=red"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid drill-down"));
}

#[test]
fn test_taxonomy_command() {
    let taxonomy = taxonomy_file();

    biodash()
        .arg("taxonomy")
        .arg("--taxonomy")
        .arg(taxonomy.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Curlew"))
        .stdout(predicate::str::contains("Mallard"))
        .stdout(predicate::str::contains("2 species in 2 lists"));

    biodash()
        .args(["taxonomy", "--taxonomy", "/nonexistent/bocc.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(NOT_LOADED))
        .stdout(predicate::str::contains("Failed to read"));
}

#[test]
fn test_subcommand_required() {
    biodash()
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("A subcommand is required"));
}

#[test]
fn test_markdown_help() {
    biodash()
        .arg("--markdown-help")
        .assert()
        .success()
        .stdout(predicate::str::contains("biodash fetch"));
}
