//! Integration tests for the `route` and `inspect` commands.

use std::fs;
use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../docs/fixtures")
        .join(name)
        .canonicalize()
        .expect("fixture present")
}

fn cli() -> Command {
    let mut cmd = cargo_bin_cmd!("rangeraptor-cli");
    cmd.env("RUST_LOG", "error").env("NO_COLOR", "1");
    cmd
}

fn route_cmd(request: &str) -> Command {
    let mut cmd = cli();
    cmd.arg("--no-footer")
        .arg("route")
        .arg("--network")
        .arg(fixture("basic_network.json"))
        .arg("--request")
        .arg(fixture(request));
    cmd
}

#[test]
fn route_prints_the_direct_rail_journey() {
    route_cmd("basic_request.json")
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 1 journey(s)"))
        .stdout(predicate::str::contains("RAIL R3 Alpha -> Zulu"));
}

#[test]
fn compact_format_uses_the_one_line_notation() {
    route_cmd("via_request.json")
        .arg("--format")
        .arg("compact")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Walk 5m ~ Alpha ~ BUS L1 10:05 10:35 ~ Charlie",
        ))
        .stdout(predicate::str::contains("BUS L2 10:40 11:00 ~ Zulu"))
        .stdout(predicate::str::contains("Tₓ1"));
}

#[test]
fn json_format_is_machine_readable() {
    let output = route_cmd("basic_request.json")
        .arg("--format")
        .arg("json")
        .output()
        .expect("command runs");
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    let journeys = value["journeys"].as_array().expect("journeys array");
    assert_eq!(journeys.len(), 1);
    assert_eq!(journeys[0]["arrival"], "10:51");
    assert_eq!(journeys[0]["legs"][1]["kind"], "transit");
    assert_eq!(journeys[0]["legs"][1]["route"], "R3");
    assert_eq!(value["timed_out"], false);
}

#[test]
fn profile_override_is_validated() {
    route_cmd("basic_request.json")
        .arg("--profile")
        .arg("min-travel-duration")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not compatible"));
}

#[test]
fn min_travel_duration_runs_with_a_single_iteration() {
    route_cmd("basic_request.json")
        .arg("--profile")
        .arg("min-travel-duration")
        .arg("--search-window")
        .arg("0")
        .assert()
        .success()
        .stdout(predicate::str::contains("(1 iterations"));
}

#[test]
fn zero_transfers_hides_the_bus_connection() {
    route_cmd("via_request.json")
        .arg("--max-transfers")
        .arg("0")
        .assert()
        .success()
        .stdout(predicate::str::contains("No journey found."));
}

#[test]
fn unknown_stop_in_request_suggests_alternatives() {
    let dir = tempdir().expect("temp dir");
    let request = dir.path().join("request.json");
    fs::write(
        &request,
        r#"{"earliest_departure_time": "10:00",
            "access": [{"stop": "Alfa", "duration": 60}],
            "egress": [{"stop": "Z", "duration": 60}]}"#,
    )
    .expect("write request");

    cli()
        .arg("route")
        .arg("--network")
        .arg(fixture("basic_network.json"))
        .arg("--request")
        .arg(&request)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown stop id: Alfa"));
}

#[test]
fn missing_network_file_fails_with_context() {
    let dir = tempdir().expect("temp dir");
    cli()
        .arg("inspect")
        .arg("--network")
        .arg(dir.path().join("missing.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load network"));
}

#[test]
fn inspect_reports_network_counts() {
    cli()
        .arg("--no-footer")
        .arg("inspect")
        .arg("--network")
        .arg(fixture("basic_network.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("stops: 5"))
        .stdout(predicate::str::contains("patterns: 3"))
        .stdout(predicate::str::contains("transfers: 1"));
}

#[test]
fn inspect_describes_one_stop() {
    cli()
        .arg("inspect")
        .arg("--network")
        .arg(fixture("basic_network.json"))
        .arg("--stop")
        .arg("B")
        .assert()
        .success()
        .stdout(predicate::str::contains("Bravo (B)"))
        .stdout(predicate::str::contains("BUS L1 [Metro] 2 trips"))
        .stdout(predicate::str::contains("walk 300s to Delta"))
        .stdout(predicate::str::contains("Completed in"));
}
