mod common;

use std::fs;

use rangeraptor_lib::{load_network, Error, RequestFile, TransitDataProvider};
use tempfile::tempdir;

use common::{basic_network, fixtures_dir};

#[test]
fn basic_fixture_loads() {
    let net = basic_network();
    assert_eq!(net.num_stops(), 5);
    assert_eq!(net.num_patterns(), 3);
    assert_eq!(net.num_trips(), 5);
    assert_eq!(net.num_transfers(), 1);
    assert_eq!(net.stop_name(net.stop_index("D").unwrap()), "Delta");
    // stop board cost is given in seconds
    assert_eq!(net.board_cost(net.stop_index("D").unwrap()), 3_000);
}

#[test]
fn request_fixture_resolves_against_the_network() {
    let net = basic_network();
    let request = RequestFile::from_path(&fixtures_dir().join("via_request.json"))
        .expect("request parses")
        .into_request(&net)
        .expect("request resolves");
    assert_eq!(request.search.access.len(), 1);
    assert_eq!(request.search.egress.len(), 1);
    assert_eq!(
        request.multi_criteria.pass_through_points[0].stops,
        vec![net.stop_index("C").unwrap()]
    );
    assert_eq!(request.search.num_iterations(), 11);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempdir().expect("temp dir");
    let error = load_network(&dir.path().join("missing.json")).expect_err("no file");
    assert!(matches!(error, Error::Io(_)));
}

#[test]
fn overtaking_trips_are_rejected_on_load() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("network.json");
    fs::write(
        &path,
        r#"{
            "stops": [{"id": "A"}, {"id": "B"}],
            "routes": [{
                "id": "L1", "agency": "Metro", "mode": "BUS", "stops": ["A", "B"],
                "trips": [
                    {"id": "slow", "times": ["10:00", "10:30"]},
                    {"id": "fast", "times": ["10:05", "10:20"]}
                ]
            }]
        }"#,
    )
    .expect("write network");

    let error = load_network(&path).expect_err("overtaking");
    assert!(matches!(error, Error::InvalidNetwork { .. }));
    assert!(format!("{error}").contains("overtakes"));
}

#[test]
fn unknown_stop_in_request_suggests_alternatives() {
    let net = basic_network();
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("request.json");
    fs::write(
        &path,
        r#"{"earliest_departure_time": "10:00",
            "access": [{"stop": "AA", "duration": 60}],
            "egress": [{"stop": "Z", "duration": 60}]}"#,
    )
    .expect("write request");

    let error = RequestFile::from_path(&path)
        .expect("request parses")
        .into_request(&net)
        .expect_err("unknown stop");
    match error {
        Error::UnknownStop { name, suggestions } => {
            assert_eq!(name, "AA");
            assert!(suggestions.contains(&"A".to_string()));
        }
        other => panic!("unexpected error: {other}"),
    }
}
