//! Common test utilities and fixture helpers.
//!
//! Provides the fixture directory and small hand-built networks shared by the
//! integration tests.

use std::path::PathBuf;

use rangeraptor_lib::{
    load_network, parse_time, RouteInfo, StopIndex, Time, TransitNetwork, TransitNetworkBuilder,
    TripSchedule,
};

/// Path to fixtures directory used by tests.
#[allow(dead_code)]
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

/// The five-stop network in `docs/fixtures/basic_network.json`.
#[allow(dead_code)]
pub fn basic_network() -> TransitNetwork {
    load_network(&fixtures_dir().join("basic_network.json")).expect("fixture loads")
}

#[allow(dead_code)]
pub fn t(value: &str) -> Time {
    parse_time(value).expect("valid time")
}

/// Stops of [`two_leg_network`].
#[allow(dead_code)]
#[derive(Debug, Clone, Copy)]
pub struct TwoLegStops {
    pub origin: StopIndex,
    pub transfer_from: StopIndex,
    pub transfer_to: StopIndex,
    pub destination: StopIndex,
}

/// Two trips joined by a 360 s walk:
/// `O --L1 10:06:20-10:26:20--> B ~walk~ C --L2 10:35-10:45--> Z`.
#[allow(dead_code)]
pub fn two_leg_network() -> (TransitNetwork, TwoLegStops) {
    let mut b = TransitNetworkBuilder::new();
    let [origin, transfer_from, transfer_to, destination] =
        ["O", "B", "C", "Z"].map(|id| b.add_stop(id).expect("stop"));
    b.add_pattern(
        RouteInfo::new("L1", "Metro", "BUS"),
        vec![origin, transfer_from],
        vec![TripSchedule::new("l1-1", vec![t("10:06:20"), t("10:26:20")])],
    )
    .expect("pattern L1");
    b.add_pattern(
        RouteInfo::new("L2", "Metro", "BUS"),
        vec![transfer_to, destination],
        vec![TripSchedule::new("l2-1", vec![t("10:35"), t("10:45")])],
    )
    .expect("pattern L2");
    b.add_transfer(transfer_from, transfer_to, 360)
        .expect("transfer");
    let net = b.build().expect("network builds");
    (
        net,
        TwoLegStops {
            origin,
            transfer_from,
            transfer_to,
            destination,
        },
    )
}
