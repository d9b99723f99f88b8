//! Range-Raptor transit search library.
//!
//! This crate loads a timetable network into memory and answers journey
//! requests with pareto-optimal paths over arrival time, number of transfers,
//! generalized cost and an optional secondary criterion (ordered via points or
//! transit-group priority). Higher-level consumers (the CLI) should only
//! depend on the items exported here.
//!

#![deny(warnings)]

pub mod context;
pub mod cost;
pub mod destination;
pub mod dominance;
pub mod error;
pub mod heuristics;
pub mod model;
pub mod network;
pub mod output;
pub mod pareto;
pub mod pass_through;
pub mod path;
pub mod request;
pub mod routing;
pub mod state;
pub mod strategy;
pub mod time;
pub mod transfer_optimization;
pub mod transit_group;
pub mod worker;

pub use cost::{CostCalculator, CostParams};
pub use dominance::{ArrivalDominanceFactory, C2Criterion, RelaxFunction};
pub use error::{Error, Result};
pub use heuristics::Heuristics;
pub use model::{AccessEgress, RouteInfo, Stop, StopIndex, Transfer, TripPattern, TripSchedule};
pub use network::{load_network, TransitDataProvider, TransitNetwork, TransitNetworkBuilder};
pub use output::{JourneyRenderMode, JourneySummary, LegSummary, ResponseSummary};
pub use pareto::{Insert, ParetoComparator, ParetoSet};
pub use pass_through::{PassThroughPoint, PassThroughPointsService};
pub use path::{Path, PathLeg};
pub use request::{Profile, RaptorRequest, RequestFile, SearchParams, SlackParams};
pub use routing::{route, route_with_deadline, RaptorResponse};
pub use time::{format_duration, format_time, parse_time, Duration, Time};
pub use transit_group::{
    TransitGroupPriorityConfig, TransitGroupPriorityService, TransitGroupSelect,
};
