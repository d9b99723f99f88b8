//! Search request parameters and the JSON request file that produces them.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cost::{to_raptor_cost, walk_cost, CostParams};
use crate::dominance::RelaxFunction;
use crate::error::{Error, Result};
use crate::heuristics::Heuristics;
use crate::model::AccessEgress;
use crate::network::{TransitDataProvider, TransitNetwork};
use crate::pass_through::PassThroughPoint;
use crate::time::{deserialize_opt_time, Duration, Time};
use crate::transit_group::TransitGroupPriorityConfig;

/// Which routing strategy drives the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Profile {
    /// Earliest arrival per number of transfers.
    Standard,
    /// Shortest door-to-door duration; a single departure-time iteration only.
    MinTravelDuration,
    /// Pareto-optimal on arrival time, transfers, cost and optional `c2`.
    #[default]
    MultiCriteria,
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Profile::Standard => "standard",
            Profile::MinTravelDuration => "min-travel-duration",
            Profile::MultiCriteria => "multi-criteria",
        };
        f.write_str(value)
    }
}

/// Slack in seconds applied around boarding, alighting and transfers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlackParams {
    pub board_slack: Duration,
    pub alight_slack: Duration,
    /// Added to the board slack when the previous arrival came from a trip.
    pub transfer_slack: Duration,
}

impl Default for SlackParams {
    fn default() -> Self {
        Self {
            board_slack: 0,
            alight_slack: 0,
            transfer_slack: 60,
        }
    }
}

impl SlackParams {
    /// Earliest time a trip can be boarded after arriving at `arrival_time`.
    pub fn earliest_board_time(&self, arrival_time: Time, after_transit: bool) -> Time {
        let transfer = if after_transit { self.transfer_slack } else { 0 };
        arrival_time + self.board_slack + transfer
    }
}

/// Time window and street legs of a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    pub earliest_departure_time: Option<Time>,
    pub latest_arrival_time: Option<Time>,
    /// Length of the departure window in seconds; 0 runs one iteration.
    pub search_window: Duration,
    pub iteration_step: Duration,
    pub max_number_of_transfers: usize,
    /// Also prefer later departures, producing a timetable-like result.
    pub timetable: bool,
    pub access: Vec<AccessEgress>,
    pub egress: Vec<AccessEgress>,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            earliest_departure_time: None,
            latest_arrival_time: None,
            search_window: 0,
            iteration_step: 60,
            max_number_of_transfers: 12,
            timetable: false,
            access: Vec::new(),
            egress: Vec::new(),
        }
    }
}

impl SearchParams {
    /// Maximum number of transit boardings.
    pub fn max_rounds(&self) -> usize {
        self.max_number_of_transfers + 1
    }

    pub fn num_iterations(&self) -> usize {
        if self.iteration_step <= 0 {
            return 1;
        }
        (self.search_window / self.iteration_step) as usize + 1
    }
}

/// Options only understood by the multi-criteria profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiCriteriaParams {
    /// Relaxation of `c1` at the destination, and at stops with transit-group priority.
    pub relax_c1: RelaxFunction,
    pub pass_through_points: Vec<PassThroughPoint>,
    pub transit_group_priority: TransitGroupPriorityConfig,
    /// Move transfer points of pass-through paths when it lowers the cost.
    pub optimize_transfers: bool,
}

impl Default for MultiCriteriaParams {
    fn default() -> Self {
        Self {
            relax_c1: RelaxFunction::NORMAL,
            pass_through_points: Vec::new(),
            transit_group_priority: TransitGroupPriorityConfig::default(),
            optimize_transfers: true,
        }
    }
}

/// Complete input of one search.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RaptorRequest {
    pub profile: Profile,
    pub search: SearchParams,
    pub slack: SlackParams,
    pub cost: CostParams,
    pub multi_criteria: MultiCriteriaParams,
    /// Stop issuing rounds and iterations after this long.
    pub timeout: Option<std::time::Duration>,
    /// Compute lower bounds for pruning when `heuristics` is not supplied.
    pub use_heuristics: bool,
    pub heuristics: Option<Heuristics>,
}

impl RaptorRequest {
    /// Single-iteration request departing at `earliest_departure_time`.
    pub fn new(
        profile: Profile,
        earliest_departure_time: Time,
        access: Vec<AccessEgress>,
        egress: Vec<AccessEgress>,
    ) -> Self {
        Self {
            profile,
            search: SearchParams {
                earliest_departure_time: Some(earliest_departure_time),
                access,
                egress,
                ..SearchParams::default()
            },
            use_heuristics: true,
            ..Self::default()
        }
    }

    pub fn with_search_window(mut self, search_window: Duration) -> Self {
        self.search.search_window = search_window;
        self
    }

    pub fn with_slack(mut self, slack: SlackParams) -> Self {
        self.slack = slack;
        self
    }

    pub fn with_pass_through_points(mut self, points: Vec<PassThroughPoint>) -> Self {
        self.multi_criteria.pass_through_points = points;
        self
    }

    pub fn with_transit_group_priority(mut self, config: TransitGroupPriorityConfig) -> Self {
        self.multi_criteria.transit_group_priority = config;
        self
    }

    pub fn has_pass_through(&self) -> bool {
        !self.multi_criteria.pass_through_points.is_empty()
    }

    pub fn has_transit_group_priority(&self) -> bool {
        !self.multi_criteria.transit_group_priority.is_empty()
    }

    /// Reject inconsistent requests before any search state is built.
    pub fn validate(&self, data: &dyn TransitDataProvider) -> Result<()> {
        let search = &self.search;
        if search.earliest_departure_time.is_none() && search.latest_arrival_time.is_none() {
            return Err(Error::invalid_request(
                "either earliest_departure_time or latest_arrival_time is required",
            ));
        }
        if let (Some(edt), Some(lat)) =
            (search.earliest_departure_time, search.latest_arrival_time)
        {
            if lat < edt {
                return Err(Error::invalid_request(
                    "latest_arrival_time is before earliest_departure_time",
                ));
            }
        }
        if search.search_window < 0 {
            return Err(Error::invalid_request("search_window must not be negative"));
        }
        if search.iteration_step <= 0 {
            return Err(Error::invalid_request("iteration_step must be positive"));
        }
        for leg in search.access.iter().chain(&search.egress) {
            if leg.stop >= data.num_stops() {
                return Err(Error::StopIndexOutOfRange {
                    index: leg.stop,
                    num_stops: data.num_stops(),
                });
            }
            if leg.duration < 0 || leg.c1 < 0 {
                return Err(Error::invalid_request(format!(
                    "street leg at stop {} has a negative duration or cost",
                    leg.stop
                )));
            }
        }
        let relax = self.multi_criteria.relax_c1;
        RelaxFunction::new(relax.ratio, relax.slack)?;

        if self.profile != Profile::MultiCriteria {
            if self.has_pass_through() {
                return Err(Error::incompatible(
                    self.profile,
                    "pass-through points need the multi-criteria profile",
                ));
            }
            if self.has_transit_group_priority() {
                return Err(Error::incompatible(
                    self.profile,
                    "transit-group priority needs the multi-criteria profile",
                ));
            }
        }
        if self.has_pass_through() && self.has_transit_group_priority() {
            return Err(Error::incompatible(
                self.profile,
                "pass-through points and transit-group priority both use c2",
            ));
        }
        if self.profile == Profile::MinTravelDuration && search.num_iterations() > 1 {
            return Err(Error::incompatible(
                self.profile,
                format!(
                    "only one departure-time iteration is supported, the window gives {}",
                    search.num_iterations()
                ),
            ));
        }
        Ok(())
    }
}

/// Street leg in a request file, by stop id.
#[derive(Debug, Clone, Deserialize)]
pub struct StreetLegRecord {
    pub stop: String,
    pub duration: Duration,
    /// Cost in seconds; defaults to walking cost.
    #[serde(default)]
    pub cost: Option<i32>,
    #[serde(default)]
    pub on_board: bool,
}

impl StreetLegRecord {
    fn resolve(&self, network: &TransitNetwork) -> Result<AccessEgress> {
        let stop = network.stop_index(&self.stop)?;
        let c1 = self
            .cost
            .map_or_else(|| walk_cost(self.duration), |cost| to_raptor_cost(f64::from(cost)));
        let leg = AccessEgress::with_cost(stop, self.duration, c1);
        Ok(if self.on_board { leg.on_board() } else { leg })
    }
}

/// Via point in a request file, by stop ids.
#[derive(Debug, Clone, Deserialize)]
pub struct ViaRecord {
    #[serde(default)]
    pub name: Option<String>,
    pub stops: Vec<String>,
}

/// Cost relaxation in a request file; `slack` is in seconds.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RelaxRecord {
    pub ratio: f64,
    #[serde(default)]
    pub slack: i32,
}

/// JSON request file, referring to stops by id.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestFile {
    #[serde(default)]
    pub profile: Profile,
    #[serde(default, deserialize_with = "deserialize_opt_time")]
    pub earliest_departure_time: Option<Time>,
    #[serde(default, deserialize_with = "deserialize_opt_time")]
    pub latest_arrival_time: Option<Time>,
    #[serde(default)]
    pub search_window: Duration,
    #[serde(default)]
    pub iteration_step: Option<Duration>,
    #[serde(default)]
    pub max_transfers: Option<usize>,
    #[serde(default)]
    pub timetable: bool,
    pub access: Vec<StreetLegRecord>,
    pub egress: Vec<StreetLegRecord>,
    #[serde(default)]
    pub slack: SlackParams,
    #[serde(default)]
    pub cost: CostParams,
    #[serde(default)]
    pub relax_c1: Option<RelaxRecord>,
    #[serde(default)]
    pub pass_through_points: Vec<ViaRecord>,
    #[serde(default)]
    pub transit_group_priority: TransitGroupPriorityConfig,
    #[serde(default)]
    pub optimize_transfers: Option<bool>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl RequestFile {
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Resolve stop ids against `network`.
    pub fn into_request(self, network: &TransitNetwork) -> Result<RaptorRequest> {
        let defaults = SearchParams::default();
        let access = self
            .access
            .iter()
            .map(|leg| leg.resolve(network))
            .collect::<Result<Vec<_>>>()?;
        let egress = self
            .egress
            .iter()
            .map(|leg| leg.resolve(network))
            .collect::<Result<Vec<_>>>()?;
        let pass_through_points = self
            .pass_through_points
            .into_iter()
            .map(|via| {
                let stops = via
                    .stops
                    .iter()
                    .map(|id| network.stop_index(id))
                    .collect::<Result<Vec<_>>>()?;
                Ok(PassThroughPoint {
                    name: via.name,
                    stops,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let relax_c1 = match self.relax_c1 {
            Some(relax) => RelaxFunction::new(relax.ratio, to_raptor_cost(f64::from(relax.slack)))?,
            None => RelaxFunction::NORMAL,
        };

        Ok(RaptorRequest {
            profile: self.profile,
            search: SearchParams {
                earliest_departure_time: self.earliest_departure_time,
                latest_arrival_time: self.latest_arrival_time,
                search_window: self.search_window,
                iteration_step: self.iteration_step.unwrap_or(defaults.iteration_step),
                max_number_of_transfers: self
                    .max_transfers
                    .unwrap_or(defaults.max_number_of_transfers),
                timetable: self.timetable,
                access,
                egress,
            },
            slack: self.slack,
            cost: self.cost,
            multi_criteria: MultiCriteriaParams {
                relax_c1,
                pass_through_points,
                transit_group_priority: self.transit_group_priority,
                optimize_transfers: self.optimize_transfers.unwrap_or(true),
            },
            timeout: self.timeout_ms.map(std::time::Duration::from_millis),
            use_heuristics: true,
            heuristics: None,
        })
    }
}
