//! Request-scoped, immutable search context.
//!
//! [`SearchContext::new`] validates the request and builds every
//! request-scoped service up front, so configuration errors surface before
//! the first round runs and the search itself only reads shared state.

use std::borrow::Cow;
use std::time::Instant;

use tracing::{debug, warn};

use crate::cost::CostCalculator;
use crate::dominance::{C2Criterion, RelaxFunction};
use crate::error::{Error, Result};
use crate::heuristics::Heuristics;
use crate::model::{AccessEgress, StopIndex};
use crate::network::TransitDataProvider;
use crate::pass_through::PassThroughPointsService;
use crate::request::{Profile, RaptorRequest, SlackParams};
use crate::time::{Duration, Time};
use crate::transit_group::TransitGroupPriorityService;

/// Departure-time window used when only a latest arrival time is given and
/// no lower bound on the travel time is available.
const DEFAULT_TRAVEL_WINDOW: Duration = 2 * 3600;

/// Everything one search reads, resolved from a [`RaptorRequest`].
pub struct SearchContext<'a> {
    pub data: &'a dyn TransitDataProvider,
    pub profile: Profile,
    pub slack: SlackParams,
    pub cost: CostCalculator,
    pub access: &'a [AccessEgress],
    pub egress: &'a [AccessEgress],
    pub max_rounds: usize,
    pub earliest_departure_time: Time,
    pub latest_arrival_time: Option<Time>,
    pub search_window: Duration,
    pub iteration_step: Duration,
    pub timetable: bool,
    pub relax_c1: RelaxFunction,
    pub optimize_transfers: bool,
    pub pass_through: Option<PassThroughPointsService>,
    pub transit_groups: Option<TransitGroupPriorityService>,
    egress_by_stop: Vec<Vec<AccessEgress>>,
    heuristics: Option<Cow<'a, Heuristics>>,
    deadline: Option<Instant>,
}

impl<'a> SearchContext<'a> {
    pub fn new(
        data: &'a dyn TransitDataProvider,
        request: &'a RaptorRequest,
        deadline: Option<Instant>,
    ) -> Result<Self> {
        request.validate(data)?;
        let search = &request.search;
        let mc = &request.multi_criteria;

        let pass_through = if request.has_pass_through() {
            Some(PassThroughPointsService::new(
                &mc.pass_through_points,
                data.num_stops(),
            )?)
        } else {
            None
        };
        let transit_groups = if request.has_transit_group_priority() {
            Some(TransitGroupPriorityService::build(
                &mc.transit_group_priority,
                data,
            )?)
        } else {
            None
        };

        let heuristics = match &request.heuristics {
            Some(precomputed) => {
                if precomputed.num_stops() != data.num_stops() {
                    return Err(Error::invalid_request(format!(
                        "heuristics cover {} stops, network has {}",
                        precomputed.num_stops(),
                        data.num_stops()
                    )));
                }
                Some(Cow::Borrowed(precomputed))
            }
            None if request.use_heuristics => {
                Some(Cow::Owned(Heuristics::compute(data, &search.egress)))
            }
            None => None,
        };

        let bounds = (search.earliest_departure_time, search.latest_arrival_time);
        let earliest_departure_time = match bounds {
            (Some(edt), _) => edt,
            (None, Some(lat)) => {
                let travel = match &heuristics {
                    Some(h) => h.min_travel_duration(&search.access).ok_or_else(|| {
                        Error::invalid_request(
                            "latest-arrival search: no access stop can reach the destination",
                        )
                    })?,
                    None => DEFAULT_TRAVEL_WINDOW,
                };
                lat - search.search_window - travel
            }
            (None, None) => {
                return Err(Error::invalid_request(
                    "either earliest_departure_time or latest_arrival_time is required",
                ))
            }
        };

        let mut egress_by_stop = vec![Vec::new(); data.num_stops()];
        for leg in &search.egress {
            egress_by_stop[leg.stop].push(*leg);
        }
        if search.access.is_empty() || search.egress.is_empty() {
            warn!(
                access = search.access.len(),
                egress = search.egress.len(),
                "request has no access or no egress legs; no journey can be found"
            );
        }
        debug!(
            profile = %request.profile,
            earliest_departure_time,
            latest_arrival_time = ?search.latest_arrival_time,
            iterations = search.num_iterations(),
            "search context ready"
        );

        Ok(Self {
            data,
            profile: request.profile,
            slack: request.slack,
            cost: CostCalculator::new(&request.cost),
            access: &search.access,
            egress: &search.egress,
            max_rounds: search.max_rounds(),
            earliest_departure_time,
            latest_arrival_time: search.latest_arrival_time,
            search_window: search.search_window,
            iteration_step: search.iteration_step,
            timetable: search.timetable,
            relax_c1: mc.relax_c1,
            optimize_transfers: mc.optimize_transfers,
            pass_through,
            transit_groups,
            egress_by_stop,
            heuristics,
            deadline,
        })
    }

    /// The active secondary criterion, if any.
    pub fn c2(&self) -> Option<&dyn C2Criterion> {
        if let Some(service) = &self.pass_through {
            return Some(service as &dyn C2Criterion);
        }
        self.transit_groups
            .as_ref()
            .map(|service| service as &dyn C2Criterion)
    }

    pub fn initial_c2(&self) -> u32 {
        self.c2().map_or(0, |c2| c2.initial_c2())
    }

    pub fn egress(&self, stop: StopIndex) -> &[AccessEgress] {
        &self.egress_by_stop[stop]
    }

    pub fn heuristics(&self) -> Option<&Heuristics> {
        self.heuristics.as_deref()
    }

    /// Departure times of all iterations, latest first.
    pub fn departure_times(&self) -> impl Iterator<Item = Time> + '_ {
        let iterations = (self.search_window / self.iteration_step) as usize + 1;
        (0..iterations)
            .rev()
            .map(move |i| self.earliest_departure_time + i as Time * self.iteration_step)
    }

    /// Whether an arrival can still lead to a journey within the limits.
    pub fn is_viable(&self, stop: StopIndex, time: Time, round: usize) -> bool {
        if self.latest_arrival_time.is_some_and(|lat| time > lat) {
            return false;
        }
        self.heuristics().map_or(true, |h| {
            h.is_viable(stop, time, round, self.max_rounds, self.latest_arrival_time)
        })
    }

    pub fn deadline_passed(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}
