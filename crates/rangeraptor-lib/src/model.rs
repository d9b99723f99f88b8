use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cost::walk_cost;
use crate::error::{Error, Result};
use crate::time::{Duration, Time};

/// Dense stop index (`0..num_stops`).
pub type StopIndex = usize;

/// Index of a trip pattern within the network.
pub type PatternIndex = usize;

/// A boardable stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stop {
    pub id: String,
    pub name: String,
    /// Extra cost in seconds added when boarding at this stop.
    #[serde(default)]
    pub board_cost: i32,
    /// Extra cost in seconds added when alighting at this stop.
    #[serde(default)]
    pub alight_cost: i32,
}

impl Stop {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            board_cost: 0,
            alight_cost: 0,
        }
    }
}

/// Route attributes used for display and transit-group matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteInfo {
    pub id: String,
    pub agency: String,
    pub mode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_mode: Option<String>,
}

impl RouteInfo {
    pub fn new(id: impl Into<String>, agency: impl Into<String>, mode: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            agency: agency.into(),
            mode: mode.into(),
            sub_mode: None,
        }
    }

    pub fn with_sub_mode(mut self, sub_mode: impl Into<String>) -> Self {
        self.sub_mode = Some(sub_mode.into());
        self
    }
}

impl fmt::Display for RouteInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.mode, self.id)
    }
}

/// One scheduled run of a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripSchedule {
    pub id: String,
    pub arrivals: Vec<Time>,
    pub departures: Vec<Time>,
}

impl TripSchedule {
    /// Trip where arrival and departure coincide at every stop.
    pub fn new(id: impl Into<String>, times: Vec<Time>) -> Self {
        Self {
            id: id.into(),
            arrivals: times.clone(),
            departures: times,
        }
    }

    pub fn with_departures(
        id: impl Into<String>,
        arrivals: Vec<Time>,
        departures: Vec<Time>,
    ) -> Self {
        Self {
            id: id.into(),
            arrivals,
            departures,
        }
    }

    #[inline]
    pub fn arrival(&self, stop_pos: usize) -> Time {
        self.arrivals[stop_pos]
    }

    #[inline]
    pub fn departure(&self, stop_pos: usize) -> Time {
        self.departures[stop_pos]
    }

    fn validate(&self, num_stops: usize) -> Result<()> {
        if self.arrivals.len() != num_stops || self.departures.len() != num_stops {
            return Err(Error::invalid_network(format!(
                "trip {} has {} arrivals and {} departures for {} stops",
                self.id,
                self.arrivals.len(),
                self.departures.len(),
                num_stops
            )));
        }
        for pos in 0..num_stops {
            if self.departures[pos] < self.arrivals[pos] {
                return Err(Error::invalid_network(format!(
                    "trip {} departs before it arrives at stop position {pos}",
                    self.id
                )));
            }
            if pos > 0 && self.arrivals[pos] < self.departures[pos - 1] {
                return Err(Error::invalid_network(format!(
                    "trip {} goes back in time at stop position {pos}",
                    self.id
                )));
            }
        }
        Ok(())
    }
}

/// An ordered stop sequence served by trips that never overtake each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TripPattern {
    pub index: PatternIndex,
    pub route: RouteInfo,
    pub stops: Vec<StopIndex>,
    pub trips: Vec<TripSchedule>,
}

impl TripPattern {
    /// Build a pattern, sorting trips by departure and rejecting overtaking.
    pub fn new(
        index: PatternIndex,
        route: RouteInfo,
        stops: Vec<StopIndex>,
        mut trips: Vec<TripSchedule>,
    ) -> Result<Self> {
        if stops.len() < 2 {
            return Err(Error::invalid_network(format!(
                "route {} must serve at least two stops",
                route.id
            )));
        }
        for trip in &trips {
            trip.validate(stops.len())?;
        }
        trips.sort_by(|a, b| {
            a.departure(0)
                .cmp(&b.departure(0))
                .then_with(|| a.id.cmp(&b.id))
        });
        for pair in trips.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            let overtakes = (0..stops.len())
                .any(|pos| b.departure(pos) < a.departure(pos) || b.arrival(pos) < a.arrival(pos));
            if overtakes {
                return Err(Error::invalid_network(format!(
                    "trip {} overtakes trip {} on route {}",
                    b.id, a.id, route.id
                )));
            }
        }
        Ok(Self {
            index,
            route,
            stops,
            trips,
        })
    }

    #[inline]
    pub fn num_stops(&self) -> usize {
        self.stops.len()
    }

    #[inline]
    pub fn stop(&self, stop_pos: usize) -> StopIndex {
        self.stops[stop_pos]
    }

    pub fn trip(&self, trip_index: usize) -> &TripSchedule {
        &self.trips[trip_index]
    }

    /// Positions at which this pattern serves `stop` (a loop may serve it twice).
    pub fn stop_positions(&self, stop: StopIndex) -> impl Iterator<Item = usize> + '_ {
        self.stops
            .iter()
            .enumerate()
            .filter(move |(_, s)| **s == stop)
            .map(|(pos, _)| pos)
    }

    /// Earliest trip among `trips[..limit]` departing `stop_pos` at or after
    /// `earliest_board_time` and, when given, no later than `latest_board_time`.
    pub fn find_earliest_trip(
        &self,
        stop_pos: usize,
        earliest_board_time: Time,
        latest_board_time: Option<Time>,
        limit: usize,
    ) -> Option<usize> {
        let limit = limit.min(self.trips.len());
        let candidates = &self.trips[..limit];
        let index =
            candidates.partition_point(|trip| trip.departure(stop_pos) < earliest_board_time);
        if index == limit {
            return None;
        }
        match latest_board_time {
            Some(latest) if candidates[index].departure(stop_pos) > latest => None,
            _ => Some(index),
        }
    }
}

/// Walking transfer between two stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transfer {
    pub to_stop: StopIndex,
    pub duration: Duration,
    /// Generalized cost in centi-seconds.
    pub c1: i32,
}

impl Transfer {
    pub fn walk(to_stop: StopIndex, duration: Duration) -> Self {
        Self {
            to_stop,
            duration,
            c1: walk_cost(duration),
        }
    }
}

/// Street leg from the origin to a stop (access) or from a stop to the destination (egress).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessEgress {
    pub stop: StopIndex,
    pub duration: Duration,
    /// Generalized cost in centi-seconds.
    pub c1: i32,
    /// The traveler is already on a vehicle when reaching `stop` (e.g. a flex ride).
    #[serde(default)]
    pub arrived_on_board: bool,
}

impl AccessEgress {
    pub fn walk(stop: StopIndex, duration: Duration) -> Self {
        Self::with_cost(stop, duration, walk_cost(duration))
    }

    pub fn with_cost(stop: StopIndex, duration: Duration, c1: i32) -> Self {
        Self {
            stop,
            duration,
            c1,
            arrived_on_board: false,
        }
    }

    pub fn on_board(mut self) -> Self {
        self.arrived_on_board = true;
        self
    }
}
