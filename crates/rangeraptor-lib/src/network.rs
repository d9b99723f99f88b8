//! Immutable transit network and the read-only provider interface the search consumes.
//!
//! A [`TransitNetwork`] is built once (from JSON or through
//! [`TransitNetworkBuilder`]) and then shared by any number of concurrent
//! searches.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::cost::{to_raptor_cost, walk_cost};
use crate::error::{Error, Result};
use crate::model::{PatternIndex, RouteInfo, Stop, StopIndex, Transfer, TripPattern, TripSchedule};
use crate::time::{deserialize_times, Duration, Time};

/// Read-only schedule and transfer data used by the search.
pub trait TransitDataProvider: Send + Sync {
    fn num_stops(&self) -> usize;

    fn stop_name(&self, stop: StopIndex) -> &str;

    /// Patterns serving `stop`, in ascending pattern index order.
    fn patterns_for_stop(&self, stop: StopIndex) -> &[PatternIndex];

    fn num_patterns(&self) -> usize;

    fn pattern(&self, index: PatternIndex) -> &TripPattern;

    fn transfers_from(&self, stop: StopIndex) -> &[Transfer];

    /// Boarding cost at `stop` in raptor cost units.
    fn board_cost(&self, _stop: StopIndex) -> i32 {
        0
    }

    /// Alighting cost at `stop` in raptor cost units.
    fn alight_cost(&self, _stop: StopIndex) -> i32 {
        0
    }
}

/// In-memory transit network.
#[derive(Debug, Clone)]
pub struct TransitNetwork {
    stops: Vec<Stop>,
    patterns: Vec<TripPattern>,
    patterns_by_stop: Vec<Vec<PatternIndex>>,
    transfers: Vec<Vec<Transfer>>,
    stop_index_by_id: HashMap<String, StopIndex>,
}

impl TransitNetwork {
    /// Build a network from its JSON file representation.
    pub fn from_file(file: NetworkFile) -> Result<Self> {
        let mut builder = TransitNetworkBuilder::default();
        for record in file.stops {
            let mut stop = Stop::new(&record.id, record.name.as_deref().unwrap_or(&record.id));
            stop.board_cost = record.board_cost;
            stop.alight_cost = record.alight_cost;
            builder.push_stop(stop)?;
        }
        for route in file.routes {
            let stops = route
                .stops
                .iter()
                .map(|id| builder.resolve(id))
                .collect::<Result<Vec<_>>>()?;
            let info = RouteInfo {
                id: route.id,
                agency: route.agency,
                mode: route.mode,
                sub_mode: route.sub_mode,
            };
            let trips = route
                .trips
                .into_iter()
                .map(|trip| match trip.departures {
                    Some(departures) => {
                        TripSchedule::with_departures(trip.id, trip.times, departures)
                    }
                    None => TripSchedule::new(trip.id, trip.times),
                })
                .collect();
            builder.add_pattern(info, stops, trips)?;
        }
        for transfer in file.transfers {
            let from = builder.resolve(&transfer.from)?;
            let to = builder.resolve(&transfer.to)?;
            match transfer.cost {
                Some(cost) => builder.add_transfer_with_cost(
                    from,
                    to,
                    transfer.duration,
                    to_raptor_cost(f64::from(cost)),
                )?,
                None => builder.add_transfer(from, to, transfer.duration)?,
            }
        }
        builder.build()
    }

    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    pub fn patterns(&self) -> &[TripPattern] {
        &self.patterns
    }

    pub fn num_trips(&self) -> usize {
        self.patterns.iter().map(|p| p.trips.len()).sum()
    }

    pub fn num_transfers(&self) -> usize {
        self.transfers.iter().map(Vec::len).sum()
    }

    pub fn stop(&self, stop: StopIndex) -> &Stop {
        &self.stops[stop]
    }

    /// Resolve a stop id, suggesting close matches when it is unknown.
    pub fn stop_index(&self, id: &str) -> Result<StopIndex> {
        self.stop_index_by_id
            .get(id)
            .copied()
            .ok_or_else(|| Error::UnknownStop {
                name: id.to_string(),
                suggestions: self.fuzzy_stop_matches(id, 3),
            })
    }

    /// Up to `limit` stop ids similar to `query`, best match first.
    pub fn fuzzy_stop_matches(&self, query: &str, limit: usize) -> Vec<String> {
        let query = query.to_lowercase();
        let mut scored: Vec<(f64, &str)> = self
            .stops
            .iter()
            .filter_map(|stop| {
                let by_id = strsim::jaro_winkler(&query, &stop.id.to_lowercase());
                let by_name = strsim::jaro_winkler(&query, &stop.name.to_lowercase());
                let score = by_id.max(by_name);
                (score >= 0.75).then_some((score, stop.id.as_str()))
            })
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
        scored
            .into_iter()
            .take(limit)
            .map(|(_, id)| id.to_string())
            .collect()
    }

    /// Validate that `stop` exists.
    pub fn check_stop(&self, stop: StopIndex) -> Result<()> {
        if stop < self.stops.len() {
            Ok(())
        } else {
            Err(Error::StopIndexOutOfRange {
                index: stop,
                num_stops: self.stops.len(),
            })
        }
    }
}

impl TransitDataProvider for TransitNetwork {
    fn num_stops(&self) -> usize {
        self.stops.len()
    }

    fn stop_name(&self, stop: StopIndex) -> &str {
        &self.stops[stop].name
    }

    fn patterns_for_stop(&self, stop: StopIndex) -> &[PatternIndex] {
        &self.patterns_by_stop[stop]
    }

    fn num_patterns(&self) -> usize {
        self.patterns.len()
    }

    fn pattern(&self, index: PatternIndex) -> &TripPattern {
        &self.patterns[index]
    }

    fn transfers_from(&self, stop: StopIndex) -> &[Transfer] {
        &self.transfers[stop]
    }

    fn board_cost(&self, stop: StopIndex) -> i32 {
        to_raptor_cost(f64::from(self.stops[stop].board_cost))
    }

    fn alight_cost(&self, stop: StopIndex) -> i32 {
        to_raptor_cost(f64::from(self.stops[stop].alight_cost))
    }
}

/// Incremental builder used by the JSON loader and by tests.
#[derive(Debug, Default)]
pub struct TransitNetworkBuilder {
    stops: Vec<Stop>,
    patterns: Vec<TripPattern>,
    transfers: Vec<(StopIndex, Transfer)>,
    stop_index_by_id: HashMap<String, StopIndex>,
}

impl TransitNetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a stop whose name equals its id.
    pub fn add_stop(&mut self, id: &str) -> Result<StopIndex> {
        self.push_stop(Stop::new(id, id))
    }

    pub fn push_stop(&mut self, stop: Stop) -> Result<StopIndex> {
        if self.stop_index_by_id.contains_key(&stop.id) {
            return Err(Error::invalid_network(format!("duplicate stop id {}", stop.id)));
        }
        let index = self.stops.len();
        self.stop_index_by_id.insert(stop.id.clone(), index);
        self.stops.push(stop);
        Ok(index)
    }

    pub fn add_pattern(
        &mut self,
        route: RouteInfo,
        stops: Vec<StopIndex>,
        trips: Vec<TripSchedule>,
    ) -> Result<PatternIndex> {
        for &stop in &stops {
            self.check_stop(stop)?;
        }
        let index = self.patterns.len();
        self.patterns.push(TripPattern::new(index, route, stops, trips)?);
        Ok(index)
    }

    pub fn add_transfer(
        &mut self,
        from: StopIndex,
        to: StopIndex,
        duration: Duration,
    ) -> Result<()> {
        self.add_transfer_with_cost(from, to, duration, walk_cost(duration))
    }

    pub fn add_transfer_with_cost(
        &mut self,
        from: StopIndex,
        to: StopIndex,
        duration: Duration,
        c1: i32,
    ) -> Result<()> {
        self.check_stop(from)?;
        self.check_stop(to)?;
        if duration < 0 || c1 < 0 {
            return Err(Error::invalid_network(format!(
                "transfer {from} -> {to} has a negative duration or cost"
            )));
        }
        self.transfers.push((from, Transfer { to_stop: to, duration, c1 }));
        Ok(())
    }

    pub fn build(self) -> Result<TransitNetwork> {
        let num_stops = self.stops.len();
        let mut patterns_by_stop = vec![Vec::new(); num_stops];
        for pattern in &self.patterns {
            for &stop in &pattern.stops {
                let served: &mut Vec<PatternIndex> = &mut patterns_by_stop[stop];
                if served.last() != Some(&pattern.index) {
                    served.push(pattern.index);
                }
            }
        }
        let mut transfers = vec![Vec::new(); num_stops];
        for (from, transfer) in self.transfers {
            transfers[from].push(transfer);
        }
        debug!(
            stops = num_stops,
            patterns = self.patterns.len(),
            "built transit network"
        );
        Ok(TransitNetwork {
            stops: self.stops,
            patterns: self.patterns,
            patterns_by_stop,
            transfers,
            stop_index_by_id: self.stop_index_by_id,
        })
    }

    fn resolve(&self, id: &str) -> Result<StopIndex> {
        self.stop_index_by_id
            .get(id)
            .copied()
            .ok_or_else(|| Error::invalid_network(format!("reference to unknown stop {id}")))
    }

    fn check_stop(&self, stop: StopIndex) -> Result<()> {
        if stop < self.stops.len() {
            Ok(())
        } else {
            Err(Error::invalid_network(format!("unknown stop index {stop}")))
        }
    }
}

/// Load and validate a network from a JSON file.
pub fn load_network(path: &Path) -> Result<TransitNetwork> {
    let raw = fs::read_to_string(path)?;
    let file: NetworkFile = serde_json::from_str(&raw)?;
    TransitNetwork::from_file(file)
}

/// JSON representation of a transit network.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkFile {
    pub stops: Vec<StopRecord>,
    pub routes: Vec<RouteRecord>,
    #[serde(default)]
    pub transfers: Vec<TransferRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StopRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub board_cost: i32,
    #[serde(default)]
    pub alight_cost: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouteRecord {
    pub id: String,
    pub agency: String,
    pub mode: String,
    #[serde(default)]
    pub sub_mode: Option<String>,
    pub stops: Vec<String>,
    pub trips: Vec<TripRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TripRecord {
    pub id: String,
    /// Arrival times (and departure times unless `departures` is given).
    #[serde(deserialize_with = "deserialize_times")]
    pub times: Vec<Time>,
    #[serde(default, deserialize_with = "deserialize_opt_times")]
    pub departures: Option<Vec<Time>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransferRecord {
    pub from: String,
    pub to: String,
    /// Walking duration in seconds.
    pub duration: Duration,
    /// Cost in seconds; defaults to the walking cost of `duration`.
    #[serde(default)]
    pub cost: Option<i32>,
}

fn deserialize_opt_times<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Vec<Time>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "deserialize_times")] Vec<Time>);

    let value: Option<Wrapper> = Deserialize::deserialize(deserializer)?;
    Ok(value.map(|Wrapper(times)| times))
}
