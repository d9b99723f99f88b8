//! Schedule-independent lower bounds towards the destination.
//!
//! The bounds come from a reverse pass over the network starting at the
//! egress stops:
//! - the remaining travel duration uses the fastest hop of any trip between
//!   consecutive pattern stops, transfers and egress, and ignores waiting;
//! - the remaining boardings count one boarding per pattern ridden.
//!
//! Both are lower bounds, so pruning with them never drops an optimal path.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{AccessEgress, StopIndex};
use crate::network::TransitDataProvider;
use crate::time::{Duration, Time};

/// Per-stop lower bounds on remaining duration and boardings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heuristics {
    min_duration: Vec<Option<Duration>>,
    min_boardings: Vec<Option<usize>>,
}

impl Heuristics {
    pub fn compute(data: &dyn TransitDataProvider, egress: &[AccessEgress]) -> Self {
        let num_stops = data.num_stops();
        let min_duration = reverse_min_duration(data, egress, num_stops);
        let min_boardings = reverse_min_boardings(data, egress, num_stops);
        debug!(
            reachable = min_duration.iter().filter(|d| d.is_some()).count(),
            stops = num_stops,
            "computed destination heuristics"
        );
        Self {
            min_duration,
            min_boardings,
        }
    }

    pub fn num_stops(&self) -> usize {
        self.min_duration.len()
    }

    pub fn is_reachable(&self, stop: StopIndex) -> bool {
        self.min_duration[stop].is_some()
    }

    pub fn min_duration(&self, stop: StopIndex) -> Option<Duration> {
        self.min_duration[stop]
    }

    pub fn min_boardings(&self, stop: StopIndex) -> Option<usize> {
        self.min_boardings[stop]
    }

    /// Shortest possible door-to-door duration over the given access legs.
    pub fn min_travel_duration(&self, access: &[AccessEgress]) -> Option<Duration> {
        access
            .iter()
            .filter_map(|leg| self.min_duration(leg.stop).map(|d| d + leg.duration))
            .min()
    }

    /// Whether an arrival can still reach the destination within the limits.
    pub fn is_viable(
        &self,
        stop: StopIndex,
        time: Time,
        round: usize,
        max_rounds: usize,
        latest_arrival_time: Option<Time>,
    ) -> bool {
        let (Some(duration), Some(boardings)) = (self.min_duration(stop), self.min_boardings(stop))
        else {
            return false;
        };
        round + boardings <= max_rounds
            && latest_arrival_time.map_or(true, |lat| time + duration <= lat)
    }
}

fn reverse_min_duration(
    data: &dyn TransitDataProvider,
    egress: &[AccessEgress],
    num_stops: usize,
) -> Vec<Option<Duration>> {
    // reverse adjacency: stop -> (previous stop, duration)
    let mut reverse: Vec<Vec<(StopIndex, Duration)>> = vec![Vec::new(); num_stops];
    for index in 0..data.num_patterns() {
        let pattern = data.pattern(index);
        for pos in 1..pattern.num_stops() {
            let hop = pattern
                .trips
                .iter()
                .map(|trip| trip.arrival(pos) - trip.departure(pos - 1))
                .min();
            if let Some(hop) = hop {
                reverse[pattern.stop(pos)].push((pattern.stop(pos - 1), hop));
            }
        }
    }
    for from in 0..num_stops {
        for transfer in data.transfers_from(from) {
            reverse[transfer.to_stop].push((from, transfer.duration));
        }
    }

    let mut best: Vec<Option<Duration>> = vec![None; num_stops];
    let mut queue = BinaryHeap::new();
    for leg in egress {
        if best[leg.stop].map_or(true, |d| leg.duration < d) {
            best[leg.stop] = Some(leg.duration);
            queue.push(Reverse((leg.duration, leg.stop)));
        }
    }
    while let Some(Reverse((duration, stop))) = queue.pop() {
        if best[stop].is_some_and(|d| d < duration) {
            continue;
        }
        for &(prev, edge) in &reverse[stop] {
            let candidate = duration + edge;
            if best[prev].map_or(true, |d| candidate < d) {
                best[prev] = Some(candidate);
                queue.push(Reverse((candidate, prev)));
            }
        }
    }
    best
}

fn reverse_min_boardings(
    data: &dyn TransitDataProvider,
    egress: &[AccessEgress],
    num_stops: usize,
) -> Vec<Option<usize>> {
    let mut best: Vec<Option<usize>> = vec![None; num_stops];
    for leg in egress {
        best[leg.stop] = Some(0);
    }
    let improve = |slot: &mut Option<usize>, value: usize| -> bool {
        if slot.map_or(true, |current| value < current) {
            *slot = Some(value);
            true
        } else {
            false
        }
    };

    let mut changed = true;
    while changed {
        changed = false;
        for index in 0..data.num_patterns() {
            let pattern = data.pattern(index);
            let mut best_after: Option<usize> = None;
            for pos in (0..pattern.num_stops()).rev() {
                let stop = pattern.stop(pos);
                if let Some(after) = best_after {
                    changed |= improve(&mut best[stop], after + 1);
                }
                if let Some(here) = best[stop] {
                    best_after = Some(best_after.map_or(here, |b| b.min(here)));
                }
            }
        }
        for from in 0..num_stops {
            for transfer in data.transfers_from(from) {
                if let Some(to) = best[transfer.to_stop] {
                    changed |= improve(&mut best[from], to);
                }
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RouteInfo, TripSchedule};
    use crate::network::TransitNetworkBuilder;

    #[test]
    fn lower_bounds_follow_fastest_hops_and_transfers() {
        let mut b = TransitNetworkBuilder::new();
        let [a, s1, s2, s3, island] =
            ["A", "B", "C", "D", "E"].map(|id| b.add_stop(id).unwrap());
        b.add_pattern(
            RouteInfo::new("L1", "X", "BUS"),
            vec![a, s1],
            vec![
                TripSchedule::new("slow", vec![0, 600]),
                TripSchedule::new("fast", vec![1_000, 1_300]),
            ],
        )
        .unwrap();
        b.add_pattern(
            RouteInfo::new("L2", "X", "BUS"),
            vec![s2, s3],
            vec![TripSchedule::new("t", vec![0, 200])],
        )
        .unwrap();
        b.add_transfer(s1, s2, 60).unwrap();
        let net = b.build().unwrap();

        let h = Heuristics::compute(&net, &[AccessEgress::walk(s3, 30)]);
        assert_eq!(h.min_duration(s3), Some(30));
        assert_eq!(h.min_duration(s2), Some(230));
        assert_eq!(h.min_duration(s1), Some(290));
        assert_eq!(h.min_duration(a), Some(590));
        assert_eq!(h.min_boardings(a), Some(2));
        assert_eq!(h.min_boardings(s1), Some(1));
        assert!(!h.is_reachable(island));
        assert_eq!(h.min_travel_duration(&[AccessEgress::walk(a, 10)]), Some(600));
    }

    #[test]
    fn viability_respects_rounds_and_latest_arrival() {
        let mut b = TransitNetworkBuilder::new();
        let [a, z] = ["A", "Z"].map(|id| b.add_stop(id).unwrap());
        b.add_pattern(
            RouteInfo::new("L1", "X", "BUS"),
            vec![a, z],
            vec![TripSchedule::new("t", vec![0, 100])],
        )
        .unwrap();
        let net = b.build().unwrap();
        let h = Heuristics::compute(&net, &[AccessEgress::walk(z, 0)]);

        assert!(h.is_viable(a, 0, 0, 1, None));
        assert!(!h.is_viable(a, 0, 1, 1, None));
        assert!(h.is_viable(a, 0, 0, 1, Some(100)));
        assert!(!h.is_viable(a, 1, 0, 1, Some(100)));
    }
}
