use fixedbitset::FixedBitSet;
use tracing::trace;

use super::arrival::Arrival;
use crate::dominance::ArrivalComparator;
use crate::model::StopIndex;
use crate::pareto::{Insert, ParetoSet};

/// One pareto set of arrivals per stop.
///
/// The round is one of the compared criteria, so a single set per stop holds
/// the pareto-optimal arrivals of every round. Each set's marker separates
/// arrivals already used for boarding from those added since.
#[derive(Debug)]
pub struct McStopArrivals {
    sets: Vec<ParetoSet<Arrival, ArrivalComparator>>,
    touched: FixedBitSet,
}

impl McStopArrivals {
    pub fn new(num_stops: usize, comparator: ArrivalComparator) -> Self {
        Self {
            sets: (0..num_stops).map(|_| ParetoSet::new(comparator)).collect(),
            touched: FixedBitSet::with_capacity(num_stops),
        }
    }

    pub fn qualify(&self, arrival: &Arrival) -> bool {
        self.sets[arrival.stop].qualify(arrival)
    }

    /// Insert `arrival`; returns whether it was accepted.
    pub fn add(&mut self, arrival: Arrival) -> bool {
        match self.sets[arrival.stop].insert(arrival) {
            Insert::Accepted { evicted } => {
                if !evicted.is_empty() {
                    trace!(stop = arrival.stop, evicted = evicted.len(), "arrivals evicted");
                }
                self.touched.insert(arrival.stop);
                true
            }
            Insert::Rejected => false,
        }
    }

    pub fn arrivals(&self, stop: StopIndex) -> &[Arrival] {
        self.sets[stop].as_slice()
    }

    /// Arrivals at `stop` added since the last [`McStopArrivals::take_new_arrivals`].
    pub fn new_arrivals(&self, stop: StopIndex) -> &[Arrival] {
        self.sets[stop].since_marker()
    }

    /// Stops with arrivals added since the last [`McStopArrivals::take_new_arrivals`].
    pub fn touched(&self) -> &FixedBitSet {
        &self.touched
    }

    /// Hand out every new arrival, grouped by stop in ascending stop order,
    /// and mark them as seen.
    pub fn take_new_arrivals(&mut self) -> Vec<(StopIndex, Vec<Arrival>)> {
        let mut taken = Vec::new();
        for stop in self.touched.ones() {
            let set = &mut self.sets[stop];
            if set.has_new_elements() {
                taken.push((stop, set.since_marker().to_vec()));
            }
            set.mark_at_end();
        }
        self.touched.clear();
        taken
    }
}
