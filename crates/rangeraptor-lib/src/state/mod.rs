//! Per-search working memory: the arrival arena and the stop-arrival tables.

mod arrival;
mod mc_stop_arrivals;
mod std_stop_arrivals;

pub use arrival::{Arrival, ArrivalArena, ArrivalHandle, ArrivalKind, ArrivalView};
pub use mc_stop_arrivals::McStopArrivals;
pub use std_stop_arrivals::{ComparisonBasis, StdStopArrivals};

use fixedbitset::FixedBitSet;

/// Stops reached in the current and the previous round.
#[derive(Debug, Clone)]
pub struct TouchedStops {
    current: FixedBitSet,
    previous: FixedBitSet,
}

impl TouchedStops {
    pub fn new(num_stops: usize) -> Self {
        Self {
            current: FixedBitSet::with_capacity(num_stops),
            previous: FixedBitSet::with_capacity(num_stops),
        }
    }

    pub fn touch(&mut self, stop: usize) {
        self.current.insert(stop);
    }

    /// Move this round's stops to "previous"; returns false when there are none.
    pub fn advance(&mut self) -> bool {
        std::mem::swap(&mut self.current, &mut self.previous);
        self.current.clear();
        !self.previous.is_clear()
    }

    pub fn previous(&self) -> &FixedBitSet {
        &self.previous
    }

    pub fn current(&self) -> &FixedBitSet {
        &self.current
    }

    pub fn clear(&mut self) {
        self.current.clear();
        self.previous.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_reports_whether_any_stop_was_touched() {
        let mut touched = TouchedStops::new(4);
        assert!(!touched.advance());
        touched.touch(2);
        assert!(touched.advance());
        assert!(touched.previous().contains(2));
        assert!(touched.current().is_clear());
        assert!(!touched.advance());
    }
}
