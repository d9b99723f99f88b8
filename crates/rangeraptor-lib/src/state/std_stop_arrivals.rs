use super::arrival::{Arrival, ArrivalView};
use crate::model::StopIndex;

/// Scalar compared by the single-criterion strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonBasis {
    /// Clock time of arrival.
    ArrivalTime,
    /// Time elapsed since the (time-shifted) departure.
    TravelDuration,
}

impl ComparisonBasis {
    #[inline]
    pub fn value(&self, arrival: &Arrival) -> i32 {
        match self {
            ComparisonBasis::ArrivalTime => arrival.time,
            ComparisonBasis::TravelDuration => arrival.time - arrival.departure_time,
        }
    }
}

/// One best arrival per stop per round, plus the overall best per stop.
///
/// On-board (transit) arrivals are tracked separately, so a walking arrival
/// that happens to be earlier does not hide the trip arrival transfers and
/// egress are expanded from.
#[derive(Debug, Clone)]
pub struct StdStopArrivals {
    basis: ComparisonBasis,
    best: Vec<Option<i32>>,
    best_transit: Vec<Option<i32>>,
    rounds: Vec<Vec<Option<Arrival>>>,
    transit_rounds: Vec<Vec<Option<Arrival>>>,
}

impl StdStopArrivals {
    pub fn new(basis: ComparisonBasis, num_stops: usize, max_rounds: usize) -> Self {
        Self {
            basis,
            best: vec![None; num_stops],
            best_transit: vec![None; num_stops],
            rounds: vec![vec![None; num_stops]; max_rounds + 1],
            transit_rounds: vec![vec![None; num_stops]; max_rounds + 1],
        }
    }

    pub fn basis(&self) -> ComparisonBasis {
        self.basis
    }

    fn improves(best: Option<i32>, value: i32) -> bool {
        best.map_or(true, |b| value < b)
    }

    /// Would a walking (or access) arrival be accepted.
    pub fn qualify(&self, arrival: &Arrival) -> bool {
        Self::improves(self.best[arrival.stop], self.basis.value(arrival))
    }

    /// Would a transit arrival be accepted.
    pub fn qualify_transit(&self, arrival: &Arrival) -> bool {
        Self::improves(self.best_transit[arrival.stop], self.basis.value(arrival))
    }

    /// Record a walking or access arrival; returns false if it is not an improvement.
    pub fn accept(&mut self, arrival: Arrival) -> bool {
        if !self.qualify(&arrival) {
            return false;
        }
        self.best[arrival.stop] = Some(self.basis.value(&arrival));
        self.rounds[arrival.round][arrival.stop] = Some(arrival);
        if arrival.arrived_on_board() {
            self.best_transit[arrival.stop] = Some(self.basis.value(&arrival));
            self.transit_rounds[arrival.round][arrival.stop] = Some(arrival);
        }
        true
    }

    /// Record a transit arrival; returns false if it is not an improvement.
    pub fn accept_transit(&mut self, arrival: Arrival) -> bool {
        if !self.qualify_transit(&arrival) {
            return false;
        }
        let value = self.basis.value(&arrival);
        self.best_transit[arrival.stop] = Some(value);
        self.transit_rounds[arrival.round][arrival.stop] = Some(arrival);
        if Self::improves(self.best[arrival.stop], value) {
            self.best[arrival.stop] = Some(value);
            self.rounds[arrival.round][arrival.stop] = Some(arrival);
        }
        true
    }

    /// Best arrival of `round` at `stop`, used for boarding.
    pub fn arrival(&self, round: usize, stop: StopIndex) -> Option<&Arrival> {
        self.rounds[round][stop].as_ref()
    }

    /// Best on-board arrival of `round` at `stop`, used for transfers.
    pub fn transit_arrival(&self, round: usize, stop: StopIndex) -> Option<&Arrival> {
        self.transit_rounds[round][stop].as_ref()
    }

    pub fn best_value(&self, stop: StopIndex) -> Option<i32> {
        self.best[stop]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AccessEgress, Transfer};
    use crate::state::{ArrivalArena, ArrivalKind};

    fn arrival(
        arena: &ArrivalArena,
        stop: StopIndex,
        time: i32,
        round: usize,
        transit: bool,
    ) -> Arrival {
        let prev = arena.next_handle();
        Arrival {
            handle: arena.next_handle(),
            stop,
            time,
            round,
            c1: 0,
            c2: 0,
            departure_time: 0,
            kind: if transit {
                ArrivalKind::Transit {
                    pattern: 0,
                    trip: 0,
                    board_pos: 0,
                    alight_pos: 1,
                    prev,
                }
            } else if round == 0 {
                ArrivalKind::Access {
                    access: AccessEgress::walk(stop, time),
                }
            } else {
                ArrivalKind::Transfer {
                    transfer: Transfer::walk(stop, 60),
                    prev,
                }
            },
        }
    }

    #[test]
    fn only_strict_improvements_are_kept() {
        let arena = ArrivalArena::new();
        let mut arrivals = StdStopArrivals::new(ComparisonBasis::ArrivalTime, 2, 2);
        assert!(arrivals.accept(arrival(&arena, 1, 100, 0, false)));
        assert!(!arrivals.accept(arrival(&arena, 1, 100, 1, false)));
        assert!(arrivals.accept(arrival(&arena, 1, 90, 1, false)));
        assert_eq!(arrivals.best_value(1), Some(90));
    }

    #[test]
    fn transit_arrival_is_kept_behind_an_earlier_walk() {
        let arena = ArrivalArena::new();
        let mut arrivals = StdStopArrivals::new(ComparisonBasis::ArrivalTime, 2, 2);
        assert!(arrivals.accept(arrival(&arena, 1, 80, 1, false)));
        assert!(arrivals.accept_transit(arrival(&arena, 1, 100, 1, true)));
        assert_eq!(arrivals.arrival(1, 1).map(|a| a.time), Some(80));
        assert_eq!(arrivals.transit_arrival(1, 1).map(|a| a.time), Some(100));
    }

    #[test]
    fn duration_basis_ignores_clock_time() {
        let arena = ArrivalArena::new();
        let mut arrivals = StdStopArrivals::new(ComparisonBasis::TravelDuration, 1, 1);
        let mut late = arrival(&arena, 0, 1_000, 0, false);
        late.departure_time = 900;
        let early = arrival(&arena, 0, 500, 0, false);
        assert!(arrivals.accept(late));
        assert!(!arrivals.accept(early));
    }
}
