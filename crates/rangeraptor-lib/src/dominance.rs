//! Arrival dominance predicates.
//!
//! Every predicate answers "does `left` have an advantage over `right` in at
//! least one criterion", the form expected by [`crate::pareto::ParetoSet`].

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{StopIndex, TripPattern};
use crate::pareto::ParetoComparator;
use crate::state::ArrivalView;

/// Secondary-criterion dominance over `c2` values.
pub type DominanceFn = fn(u32, u32) -> bool;

/// Widens a cost so that "almost as good" values are kept: `round(c1 * ratio) + slack`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelaxFunction {
    pub ratio: f64,
    /// Slack in raptor cost units.
    pub slack: i32,
}

impl RelaxFunction {
    pub const NORMAL: RelaxFunction = RelaxFunction {
        ratio: 1.0,
        slack: 0,
    };

    pub fn new(ratio: f64, slack: i32) -> Result<Self> {
        if !(1.0..=4.0).contains(&ratio) {
            return Err(Error::invalid_request(format!(
                "relax ratio must be in [1.0, 4.0], got {ratio}"
            )));
        }
        if slack < 0 {
            return Err(Error::invalid_request(format!(
                "relax slack must not be negative, got {slack}"
            )));
        }
        Ok(Self { ratio, slack })
    }

    pub fn is_normal(&self) -> bool {
        *self == Self::NORMAL
    }

    #[inline]
    pub fn relax(&self, c1: i32) -> i32 {
        if self.is_normal() {
            c1
        } else {
            (f64::from(c1) * self.ratio).round() as i32 + self.slack
        }
    }
}

impl Default for RelaxFunction {
    fn default() -> Self {
        Self::NORMAL
    }
}

/// Secondary criterion carried in the `c2` slot of every arrival.
pub trait C2Criterion {
    /// `c2` of an access arrival.
    fn initial_c2(&self) -> u32;

    /// `c2` after boarding a trip of `pattern`.
    fn board(&self, c2: u32, _pattern: &TripPattern) -> u32 {
        c2
    }

    /// `c2` after arriving at or passing through `stop`.
    fn visit_stop(&self, c2: u32, _stop: StopIndex) -> u32 {
        c2
    }

    fn dominance(&self) -> DominanceFn;

    /// Whether a path with this `c2` may be returned.
    fn accept_at_destination(&self, _c2: u32) -> bool {
        true
    }
}

/// Arrival comparator built by [`ArrivalDominanceFactory`].
#[derive(Debug, Clone, Copy)]
pub struct ArrivalComparator {
    relax_c1: RelaxFunction,
    c2: Option<DominanceFn>,
    on_board: bool,
}

impl ArrivalComparator {
    #[inline]
    pub fn left_dominates<L: ArrivalView, R: ArrivalView>(&self, left: &L, right: &R) -> bool {
        left.arrival_time() < right.arrival_time()
            || left.round() < right.round()
            || left.c1() < self.relax_c1.relax(right.c1())
            || self.c2.is_some_and(|better| better(left.c2(), right.c2()))
            || (self.on_board && left.arrived_on_board() && !right.arrived_on_board())
    }
}

impl<A: ArrivalView> ParetoComparator<A> for ArrivalComparator {
    fn left_dominance_exist(&self, left: &A, right: &A) -> bool {
        self.left_dominates(left, right)
    }
}

/// Builds the arrival comparators for one search.
#[derive(Debug, Clone, Copy)]
pub struct ArrivalDominanceFactory {
    relax_c1: RelaxFunction,
    c2: Option<DominanceFn>,
}

impl ArrivalDominanceFactory {
    pub fn new(relax_c1: RelaxFunction, c2: Option<DominanceFn>) -> Self {
        Self { relax_c1, c2 }
    }

    /// Compares arrival time, round, cost and (when configured) `c2`.
    pub fn arrival_time_round_cost(&self) -> ArrivalComparator {
        ArrivalComparator {
            relax_c1: self.relax_c1,
            c2: self.c2,
            on_board: false,
        }
    }

    /// Same as [`Self::arrival_time_round_cost`], plus an on-board arrival beats a
    /// foot arrival that ties on everything else.
    pub fn arrival_time_round_cost_on_board(&self) -> ArrivalComparator {
        ArrivalComparator {
            on_board: true,
            ..self.arrival_time_round_cost()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy)]
    struct A {
        time: i32,
        round: usize,
        c1: i32,
        c2: u32,
        on_board: bool,
    }

    impl ArrivalView for A {
        fn stop(&self) -> StopIndex {
            0
        }
        fn arrival_time(&self) -> i32 {
            self.time
        }
        fn round(&self) -> usize {
            self.round
        }
        fn c1(&self) -> i32 {
            self.c1
        }
        fn c2(&self) -> u32 {
            self.c2
        }
        fn arrived_on_board(&self) -> bool {
            self.on_board
        }
    }

    fn a(time: i32, round: usize, c1: i32) -> A {
        A {
            time,
            round,
            c1,
            c2: 0,
            on_board: false,
        }
    }

    fn dominates(cmp: &ArrivalComparator, l: A, r: A) -> bool {
        cmp.left_dominates(&l, &r) && !cmp.left_dominates(&r, &l)
    }

    #[test]
    fn earlier_time_and_fewer_rounds_dominate() {
        let cmp =
            ArrivalDominanceFactory::new(RelaxFunction::NORMAL, None).arrival_time_round_cost();
        assert!(dominates(&cmp, a(12, 1, 100), a(13, 1, 100)));
        assert!(dominates(&cmp, a(12, 1, 100), a(12, 2, 100)));
        assert!(!cmp.left_dominates(&a(12, 1, 100), &a(12, 1, 100)));
    }

    #[test]
    fn relaxed_cost_keeps_almost_as_good_arrivals() {
        let relax = RelaxFunction::new(1.25, 50).unwrap();
        assert_eq!(relax.relax(600), 800);
        let cmp = ArrivalDominanceFactory::new(relax, None).arrival_time_round_cost();
        let best = a(10, 1, 600);
        assert!(cmp.left_dominates(&a(10, 1, 799), &best));
        assert!(!cmp.left_dominates(&a(10, 1, 800), &best));
    }

    #[test]
    fn on_board_breaks_ties_only_in_on_board_variant() {
        let factory = ArrivalDominanceFactory::new(RelaxFunction::NORMAL, None);
        let on_board = A {
            on_board: true,
            ..a(10, 1, 100)
        };
        let on_foot = a(10, 1, 100);
        assert!(dominates(
            &factory.arrival_time_round_cost_on_board(),
            on_board,
            on_foot
        ));
        assert!(!factory
            .arrival_time_round_cost()
            .left_dominates(&on_board, &on_foot));
    }

    #[test]
    fn secondary_criterion_is_an_advantage() {
        fn less(l: u32, r: u32) -> bool {
            l < r
        }
        let cmp = ArrivalDominanceFactory::new(RelaxFunction::NORMAL, Some(less))
            .arrival_time_round_cost();
        let l = A { c2: 0, ..a(10, 1, 100) };
        let r = A { c2: 1, ..a(10, 1, 100) };
        assert!(dominates(&cmp, l, r));
    }

    #[test]
    fn invalid_relax_parameters_are_rejected() {
        assert!(RelaxFunction::new(0.9, 0).is_err());
        assert!(RelaxFunction::new(1.1, -1).is_err());
    }
}
