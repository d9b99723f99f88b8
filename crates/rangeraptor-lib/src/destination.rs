//! Pareto set of complete paths at the destination.
//!
//! Every profile compares arrival time and number of transfers, plus a later
//! iteration departure in timetable mode. The multi-criteria profile adds
//! duration and one of four cost configurations, picked from the active
//! features:
//!
//! | configuration             | used when                    |
//! |---------------------------|------------------------------|
//! | [`PathCostConfig::C1`]                   | plain search      |
//! | [`PathCostConfig::RelaxedC1`]            | relaxed cost only |
//! | [`PathCostConfig::RelaxedC1IfC2Optimal`] | pass-through      |
//! | [`PathCostConfig::C1AndC2`]              | transit groups    |

use tracing::trace;

use crate::dominance::{C2Criterion, DominanceFn, RelaxFunction};
use crate::model::AccessEgress;
use crate::pareto::{Insert, ParetoComparator, ParetoSet};
use crate::path::{Path, PathBuilder};
use crate::state::{Arrival, ArrivalArena};
use crate::time::{Duration, Time};

/// Summary criteria shared by finished paths and not yet built candidates.
pub trait PathView {
    fn start_time(&self) -> Time;
    fn iteration_departure_time(&self) -> Time;
    fn end_time(&self) -> Time;
    fn transfers(&self) -> usize;
    fn c1(&self) -> i32;
    fn c2(&self) -> u32;

    fn duration(&self) -> Duration {
        self.end_time() - self.start_time()
    }
}

impl PathView for Path {
    fn start_time(&self) -> Time {
        self.start_time
    }
    fn iteration_departure_time(&self) -> Time {
        self.iteration_departure_time
    }
    fn end_time(&self) -> Time {
        self.end_time
    }
    fn transfers(&self) -> usize {
        self.transfers
    }
    fn c1(&self) -> i32 {
        self.c1
    }
    fn c2(&self) -> u32 {
        self.c2
    }
}

/// Last stop arrival plus the egress leg, before the path is built.
#[derive(Debug, Clone, Copy)]
pub struct DestinationArrival<'a> {
    pub arrival: &'a Arrival,
    pub egress: &'a AccessEgress,
    pub iteration_departure_time: Time,
}

impl PathView for DestinationArrival<'_> {
    fn start_time(&self) -> Time {
        self.arrival.departure_time
    }
    fn iteration_departure_time(&self) -> Time {
        self.iteration_departure_time
    }
    fn end_time(&self) -> Time {
        self.arrival.time + self.egress.duration
    }
    fn transfers(&self) -> usize {
        self.arrival.round.saturating_sub(1)
    }
    fn c1(&self) -> i32 {
        self.arrival.c1 + self.egress.c1
    }
    fn c2(&self) -> u32 {
        self.arrival.c2
    }
}

/// How `c1` (and `c2`) take part in destination dominance.
#[derive(Debug, Clone, Copy)]
pub enum PathCostConfig {
    C1,
    /// `c1` compared against the relaxed cost of the other path.
    RelaxedC1 { relax: RelaxFunction },
    /// Relaxed `c1` once the left path has reached the optimal `c2`,
    /// plain `c1` otherwise, plus `c2` itself.
    RelaxedC1IfC2Optimal {
        relax: RelaxFunction,
        c2: DominanceFn,
    },
    /// Relaxed `c1` or a `c2` advantage.
    C1AndC2 {
        relax: RelaxFunction,
        c2: DominanceFn,
    },
}

impl PathCostConfig {
    #[inline]
    fn left_dominates<L: PathView, R: PathView>(&self, left: &L, right: &R) -> bool {
        match *self {
            PathCostConfig::C1 => left.c1() < right.c1(),
            PathCostConfig::RelaxedC1 { relax } => left.c1() < relax.relax(right.c1()),
            PathCostConfig::RelaxedC1IfC2Optimal { relax, c2 } => {
                let c1_limit = if left.c2() == 0 {
                    relax.relax(right.c1())
                } else {
                    right.c1()
                };
                left.c1() < c1_limit || c2(left.c2(), right.c2())
            }
            PathCostConfig::C1AndC2 { relax, c2 } => {
                left.c1() < relax.relax(right.c1()) || c2(left.c2(), right.c2())
            }
        }
    }
}

/// Destination comparator: time and transfers, the iteration departure in
/// timetable mode, and duration plus cost for multi-criteria searches.
#[derive(Debug, Clone, Copy)]
pub struct PathComparator {
    timetable: bool,
    cost: Option<PathCostConfig>,
}

impl PathComparator {
    pub fn new(timetable: bool, cost: Option<PathCostConfig>) -> Self {
        Self { timetable, cost }
    }

    /// Pick the cost configuration for a multi-criteria search.
    pub fn multi_criteria(
        timetable: bool,
        relax: RelaxFunction,
        pass_through: Option<DominanceFn>,
        transit_groups: Option<DominanceFn>,
    ) -> Self {
        let cost = match (pass_through, transit_groups) {
            (Some(c2), _) => PathCostConfig::RelaxedC1IfC2Optimal { relax, c2 },
            (None, Some(c2)) => PathCostConfig::C1AndC2 { relax, c2 },
            (None, None) if !relax.is_normal() => PathCostConfig::RelaxedC1 { relax },
            (None, None) => PathCostConfig::C1,
        };
        Self::new(timetable, Some(cost))
    }

    pub fn cost(&self) -> Option<PathCostConfig> {
        self.cost
    }

    #[inline]
    pub fn left_dominates<L: PathView, R: PathView>(&self, left: &L, right: &R) -> bool {
        left.end_time() < right.end_time()
            || left.transfers() < right.transfers()
            || (self.timetable
                && left.iteration_departure_time() > right.iteration_departure_time())
            || self.cost.is_some_and(|cost| {
                left.duration() < right.duration() || cost.left_dominates(left, right)
            })
    }
}

impl ParetoComparator<Path> for PathComparator {
    fn left_dominance_exist(&self, left: &Path, right: &Path) -> bool {
        self.left_dominates(left, right)
    }
}

/// Paths found so far; only ever grows by pareto insertion.
pub struct DestinationArrivalPaths<'a> {
    paths: ParetoSet<Path, PathComparator>,
    builder: PathBuilder<'a>,
    latest_arrival_time: Option<Time>,
    iteration_departure_time: Time,
}

impl<'a> DestinationArrivalPaths<'a> {
    pub fn new(
        comparator: PathComparator,
        builder: PathBuilder<'a>,
        latest_arrival_time: Option<Time>,
    ) -> Self {
        Self {
            paths: ParetoSet::new(comparator),
            builder,
            latest_arrival_time,
            iteration_departure_time: 0,
        }
    }

    /// Departure time of the iteration now running; paths found from here on carry it.
    pub fn start_iteration(&mut self, departure_time: Time) {
        self.iteration_departure_time = departure_time;
    }

    /// Offer `arrival` followed by `egress`. The path is only built when it
    /// would survive against every path already held.
    pub fn add(&mut self, arena: &ArrivalArena, arrival: &Arrival, egress: &AccessEgress) -> bool {
        let candidate = DestinationArrival {
            arrival,
            egress,
            iteration_departure_time: self.iteration_departure_time,
        };
        if self
            .latest_arrival_time
            .is_some_and(|lat| candidate.end_time() > lat)
        {
            return false;
        }
        let comparator = *self.paths.comparator();
        if !self
            .paths
            .iter()
            .all(|path| comparator.left_dominates(&candidate, path))
        {
            return false;
        }

        let path = self
            .builder
            .build(arena, arrival, egress)
            .with_iteration_departure_time(self.iteration_departure_time);
        match self.paths.insert(path) {
            Insert::Accepted { evicted } => {
                trace!(
                    end_time = candidate.end_time(),
                    c1 = candidate.c1(),
                    evicted = evicted.len(),
                    "destination path accepted"
                );
                true
            }
            Insert::Rejected => false,
        }
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn paths(&self) -> &[Path] {
        self.paths.as_slice()
    }

    /// Hand out the paths, dropping those the secondary criterion does not accept.
    pub fn finalize(self, c2: Option<&dyn C2Criterion>) -> Vec<Path> {
        let mut paths = self.paths.into_vec();
        if let Some(c2) = c2 {
            paths.retain(|path| c2.accept_at_destination(path.c2));
        }
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pass_through::{PassThroughPoint, PassThroughPointsService};
    use crate::transit_group;

    fn path(start: Time, end: Time, transfers: usize, c1: i32, c2: u32) -> Path {
        Path {
            legs: Vec::new(),
            start_time: start,
            end_time: end,
            transfers,
            c1,
            c2,
            iteration_departure_time: start,
        }
    }

    fn dominates(cmp: &PathComparator, l: &Path, r: &Path) -> bool {
        cmp.left_dominates(l, r) && !cmp.left_dominates(r, l)
    }

    #[test]
    fn plain_profiles_compare_arrival_time_and_transfers_only() {
        let cmp = PathComparator::new(false, None);
        let base = path(0, 1_000, 1, 500, 0);
        assert!(dominates(&cmp, &path(0, 900, 1, 900, 0), &base));
        assert!(dominates(&cmp, &path(0, 1_000, 0, 900, 0), &base));
        assert!(!cmp.left_dominates(&path(100, 1_000, 1, 900, 0), &base));
        assert!(!cmp.left_dominates(&path(0, 1_000, 1, 100, 0), &base));
    }

    #[test]
    fn multi_criteria_also_prefers_shorter_journeys() {
        let cmp = PathComparator::multi_criteria(false, RelaxFunction::NORMAL, None, None);
        let base = path(0, 1_000, 1, 500, 0);
        assert!(dominates(&cmp, &path(100, 1_000, 1, 500, 0), &base));
    }

    #[test]
    fn timetable_compares_iteration_departure_not_shifted_start() {
        let cmp = PathComparator::new(true, None);
        let shifted = path(300, 1_000, 0, 0, 0).with_iteration_departure_time(0);
        let later_iteration = path(0, 1_000, 0, 0, 0).with_iteration_departure_time(60);
        assert!(dominates(&cmp, &later_iteration, &shifted));
    }

    #[test]
    fn timetable_prefers_later_departure() {
        let cmp = PathComparator::new(true, None);
        let early = path(0, 1_000, 0, 0, 0);
        let late = path(60, 1_060, 0, 0, 0);
        assert!(cmp.left_dominates(&late, &early));
        assert!(cmp.left_dominates(&early, &late));
    }

    #[test]
    fn relaxed_cost_keeps_close_paths() {
        let relax = RelaxFunction::new(1.25, 5_000).unwrap();
        let cmp = PathComparator::multi_criteria(false, relax, None, None);
        let best = path(0, 1_000, 0, 60_000, 0);
        assert!(cmp.left_dominates(&path(0, 1_000, 0, 79_900, 0), &best));
        assert!(!cmp.left_dominates(&path(0, 1_000, 0, 80_000, 0), &best));
    }

    #[test]
    fn pass_through_relaxes_only_complete_paths() {
        let service = PassThroughPointsService::new(&[PassThroughPoint::new(vec![0])], 1).unwrap();
        let relax = RelaxFunction::new(2.0, 0).unwrap();
        let cmp = PathComparator::multi_criteria(false, relax, Some(service.dominance()), None);
        let reference = path(0, 1_000, 0, 100, 1);
        assert!(cmp.left_dominates(&path(0, 1_000, 0, 150, 0), &reference));
        assert!(!cmp.left_dominates(&path(0, 1_000, 0, 150, 1), &reference));
    }

    #[test]
    fn group_bits_compete_with_cost() {
        let cmp = PathComparator::multi_criteria(
            false,
            RelaxFunction::NORMAL,
            None,
            Some(transit_group::dominate),
        );
        let cheap_two_groups = path(0, 1_000, 1, 100, 0b11);
        let pricey_one_group = path(0, 1_000, 1, 200, 0b01);
        assert!(cmp.left_dominates(&cheap_two_groups, &pricey_one_group));
        assert!(cmp.left_dominates(&pricey_one_group, &cheap_two_groups));
    }
}
