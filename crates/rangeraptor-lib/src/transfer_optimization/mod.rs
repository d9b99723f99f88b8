//! Moves the transfer points of pass-through paths along their trips.
//!
//! The search keeps the first connection it finds between two trips, which
//! is not always the cheapest one that still visits every via point. Here
//! the trips of a path stay fixed while every feasible connection between
//! consecutive trips is tried. Tails are built from the destination backward
//! and kept in small pareto sets on cost and remaining via points, so only
//! tails that visit every point can win at the origin.

mod path_tail;
mod transfer_generator;

pub use path_tail::{PathTail, PathTailC2Calculator, PathTailComparator};
pub use transfer_generator::{TransferGenerator, TripLeg, TripToTripTransfer};

use std::collections::BTreeMap;

use tracing::debug;

use crate::context::SearchContext;
use crate::cost::CostCalculator;
use crate::network::TransitDataProvider;
use crate::pareto::ParetoSet;
use crate::pass_through::PassThroughPointsService;
use crate::path::{Path, PathLeg};
use crate::request::SlackParams;

/// Re-optimizes the transfers of finished pass-through paths.
pub struct TransferOptimizer<'a> {
    data: &'a dyn TransitDataProvider,
    slack: SlackParams,
    cost: CostCalculator,
    points: &'a PassThroughPointsService,
    generator: TransferGenerator<'a>,
}

impl<'a> TransferOptimizer<'a> {
    pub fn new(
        data: &'a dyn TransitDataProvider,
        slack: SlackParams,
        cost: CostCalculator,
        points: &'a PassThroughPointsService,
    ) -> Self {
        Self {
            data,
            slack,
            cost,
            points,
            generator: TransferGenerator::new(data, slack),
        }
    }

    /// The cheapest variant of `path` that still visits every via point, or
    /// `path` itself when no variant is strictly cheaper.
    pub fn optimize(&self, path: &Path) -> Path {
        let transit_index: Vec<usize> = path
            .legs
            .iter()
            .enumerate()
            .filter(|(_, leg)| leg.is_transit())
            .map(|(index, _)| index)
            .collect();
        if transit_index.len() < 2 {
            return path.clone();
        }
        let trips: Vec<TripLeg> = transit_index
            .iter()
            .filter_map(|&index| trip_leg(&path.legs[index]))
            .collect();

        let first = transit_index[0];
        let last = transit_index[transit_index.len() - 1];
        let prefix = &path.legs[..first];
        let suffix = &path.legs[last + 1..];

        // the first boarding is fixed, and so is the wait before it
        let first_wait_c1 = path.legs[first].c1() - self.transit_c1(&trips[0], true);

        let Some(best) = self.best_tail(&trips, suffix) else {
            return path.clone();
        };
        let c1 = prefix.iter().map(PathLeg::c1).sum::<i32>() + first_wait_c1 + best.c1;
        if c1 >= path.c1 {
            return path.clone();
        }

        let mut best = best;
        best.add_wait_cost(first_wait_c1);
        let mut legs = prefix.to_vec();
        legs.extend(best.legs);
        debug!(from = path.c1, to = c1, "moved transfers to a cheaper connection");
        Path::new(legs, 0).with_iteration_departure_time(path.iteration_departure_time)
    }

    /// Cheapest tail from the first trip's original boarding that visits
    /// every via point.
    fn best_tail(&self, trips: &[TripLeg], suffix: &[PathLeg]) -> Option<PathTail> {
        let last = trips.len() - 1;
        let connections: Vec<Vec<TripToTripTransfer>> = trips
            .windows(2)
            .map(|pair| self.generator.find_transfers(&pair[0], &pair[1]))
            .collect();

        let board_positions = |leg: usize| -> Vec<usize> {
            if leg == 0 {
                return vec![trips[0].board_pos];
            }
            let mut positions: Vec<usize> =
                connections[leg - 1].iter().map(|tr| tr.to_pos).collect();
            positions.sort_unstable();
            positions.dedup();
            positions
        };

        let mut tails = self.last_leg_tails(&trips[last], &board_positions(last), suffix);
        for leg in (0..last).rev() {
            tails = self.leg_tails(
                &trips[leg],
                &trips[leg + 1],
                leg == 0,
                &board_positions(leg),
                &connections[leg],
                &tails,
            );
        }

        tails
            .remove(&trips[0].board_pos)?
            .into_iter()
            .filter(|tail| tail.c2 == 0)
            .min_by_key(|tail| tail.c1)
    }

    fn last_leg_tails(
        &self,
        trip: &TripLeg,
        boards: &[usize],
        suffix: &[PathLeg],
    ) -> BTreeMap<usize, Vec<PathTail>> {
        let stops = &self.data.pattern(trip.pattern).stops;
        let Some(&earliest) = boards.first() else {
            return BTreeMap::new();
        };
        let mut calc = PathTailC2Calculator::new(self.points, stops, earliest);
        let all_points = self.points.len() as u32;
        let suffix_c1: i32 = suffix.iter().map(PathLeg::c1).sum();

        boards
            .iter()
            .map(|&board_pos| {
                let ride = TripLeg { board_pos, ..*trip };
                let leg = self.transit_leg(&ride, false);
                let mut legs = vec![leg];
                legs.extend_from_slice(suffix);
                let tail = PathTail {
                    board_pos,
                    c1: legs[0].c1() + suffix_c1,
                    c2: calc.c2_at(board_pos, trip.alight_pos, all_points),
                    c2_after_board: calc.c2_at(board_pos + 1, trip.alight_pos, all_points),
                    legs,
                };
                (board_pos, vec![tail])
            })
            .collect()
    }

    fn leg_tails(
        &self,
        trip: &TripLeg,
        next: &TripLeg,
        first_boarding: bool,
        boards: &[usize],
        connections: &[TripToTripTransfer],
        next_tails: &BTreeMap<usize, Vec<PathTail>>,
    ) -> BTreeMap<usize, Vec<PathTail>> {
        let pattern = self.data.pattern(trip.pattern);
        let schedule = pattern.trip(trip.trip);
        let next_schedule = self.data.pattern(next.pattern).trip(next.trip);
        let Some(&earliest) = boards.first() else {
            return BTreeMap::new();
        };
        let mut calc = PathTailC2Calculator::new(self.points, &pattern.stops, earliest);
        let mut result = BTreeMap::new();

        for &board_pos in boards {
            let mut set = ParetoSet::new(PathTailComparator);
            for connection in connections.iter().filter(|c| c.from_pos > board_pos) {
                let Some(candidates) = next_tails.get(&connection.to_pos) else {
                    continue;
                };
                let ride = TripLeg {
                    board_pos,
                    alight_pos: connection.from_pos,
                    ..*trip
                };
                let transit = self.transit_leg(&ride, first_boarding);
                let arrived = schedule.arrival(connection.from_pos) + self.slack.alight_slack;
                let (walk_leg, at_next_stop) = match connection.walk {
                    Some(walk) => (
                        Some(PathLeg::Transfer {
                            from_stop: pattern.stop(connection.from_pos),
                            to_stop: walk.to_stop,
                            from: arrived,
                            to: arrived + walk.duration,
                            c1: walk.c1,
                        }),
                        arrived + walk.duration,
                    ),
                    None => (None, arrived),
                };
                let wait_c1 = self
                    .cost
                    .wait_cost(next_schedule.departure(connection.to_pos) - at_next_stop);

                for next_tail in candidates {
                    // a same-stop transfer visits the stop once
                    let inherited = if connection.walk.is_some() {
                        next_tail.c2
                    } else {
                        next_tail.c2_after_board
                    };
                    let mut rest = next_tail.clone();
                    rest.add_wait_cost(wait_c1);

                    let mut legs = vec![transit.clone()];
                    legs.extend(walk_leg.clone());
                    let c1 = legs.iter().map(PathLeg::c1).sum::<i32>() + rest.c1;
                    legs.extend(rest.legs);
                    set.insert(PathTail {
                        board_pos,
                        legs,
                        c1,
                        c2: calc.c2_at(board_pos, connection.from_pos, inherited),
                        c2_after_board: calc.c2_at(board_pos + 1, connection.from_pos, inherited),
                    });
                }
            }
            if !set.is_empty() {
                result.insert(board_pos, set.into_vec());
            }
        }
        result
    }

    /// Transit leg without the wait before boarding.
    fn transit_leg(&self, ride: &TripLeg, first_boarding: bool) -> PathLeg {
        let pattern = self.data.pattern(ride.pattern);
        let schedule = pattern.trip(ride.trip);
        PathLeg::Transit {
            pattern: ride.pattern,
            trip: ride.trip,
            board_stop: pattern.stop(ride.board_pos),
            board_pos: ride.board_pos,
            alight_stop: pattern.stop(ride.alight_pos),
            alight_pos: ride.alight_pos,
            from: schedule.departure(ride.board_pos),
            to: schedule.arrival(ride.alight_pos),
            c1: self.transit_c1(ride, first_boarding),
        }
    }

    fn transit_c1(&self, ride: &TripLeg, first_boarding: bool) -> i32 {
        let pattern = self.data.pattern(ride.pattern);
        let schedule = pattern.trip(ride.trip);
        let board_c1 = self.cost.board_c1(
            0,
            first_boarding,
            0,
            self.data.board_cost(pattern.stop(ride.board_pos)),
        );
        self.cost.alight_c1(
            board_c1,
            schedule.arrival(ride.alight_pos) - schedule.departure(ride.board_pos),
            self.data.alight_cost(pattern.stop(ride.alight_pos)),
        )
    }
}

fn trip_leg(leg: &PathLeg) -> Option<TripLeg> {
    match *leg {
        PathLeg::Transit {
            pattern,
            trip,
            board_pos,
            alight_pos,
            ..
        } => Some(TripLeg {
            pattern,
            trip,
            board_pos,
            alight_pos,
        }),
        _ => None,
    }
}

/// Optimize the transfers of every path when the search has via points and
/// transfer optimization is enabled; paths that end up identical are merged.
pub fn optimize_transfers(ctx: &SearchContext<'_>, paths: Vec<Path>) -> Vec<Path> {
    let Some(points) = ctx.pass_through.as_ref() else {
        return paths;
    };
    if !ctx.optimize_transfers {
        return paths;
    }
    let optimizer = TransferOptimizer::new(ctx.data, ctx.slack, ctx.cost, points);
    let mut optimized: Vec<Path> = Vec::with_capacity(paths.len());
    for path in &paths {
        let path = optimizer.optimize(path);
        if !optimized.contains(&path) {
            optimized.push(path);
        }
    }
    optimized
}
