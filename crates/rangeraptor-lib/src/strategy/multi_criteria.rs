use fixedbitset::FixedBitSet;
use tracing::trace;

use super::{boarding, RoutingStrategy};
use crate::context::SearchContext;
use crate::destination::{DestinationArrivalPaths, PathComparator};
use crate::dominance::{ArrivalDominanceFactory, C2Criterion, DominanceFn, RelaxFunction};
use crate::model::TripPattern;
use crate::pareto::{ParetoComparator, ParetoSet};
use crate::path::{Path, PathBuilder};
use crate::state::{Arrival, ArrivalArena, ArrivalHandle, ArrivalKind, ArrivalView, McStopArrivals};
use crate::time::{Duration, Time};

/// A boarded trip while scanning one pattern.
#[derive(Debug, Clone, Copy)]
struct PatternRide {
    prev: ArrivalHandle,
    trip: usize,
    board_pos: usize,
    board_time: Time,
    board_c1: i32,
    /// `board_c1` minus the ride cost up to the board time, so rides boarded
    /// at different stops compare as if alighting at the same stop.
    relative_c1: i32,
    c2: u32,
    departure_time: Time,
}

#[derive(Debug, Clone, Copy)]
struct RideComparator {
    c2: Option<DominanceFn>,
}

impl ParetoComparator<PatternRide> for RideComparator {
    fn left_dominance_exist(&self, left: &PatternRide, right: &PatternRide) -> bool {
        left.trip < right.trip
            || left.relative_c1 < right.relative_c1
            || self.c2.is_some_and(|better| better(left.c2, right.c2))
    }
}

/// Pareto strategy over arrival time, round, `c1` and the optional `c2`.
pub struct McRoutingStrategy<'a> {
    ctx: &'a SearchContext<'a>,
    c2: Option<&'a dyn C2Criterion>,
    arena: ArrivalArena,
    stops: McStopArrivals,
    /// New arrivals of the previous round, by stop.
    boarding: Vec<Vec<Arrival>>,
    boarding_stops: FixedBitSet,
    rides: ParetoSet<PatternRide, RideComparator>,
    destination: DestinationArrivalPaths<'a>,
}

impl<'a> McRoutingStrategy<'a> {
    pub fn new(ctx: &'a SearchContext<'a>) -> Self {
        let num_stops = ctx.data.num_stops();
        let c2 = ctx.c2();
        let c2_dominance = c2.map(|c2| c2.dominance());

        // stop arrivals are only relaxed under transit-group priority
        let stop_relax = if ctx.transit_groups.is_some() {
            ctx.relax_c1
        } else {
            RelaxFunction::NORMAL
        };
        let factory = ArrivalDominanceFactory::new(stop_relax, c2_dominance);
        let comparator = PathComparator::multi_criteria(
            ctx.timetable,
            ctx.relax_c1,
            ctx.pass_through.as_ref().map(|service| service.dominance()),
            ctx.transit_groups.as_ref().map(|service| service.dominance()),
        );

        Self {
            ctx,
            c2,
            arena: ArrivalArena::new(),
            stops: McStopArrivals::new(num_stops, factory.arrival_time_round_cost_on_board()),
            boarding: vec![Vec::new(); num_stops],
            boarding_stops: FixedBitSet::with_capacity(num_stops),
            rides: ParetoSet::new(RideComparator { c2: c2_dominance }),
            destination: DestinationArrivalPaths::new(
                comparator,
                PathBuilder::new(ctx.data, ctx.slack),
                ctx.latest_arrival_time,
            ),
        }
    }

    fn visit(&self, c2: u32, stop: usize) -> u32 {
        self.c2.map_or(c2, |criterion| criterion.visit_stop(c2, stop))
    }

    /// Insert into the stop's pareto set; returns whether it was kept.
    fn add(&mut self, arrival: Arrival) -> bool {
        if !self.ctx.is_viable(arrival.stop, arrival.time, arrival.round) {
            return false;
        }
        if self.stops.add(arrival) {
            self.arena.push(arrival);
            true
        } else {
            false
        }
    }

    fn alight(&mut self, pattern: &TripPattern, ride: PatternRide, stop_pos: usize, round: usize) {
        let ctx = self.ctx;
        let stop = pattern.stop(stop_pos);
        let scheduled = pattern.trip(ride.trip).arrival(stop_pos);
        let ride_time: Duration = scheduled - ride.board_time;
        let arrival = Arrival {
            handle: self.arena.next_handle(),
            stop,
            time: scheduled + ctx.slack.alight_slack,
            round,
            c1: ctx
                .cost
                .alight_c1(ride.board_c1, ride_time, ctx.data.alight_cost(stop)),
            c2: ride.c2,
            departure_time: ride.departure_time,
            kind: ArrivalKind::Transit {
                pattern: pattern.index,
                trip: ride.trip,
                board_pos: ride.board_pos,
                alight_pos: stop_pos,
                prev: ride.prev,
            },
        };
        if self.add(arrival) {
            for egress in ctx.egress(stop) {
                self.destination.add(&self.arena, &arrival, egress);
            }
        }
    }

    fn board(&mut self, pattern: &TripPattern, prev: &Arrival, stop_pos: usize) {
        let ctx = self.ctx;
        let earliest = ctx.slack.earliest_board_time(prev.time, prev.round > 0);
        let Some(trip) = pattern.find_earliest_trip(
            stop_pos,
            earliest,
            ctx.latest_arrival_time,
            pattern.trips.len(),
        ) else {
            return;
        };
        let boarded = boarding(ctx, prev, pattern, trip, stop_pos);
        let c2 = self
            .c2
            .map_or(prev.c2, |criterion| criterion.board(prev.c2, pattern));
        self.rides.insert(PatternRide {
            prev: prev.handle,
            trip,
            board_pos: stop_pos,
            board_time: boarded.board_time,
            board_c1: boarded.board_c1,
            relative_c1: boarded.board_c1 - ctx.cost.ride_cost(boarded.board_time),
            c2,
            departure_time: boarded.departure_time,
        });
    }
}

impl RoutingStrategy for McRoutingStrategy<'_> {
    fn start_iteration(&mut self, departure_time: Time) {
        // drop the unboarded arrivals of the previous iteration's last round
        self.stops.take_new_arrivals();
        self.destination.start_iteration(departure_time);
    }

    fn add_access_arrivals(&mut self, departure_time: Time) {
        let initial_c2 = self.ctx.initial_c2();
        for access in self.ctx.access {
            let arrival = Arrival {
                handle: self.arena.next_handle(),
                stop: access.stop,
                time: departure_time + access.duration,
                round: 0,
                c1: access.c1,
                c2: self.visit(initial_c2, access.stop),
                departure_time,
                kind: ArrivalKind::Access { access: *access },
            };
            self.add(arrival);
        }
    }

    fn start_round(&mut self, round: usize) -> bool {
        for stop in self.boarding_stops.ones() {
            self.boarding[stop].clear();
        }
        self.boarding_stops.clear();

        for (stop, arrivals) in self.stops.take_new_arrivals() {
            let arrivals: Vec<Arrival> = arrivals
                .into_iter()
                .filter(|arrival| arrival.round + 1 == round)
                .collect();
            if !arrivals.is_empty() {
                self.boarding_stops.insert(stop);
                self.boarding[stop] = arrivals;
            }
        }
        trace!(
            round,
            stops = self.boarding_stops.count_ones(..),
            "boarding stops"
        );
        !self.boarding_stops.is_clear()
    }

    fn boarding_stops(&self) -> &FixedBitSet {
        &self.boarding_stops
    }

    fn ride(&mut self, pattern: &TripPattern, round: usize) {
        self.rides.clear();
        let num_stops = pattern.num_stops();

        for stop_pos in 0..num_stops {
            let stop = pattern.stop(stop_pos);

            if !self.rides.is_empty() {
                if let Some(criterion) = self.c2 {
                    self.rides
                        .for_each_mut(|ride| ride.c2 = criterion.visit_stop(ride.c2, stop));
                }
                for index in 0..self.rides.len() {
                    let ride = self.rides.as_slice()[index];
                    self.alight(pattern, ride, stop_pos, round);
                }
            }

            if stop_pos + 1 < num_stops && self.boarding_stops.contains(stop) {
                let arrivals = std::mem::take(&mut self.boarding[stop]);
                for prev in &arrivals {
                    self.board(pattern, prev, stop_pos);
                }
                self.boarding[stop] = arrivals;
            }
        }
    }

    fn transfers(&mut self, round: usize) {
        let ctx = self.ctx;
        let mut sources = Vec::new();
        for stop in self.stops.touched().ones() {
            sources.extend(
                self.stops
                    .new_arrivals(stop)
                    .iter()
                    .filter(|arrival| arrival.round == round && arrival.arrived_on_board())
                    .copied(),
            );
        }

        for prev in sources {
            for transfer in ctx.data.transfers_from(prev.stop) {
                let arrival = Arrival {
                    handle: self.arena.next_handle(),
                    stop: transfer.to_stop,
                    time: prev.time + transfer.duration,
                    round,
                    c1: prev.c1 + transfer.c1,
                    c2: self.visit(prev.c2, transfer.to_stop),
                    departure_time: prev.departure_time,
                    kind: ArrivalKind::Transfer {
                        transfer: *transfer,
                        prev: prev.handle,
                    },
                };
                if self.add(arrival) {
                    for egress in ctx.egress(arrival.stop) {
                        if egress.arrived_on_board {
                            self.destination.add(&self.arena, &arrival, egress);
                        }
                    }
                }
            }
        }
    }

    fn finish(self) -> Vec<Path> {
        self.destination.finalize(self.c2)
    }
}
