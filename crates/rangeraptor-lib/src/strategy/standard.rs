use fixedbitset::FixedBitSet;

use super::{boarding, RoutingStrategy};
use crate::context::SearchContext;
use crate::destination::{DestinationArrivalPaths, PathComparator};
use crate::model::{StopIndex, TripPattern};
use crate::path::{Path, PathBuilder};
use crate::state::{
    Arrival, ArrivalArena, ArrivalHandle, ArrivalKind, ComparisonBasis, StdStopArrivals,
    TouchedStops,
};
use crate::time::Time;

/// Trip currently ridden while scanning a pattern.
#[derive(Debug, Clone, Copy)]
struct OnTrip {
    trip: usize,
    board_pos: usize,
    board_time: Time,
    board_c1: i32,
    departure_time: Time,
    prev: ArrivalHandle,
}

/// Single-criterion strategy: one best arrival per stop and round.
///
/// Used for the earliest-arrival and the minimum-travel-duration profiles;
/// the two differ only in the [`ComparisonBasis`].
pub struct StdRoutingStrategy<'a> {
    ctx: &'a SearchContext<'a>,
    arena: ArrivalArena,
    stops: StdStopArrivals,
    touched: TouchedStops,
    destination: DestinationArrivalPaths<'a>,
}

impl<'a> StdRoutingStrategy<'a> {
    pub fn earliest_arrival(ctx: &'a SearchContext<'a>) -> Self {
        Self::new(ctx, ComparisonBasis::ArrivalTime)
    }

    pub fn min_travel_duration(ctx: &'a SearchContext<'a>) -> Self {
        Self::new(ctx, ComparisonBasis::TravelDuration)
    }

    fn new(ctx: &'a SearchContext<'a>, basis: ComparisonBasis) -> Self {
        let num_stops = ctx.data.num_stops();
        let destination = DestinationArrivalPaths::new(
            PathComparator::new(ctx.timetable, None),
            PathBuilder::new(ctx.data, ctx.slack),
            ctx.latest_arrival_time,
        );
        Self {
            ctx,
            arena: ArrivalArena::new(),
            stops: StdStopArrivals::new(basis, num_stops, ctx.max_rounds),
            touched: TouchedStops::new(num_stops),
            destination,
        }
    }

    /// Record an access or transfer arrival. A transfer may still end the
    /// journey through an egress leg that starts on board.
    fn accept(&mut self, arrival: Arrival) {
        let ctx = self.ctx;
        if !ctx.is_viable(arrival.stop, arrival.time, arrival.round) {
            return;
        }
        if !self.stops.accept(arrival) {
            return;
        }
        self.arena.push(arrival);
        self.touched.touch(arrival.stop);
        if arrival.round > 0 {
            for egress in ctx.egress(arrival.stop) {
                if egress.arrived_on_board {
                    self.destination.add(&self.arena, &arrival, egress);
                }
            }
        }
    }

    fn accept_transit(&mut self, arrival: Arrival) {
        let ctx = self.ctx;
        if !ctx.is_viable(arrival.stop, arrival.time, arrival.round) {
            return;
        }
        if !self.stops.accept_transit(arrival) {
            return;
        }
        self.arena.push(arrival);
        self.touched.touch(arrival.stop);
        for egress in ctx.egress(arrival.stop) {
            self.destination.add(&self.arena, &arrival, egress);
        }
    }

    /// Earliest trip boardable at `stop_pos` after the previous round's arrival,
    /// restricted to trips before `limit`.
    fn find_boarding(
        &self,
        pattern: &TripPattern,
        stop_pos: usize,
        stop: StopIndex,
        round: usize,
        limit: usize,
    ) -> Option<OnTrip> {
        let prev = self.stops.arrival(round - 1, stop)?;
        let earliest = self
            .ctx
            .slack
            .earliest_board_time(prev.time, prev.round > 0);
        let trip =
            pattern.find_earliest_trip(stop_pos, earliest, self.ctx.latest_arrival_time, limit)?;
        let boarded = boarding(self.ctx, prev, pattern, trip, stop_pos);
        Some(OnTrip {
            trip,
            board_pos: stop_pos,
            board_time: boarded.board_time,
            board_c1: boarded.board_c1,
            departure_time: boarded.departure_time,
            prev: prev.handle,
        })
    }
}

impl RoutingStrategy for StdRoutingStrategy<'_> {
    fn start_iteration(&mut self, departure_time: Time) {
        self.touched.clear();
        self.destination.start_iteration(departure_time);
    }

    fn add_access_arrivals(&mut self, departure_time: Time) {
        for access in self.ctx.access {
            let arrival = Arrival {
                handle: self.arena.next_handle(),
                stop: access.stop,
                time: departure_time + access.duration,
                round: 0,
                c1: access.c1,
                c2: 0,
                departure_time,
                kind: ArrivalKind::Access { access: *access },
            };
            self.accept(arrival);
        }
    }

    fn start_round(&mut self, _round: usize) -> bool {
        self.touched.advance()
    }

    fn boarding_stops(&self) -> &FixedBitSet {
        self.touched.previous()
    }

    fn ride(&mut self, pattern: &TripPattern, round: usize) {
        let ctx = self.ctx;
        let num_stops = pattern.num_stops();
        let mut on_trip: Option<OnTrip> = None;

        for stop_pos in 0..num_stops {
            let stop = pattern.stop(stop_pos);

            if let Some(ride) = on_trip {
                let scheduled = pattern.trip(ride.trip).arrival(stop_pos);
                let arrival = Arrival {
                    handle: self.arena.next_handle(),
                    stop,
                    time: scheduled + ctx.slack.alight_slack,
                    round,
                    c1: ctx.cost.alight_c1(
                        ride.board_c1,
                        scheduled - ride.board_time,
                        ctx.data.alight_cost(stop),
                    ),
                    c2: 0,
                    departure_time: ride.departure_time,
                    kind: ArrivalKind::Transit {
                        pattern: pattern.index,
                        trip: ride.trip,
                        board_pos: ride.board_pos,
                        alight_pos: stop_pos,
                        prev: ride.prev,
                    },
                };
                self.accept_transit(arrival);
            }

            if stop_pos + 1 < num_stops && self.touched.previous().contains(stop) {
                // only switch to an earlier trip
                let limit = on_trip.map_or(pattern.trips.len(), |ride| ride.trip);
                if let Some(boarded) = self.find_boarding(pattern, stop_pos, stop, round, limit) {
                    on_trip = Some(boarded);
                }
            }
        }
    }

    fn transfers(&mut self, round: usize) {
        let ctx = self.ctx;
        let reached: Vec<StopIndex> = self.touched.current().ones().collect();
        for stop in reached {
            let Some(prev) = self.stops.transit_arrival(round, stop).copied() else {
                continue;
            };
            for transfer in ctx.data.transfers_from(stop) {
                let arrival = Arrival {
                    handle: self.arena.next_handle(),
                    stop: transfer.to_stop,
                    time: prev.time + transfer.duration,
                    round,
                    c1: prev.c1 + transfer.c1,
                    c2: 0,
                    departure_time: prev.departure_time,
                    kind: ArrivalKind::Transfer {
                        transfer: *transfer,
                        prev: prev.handle,
                    },
                };
                self.accept(arrival);
            }
        }
    }

    fn finish(self) -> Vec<Path> {
        self.destination.finalize(None)
    }
}
