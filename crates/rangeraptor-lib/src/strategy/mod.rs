//! Routing strategies plugged into the range-raptor worker.
//!
//! The worker owns the iteration and round loops; a strategy owns the stop
//! arrivals and decides what boarding, riding and transferring mean for its
//! comparison basis.

mod multi_criteria;
mod standard;

pub use multi_criteria::McRoutingStrategy;
pub use standard::StdRoutingStrategy;

use fixedbitset::FixedBitSet;

use crate::context::SearchContext;
use crate::model::TripPattern;
use crate::path::Path;
use crate::state::{Arrival, ArrivalKind};
use crate::time::Time;

/// Round-by-round transitions of one search.
pub trait RoutingStrategy {
    /// Prepare for a new departure-time iteration. Arrivals from later
    /// departures are kept.
    fn start_iteration(&mut self, departure_time: Time);

    /// Seed round 0 from the access legs.
    fn add_access_arrivals(&mut self, departure_time: Time);

    /// Prepare `round`; returns false when the previous round reached no stop.
    fn start_round(&mut self, round: usize) -> bool;

    /// Stops reached in the previous round, to board from in this one.
    fn boarding_stops(&self) -> &FixedBitSet;

    /// Board, ride and alight one pattern.
    fn ride(&mut self, pattern: &TripPattern, round: usize);

    /// Walk from the on-board arrivals of `round`.
    fn transfers(&mut self, round: usize);

    /// Paths found, already filtered by the destination rules.
    fn finish(self) -> Vec<Path>
    where
        Self: Sized;
}

/// Time and cost of boarding a trip after a stop arrival.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Boarding {
    pub board_time: Time,
    pub board_c1: i32,
    /// Departure from the origin; boarding straight from an access leg
    /// shifts it so the access ends exactly one board slack before departure.
    pub departure_time: Time,
}

pub(crate) fn boarding(
    ctx: &SearchContext<'_>,
    prev: &Arrival,
    pattern: &TripPattern,
    trip: usize,
    stop_pos: usize,
) -> Boarding {
    let board_time = pattern.trip(trip).departure(stop_pos);
    let (departure_time, wait) = match prev.kind {
        ArrivalKind::Access { access } => (
            board_time - ctx.slack.board_slack - access.duration,
            ctx.slack.board_slack,
        ),
        _ => (prev.departure_time, board_time - prev.time),
    };
    let board_c1 = ctx.cost.board_c1(
        prev.c1,
        prev.round == 0,
        wait,
        ctx.data.board_cost(pattern.stop(stop_pos)),
    );
    Boarding {
        board_time,
        board_c1,
        departure_time,
    }
}
