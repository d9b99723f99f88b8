use crate::model::{PatternIndex, Transfer};
use crate::network::TransitDataProvider;
use crate::request::SlackParams;

/// A ridden trip between two stop positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TripLeg {
    pub pattern: PatternIndex,
    pub trip: usize,
    pub board_pos: usize,
    pub alight_pos: usize,
}

/// A feasible connection from one trip to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TripToTripTransfer {
    /// Alight position on the arriving trip.
    pub from_pos: usize,
    /// Board position on the departing trip.
    pub to_pos: usize,
    /// `None` for a same-stop transfer.
    pub walk: Option<Transfer>,
}

/// Enumerates every place two fixed trips can be connected.
#[derive(Clone, Copy)]
pub struct TransferGenerator<'a> {
    data: &'a dyn TransitDataProvider,
    slack: SlackParams,
}

impl<'a> TransferGenerator<'a> {
    pub fn new(data: &'a dyn TransitDataProvider, slack: SlackParams) -> Self {
        Self { data, slack }
    }

    /// Transfers from any stop after `from`'s boarding to any stop before
    /// `to`'s alighting that respect slack and walking time.
    pub fn find_transfers(&self, from: &TripLeg, to: &TripLeg) -> Vec<TripToTripTransfer> {
        let from_pattern = self.data.pattern(from.pattern);
        let to_pattern = self.data.pattern(to.pattern);
        let from_trip = from_pattern.trip(from.trip);
        let to_trip = to_pattern.trip(to.trip);

        let can_board = |at_stop: i32, to_pos: usize| {
            to_pos < to.alight_pos
                && self.slack.earliest_board_time(at_stop, true) <= to_trip.departure(to_pos)
        };

        let mut transfers = Vec::new();
        for from_pos in from.board_pos + 1..from_pattern.num_stops() {
            let stop = from_pattern.stop(from_pos);
            let arrived = from_trip.arrival(from_pos) + self.slack.alight_slack;

            for to_pos in to_pattern.stop_positions(stop) {
                if can_board(arrived, to_pos) {
                    transfers.push(TripToTripTransfer {
                        from_pos,
                        to_pos,
                        walk: None,
                    });
                }
            }
            for walk in self.data.transfers_from(stop) {
                for to_pos in to_pattern.stop_positions(walk.to_stop) {
                    if can_board(arrived + walk.duration, to_pos) {
                        transfers.push(TripToTripTransfer {
                            from_pos,
                            to_pos,
                            walk: Some(*walk),
                        });
                    }
                }
            }
        }
        transfers
    }
}
