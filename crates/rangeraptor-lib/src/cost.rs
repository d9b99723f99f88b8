//! Generalized-cost (`c1`) model.
//!
//! Costs are kept in centi-seconds ("raptor cost") so that reluctance factors
//! survive integer arithmetic. A leg's cost is always the difference between
//! the cumulative cost of its arrival and that of the previous arrival, which
//! makes the per-leg costs of a path sum to its total.

use serde::{Deserialize, Serialize};

use crate::time::Duration;

/// Raptor cost units per second.
pub const RAPTOR_COST_PER_SECOND: i32 = 100;

/// Walk reluctance used when a leg does not carry an explicit cost.
pub const DEFAULT_WALK_RELUCTANCE: f64 = 2.0;

/// Convert seconds (possibly fractional) into raptor cost.
pub fn to_raptor_cost(seconds: f64) -> i32 {
    (seconds * f64::from(RAPTOR_COST_PER_SECOND)).round() as i32
}

/// Default cost of walking for `duration` seconds.
pub fn walk_cost(duration: Duration) -> i32 {
    to_raptor_cost(f64::from(duration) * DEFAULT_WALK_RELUCTANCE)
}

/// Cost parameters as supplied by a request (seconds and unitless factors).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostParams {
    /// Fixed cost in seconds for every boarding.
    pub board_cost: i32,
    /// Fixed cost in seconds for every boarding after the first one.
    pub transfer_cost: i32,
    pub wait_reluctance: f64,
    pub transit_reluctance: f64,
}

impl Default for CostParams {
    fn default() -> Self {
        Self {
            board_cost: 60,
            transfer_cost: 120,
            wait_reluctance: 0.8,
            transit_reluctance: 1.0,
        }
    }
}

/// Computes cumulative `c1` values for transit boardings and alightings.
#[derive(Debug, Clone, Copy)]
pub struct CostCalculator {
    board_cost: i32,
    transfer_cost: i32,
    wait_factor: f64,
    transit_factor: f64,
}

impl CostCalculator {
    pub fn new(params: &CostParams) -> Self {
        Self {
            board_cost: to_raptor_cost(f64::from(params.board_cost)),
            transfer_cost: to_raptor_cost(f64::from(params.transfer_cost)),
            wait_factor: params.wait_reluctance * f64::from(RAPTOR_COST_PER_SECOND),
            transit_factor: params.transit_reluctance * f64::from(RAPTOR_COST_PER_SECOND),
        }
    }

    /// Cumulative cost right after boarding.
    ///
    /// `stop_board_cost` is already in raptor cost units.
    pub fn board_c1(
        &self,
        prev_c1: i32,
        first_boarding: bool,
        wait: Duration,
        stop_board_cost: i32,
    ) -> i32 {
        let transfer = if first_boarding { 0 } else { self.transfer_cost };
        prev_c1 + self.board_cost + transfer + self.wait_cost(wait) + stop_board_cost
    }

    /// Cumulative cost when alighting after riding for `ride` seconds.
    pub fn alight_c1(&self, board_c1: i32, ride: Duration, stop_alight_cost: i32) -> i32 {
        board_c1 + self.ride_cost(ride) + stop_alight_cost
    }

    pub fn wait_cost(&self, wait: Duration) -> i32 {
        (self.wait_factor * f64::from(wait)).round() as i32
    }

    pub fn ride_cost(&self, ride: Duration) -> i32 {
        (self.transit_factor * f64::from(ride)).round() as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transit_leg_cost_follows_parameters() {
        let calc = CostCalculator::new(&CostParams::default());
        // board 60s + wait 100s * 0.8 = 140s
        let board = calc.board_c1(1_000, true, 100, 0);
        assert_eq!(board, 1_000 + 6_000 + 8_000);
        // second boarding also pays the transfer cost
        assert_eq!(calc.board_c1(0, false, 0, 0), 18_000);
        assert_eq!(calc.alight_c1(board, 600, 50), board + 60_000 + 50);
    }

    #[test]
    fn walking_uses_default_reluctance() {
        assert_eq!(walk_cost(300), 60_000);
        assert_eq!(to_raptor_cost(1.5), 150);
    }
}
