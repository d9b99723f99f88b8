//! Range-raptor iteration and round loops.

use fixedbitset::FixedBitSet;
use tracing::{debug, warn};

use crate::context::SearchContext;
use crate::path::Path;
use crate::strategy::RoutingStrategy;

/// What a worker run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerResult {
    pub paths: Vec<Path>,
    pub iterations: usize,
    pub rounds: usize,
    /// The deadline passed before every iteration finished.
    pub timed_out: bool,
}

/// Runs one search: iterations from the latest departure down to the
/// earliest, and within each iteration rounds until no stop improves.
pub struct RangeRaptorWorker<'a, S> {
    ctx: &'a SearchContext<'a>,
    strategy: S,
    patterns: FixedBitSet,
}

impl<'a, S: RoutingStrategy> RangeRaptorWorker<'a, S> {
    pub fn new(ctx: &'a SearchContext<'a>, strategy: S) -> Self {
        Self {
            ctx,
            strategy,
            patterns: FixedBitSet::with_capacity(ctx.data.num_patterns()),
        }
    }

    pub fn run(mut self) -> WorkerResult {
        let ctx = self.ctx;
        let mut iterations = 0;
        let mut rounds = 0;
        let mut timed_out = false;

        'iterations: for departure_time in ctx.departure_times() {
            if ctx.deadline_passed() {
                timed_out = true;
                break;
            }
            iterations += 1;
            self.strategy.start_iteration(departure_time);
            self.strategy.add_access_arrivals(departure_time);
            self.strategy.transfers(0);

            for round in 1..=ctx.max_rounds {
                if ctx.deadline_passed() {
                    timed_out = true;
                    break 'iterations;
                }
                if !self.strategy.start_round(round) {
                    break;
                }
                self.mark_patterns();
                for index in self.patterns.ones() {
                    self.strategy.ride(ctx.data.pattern(index), round);
                }
                self.strategy.transfers(round);
                rounds += 1;
                debug!(departure_time, round, "round finished");
            }
            debug!(departure_time, iteration = iterations, "iteration finished");
        }

        if timed_out {
            warn!(
                iterations,
                rounds, "search deadline passed; returning the paths found so far"
            );
        }

        WorkerResult {
            paths: self.strategy.finish(),
            iterations,
            rounds,
            timed_out,
        }
    }

    /// Patterns serving a boarding stop, in ascending index order.
    fn mark_patterns(&mut self) {
        self.patterns.clear();
        for stop in self.strategy.boarding_stops().ones() {
            for &pattern in self.ctx.data.patterns_for_stop(stop) {
                self.patterns.insert(pattern);
            }
        }
    }
}
