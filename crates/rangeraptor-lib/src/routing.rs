use std::cmp::Reverse;
use std::time::Instant;

use serde::Serialize;
use tracing::info;

use crate::context::SearchContext;
use crate::error::Result;
use crate::network::TransitDataProvider;
use crate::path::Path;
use crate::request::{Profile, RaptorRequest};
use crate::strategy::{McRoutingStrategy, StdRoutingStrategy};
use crate::transfer_optimization::optimize_transfers;
use crate::worker::{RangeRaptorWorker, WorkerResult};

/// Result of one search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RaptorResponse {
    /// Pareto-optimal paths, earliest arrival first.
    pub paths: Vec<Path>,
    pub iterations: usize,
    pub rounds: usize,
    /// The deadline passed; `paths` holds what was found until then.
    pub timed_out: bool,
}

impl RaptorResponse {
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Run a search, honouring the request's timeout if it has one.
pub fn route(data: &dyn TransitDataProvider, request: &RaptorRequest) -> Result<RaptorResponse> {
    let deadline = request.timeout.map(|timeout| Instant::now() + timeout);
    route_with_deadline(data, request, deadline)
}

/// Run a search that stops issuing iterations and rounds once `deadline` passes.
pub fn route_with_deadline(
    data: &dyn TransitDataProvider,
    request: &RaptorRequest,
    deadline: Option<Instant>,
) -> Result<RaptorResponse> {
    let started = Instant::now();

    // Step 1: validate the request and build every request-scoped service.
    let ctx = SearchContext::new(data, request, deadline)?;
    info!(
        profile = %ctx.profile,
        iterations = ctx.departure_times().count(),
        max_rounds = ctx.max_rounds,
        "starting search"
    );

    // Step 2: run the worker with the profile's strategy.
    let result: WorkerResult = match ctx.profile {
        Profile::Standard => {
            RangeRaptorWorker::new(&ctx, StdRoutingStrategy::earliest_arrival(&ctx)).run()
        }
        Profile::MinTravelDuration => {
            RangeRaptorWorker::new(&ctx, StdRoutingStrategy::min_travel_duration(&ctx)).run()
        }
        Profile::MultiCriteria => {
            RangeRaptorWorker::new(&ctx, McRoutingStrategy::new(&ctx)).run()
        }
    };

    // Step 3: move transfers of pass-through paths to cheaper connections.
    let mut paths = optimize_transfers(&ctx, result.paths);

    // Step 4: order for presentation.
    sort_paths(&mut paths);

    info!(
        profile = %ctx.profile,
        paths = paths.len(),
        iterations = result.iterations,
        rounds = result.rounds,
        timed_out = result.timed_out,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "search finished"
    );

    Ok(RaptorResponse {
        paths,
        iterations: result.iterations,
        rounds: result.rounds,
        timed_out: result.timed_out,
    })
}

/// Arrival time, then transfers, then cost, then the later departure.
pub fn sort_paths(paths: &mut [Path]) {
    paths.sort_by_key(|path| {
        (
            path.end_time,
            path.transfers,
            path.c1,
            Reverse(path.start_time),
        )
    });
}
