use std::fmt::Write;

use serde::Serialize;

use crate::cost::RAPTOR_COST_PER_SECOND;
use crate::network::TransitDataProvider;
use crate::path::{Path, PathLeg};
use crate::routing::RaptorResponse;
use crate::time::{format_duration, format_time, Duration};

/// Presentation style for turning a [`JourneySummary`] into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JourneyRenderMode {
    /// The one-line path notation.
    Compact,
    /// One line per leg.
    PlainText,
}

/// Leg of a journey with stop and route names resolved.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LegSummary {
    Access {
        to_stop: String,
        departure: String,
        arrival: String,
        duration: Duration,
    },
    Transit {
        route: String,
        mode: String,
        agency: String,
        trip: String,
        from_stop: String,
        to_stop: String,
        departure: String,
        arrival: String,
    },
    Transfer {
        from_stop: String,
        to_stop: String,
        departure: String,
        arrival: String,
        duration: Duration,
    },
    Egress {
        from_stop: String,
        departure: String,
        arrival: String,
        duration: Duration,
    },
}

/// Structured, name-resolved journey for serialisation.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct JourneySummary {
    pub departure: String,
    pub arrival: String,
    pub duration: Duration,
    pub transfers: usize,
    /// Generalized cost in seconds.
    pub cost: f64,
    pub c2: u32,
    pub legs: Vec<LegSummary>,
    /// The compact one-line notation.
    pub text: String,
}

impl JourneySummary {
    pub fn from_path(data: &dyn TransitDataProvider, path: &Path) -> Self {
        let name = |stop| data.stop_name(stop).to_string();
        let legs = path
            .legs
            .iter()
            .map(|leg| match *leg {
                PathLeg::Access { stop, from, to, .. } => LegSummary::Access {
                    to_stop: name(stop),
                    departure: format_time(from),
                    arrival: format_time(to),
                    duration: to - from,
                },
                PathLeg::Transit {
                    pattern,
                    trip,
                    board_stop,
                    alight_stop,
                    from,
                    to,
                    ..
                } => {
                    let pattern = data.pattern(pattern);
                    LegSummary::Transit {
                        route: pattern.route.id.clone(),
                        mode: pattern.route.mode.clone(),
                        agency: pattern.route.agency.clone(),
                        trip: pattern.trip(trip).id.clone(),
                        from_stop: name(board_stop),
                        to_stop: name(alight_stop),
                        departure: format_time(from),
                        arrival: format_time(to),
                    }
                }
                PathLeg::Transfer {
                    from_stop,
                    to_stop,
                    from,
                    to,
                    ..
                } => LegSummary::Transfer {
                    from_stop: name(from_stop),
                    to_stop: name(to_stop),
                    departure: format_time(from),
                    arrival: format_time(to),
                    duration: to - from,
                },
                PathLeg::Egress { stop, from, to, .. } => LegSummary::Egress {
                    from_stop: name(stop),
                    departure: format_time(from),
                    arrival: format_time(to),
                    duration: to - from,
                },
            })
            .collect();

        Self {
            departure: format_time(path.start_time),
            arrival: format_time(path.end_time),
            duration: path.duration(),
            transfers: path.transfers,
            cost: f64::from(path.c1) / f64::from(RAPTOR_COST_PER_SECOND),
            c2: path.c2,
            legs,
            text: path.display(data).to_string(),
        }
    }

    /// Render the summary using the requested textual mode.
    pub fn render(&self, mode: JourneyRenderMode) -> String {
        match mode {
            JourneyRenderMode::Compact => self.text.clone(),
            JourneyRenderMode::PlainText => self.render_plain(),
        }
    }

    fn render_plain(&self) -> String {
        let mut buffer = String::new();
        let _ = writeln!(
            buffer,
            "{} -> {} ({}, {} transfers, cost {})",
            self.departure,
            self.arrival,
            format_duration(self.duration),
            self.transfers,
            self.cost
        );
        for leg in &self.legs {
            let _ = match leg {
                LegSummary::Access {
                    to_stop,
                    departure,
                    arrival,
                    ..
                } => writeln!(buffer, "  {departure}-{arrival}  walk to {to_stop}"),
                LegSummary::Transit {
                    route,
                    mode,
                    from_stop,
                    to_stop,
                    departure,
                    arrival,
                    ..
                } => writeln!(
                    buffer,
                    "  {departure}-{arrival}  {mode} {route} {from_stop} -> {to_stop}"
                ),
                LegSummary::Transfer {
                    from_stop,
                    to_stop,
                    departure,
                    arrival,
                    ..
                } => writeln!(
                    buffer,
                    "  {departure}-{arrival}  walk {from_stop} -> {to_stop}"
                ),
                LegSummary::Egress {
                    from_stop,
                    departure,
                    arrival,
                    ..
                } => writeln!(
                    buffer,
                    "  {departure}-{arrival}  walk from {from_stop} to destination"
                ),
            };
        }
        buffer
    }
}

/// Serialisable search result with resolved names.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResponseSummary {
    pub iterations: usize,
    pub rounds: usize,
    pub timed_out: bool,
    pub journeys: Vec<JourneySummary>,
}

impl ResponseSummary {
    pub fn from_response(data: &dyn TransitDataProvider, response: &RaptorResponse) -> Self {
        Self {
            iterations: response.iterations,
            rounds: response.rounds,
            timed_out: response.timed_out,
            journeys: response
                .paths
                .iter()
                .map(|path| JourneySummary::from_path(data, path))
                .collect(),
        }
    }
}
