//! Origin-to-destination paths built from arrival chains.

use std::fmt;

use serde::Serialize;

use crate::cost::RAPTOR_COST_PER_SECOND;
use crate::model::{AccessEgress, PatternIndex, StopIndex};
use crate::network::TransitDataProvider;
use crate::request::SlackParams;
use crate::state::{Arrival, ArrivalArena, ArrivalKind};
use crate::time::{format_duration, format_time, Duration, Time};

/// One leg of a [`Path`]. Every leg carries its own `c1` in raptor cost units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PathLeg {
    Access {
        stop: StopIndex,
        from: Time,
        to: Time,
        c1: i32,
        arrived_on_board: bool,
    },
    Transit {
        pattern: PatternIndex,
        trip: usize,
        board_stop: StopIndex,
        board_pos: usize,
        alight_stop: StopIndex,
        alight_pos: usize,
        from: Time,
        to: Time,
        c1: i32,
    },
    Transfer {
        from_stop: StopIndex,
        to_stop: StopIndex,
        from: Time,
        to: Time,
        c1: i32,
    },
    Egress {
        stop: StopIndex,
        from: Time,
        to: Time,
        c1: i32,
    },
}

impl PathLeg {
    pub fn from_time(&self) -> Time {
        match self {
            PathLeg::Access { from, .. }
            | PathLeg::Transit { from, .. }
            | PathLeg::Transfer { from, .. }
            | PathLeg::Egress { from, .. } => *from,
        }
    }

    pub fn to_time(&self) -> Time {
        match self {
            PathLeg::Access { to, .. }
            | PathLeg::Transit { to, .. }
            | PathLeg::Transfer { to, .. }
            | PathLeg::Egress { to, .. } => *to,
        }
    }

    pub fn duration(&self) -> Duration {
        self.to_time() - self.from_time()
    }

    pub fn c1(&self) -> i32 {
        match self {
            PathLeg::Access { c1, .. }
            | PathLeg::Transit { c1, .. }
            | PathLeg::Transfer { c1, .. }
            | PathLeg::Egress { c1, .. } => *c1,
        }
    }

    pub fn is_transit(&self) -> bool {
        matches!(self, PathLeg::Transit { .. })
    }
}

/// A complete journey with its summary criteria.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Path {
    pub legs: Vec<PathLeg>,
    pub start_time: Time,
    pub end_time: Time,
    /// Number of transit legs minus one.
    pub transfers: usize,
    /// Total generalized cost; always the sum of the legs' `c1`.
    pub c1: i32,
    pub c2: u32,
    /// Departure time of the range-raptor iteration that found the path.
    #[serde(skip)]
    pub iteration_departure_time: Time,
}

impl Path {
    /// Summarize `legs`; `c1` is summed over the legs. The iteration
    /// departure defaults to the start time.
    pub fn new(legs: Vec<PathLeg>, c2: u32) -> Self {
        let start_time = legs.first().map_or(0, PathLeg::from_time);
        let end_time = legs.last().map_or(0, PathLeg::to_time);
        let transit_legs = legs.iter().filter(|leg| leg.is_transit()).count();
        Self {
            start_time,
            iteration_departure_time: start_time,
            end_time,
            transfers: transit_legs.saturating_sub(1),
            c1: legs.iter().map(PathLeg::c1).sum(),
            c2,
            legs,
        }
    }

    pub fn with_iteration_departure_time(mut self, departure_time: Time) -> Self {
        self.iteration_departure_time = departure_time;
        self
    }

    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }

    pub fn transit_legs(&self) -> impl Iterator<Item = &PathLeg> {
        self.legs.iter().filter(|leg| leg.is_transit())
    }

    /// Render with stop and route names resolved against `data`.
    pub fn display<'a>(&'a self, data: &'a dyn TransitDataProvider) -> PathDisplay<'a> {
        PathDisplay { path: self, data }
    }
}

/// Builds [`Path`]s by walking arrival chains back to the origin.
#[derive(Clone, Copy)]
pub struct PathBuilder<'a> {
    data: &'a dyn TransitDataProvider,
    slack: SlackParams,
}

impl<'a> PathBuilder<'a> {
    pub fn new(data: &'a dyn TransitDataProvider, slack: SlackParams) -> Self {
        Self { data, slack }
    }

    /// Path ending with `egress` after `last`.
    pub fn build(&self, arena: &ArrivalArena, last: &Arrival, egress: &AccessEgress) -> Path {
        let chain = arena.chain(last);
        let mut legs = Vec::with_capacity(chain.len() + 1);
        let mut prev: Option<&Arrival> = None;

        for (index, arrival) in chain.iter().enumerate() {
            let c1 = arrival.c1 - prev.map_or(0, |p| p.c1);
            let leg = match arrival.kind {
                ArrivalKind::Access { access } => {
                    let (from, to) = match chain.get(index + 1).map(|next| next.kind) {
                        Some(ArrivalKind::Transit {
                            pattern,
                            trip,
                            board_pos,
                            ..
                        }) => {
                            // shifted to end just before the first boarding
                            let board_time =
                                self.data.pattern(pattern).trip(trip).departure(board_pos);
                            let to = board_time - self.slack.board_slack;
                            (to - access.duration, to)
                        }
                        _ => (arrival.departure_time, arrival.time),
                    };
                    PathLeg::Access {
                        stop: arrival.stop,
                        from,
                        to,
                        c1,
                        arrived_on_board: access.arrived_on_board,
                    }
                }
                ArrivalKind::Transit {
                    pattern,
                    trip,
                    board_pos,
                    alight_pos,
                    ..
                } => {
                    let pattern_ref = self.data.pattern(pattern);
                    let schedule = pattern_ref.trip(trip);
                    PathLeg::Transit {
                        pattern,
                        trip,
                        board_stop: pattern_ref.stop(board_pos),
                        board_pos,
                        alight_stop: arrival.stop,
                        alight_pos,
                        from: schedule.departure(board_pos),
                        to: schedule.arrival(alight_pos),
                        c1,
                    }
                }
                ArrivalKind::Transfer { transfer, .. } => PathLeg::Transfer {
                    from_stop: prev.map_or(arrival.stop, |p| p.stop),
                    to_stop: transfer.to_stop,
                    from: arrival.time - transfer.duration,
                    to: arrival.time,
                    c1,
                },
            };
            legs.push(leg);
            prev = Some(arrival);
        }

        legs.push(PathLeg::Egress {
            stop: egress.stop,
            from: last.time,
            to: last.time + egress.duration,
            c1: egress.c1,
        });
        Path::new(legs, last.c2)
    }
}

/// [`Path`] rendered on one line, e.g.
/// `Walk 5m ~ A ~ BUS L1 10:05 10:25 ~ B ~ Walk 1m [10:00 10:26 26m Tₓ0 C₁1800 C₂0]`.
pub struct PathDisplay<'a> {
    path: &'a Path,
    data: &'a dyn TransitDataProvider,
}

impl fmt::Display for PathDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.data;
        for (index, leg) in self.path.legs.iter().enumerate() {
            if index > 0 {
                f.write_str(" ~ ")?;
            }
            match leg {
                PathLeg::Access {
                    stop,
                    arrived_on_board,
                    ..
                } => {
                    let mode = if *arrived_on_board { "Flex" } else { "Walk" };
                    write!(
                        f,
                        "{mode} {} ~ {}",
                        format_duration(leg.duration()),
                        data.stop_name(*stop)
                    )?;
                }
                PathLeg::Transit {
                    pattern,
                    alight_stop,
                    from,
                    to,
                    ..
                } => {
                    write!(
                        f,
                        "{} {} {} ~ {}",
                        data.pattern(*pattern).route,
                        format_time(*from),
                        format_time(*to),
                        data.stop_name(*alight_stop)
                    )?;
                }
                PathLeg::Transfer { to_stop, .. } => {
                    write!(
                        f,
                        "Walk {} ~ {}",
                        format_duration(leg.duration()),
                        data.stop_name(*to_stop)
                    )?;
                }
                PathLeg::Egress { .. } => {
                    write!(f, "Walk {}", format_duration(leg.duration()))?;
                }
            }
        }
        write!(
            f,
            " [{} {} {} Tₓ{} C₁{} C₂{}]",
            format_time(self.path.start_time),
            format_time(self.path.end_time),
            format_duration(self.path.duration()),
            self.path.transfers,
            CostDisplay(self.path.c1),
            self.path.c2
        )
    }
}

/// Raptor cost shown in seconds, with hundredths only when needed.
struct CostDisplay(i32);

impl fmt::Display for CostDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let value = self.0.abs();
        let (whole, cents) = (value / RAPTOR_COST_PER_SECOND, value % RAPTOR_COST_PER_SECOND);
        if cents == 0 {
            write!(f, "{sign}{whole}")
        } else {
            write!(f, "{sign}{whole}.{cents:02}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RouteInfo, TripSchedule};
    use crate::network::TransitNetworkBuilder;
    use crate::time::parse_time;

    fn t(value: &str) -> Time {
        parse_time(value).unwrap()
    }

    #[test]
    fn chain_becomes_legs_with_shifted_access() {
        let mut b = TransitNetworkBuilder::new();
        let [a, z] = ["A", "Z"].map(|id| b.add_stop(id).unwrap());
        b.add_pattern(
            RouteInfo::new("L1", "X", "BUS"),
            vec![a, z],
            vec![TripSchedule::new("t1", vec![t("10:05"), t("10:25")])],
        )
        .unwrap();
        let net = b.build().unwrap();

        let mut arena = ArrivalArena::new();
        let access = AccessEgress::with_cost(a, 300, 60_000);
        let first = Arrival {
            handle: arena.next_handle(),
            stop: a,
            time: t("09:55"),
            round: 0,
            c1: 60_000,
            c2: 0,
            departure_time: t("09:50"),
            kind: ArrivalKind::Access { access },
        };
        let first_handle = arena.push(first);
        let ride = Arrival {
            handle: arena.next_handle(),
            stop: z,
            time: t("10:25"),
            round: 1,
            c1: 60_000 + 126_000,
            c2: 0,
            departure_time: t("10:00"),
            kind: ArrivalKind::Transit {
                pattern: 0,
                trip: 0,
                board_pos: 0,
                alight_pos: 1,
                prev: first_handle,
            },
        };
        arena.push(ride);

        let builder = PathBuilder::new(&net, SlackParams::default());
        let path = builder.build(&arena, &ride, &AccessEgress::with_cost(z, 60, 12_000));

        assert_eq!(path.start_time, t("10:00"));
        assert_eq!(path.end_time, t("10:26"));
        assert_eq!(path.transfers, 0);
        assert_eq!(path.c1, 60_000 + 126_000 + 12_000);
        assert_eq!(path.legs[0].from_time(), t("10:00"));
        assert_eq!(path.legs[0].to_time(), t("10:05"));
        assert_eq!(
            path.display(&net).to_string(),
            "Walk 5m ~ A ~ BUS L1 10:05 10:25 ~ Z ~ Walk 1m [10:00 10:26 26m Tₓ0 C₁1980 C₂0]"
        );
    }

    #[test]
    fn cost_display_keeps_hundredths() {
        assert_eq!(CostDisplay(240_000).to_string(), "2400");
        assert_eq!(CostDisplay(12_345).to_string(), "123.45");
    }
}
