//! Pass-through (via) points as a secondary criterion.
//!
//! `c2` counts the via points a path still has to visit. It starts at the
//! number of points and drops by one whenever the path reaches a stop of the
//! next required point, so points must be visited in order. Only paths with
//! `c2 == 0` are returned.

use fixedbitset::FixedBitSet;
use serde::{Deserialize, Serialize};

use crate::dominance::{C2Criterion, DominanceFn};
use crate::error::{Error, Result};
use crate::model::StopIndex;

/// One via point: the journey must visit at least one of `stops`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassThroughPoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub stops: Vec<StopIndex>,
}

impl PassThroughPoint {
    pub fn new(stops: Vec<StopIndex>) -> Self {
        Self { name: None, stops }
    }

    pub fn named(name: impl Into<String>, stops: Vec<StopIndex>) -> Self {
        Self {
            name: Some(name.into()),
            stops,
        }
    }
}

/// Lower remaining count is better.
fn fewer_points_left(left: u32, right: u32) -> bool {
    left < right
}

/// Ordered via points of one request.
#[derive(Debug, Clone)]
pub struct PassThroughPointsService {
    points: Vec<FixedBitSet>,
}

impl PassThroughPointsService {
    pub fn new(points: &[PassThroughPoint], num_stops: usize) -> Result<Self> {
        let points = points
            .iter()
            .enumerate()
            .map(|(index, point)| {
                if point.stops.is_empty() {
                    return Err(Error::invalid_request(format!(
                        "pass-through point {} has no stops",
                        point.name.as_deref().unwrap_or(&index.to_string())
                    )));
                }
                let mut set = FixedBitSet::with_capacity(num_stops);
                for &stop in &point.stops {
                    if stop >= num_stops {
                        return Err(Error::StopIndexOutOfRange {
                            index: stop,
                            num_stops,
                        });
                    }
                    set.insert(stop);
                }
                Ok(set)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { points })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Stops of the via point at `index` (0 is visited first).
    pub fn as_bit_set(&self, index: usize) -> &FixedBitSet {
        &self.points[index]
    }

    /// Index of the point a path with this `c2` must visit next.
    pub fn next_point_index(&self, c2: u32) -> Option<usize> {
        (c2 > 0).then(|| self.points.len() - c2 as usize)
    }

    /// `c2` after visiting `stop`.
    pub fn update_c2(&self, c2: u32, stop: StopIndex) -> u32 {
        match self.next_point_index(c2) {
            Some(index) if self.points[index].contains(stop) => c2 - 1,
            _ => c2,
        }
    }

    pub fn is_c2_optimal(c2: u32) -> bool {
        c2 == 0
    }
}

impl C2Criterion for PassThroughPointsService {
    fn initial_c2(&self) -> u32 {
        self.points.len() as u32
    }

    fn visit_stop(&self, c2: u32, stop: StopIndex) -> u32 {
        self.update_c2(c2, stop)
    }

    fn dominance(&self) -> DominanceFn {
        fewer_points_left
    }

    fn accept_at_destination(&self, c2: u32) -> bool {
        Self::is_c2_optimal(c2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> PassThroughPointsService {
        PassThroughPointsService::new(
            &[
                PassThroughPoint::named("first", vec![2, 3]),
                PassThroughPoint::named("second", vec![5]),
            ],
            8,
        )
        .unwrap()
    }

    #[test]
    fn points_must_be_visited_in_order() {
        let s = service();
        let mut c2 = s.initial_c2();
        assert_eq!(c2, 2);
        // second point before first does not count
        c2 = s.update_c2(c2, 5);
        assert_eq!(c2, 2);
        c2 = s.update_c2(c2, 3);
        assert_eq!(c2, 1);
        c2 = s.update_c2(c2, 3);
        assert_eq!(c2, 1);
        c2 = s.update_c2(c2, 5);
        assert_eq!(c2, 0);
        assert_eq!(s.update_c2(c2, 2), 0);
        assert!(s.accept_at_destination(c2));
        assert!(!s.accept_at_destination(1));
    }

    #[test]
    fn fewer_remaining_points_dominate() {
        let cmp = service().dominance();
        assert!(cmp(0, 1));
        assert!(!cmp(1, 0));
        assert!(!cmp(1, 1));
    }

    #[test]
    fn invalid_points_are_rejected() {
        assert!(PassThroughPointsService::new(&[PassThroughPoint::new(vec![])], 4).is_err());
        assert!(matches!(
            PassThroughPointsService::new(&[PassThroughPoint::new(vec![9])], 4),
            Err(Error::StopIndexOutOfRange { index: 9, .. })
        ));
    }
}
