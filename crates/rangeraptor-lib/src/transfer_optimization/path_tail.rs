use std::collections::HashMap;

use crate::model::StopIndex;
use crate::pareto::ParetoComparator;
use crate::pass_through::PassThroughPointsService;
use crate::path::PathLeg;

/// The part of a path from boarding one transit leg to the destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTail {
    /// Stop position where the first transit leg of the tail is boarded.
    pub board_pos: usize,
    pub legs: Vec<PathLeg>,
    /// Cost of the legs, not counting the wait before the first boarding.
    pub c1: i32,
    /// Via points still to visit before reaching the board stop.
    pub c2: u32,
    /// Same as `c2`, but with the board stop itself not yet counted.
    pub c2_after_board: u32,
}

impl PathTail {
    /// Add `wait_c1` to the first transit leg once the arrival before it is known.
    pub fn add_wait_cost(&mut self, wait_c1: i32) {
        self.c1 += wait_c1;
        if let Some(PathLeg::Transit { c1, .. }) =
            self.legs.iter_mut().find(|leg| leg.is_transit())
        {
            *c1 += wait_c1;
        }
    }
}

/// Tails boarding at the same position: lower cost or fewer remaining via points.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathTailComparator;

impl ParetoComparator<PathTail> for PathTailComparator {
    fn left_dominance_exist(&self, left: &PathTail, right: &PathTail) -> bool {
        left.c1 < right.c1 || left.c2 < right.c2
    }
}

/// Computes `c2` along one transit leg of a tail, walking from the alight
/// position back towards the earliest candidate board position.
///
/// Walking backward, the last via point is matched first: `c2` drops by one
/// when the stop belongs to point `c2 - 1`. A tail starting with `c2 == 0` has
/// already visited every point.
pub struct PathTailC2Calculator<'a> {
    points: &'a PassThroughPointsService,
    stops: &'a [StopIndex],
    earliest_board_pos: usize,
    /// `(alight position, inherited c2)` to `c2` per position from `earliest_board_pos`.
    memo: HashMap<(usize, u32), Vec<u32>>,
}

impl<'a> PathTailC2Calculator<'a> {
    pub fn new(
        points: &'a PassThroughPointsService,
        stops: &'a [StopIndex],
        earliest_board_pos: usize,
    ) -> Self {
        Self {
            points,
            stops,
            earliest_board_pos,
            memo: HashMap::new(),
        }
    }

    /// `c2` when riding from `board_pos` to `alight_pos`, given the `inherited`
    /// value of the rest of the tail.
    pub fn c2_at(&mut self, board_pos: usize, alight_pos: usize, inherited: u32) -> u32 {
        debug_assert!(self.earliest_board_pos <= board_pos && board_pos <= alight_pos);
        if inherited == 0 {
            return 0;
        }
        let (points, stops, first) = (self.points, self.stops, self.earliest_board_pos);
        let per_position = self
            .memo
            .entry((alight_pos, inherited))
            .or_insert_with(|| {
                let mut values = vec![0; alight_pos + 1 - first];
                let mut c2 = inherited;
                for pos in (first..=alight_pos).rev() {
                    if c2 > 0 && points.as_bit_set(c2 as usize - 1).contains(stops[pos]) {
                        c2 -= 1;
                    }
                    values[pos - first] = c2;
                }
                values
            });
        per_position[board_pos - first]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pass_through::PassThroughPoint;

    fn points(points: &[&[StopIndex]]) -> PassThroughPointsService {
        let points: Vec<_> = points
            .iter()
            .map(|stops| PassThroughPoint::new(stops.to_vec()))
            .collect();
        PassThroughPointsService::new(&points, 10).unwrap()
    }

    #[test]
    fn points_are_matched_backward_in_order() {
        let service = points(&[&[2], &[4]]);
        let stops = [0, 1, 2, 3, 4, 5];
        let mut calc = PathTailC2Calculator::new(&service, &stops, 0);

        assert_eq!(calc.c2_at(5, 5, 2), 2);
        assert_eq!(calc.c2_at(4, 5, 2), 1);
        assert_eq!(calc.c2_at(3, 5, 2), 1);
        assert_eq!(calc.c2_at(2, 5, 2), 0);
        assert_eq!(calc.c2_at(0, 5, 2), 0);
    }

    #[test]
    fn reversed_visit_order_is_not_a_match() {
        let service = points(&[&[4], &[2]]);
        let stops = [0, 1, 2, 3, 4, 5];
        let mut calc = PathTailC2Calculator::new(&service, &stops, 0);
        // stop 2 is reached first walking backward but point 1 is needed first
        assert_eq!(calc.c2_at(0, 5, 2), 1);
    }

    #[test]
    fn inherited_zero_skips_the_walk() {
        let service = points(&[&[2]]);
        let stops = [0, 1, 2, 3];
        let mut calc = PathTailC2Calculator::new(&service, &stops, 1);
        assert_eq!(calc.c2_at(1, 3, 0), 0);
        assert!(calc.memo.is_empty());
    }

    #[test]
    fn results_are_memoized_per_alight_position() {
        let service = points(&[&[1]]);
        let stops = [0, 1, 2, 3];
        let mut calc = PathTailC2Calculator::new(&service, &stops, 0);
        assert_eq!(calc.c2_at(2, 3, 1), 1);
        assert_eq!(calc.c2_at(1, 3, 1), 0);
        assert_eq!(calc.memo.len(), 1);
        assert_eq!(calc.c2_at(0, 2, 1), 0);
        assert_eq!(calc.memo.len(), 2);
    }

    #[test]
    fn wait_cost_lands_on_the_first_transit_leg() {
        let mut tail = PathTail {
            board_pos: 0,
            legs: vec![
                PathLeg::Transit {
                    pattern: 0,
                    trip: 0,
                    board_stop: 0,
                    board_pos: 0,
                    alight_stop: 1,
                    alight_pos: 1,
                    from: 0,
                    to: 100,
                    c1: 1_000,
                },
                PathLeg::Egress {
                    stop: 1,
                    from: 100,
                    to: 160,
                    c1: 200,
                },
            ],
            c1: 1_200,
            c2: 0,
            c2_after_board: 0,
        };
        tail.add_wait_cost(50);
        assert_eq!(tail.c1, 1_250);
        assert_eq!(tail.legs[0].c1(), 1_050);
    }
}
