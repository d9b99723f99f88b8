//! Generic pareto set.
//!
//! Dominance is expressed through a single "left has an advantage" predicate
//! ([`ParetoComparator::left_dominance_exist`]). For a candidate `c` and a
//! member `m`:
//! - `c` has no advantage over `m`: `c` is rejected (this includes equal elements,
//!   so the first inserted wins);
//! - `c` has an advantage and `m` has none: `m` is evicted;
//! - both have an advantage: both are kept.
//!
//! The set keeps insertion order and a marker separating elements that were
//! already processed from elements added since the last call to
//! [`ParetoSet::mark_at_end`].

use std::fmt;

/// Pluggable "left is better in at least one criterion" predicate.
pub trait ParetoComparator<T> {
    fn left_dominance_exist(&self, left: &T, right: &T) -> bool;
}

impl<T, F> ParetoComparator<T> for F
where
    F: Fn(&T, &T) -> bool,
{
    fn left_dominance_exist(&self, left: &T, right: &T) -> bool {
        self(left, right)
    }
}

/// Result of [`ParetoSet::insert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Insert<T> {
    /// The candidate was added; members it dominated were removed.
    Accepted { evicted: Vec<T> },
    /// An existing member is at least as good in every criterion.
    Rejected,
}

impl<T> Insert<T> {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Insert::Accepted { .. })
    }
}

/// Collection of mutually non-dominated elements.
#[derive(Clone)]
pub struct ParetoSet<T, C> {
    elements: Vec<T>,
    marker: usize,
    comparator: C,
}

impl<T, C: ParetoComparator<T>> ParetoSet<T, C> {
    pub fn new(comparator: C) -> Self {
        Self {
            elements: Vec::new(),
            marker: 0,
            comparator,
        }
    }

    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    /// Would `candidate` be accepted, without changing the set.
    pub fn qualify(&self, candidate: &T) -> bool {
        self.elements
            .iter()
            .all(|member| self.comparator.left_dominance_exist(candidate, member))
    }

    pub fn insert(&mut self, candidate: T) -> Insert<T> {
        if !self.qualify(&candidate) {
            return Insert::Rejected;
        }

        let mut evicted = Vec::new();
        let mut index = 0;
        while index < self.elements.len() {
            if self
                .comparator
                .left_dominance_exist(&self.elements[index], &candidate)
            {
                index += 1;
            } else {
                evicted.push(self.elements.remove(index));
                if index < self.marker {
                    self.marker -= 1;
                }
            }
        }
        self.elements.push(candidate);
        Insert::Accepted { evicted }
    }

    /// Keep only the elements matching `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) {
        let mut index = 0;
        let mut marker = self.marker;
        self.elements.retain(|element| {
            let kept = keep(element);
            if !kept && index < self.marker {
                marker -= 1;
            }
            index += 1;
            kept
        });
        self.marker = marker;
    }
}

impl<T, C> ParetoSet<T, C> {
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.elements.iter()
    }

    /// Update every element in place, keeping insertion order and the marker.
    ///
    /// The set is not re-filtered afterwards: an element the update leaves
    /// dominated stays until a later insert evicts it.
    pub fn for_each_mut(&mut self, update: impl FnMut(&mut T)) {
        self.elements.iter_mut().for_each(update);
    }

    pub fn as_slice(&self) -> &[T] {
        &self.elements
    }

    /// Elements added after the last [`ParetoSet::mark_at_end`].
    pub fn since_marker(&self) -> &[T] {
        &self.elements[self.marker..]
    }

    pub fn has_new_elements(&self) -> bool {
        self.marker < self.elements.len()
    }

    pub fn mark_at_end(&mut self) {
        self.marker = self.elements.len();
    }

    pub fn clear(&mut self) {
        self.elements.clear();
        self.marker = 0;
    }

    pub fn into_vec(self) -> Vec<T> {
        self.elements
    }
}

impl<'a, T, C> IntoIterator for &'a ParetoSet<T, C> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl<T: fmt::Debug, C> fmt::Debug for ParetoSet<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParetoSet")
            .field("elements", &self.elements)
            .field("marker", &self.marker)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Vector = (i32, i32);

    fn less_less(l: &Vector, r: &Vector) -> bool {
        l.0 < r.0 || l.1 < r.1
    }

    fn set_with(v0: Vector) -> ParetoSet<Vector, fn(&Vector, &Vector) -> bool> {
        let mut set = ParetoSet::new(less_less as fn(&Vector, &Vector) -> bool);
        assert!(set.insert(v0).is_accepted());
        set
    }

    #[test]
    fn equal_or_worse_vectors_are_rejected() {
        for candidate in [(6, 5), (5, 6), (5, 5)] {
            let mut set = set_with((5, 5));
            assert_eq!(set.insert(candidate), Insert::Rejected, "{candidate:?}");
            assert_eq!(set.as_slice(), &[(5, 5)]);
        }
    }

    #[test]
    fn better_vector_replaces_dominated_one() {
        for candidate in [(4, 5), (5, 4)] {
            let mut set = set_with((5, 5));
            assert_eq!(
                set.insert(candidate),
                Insert::Accepted {
                    evicted: vec![(5, 5)]
                }
            );
            assert_eq!(set.as_slice(), &[candidate]);
        }
    }

    #[test]
    fn mutually_better_vectors_are_both_kept() {
        for candidate in [(4, 6), (6, 4)] {
            let mut set = set_with((5, 5));
            assert!(set.insert(candidate).is_accepted());
            assert_eq!(set.as_slice(), &[(5, 5), candidate]);
        }
    }

    #[test]
    fn one_vector_dominates_many() {
        let mut set = ParetoSet::new(less_less);
        for v in [(5, 1), (3, 3), (1, 5), (2, 4)] {
            assert!(set.insert(v).is_accepted());
        }
        let result = set.insert((1, 1));
        assert_eq!(
            result,
            Insert::Accepted {
                evicted: vec![(5, 1), (3, 3), (1, 5), (2, 4)]
            }
        );
        assert_eq!(set.as_slice(), &[(1, 1)]);
    }

    #[test]
    fn reflexive_comparator_keeps_equal_elements() {
        let mut set = ParetoSet::new(|l: &Vector, r: &Vector| l.0 < r.0 || l.1 < r.1 + 1);
        set.insert((5, 5));
        assert!(set.insert((5, 5)).is_accepted());
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn marker_tracks_new_elements_across_evictions() {
        let mut set = ParetoSet::new(less_less);
        set.insert((5, 1));
        set.insert((1, 5));
        set.mark_at_end();
        assert!(!set.has_new_elements());

        set.insert((3, 3));
        assert_eq!(set.since_marker(), &[(3, 3)]);

        // evicts (5, 1), which sits before the marker
        set.insert((4, 0));
        assert_eq!(set.as_slice(), &[(1, 5), (3, 3), (4, 0)]);
        assert_eq!(set.since_marker(), &[(3, 3), (4, 0)]);
    }

    #[test]
    fn retain_adjusts_marker() {
        let mut set = ParetoSet::new(less_less);
        set.insert((5, 1));
        set.insert((1, 5));
        set.mark_at_end();
        set.insert((3, 3));
        set.retain(|v| v.0 != 5);
        assert_eq!(set.since_marker(), &[(3, 3)]);
    }
}
