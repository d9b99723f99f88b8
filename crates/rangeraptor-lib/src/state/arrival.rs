//! Stop arrivals and the arena that owns them.
//!
//! Arrivals form a singly linked chain back to an access arrival. The links
//! are [`ArrivalHandle`]s into an [`ArrivalArena`], so reconstructing a path is
//! a backward index walk.

use crate::model::{AccessEgress, PatternIndex, StopIndex, Transfer};
use crate::time::Time;

/// Generation-tagged index into an [`ArrivalArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArrivalHandle {
    index: u32,
    generation: u32,
}

/// How the traveler reached the stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrivalKind {
    Access {
        access: AccessEgress,
    },
    Transit {
        pattern: PatternIndex,
        trip: usize,
        board_pos: usize,
        alight_pos: usize,
        prev: ArrivalHandle,
    },
    Transfer {
        transfer: Transfer,
        prev: ArrivalHandle,
    },
}

/// Shared read access to the criteria of an arrival.
pub trait ArrivalView {
    fn stop(&self) -> StopIndex;
    fn arrival_time(&self) -> Time;
    fn round(&self) -> usize;
    fn c1(&self) -> i32;
    fn c2(&self) -> u32;
    fn arrived_on_board(&self) -> bool;
}

/// Immutable arrival at a stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arrival {
    pub handle: ArrivalHandle,
    pub stop: StopIndex,
    pub time: Time,
    pub round: usize,
    pub c1: i32,
    pub c2: u32,
    /// Departure time from the origin, after any access time-shift.
    pub departure_time: Time,
    pub kind: ArrivalKind,
}

impl Arrival {
    pub fn previous(&self) -> Option<ArrivalHandle> {
        match self.kind {
            ArrivalKind::Access { .. } => None,
            ArrivalKind::Transit { prev, .. } | ArrivalKind::Transfer { prev, .. } => Some(prev),
        }
    }

    pub fn is_access(&self) -> bool {
        matches!(self.kind, ArrivalKind::Access { .. })
    }

    pub fn is_transit(&self) -> bool {
        matches!(self.kind, ArrivalKind::Transit { .. })
    }
}

impl ArrivalView for Arrival {
    fn stop(&self) -> StopIndex {
        self.stop
    }

    fn arrival_time(&self) -> Time {
        self.time
    }

    fn round(&self) -> usize {
        self.round
    }

    fn c1(&self) -> i32 {
        self.c1
    }

    fn c2(&self) -> u32 {
        self.c2
    }

    fn arrived_on_board(&self) -> bool {
        match self.kind {
            ArrivalKind::Access { access } => access.arrived_on_board,
            ArrivalKind::Transit { .. } => true,
            ArrivalKind::Transfer { .. } => false,
        }
    }
}

/// Append-only storage for the arrivals of one search.
#[derive(Debug, Default)]
pub struct ArrivalArena {
    arrivals: Vec<Arrival>,
    generation: u32,
}

impl ArrivalArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all arrivals and invalidate every outstanding handle.
    pub fn reset(&mut self) {
        self.arrivals.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    /// Handle the next pushed arrival will receive.
    pub fn next_handle(&self) -> ArrivalHandle {
        ArrivalHandle {
            index: self.arrivals.len() as u32,
            generation: self.generation,
        }
    }

    /// Store an arrival created with [`ArrivalArena::next_handle`].
    pub fn push(&mut self, arrival: Arrival) -> ArrivalHandle {
        let handle = self.next_handle();
        assert_eq!(
            arrival.handle, handle,
            "arrival must be created with the arena's next handle"
        );
        self.arrivals.push(arrival);
        handle
    }

    pub fn get(&self, handle: ArrivalHandle) -> &Arrival {
        assert_eq!(
            handle.generation, self.generation,
            "stale arrival handle from a previous search"
        );
        &self.arrivals[handle.index as usize]
    }

    pub fn len(&self) -> usize {
        self.arrivals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrivals.is_empty()
    }

    /// Arrivals from `last` back to the access arrival, origin first.
    pub fn chain(&self, last: &Arrival) -> Vec<Arrival> {
        let mut chain = vec![*last];
        let mut current = *last;
        while let Some(prev) = current.previous() {
            current = *self.get(prev);
            chain.push(current);
        }
        chain.reverse();
        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn access(arena: &ArrivalArena, stop: StopIndex) -> Arrival {
        Arrival {
            handle: arena.next_handle(),
            stop,
            time: 100,
            round: 0,
            c1: 0,
            c2: 0,
            departure_time: 0,
            kind: ArrivalKind::Access {
                access: AccessEgress::walk(stop, 100),
            },
        }
    }

    #[test]
    fn chain_walks_back_to_access() {
        let mut arena = ArrivalArena::new();
        let first = access(&arena, 0);
        let first_handle = arena.push(first);
        let transfer = Arrival {
            handle: arena.next_handle(),
            stop: 1,
            time: 200,
            round: 0,
            c1: 10,
            c2: 0,
            departure_time: 0,
            kind: ArrivalKind::Transfer {
                transfer: Transfer::walk(1, 100),
                prev: first_handle,
            },
        };
        arena.push(transfer);

        let chain = arena.chain(&transfer);
        assert_eq!(chain.len(), 2);
        assert!(chain[0].is_access());
        assert!(!chain[1].arrived_on_board());
    }

    #[test]
    #[should_panic(expected = "stale arrival handle")]
    fn stale_handle_panics() {
        let mut arena = ArrivalArena::new();
        let handle = arena.push(access(&arena, 0));
        arena.reset();
        arena.get(handle);
    }
}
