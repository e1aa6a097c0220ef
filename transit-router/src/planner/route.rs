//! Partial routes explored by the search.

use std::sync::Arc;

use crate::domain::{ClockTime, Edge, StationId};

/// A fixed-capacity set of station ids, one bit per station.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct StationSet {
    words: Vec<u64>,
    len: usize,
}

impl StationSet {
    /// Create an empty set able to hold ids below `capacity`.
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            words: vec![0; capacity.div_ceil(64)],
            len: 0,
        }
    }

    /// Create a set holding every id below `capacity`.
    pub(crate) fn full(capacity: usize) -> Self {
        let mut set = Self::new(capacity);
        for idx in 0..capacity {
            set.insert(StationId(idx as u32));
        }
        set
    }

    /// Inserts `id`, returning whether it was newly added.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not below the capacity.
    pub(crate) fn insert(&mut self, id: StationId) -> bool {
        let (word, bit) = Self::position(id);
        let fresh = self.words[word] & bit == 0;
        self.words[word] |= bit;
        if fresh {
            self.len += 1;
        }
        fresh
    }

    /// Removes `id`, returning whether it was present.
    pub(crate) fn remove(&mut self, id: StationId) -> bool {
        let (word, bit) = Self::position(id);
        let Some(slot) = self.words.get_mut(word) else {
            return false;
        };
        let present = *slot & bit != 0;
        *slot &= !bit;
        if present {
            self.len -= 1;
        }
        present
    }

    pub(crate) fn contains(&self, id: StationId) -> bool {
        let (word, bit) = Self::position(id);
        self.words.get(word).is_some_and(|w| w & bit != 0)
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn position(id: StationId) -> (usize, u64) {
        (id.index() / 64, 1u64 << (id.index() % 64))
    }
}

impl std::fmt::Debug for StationSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ids = (0..self.words.len() * 64)
            .map(|idx| StationId(idx as u32))
            .filter(|id| self.contains(*id));
        f.debug_set().entries(ids).finish()
    }
}

/// An immutable, loop-free path from the search's start station.
///
/// Routes share their prefixes: extending a route allocates one node that
/// points back at its predecessor, so sibling extensions never copy edges.
#[derive(Debug)]
pub struct Route {
    before: Option<Arc<Route>>,
    last: Edge,
    /// Minutes from the start time to the arrival of `last`, waits included.
    elapsed: u32,
    visited: StationSet,
    len: usize,
}

impl Route {
    /// A one-edge route boarded at `start` (waiting for the departure counts).
    pub(crate) fn first(start: ClockTime, edge: Edge, station_count: usize) -> Self {
        let mut visited = StationSet::new(station_count);
        visited.insert(edge.from());
        visited.insert(edge.to());
        Self {
            before: None,
            last: edge,
            elapsed: start.minutes_to(edge.departure()) + edge.travel_minutes(),
            visited,
            len: 1,
        }
    }

    /// The route continued by `next`.
    ///
    /// `next` must depart from this route's last station and must not revisit
    /// a station of this route.
    pub(crate) fn extended_by(self: &Arc<Self>, next: Edge) -> Self {
        debug_assert_eq!(next.from(), self.last.to(), "edge does not continue route");
        debug_assert!(!self.contains(next.to()), "route would contain a loop");

        let mut visited = self.visited.clone();
        visited.insert(next.to());
        Self {
            before: Some(Arc::clone(self)),
            last: next,
            elapsed: self.elapsed_if_extended(&next),
            visited,
            len: self.len + 1,
        }
    }

    /// Total elapsed minutes if this route were continued by `next`.
    pub fn elapsed_if_extended(&self, next: &Edge) -> u32 {
        self.elapsed
            .saturating_add(self.last.arrival().minutes_to(next.departure()))
            .saturating_add(next.travel_minutes())
    }

    /// Whether the route starts at, passes through, or ends at `station`.
    pub fn contains(&self, station: StationId) -> bool {
        self.visited.contains(station)
    }

    /// The final edge.
    pub fn last(&self) -> &Edge {
        &self.last
    }

    /// Minutes from the start time to the final arrival.
    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    /// Number of edges; at least one.
    pub fn edge_count(&self) -> usize {
        self.len
    }

    /// The station the route ends at.
    pub fn destination(&self) -> StationId {
        self.last.to()
    }

    /// All edges, oldest first.
    pub fn to_edges(&self) -> Vec<Edge> {
        let mut edges = Vec::with_capacity(self.len);
        let mut node = Some(self);
        while let Some(route) = node {
            edges.push(route.last);
            node = route.before.as_deref();
        }
        edges.reverse();
        edges
    }
}
