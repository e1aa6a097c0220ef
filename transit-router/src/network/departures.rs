//! Circular iteration over a station's departures.

use std::iter::FusedIterator;

use crate::domain::{ClockTime, Edge};

/// Departures of one station in clock order, beginning at a reference time.
///
/// Starts at the first edge departing at or after the reference time. If
/// nothing departs later that day, starts at the first edge of the day.
/// Every edge is yielded exactly once, wrapping past midnight, so the last
/// item is the departure just before the reference time.
///
/// Among simultaneous departures the first in the station's stable order
/// always comes first, which keeps the starting point deterministic.
#[derive(Debug, Clone)]
pub struct Departures<'a> {
    edges: &'a [Edge],
    start: usize,
    yielded: usize,
}

impl<'a> Departures<'a> {
    /// `edges` must be sorted by departure.
    pub(crate) fn new(edges: &'a [Edge], from: ClockTime) -> Self {
        let start = match edges.partition_point(|e| e.departure() < from) {
            idx if idx == edges.len() => 0,
            idx => idx,
        };
        Self {
            edges,
            start,
            yielded: 0,
        }
    }
}

impl<'a> Iterator for Departures<'a> {
    type Item = &'a Edge;

    fn next(&mut self) -> Option<Self::Item> {
        if self.yielded == self.edges.len() {
            return None;
        }
        let idx = (self.start + self.yielded) % self.edges.len();
        self.yielded += 1;
        Some(&self.edges[idx])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.edges.len() - self.yielded;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Departures<'_> {}

impl FusedIterator for Departures<'_> {}
