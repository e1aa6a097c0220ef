//! Station identity and metadata.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Dense identifier of a station within one network.
///
/// Ids are assigned in insertion order starting at zero, so they double as
/// indices into per-station arrays and bitsets. An id is only meaningful for
/// the network that issued it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationId(pub u32);

impl StationId {
    /// Returns the id as an array index.
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationId({})", self.0)
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stop in the network.
///
/// The default position is a layout hint for visualizations; routing never
/// looks at it.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    id: StationId,
    name: String,
    default_x: f64,
    default_y: f64,
}

impl Station {
    pub(crate) fn new(id: StationId, name: String, default_x: f64, default_y: f64) -> Self {
        Self {
            id,
            name,
            default_x,
            default_y,
        }
    }

    pub fn id(&self) -> StationId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Default layout position as `(x, y)`.
    pub fn default_position(&self) -> (f64, f64) {
        (self.default_x, self.default_y)
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
