//! Search configuration for the route planner.

use tracing::warn;

use crate::domain::{ClockTime, MINUTES_PER_DAY};

/// Environment variable overriding [`SearchConfig::min_transfer_mins`].
pub const ENV_MIN_TRANSFER: &str = "TRANSIT_MIN_TRANSFER";

/// Environment variable overriding [`SearchConfig::max_duration_mins`].
pub const ENV_MAX_DURATION: &str = "TRANSIT_MAX_DURATION";

/// Environment variable overriding [`SearchConfig::default_start`] (HH:MM).
pub const ENV_START_TIME: &str = "TRANSIT_START_TIME";

/// Default parameters for route queries.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Minimum time required to change vehicles (minutes).
    /// Staying on the same tour needs no change time.
    pub min_transfer_mins: i64,

    /// Maximum total route duration (minutes).
    /// Routes longer than this are pruned during search.
    pub max_duration_mins: i64,

    /// Start time used when a query does not name one.
    pub default_start: ClockTime,

    /// Number of independent searches run concurrently when computing
    /// distances from many stations.
    pub batch_size: usize,
}

impl SearchConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(
        min_transfer_mins: i64,
        max_duration_mins: i64,
        default_start: ClockTime,
        batch_size: usize,
    ) -> Self {
        Self {
            min_transfer_mins,
            max_duration_mins,
            default_start,
            batch_size,
        }
    }

    /// Defaults overridden by `TRANSIT_*` environment variables.
    ///
    /// Unparseable values are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_MIN_TRANSFER) {
            match value.trim().parse() {
                Ok(mins) => config.min_transfer_mins = mins,
                Err(_) => warn!(key = ENV_MIN_TRANSFER, %value, "Ignoring invalid minutes"),
            }
        }
        if let Some(value) = lookup(ENV_MAX_DURATION) {
            match value.trim().parse() {
                Ok(mins) => config.max_duration_mins = mins,
                Err(_) => warn!(key = ENV_MAX_DURATION, %value, "Ignoring invalid minutes"),
            }
        }
        if let Some(value) = lookup(ENV_START_TIME) {
            match ClockTime::parse_hhmm(value.trim()) {
                Ok(time) => config.default_start = time,
                Err(e) => warn!(key = ENV_START_TIME, %value, error = %e, "Ignoring invalid time"),
            }
        }

        config
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_transfer_mins: 5,
            max_duration_mins: MINUTES_PER_DAY as i64,
            default_start: ClockTime::new(12, 0).unwrap_or(ClockTime::MIDNIGHT),
            batch_size: 8,
        }
    }
}
