//! Query cache configuration types and defaults

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::query;

/// Configuration for the query cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Resolved data younger than this is served without revalidation
    #[serde(with = "humantime_serde")]
    pub stale_time: Duration,
    /// Unsubscribed idle entries older than this are evicted
    #[serde(with = "humantime_serde")]
    pub gc_time: Duration,
    /// Loads running longer than this are marked failed
    #[serde(with = "humantime_serde")]
    pub load_timeout: Duration,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            stale_time: query::STALE_TIME,
            gc_time: query::GC_TIME,
            load_timeout: query::LOAD_TIMEOUT,
        }
    }
}

impl QueryConfig {
    /// Set the stale time
    pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time = stale_time;
        self
    }

    /// Set the garbage collection time
    pub fn with_gc_time(mut self, gc_time: Duration) -> Self {
        self.gc_time = gc_time;
        self
    }

    /// Set the load timeout
    pub fn with_load_timeout(mut self, load_timeout: Duration) -> Self {
        self.load_timeout = load_timeout;
        self
    }
}
