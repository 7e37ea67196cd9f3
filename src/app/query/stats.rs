//! Query cache statistics

use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time summary of a query cache
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryStats {
    /// Entries currently held
    pub entries: usize,
    pub pending: usize,
    pub resolved: usize,
    pub failed: usize,
    /// Loader calls since the cache was created
    pub loader_invocations: u64,
    /// Responses dropped because a newer load for the same key was issued
    pub discarded_responses: u64,
    /// Entries removed by garbage collection
    pub evicted: u64,
}

impl QueryStats {
    /// Share of entries whose latest load failed
    pub fn failure_rate(&self) -> f64 {
        let settled = self.resolved + self.failed;
        if settled == 0 {
            return 0.0;
        }
        self.failed as f64 / settled as f64
    }
}

/// Monotonic counters shared with load tasks
#[derive(Debug, Default)]
pub(crate) struct QueryCounters {
    pub loader_invocations: AtomicU64,
    pub discarded_responses: AtomicU64,
    pub evicted: AtomicU64,
}

impl QueryCounters {
    pub fn record_load(&self) {
        self.loader_invocations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_discard(&self) {
        self.discarded_responses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_evictions(&self, count: u64) {
        self.evicted.fetch_add(count, Ordering::Relaxed);
    }

    /// Copy the counters into a stats snapshot
    pub fn fill(&self, stats: &mut QueryStats) {
        stats.loader_invocations = self.loader_invocations.load(Ordering::Relaxed);
        stats.discarded_responses = self.discarded_responses.load(Ordering::Relaxed);
        stats.evicted = self.evicted.load(Ordering::Relaxed);
    }
}
