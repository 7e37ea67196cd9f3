//! Observable per-key query state

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

/// Lifecycle status of a cache entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// Never loaded, or disabled
    Idle,
    /// A load is in flight
    Pending,
    /// The latest load succeeded
    Resolved,
    /// The latest load failed
    Failed,
}

impl fmt::Display for QueryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            QueryStatus::Idle => "idle",
            QueryStatus::Pending => "pending",
            QueryStatus::Resolved => "resolved",
            QueryStatus::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Snapshot broadcast to subscribers of a key
///
/// `data` holds the last successfully loaded value. It survives a later
/// failure or a pending refetch, so a consumer can keep showing it.
#[derive(Debug)]
pub struct QueryState<V> {
    pub status: QueryStatus,
    pub data: Option<Arc<V>>,
    pub error: Option<String>,
    /// When `data` was loaded
    pub updated_at: Option<DateTime<Utc>>,
}

impl<V> Clone for QueryState<V> {
    fn clone(&self) -> Self {
        Self {
            status: self.status,
            data: self.data.clone(),
            error: self.error.clone(),
            updated_at: self.updated_at,
        }
    }
}

impl<V> Default for QueryState<V> {
    fn default() -> Self {
        Self::idle()
    }
}

impl<V> QueryState<V> {
    /// State of a key that has never loaded
    pub fn idle() -> Self {
        Self {
            status: QueryStatus::Idle,
            data: None,
            error: None,
            updated_at: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Pending
    }

    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Failed
    }

    /// Whether no load is in flight
    pub fn is_settled(&self) -> bool {
        !self.is_loading()
    }

    /// The last loaded value, if any
    pub fn data(&self) -> Option<Arc<V>> {
        self.data.clone()
    }

    pub(crate) fn begin_load(&mut self) {
        self.status = QueryStatus::Pending;
    }

    pub(crate) fn resolve(&mut self, value: V) {
        self.status = QueryStatus::Resolved;
        self.data = Some(Arc::new(value));
        self.error = None;
        self.updated_at = Some(Utc::now());
    }

    pub(crate) fn fail(&mut self, message: String) {
        self.status = QueryStatus::Failed;
        self.error = Some(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_keeps_last_known_data() {
        let mut state = QueryState::idle();
        state.begin_load();
        assert!(state.is_loading());

        state.resolve(vec![1, 2, 3]);
        assert_eq!(state.status, QueryStatus::Resolved);
        assert!(state.updated_at.is_some());

        state.begin_load();
        state.fail("network down".to_string());
        assert!(state.is_error());
        assert!(!state.is_loading());
        assert_eq!(state.data().as_deref(), Some(&vec![1, 2, 3]));
        assert_eq!(state.error.as_deref(), Some("network down"));
    }

    #[test]
    fn test_resolve_clears_error() {
        let mut state: QueryState<u32> = QueryState::idle();
        state.fail("boom".to_string());
        state.resolve(7);
        assert!(state.error.is_none());
        assert_eq!(state.data().as_deref(), Some(&7));
    }
}
