//! Remote data source abstraction
//!
//! The data access layer only needs "fetch this endpoint, give me the body".
//! Keeping that behind a trait lets tests and offline runs swap in an
//! in-memory source without touching HTTP.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::errors::{ApiError, ApiResult};

/// A read-only source of statistics API responses
#[async_trait]
pub trait RemoteSource: Send + Sync + std::fmt::Debug {
    /// Fetch an endpoint (path plus query, relative to the API root) and return its body
    async fn fetch(&self, endpoint: &str) -> ApiResult<String>;
}

/// In-memory source serving canned bodies by endpoint
///
/// Endpoints without a canned body answer with HTTP 404.
#[derive(Debug, Default)]
pub struct StaticSource {
    responses: HashMap<String, String>,
    requests: AtomicUsize,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a body for an endpoint
    pub fn with_response(mut self, endpoint: impl Into<String>, body: impl Into<String>) -> Self {
        self.responses.insert(endpoint.into(), body.into());
        self
    }

    /// Number of fetches served so far
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteSource for StaticSource {
    async fn fetch(&self, endpoint: &str) -> ApiResult<String> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.responses
            .get(endpoint)
            .cloned()
            .ok_or(ApiError::Status { status: 404 })
    }
}

/// Source that is always unreachable; used for offline mode
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineSource;

#[async_trait]
impl RemoteSource for OfflineSource {
    async fn fetch(&self, _endpoint: &str) -> ApiResult<String> {
        Err(ApiError::Status { status: 503 })
    }
}
