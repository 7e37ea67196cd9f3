//! F1 Dashboard Library
//!
//! Fetches public Formula 1 statistics, normalizes them into typed entities,
//! and serves them through a deduplicating query cache. Remote failures fall
//! back to a built-in snapshot so every view always has data to show.

pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod prelude;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};
