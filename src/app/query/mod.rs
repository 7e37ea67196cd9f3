//! Request cache and coordinator
//!
//! A keyed cache in front of the data access layer. It guarantees at most one
//! in-flight load per key, shares results between subscribers, revalidates
//! stale data in the background, and discards responses that were superseded
//! by a newer load for the same key.
//!
//! # Module Organization
//!
//! - [`config`] - Stale, garbage collection and load timeouts
//! - [`key`] - The `CacheKey` trait and the dashboard's `QueryKey`
//! - [`state`] - Per-key state broadcast to subscribers
//! - [`cache`] - The cache itself and subscriptions
//! - [`stats`] - Counters and snapshots
//!
//! # Examples
//!
//! ```rust,no_run
//! use f1_dashboard::app::query::{QueryCache, QueryConfig, QueryKey};
//!
//! # async fn example() {
//! let cache: QueryCache<QueryKey, Vec<String>> = QueryCache::new(QueryConfig::default());
//! let key = QueryKey::Drivers { season: "2024".to_string() };
//!
//! let mut subscription = cache
//!     .get(key, || async { Ok(vec!["max_verstappen".to_string()]) })
//!     .await;
//! let state = subscription.settled().await;
//! println!("{:?}", state.data);
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod key;
pub mod state;
pub mod stats;

pub use cache::{QueryCache, QuerySubscription, RefetchMode};
pub use config::QueryConfig;
pub use key::{CacheKey, QueryKey};
pub use state::{QueryState, QueryStatus};
pub use stats::QueryStats;
