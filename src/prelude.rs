//! Prelude module for F1 Dashboard Library
//!
//! Re-exports the items most integrations need, so a single
//! `use f1_dashboard::prelude::*;` is enough to build a dashboard.
//!
//! # Usage
//!
//! ```rust,no_run
//! use f1_dashboard::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = ErgastClient::new()?;
//!     let api = StatsApi::new(Arc::new(client));
//!     let dashboard = Dashboard::new(api, QueryConfig::default());
//!
//!     let rows = dashboard
//!         .comparison("2024", Some("max_verstappen"), Some("lando_norris"))
//!         .await?;
//!     println!("{} rounds compared", rows.len());
//!     Ok(())
//! }
//! ```

// Core result types
pub use crate::errors::{AppError, Result};

// Data access and caching
pub use crate::app::{
    ClientConfig, Dashboard, ErgastClient, FallbackData, OfflineSource, QueryCache, QueryConfig,
    QueryKey, QueryState, QueryStatus, RefetchMode, RemoteSource, StatsApi,
};

// Entities and pure helpers
pub use crate::app::{
    annotate_calendar, build_comparison, ComparisonRow, Constructor, ConstructorStanding, Driver,
    DriverRaceResult, DriverSeries, DriverStanding, RaceSummary, SeasonOption, SelectionState,
};

// Commonly used constants
pub use crate::constants::{API_BASE_URL, DEFAULT_RATE_LIMIT_RPS, ENV_BASE_URL, USER_AGENT};

pub use std::sync::Arc;

pub use tokio;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude_imports() {
        let _client_config = ClientConfig::default();
        let _query_config = QueryConfig::default();
        assert_eq!(ENV_BASE_URL, "F1_DASHBOARD_BASE_URL");
        assert!(DEFAULT_RATE_LIMIT_RPS > 0);
    }

    #[tokio::test]
    async fn test_prelude_integration_pattern() {
        let api = StatsApi::new(Arc::new(OfflineSource));
        let dashboard = Dashboard::new(api, QueryConfig::default());

        let rows = dashboard
            .comparison("2024", Some("max_verstappen"), Some("charles_leclerc"))
            .await
            .unwrap();
        assert!(!rows.is_empty());
    }
}
