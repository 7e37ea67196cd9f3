//! Core application logic for F1 Dashboard
//!
//! Layers, leaf first: the HTTP client and remote source abstraction, the
//! data access layer with its fallback snapshot, the query cache, and the
//! pure comparison, selection and calendar logic. [`Dashboard`] ties them
//! together.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use f1_dashboard::app::{Dashboard, ErgastClient, QueryConfig, StatsApi};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = StatsApi::new(Arc::new(ErgastClient::new()?));
//! let dashboard = Dashboard::new(api, QueryConfig::default());
//!
//! let mut standings = dashboard.driver_standings("2024").await;
//! if let Some(standings) = standings.settled().await.data {
//!     for standing in standings.iter() {
//!         println!("{} {}", standing.position, standing.driver.full_name());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod calendar;
pub mod client;
pub mod comparison;
pub mod dashboard;
pub mod models;
pub mod query;
pub mod selection;

// Re-export main public API
pub use api::{ApiConfig, FallbackData, StatsApi};
pub use calendar::{annotate_calendar, format_race_date, format_race_time, CalendarEntry, RaceStatus};
pub use client::{ClientConfig, ErgastClient, OfflineSource, RemoteSource, StaticSource};
pub use comparison::{build_comparison, ComparisonRow, DriverSeries, SeriesPoint};
pub use dashboard::Dashboard;
pub use models::{
    format_points, Constructor, ConstructorStanding, Driver, DriverRaceResult, DriverStanding,
    RaceSummary, SeasonOption,
};
pub use query::{
    CacheKey, QueryCache, QueryConfig, QueryKey, QueryState, QueryStats, QueryStatus,
    QuerySubscription, RefetchMode,
};
pub use selection::SelectionState;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_structure() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, crate::constants::API_BASE_URL);
        assert_eq!(QueryConfig::default(), QueryConfig::default());
    }
}
