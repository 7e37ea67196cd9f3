//! Application constants for the F1 dashboard
//!
//! This module centralizes all constants used throughout the application,
//! organized by functional domain for maintainability and clarity.

use std::time::Duration;

/// Environment variable names
pub mod env {
    /// Overrides the remote API base URL
    pub const BASE_URL: &str = "F1_DASHBOARD_BASE_URL";
}

/// Remote statistics API endpoints and paging
pub mod api {
    use super::Duration;

    /// Ergast-compatible API base URL
    pub const BASE_URL: &str = "https://ergast.com/api/f1";

    /// Smallest page the seasons endpoint is asked for
    pub const MIN_SEASONS_PAGE: usize = 20;

    /// Seasons requested by the dashboard
    pub const DEFAULT_SEASON_COUNT: usize = 60;

    /// Page size for a season's race schedule
    pub const SCHEDULE_PAGE_LIMIT: usize = 60;

    /// Page size for a season's driver list
    pub const DRIVERS_PAGE_LIMIT: usize = 100;

    /// Page size for a driver's season results
    pub const RESULTS_PAGE_LIMIT: usize = 100;

    /// Upper bound on a single remote call, including retries
    pub const FETCH_TIMEOUT: Duration = Duration::from_secs(20);
}

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Default user agent for all HTTP requests
    pub const USER_AGENT: &str = "F1-Dashboard/0.1.0 (Race Statistics Viewer)";

    /// Default HTTP request timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Connection pool idle timeout
    pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

    /// Maximum idle connections per host in pool
    pub const POOL_MAX_PER_HOST: usize = 4;
}

/// Rate limiting and retry configuration
pub mod limits {
    /// Ergast asks clients to stay at or below four requests per second
    pub const DEFAULT_RATE_LIMIT_RPS: u32 = 4;

    /// Maximum retry attempts for failed requests
    pub const MAX_RETRIES: u32 = 2;

    /// Base delay for exponential backoff (milliseconds)
    pub const RETRY_BASE_DELAY_MS: u64 = 250;

    /// Upper bound on random jitter added to each backoff (milliseconds)
    pub const RETRY_JITTER_MS: u64 = 100;
}

/// Query cache timing
pub mod query {
    use super::Duration;

    /// Resolved data younger than this is served without revalidation
    pub const STALE_TIME: Duration = Duration::from_secs(5 * 60);

    /// Unsubscribed entries idle for this long are evicted
    pub const GC_TIME: Duration = Duration::from_secs(10 * 60);

    /// Loads running longer than this are marked failed
    pub const LOAD_TIMEOUT: Duration = Duration::from_secs(30);
}

/// Static fallback dataset parameters
pub mod fallback {
    /// Most recent season in the fallback dataset
    pub const LATEST_SEASON: u16 = 2024;

    /// Number of seasons offered when the remote list is unavailable
    pub const SEASON_COUNT: usize = 15;
}

/// Logging constants
pub mod logging {
    /// Default log level
    pub const DEFAULT_LOG_LEVEL: &str = "warn";

    /// Crate target used in the env-filter directive
    pub const CRATE_TARGET: &str = "f1_dashboard";
}

/// Configuration file lookup
pub mod config {
    /// Project-local configuration file name
    pub const LOCAL_FILE_NAME: &str = "f1-dashboard.toml";

    /// Directory under the user config dir
    pub const APP_DIR_NAME: &str = "f1-dashboard";

    /// File name inside the user config dir
    pub const FILE_NAME: &str = "config.toml";
}

// Re-export commonly used constants for convenience
pub use api::BASE_URL as API_BASE_URL;
pub use env::BASE_URL as ENV_BASE_URL;
pub use http::{DEFAULT_TIMEOUT as HTTP_TIMEOUT, USER_AGENT};
pub use limits::{DEFAULT_RATE_LIMIT_RPS, MAX_RETRIES, RETRY_BASE_DELAY_MS};
