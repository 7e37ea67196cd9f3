//! Data access layer
//!
//! Six best-effort read operations over a [`RemoteSource`]. Each one attempts
//! the remote call, decodes and normalizes the response, and on any failure
//! (transport, non-2xx, timeout, malformed payload) logs a warning and returns
//! the matching slice of [`FallbackData`] instead. Callers never see the
//! underlying error; a request is either wholly remote or wholly fallback.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use f1_dashboard::app::{ErgastClient, StatsApi};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = StatsApi::new(Arc::new(ErgastClient::new()?));
//! for standing in api.driver_standings("2023").await {
//!     println!("{} {}", standing.position, standing.driver.full_name());
//! }
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::app::client::RemoteSource;
use crate::app::models::{
    ConstructorStanding, Driver, DriverRaceResult, DriverStanding, RaceSummary, SeasonOption,
};
use crate::constants::api;
use crate::errors::{ApiError, ApiResult};

pub mod fallback;
pub mod responses;

pub use fallback::FallbackData;

use responses::{
    ConstructorStandingsList, DriverStandingsList, DriversData, Envelope, RacesData,
    ResultRaceRecord, ScheduledRaceRecord, SeasonsData, StandingsData,
};

/// Data access layer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Deadline for one operation, every request it makes included
    #[serde(with = "humantime_serde")]
    pub fetch_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: api::FETCH_TIMEOUT,
        }
    }
}

/// Best-effort access to season statistics with static fallback
#[derive(Debug, Clone)]
pub struct StatsApi {
    source: Arc<dyn RemoteSource>,
    fallback: Arc<FallbackData>,
    config: ApiConfig,
}

impl StatsApi {
    /// Create with the built-in fallback dataset and default configuration
    pub fn new(source: Arc<dyn RemoteSource>) -> Self {
        Self::with_config(source, FallbackData::builtin(), ApiConfig::default())
    }

    /// Create with an explicit fallback dataset and configuration
    pub fn with_config(
        source: Arc<dyn RemoteSource>,
        fallback: FallbackData,
        config: ApiConfig,
    ) -> Self {
        Self {
            source,
            fallback: Arc::new(fallback),
            config,
        }
    }

    /// The fallback dataset this layer substitutes on failure
    pub fn fallback(&self) -> &FallbackData {
        &self.fallback
    }

    /// Seasons, most recent first
    ///
    /// Asks for at least `min_count` seasons (never fewer than the API's
    /// smallest useful page). The source pages seasons oldest first, so when
    /// more exist than fit the first page, the last page is fetched instead.
    pub async fn available_seasons(&self, min_count: usize) -> Vec<SeasonOption> {
        let limit = min_count.max(api::MIN_SEASONS_PAGE);
        self.or_fallback("seasons", self.try_available_seasons(limit), || {
            self.fallback.seasons.clone()
        })
        .await
    }

    async fn try_available_seasons(&self, limit: usize) -> ApiResult<Vec<SeasonOption>> {
        let first: SeasonsData = self.fetch(&format!("/seasons.json?limit={limit}")).await?;

        let page = match first.total()? {
            Some(total) if total > limit => {
                let offset = total - limit;
                debug!("Seasons span {} entries; fetching last page at offset {}", total, offset);
                self.fetch(&format!("/seasons.json?limit={limit}&offset={offset}"))
                    .await?
            }
            _ => first,
        };

        let seasons = page.into_options()?;
        if seasons.is_empty() {
            return Err(ApiError::EmptyPayload { what: "seasons" });
        }
        Ok(seasons)
    }

    /// Driver championship standings in source order
    pub async fn driver_standings(&self, season: &str) -> Vec<DriverStanding> {
        self.or_fallback(
            "driver standings",
            async {
                let data: StandingsData<DriverStandingsList> = self
                    .fetch(&format!("/{season}/driverStandings.json"))
                    .await?;
                match data.first_list() {
                    Some(list) => list.into_standings(),
                    None => Ok(Vec::new()),
                }
            },
            || self.fallback.driver_standings.clone(),
        )
        .await
    }

    /// Constructor championship standings in source order
    pub async fn constructor_standings(&self, season: &str) -> Vec<ConstructorStanding> {
        self.or_fallback(
            "constructor standings",
            async {
                let data: StandingsData<ConstructorStandingsList> = self
                    .fetch(&format!("/{season}/constructorStandings.json"))
                    .await?;
                match data.first_list() {
                    Some(list) => list.into_standings(),
                    None => Ok(Vec::new()),
                }
            },
            || self.fallback.constructor_standings.clone(),
        )
        .await
    }

    /// The season's race calendar, round ascending as supplied
    pub async fn race_schedule(&self, season: &str) -> Vec<RaceSummary> {
        self.or_fallback(
            "schedule",
            async {
                let data: RacesData<ScheduledRaceRecord> = self
                    .fetch(&format!("/{season}.json?limit={}", api::SCHEDULE_PAGE_LIMIT))
                    .await?;
                data.into_schedule()
            },
            || self.fallback.schedule.clone(),
        )
        .await
    }

    /// Drivers entered in the season
    pub async fn drivers(&self, season: &str) -> Vec<Driver> {
        self.or_fallback(
            "drivers",
            async {
                let data: DriversData = self
                    .fetch(&format!(
                        "/{season}/drivers.json?limit={}",
                        api::DRIVERS_PAGE_LIMIT
                    ))
                    .await?;
                data.into_drivers()
            },
            || self.fallback.drivers.clone(),
        )
        .await
    }

    /// A driver's results for the season, one per round with a recorded result
    pub async fn driver_results(&self, season: &str, driver_id: &str) -> Vec<DriverRaceResult> {
        self.or_fallback(
            "driver results",
            async {
                let data: RacesData<ResultRaceRecord> = self
                    .fetch(&format!(
                        "/{season}/drivers/{driver_id}/results.json?limit={}",
                        api::RESULTS_PAGE_LIMIT
                    ))
                    .await?;
                data.into_results()
            },
            || self.fallback.results_for(driver_id),
        )
        .await
    }

    /// Fetch and decode one endpoint
    async fn fetch<T>(&self, endpoint: &str) -> ApiResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let body = self.source.fetch(endpoint).await?;
        Envelope::<T>::decode(&body)
    }

    /// Run a remote attempt under the operation deadline, substituting
    /// fallback data on any error
    async fn or_fallback<T, F, D>(&self, what: &str, attempt: F, fallback: D) -> Vec<T>
    where
        F: Future<Output = ApiResult<Vec<T>>>,
        D: FnOnce() -> Vec<T>,
    {
        let timeout = self.config.fetch_timeout;
        let outcome = tokio::time::timeout(timeout, attempt)
            .await
            .unwrap_or(Err(ApiError::Timeout { timeout }));

        match outcome {
            Ok(items) => {
                debug!("Loaded {} {} entries from remote source", items.len(), what);
                items
            }
            Err(e) => {
                warn!("Remote {} fetch failed, using fallback data: {}", what, e);
                fallback()
            }
        }
    }
}
