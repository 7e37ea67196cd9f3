//! Dashboard facade
//!
//! Owns one query cache per data access operation and hands out
//! subscriptions keyed by [`QueryKey`]. Every consumer (the CLI, tests, or
//! any future front end) goes through here, so identical requests share one
//! load and one cached result.

use chrono::Utc;
use tracing::{debug, info};

use crate::app::api::StatsApi;
use crate::app::comparison::{build_comparison, ComparisonRow, DriverSeries};
use crate::app::models::{
    ConstructorStanding, Driver, DriverRaceResult, DriverStanding, RaceSummary, SeasonOption,
};
use crate::app::query::{
    QueryCache, QueryConfig, QueryKey, QueryState, QueryStats, QuerySubscription, RefetchMode,
};
use crate::app::selection::SelectionState;
use crate::constants::api;
use crate::errors::{QueryError, QueryResult};

pub type Subscription<V> = QuerySubscription<QueryKey, Vec<V>>;

/// Query caches for every dashboard view
#[derive(Debug, Clone)]
pub struct Dashboard {
    api: StatsApi,
    season_count: usize,
    seasons: QueryCache<QueryKey, Vec<SeasonOption>>,
    driver_standings: QueryCache<QueryKey, Vec<DriverStanding>>,
    constructor_standings: QueryCache<QueryKey, Vec<ConstructorStanding>>,
    race_schedule: QueryCache<QueryKey, Vec<RaceSummary>>,
    drivers: QueryCache<QueryKey, Vec<Driver>>,
    driver_results: QueryCache<QueryKey, Vec<DriverRaceResult>>,
}

impl Dashboard {
    pub fn new(api: StatsApi, config: QueryConfig) -> Self {
        Self {
            api,
            season_count: api::DEFAULT_SEASON_COUNT,
            seasons: QueryCache::new(config.clone()),
            driver_standings: QueryCache::new(config.clone()),
            constructor_standings: QueryCache::new(config.clone()),
            race_schedule: QueryCache::new(config.clone()),
            drivers: QueryCache::new(config.clone()),
            driver_results: QueryCache::new(config),
        }
    }

    /// Set how many seasons the season list asks for
    pub fn with_season_count(mut self, season_count: usize) -> Self {
        self.season_count = season_count;
        self
    }

    pub fn api(&self) -> &StatsApi {
        &self.api
    }

    pub async fn seasons(&self) -> Subscription<SeasonOption> {
        let min_count = self.season_count;
        let api = self.api.clone();
        self.seasons
            .get(QueryKey::Seasons { min_count }, move || {
                let api = api.clone();
                async move { Ok(api.available_seasons(min_count).await) }
            })
            .await
    }

    pub async fn driver_standings(&self, season: &str) -> Subscription<DriverStanding> {
        let key = QueryKey::DriverStandings {
            season: season.to_string(),
        };
        let (api, season) = (self.api.clone(), season.to_string());
        self.driver_standings
            .get(key, move || {
                let (api, season) = (api.clone(), season.clone());
                async move { Ok(api.driver_standings(&season).await) }
            })
            .await
    }

    pub async fn constructor_standings(&self, season: &str) -> Subscription<ConstructorStanding> {
        let key = QueryKey::ConstructorStandings {
            season: season.to_string(),
        };
        let (api, season) = (self.api.clone(), season.to_string());
        self.constructor_standings
            .get(key, move || {
                let (api, season) = (api.clone(), season.clone());
                async move { Ok(api.constructor_standings(&season).await) }
            })
            .await
    }

    pub async fn race_schedule(&self, season: &str) -> Subscription<RaceSummary> {
        let key = QueryKey::RaceSchedule {
            season: season.to_string(),
        };
        let (api, season) = (self.api.clone(), season.to_string());
        self.race_schedule
            .get(key, move || {
                let (api, season) = (api.clone(), season.clone());
                async move { Ok(api.race_schedule(&season).await) }
            })
            .await
    }

    pub async fn drivers(&self, season: &str) -> Subscription<Driver> {
        let key = QueryKey::Drivers {
            season: season.to_string(),
        };
        let (api, season) = (self.api.clone(), season.to_string());
        self.drivers
            .get(key, move || {
                let (api, season) = (api.clone(), season.clone());
                async move { Ok(api.drivers(&season).await) }
            })
            .await
    }

    /// Results for one driver. Disabled until a driver is chosen.
    pub async fn driver_results(
        &self,
        season: &str,
        driver_id: Option<&str>,
    ) -> Subscription<DriverRaceResult> {
        let key = QueryKey::DriverResults {
            season: season.to_string(),
            driver_id: driver_id.map(str::to_string),
        };
        let api = self.api.clone();
        let season = season.to_string();
        let driver_id = driver_id.unwrap_or_default().to_string();
        self.driver_results
            .get(key, move || {
                let (api, season, driver_id) = (api.clone(), season.clone(), driver_id.clone());
                async move { Ok(api.driver_results(&season, &driver_id).await) }
            })
            .await
    }

    /// Merged cumulative points for two drivers
    ///
    /// Empty when either driver is unselected. Waits for the schedule and both
    /// drivers' results.
    ///
    /// # Errors
    ///
    /// Returns the first failure among the three underlying queries when it
    /// left no data to fall back on.
    pub async fn comparison(
        &self,
        season: &str,
        driver_a: Option<&str>,
        driver_b: Option<&str>,
    ) -> QueryResult<Vec<ComparisonRow>> {
        let (Some(driver_a), Some(driver_b)) = (
            driver_a.filter(|id| !id.trim().is_empty()),
            driver_b.filter(|id| !id.trim().is_empty()),
        ) else {
            debug!("Comparison needs two drivers");
            return Ok(Vec::new());
        };

        let mut schedule = self.race_schedule(season).await;
        let mut results_a = self.driver_results(season, Some(driver_a)).await;
        let mut results_b = self.driver_results(season, Some(driver_b)).await;

        let schedule = settled_data(&mut schedule).await?;
        let results_a = settled_data(&mut results_a).await?;
        let results_b = settled_data(&mut results_b).await?;

        Ok(build_comparison(
            &schedule,
            DriverSeries::new(driver_a, &results_a),
            DriverSeries::new(driver_b, &results_b),
        ))
    }

    /// Load seasons, schedule and drivers, then apply the selection defaults
    ///
    /// The season list failing outright leaves the current season in place.
    pub async fn resolve_selection(&self, selection: &mut SelectionState) {
        let mut seasons = self.seasons().await;
        if let Some(options) = seasons.settled().await.data {
            selection.apply_seasons(&options);
        }

        let season = selection.season().to_string();
        let mut schedule = self.race_schedule(&season).await;
        let mut drivers = self.drivers(&season).await;

        if let Some(races) = schedule.settled().await.data {
            selection.apply_schedule(&races, Utc::now());
        }
        if let Some(list) = drivers.settled().await.data {
            selection.apply_drivers(&list);
        }
        info!(
            "Selected season {} round {:?} drivers {:?} vs {:?}",
            selection.season(),
            selection.round(),
            selection.driver_a(),
            selection.driver_b()
        );
    }

    /// Re-run one query without touching unrelated ones
    ///
    /// # Errors
    ///
    /// Returns `QueryError::NotFound` if the key was never requested and
    /// `QueryError::Disabled` if it lacks parameters.
    pub async fn refetch(&self, key: &QueryKey) -> QueryResult<()> {
        let mode = RefetchMode::Dedupe;
        match key {
            QueryKey::Seasons { .. } => self.seasons.refetch(key, mode).await,
            QueryKey::DriverStandings { .. } => self.driver_standings.refetch(key, mode).await,
            QueryKey::ConstructorStandings { .. } => {
                self.constructor_standings.refetch(key, mode).await
            }
            QueryKey::RaceSchedule { .. } => self.race_schedule.refetch(key, mode).await,
            QueryKey::Drivers { .. } => self.drivers.refetch(key, mode).await,
            QueryKey::DriverResults { .. } => self.driver_results.refetch(key, mode).await,
        }
    }

    /// Evict idle entries from every cache
    pub async fn collect_garbage(&self) -> usize {
        self.seasons.collect_garbage().await
            + self.driver_standings.collect_garbage().await
            + self.constructor_standings.collect_garbage().await
            + self.race_schedule.collect_garbage().await
            + self.drivers.collect_garbage().await
            + self.driver_results.collect_garbage().await
    }

    /// Per-operation cache statistics
    pub async fn stats(&self) -> Vec<(&'static str, QueryStats)> {
        vec![
            ("seasons", self.seasons.stats().await),
            ("driver-standings", self.driver_standings.stats().await),
            ("constructor-standings", self.constructor_standings.stats().await),
            ("race-schedule", self.race_schedule.stats().await),
            ("drivers", self.drivers.stats().await),
            ("driver-results", self.driver_results.stats().await),
        ]
    }
}

/// Wait for a subscription to settle and take its data
///
/// A failed load that still has earlier data yields that data.
pub async fn settled_data<V: Send + Sync + 'static>(
    subscription: &mut QuerySubscription<QueryKey, V>,
) -> QueryResult<std::sync::Arc<V>> {
    let state: QueryState<V> = subscription.settled().await;
    match (state.data, state.error) {
        (Some(data), _) => Ok(data),
        (None, Some(message)) => Err(QueryError::LoaderFailed { message }),
        (None, None) => Err(QueryError::Disabled {
            key: subscription.key().to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::app::client::{OfflineSource, StaticSource};

    fn offline_dashboard() -> Dashboard {
        Dashboard::new(StatsApi::new(Arc::new(OfflineSource)), QueryConfig::default())
    }

    #[tokio::test]
    async fn test_offline_dashboard_serves_fallback() {
        let dashboard = offline_dashboard();
        let mut standings = dashboard.driver_standings("2024").await;
        let data = settled_data(&mut standings).await.unwrap();
        assert_eq!(data.len(), dashboard.api().fallback().driver_standings.len());
    }

    #[tokio::test]
    async fn test_repeat_requests_share_one_load() {
        let source = Arc::new(StaticSource::new());
        let dashboard = Dashboard::new(StatsApi::new(source.clone()), QueryConfig::default());

        let mut first = dashboard.drivers("2024").await;
        let mut second = dashboard.drivers("2024").await;
        first.settled().await;
        second.settled().await;

        assert_eq!(source.request_count(), 1);
        let stats = dashboard.stats().await;
        let (_, drivers) = stats.iter().find(|(name, _)| *name == "drivers").unwrap();
        assert_eq!(drivers.loader_invocations, 1);
        assert_eq!(drivers.resolved, 1);
    }

    #[tokio::test]
    async fn test_comparison_requires_two_drivers() {
        let dashboard = offline_dashboard();
        let rows = dashboard.comparison("2024", Some("max_verstappen"), None).await;
        assert_eq!(rows, Ok(Vec::new()));
    }

    #[tokio::test]
    async fn test_comparison_from_fallback() {
        let dashboard = offline_dashboard();
        let rows = dashboard
            .comparison("2024", Some("max_verstappen"), Some("lando_norris"))
            .await
            .unwrap();
        let schedule = &dashboard.api().fallback().schedule;
        assert_eq!(rows.len(), schedule.len());
        assert!(rows.iter().any(|row| row.a.is_some()));
    }

    #[tokio::test]
    async fn test_disabled_driver_results() {
        let dashboard = offline_dashboard();
        let mut results = dashboard.driver_results("2024", None).await;
        assert!(!results.is_enabled());
        assert!(matches!(
            settled_data(&mut results).await,
            Err(QueryError::Disabled { .. })
        ));
    }

    #[tokio::test]
    async fn test_refetch_unrequested_key() {
        let dashboard = offline_dashboard();
        let key = QueryKey::RaceSchedule {
            season: "2024".to_string(),
        };
        assert!(matches!(
            dashboard.refetch(&key).await,
            Err(QueryError::NotFound { .. })
        ));

        let mut schedule = dashboard.race_schedule("2024").await;
        schedule.settled().await;
        assert_eq!(dashboard.refetch(&key).await, Ok(()));
    }

    #[tokio::test]
    async fn test_resolve_selection_offline() {
        let dashboard = offline_dashboard();
        let mut selection = SelectionState::with_season("1950");
        dashboard.resolve_selection(&mut selection).await;

        let fallback = dashboard.api().fallback();
        assert_eq!(selection.season(), fallback.seasons[0].value);
        assert!(selection.round().is_some());
        assert_eq!(selection.driver_a(), Some(fallback.drivers[0].driver_id.as_str()));
        assert_eq!(selection.driver_b(), Some(fallback.drivers[1].driver_id.as_str()));
    }
}
