//! Command handlers for F1 Dashboard CLI
//!
//! Each handler resolves the selection it needs through the dashboard, waits
//! for the relevant queries to settle and prints a plain-text view.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::app::api::{FallbackData, StatsApi};
use crate::app::calendar::{annotate_calendar, format_race_date, format_race_time, RaceStatus};
use crate::app::client::{ErgastClient, OfflineSource, RemoteSource};
use crate::app::comparison::{ComparisonRow, SeriesPoint};
use crate::app::dashboard::{settled_data, Dashboard};
use crate::app::models::format_points;
use crate::app::query::{QueryKey, QuerySubscription, RefetchMode};
use crate::app::selection::SelectionState;
use crate::cli::{CompareArgs, ConfigArgs, SeasonArgs, SeasonsArgs, StandingsArgs};
use crate::config::AppConfig;
use crate::errors::{AppError, Result};

/// Shared state for one CLI invocation
#[derive(Debug, Clone)]
pub struct CommandContext {
    dashboard: Dashboard,
    show_spinner: bool,
}

impl CommandContext {
    /// Build the dashboard from configuration
    ///
    /// `offline` swaps the HTTP client for a source that always fails, so
    /// every view is served from the built-in snapshot.
    pub fn from_config(config: &AppConfig, offline: bool, quiet: bool) -> Result<Self> {
        let (client_config, api_config, query_config) = config.to_runtime_config();

        let source: Arc<dyn RemoteSource> = if offline {
            info!("Offline mode: using built-in data");
            Arc::new(OfflineSource)
        } else {
            Arc::new(ErgastClient::with_config(client_config)?)
        };

        let api = StatsApi::with_config(source, FallbackData::builtin(), api_config);
        Ok(Self {
            dashboard: Dashboard::new(api, query_config),
            show_spinner: !quiet && atty::is(atty::Stream::Stdout),
        })
    }

    /// Wrap an existing dashboard, without spinners
    pub fn new(dashboard: Dashboard) -> Self {
        Self {
            dashboard,
            show_spinner: false,
        }
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    fn spinner(&self, message: &str) -> Option<ProgressBar> {
        if !self.show_spinner {
            return None;
        }
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            spinner.set_style(style.tick_strings(&["◐", "◓", "◑", "◒"]));
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(120));
        Some(spinner)
    }

    /// Wait for a query, retrying it once if it fails
    async fn load<V: Send + Sync + 'static>(
        &self,
        subscription: &mut QuerySubscription<QueryKey, V>,
        message: &str,
    ) -> Result<Arc<V>> {
        let spinner = self.spinner(message);
        let mut result = settled_data(subscription).await;

        if let Err(e) = &result {
            if subscription.is_enabled() {
                warn!("{} failed ({}), retrying", subscription.key(), e);
                subscription.refetch(RefetchMode::Dedupe).await?;
                result = settled_data(subscription).await;
            }
        }

        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }
        result.map_err(|e| {
            AppError::generic(format!(
                "{} ({}). Run the command again to retry",
                e,
                subscription.key()
            ))
        })
    }

    /// Explicit season, else the most recent available one
    async fn resolve_season(&self, args: &SeasonArgs) -> Result<String> {
        if let Some(season) = args.season.as_deref().filter(|s| !s.trim().is_empty()) {
            return Ok(season.trim().to_string());
        }

        let mut selection = SelectionState::new(Utc::now().date_naive());
        let mut seasons = self.dashboard.seasons().await;
        match self.load(&mut seasons, "Loading seasons...").await {
            Ok(options) => {
                selection.apply_seasons(&options);
            }
            Err(e) => warn!("Season list unavailable, using {}: {}", selection.season(), e),
        }
        debug!("Resolved season {}", selection.season());
        Ok(selection.season().to_string())
    }
}

/// Handle the seasons command
pub async fn handle_seasons(ctx: &CommandContext, args: SeasonsArgs) -> Result<()> {
    let dashboard = ctx.dashboard.clone().with_season_count(args.limit);
    let mut seasons = dashboard.seasons().await;
    let seasons = ctx.load(&mut seasons, "Loading seasons...").await?;

    if seasons.is_empty() {
        println!("No seasons available.");
        return Ok(());
    }

    println!("Available seasons ({}):", seasons.len());
    for chunk in seasons.chunks(10) {
        let labels: Vec<&str> = chunk.iter().map(|s| s.label.as_str()).collect();
        println!("  {}", labels.join("  "));
    }
    Ok(())
}

/// Handle the standings command
pub async fn handle_standings(ctx: &CommandContext, args: StandingsArgs) -> Result<()> {
    let season = ctx.resolve_season(&args.season).await?;

    if args.constructors {
        let mut standings = ctx.dashboard.constructor_standings(&season).await;
        let standings = ctx.load(&mut standings, "Loading constructor standings...").await?;

        if standings.is_empty() {
            println!("No constructor standings available for {}.", season);
            return Ok(());
        }

        println!("{} Constructor Championship", season);
        println!("{:>4}  {:<32} {:>7} {:>5}", "Pos", "Constructor", "Points", "Wins");
        for standing in standings.iter() {
            println!(
                "{:>4}  {:<32} {:>7} {:>5}",
                standing.position,
                standing.constructor.name,
                format_points(standing.points),
                standing.wins
            );
        }
        return Ok(());
    }

    let mut standings = ctx.dashboard.driver_standings(&season).await;
    let standings = ctx.load(&mut standings, "Loading driver standings...").await?;

    if standings.is_empty() {
        println!("No driver standings available for {}.", season);
        return Ok(());
    }

    println!("{} Driver Championship", season);
    println!(
        "{:>4}  {:<24} {:<28} {:>7} {:>5}",
        "Pos", "Driver", "Team", "Points", "Wins"
    );
    for standing in standings.iter() {
        let teams: Vec<&str> = standing
            .constructors
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        println!(
            "{:>4}  {:<24} {:<28} {:>7} {:>5}",
            standing.position,
            standing.driver.full_name(),
            teams.join(" / "),
            format_points(standing.points),
            standing.wins
        );
    }
    Ok(())
}

/// Handle the schedule command
pub async fn handle_schedule(ctx: &CommandContext, args: SeasonArgs) -> Result<()> {
    let season = ctx.resolve_season(&args).await?;
    let mut schedule = ctx.dashboard.race_schedule(&season).await;
    let schedule = ctx.load(&mut schedule, "Loading race calendar...").await?;

    if schedule.is_empty() {
        println!("No races scheduled for {}.", season);
        return Ok(());
    }

    println!("{} Race Calendar", season);
    for entry in annotate_calendar(&schedule, Utc::now()) {
        let race = entry.race;
        let marker = if entry.status == RaceStatus::Next { ">" } else { " " };
        println!(
            "{} R{:<2} {:<17} {:<12} {:<28} {}, {}  [{}]",
            marker,
            race.round,
            format_race_date(race.date),
            format_race_time(race.time),
            race.race_name,
            race.locality,
            race.country,
            entry.status
        );
    }
    Ok(())
}

/// Handle the drivers command
pub async fn handle_drivers(ctx: &CommandContext, args: SeasonArgs) -> Result<()> {
    let season = ctx.resolve_season(&args).await?;
    let mut drivers = ctx.dashboard.drivers(&season).await;
    let drivers = ctx.load(&mut drivers, "Loading drivers...").await?;

    if drivers.is_empty() {
        println!("No drivers listed for {}.", season);
        return Ok(());
    }

    println!("{} Drivers ({})", season, drivers.len());
    for driver in drivers.iter() {
        println!(
            "  {:<4} {:<24} {:<16} {}",
            driver.short_tag(),
            driver.full_name(),
            driver.nationality,
            driver.driver_id
        );
    }
    Ok(())
}

/// Handle the compare command
pub async fn handle_compare(ctx: &CommandContext, args: CompareArgs) -> Result<()> {
    args.validate().map_err(AppError::generic)?;

    let season = ctx.resolve_season(&args.season).await?;
    let mut selection = SelectionState::with_season(season.clone());
    selection.select_drivers(
        args.driver_a.clone().unwrap_or_default(),
        args.driver_b.clone().unwrap_or_default(),
    );

    let mut drivers = ctx.dashboard.drivers(&season).await;
    let drivers = ctx.load(&mut drivers, "Loading drivers...").await?;
    selection.apply_drivers(&drivers);

    for (requested, chosen) in [
        (args.driver_a.as_deref(), selection.driver_a()),
        (args.driver_b.as_deref(), selection.driver_b()),
    ] {
        if let Some(requested) = requested {
            if Some(requested) != chosen {
                warn!("Driver '{}' not entered in {}", requested, season);
                println!(
                    "Driver '{}' not found in {}, using '{}' instead.",
                    requested,
                    season,
                    chosen.unwrap_or("-")
                );
            }
        }
    }

    let spinner = ctx.spinner("Loading results...");
    let rows = ctx
        .dashboard
        .comparison(&season, selection.driver_a(), selection.driver_b())
        .await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let rows = rows?;

    let name_of = |id: Option<&str>| {
        id.and_then(|id| drivers.iter().find(|d| d.driver_id == id))
            .map(|d| d.full_name())
            .unwrap_or_else(|| "-".to_string())
    };
    let (name_a, name_b) = (name_of(selection.driver_a()), name_of(selection.driver_b()));

    if rows.is_empty() {
        println!("No races to compare for {}.", season);
        return Ok(());
    }

    println!("{} Head to Head: {} vs {}", season, name_a, name_b);
    print_comparison(&rows, &name_a, &name_b);
    Ok(())
}

fn series_cell(point: Option<&SeriesPoint>) -> String {
    match point {
        Some(point) => format!("{:>6} ({})", format_points(point.cumulative), point.annotation),
        None => "-".to_string(),
    }
}

fn final_total<'a>(points: impl Iterator<Item = &'a SeriesPoint>) -> String {
    points
        .last()
        .map(|point| format_points(point.cumulative))
        .unwrap_or_else(|| "0".to_string())
}

fn print_comparison(rows: &[ComparisonRow], name_a: &str, name_b: &str) {
    println!(
        "{:>4}  {:<28} {:<26} {:<26}",
        "Rnd", "Race", name_a, name_b
    );
    for row in rows {
        println!(
            "{:>4}  {:<28} {:<26} {:<26}",
            row.round,
            row.race_name,
            series_cell(row.a.as_ref()),
            series_cell(row.b.as_ref())
        );
    }
}

/// Handle the overview command
pub async fn handle_overview(ctx: &CommandContext, args: SeasonArgs) -> Result<()> {
    let mut selection = match args.season.as_deref() {
        Some(season) => SelectionState::with_season(season),
        None => SelectionState::new(Utc::now().date_naive()),
    };

    let spinner = ctx.spinner("Loading season overview...");
    ctx.dashboard.resolve_selection(&mut selection).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let season = selection.season().to_string();

    println!("Formula 1 {} Overview", season);
    println!();

    let mut schedule = ctx.dashboard.race_schedule(&season).await;
    let schedule = ctx.load(&mut schedule, "Loading race calendar...").await?;
    match selection.active_race(&schedule) {
        Some(race) => println!(
            "Featured race: Round {} - {} ({}, {}) on {} at {}",
            race.round,
            race.race_name,
            race.circuit_name,
            race.country,
            format_race_date(race.date),
            format_race_time(race.time)
        ),
        None => println!("Featured race: none scheduled"),
    }
    println!();

    let mut drivers = ctx.dashboard.driver_standings(&season).await;
    let mut constructors = ctx.dashboard.constructor_standings(&season).await;
    let drivers = ctx.load(&mut drivers, "Loading driver standings...").await?;
    let constructors = ctx
        .load(&mut constructors, "Loading constructor standings...")
        .await?;

    println!("Driver leaders:");
    if drivers.is_empty() {
        println!("  No standings yet");
    }
    for standing in drivers.iter().take(3) {
        println!(
            "  P{} {} - {} pts",
            standing.position,
            standing.driver.full_name(),
            format_points(standing.points)
        );
    }

    println!("Constructor leaders:");
    if constructors.is_empty() {
        println!("  No standings yet");
    }
    for standing in constructors.iter().take(3) {
        println!(
            "  P{} {} - {} pts",
            standing.position,
            standing.constructor.name,
            format_points(standing.points)
        );
    }
    println!();

    let rows = ctx
        .dashboard
        .comparison(&season, selection.driver_a(), selection.driver_b())
        .await?;
    if let (Some(a), Some(b)) = (selection.driver_a(), selection.driver_b()) {
        println!(
            "Head to head: {} {} pts vs {} {} pts",
            a,
            final_total(rows.iter().filter_map(|row| row.a.as_ref())),
            b,
            final_total(rows.iter().filter_map(|row| row.b.as_ref()))
        );
    }

    for (operation, stats) in ctx.dashboard.stats().await {
        debug!(
            "Cache {}: {} entries, {} loads, {} discarded",
            operation, stats.entries, stats.loader_invocations, stats.discarded_responses
        );
    }
    Ok(())
}

/// Handle the config command
pub async fn handle_config(config: &AppConfig, args: ConfigArgs) -> Result<()> {
    if args.init {
        let path = AppConfig::initialize_default_file().await?;
        println!("Configuration file: {}", path.display());
        return Ok(());
    }

    let rendered = toml::to_string_pretty(config)
        .map_err(|e| AppError::generic(format!("Failed to render configuration: {}", e)))?;
    print!("{}", rendered);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::query::QueryConfig;

    fn offline_context() -> CommandContext {
        let api = StatsApi::new(Arc::new(OfflineSource));
        CommandContext::new(Dashboard::new(api, QueryConfig::default()))
    }

    #[tokio::test]
    async fn test_from_config_offline_serves_fallback() {
        let ctx = CommandContext::from_config(&AppConfig::default(), true, true).unwrap();
        assert!(!ctx.show_spinner);

        let mut seasons = ctx.dashboard().seasons().await;
        let data = settled_data(&mut seasons).await.unwrap();
        assert_eq!(*data, FallbackData::builtin().seasons);
    }

    #[tokio::test]
    async fn test_resolve_season_prefers_argument() {
        let ctx = offline_context();
        let args = SeasonArgs {
            season: Some(" 2021 ".to_string()),
        };
        assert_eq!(ctx.resolve_season(&args).await.unwrap(), "2021");
    }

    #[tokio::test]
    async fn test_resolve_season_uses_latest_available() {
        let ctx = offline_context();
        let season = ctx.resolve_season(&SeasonArgs::default()).await.unwrap();
        assert_eq!(season, ctx.dashboard().api().fallback().seasons[0].value);
    }

    #[tokio::test]
    async fn test_offline_handlers_succeed() {
        let ctx = offline_context();
        let season = SeasonArgs {
            season: Some("2024".to_string()),
        };

        assert!(handle_seasons(&ctx, SeasonsArgs { limit: 5 }).await.is_ok());
        assert!(handle_standings(
            &ctx,
            StandingsArgs {
                season: season.clone(),
                constructors: true,
            }
        )
        .await
        .is_ok());
        assert!(handle_schedule(&ctx, season.clone()).await.is_ok());
        assert!(handle_drivers(&ctx, season.clone()).await.is_ok());
        assert!(handle_overview(&ctx, season).await.is_ok());
    }

    #[tokio::test]
    async fn test_compare_with_unknown_driver_falls_back() {
        let ctx = offline_context();
        let args = CompareArgs {
            season: SeasonArgs {
                season: Some("2024".to_string()),
            },
            driver_a: Some("nobody".to_string()),
            driver_b: None,
        };
        assert!(handle_compare(&ctx, args).await.is_ok());
    }

    #[test]
    fn test_series_cell() {
        assert_eq!(series_cell(None), "-");
        let point = SeriesPoint {
            driver_id: "max_verstappen".to_string(),
            cumulative: 43.0,
            points: 18.0,
            position: 2,
            annotation: "18 pts • P2".to_string(),
        };
        assert_eq!(series_cell(Some(&point)), "    43 (18 pts • P2)");
    }
}
