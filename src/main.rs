//! F1 Dashboard CLI application
//!
//! Command-line interface for browsing Formula 1 standings, race calendars
//! and driver comparisons, with a built-in snapshot when offline.

use std::process;

use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use f1_dashboard::cli::{
    handle_compare, handle_config, handle_drivers, handle_overview, handle_schedule,
    handle_seasons, handle_standings, Cli, CommandContext, Commands,
};
use f1_dashboard::config::AppConfig;
use f1_dashboard::constants::logging;
use f1_dashboard::errors::Result;

#[tokio::main]
async fn main() {
    let result = run().await;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Main application logic
async fn run() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();

    let cli = Cli::parse_args();

    let mut config = AppConfig::load(cli.global.config.clone()).await?;
    config.override_base_url(cli.global.base_url.clone());
    config.validate()?;

    init_logging(&cli, &config);

    info!("F1 Dashboard v{} starting", env!("CARGO_PKG_VERSION"));
    info!("Using statistics API at {}", config.client.base_url);

    let command = match cli.command {
        Commands::Config(args) => return handle_config(&config, args).await,
        command => command,
    };

    let ctx = CommandContext::from_config(&config, cli.global.offline, cli.global.quiet)?;

    match command {
        Commands::Seasons(args) => handle_seasons(&ctx, args).await,
        Commands::Standings(args) => handle_standings(&ctx, args).await,
        Commands::Schedule(args) => handle_schedule(&ctx, args).await,
        Commands::Drivers(args) => handle_drivers(&ctx, args).await,
        Commands::Compare(args) => handle_compare(&ctx, args).await,
        Commands::Overview(args) => handle_overview(&ctx, args).await,
        Commands::Config(args) => handle_config(&config, args).await,
    }
}

/// Initialize logging from the verbosity flags, else the configured level
fn init_logging(cli: &Cli, config: &AppConfig) {
    let level = cli
        .log_level()
        .map(|level| level.to_string().to_lowercase())
        .unwrap_or_else(|| config.logging.level.clone());

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("{}={}", logging::CRATE_TARGET, level).parse() {
        filter = filter.add_directive(directive);
    }

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(cli.global.very_verbose)
        .with_writer(std::io::stderr)
        .init();

    if cli.global.very_verbose {
        info!("Very verbose logging enabled");
    } else if cli.global.verbose {
        info!("Verbose logging enabled");
    }
}
