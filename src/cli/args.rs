//! Command-line argument parsing for F1 Dashboard
//!
//! This module defines the CLI structure using clap derive macros: one
//! subcommand per dashboard view plus configuration management.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::constants::api;

/// F1 Dashboard - Formula 1 season statistics in the terminal
#[derive(Parser, Debug)]
#[command(
    name = "f1_dashboard",
    version,
    about = "Browse Formula 1 standings, calendars and driver comparisons",
    long_about = "Fetches public Formula 1 statistics, caches them for the session, and prints
standings, race calendars and head-to-head driver comparisons. When the statistics API
is unreachable, a built-in snapshot is shown instead."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all subcommands
#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long, global = true)]
    pub very_verbose: bool,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Statistics API root, overriding config and environment
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Skip the network and use the built-in snapshot
    #[arg(long, global = true)]
    pub offline: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List available seasons, most recent first
    Seasons(SeasonsArgs),

    /// Driver or constructor championship standings
    Standings(StandingsArgs),

    /// Race calendar with the next race highlighted
    Schedule(SeasonArgs),

    /// Drivers entered in a season
    Drivers(SeasonArgs),

    /// Cumulative points of two drivers, race by race
    Compare(CompareArgs),

    /// Season summary: next race, leaders and the default comparison
    Overview(SeasonArgs),

    /// Show or create the configuration file
    Config(ConfigArgs),
}

/// Season selection shared by most commands
#[derive(Args, Debug, Clone, Default)]
pub struct SeasonArgs {
    /// Season year (defaults to the most recent available season)
    #[arg(short, long, value_name = "YEAR")]
    pub season: Option<String>,
}

/// Arguments for the seasons command
#[derive(Args, Debug, Clone)]
pub struct SeasonsArgs {
    /// Minimum number of seasons to request
    #[arg(short, long, default_value_t = api::DEFAULT_SEASON_COUNT)]
    pub limit: usize,
}

/// Arguments for the standings command
#[derive(Args, Debug, Clone, Default)]
pub struct StandingsArgs {
    #[command(flatten)]
    pub season: SeasonArgs,

    /// Show constructor standings instead of driver standings
    #[arg(short, long)]
    pub constructors: bool,
}

/// Arguments for the compare command
#[derive(Args, Debug, Clone, Default)]
pub struct CompareArgs {
    #[command(flatten)]
    pub season: SeasonArgs,

    /// First driver id (defaults to the first listed driver)
    #[arg(short = 'a', long, value_name = "DRIVER_ID")]
    pub driver_a: Option<String>,

    /// Second driver id (defaults to the second listed driver)
    #[arg(short = 'b', long, value_name = "DRIVER_ID")]
    pub driver_b: Option<String>,
}

/// Arguments for config management
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Write the default config file to the user config directory
    #[arg(long)]
    pub init: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Log level selected by verbosity flags, if any
    pub fn log_level(&self) -> Option<tracing::Level> {
        if self.global.quiet {
            Some(tracing::Level::ERROR)
        } else if self.global.very_verbose {
            Some(tracing::Level::DEBUG)
        } else if self.global.verbose {
            Some(tracing::Level::INFO)
        } else {
            None
        }
    }
}

impl CompareArgs {
    /// Reject comparing a driver with themselves
    pub fn validate(&self) -> Result<(), String> {
        match (&self.driver_a, &self.driver_b) {
            (Some(a), Some(b)) if a == b => {
                Err(format!("Cannot compare driver '{}' with themselves", a))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli_with(global: GlobalArgs) -> Cli {
        Cli {
            global,
            command: Commands::Seasons(SeasonsArgs { limit: 10 }),
        }
    }

    #[test]
    fn test_log_level() {
        let quiet = cli_with(GlobalArgs {
            quiet: true,
            verbose: true,
            ..Default::default()
        });
        let verbose = cli_with(GlobalArgs {
            verbose: true,
            ..Default::default()
        });
        let very_verbose = cli_with(GlobalArgs {
            very_verbose: true,
            ..Default::default()
        });

        assert_eq!(quiet.log_level(), Some(tracing::Level::ERROR));
        assert_eq!(verbose.log_level(), Some(tracing::Level::INFO));
        assert_eq!(very_verbose.log_level(), Some(tracing::Level::DEBUG));
        assert_eq!(cli_with(GlobalArgs::default()).log_level(), None);
    }

    #[test]
    fn test_parse_compare() {
        let cli = Cli::try_parse_from([
            "f1_dashboard",
            "--offline",
            "compare",
            "--season",
            "2024",
            "-a",
            "max_verstappen",
            "-b",
            "lando_norris",
        ])
        .unwrap();

        assert!(cli.global.offline);
        match cli.command {
            Commands::Compare(args) => {
                assert_eq!(args.season.season.as_deref(), Some("2024"));
                assert_eq!(args.driver_a.as_deref(), Some("max_verstappen"));
                assert_eq!(args.driver_b.as_deref(), Some("lando_norris"));
                assert!(args.validate().is_ok());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_standings_defaults() {
        let cli = Cli::try_parse_from(["f1_dashboard", "standings", "-v"]).unwrap();
        assert!(cli.global.verbose);
        match cli.command {
            Commands::Standings(args) => {
                assert!(args.season.season.is_none());
                assert!(!args.constructors);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_seasons_default_limit() {
        let cli = Cli::try_parse_from(["f1_dashboard", "seasons"]).unwrap();
        match cli.command {
            Commands::Seasons(args) => assert_eq!(args.limit, api::DEFAULT_SEASON_COUNT),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_compare_same_driver_rejected() {
        let args = CompareArgs {
            driver_a: Some("max_verstappen".to_string()),
            driver_b: Some("max_verstappen".to_string()),
            ..Default::default()
        };
        assert!(args.validate().is_err());
    }
}
