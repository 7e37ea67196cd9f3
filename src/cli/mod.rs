//! Command-line interface components
//!
//! This module contains CLI-specific code for the F1 Dashboard application:
//! argument parsing and the command handlers that print each view.

pub mod args;
pub mod commands;

pub use args::{
    Cli, Commands, CompareArgs, ConfigArgs, GlobalArgs, SeasonArgs, SeasonsArgs, StandingsArgs,
};
pub use commands::{
    handle_compare, handle_config, handle_drivers, handle_overview, handle_schedule,
    handle_seasons, handle_standings, CommandContext,
};
