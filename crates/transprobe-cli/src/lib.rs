//! transprobe CLI library
//!
//! Command-line front end for the transprobe scenario runner: selects
//! scenarios from the catalog, drives Chromium through them and reports
//! the outcome.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
pub mod logging;
mod output;
mod runner;

pub use commands::{
    Cli, ColorArg, Commands, ConfigArgs, FormatArg, ListArgs, ListFormatArg, PolarityArg,
    RunArgs, SelectArgs,
};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use logging::init_tracing;
pub use output::{outcome_line, scenario_line, summary_line, ProgressReporter};
pub use runner::{
    execute, finish_report, list_scenarios, load_catalog, probe_config, run_scenarios,
    scenario_filter, scenario_json, select_scenarios, show_config, REPORT_FILE,
};
