//! Tracing setup
//!
//! Logs go to stderr so stdout carries only reports. `RUST_LOG` wins over
//! the `-v`/`-q` flags when set. At debug verbosity each event carries its
//! target and source location.

use crate::config::CliConfig;
use tracing_subscriber::EnvFilter;

/// Filter from `RUST_LOG`, falling back to the verbosity directive
#[must_use]
pub fn env_filter(config: &CliConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.verbosity.log_directive()))
}

/// Install the global subscriber. Returns false if one was already set.
pub fn init_tracing(config: &CliConfig) -> bool {
    let debug = config.verbosity.is_debug();
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_target(debug)
        .with_file(debug)
        .with_line_number(debug)
        .with_writer(std::io::stderr);

    let installed = if config.log_json {
        builder.json().try_init()
    } else {
        builder.with_ansi(config.color.should_color()).try_init()
    };
    installed.is_ok()
}
