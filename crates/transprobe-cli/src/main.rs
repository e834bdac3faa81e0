//! transprobe: browser scenarios for Singlish-to-Sinhala transliteration
//!
//! ## Usage
//!
//! ```bash
//! transprobe list --suite baseline          # Show scenarios
//! transprobe run                            # Run every scenario headless
//! transprobe run --filter Pos_UI --headed   # Watch the Clear scenarios
//! transprobe run --format tap -j 4          # TAP output, four pages at once
//! transprobe config --init                  # Write transprobe.yaml
//! ```

use clap::Parser;
use std::process::ExitCode;
use transprobe_cli::{
    init_tracing, list_scenarios, run_scenarios, show_config, Cli, CliConfig, CliResult,
    ColorChoice, Commands, Verbosity,
};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();

    // Build configuration from CLI args
    let config = build_config(&cli);
    init_tracing(&config);

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Run(ref args) => run_scenarios(&config, config_path, args),
        Commands::List(ref args) => list_scenarios(&config, args),
        Commands::Config(ref args) => show_config(config_path, args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let verbosity = Verbosity::from_flags(cli.verbose, cli.quiet);
    let color: ColorChoice = cli.color.clone().into();

    CliConfig::new()
        .with_verbosity(verbosity)
        .with_color(color)
        .with_log_json(cli.log_json)
}
