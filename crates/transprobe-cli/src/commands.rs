//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// transprobe: browser scenarios for Singlish-to-Sinhala transliteration sites
#[derive(Parser, Debug)]
#[command(name = "transprobe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Configuration file (defaults to ./transprobe.yaml when present)
    #[arg(long, global = true, env = "TRANSPROBE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run scenarios against the site in Chromium
    Run(RunArgs),

    /// List scenarios in the catalog
    List(ListArgs),

    /// Show the effective configuration
    Config(ConfigArgs),
}

/// Scenario selection shared by `run` and `list`
#[derive(clap::Args, Debug, Clone, Default)]
pub struct SelectArgs {
    /// Filter scenarios by id or title substring
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Only scenarios from this suite
    #[arg(short, long)]
    pub suite: Option<String>,

    /// Only positive or negative scenarios
    #[arg(short, long)]
    pub polarity: Option<PolarityArg>,

    /// Load scenarios from a YAML file instead of the built-in catalog
    #[arg(long)]
    pub catalog: Option<PathBuf>,
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Scenario selection
    #[command(flatten)]
    pub select: SelectArgs,

    /// URL of the page under test
    #[arg(long, env = "TRANSPROBE_URL")]
    pub url: Option<String>,

    /// Number of parallel scenarios (0 = auto)
    #[arg(short = 'j', long)]
    pub jobs: Option<usize>,

    /// Stop after the first failing scenario
    #[arg(long)]
    pub fail_fast: bool,

    /// Override every scenario's readiness timeout, in milliseconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Path to the Chromium binary
    #[arg(long, env = "CHROMIUM_PATH")]
    pub chromium_path: Option<String>,

    /// Disable the Chromium sandbox (containers, CI)
    #[arg(long)]
    pub no_sandbox: bool,

    /// Report format printed to stdout
    #[arg(long, default_value = "text")]
    pub format: FormatArg,

    /// Output directory for the JSON report
    #[arg(short, long, default_value = "target/transprobe")]
    pub output: PathBuf,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Scenario selection
    #[command(flatten)]
    pub select: SelectArgs,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: ListFormatArg,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Write a default transprobe.yaml to the current directory
    #[arg(long)]
    pub init: bool,
}

/// Color choice argument
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

/// Polarity argument
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PolarityArg {
    /// Scenarios expecting the ideal output
    Positive,
    /// Scenarios expecting the ideal output to be absent
    Negative,
}

impl From<PolarityArg> for transprobe::Polarity {
    fn from(arg: PolarityArg) -> Self {
        match arg {
            PolarityArg::Positive => Self::Positive,
            PolarityArg::Negative => Self::Negative,
        }
    }
}

/// Report format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FormatArg {
    /// Progress and summary only
    #[default]
    Text,
    /// JSON report
    Json,
    /// Test Anything Protocol
    Tap,
}

impl From<FormatArg> for transprobe::ReportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => Self::Text,
            FormatArg::Json => Self::Json,
            FormatArg::Tap => Self::Tap,
        }
    }
}

/// List format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ListFormatArg {
    /// One scenario per line
    #[default]
    Text,
    /// JSON array
    Json,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod cli_parsing_tests {
        use super::*;

        #[test]
        fn test_verify_cli() {
            use clap::CommandFactory;
            Cli::command().debug_assert();
        }

        #[test]
        fn test_run_defaults() {
            let cli = Cli::try_parse_from(["transprobe", "run"]).unwrap();
            match cli.command {
                Commands::Run(args) => {
                    assert!(args.select.filter.is_none());
                    assert!(args.jobs.is_none());
                    assert!(!args.fail_fast);
                    assert!(!args.headed);
                    assert_eq!(args.format, FormatArg::Text);
                    assert_eq!(args.output, PathBuf::from("target/transprobe"));
                }
                _ => panic!("expected run"),
            }
        }

        #[test]
        fn test_run_with_selection() {
            let cli = Cli::try_parse_from([
                "transprobe",
                "run",
                "--filter",
                "Pos_UI",
                "--suite",
                "extended",
                "--polarity",
                "positive",
                "-j",
                "4",
                "--fail-fast",
                "--timeout",
                "20000",
                "--format",
                "tap",
            ])
            .unwrap();
            match cli.command {
                Commands::Run(args) => {
                    assert_eq!(args.select.filter.as_deref(), Some("Pos_UI"));
                    assert_eq!(args.select.suite.as_deref(), Some("extended"));
                    assert_eq!(args.select.polarity, Some(PolarityArg::Positive));
                    assert_eq!(args.jobs, Some(4));
                    assert!(args.fail_fast);
                    assert_eq!(args.timeout, Some(20_000));
                    assert_eq!(args.format, FormatArg::Tap);
                }
                _ => panic!("expected run"),
            }
        }

        #[test]
        fn test_global_flags() {
            let cli = Cli::try_parse_from(["transprobe", "list", "-vv", "--color", "never"]).unwrap();
            assert_eq!(cli.verbose, 2);
            assert!(matches!(cli.color, ColorArg::Never));
        }

        #[test]
        fn test_list_json() {
            let cli = Cli::try_parse_from(["transprobe", "list", "--format", "json"]).unwrap();
            match cli.command {
                Commands::List(args) => assert_eq!(args.format, ListFormatArg::Json),
                _ => panic!("expected list"),
            }
        }

        #[test]
        fn test_missing_subcommand_fails() {
            assert!(Cli::try_parse_from(["transprobe"]).is_err());
        }

        #[test]
        fn test_invalid_polarity_fails() {
            assert!(Cli::try_parse_from(["transprobe", "list", "--polarity", "maybe"]).is_err());
        }
    }

    mod conversion_tests {
        use super::*;

        #[test]
        fn test_polarity_conversion() {
            assert_eq!(
                transprobe::Polarity::from(PolarityArg::Negative),
                transprobe::Polarity::Negative
            );
        }

        #[test]
        fn test_format_conversion() {
            assert_eq!(
                transprobe::ReportFormat::from(FormatArg::Json),
                transprobe::ReportFormat::Json
            );
        }

        #[test]
        fn test_color_conversion() {
            let c: crate::config::ColorChoice = ColorArg::Always.into();
            assert_eq!(c, crate::config::ColorChoice::Always);
        }
    }
}
