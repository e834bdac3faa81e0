//! Command execution

use crate::commands::{ConfigArgs, ListArgs, ListFormatArg, RunArgs, SelectArgs};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::{detail_line, scenario_line, ProgressReporter};
use std::path::{Path, PathBuf};
use std::time::Duration;
use transprobe::{
    Catalog, PageFactory, ProbeConfig, ReportFormat, Scenario, ScenarioFilter, ScenarioRunner,
    SuiteReport, DEFAULT_CONFIG_FILE,
};

/// File name of the JSON report inside the output directory
pub const REPORT_FILE: &str = "report.json";

fn current_dir() -> CliResult<PathBuf> {
    Ok(std::env::current_dir()?)
}

/// Load the probe configuration and apply `run` overrides
pub fn probe_config(config_path: Option<&Path>, args: &RunArgs) -> CliResult<ProbeConfig> {
    let mut config = ProbeConfig::load_or_default(config_path, &current_dir()?)?;

    if let Some(ref url) = args.url {
        config.base_url.clone_from(url);
    }
    if let Some(jobs) = args.jobs {
        config.jobs = jobs;
    }
    if args.fail_fast {
        config.fail_fast = true;
    }
    if args.timeout.is_some() {
        config.timeout_override_ms = args.timeout;
    }
    if args.headed {
        config.browser.headless = false;
    }
    if let Some(ref path) = args.chromium_path {
        config.browser.chromium_path = Some(path.clone());
    }
    if args.no_sandbox {
        config.browser.sandbox = false;
    }

    config.validate()?;
    Ok(config)
}

/// Built-in catalog, or the file given with `--catalog`
pub fn load_catalog(select: &SelectArgs) -> CliResult<Catalog> {
    let catalog = match select.catalog {
        Some(ref path) => Catalog::from_path(path)?,
        None => Catalog::builtin()?,
    };
    if let Some(ref suite) = select.suite {
        if !catalog.suite_names().contains(&suite.as_str()) {
            return Err(CliError::invalid_argument(format!(
                "unknown suite {suite:?}, expected one of: {}",
                catalog.suite_names().join(", ")
            )));
        }
    }
    Ok(catalog)
}

/// Translate selection flags into a filter
#[must_use]
pub fn scenario_filter(select: &SelectArgs) -> ScenarioFilter {
    let mut filter = ScenarioFilter::new();
    if let Some(ref pattern) = select.filter {
        filter = filter.with_pattern(pattern.clone());
    }
    if let Some(ref suite) = select.suite {
        filter = filter.with_suite(suite.clone());
    }
    if let Some(polarity) = select.polarity {
        filter = filter.with_polarity(polarity.into());
    }
    filter
}

/// Scenarios chosen by the selection flags
pub fn select_scenarios(select: &SelectArgs) -> CliResult<Vec<Scenario>> {
    let catalog = load_catalog(select)?;
    Ok(catalog.filter(&scenario_filter(select)))
}

/// JSON view of a catalog entry
#[must_use]
pub fn scenario_json(scenario: &Scenario) -> serde_json::Value {
    serde_json::json!({
        "id": scenario.qualified_id(),
        "suite": scenario.suite,
        "title": scenario.title,
        "polarity": scenario.polarity(),
        "flow": scenario.flow,
        "input": scenario.input.text(),
        "expectation": scenario.expectation,
        "readiness": scenario.readiness.description(),
        "timeout_ms": scenario.timeout.as_millis() as u64,
    })
}

/// Execute `transprobe list`
pub fn list_scenarios(config: &CliConfig, args: &ListArgs) -> CliResult<()> {
    let scenarios = select_scenarios(&args.select)?;

    match args.format {
        ListFormatArg::Json => {
            let entries: Vec<_> = scenarios.iter().map(scenario_json).collect();
            let json = serde_json::to_string_pretty(&entries)
                .map_err(|e| CliError::report_generation(e.to_string()))?;
            println!("{json}");
        }
        ListFormatArg::Text => {
            for scenario in &scenarios {
                println!("{}", scenario_line(scenario));
                if config.verbosity.is_verbose() {
                    println!("{}", detail_line(scenario));
                }
            }
            if !config.verbosity.is_quiet() {
                eprintln!("{} scenarios", scenarios.len());
            }
        }
    }
    Ok(())
}

/// Execute `transprobe config`
pub fn show_config(config_path: Option<&Path>, args: &ConfigArgs) -> CliResult<()> {
    let dir = current_dir()?;

    if args.init {
        let target = dir.join(DEFAULT_CONFIG_FILE);
        if target.exists() {
            return Err(CliError::config(format!(
                "{} already exists",
                target.display()
            )));
        }
        std::fs::write(&target, ProbeConfig::default().to_yaml()?)?;
        println!("Wrote {}", target.display());
        return Ok(());
    }

    let config = ProbeConfig::load_or_default(config_path, &dir)?;
    config.validate()?;
    print!("{}", config.to_yaml()?);
    Ok(())
}

/// Run `scenarios` with a progress bar
pub async fn execute<F: PageFactory>(
    runner: &ScenarioRunner<F>,
    scenarios: &[Scenario],
    reporter: &mut ProgressReporter,
) -> SuiteReport {
    reporter.start_progress(scenarios.len() as u64, "Running scenarios");
    let report = runner
        .run_all_with(scenarios, |outcome| reporter.outcome(outcome))
        .await;
    reporter.finish();
    report
}

/// Write the JSON report, print the chosen format and map failures to an
/// error
pub fn finish_report(
    report: &SuiteReport,
    args: &RunArgs,
    reporter: &ProgressReporter,
) -> CliResult<()> {
    let path = args.output.join(REPORT_FILE);
    report
        .write_json(&path)
        .map_err(|e| CliError::report_generation(format!("{}: {e}", path.display())))?;
    tracing::info!(path = %path.display(), "report written");

    if report.skipped > 0 {
        reporter.warning(&format!(
            "{} scenarios skipped after the first failure",
            report.skipped
        ));
    }

    let format: ReportFormat = args.format.into();
    match format {
        ReportFormat::Text => {
            if report.failed() > 0 {
                reporter.header("Failures");
                for outcome in report.failures() {
                    reporter.failure(&crate::output::outcome_line(outcome));
                }
            }
        }
        ReportFormat::Json | ReportFormat::Tap => println!("{}", report.render(format)?),
    }
    reporter.summary(
        report.passed(),
        report.failed(),
        report.skipped,
        report.duration(),
    );

    if report.all_passed() {
        Ok(())
    } else {
        Err(CliError::ScenariosFailed {
            failed: report.failed() + report.skipped,
            total: report.total(),
        })
    }
}

/// Execute `transprobe run`
pub fn run_scenarios(
    config: &CliConfig,
    config_path: Option<&Path>,
    args: &RunArgs,
) -> CliResult<()> {
    let probe = probe_config(config_path, args)?;
    let scenarios = select_scenarios(&args.select)?;
    let mut reporter =
        ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());

    if scenarios.is_empty() {
        println!("No scenarios matched");
        return Ok(());
    }

    reporter.info(&format!(
        "Running {} scenarios against {} ({} jobs, timeout {})",
        scenarios.len(),
        probe.base_url,
        probe.effective_jobs(),
        timeout_label(probe.timeout_override_ms)
    ));

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::config(format!("failed to start async runtime: {e}")))?;
    let report = runtime.block_on(launch_and_run(probe, &scenarios, &mut reporter))?;
    finish_report(&report, args, &reporter)
}

#[cfg(feature = "browser")]
async fn launch_and_run(
    probe: ProbeConfig,
    scenarios: &[Scenario],
    reporter: &mut ProgressReporter,
) -> CliResult<SuiteReport> {
    let browser = transprobe::ChromiumBrowser::launch(probe.browser.clone()).await?;
    let runner = ScenarioRunner::new(browser, probe);
    let report = execute(&runner, scenarios, reporter).await;
    if let Err(e) = runner.into_factory().close().await {
        tracing::warn!(error = %e, "failed to close browser");
    }
    Ok(report)
}

#[cfg(not(feature = "browser"))]
#[allow(clippy::unused_async)]
async fn launch_and_run(
    _probe: ProbeConfig,
    _scenarios: &[Scenario],
    _reporter: &mut ProgressReporter,
) -> CliResult<SuiteReport> {
    Err(CliError::config(
        "built without the browser feature; rebuild with --features browser",
    ))
}

/// Readiness budget shown in the run banner
#[must_use]
pub fn timeout_label(ms: Option<u64>) -> String {
    ms.map_or_else(
        || "per scenario".to_string(),
        |ms| format!("{:.1}s", Duration::from_millis(ms).as_secs_f64()),
    )
}
