//! Output formatting and progress reporting

use console::{style, Style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use transprobe::{Scenario, ScenarioOutcome};

/// Progress reporter for scenario execution
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    progress_bar: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            progress_bar: None,
            use_color,
            quiet,
        }
    }

    /// Start a progress bar for multiple scenarios
    pub fn start_progress(&mut self, total: u64, message: &str) {
        if self.quiet {
            return;
        }

        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb.set_message(message.to_string());
        self.progress_bar = Some(pb);
    }

    /// Increment progress
    pub fn increment(&self, delta: u64) {
        if let Some(ref pb) = self.progress_bar {
            pb.inc(delta);
        }
    }

    /// Update progress message
    pub fn set_message(&self, message: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.set_message(message.to_string());
        }
    }

    /// Finish progress bar
    pub fn finish(&self) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_and_clear();
        }
    }

    fn write_line(&self, line: &str) {
        match self.progress_bar {
            Some(ref pb) if !pb.is_finished() => pb.suspend(|| {
                let _ = self.term.write_line(line);
            }),
            _ => {
                let _ = self.term.write_line(line);
            }
        }
    }

    fn prefix(&self, symbol: &str, plain: &str, color: Style) -> String {
        if self.use_color {
            color.bold().apply_to(symbol).to_string()
        } else {
            plain.to_string()
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = self.prefix("✓", "PASS", Style::new().green());
        self.write_line(&format!("{prefix} {message}"));
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        // Always print failures, even in quiet mode
        let prefix = self.prefix("✗", "FAIL", Style::new().red());
        self.write_line(&format!("{prefix} {message}"));
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = self.prefix("⚠", "WARN", Style::new().yellow());
        self.write_line(&format!("{prefix} {message}"));
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = self.prefix("ℹ", "INFO", Style::new().blue());
        self.write_line(&format!("{prefix} {message}"));
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        if self.quiet {
            return;
        }

        let styled = if self.use_color {
            style(title).bold().underlined().to_string()
        } else {
            format!("=== {title} ===")
        };

        self.write_line("");
        self.write_line(&styled);
    }

    /// Report a finished scenario and advance the bar
    pub fn outcome(&self, outcome: &ScenarioOutcome) {
        let line = outcome_line(outcome);
        if outcome.passed {
            self.success(&line);
        } else {
            self.failure(&line);
        }
        self.set_message(&outcome.id);
        self.increment(1);
    }

    /// Print run summary
    pub fn summary(&self, passed: usize, failed: usize, skipped: usize, duration: Duration) {
        if self.quiet && failed == 0 {
            return;
        }

        self.write_line("");

        let total = passed + failed + skipped;
        let duration_secs = duration.as_secs_f64();

        if self.use_color {
            let passed_style = Style::new().green().bold();
            let failed_style = Style::new().red().bold();
            let skipped_style = Style::new().yellow();

            let status = if failed > 0 || skipped > 0 {
                failed_style.apply_to("FAILED")
            } else {
                passed_style.apply_to("PASSED")
            };

            self.write_line(&format!(
                "{} {} scenarios in {:.2}s ({} passed, {} failed, {} skipped)",
                status,
                total,
                duration_secs,
                passed_style.apply_to(passed),
                if failed > 0 {
                    failed_style.apply_to(failed).to_string()
                } else {
                    failed.to_string()
                },
                skipped_style.apply_to(skipped)
            ));
        } else {
            self.write_line(&summary_line(passed, failed, skipped, duration));
        }
    }
}

/// Plain summary line
#[must_use]
pub fn summary_line(passed: usize, failed: usize, skipped: usize, duration: Duration) -> String {
    let status = if failed > 0 || skipped > 0 {
        "FAILED"
    } else {
        "PASSED"
    };
    let total = passed + failed + skipped;
    format!(
        "{status} {total} scenarios in {:.2}s ({passed} passed, {failed} failed, {skipped} skipped)",
        duration.as_secs_f64()
    )
}

/// One line describing a finished scenario
#[must_use]
pub fn outcome_line(outcome: &ScenarioOutcome) -> String {
    if outcome.passed {
        format!("{} {} ({}ms)", outcome.id, outcome.title, outcome.duration_ms)
    } else {
        let kind = outcome.error_kind.map_or("unknown", |k| k.as_str());
        format!(
            "{} {} [{kind} at {}]: {}",
            outcome.id,
            outcome.title,
            outcome.state,
            outcome.message.as_deref().unwrap_or_default()
        )
    }
}

/// One line describing a catalog entry
#[must_use]
pub fn scenario_line(scenario: &Scenario) -> String {
    format!(
        "{:<28} {:<8} {:<18} {}",
        scenario.qualified_id(),
        scenario.polarity().as_str(),
        scenario.flow.as_str(),
        scenario.title
    )
}

/// Indented readiness and timeout of a catalog entry, shown with `-v`
#[must_use]
pub fn detail_line(scenario: &Scenario) -> String {
    format!(
        "    waits for {} (timeout {}ms)",
        scenario.readiness.description(),
        scenario.timeout.as_millis()
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use transprobe::{Expectation, ProbeError, ScenarioState};

    fn scenario() -> Scenario {
        Scenario::new("Pos_Fun_0001", "aayuboovan nimal!", Expectation::contains("ආයුබෝවන් නිමල්!"))
            .with_suite("baseline")
            .with_title("Convert greeting with name")
    }

    mod line_tests {
        use super::*;

        #[test]
        fn test_pass_line() {
            let o = ScenarioOutcome::pass(&scenario(), Duration::from_millis(42));
            assert_eq!(
                outcome_line(&o),
                "baseline/Pos_Fun_0001 Convert greeting with name (42ms)"
            );
        }

        #[test]
        fn test_fail_line() {
            let o = ScenarioOutcome::fail(
                &scenario(),
                ScenarioState::Asserted,
                &ProbeError::assertion("mismatch"),
                Duration::ZERO,
            );
            let line = outcome_line(&o);
            assert!(line.contains("[assertion at asserted]"));
            assert!(line.ends_with("Assertion failed: mismatch"));
        }

        #[test]
        fn test_scenario_line() {
            let line = scenario_line(&scenario());
            assert!(line.starts_with("baseline/Pos_Fun_0001"));
            assert!(line.contains("positive"));
            assert!(line.contains("translate"));
            assert!(line.ends_with("Convert greeting with name"));
        }

        #[test]
        fn test_detail_line() {
            let line = detail_line(&scenario());
            assert!(line.starts_with("    waits for "));
            assert!(line.contains(&scenario().readiness.description()));
            assert!(line.ends_with(&format!("(timeout {}ms)", scenario().timeout.as_millis())));
        }

        #[test]
        fn test_summary_line() {
            assert_eq!(
                summary_line(10, 0, 0, Duration::from_millis(2_500)),
                "PASSED 10 scenarios in 2.50s (10 passed, 0 failed, 0 skipped)"
            );
            assert!(summary_line(8, 0, 2, Duration::ZERO).starts_with("FAILED"));
        }
    }

    mod progress_reporter_tests {
        use super::*;

        #[test]
        fn test_new_reporter() {
            let reporter = ProgressReporter::new(true, false);
            assert!(reporter.use_color);
            assert!(!reporter.quiet);
        }

        #[test]
        fn test_default_reporter() {
            let reporter = ProgressReporter::default();
            assert!(reporter.use_color);
        }

        #[test]
        fn test_messages_do_not_panic() {
            let reporter = ProgressReporter::new(false, false);
            reporter.success("passed");
            reporter.failure("failed");
            reporter.warning("warning");
            reporter.info("info");
            reporter.header("Header");
            reporter.summary(8, 2, 0, Duration::from_secs(3));
        }

        #[test]
        fn test_progress_with_outcomes() {
            let mut reporter = ProgressReporter::new(false, false);
            reporter.start_progress(2, "Running scenarios");
            reporter.outcome(&ScenarioOutcome::pass(&scenario(), Duration::ZERO));
            reporter.outcome(&ScenarioOutcome::fail(
                &scenario(),
                ScenarioState::Awaiting,
                &ProbeError::assertion("x"),
                Duration::ZERO,
            ));
            reporter.finish();
        }

        #[test]
        fn test_quiet_mode_suppresses_progress() {
            let mut reporter = ProgressReporter::new(false, true);
            reporter.start_progress(10, "Running scenarios");
            assert!(reporter.progress_bar.is_none());
            reporter.success("hidden");
            reporter.failure("shown");
        }
    }
}
