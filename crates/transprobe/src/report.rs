//! Scenario outcomes and suite reports.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::Path;
use std::time::Duration;

use crate::assertion::Polarity;
use crate::result::{ErrorKind, ProbeError, ProbeResult};
use crate::scenario::{Flow, Scenario, ScenarioState};

/// Result of running one scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    /// `suite/id`
    pub id: String,
    /// Human-readable title
    pub title: String,
    /// Positive or negative
    pub polarity: Polarity,
    /// Interaction flow
    pub flow: Flow,
    /// Whether the scenario passed
    pub passed: bool,
    /// Last state reached
    pub state: ScenarioState,
    /// Failure classification
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    /// Failure message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Wall time in milliseconds
    pub duration_ms: u64,
}

impl ScenarioOutcome {
    /// Outcome of a scenario that reached `Done`
    #[must_use]
    pub fn pass(scenario: &Scenario, duration: Duration) -> Self {
        Self {
            id: scenario.qualified_id(),
            title: scenario.title.clone(),
            polarity: scenario.polarity(),
            flow: scenario.flow,
            passed: true,
            state: ScenarioState::Done,
            error_kind: None,
            message: None,
            duration_ms: duration.as_millis() as u64,
        }
    }

    /// Outcome of a scenario that stopped at `state`
    #[must_use]
    pub fn fail(
        scenario: &Scenario,
        state: ScenarioState,
        error: &ProbeError,
        duration: Duration,
    ) -> Self {
        Self {
            id: scenario.qualified_id(),
            title: scenario.title.clone(),
            polarity: scenario.polarity(),
            flow: scenario.flow,
            passed: false,
            state,
            error_kind: Some(error.kind()),
            message: Some(error.to_string()),
            duration_ms: duration.as_millis() as u64,
        }
    }

    /// Wall time
    #[must_use]
    pub const fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

/// Output format for suite reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// One line per scenario plus a summary
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
    /// Test Anything Protocol, version 13
    Tap,
}

impl ReportFormat {
    /// File extension for reports in this format
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Json => "json",
            Self::Tap => "tap",
        }
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "tap" => Ok(Self::Tap),
            other => Err(ProbeError::config(format!("unknown report format: {other}"))),
        }
    }
}

/// Aggregated outcomes of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Outcomes in scheduling order
    pub outcomes: Vec<ScenarioOutcome>,
    /// Scenarios never started because of fail-fast
    pub skipped: usize,
    /// Wall time of the whole run in milliseconds
    pub duration_ms: u64,
}

impl SuiteReport {
    /// Create a report
    #[must_use]
    pub fn new(outcomes: Vec<ScenarioOutcome>, skipped: usize, duration: Duration) -> Self {
        Self {
            outcomes,
            skipped,
            duration_ms: duration.as_millis() as u64,
        }
    }

    /// Number of passed scenarios
    #[must_use]
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed).count()
    }

    /// Number of failed scenarios
    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.passed).count()
    }

    /// Number of scenarios scheduled, including skipped ones
    #[must_use]
    pub fn total(&self) -> usize {
        self.outcomes.len() + self.skipped
    }

    /// Whether every scheduled scenario ran and passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.skipped == 0 && self.outcomes.iter().all(|o| o.passed)
    }

    /// Failed outcomes
    pub fn failures(&self) -> impl Iterator<Item = &ScenarioOutcome> {
        self.outcomes.iter().filter(|o| !o.passed)
    }

    /// Wall time
    #[must_use]
    pub const fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// One-line summary
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} passed, {} failed, {} skipped of {} in {:.2}s",
            self.passed(),
            self.failed(),
            self.skipped,
            self.total(),
            self.duration().as_secs_f64()
        )
    }

    /// Render in `format`
    pub fn render(&self, format: ReportFormat) -> ProbeResult<String> {
        match format {
            ReportFormat::Text => Ok(self.to_text()),
            ReportFormat::Json => self.to_json(),
            ReportFormat::Tap => Ok(self.to_tap()),
        }
    }

    /// Pretty JSON
    pub fn to_json(&self) -> ProbeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Plain text listing
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for o in &self.outcomes {
            if o.passed {
                let _ = writeln!(out, "PASS {}  {} ({}ms)", o.id, o.title, o.duration_ms);
            } else {
                let kind = o.error_kind.map_or("unknown", |k| k.as_str());
                let _ = writeln!(
                    out,
                    "FAIL {}  {} [{kind} at {}] {}",
                    o.id,
                    o.title,
                    o.state,
                    o.message.as_deref().unwrap_or_default()
                );
            }
        }
        let _ = writeln!(out, "{}", self.summary());
        out
    }

    /// TAP version 13
    #[must_use]
    pub fn to_tap(&self) -> String {
        let mut out = String::from("TAP version 13\n");
        let _ = writeln!(out, "1..{}", self.total());
        for (i, o) in self.outcomes.iter().enumerate() {
            let n = i + 1;
            if o.passed {
                let _ = writeln!(out, "ok {n} - {} {}", o.id, o.title);
            } else {
                let _ = writeln!(out, "not ok {n} - {} {}", o.id, o.title);
                let _ = writeln!(out, "  ---");
                if let Some(kind) = o.error_kind {
                    let _ = writeln!(out, "  kind: {kind}");
                }
                let _ = writeln!(out, "  state: {}", o.state);
                if let Some(message) = &o.message {
                    let _ = writeln!(out, "  message: {message:?}");
                }
                let _ = writeln!(out, "  ...");
            }
        }
        for i in 0..self.skipped {
            let _ = writeln!(
                out,
                "ok {} - skipped # SKIP fail-fast",
                self.outcomes.len() + i + 1
            );
        }
        out
    }

    /// Write the JSON report to `path`, creating parent directories
    pub fn write_json(&self, path: impl AsRef<Path>) -> ProbeResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        tracing::info!(path = %path.display(), "report written");
        Ok(())
    }
}
