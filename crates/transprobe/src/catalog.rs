//! Scenario catalog: the single data table of every test case.
//!
//! The built-in table is embedded at compile time. External tables use the
//! same YAML schema:
//!
//! ```yaml
//! suites:
//!   - name: baseline
//!     timeout_ms: 10000
//!     scenarios:
//!       - id: Pos_Fun_0001
//!         title: "Convert greeting with name"
//!         input: "aayuboovan nimal!"
//!         expect:
//!           contains: "ආයුබෝවන් නිමල්!"
//! ```
//!
//! A scenario may also carry `wait` (`text`, `pattern` or `settle_ms`),
//! `timeout_ms` and `flow`. `input` is either a string or
//! `{ repeat, times }`; omitting it leaves the text area untouched.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use crate::assertion::{Expectation, Polarity};
use crate::result::{ProbeError, ProbeResult};
use crate::scenario::{Flow, Scenario, ScenarioInput};
use crate::wait::{Readiness, DEFAULT_WAIT_TIMEOUT_MS};

/// Built-in scenarios for swifttranslator.com
const BUILTIN_CATALOG: &str = include_str!("../scenarios/swifttranslator.yaml");

// =============================================================================
// FILE SCHEMA
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    suites: Vec<SuiteEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SuiteEntry {
    name: String,
    timeout_ms: Option<u64>,
    scenarios: Vec<ScenarioEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScenarioEntry {
    id: String,
    title: Option<String>,
    #[serde(default)]
    input: ScenarioInput,
    expect: Expectation,
    wait: Option<WaitEntry>,
    timeout_ms: Option<u64>,
    #[serde(default)]
    flow: Flow,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
enum WaitEntry {
    Text(String),
    Pattern(String),
    SettleMs(u64),
}

impl WaitEntry {
    fn into_readiness(self) -> ProbeResult<Readiness> {
        match self {
            Self::Text(t) => Ok(Readiness::contains(t)),
            Self::Pattern(p) => Readiness::pattern(&p),
            Self::SettleMs(ms) => Ok(Readiness::settle_ms(ms)),
        }
    }
}

// =============================================================================
// CATALOG
// =============================================================================

/// A named group of scenarios sharing a readiness budget
#[derive(Debug, Clone, PartialEq)]
pub struct Suite {
    /// Suite name
    pub name: String,
    /// Default readiness budget
    pub timeout: Duration,
    /// Scenarios in authoring order
    pub scenarios: Vec<Scenario>,
}

/// Every scenario, grouped by suite
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    suites: Vec<Suite>,
}

impl Catalog {
    /// The embedded swifttranslator.com catalog
    pub fn builtin() -> ProbeResult<Self> {
        Self::from_yaml_str(BUILTIN_CATALOG)
    }

    /// Load a catalog file
    pub fn from_path(path: impl AsRef<Path>) -> ProbeResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loading catalog");
        Self::from_yaml_str(&content)
    }

    /// Parse and validate catalog YAML
    pub fn from_yaml_str(yaml: &str) -> ProbeResult<Self> {
        let file: CatalogFile = serde_yaml_ng::from_str(yaml)?;
        let suites = file
            .suites
            .into_iter()
            .map(build_suite)
            .collect::<ProbeResult<Vec<_>>>()?;
        let catalog = Self { suites };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Build a catalog from already constructed suites
    pub fn from_suites(suites: Vec<Suite>) -> ProbeResult<Self> {
        let catalog = Self { suites };
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> ProbeResult<()> {
        let mut suite_names = HashSet::new();
        let mut ids = HashSet::new();
        for suite in &self.suites {
            if suite.name.trim().is_empty() {
                return Err(ProbeError::catalog("suite name must not be empty"));
            }
            if !suite_names.insert(suite.name.as_str()) {
                return Err(ProbeError::catalog(format!(
                    "duplicate suite: {}",
                    suite.name
                )));
            }
            for scenario in &suite.scenarios {
                let qualified = scenario.qualified_id();
                if scenario.id.trim().is_empty() {
                    return Err(ProbeError::catalog(format!(
                        "scenario in suite {} has an empty id",
                        suite.name
                    )));
                }
                if scenario.expectation.text().is_empty() {
                    return Err(ProbeError::catalog(format!(
                        "{qualified}: expectation text must not be empty"
                    )));
                }
                if let ScenarioInput::Repeat { repeat, times } = &scenario.input {
                    if repeat.is_empty() || *times == 0 {
                        return Err(ProbeError::catalog(format!(
                            "{qualified}: repeated input must be non-empty and repeat at least once"
                        )));
                    }
                }
                if scenario.timeout.is_zero() {
                    return Err(ProbeError::catalog(format!(
                        "{qualified}: timeout must be positive"
                    )));
                }
                if !ids.insert(qualified.clone()) {
                    return Err(ProbeError::catalog(format!("duplicate scenario: {qualified}")));
                }
            }
        }
        Ok(())
    }

    /// All suites in file order
    #[must_use]
    pub fn suites(&self) -> &[Suite] {
        &self.suites
    }

    /// Suite names in file order
    #[must_use]
    pub fn suite_names(&self) -> Vec<&str> {
        self.suites.iter().map(|s| s.name.as_str()).collect()
    }

    /// Iterate every scenario in file order
    pub fn scenarios(&self) -> impl Iterator<Item = &Scenario> {
        self.suites.iter().flat_map(|s| s.scenarios.iter())
    }

    /// Total number of scenarios
    #[must_use]
    pub fn len(&self) -> usize {
        self.suites.iter().map(|s| s.scenarios.len()).sum()
    }

    /// Whether the catalog has no scenarios
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up by `suite/id`
    #[must_use]
    pub fn get(&self, qualified_id: &str) -> Option<&Scenario> {
        self.scenarios().find(|s| s.qualified_id() == qualified_id)
    }

    /// Scenarios matching `filter`, cloned, in file order
    #[must_use]
    pub fn filter(&self, filter: &ScenarioFilter) -> Vec<Scenario> {
        self.scenarios()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect()
    }
}

fn build_suite(entry: SuiteEntry) -> ProbeResult<Suite> {
    let timeout = Duration::from_millis(entry.timeout_ms.unwrap_or(DEFAULT_WAIT_TIMEOUT_MS));
    let scenarios = entry
        .scenarios
        .into_iter()
        .map(|s| build_scenario(&entry.name, timeout, s))
        .collect::<ProbeResult<Vec<_>>>()?;
    Ok(Suite {
        name: entry.name,
        timeout,
        scenarios,
    })
}

fn build_scenario(suite: &str, suite_timeout: Duration, entry: ScenarioEntry) -> ProbeResult<Scenario> {
    let readiness = match entry.wait {
        Some(wait) => wait.into_readiness()?,
        None => entry.expect.default_readiness(),
    };
    let timeout = entry.timeout_ms.map_or(suite_timeout, Duration::from_millis);
    let title = entry.title.unwrap_or_else(|| entry.id.clone());
    Ok(Scenario::new(entry.id, entry.input, entry.expect)
        .with_suite(suite)
        .with_title(title)
        .with_readiness(readiness)
        .with_timeout(timeout)
        .with_flow(entry.flow))
}

// =============================================================================
// FILTER
// =============================================================================

/// Selection criteria for scenarios
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScenarioFilter {
    /// Case-insensitive substring of `suite/id` or title
    pub pattern: Option<String>,
    /// Exact suite name
    pub suite: Option<String>,
    /// Positive or negative only
    pub polarity: Option<Polarity>,
}

impl ScenarioFilter {
    /// Match everything
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by id/title substring
    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Filter by suite
    #[must_use]
    pub fn with_suite(mut self, suite: impl Into<String>) -> Self {
        self.suite = Some(suite.into());
        self
    }

    /// Filter by polarity
    #[must_use]
    pub const fn with_polarity(mut self, polarity: Polarity) -> Self {
        self.polarity = Some(polarity);
        self
    }

    /// Whether `scenario` passes every criterion
    #[must_use]
    pub fn matches(&self, scenario: &Scenario) -> bool {
        if let Some(suite) = &self.suite {
            if &scenario.suite != suite {
                return false;
            }
        }
        if let Some(polarity) = self.polarity {
            if scenario.polarity() != polarity {
                return false;
            }
        }
        if let Some(pattern) = &self.pattern {
            let needle = pattern.to_lowercase();
            let id = scenario.qualified_id().to_lowercase();
            let title = scenario.title.to_lowercase();
            if !id.contains(&needle) && !title.contains(&needle) {
                return false;
            }
        }
        true
    }
}
