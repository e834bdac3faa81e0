//! Runner configuration.
//!
//! Loaded from `transprobe.yaml` when present; every field has a default so
//! partial files are valid.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::browser::BrowserConfig;
use crate::locator::Locator;
use crate::result::{ProbeError, ProbeResult};
use crate::scenario::Scenario;
use crate::wait::{WaitOptions, DEFAULT_POLL_INTERVAL_MS};

/// Site under test
pub const DEFAULT_BASE_URL: &str = "https://www.swifttranslator.com/";

/// Config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "transprobe.yaml";

/// Runner configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeConfig {
    /// Page each scenario navigates to
    pub base_url: String,
    /// CSS selector of the free-text input
    pub input_selector: String,
    /// Accessible label of the Clear control
    pub clear_label: String,
    /// Interval between page reads while waiting
    pub poll_interval_ms: u64,
    /// Replace every scenario's readiness budget
    pub timeout_override_ms: Option<u64>,
    /// Number of scenarios run concurrently (0 = auto-detect)
    pub jobs: usize,
    /// Stop scheduling scenarios after the first failure
    pub fail_fast: bool,
    /// Browser settings
    pub browser: BrowserConfig,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            input_selector: "textarea".to_string(),
            clear_label: "Clear".to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            timeout_override_ms: None,
            jobs: 0,
            fail_fast: false,
            browser: BrowserConfig::default(),
        }
    }
}

impl ProbeConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse YAML
    pub fn from_yaml_str(yaml: &str) -> ProbeResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file
    pub fn from_path(path: impl AsRef<Path>) -> ProbeResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ProbeError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Self::from_yaml_str(&content)
    }

    /// Load `path` if given, else `transprobe.yaml` from `dir` if it
    /// exists, else defaults
    pub fn load_or_default(path: Option<&Path>, dir: &Path) -> ProbeResult<Self> {
        if let Some(path) = path {
            return Self::from_path(path);
        }
        let candidate = dir.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            Self::from_path(candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// Serialize as YAML
    pub fn to_yaml(&self) -> ProbeResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Check field values
    pub fn validate(&self) -> ProbeResult<()> {
        if !(self.base_url.starts_with("http://")
            || self.base_url.starts_with("https://")
            || self.base_url.starts_with("file://"))
        {
            return Err(ProbeError::config(format!(
                "base_url must be an http(s) or file URL, got {:?}",
                self.base_url
            )));
        }
        if self.input_selector.trim().is_empty() {
            return Err(ProbeError::config("input_selector must not be empty"));
        }
        if self.clear_label.trim().is_empty() {
            return Err(ProbeError::config("clear_label must not be empty"));
        }
        if self.poll_interval_ms == 0 {
            return Err(ProbeError::config("poll_interval_ms must be positive"));
        }
        if self.timeout_override_ms == Some(0) {
            return Err(ProbeError::config("timeout_override_ms must be positive"));
        }
        Ok(())
    }

    /// Set base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set parallel jobs
    #[must_use]
    pub const fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// Set fail fast
    #[must_use]
    pub const fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Set the polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    /// Override every scenario's readiness budget
    #[must_use]
    pub const fn with_timeout_override(mut self, ms: Option<u64>) -> Self {
        self.timeout_override_ms = ms;
        self
    }

    /// Set browser settings
    #[must_use]
    pub fn with_browser(mut self, browser: BrowserConfig) -> Self {
        self.browser = browser;
        self
    }

    /// Locator for the text area
    #[must_use]
    pub fn input_locator(&self) -> Locator {
        Locator::css(self.input_selector.clone())
            .with_poll_interval(Duration::from_millis(self.poll_interval_ms))
    }

    /// Locator for the Clear control
    #[must_use]
    pub fn clear_locator(&self) -> Locator {
        Locator::label(self.clear_label.clone())
            .with_poll_interval(Duration::from_millis(self.poll_interval_ms))
    }

    /// Wait options for a scenario, honoring the timeout override
    #[must_use]
    pub fn wait_options(&self, scenario: &Scenario) -> WaitOptions {
        let timeout_ms = self
            .timeout_override_ms
            .unwrap_or(scenario.timeout.as_millis() as u64);
        WaitOptions::new()
            .with_timeout(timeout_ms)
            .with_poll_interval(self.poll_interval_ms)
    }

    /// Get effective number of parallel jobs
    #[must_use]
    pub fn effective_jobs(&self) -> usize {
        if self.jobs == 0 {
            std::thread::available_parallelism()
                .map(std::num::NonZeroUsize::get)
                .unwrap_or(1)
        } else {
            self.jobs
        }
    }
}
