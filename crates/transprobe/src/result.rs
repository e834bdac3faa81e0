//! Result and error types for transprobe.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for transprobe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors that can occur while driving a scenario
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Page error (CDP transport, script evaluation)
    #[error("Page error: {message}")]
    Page {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Input simulation error
    #[error("Input simulation failed: {message}")]
    Input {
        /// Error message
        message: String,
    },

    /// Readiness predicate never held within the budget
    #[error("Timed out after {ms}ms waiting for {waited_for}")]
    Timeout {
        /// Description of the readiness predicate
        waited_for: String,
        /// Budget in milliseconds
        ms: u64,
        /// Page text observed on the last poll, if any
        last_text: Option<String>,
    },

    /// Assertion failed
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// Strict locator matched more than one element
    #[error("Locator {selector} matched {count} elements, strict mode requires exactly one")]
    LocatorAmbiguous {
        /// Selector description
        selector: String,
        /// Number of matches
        count: usize,
    },

    /// Locator matched nothing
    #[error("No element matches {selector}")]
    ElementNotFound {
        /// Selector description
        selector: String,
    },

    /// Scenario catalog is malformed
    #[error("Catalog error: {message}")]
    Catalog {
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Readiness pattern failed to compile
    #[error("Invalid readiness pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl ProbeError {
    /// Create a catalog error
    #[must_use]
    pub fn catalog(message: impl Into<String>) -> Self {
        Self::Catalog {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an assertion failure
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }

    /// Create a page error
    #[must_use]
    pub fn page(message: impl Into<String>) -> Self {
        Self::Page {
            message: message.into(),
        }
    }

    /// Classify the error for scenario reports
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::AssertionFailed { .. } => ErrorKind::Assertion,
            Self::LocatorAmbiguous { .. } | Self::ElementNotFound { .. } => ErrorKind::Locator,
            Self::BrowserLaunch { .. }
            | Self::Page { .. }
            | Self::Navigation { .. }
            | Self::Input { .. } => ErrorKind::Browser,
            Self::Catalog { .. }
            | Self::Config { .. }
            | Self::Pattern(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::Yaml(_) => ErrorKind::Setup,
        }
    }
}

/// Coarse failure classification carried into reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Readiness never became true
    Timeout,
    /// Observed text contradicted the expectation
    Assertion,
    /// Element targeting failed (ambiguous or missing)
    Locator,
    /// Browser, page or navigation failure
    Browser,
    /// Catalog, configuration or I/O failure
    Setup,
}

impl ErrorKind {
    /// Short label used in text and TAP output
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Assertion => "assertion",
            Self::Locator => "locator",
            Self::Browser => "browser",
            Self::Setup => "setup",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
