//! Scenario model: one literal input, a wait strategy and an expectation.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::assertion::{Expectation, Polarity};
use crate::wait::{Readiness, DEFAULT_WAIT_TIMEOUT_MS};

/// Literal input typed into the text area
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScenarioInput {
    /// Text used as-is; may be empty
    Literal(String),
    /// A unit repeated `times` times
    Repeat {
        /// Repeated unit
        repeat: String,
        /// Repetition count
        times: usize,
    },
}

impl Default for ScenarioInput {
    fn default() -> Self {
        Self::Literal(String::new())
    }
}

impl ScenarioInput {
    /// Materialize the input text
    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Self::Literal(s) => s.clone(),
            Self::Repeat { repeat, times } => repeat.repeat(*times),
        }
    }

    /// Whether nothing should be typed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Literal(s) => s.is_empty(),
            Self::Repeat { repeat, times } => repeat.is_empty() || *times == 0,
        }
    }
}

impl From<&str> for ScenarioInput {
    fn from(s: &str) -> Self {
        Self::Literal(s.to_string())
    }
}

impl From<String> for ScenarioInput {
    fn from(s: String) -> Self {
        Self::Literal(s)
    }
}

/// What the runner does between filling the input and asserting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flow {
    /// Navigate, fill, wait, assert
    #[default]
    Translate,
    /// Fill and wait, press Clear, then assert the input is empty and the
    /// expectation holds
    ClearAndVerify,
    /// Fill and wait, capture output, press Clear, fill again and require
    /// the same output
    RepeatAfterClear,
}

impl Flow {
    /// Lowercase name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Translate => "translate",
            Self::ClearAndVerify => "clear_and_verify",
            Self::RepeatAfterClear => "repeat_after_clear",
        }
    }
}

/// Execution states of a scenario, in order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioState {
    /// Nothing done yet
    #[default]
    NotStarted,
    /// Page loaded
    Navigated,
    /// Input injected
    InputSet,
    /// Waiting for readiness
    Awaiting,
    /// Expectation evaluated
    Asserted,
    /// Finished successfully
    Done,
}

impl ScenarioState {
    /// Lowercase name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Navigated => "navigated",
            Self::InputSet => "input_set",
            Self::Awaiting => "awaiting",
            Self::Asserted => "asserted",
            Self::Done => "done",
        }
    }
}

impl std::fmt::Display for ScenarioState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single end-to-end test case
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    /// Suite the scenario belongs to
    pub suite: String,
    /// Identifier, unique within the suite
    pub id: String,
    /// Human-readable title
    pub title: String,
    /// Text to type
    pub input: ScenarioInput,
    /// What the page must (not) show
    pub expectation: Expectation,
    /// Synchronization before asserting
    pub readiness: Readiness,
    /// Readiness budget
    pub timeout: Duration,
    /// Interaction flow
    pub flow: Flow,
}

impl Scenario {
    /// Create a translate scenario that waits with the expectation's default
    /// readiness
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        input: impl Into<ScenarioInput>,
        expectation: Expectation,
    ) -> Self {
        let readiness = expectation.default_readiness();
        let id = id.into();
        Self {
            suite: String::new(),
            title: id.clone(),
            id,
            input: input.into(),
            expectation,
            readiness,
            timeout: Duration::from_millis(DEFAULT_WAIT_TIMEOUT_MS),
            flow: Flow::Translate,
        }
    }

    /// Set the suite
    #[must_use]
    pub fn with_suite(mut self, suite: impl Into<String>) -> Self {
        self.suite = suite.into();
        self
    }

    /// Set the title
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Override readiness
    #[must_use]
    pub fn with_readiness(mut self, readiness: Readiness) -> Self {
        self.readiness = readiness;
        self
    }

    /// Set the readiness budget
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the flow
    #[must_use]
    pub const fn with_flow(mut self, flow: Flow) -> Self {
        self.flow = flow;
        self
    }

    /// `suite/id`, or just `id` outside a suite
    #[must_use]
    pub fn qualified_id(&self) -> String {
        if self.suite.is_empty() {
            self.id.clone()
        } else {
            format!("{}/{}", self.suite, self.id)
        }
    }

    /// Positive or negative
    #[must_use]
    pub const fn polarity(&self) -> Polarity {
        self.expectation.polarity()
    }
}
