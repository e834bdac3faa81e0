//! Readiness waits.
//!
//! The target site renders its output asynchronously, so every assertion is
//! preceded by a wait. Waits poll the page's visible text until a
//! [`Readiness`] predicate holds or the budget runs out; a timeout is a hard
//! failure and is never retried.
//!
//! [`Readiness::Settle`] is a plain delay, reserved for inputs where no
//! Sinhala output is expected and a polling predicate could never succeed.

use regex::Regex;
use std::sync::LazyLock;
use std::time::{Duration, Instant};

use crate::driver::PageDriver;
use crate::locator::Locator;
use crate::result::{ProbeError, ProbeResult};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for readiness waits (10 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 10_000;

/// Extended timeout used by the slower scenario suite (20 seconds)
pub const EXTENDED_WAIT_TIMEOUT_MS: u64 = 20_000;

/// Default polling interval (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Default fixed settle delay (2 seconds)
pub const DEFAULT_SETTLE_MS: u64 = 2_000;

/// Any character from the Sinhala Unicode block
pub const SINHALA_PATTERN: &str = r"[\u{0D80}-\u{0DFF}]";

/// Maximum characters of page text kept in timeout errors
const LAST_TEXT_EXCERPT_CHARS: usize = 200;

static SINHALA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SINHALA_PATTERN).expect("Sinhala block pattern is valid"));

/// Shorten `text` to at most `max_chars` characters, marking the cut.
#[must_use]
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}

/// Whether `text` contains at least one Sinhala character
#[must_use]
pub fn contains_sinhala(text: &str) -> bool {
    SINHALA.is_match(text)
}

// =============================================================================
// READINESS
// =============================================================================

/// Predicate over the page's visible text used before asserting
#[derive(Debug, Clone)]
pub enum Readiness {
    /// Body text contains the literal
    ContainsText(String),
    /// Body text matches the pattern
    MatchesPattern(Regex),
    /// Fixed delay, no polling
    Settle(Duration),
}

impl Readiness {
    /// Wait until the body contains `text`
    #[must_use]
    pub fn contains(text: impl Into<String>) -> Self {
        Self::ContainsText(text.into())
    }

    /// Wait until the body matches `pattern`
    pub fn pattern(pattern: &str) -> ProbeResult<Self> {
        Ok(Self::MatchesPattern(Regex::new(pattern)?))
    }

    /// Wait until any Sinhala character is rendered
    #[must_use]
    pub fn sinhala() -> Self {
        Self::MatchesPattern(SINHALA.clone())
    }

    /// Sleep for a fixed number of milliseconds
    #[must_use]
    pub const fn settle_ms(ms: u64) -> Self {
        Self::Settle(Duration::from_millis(ms))
    }

    /// Whether this readiness polls the page
    #[must_use]
    pub const fn is_polling(&self) -> bool {
        !matches!(self, Self::Settle(_))
    }

    /// Whether this readiness reads layout-aware text instead of the raw
    /// body text
    #[must_use]
    pub const fn reads_rendered_text(&self) -> bool {
        matches!(self, Self::MatchesPattern(_))
    }

    /// Check the predicate against observed text. Always true for `Settle`.
    #[must_use]
    pub fn is_satisfied(&self, text: &str) -> bool {
        match self {
            Self::ContainsText(t) => text.contains(t.as_str()),
            Self::MatchesPattern(re) => re.is_match(text),
            Self::Settle(_) => true,
        }
    }

    /// Human-readable description
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::ContainsText(t) => format!("text containing {t:?}"),
            Self::MatchesPattern(re) => format!("text matching /{}/", re.as_str()),
            Self::Settle(d) => format!("settle of {}ms", d.as_millis()),
        }
    }
}

impl PartialEq for Readiness {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::ContainsText(a), Self::ContainsText(b)) => a == b,
            (Self::MatchesPattern(a), Self::MatchesPattern(b)) => a.as_str() == b.as_str(),
            (Self::Settle(a), Self::Settle(b)) => a == b,
            _ => false,
        }
    }
}

impl std::fmt::Display for Readiness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.description())
    }
}

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new default wait options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// =============================================================================
// WAIT RESULT
// =============================================================================

/// Result of a successful wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitResult {
    /// Time spent waiting
    pub elapsed: Duration,
    /// Description of what was waited for
    pub waited_for: String,
    /// Number of page reads performed
    pub polls: usize,
}

// =============================================================================
// WAITER
// =============================================================================

/// Polls a page until a predicate holds
#[derive(Debug, Clone, Copy, Default)]
pub struct Waiter {
    options: WaitOptions,
}

impl Waiter {
    /// Create a waiter with default options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom options
    #[must_use]
    pub const fn with_options(options: WaitOptions) -> Self {
        Self { options }
    }

    /// Get the options
    #[must_use]
    pub const fn options(&self) -> &WaitOptions {
        &self.options
    }

    /// Wait until the page text satisfies `readiness`.
    ///
    /// Literal readiness reads the raw body text; pattern readiness reads
    /// the rendered text. Each read is bounded by the remaining budget, so a
    /// page that stops answering still times out on schedule.
    pub async fn wait_for<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
        readiness: &Readiness,
    ) -> ProbeResult<WaitResult> {
        if let Readiness::Settle(delay) = readiness {
            let start = Instant::now();
            tracing::debug!(ms = delay.as_millis() as u64, "settling");
            tokio::time::sleep(*delay).await;
            return Ok(WaitResult {
                elapsed: start.elapsed(),
                waited_for: readiness.description(),
                polls: 0,
            });
        }

        self.poll_text(
            driver,
            readiness.reads_rendered_text(),
            readiness.description(),
            |text| readiness.is_satisfied(text),
        )
        .await
    }

    /// Wait until the body text no longer contains `text`
    pub async fn wait_for_absence<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
        text: &str,
    ) -> ProbeResult<WaitResult> {
        self.poll_text(driver, false, format!("text without {text:?}"), |body| {
            !body.contains(text)
        })
        .await
    }

    async fn poll_text<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
        rendered: bool,
        waited_for: String,
        ready: impl Fn(&str) -> bool + Send,
    ) -> ProbeResult<WaitResult> {
        let start = Instant::now();
        let timeout = self.options.timeout();
        let poll_interval = self.options.poll_interval();
        let mut polls = 0;
        let mut last_text = None;

        loop {
            let remaining = timeout.saturating_sub(start.elapsed());
            if remaining.is_zero() {
                break;
            }
            let read = if rendered {
                tokio::time::timeout(remaining, driver.rendered_text()).await
            } else {
                tokio::time::timeout(remaining, driver.body_text()).await
            };
            let Ok(read) = read else {
                break;
            };
            let text = read?;
            polls += 1;
            if ready(&text) {
                tracing::debug!(polls, elapsed_ms = start.elapsed().as_millis() as u64, "ready");
                return Ok(WaitResult {
                    elapsed: start.elapsed(),
                    waited_for,
                    polls,
                });
            }
            tracing::trace!(polls, "not ready");
            last_text = Some(text);

            let remaining = timeout.saturating_sub(start.elapsed());
            tokio::time::sleep(poll_interval.min(remaining)).await;
        }

        Err(ProbeError::Timeout {
            waited_for,
            ms: self.options.timeout_ms,
            last_text: last_text.map(|t| excerpt(&t, LAST_TEXT_EXCERPT_CHARS)),
        })
    }

    /// Wait until `locator` matches at least one element, returning the
    /// match count. Uses the locator's own timeout and poll interval; each
    /// query is bounded by what is left of it.
    pub async fn wait_for_element<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
        locator: &Locator,
    ) -> ProbeResult<usize> {
        let start = Instant::now();
        let options = locator.options();
        let expired = || ProbeError::Timeout {
            waited_for: format!("element {locator}"),
            ms: options.timeout.as_millis() as u64,
            last_text: None,
        };
        loop {
            let remaining = options.timeout.saturating_sub(start.elapsed());
            let Ok(count) = tokio::time::timeout(remaining, driver.count(locator)).await else {
                return Err(expired());
            };
            let count = count?;
            if count > 0 {
                return Ok(count);
            }
            let remaining = options.timeout.saturating_sub(start.elapsed());
            if remaining.is_zero() {
                return Err(expired());
            }
            tokio::time::sleep(options.poll_interval.min(remaining)).await;
        }
    }

    /// Wait until the control matched by `locator` holds exactly `expected`
    pub async fn wait_for_value<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
        locator: &Locator,
        expected: &str,
    ) -> ProbeResult<()> {
        let start = Instant::now();
        let options = locator.options();
        let mut last_value: Option<String> = None;
        loop {
            let remaining = options.timeout.saturating_sub(start.elapsed());
            let read = tokio::time::timeout(remaining, driver.input_value(locator)).await;
            if let Ok(value) = read {
                let value = value?;
                if value == expected {
                    return Ok(());
                }
                last_value = Some(value);
            }
            let remaining = options.timeout.saturating_sub(start.elapsed());
            if remaining.is_zero() {
                return Err(ProbeError::Timeout {
                    waited_for: format!("{locator} to have value {expected:?}"),
                    ms: options.timeout.as_millis() as u64,
                    last_text: last_value.map(|v| excerpt(&v, LAST_TEXT_EXCERPT_CHARS)),
                });
            }
            tokio::time::sleep(options.poll_interval.min(remaining)).await;
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
