//! transprobe: browser-driven end-to-end scenarios for Singlish-to-Sinhala
//! transliteration sites.
//!
//! The site under test (by default `https://www.swifttranslator.com/`) is an
//! external black box. Each scenario opens a fresh page, types a literal
//! Singlish input into the text area, waits for the asynchronously rendered
//! output, and asserts that the page text contains (or does not contain) a
//! literal Sinhala string.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐   ┌────────────────┐   ┌─────────────┐   ┌──────────────┐
//! │ Catalog  │──►│ ScenarioRunner │──►│ PageFactory │──►│ PageDriver   │
//! │ (YAML)   │   │ (state machine)│   │             │   │ Chromium/Mock│
//! └──────────┘   └───────┬────────┘   └─────────────┘   └──────────────┘
//!                        ▼
//!                  ┌─────────────┐
//!                  │ SuiteReport │  text / JSON / TAP
//!                  └─────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use transprobe::{Catalog, MockPageFactory, MockSite, ProbeConfig, ScenarioFilter, ScenarioRunner};
//!
//! # async fn demo() -> transprobe::ProbeResult<()> {
//! let catalog = Catalog::builtin()?;
//! let scenarios = catalog.filter(&ScenarioFilter::new().with_suite("baseline"));
//! let site = MockSite::new().with_translation("aayuboovan nimal!", "ආයුබෝවන් නිමල්!");
//! let runner = ScenarioRunner::new(MockPageFactory::new(site), ProbeConfig::default());
//! let report = runner.run_all(&scenarios).await;
//! println!("{}", report.summary());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod assertion;
mod browser;
mod catalog;
mod config;
mod driver;
mod locator;
mod report;
mod result;
mod runner;
mod scenario;
mod wait;

pub use assertion::{rendered_output, AssertionCheckResult, Expectation, Polarity};
pub use browser::{BrowserConfig, DEFAULT_NAVIGATION_TIMEOUT_MS};
#[cfg(feature = "browser")]
pub use browser::{ChromiumBrowser, ChromiumPage};
pub use catalog::{Catalog, ScenarioFilter, Suite};
pub use config::{ProbeConfig, DEFAULT_BASE_URL, DEFAULT_CONFIG_FILE};
pub use driver::{MockPage, MockPageFactory, MockSite, PageDriver, PageFactory};
pub use locator::{Action, ActionReply, Locator, LocatorOptions, Selector};
pub use report::{ReportFormat, ScenarioOutcome, SuiteReport};
pub use result::{ErrorKind, ProbeError, ProbeResult};
pub use runner::ScenarioRunner;
pub use scenario::{Flow, Scenario, ScenarioInput, ScenarioState};
pub use wait::{
    contains_sinhala, excerpt, Readiness, WaitOptions, WaitResult, Waiter,
    DEFAULT_POLL_INTERVAL_MS, DEFAULT_SETTLE_MS, DEFAULT_WAIT_TIMEOUT_MS,
    EXTENDED_WAIT_TIMEOUT_MS, SINHALA_PATTERN,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::{
        Catalog, Expectation, Flow, Locator, PageDriver, PageFactory, Polarity, ProbeConfig,
        ProbeError, ProbeResult, Readiness, Scenario, ScenarioFilter, ScenarioOutcome,
        ScenarioRunner, Selector, SuiteReport,
    };
}
