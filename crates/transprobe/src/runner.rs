//! Scenario runner.
//!
//! Each scenario gets its own fresh page and walks a linear state machine:
//!
//! ```text
//! NotStarted -> Navigated -> InputSet -> Awaiting -> Asserted -> Done
//! ```
//!
//! There are no retries. A failure stops the scenario where it is, and the
//! state reached is recorded in its [`ScenarioOutcome`].

use futures::StreamExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::assertion::rendered_output;
use crate::config::ProbeConfig;
use crate::driver::{PageDriver, PageFactory};
use crate::report::{ScenarioOutcome, SuiteReport};
use crate::result::{ProbeError, ProbeResult};
use crate::scenario::{Flow, Scenario, ScenarioState};
use crate::wait::Waiter;

/// Runs scenarios against pages from a [`PageFactory`]
#[derive(Debug)]
pub struct ScenarioRunner<F: PageFactory> {
    factory: F,
    config: ProbeConfig,
}

impl<F: PageFactory> ScenarioRunner<F> {
    /// Create a runner
    #[must_use]
    pub const fn new(factory: F, config: ProbeConfig) -> Self {
        Self { factory, config }
    }

    /// Get the configuration
    #[must_use]
    pub const fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Get the page factory
    #[must_use]
    pub const fn factory(&self) -> &F {
        &self.factory
    }

    /// Give back the page factory
    #[must_use]
    pub fn into_factory(self) -> F {
        self.factory
    }

    /// Run one scenario on a fresh page. Never panics and never returns an
    /// error: every failure is folded into the outcome.
    #[tracing::instrument(skip_all, fields(scenario = %scenario.qualified_id()))]
    pub async fn run(&self, scenario: &Scenario) -> ScenarioOutcome {
        let start = Instant::now();
        let mut state = ScenarioState::NotStarted;

        let mut page = match self.factory.new_page().await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(error = %e, "could not open page");
                return ScenarioOutcome::fail(scenario, state, &e, start.elapsed());
            }
        };

        let result = self.drive(&mut page, scenario, &mut state).await;

        if let Err(e) = page.close().await {
            tracing::warn!(error = %e, "failed to close page");
        }

        match result {
            Ok(()) => {
                tracing::info!(elapsed_ms = start.elapsed().as_millis() as u64, "passed");
                ScenarioOutcome::pass(scenario, start.elapsed())
            }
            Err(e) => {
                tracing::info!(%state, error = %e, "failed");
                ScenarioOutcome::fail(scenario, state, &e, start.elapsed())
            }
        }
    }

    async fn drive<P: PageDriver>(
        &self,
        page: &mut P,
        scenario: &Scenario,
        state: &mut ScenarioState,
    ) -> ProbeResult<()> {
        let waiter = Waiter::with_options(self.config.wait_options(scenario));
        let input = self
            .config
            .input_locator()
            .with_timeout(waiter.options().timeout());

        page.goto(&self.config.base_url).await?;
        advance(state, ScenarioState::Navigated);

        waiter.wait_for_element(page, &input).await?;
        let text = scenario.input.text();
        if scenario.input.is_empty() {
            tracing::debug!("empty input, leaving text area untouched");
        } else {
            page.fill(&input, &text).await?;
        }
        advance(state, ScenarioState::InputSet);

        advance(state, ScenarioState::Awaiting);
        waiter.wait_for(page, &scenario.readiness).await?;

        match scenario.flow {
            Flow::Translate => {
                let observed = page.body_text().await?;
                advance(state, ScenarioState::Asserted);
                scenario.expectation.validate(&observed)?;
            }
            Flow::ClearAndVerify => {
                self.clear(page).await?;
                advance(state, ScenarioState::Asserted);
                waiter.wait_for_value(page, &input, "").await.map_err(|e| {
                    ProbeError::assertion(format!("input was not cleared: {e}"))
                })?;
                let observed = page.body_text().await?;
                scenario.expectation.validate(&observed)?;
            }
            Flow::RepeatAfterClear => {
                let first = rendered_output(&page.rendered_text().await?);
                self.clear(page).await?;
                waiter.wait_for_value(page, &input, "").await.map_err(|e| {
                    ProbeError::assertion(format!("input was not cleared: {e}"))
                })?;
                let previous = scenario.expectation.text();
                waiter.wait_for_absence(page, previous).await.map_err(|e| {
                    ProbeError::assertion(format!("previous output survived Clear: {e}"))
                })?;
                page.fill(&input, &text).await?;
                waiter.wait_for(page, &scenario.readiness).await?;
                let observed = page.body_text().await?;
                let second = rendered_output(&page.rendered_text().await?);
                advance(state, ScenarioState::Asserted);
                if first != second {
                    return Err(ProbeError::assertion(format!(
                        "same input rendered differently: first {first:?}, then {second:?}"
                    )));
                }
                scenario.expectation.validate(&observed)?;
            }
        }

        advance(state, ScenarioState::Done);
        Ok(())
    }

    async fn clear<P: PageDriver>(&self, page: &mut P) -> ProbeResult<()> {
        let clear = self.config.clear_locator();
        if !page.is_visible(&clear).await? {
            return Err(ProbeError::assertion(format!("{clear} is not visible")));
        }
        page.click(&clear).await
    }

    /// Run scenarios with bounded parallelism
    pub async fn run_all(&self, scenarios: &[Scenario]) -> SuiteReport {
        self.run_all_with(scenarios, |_| {}).await
    }

    /// Run scenarios, calling `on_outcome` as each one finishes. Outcomes
    /// keep the order of `scenarios`. With fail-fast, the first failure
    /// stops new scenarios from starting; those already running finish and
    /// close their pages, the rest are counted as skipped.
    pub async fn run_all_with(
        &self,
        scenarios: &[Scenario],
        mut on_outcome: impl FnMut(&ScenarioOutcome),
    ) -> SuiteReport {
        let start = Instant::now();
        let jobs = self.config.effective_jobs().max(1);
        tracing::info!(scenarios = scenarios.len(), jobs, "starting run");

        let stopped = AtomicBool::new(false);
        let stopped = &stopped;
        let mut stream = futures::stream::iter(scenarios.iter().map(|s| async move {
            if stopped.load(Ordering::SeqCst) {
                None
            } else {
                Some(self.run(s).await)
            }
        }))
        .buffered(jobs);

        let mut outcomes = Vec::with_capacity(scenarios.len());
        while let Some(outcome) = stream.next().await {
            let Some(outcome) = outcome else {
                continue;
            };
            on_outcome(&outcome);
            if !outcome.passed
                && self.config.fail_fast
                && !stopped.swap(true, Ordering::SeqCst)
            {
                tracing::warn!("fail-fast: no new scenarios will start");
            }
            outcomes.push(outcome);
        }

        let skipped = scenarios.len() - outcomes.len();
        SuiteReport::new(outcomes, skipped, start.elapsed())
    }
}

fn advance(state: &mut ScenarioState, next: ScenarioState) {
    tracing::debug!(from = %state, to = %next, "state");
    *state = next;
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::assertion::Expectation;
    use crate::driver::{MockPageFactory, MockSite};
    use crate::result::ErrorKind;
    use crate::wait::Readiness;
    use std::time::Duration;

    fn site() -> MockSite {
        MockSite::new()
            .with_translation("aayuboovan nimal!", "ආයුබෝවන් නිමල්!")
            .with_translation("mama gedhara yanavaa", "මම ගෙදර යනවා")
            .with_translation("mamagedharayanawa", "මමගෙදරයනවා")
            .with_render_after_polls(2)
    }

    fn config() -> ProbeConfig {
        ProbeConfig::new()
            .with_base_url("https://mock.test/")
            .with_poll_interval(1)
            .with_timeout_override(Some(200))
            .with_jobs(2)
    }

    fn runner(site: MockSite) -> ScenarioRunner<MockPageFactory> {
        ScenarioRunner::new(MockPageFactory::new(site), config())
    }

    mod translate_tests {
        use super::*;

        #[tokio::test]
        async fn test_positive_scenario_passes() {
            let scenario = Scenario::new(
                "Pos_Fun_0001",
                "aayuboovan nimal!",
                Expectation::contains("ආයුබෝවන් නිමල්!"),
            );
            let outcome = runner(site()).run(&scenario).await;
            assert!(outcome.passed, "{:?}", outcome.message);
            assert_eq!(outcome.state, ScenarioState::Done);
        }

        #[tokio::test]
        async fn test_negative_scenario_passes_when_output_differs() {
            let scenario = Scenario::new(
                "Neg_Fun_0001",
                "mamagedharayanawa",
                Expectation::not_contains("මම ගෙදර යනවා"),
            );
            let outcome = runner(site()).run(&scenario).await;
            assert!(outcome.passed, "{:?}", outcome.message);
        }

        #[tokio::test]
        async fn test_negative_scenario_fails_on_ideal_output() {
            let scenario = Scenario::new(
                "Neg",
                "mama gedhara yanavaa",
                Expectation::not_contains("මම ගෙදර යනවා"),
            );
            let outcome = runner(site()).run(&scenario).await;
            assert!(!outcome.passed);
            assert_eq!(outcome.state, ScenarioState::Asserted);
            assert_eq!(outcome.error_kind, Some(ErrorKind::Assertion));
        }

        #[tokio::test]
        async fn test_timeout_stops_in_awaiting() {
            let scenario = Scenario::new("Pos", "unknown", Expectation::contains("මම"));
            let outcome = runner(site()).run(&scenario).await;
            assert!(!outcome.passed);
            assert_eq!(outcome.state, ScenarioState::Awaiting);
            assert_eq!(outcome.error_kind, Some(ErrorKind::Timeout));
        }

        #[tokio::test]
        async fn test_empty_input_with_settle() {
            let scenario = Scenario::new("Neg_Fun_0006", "", Expectation::not_contains("මම ගෙදර යනවා"))
                .with_readiness(Readiness::settle_ms(5));
            let r = runner(site());
            let outcome = r.run(&scenario).await;
            assert!(outcome.passed, "{:?}", outcome.message);
        }

        #[tokio::test]
        async fn test_repeated_input_does_not_hang() {
            let long = "mama gedhara yanavaa ".repeat(40);
            let scenario = Scenario::new("Neg_Fun_0008", long.as_str(), Expectation::not_contains("මම ගෙදර යනවා"));
            let started = Instant::now();
            let outcome = runner(site().with_translation(long.clone(), "මම ගෙදර යනවා ".repeat(40)))
                .run(&scenario)
                .await;
            assert!(started.elapsed() < Duration::from_secs(2));
            // Ideal output for every repetition is a failing negative case
            assert!(!outcome.passed);
            assert_eq!(outcome.state, ScenarioState::Asserted);
        }

        #[tokio::test]
        async fn test_navigation_failure_stops_at_start() {
            let scenario = Scenario::new("Pos", "mama", Expectation::contains("මම"));
            let outcome = runner(site().unreachable()).run(&scenario).await;
            assert!(!outcome.passed);
            assert_eq!(outcome.state, ScenarioState::NotStarted);
            assert_eq!(outcome.error_kind, Some(ErrorKind::Browser));
        }

        #[tokio::test]
        async fn test_page_closed_after_each_scenario() {
            let r = runner(site());
            let scenario = Scenario::new("Pos", "unknown", Expectation::contains("මම"));
            let _ = r.run(&scenario).await;
            assert_eq!(r.factory().pages_opened(), 1);
        }
    }

    mod clear_tests {
        use super::*;

        fn clear_scenario() -> Scenario {
            Scenario::new(
                "Pos_UI_0001",
                "mama gedhara yanavaa",
                Expectation::not_contains("මම ගෙදර යනවා"),
            )
            .with_flow(Flow::ClearAndVerify)
        }

        #[tokio::test]
        async fn test_clear_resets_input_and_output() {
            let outcome = runner(site()).run(&clear_scenario()).await;
            assert!(outcome.passed, "{:?}", outcome.message);
        }

        #[tokio::test]
        async fn test_stale_output_fails() {
            let outcome = runner(site().with_stale_output_on_clear())
                .run(&clear_scenario())
                .await;
            assert!(!outcome.passed);
            assert_eq!(outcome.error_kind, Some(ErrorKind::Assertion));
        }

        #[tokio::test]
        async fn test_missing_clear_label() {
            let outcome = runner(site().with_clear_label(None))
                .run(&clear_scenario())
                .await;
            assert!(!outcome.passed);
            assert_eq!(outcome.error_kind, Some(ErrorKind::Locator));
            assert_eq!(outcome.state, ScenarioState::Awaiting);
        }

        #[tokio::test]
        async fn test_hidden_clear() {
            let outcome = runner(site().with_hidden_clear())
                .run(&clear_scenario())
                .await;
            assert!(!outcome.passed);
            assert!(outcome.message.unwrap().contains("not visible"));
        }

        #[tokio::test]
        async fn test_duplicate_clear_labels_are_ambiguous() {
            let site = site().with_clear_label(Some("Clear all"));
            let mut cfg = config();
            cfg.clear_label = "Clear all".to_string();
            let outcome = ScenarioRunner::new(MockPageFactory::new(site), cfg)
                .run(&clear_scenario())
                .await;
            assert!(!outcome.passed);
            assert_eq!(outcome.error_kind, Some(ErrorKind::Locator));
            assert!(outcome.message.unwrap().contains("matched 2 elements"));
        }
    }

    mod repeat_tests {
        use super::*;

        #[tokio::test]
        async fn test_same_output_twice() {
            let scenario = Scenario::new(
                "Pos_UI_0002",
                "mama gedhara yanavaa",
                Expectation::contains("මම ගෙදර යනවා"),
            )
            .with_flow(Flow::RepeatAfterClear);
            let outcome = runner(site()).run(&scenario).await;
            assert!(outcome.passed, "{:?}", outcome.message);
            assert_eq!(outcome.state, ScenarioState::Done);
        }

        #[tokio::test]
        async fn test_output_left_by_clear_fails() {
            let scenario = Scenario::new(
                "Pos_UI_0002",
                "mama gedhara yanavaa",
                Expectation::contains("මම ගෙදර යනවා"),
            )
            .with_flow(Flow::RepeatAfterClear);
            let outcome = runner(site().with_stale_output_on_clear())
                .run(&scenario)
                .await;
            assert!(!outcome.passed);
            assert_eq!(outcome.error_kind, Some(ErrorKind::Assertion));
            assert_eq!(outcome.state, ScenarioState::Awaiting);
            assert!(outcome.message.unwrap().contains("survived Clear"));
        }
    }

    mod run_all_tests {
        use super::*;

        fn mixed() -> Vec<Scenario> {
            vec![
                Scenario::new("A", "aayuboovan nimal!", Expectation::contains("ආයුබෝවන් නිමල්!")),
                Scenario::new("B", "unknown", Expectation::contains("මම")),
                Scenario::new("C", "mama gedhara yanavaa", Expectation::contains("මම ගෙදර යනවා")),
            ]
        }

        #[tokio::test]
        async fn test_outcomes_keep_order() {
            let r = runner(site());
            let mut seen = Vec::new();
            let report = r.run_all_with(&mixed(), |o| seen.push(o.id.clone())).await;
            assert_eq!(report.total(), 3);
            assert_eq!(report.passed(), 2);
            assert_eq!(report.failed(), 1);
            assert_eq!(seen, vec!["A", "B", "C"]);
            assert_eq!(r.factory().pages_opened(), 3);
        }

        #[tokio::test]
        async fn test_fail_fast_skips_rest() {
            let r = ScenarioRunner::new(
                MockPageFactory::new(site()),
                config().with_jobs(1).with_fail_fast(true),
            );
            let report = r.run_all(&mixed()).await;
            assert_eq!(report.outcomes.len(), 2);
            assert_eq!(report.skipped, 1);
            assert!(!report.all_passed());
        }

        #[tokio::test]
        async fn test_fail_fast_lets_running_scenarios_close() {
            let quick_failure = Scenario::new(
                "Q",
                "mama gedhara yanavaa",
                Expectation::contains("ආයුබෝවන්"),
            )
            .with_readiness(Readiness::settle_ms(1));
            let slow_failure = Scenario::new("S", "unknown", Expectation::contains("මම"));
            let scenarios = vec![
                quick_failure,
                slow_failure,
                mixed()[0].clone(),
                mixed()[2].clone(),
            ];
            let r = ScenarioRunner::new(
                MockPageFactory::new(site()),
                config().with_jobs(2).with_fail_fast(true),
            );
            let report = r.run_all(&scenarios).await;
            assert_eq!(report.outcomes.len(), 2);
            assert_eq!(report.outcomes[0].id, "Q");
            assert_eq!(report.outcomes[1].id, "S");
            assert_eq!(report.skipped, 2);
            assert_eq!(r.factory().pages_opened(), 2);
            assert_eq!(r.factory().pages_closed(), 2);
        }

        #[tokio::test]
        async fn test_empty_run() {
            let report = runner(site()).run_all(&[]).await;
            assert_eq!(report.total(), 0);
            assert!(report.all_passed());
        }
    }
}
