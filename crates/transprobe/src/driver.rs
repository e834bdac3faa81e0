//! Page driver abstraction.
//!
//! [`PageDriver`] is the seam between the scenario runner and a browser
//! page; [`PageFactory`] hands out a fresh page per scenario. The CDP
//! implementation lives in [`crate::browser`] behind the `browser` feature.
//! [`MockPage`] models the translator page in memory for unit tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::locator::{Locator, Selector};
use crate::result::{ProbeError, ProbeResult};

/// Operations the runner performs on a page
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate to a URL and wait for the load to complete
    async fn goto(&mut self, url: &str) -> ProbeResult<()>;

    /// Replace the value of the single control matched by `locator`
    async fn fill(&mut self, locator: &Locator, text: &str) -> ProbeResult<()>;

    /// Click the single element matched by `locator`
    async fn click(&mut self, locator: &Locator) -> ProbeResult<()>;

    /// Number of elements matched by `locator`
    async fn count(&self, locator: &Locator) -> ProbeResult<usize>;

    /// Current value of the single control matched by `locator`
    async fn input_value(&self, locator: &Locator) -> ProbeResult<String>;

    /// Whether the single element matched by `locator` is visible
    async fn is_visible(&self, locator: &Locator) -> ProbeResult<bool>;

    /// Text content of the document body, whitespace preserved
    async fn body_text(&self) -> ProbeResult<String>;

    /// Body text as laid out on screen: whitespace runs collapsed, hidden
    /// nodes dropped
    async fn rendered_text(&self) -> ProbeResult<String>;

    /// Close the page
    async fn close(&mut self) -> ProbeResult<()>;
}

/// Source of fresh pages, one per scenario
#[async_trait]
pub trait PageFactory: Send + Sync {
    /// Page type produced
    type Page: PageDriver;

    /// Open a new blank page
    async fn new_page(&self) -> ProbeResult<Self::Page>;
}

// =============================================================================
// MOCK SITE
// =============================================================================

/// Static page chrome rendered around the output
const MOCK_CHROME: &str = "Swift Translator\nSinglish\nSinhala\nClear\nClear all";

/// Behaviour of the simulated translator site
#[derive(Debug, Clone, Default)]
pub struct MockSite {
    translations: HashMap<String, String>,
    render_after_polls: usize,
    unreachable: bool,
    clear_label: Option<String>,
    clear_hidden: bool,
    clear_keeps_output: bool,
}

impl MockSite {
    /// A site with a labeled "Clear" control and instant output
    #[must_use]
    pub fn new() -> Self {
        Self {
            clear_label: Some("Clear".to_string()),
            ..Self::default()
        }
    }

    /// Map an exact input to its rendered output
    #[must_use]
    pub fn with_translation(mut self, input: impl Into<String>, output: impl Into<String>) -> Self {
        self.translations.insert(input.into(), output.into());
        self
    }

    /// Output appears only on the n-th body read after a fill
    #[must_use]
    pub const fn with_render_after_polls(mut self, polls: usize) -> Self {
        self.render_after_polls = polls;
        self
    }

    /// Navigation fails
    #[must_use]
    pub const fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    /// Change or remove the accessible label of the Clear control
    #[must_use]
    pub fn with_clear_label(mut self, label: Option<&str>) -> Self {
        self.clear_label = label.map(str::to_string);
        self
    }

    /// Render the Clear control with zero size
    #[must_use]
    pub const fn with_hidden_clear(mut self) -> Self {
        self.clear_hidden = true;
        self
    }

    /// Clear resets the input but leaves the previous output on screen
    #[must_use]
    pub const fn with_stale_output_on_clear(mut self) -> Self {
        self.clear_keeps_output = true;
        self
    }

    /// Output for an input. Unknown inputs are echoed back unchanged.
    #[must_use]
    pub fn translate(&self, input: &str) -> String {
        self.translations
            .get(input)
            .cloned()
            .unwrap_or_else(|| input.to_string())
    }
}

// =============================================================================
// MOCK PAGE
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
struct MockElement {
    tag: &'static str,
    id: &'static str,
    role: Option<&'static str>,
    label: Option<String>,
    text: &'static str,
    visible: bool,
}

impl MockElement {
    fn matches(&self, selector: &Selector) -> bool {
        match selector {
            Selector::Css(css) => css
                .split(',')
                .map(str::trim)
                .any(|part| part == self.tag || part.strip_prefix('#') == Some(self.id)),
            Selector::Label(text) => self.label.as_deref().map(str::trim) == Some(text.trim()),
            Selector::Role { role, name } => {
                self.role == Some(role.as_str())
                    && name.as_ref().map_or(true, |n| {
                        self.label
                            .as_deref()
                            .unwrap_or(self.text)
                            .to_lowercase()
                            .contains(&n.to_lowercase())
                    })
            }
        }
    }
}

/// In-memory translator page: a text area, an output region and two
/// Clear buttons whose names both contain "clear"
#[derive(Debug)]
pub struct MockPage {
    site: Arc<MockSite>,
    url: Option<String>,
    input: String,
    output: String,
    polls: AtomicUsize,
    closed: bool,
    close_counter: Option<Arc<AtomicUsize>>,
    /// Call history for verification
    pub call_history: Vec<String>,
}

impl MockPage {
    /// Create a blank page for `site`
    #[must_use]
    pub fn new(site: Arc<MockSite>) -> Self {
        Self {
            site,
            url: None,
            input: String::new(),
            output: String::new(),
            polls: AtomicUsize::new(0),
            closed: false,
            close_counter: None,
            call_history: Vec::new(),
        }
    }

    /// Bump `counter` when the page is closed
    #[must_use]
    pub fn with_close_counter(mut self, counter: Arc<AtomicUsize>) -> Self {
        self.close_counter = Some(counter);
        self
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> &[String] {
        &self.call_history
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.call_history.iter().any(|c| c.starts_with(method))
    }

    /// Whether `close` has been called
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    fn elements(&self) -> Vec<MockElement> {
        if self.url.is_none() {
            return Vec::new();
        }
        vec![
            MockElement {
                tag: "textarea",
                id: "input",
                role: Some("textbox"),
                label: Some("Singlish".to_string()),
                text: "",
                visible: true,
            },
            MockElement {
                tag: "div",
                id: "output",
                role: None,
                label: None,
                text: "",
                visible: true,
            },
            MockElement {
                tag: "button",
                id: "clear",
                role: Some("button"),
                label: self.site.clear_label.clone(),
                text: "Clear",
                visible: !self.site.clear_hidden,
            },
            MockElement {
                tag: "button",
                id: "clear-all",
                role: Some("button"),
                label: Some("Clear all".to_string()),
                text: "Clear all",
                visible: true,
            },
        ]
    }

    fn resolve(&self, locator: &Locator) -> ProbeResult<MockElement> {
        let matches: Vec<MockElement> = self
            .elements()
            .into_iter()
            .filter(|e| e.matches(locator.selector()))
            .collect();
        locator.check_count(matches.len())?;
        matches
            .into_iter()
            .next()
            .ok_or_else(|| ProbeError::ElementNotFound {
                selector: locator.to_string(),
            })
    }

    fn ensure_open(&self) -> ProbeResult<()> {
        if self.closed {
            return Err(ProbeError::page("page is closed"));
        }
        Ok(())
    }
}

#[async_trait]
impl PageDriver for MockPage {
    async fn goto(&mut self, url: &str) -> ProbeResult<()> {
        self.ensure_open()?;
        self.call_history.push(format!("goto:{url}"));
        if self.site.unreachable {
            return Err(ProbeError::Navigation {
                url: url.to_string(),
                message: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            });
        }
        self.url = Some(url.to_string());
        self.input.clear();
        self.output.clear();
        Ok(())
    }

    async fn fill(&mut self, locator: &Locator, text: &str) -> ProbeResult<()> {
        self.ensure_open()?;
        self.call_history.push(format!("fill:{locator}"));
        let element = self.resolve(locator)?;
        if element.tag != "textarea" {
            return Err(ProbeError::Input {
                message: format!("{locator} is not an editable control"),
            });
        }
        self.input = text.to_string();
        self.output = if text.is_empty() {
            String::new()
        } else {
            self.site.translate(text)
        };
        self.polls.store(0, Ordering::SeqCst);
        Ok(())
    }

    async fn click(&mut self, locator: &Locator) -> ProbeResult<()> {
        self.ensure_open()?;
        self.call_history.push(format!("click:{locator}"));
        let element = self.resolve(locator)?;
        if element.tag == "button" {
            self.input.clear();
            if !self.site.clear_keeps_output {
                self.output.clear();
            }
        }
        Ok(())
    }

    async fn count(&self, locator: &Locator) -> ProbeResult<usize> {
        self.ensure_open()?;
        Ok(self
            .elements()
            .iter()
            .filter(|e| e.matches(locator.selector()))
            .count())
    }

    async fn input_value(&self, locator: &Locator) -> ProbeResult<String> {
        self.ensure_open()?;
        let element = self.resolve(locator)?;
        Ok(if element.tag == "textarea" {
            self.input.clone()
        } else {
            String::new()
        })
    }

    async fn is_visible(&self, locator: &Locator) -> ProbeResult<bool> {
        self.ensure_open()?;
        Ok(self.resolve(locator)?.visible)
    }

    async fn body_text(&self) -> ProbeResult<String> {
        self.ensure_open()?;
        if self.url.is_none() {
            return Ok(String::new());
        }
        let polls = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.output.is_empty() || polls < self.site.render_after_polls {
            return Ok(MOCK_CHROME.to_string());
        }
        Ok(format!("{MOCK_CHROME}\n{}", self.output))
    }

    async fn rendered_text(&self) -> ProbeResult<String> {
        let text = self.body_text().await?;
        Ok(text
            .lines()
            .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
            .collect::<Vec<_>>()
            .join("\n"))
    }

    async fn close(&mut self) -> ProbeResult<()> {
        self.call_history.push("close".to_string());
        if !self.closed {
            if let Some(ref counter) = self.close_counter {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        }
        self.closed = true;
        Ok(())
    }
}

/// Factory of [`MockPage`]s sharing one [`MockSite`]
#[derive(Debug)]
pub struct MockPageFactory {
    site: Arc<MockSite>,
    opened: AtomicUsize,
    closed: Arc<AtomicUsize>,
}

impl MockPageFactory {
    /// Create a factory for `site`
    #[must_use]
    pub fn new(site: MockSite) -> Self {
        Self {
            site: Arc::new(site),
            opened: AtomicUsize::new(0),
            closed: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of pages handed out so far
    #[must_use]
    pub fn pages_opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Number of handed-out pages closed so far
    #[must_use]
    pub fn pages_closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFactory for MockPageFactory {
    type Page = MockPage;

    async fn new_page(&self) -> ProbeResult<MockPage> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(MockPage::new(Arc::clone(&self.site)).with_close_counter(Arc::clone(&self.closed)))
    }
}
