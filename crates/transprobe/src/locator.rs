//! Locator abstraction for element selection and interaction.
//!
//! Locators are strict: an action resolves the selector against the live
//! page and refuses to act unless exactly one element matches. Zero matches
//! surface as [`ProbeError::ElementNotFound`], several as
//! [`ProbeError::LocatorAmbiguous`].
//!
//! Every selector compiles to a JavaScript expression producing an array of
//! elements, so the same locator drives both the count query and the action
//! script evaluated by a [`PageDriver`](crate::driver::PageDriver).

use serde::Deserialize;
use std::time::Duration;

use crate::result::{ProbeError, ProbeResult};

/// Default timeout for a locator to resolve (10 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Default polling interval while waiting for a locator (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Encode a Rust string as a JavaScript string literal.
fn js_string(s: &str) -> String {
    serde_json::Value::String(s.to_owned()).to_string()
}

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// CSS selector (e.g., "textarea")
    Css(String),
    /// Accessible label: `aria-label`, `title` or an associated `<label>`,
    /// compared exactly after trimming
    Label(String),
    /// ARIA role with an optional case-insensitive accessible-name substring
    Role {
        /// Role name (button, textbox, link, ...)
        role: String,
        /// Accessible name fragment
        name: Option<String>,
    },
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create a label selector
    #[must_use]
    pub fn label(text: impl Into<String>) -> Self {
        Self::Label(text.into())
    }

    /// Create a role selector
    #[must_use]
    pub fn role(role: impl Into<String>) -> Self {
        Self::Role {
            role: role.into(),
            name: None,
        }
    }

    /// Restrict a role selector by accessible name; no-op for other selectors
    #[must_use]
    pub fn with_name(self, name: impl Into<String>) -> Self {
        match self {
            Self::Role { role, .. } => Self::Role {
                role,
                name: Some(name.into()),
            },
            other => other,
        }
    }

    /// CSS that matches the implicit and explicit forms of an ARIA role
    #[must_use]
    pub fn role_css(role: &str) -> String {
        match role {
            "button" => {
                "button, input[type=button], input[type=submit], input[type=reset], [role=button]"
                    .to_string()
            }
            "textbox" => {
                "textarea, input:not([type]), input[type=text], input[type=search], [role=textbox]"
                    .to_string()
            }
            "link" => "a[href], [role=link]".to_string(),
            other => format!("[role=\"{other}\"]"),
        }
    }

    /// Convert to a JavaScript expression evaluating to an array of elements
    #[must_use]
    pub fn to_query_all(&self) -> String {
        match self {
            Self::Css(s) => format!("Array.from(document.querySelectorAll({}))", js_string(s)),
            Self::Label(text) => format!(
                "Array.from(document.querySelectorAll('*')).filter(el => {{ \
                 const t = {t}; \
                 const attr = n => (el.getAttribute(n) || '').trim(); \
                 if (attr('aria-label') === t || attr('title') === t) return true; \
                 return Array.from(el.labels || []).some(l => l.textContent.trim() === t); }})",
                t = js_string(text)
            ),
            Self::Role { role, name } => {
                let base = format!(
                    "Array.from(document.querySelectorAll({}))",
                    js_string(&Self::role_css(role))
                );
                match name {
                    None => base,
                    Some(n) => format!(
                        "{base}.filter(el => (el.getAttribute('aria-label') || el.textContent \
                         || el.value || el.getAttribute('title') || '')\
                         .toLowerCase().includes({}))",
                        js_string(&n.to_lowercase())
                    ),
                }
            }
        }
    }

    /// Convert to query for counting matches
    #[must_use]
    pub fn to_count_query(&self) -> String {
        format!("{}.length", self.to_query_all())
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Css(s) => write!(f, "css={s}"),
            Self::Label(t) => write!(f, "label={t:?}"),
            Self::Role { role, name: None } => write!(f, "role={role}"),
            Self::Role {
                role,
                name: Some(n),
            } => write!(f, "role={role}[name~={n:?}]"),
        }
    }
}

/// An interaction performed on the single element a locator resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Replace the control's value and fire input events
    Fill(String),
    /// Click the element
    Click,
    /// Read the control's current value
    InputValue,
    /// Check whether the element is rendered and visible
    IsVisible,
}

impl Action {
    /// JavaScript function body taking the resolved element
    #[must_use]
    pub fn body(&self) -> String {
        match self {
            Self::Fill(value) => format!(
                "el => {{ \
                 const proto = el instanceof HTMLTextAreaElement \
                 ? HTMLTextAreaElement.prototype : HTMLInputElement.prototype; \
                 const setter = Object.getOwnPropertyDescriptor(proto, 'value').set; \
                 el.focus(); \
                 setter.call(el, {v}); \
                 el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
                 el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
                 el.dispatchEvent(new KeyboardEvent('keyup', {{ bubbles: true }})); \
                 return true; }}",
                v = js_string(value)
            ),
            Self::Click => "el => { el.click(); return true; }".to_string(),
            Self::InputValue => {
                "el => (el.value === undefined || el.value === null) ? '' : String(el.value)"
                    .to_string()
            }
            Self::IsVisible => "el => { \
                 const r = el.getBoundingClientRect(); \
                 const s = window.getComputedStyle(el); \
                 return r.width > 0 && r.height > 0 \
                 && s.visibility !== 'hidden' && s.display !== 'none'; }"
                .to_string(),
        }
    }

    /// Action name for logs and call history
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Fill(_) => "fill",
            Self::Click => "click",
            Self::InputValue => "input_value",
            Self::IsVisible => "is_visible",
        }
    }
}

/// Reply of an action script: how many elements matched and, when the
/// locator resolved, what the action returned.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ActionReply {
    /// Number of matching elements
    pub count: usize,
    /// Action result, `null` when the action did not run
    #[serde(default)]
    pub value: serde_json::Value,
}

/// Options for locator resolution
#[derive(Debug, Clone)]
pub struct LocatorOptions {
    /// Timeout for the element to appear
    pub timeout: Duration,
    /// Polling interval
    pub poll_interval: Duration,
    /// Whether to enforce strict mode (single element)
    pub strict: bool,
}

impl Default for LocatorOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            strict: true,
        }
    }
}

/// A locator for finding and interacting with elements
#[derive(Debug, Clone)]
pub struct Locator {
    selector: Selector,
    options: LocatorOptions,
}

impl Locator {
    /// Create a new locator from a selector
    #[must_use]
    pub fn from_selector(selector: Selector) -> Self {
        Self {
            selector,
            options: LocatorOptions::default(),
        }
    }

    /// Create a CSS locator
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::from_selector(Selector::css(selector))
    }

    /// Create a label locator
    #[must_use]
    pub fn label(text: impl Into<String>) -> Self {
        Self::from_selector(Selector::label(text))
    }

    /// Create a role locator with an accessible-name fragment
    #[must_use]
    pub fn role(role: impl Into<String>, name: impl Into<String>) -> Self {
        Self::from_selector(Selector::role(role).with_name(name))
    }

    /// Set a custom timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = timeout;
        self
    }

    /// Set the polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.options.poll_interval = interval;
        self
    }

    /// Disable strict mode (act on the first match)
    #[must_use]
    pub const fn with_strict(mut self, strict: bool) -> Self {
        self.options.strict = strict;
        self
    }

    /// Get the selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Get the options
    #[must_use]
    pub const fn options(&self) -> &LocatorOptions {
        &self.options
    }

    /// Validate a match count against strictness
    pub fn check_count(&self, count: usize) -> ProbeResult<()> {
        if count == 0 {
            return Err(ProbeError::ElementNotFound {
                selector: self.selector.to_string(),
            });
        }
        if self.options.strict && count > 1 {
            return Err(ProbeError::LocatorAmbiguous {
                selector: self.selector.to_string(),
                count,
            });
        }
        Ok(())
    }

    /// Script that resolves the locator, runs `action` on the single match
    /// and evaluates to an [`ActionReply`] object.
    #[must_use]
    pub fn action_script(&self, action: &Action) -> String {
        format!(
            "(() => {{ \
             const els = {query}; \
             if (els.length === 0 || ({strict} && els.length > 1)) \
             return {{ count: els.length, value: null }}; \
             return {{ count: els.length, value: ({body})(els[0]) }}; }})()",
            query = self.selector.to_query_all(),
            strict = self.options.strict,
            body = action.body(),
        )
    }

    /// Check an action reply and extract its value
    pub fn accept(&self, reply: ActionReply) -> ProbeResult<serde_json::Value> {
        self.check_count(reply.count)?;
        Ok(reply.value)
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.selector.fmt(f)
    }
}
