//! Browser control over the Chrome DevTools Protocol.
//!
//! [`BrowserConfig`] is always available so configuration files parse
//! without the `browser` feature. The CDP implementation of
//! [`PageFactory`](crate::driver::PageFactory) and
//! [`PageDriver`](crate::driver::PageDriver) requires the feature.

use serde::{Deserialize, Serialize};

/// Default navigation timeout (30 seconds)
pub const DEFAULT_NAVIGATION_TIMEOUT_MS: u64 = 30_000;

/// Raw body text, whitespace and hidden nodes included. Assertions and
/// literal readiness read this.
pub(crate) const BODY_TEXT_SCRIPT: &str = "document.body ? document.body.textContent : ''";

/// Layout-aware body text. Only the Sinhala pattern readiness reads this.
pub(crate) const RENDERED_TEXT_SCRIPT: &str = "document.body ? document.body.innerText : ''";

/// Browser configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
    /// Budget for a single page load in milliseconds
    pub navigation_timeout_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 800,
            chromium_path: None,
            sandbox: true,
            navigation_timeout_ms: DEFAULT_NAVIGATION_TIMEOUT_MS,
        }
    }
}

impl BrowserConfig {
    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Set the navigation timeout
    #[must_use]
    pub const fn with_navigation_timeout(mut self, ms: u64) -> Self {
        self.navigation_timeout_ms = ms;
        self
    }
}

// ============================================================================
// Real CDP Implementation (when `browser` feature is enabled)
// ============================================================================

#[cfg(feature = "browser")]
mod cdp {
    use super::{BrowserConfig, BODY_TEXT_SCRIPT, RENDERED_TEXT_SCRIPT};
    use crate::driver::{PageDriver, PageFactory};
    use crate::locator::{Action, ActionReply, Locator};
    use crate::result::{ProbeError, ProbeResult};
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::page::Page as CdpPage;
    use futures::StreamExt;
    use serde::de::DeserializeOwned;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Mutex;

    /// Chromium instance handing out one page per scenario
    #[derive(Debug)]
    pub struct ChromiumBrowser {
        config: BrowserConfig,
        inner: Arc<Mutex<CdpBrowser>>,
        handle: tokio::task::JoinHandle<()>,
    }

    impl ChromiumBrowser {
        /// Launch a new browser instance
        ///
        /// # Errors
        ///
        /// Returns error if browser cannot be launched
        pub async fn launch(config: BrowserConfig) -> ProbeResult<Self> {
            let mut builder = CdpConfig::builder()
                .window_size(config.viewport_width, config.viewport_height);

            if !config.headless {
                builder = builder.with_head();
            }

            if !config.sandbox {
                builder = builder.no_sandbox();
            }

            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }

            let cdp_config = builder
                .build()
                .map_err(|message| ProbeError::BrowserLaunch { message })?;

            let (browser, mut handler) = CdpBrowser::launch(cdp_config).await.map_err(|e| {
                ProbeError::BrowserLaunch {
                    message: e.to_string(),
                }
            })?;

            let handle = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if let Err(e) = event {
                        tracing::debug!(error = %e, "CDP handler stopped");
                        break;
                    }
                }
            });

            tracing::info!(headless = config.headless, "browser launched");
            Ok(Self {
                config,
                inner: Arc::new(Mutex::new(browser)),
                handle,
            })
        }

        /// Get the browser configuration
        #[must_use]
        pub const fn config(&self) -> &BrowserConfig {
            &self.config
        }

        /// Close the browser
        pub async fn close(self) -> ProbeResult<()> {
            {
                let mut browser = self.inner.lock().await;
                browser
                    .close()
                    .await
                    .map_err(|e| ProbeError::page(e.to_string()))?;
                // Reap the chromium child process.
                let _ = browser.wait().await;
            }
            self.handle.abort();
            Ok(())
        }
    }

    #[async_trait]
    impl PageFactory for ChromiumBrowser {
        type Page = ChromiumPage;

        async fn new_page(&self) -> ProbeResult<ChromiumPage> {
            let browser = self.inner.lock().await;
            let page = browser
                .new_page("about:blank")
                .await
                .map_err(|e| ProbeError::page(e.to_string()))?;
            Ok(ChromiumPage {
                page: Some(page),
                navigation_timeout: Duration::from_millis(self.config.navigation_timeout_ms),
            })
        }
    }

    /// A single Chromium tab
    #[derive(Debug)]
    pub struct ChromiumPage {
        page: Option<CdpPage>,
        navigation_timeout: Duration,
    }

    impl ChromiumPage {
        fn inner(&self) -> ProbeResult<&CdpPage> {
            self.page
                .as_ref()
                .ok_or_else(|| ProbeError::page("page is closed"))
        }

        /// Evaluate an expression and deserialize its value
        pub async fn eval<T: DeserializeOwned>(&self, script: &str) -> ProbeResult<T> {
            let result = self
                .inner()?
                .evaluate(script)
                .await
                .map_err(|e| ProbeError::page(e.to_string()))?;
            result
                .into_value()
                .map_err(|e| ProbeError::page(format!("unexpected script result: {e}")))
        }

        async fn act(&self, locator: &Locator, action: &Action) -> ProbeResult<serde_json::Value> {
            tracing::trace!(action = action.name(), %locator, "evaluating action");
            let reply: ActionReply = self.eval(&locator.action_script(action)).await?;
            locator.accept(reply)
        }
    }

    #[async_trait]
    impl PageDriver for ChromiumPage {
        async fn goto(&mut self, url: &str) -> ProbeResult<()> {
            let page = self.inner()?;
            let navigation = tokio::time::timeout(self.navigation_timeout, page.goto(url));
            match navigation.await {
                Ok(Ok(_)) => Ok(()),
                Ok(Err(e)) => Err(ProbeError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                }),
                Err(_) => Err(ProbeError::Navigation {
                    url: url.to_string(),
                    message: format!(
                        "no load within {}ms",
                        self.navigation_timeout.as_millis()
                    ),
                }),
            }
        }

        async fn fill(&mut self, locator: &Locator, text: &str) -> ProbeResult<()> {
            self.act(locator, &Action::Fill(text.to_string()))
                .await
                .map(|_| ())
        }

        async fn click(&mut self, locator: &Locator) -> ProbeResult<()> {
            self.act(locator, &Action::Click).await.map(|_| ())
        }

        async fn count(&self, locator: &Locator) -> ProbeResult<usize> {
            self.eval(&locator.selector().to_count_query()).await
        }

        async fn input_value(&self, locator: &Locator) -> ProbeResult<String> {
            let value = self.act(locator, &Action::InputValue).await?;
            Ok(value.as_str().unwrap_or_default().to_string())
        }

        async fn is_visible(&self, locator: &Locator) -> ProbeResult<bool> {
            let value = self.act(locator, &Action::IsVisible).await?;
            Ok(value.as_bool().unwrap_or(false))
        }

        async fn body_text(&self) -> ProbeResult<String> {
            self.eval(BODY_TEXT_SCRIPT).await
        }

        async fn rendered_text(&self) -> ProbeResult<String> {
            self.eval(RENDERED_TEXT_SCRIPT).await
        }

        async fn close(&mut self) -> ProbeResult<()> {
            if let Some(page) = self.page.take() {
                page.close()
                    .await
                    .map_err(|e| ProbeError::page(e.to_string()))?;
            }
            Ok(())
        }
    }
}

#[cfg(feature = "browser")]
pub use cdp::{ChromiumBrowser, ChromiumPage};
