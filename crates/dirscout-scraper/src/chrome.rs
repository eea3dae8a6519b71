//! [`PageDriver`] backed by a headless Chrome session.
//!
//! All calls block; callers run the session on a blocking thread. The
//! Chrome process is shut down when the driver is dropped.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use dirscout_core::BrowserSettings;
use headless_chrome::{Browser, LaunchOptions, Tab};

use crate::driver::{DriverError, PageDriver};

const WINDOW_SIZE: (u32, u32) = (1366, 900);
const IDLE_TIMEOUT: Duration = Duration::from_secs(300);

pub struct ChromeDriver {
    tab: Arc<Tab>,
    // Dropped after `tab`; owns the Chrome child process.
    browser: Browser,
}

impl ChromeDriver {
    /// Launches Chrome and opens the tab every page is loaded into.
    ///
    /// The sandbox is disabled inside containers (detected via `/.dockerenv`),
    /// where Chrome cannot start with it.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Session`] if Chrome cannot be launched.
    pub fn launch(settings: &BrowserSettings) -> Result<Self, DriverError> {
        let is_container = Path::new("/.dockerenv").exists();

        let options = LaunchOptions::default_builder()
            .headless(settings.headless)
            .sandbox(!is_container)
            .path(settings.chrome_path.clone())
            .window_size(Some(WINDOW_SIZE))
            .idle_browser_timeout(IDLE_TIMEOUT)
            .build()
            .map_err(|e| DriverError::Session(format!("invalid Chrome launch options: {e}")))?;

        let browser = Browser::new(options)
            .map_err(|e| DriverError::Session(format!("failed to launch headless Chrome: {e}")))?;
        let tab = browser
            .new_tab()
            .map_err(|e| DriverError::Session(format!("failed to open tab: {e}")))?;

        tracing::info!(
            headless = settings.headless,
            sandbox = !is_container,
            "browser session started"
        );

        Ok(Self { tab, browser })
    }

    /// Re-labels `err` as a session failure when the browser no longer
    /// answers, so a crashed Chrome aborts the run instead of skipping
    /// every remaining page.
    fn check_session(&self, err: DriverError) -> DriverError {
        let liveness = self.browser.get_version().map(|_| ()).map_err(|e| e.to_string());
        classify_failure(err, liveness)
    }

    fn evaluate(&self, script: &str) -> Result<serde_json::Value, DriverError> {
        let result = self
            .tab
            .evaluate(script, false)
            .map_err(|e| self.check_session(DriverError::Script(e.to_string())))?;
        Ok(result.value.unwrap_or(serde_json::Value::Null))
    }
}

/// Keeps a page-level `err` when the browser is alive, otherwise turns it
/// into [`DriverError::Session`].
fn classify_failure(err: DriverError, liveness: Result<(), String>) -> DriverError {
    match liveness {
        Ok(()) => err,
        Err(reason) if err.is_page_level() => {
            tracing::error!(error = %err, %reason, "browser stopped responding");
            DriverError::Session(format!("browser unreachable after \"{err}\": {reason}"))
        }
        Err(_) => err,
    }
}

/// Renders `selector` as a JavaScript string literal.
fn js_string(selector: &str) -> Result<String, DriverError> {
    serde_json::to_string(selector).map_err(|e| DriverError::Script(e.to_string()))
}

impl PageDriver for ChromeDriver {
    fn navigate(&mut self, url: &str) -> Result<(), DriverError> {
        let navigation_error = |e: &dyn std::fmt::Display| DriverError::Navigation {
            url: url.to_string(),
            reason: e.to_string(),
        };
        self.tab
            .navigate_to(url)
            .map_err(|e| self.check_session(navigation_error(&e)))?;
        self.tab
            .wait_until_navigated()
            .map_err(|e| self.check_session(navigation_error(&e)))?;
        Ok(())
    }

    fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<(), DriverError> {
        self.tab
            .wait_for_element_with_custom_timeout(selector, timeout)
            .map(|_| ())
            .map_err(|e| {
                tracing::debug!(selector, error = %e, "wait_for gave up");
                self.check_session(DriverError::Timeout {
                    selector: selector.to_string(),
                    timeout_ms: timeout.as_millis(),
                })
            })
    }

    fn count(&mut self, selector: &str) -> Result<usize, DriverError> {
        let script = format!(
            "document.querySelectorAll({}).length",
            js_string(selector)?
        );
        let value = self.evaluate(&script)?;
        value
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| DriverError::Script(format!("unexpected count result: {value}")))
    }

    fn scroll_to_bottom(&mut self, container: &str) -> Result<(), DriverError> {
        let script = format!(
            "(() => {{ const el = document.querySelector({}); \
             if (!el) {{ return false; }} \
             el.scrollTop = el.scrollHeight; return true; }})()",
            js_string(container)?
        );
        if self.evaluate(&script)? != serde_json::Value::Bool(true) {
            tracing::debug!(container, "scroll container not found");
        }
        Ok(())
    }

    fn click(&mut self, selector: &str) -> Result<bool, DriverError> {
        let element = match self.tab.find_element(selector) {
            Ok(element) => element,
            Err(e) => {
                let not_found = DriverError::Script(format!("no element for \"{selector}\": {e}"));
                return match self.check_session(not_found) {
                    DriverError::Session(reason) => Err(DriverError::Session(reason)),
                    _ => Ok(false),
                };
            }
        };
        element.click().map(|_| true).map_err(|e| {
            self.check_session(DriverError::Script(format!(
                "click on \"{selector}\" failed: {e}"
            )))
        })
    }

    fn content(&mut self) -> Result<String, DriverError> {
        self.tab
            .get_content()
            .map_err(|e| {
                self.check_session(DriverError::Script(format!(
                    "failed to read page source: {e}"
                )))
            })
    }
}
