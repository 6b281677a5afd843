//! One controlled Chromium instance driving one page over CDP.

use crate::browser::{detect, wait::poll_until};
use crate::utils::error::{CheckerError, Result};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub headless: bool,
    pub chrome_path: Option<String>,
    pub navigation_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_path: None,
            navigation_timeout: Duration::from_secs(30),
        }
    }
}

/// A scoped browser process: acquired with [`BrowserSession::launch`],
/// released with [`close`](BrowserSession::close) on every exit path. Drop
/// aborts the CDP event task as a last resort.
pub struct BrowserSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
}

impl BrowserSession {
    pub async fn launch(config: &SessionConfig) -> Result<Self> {
        let Some(executable) = detect::detect_browser(config.chrome_path.as_deref()) else {
            return Err(CheckerError::BrowserLaunch(format!(
                "Chrome/Chromium not found. {}",
                detect::install_instructions()
            )));
        };

        let mut builder = BrowserConfig::builder();

        // chromiumoxide runs headless unless with_head() is called
        if !config.headless {
            builder = builder.with_head();
        }

        builder = builder
            .chrome_executable(&executable)
            .request_timeout(config.navigation_timeout)
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-notifications")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--no-sandbox");

        let browser_config = builder
            .build()
            .map_err(|e| CheckerError::BrowserLaunch(format!("bad browser config: {e}")))?;

        let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
            CheckerError::BrowserLaunch(format!(
                "{e}\n\n{}",
                detect::install_instructions()
            ))
        })?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                trace!(?event, "browser event");
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| CheckerError::BrowserLaunch(e.to_string()))?;

        info!(
            executable = %executable.display(),
            headless = config.headless,
            "launched browser"
        );

        Ok(Self {
            browser,
            page,
            handler_task,
        })
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub async fn goto(&self, url: &str) -> Result<()> {
        self.page.goto(url).await?;
        // Best effort: portals keep loading trackers long after the DOM is usable
        let _ = self.page.wait_for_navigation().await;
        debug!(url, "navigated");
        Ok(())
    }

    /// True when `selector` currently matches an element.
    pub async fn selector_exists(&self, selector: &str) -> Result<bool> {
        let js = format!(
            "document.querySelector({}) !== null",
            serde_json::to_string(selector)?
        );
        let found: bool = self.eval_json(&js).await?;
        Ok(found)
    }

    /// Wait for `selector` to appear, erroring with `ElementNotFound` when
    /// the timeout elapses.
    pub async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()> {
        if self.try_wait_for_selector(selector, timeout).await? {
            Ok(())
        } else {
            Err(CheckerError::ElementNotFound {
                selector: selector.to_string(),
            })
        }
    }

    /// Like [`wait_for_selector`](Self::wait_for_selector) but a timeout is a
    /// plain `false`, for optional elements such as popups.
    pub async fn try_wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<bool> {
        let found = poll_until(timeout, POLL_INTERVAL, || async move {
            Ok(self.selector_exists(selector).await?.then_some(()))
        })
        .await?;
        Ok(found.is_some())
    }

    pub async fn click(&self, selector: &str) -> Result<()> {
        let element =
            self.page
                .find_element(selector)
                .await
                .map_err(|_| CheckerError::ElementNotFound {
                    selector: selector.to_string(),
                })?;
        element.click().await?;
        debug!(selector, "clicked");
        Ok(())
    }

    /// Clear a text input and type into it.
    pub async fn type_into(&self, selector: &str, text: &str) -> Result<()> {
        let element =
            self.page
                .find_element(selector)
                .await
                .map_err(|_| CheckerError::ElementNotFound {
                    selector: selector.to_string(),
                })?;
        element.click().await?;
        let clear_js = format!(
            "(() => {{ const el = document.querySelector({}); if (el) el.value = ''; }})()",
            serde_json::to_string(selector)?
        );
        self.page.evaluate(clear_js.as_str()).await?;
        element.type_str(text).await?;
        debug!(selector, chars = text.len(), "typed text");
        Ok(())
    }

    /// Select a dropdown option by its visible text, dispatching a change
    /// event the way a real selection would.
    pub async fn select_option(&self, selector: &str, visible_text: &str) -> Result<()> {
        let js = format!(
            r#"(() => {{
                const el = document.querySelector({sel});
                if (!el) return false;
                const option = Array.from(el.options).find(o => o.text.trim() === {text});
                if (!option) return false;
                el.value = option.value;
                el.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return true;
            }})()"#,
            sel = serde_json::to_string(selector)?,
            text = serde_json::to_string(visible_text)?,
        );
        let selected: bool = self.eval_json(&js).await?;
        if !selected {
            return Err(CheckerError::ElementNotFound {
                selector: format!("{selector} option '{visible_text}'"),
            });
        }
        Ok(())
    }

    /// Evaluate JavaScript in the page and deserialize its result.
    pub async fn eval_json<T: DeserializeOwned>(&self, js: &str) -> Result<T> {
        self.page
            .evaluate(js)
            .await?
            .into_value()
            .map_err(|e| CheckerError::Cdp(format!("evaluation result: {e:?}")))
    }

    /// Close the browser process. Errors are logged, not propagated: teardown
    /// must not mask the error that led to it.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!(error = %e, "failed to close browser cleanly");
        }
        let _ = self.browser.wait().await;
        self.handler_task.abort();
        info!("closed browser session");
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        // close() consumes self; reaching here means an early exit path
        self.handler_task.abort();
    }
}
