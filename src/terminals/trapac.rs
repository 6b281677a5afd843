//! Trapac quick-check driver. No login, but submissions can trigger a
//! reCAPTCHA that only a human can clear, so this terminal always runs with
//! a visible browser window.

use crate::browser::{poll_until, BrowserSession, SessionConfig};
use crate::domain::model::{
    Availability, ContainerStatus, Terminal, TRAPAC_BATCH_SIZE,
};
use crate::domain::ports::TerminalChecker;
use crate::utils::error::{CheckerError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{info, warn};

const RESULT_TABLE: &str = ".table-scroll table";

/// Privacy-policy modal close buttons seen on the quick-check page.
const MODAL_CLOSE_SELECTORS: &[&str] = &[
    "button.close",
    "button[aria-label='Close']",
    ".modal button.close",
];

/// A result-table row as scraped from the page.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRow {
    pub cls: String,
    pub cells: Vec<String>,
}

pub struct TrapacChecker {
    session_config: SessionConfig,
    captcha_timeout: Duration,
}

impl TrapacChecker {
    pub fn new(chrome_path: Option<String>, captcha_timeout: Duration) -> Self {
        TrapacChecker {
            // visible window regardless of --headless: the captcha needs one
            session_config: SessionConfig {
                headless: false,
                chrome_path,
                ..SessionConfig::default()
            },
            captcha_timeout,
        }
    }

    async fn check_batch(
        &self,
        session: &BrowserSession,
        batch: &[String],
    ) -> Result<Vec<ContainerStatus>> {
        session.goto(Terminal::Trapac.base_url()).await?;

        for selector in MODAL_CLOSE_SELECTORS {
            if session
                .try_wait_for_selector(selector, Duration::from_secs(1))
                .await?
            {
                if session.click(selector).await.is_ok() {
                    info!(selector, "closed privacy policy modal");
                }
                break;
            }
        }

        session
            .type_into("textarea[name='containers']", &batch.join("\n"))
            .await?;
        session.click("div.submit button").await?;

        // the result table and the captcha both render asynchronously after
        // the submit; watch for whichever shows up first
        let state = poll_until(
            Duration::from_secs(10),
            Duration::from_millis(500),
            || async move {
                let state = self.observe(session).await?;
                Ok((state != PageState::Pending).then_some(state))
            },
        )
        .await?
        .unwrap_or(PageState::Pending);

        let state = if state == PageState::Captcha {
            warn!("reCAPTCHA verification required for Trapac");
            println!("\nreCAPTCHA verification required for Trapac.");
            println!("Complete the challenge in the browser window, then click Check.");
            println!(
                "The run continues automatically once results appear (up to {}s).",
                self.captcha_timeout.as_secs()
            );
            self.wait_past_captcha(session).await?
        } else {
            state
        };

        match state {
            PageState::Results => {
                let rows: Vec<RawRow> = session.eval_json(SCRAPE_ROWS_JS).await?;
                Ok(parse_rows(batch, &rows))
            }
            // the portal skips the table entirely when it knows none of the
            // submitted numbers; that is an answer, not a timeout
            PageState::NoResults => Ok(parse_rows(batch, &[])),
            PageState::Captcha | PageState::Pending => Err(CheckerError::PortalTimeout {
                terminal: Terminal::Trapac.display_name().to_string(),
                seconds: 10,
            }),
        }
    }

    async fn observe(&self, session: &BrowserSession) -> Result<PageState> {
        let table = session.selector_exists(RESULT_TABLE).await?;
        let captcha: bool = session.eval_json(RECAPTCHA_VISIBLE_JS).await?;
        let no_results: bool = session.eval_json(NO_RESULTS_JS).await?;
        Ok(classify_results_page(table, captcha, no_results))
    }

    /// Block until the human clears the challenge and the page resolves into
    /// results or a no-result message, or the captcha timeout elapses.
    async fn wait_past_captcha(&self, session: &BrowserSession) -> Result<PageState> {
        let resolved = poll_until(self.captcha_timeout, Duration::from_secs(1), || async move {
            if session.selector_exists(RESULT_TABLE).await? {
                return Ok(Some(PageState::Results));
            }
            let no_results: bool = session.eval_json(NO_RESULTS_JS).await?;
            Ok(no_results.then_some(PageState::NoResults))
        })
        .await?;
        match resolved {
            Some(state) => {
                info!("results found after reCAPTCHA verification");
                Ok(state)
            }
            None => Err(CheckerError::CaptchaUnresolved {
                seconds: self.captcha_timeout.as_secs(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageState {
    Results,
    Captcha,
    NoResults,
    Pending,
}

/// What the quick-check page is showing. The result table wins when present
/// (its error rows contain the no-result text too); otherwise a visible
/// captcha or a bare "No result found" message each get their own handling.
fn classify_results_page(table: bool, captcha: bool, no_results: bool) -> PageState {
    if table {
        PageState::Results
    } else if captcha {
        PageState::Captcha
    } else if no_results {
        PageState::NoResults
    } else {
        PageState::Pending
    }
}

#[async_trait]
impl TerminalChecker for TrapacChecker {
    fn terminal(&self) -> Terminal {
        Terminal::Trapac
    }

    async fn check(&self, containers: &[String]) -> Result<Vec<ContainerStatus>> {
        let session = BrowserSession::launch(&self.session_config).await?;

        let mut outcome = Ok(Vec::new());
        for (i, batch) in containers.chunks(TRAPAC_BATCH_SIZE).enumerate() {
            info!(
                batch = i + 1,
                total = containers.len().div_ceil(TRAPAC_BATCH_SIZE),
                "processing Trapac batch"
            );
            match self.check_batch(&session, batch).await {
                Ok(mut records) => {
                    if let Ok(all) = outcome.as_mut() {
                        all.append(&mut records);
                    }
                }
                Err(e) => {
                    outcome = Err(e);
                    break;
                }
            }
        }

        session.close().await;
        outcome.map(|records| fill_missing(containers, records))
    }
}

const RECAPTCHA_VISIBLE_JS: &str = r#"(() => {
    const candidates = document.querySelectorAll(
        "iframe[src*='recaptcha'], .g-recaptcha, [class*='recaptcha'], #recaptcha-backup");
    return Array.from(candidates).some(el => el.offsetParent !== null);
})()"#;

const NO_RESULTS_JS: &str = "document.body.innerText.includes('No result found')";

const SCRAPE_ROWS_JS: &str = r#"(() => {
    const table = document.querySelector('.table-scroll table');
    if (!table) return [];
    const body = table.querySelector('tbody') || table;
    return Array.from(body.querySelectorAll('tr')).map(tr => ({
        cls: tr.className || '',
        cells: Array.from(tr.querySelectorAll('td')).map(td => td.innerText.trim()),
    }));
})()"#;

/// Convert scraped rows into records. Error rows carry a "no result" message
/// with the container number; data rows map columns:
/// 1 container, 2 line operator, 3 line hold, 4 customs hold, 5 CBPA hold,
/// 6 terminal hold, 7 location, 8 dimensions.
pub fn parse_rows(requested: &[String], rows: &[RawRow]) -> Vec<ContainerStatus> {
    let mut results = Vec::new();

    for row in rows {
        if row.cls == "error-row" {
            if let Some(message) = row.cells.first() {
                if let Some(container) = container_from_error(message) {
                    results.push(ContainerStatus::not_found(container, Terminal::Trapac));
                }
            }
            continue;
        }

        if row.cells.len() < 9 {
            continue;
        }

        let cell = |i: usize| row.cells.get(i).map(String::as_str).unwrap_or("");
        let container = cell(1).to_string();
        if container.is_empty() {
            continue;
        }
        let line_hold = cell(3).to_string();
        let customs_hold = cell(4).to_string();
        let cbpa_hold = cell(5).to_string();
        let terminal_hold = cell(6).to_string();
        let location = cell(7).to_string();

        results.push(ContainerStatus {
            container_number: container,
            terminal: Terminal::Trapac,
            found: true,
            available: Availability::derive(
                &location,
                &customs_hold,
                &line_hold,
                &cbpa_hold,
                &terminal_hold,
            ),
            line_operator: cell(2).to_string(),
            dimensions: cell(8).to_string(),
            customs_hold,
            line_hold,
            cbpa_hold,
            terminal_hold,
            location,
        });
    }

    fill_missing(requested, results)
}

/// Pull the container number out of an error-row message like
/// "No result found for the reference number: ABCD1234567".
fn container_from_error(message: &str) -> Option<String> {
    let message = message.trim();
    if message.is_empty() {
        return None;
    }
    if let Some((_, tail)) = message.split_once(':') {
        let tail = tail.trim();
        if !tail.is_empty() {
            return Some(tail.to_string());
        }
    }
    message.split_whitespace().next().map(str::to_string)
}

/// Ensure every requested container appears; absent ones become not-found.
fn fill_missing(requested: &[String], mut results: Vec<ContainerStatus>) -> Vec<ContainerStatus> {
    let present: HashSet<&str> = results
        .iter()
        .map(|r| r.container_number.as_str())
        .collect();
    let missing: Vec<&String> = requested
        .iter()
        .filter(|c| !present.contains(c.as_str()))
        .collect();
    for container in missing {
        results.push(ContainerStatus::not_found(container.clone(), Terminal::Trapac));
    }
    results
}
