//! Shared driver for the Tideworks portals (Shippers Transport and Oakland
//! International). Same page structure, different base URL and credentials.

use crate::browser::{poll_until, BrowserSession, SessionConfig};
use crate::domain::model::{Availability, ContainerStatus, Terminal};
use crate::domain::ports::TerminalChecker;
use crate::utils::error::{CheckerError, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info};

const LOGIN_USERNAME: &str = "#j_username";
const LOGIN_PASSWORD: &str = "#j_password";
const LOGIN_BUTTON: &str = "#signIn";
const IMPORT_MENU: &str = "#menu-import";
const CONTAINER_INPUT: &str = "#numbers";
const SEARCH_BUTTON: &str = "#search";
const RESULT_TABLE: &str = "#result table";

const LOGIN_REJECTED_JS: &str =
    "document.body.innerText.includes('Invalid username or password')";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoginState {
    Accepted,
    Rejected,
}

/// Decide the login outcome from what the page currently shows. `None`
/// means the round trip has not settled yet and the caller keeps polling.
fn classify_login(rejected: bool, landed: bool) -> Option<LoginState> {
    if rejected {
        Some(LoginState::Rejected)
    } else if landed {
        Some(LoginState::Accepted)
    } else {
        None
    }
}

pub struct TideworksChecker {
    terminal: Terminal,
    username: String,
    password: String,
    session_config: SessionConfig,
}

impl TideworksChecker {
    pub fn new(
        terminal: Terminal,
        username: String,
        password: String,
        headless: bool,
        chrome_path: Option<String>,
    ) -> Self {
        TideworksChecker {
            terminal,
            username,
            password,
            session_config: SessionConfig {
                headless,
                chrome_path,
                ..SessionConfig::default()
            },
        }
    }

    /// Log in when the portal asks for it; an existing session goes straight
    /// to the landing page.
    async fn login(&self, session: &BrowserSession) -> Result<()> {
        session.goto(self.terminal.base_url()).await?;

        if !session
            .try_wait_for_selector(LOGIN_USERNAME, Duration::from_secs(2))
            .await?
        {
            debug!(terminal = %self.terminal, "already logged in or no login required");
            return Ok(());
        }

        session.type_into(LOGIN_USERNAME, &self.username).await?;
        session.type_into(LOGIN_PASSWORD, &self.password).await?;
        session.click(LOGIN_BUTTON).await?;
        let _ = session.page().wait_for_navigation().await;

        // the rejection banner only exists on the re-rendered login page, so
        // poll the post-submit document for it or for the landing page menu
        // rather than reading whatever was displayed when the click fired
        let state = poll_until(
            Duration::from_secs(5),
            Duration::from_millis(250),
            || async move {
                let rejected: bool = session.eval_json(LOGIN_REJECTED_JS).await?;
                let landed = session.selector_exists(IMPORT_MENU).await?;
                Ok(classify_login(rejected, landed))
            },
        )
        .await?;

        if state == Some(LoginState::Rejected) {
            return Err(CheckerError::AuthenticationFailed {
                terminal: self.terminal.display_name().to_string(),
                reason: "invalid username or password".to_string(),
            });
        }

        info!(terminal = %self.terminal, "login successful");
        Ok(())
    }

    async fn check_inner(
        &self,
        session: &BrowserSession,
        containers: &[String],
    ) -> Result<Vec<ContainerStatus>> {
        self.login(session).await?;

        // announcement popup shows up for some accounts
        if session
            .try_wait_for_selector(".modal button.close", Duration::from_secs(2))
            .await?
        {
            let _ = session.click(".modal button.close").await;
        }

        session.click(IMPORT_MENU).await?;
        session
            .wait_for_selector(CONTAINER_INPUT, Duration::from_secs(3))
            .await?;
        session
            .type_into(CONTAINER_INPUT, &containers.join("\n"))
            .await?;
        session.click(SEARCH_BUTTON).await?;

        session
            .wait_for_selector(RESULT_TABLE, Duration::from_secs(10))
            .await
            .map_err(|_| CheckerError::PortalTimeout {
                terminal: self.terminal.display_name().to_string(),
                seconds: 10,
            })?;

        let rows: Vec<Vec<String>> = session.eval_json(SCRAPE_ROWS_JS).await?;
        debug!(terminal = %self.terminal, rows = rows.len(), "scraped result rows");
        Ok(parse_rows(self.terminal, containers, &rows))
    }
}

#[async_trait]
impl TerminalChecker for TideworksChecker {
    fn terminal(&self) -> Terminal {
        self.terminal
    }

    async fn check(&self, containers: &[String]) -> Result<Vec<ContainerStatus>> {
        let session = BrowserSession::launch(&self.session_config).await?;
        let outcome = self.check_inner(&session, containers).await;
        session.close().await;
        outcome
    }
}

const SCRAPE_ROWS_JS: &str = r#"(() => {
    const table = document.querySelector('#result table');
    if (!table) return [];
    return Array.from(table.querySelectorAll('tr')).slice(1).map(tr =>
        Array.from(tr.querySelectorAll('td')).map(td => td.innerText.trim()));
})()"#;

/// Split the holds cell into per-authority statuses. Parts are separated by
/// newlines or semicolons; fee and satisfied-thru fragments fold into the
/// terminal hold.
fn split_holds(holds_text: &str) -> (String, String, String, String) {
    let mut customs = String::new();
    let mut line = String::new();
    let mut cbpa = String::new();
    let mut terminal = String::new();
    let mut fees = String::new();
    let mut satisfied = String::new();

    let value_of = |part: &str| {
        part.rsplit_once(':')
            .map(|(_, v)| v.trim().to_string())
            .unwrap_or_else(|| part.trim().to_string())
    };

    for part in holds_text
        .replace('\n', ";")
        .split(';')
        .map(str::trim)
        .filter(|p| !p.is_empty())
    {
        if part.contains("Total Fees:") {
            fees = part.to_string();
        } else if part.contains("Satisfied Thru:") {
            satisfied = part.to_string();
        } else if part.contains("Cust") {
            customs = value_of(part);
        } else if part.contains("Line") {
            line = value_of(part);
        } else if part.contains("Add") {
            cbpa = value_of(part);
        } else if part.contains("Holds") {
            terminal = value_of(part);
        }
    }

    if !fees.is_empty() || !satisfied.is_empty() {
        let mut parts = Vec::new();
        if !terminal.is_empty() {
            parts.push(terminal);
        }
        if !fees.is_empty() {
            parts.push(fees);
        }
        if !satisfied.is_empty() {
            parts.push(satisfied);
        }
        terminal = parts.join(" | ");
    }

    (customs, line, cbpa, terminal)
}

fn parse_availability(
    text: &str,
    location: &str,
    holds: (&str, &str, &str, &str),
) -> Availability {
    let lowered = text.to_ascii_lowercase();
    if lowered.contains("delivered") {
        Availability::Delivered
    } else if lowered.contains("yes") || lowered.contains("available") {
        Availability::Available
    } else if lowered.is_empty() {
        Availability::derive(location, holds.0, holds.1, holds.2, holds.3)
    } else {
        Availability::NotAvailable
    }
}

/// Columns: 0 container, 1 availability, 2 dimensions, 3 holds,
/// 4 "location | line operator". A single-cell "could not be found" row marks
/// a container the portal does not know.
pub fn parse_rows(
    terminal: Terminal,
    requested: &[String],
    rows: &[Vec<String>],
) -> Vec<ContainerStatus> {
    let mut results = Vec::new();

    for cells in rows {
        if cells.len() == 1 && cells[0].contains("could not be found") {
            if let Some(container) = cells[0].split_whitespace().next() {
                results.push(ContainerStatus::not_found(container, terminal));
                debug!(container, %terminal, "container not found");
            }
            continue;
        }

        if cells.len() < 4 {
            continue;
        }

        let container = cells[0].trim().to_string();
        if container.is_empty() {
            continue;
        }
        let (customs_hold, line_hold, cbpa_hold, terminal_hold) = split_holds(&cells[3]);

        let additional = cells.get(4).map(String::as_str).unwrap_or("");
        let (location, line_operator) = match additional.split_once('|') {
            Some((loc, op)) => (loc.trim().to_string(), op.trim().to_string()),
            None => (additional.trim().to_string(), String::new()),
        };

        results.push(ContainerStatus {
            container_number: container,
            terminal,
            found: true,
            available: parse_availability(
                &cells[1],
                &location,
                (&customs_hold, &line_hold, &cbpa_hold, &terminal_hold),
            ),
            line_operator,
            dimensions: cells[2].trim().to_string(),
            customs_hold,
            line_hold,
            cbpa_hold,
            terminal_hold,
            location,
        });
    }

    let present: HashSet<&str> = results
        .iter()
        .map(|r| r.container_number.as_str())
        .collect();
    let missing: Vec<&String> = requested
        .iter()
        .filter(|c| !present.contains(c.as_str()))
        .collect();
    for container in missing {
        results.push(ContainerStatus::not_found(container.clone(), terminal));
    }

    results
}
