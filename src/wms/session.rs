//! WMS web UI driver. The WMS is an ASP.NET application; controls are
//! addressed by their server-generated `name` attributes, with zero-padded
//! grid indices for receipt lines.

use crate::browser::{poll_until, BrowserSession, SessionConfig};
use crate::domain::model::TransactionRecord;
use crate::domain::ports::WmsPortal;
use crate::utils::error::{CheckerError, Result};
use async_trait::async_trait;
use chrono::Local;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

const LOGIN_USERNAME: &str = "LoginNameTextBox";
const LOGIN_PASSWORD: &str = "PasswordTextBox";
const LOGIN_BUTTON: &str = "SigninBtn";
const LOGIN_STATUS: &str = "#LoginStatusString";

const NEW_RECEIPT_BTN: &str = "ctl07$SearchResultsDataGridController$btnNewButtonSearchControl";
const WAREHOUSE_SELECT: &str = "WarehouseDropDown";
const RECEIVE_REF: &str = "ReceiveRef";
const BOOKING_DATE: &str = "BookingDate$ctl00$TextBox";
const TOTAL_UNITS: &str = "TotalUnits";
const TOTAL_PALLETS: &str = "TotalPallets";
const SAVE_RECEIVE: &str = "SaveReceive";

const ORDER_NUMBER: &str = "OrderNumber";
const REQUIRED_DATE: &str = "RequiredByDate$ctl00$TextBox";
const SAVE_ORDER: &str = "SaveOrder";

const FIND_BTN: &str = "ctl07$ctl01$FooterRow_FindButton";
const RESULTS_GRID: &str = "#ctl07_SearchResultsDataGridController_SearchResultsDataGrid";
const EXPORT_BTN: &str = "ctl07$SearchResultsDataGridController$SearchResultsDataGrid_ExcelButton";

/// Attribute selector for an ASP.NET control name ($ needs no escaping
/// inside a quoted attribute value).
fn by_name(name: &str) -> String {
    format!("[name=\"{}\"]", name)
}

fn line_add_button(index: u32) -> String {
    format!("#WhsReceiveInventoryGrid_ctl{:02}_ga", index)
}

fn line_product(index: u32) -> String {
    by_name(&format!("WhsReceiveInventoryGrid$ctl{:02}$ctl00$TextBox", index))
}

fn line_packs(index: u32) -> String {
    by_name(&format!("WhsReceiveInventoryGrid$ctl{:02}$ctl02", index))
}

fn line_packs_unit(index: u32) -> String {
    by_name(&format!("WhsReceiveInventoryGrid$ctl{:02}$ctl03", index))
}

fn line_expected_quantity(index: u32) -> String {
    by_name(&format!("WhsReceiveInventoryGrid$ctl{:02}$ctl04", index))
}

#[derive(Debug, Clone)]
pub struct WmsConfig {
    pub login_url: String,
    pub inbound_url: String,
    pub outbound_url: String,
    pub username: String,
    pub password: String,
    pub warehouse: String,
    pub download_dir: PathBuf,
}

pub struct WmsSession {
    session: BrowserSession,
    config: WmsConfig,
}

impl WmsSession {
    pub async fn launch(
        config: WmsConfig,
        headless: bool,
        chrome_path: Option<String>,
    ) -> Result<Self> {
        std::fs::create_dir_all(&config.download_dir)?;
        let session = BrowserSession::launch(&SessionConfig {
            headless,
            chrome_path,
            ..SessionConfig::default()
        })
        .await?;
        Ok(Self { session, config })
    }

    pub async fn close(self) {
        self.session.close().await;
    }

    /// Open the search grid on `url` and return its first-column references.
    async fn grid_refs(&self, url: &str) -> Result<HashSet<String>> {
        self.session.goto(url).await?;
        self.session.click(&by_name(FIND_BTN)).await?;
        self.session
            .wait_for_selector(RESULTS_GRID, Duration::from_secs(5))
            .await?;

        let refs: Vec<String> = self.session.eval_json(SCRAPE_GRID_REFS_JS).await?;
        Ok(refs
            .into_iter()
            .map(|r| r.trim().to_uppercase())
            .filter(|r| !r.is_empty())
            .collect())
    }

    async fn fill_receipt_line(&self, index: u32, product: &str) -> Result<()> {
        self.session.click(&line_add_button(index)).await?;
        debug!(line = index, "added receipt line");

        self.session
            .type_into(&line_product(index), product)
            .await?;
        self.session
            .type_into(&line_packs(index), &crate::domain::model::UNITS_PER_PALLET.to_string())
            .await?;
        self.session
            .select_option(&line_packs_unit(index), "Unit")
            .await?;
        self.session
            .type_into(
                &line_expected_quantity(index),
                &crate::domain::model::UNITS_PER_PALLET.to_string(),
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl WmsPortal for WmsSession {
    async fn login(&self) -> Result<()> {
        self.session.goto(&self.config.login_url).await?;
        self.session
            .type_into(&by_name(LOGIN_USERNAME), &self.config.username)
            .await?;
        self.session
            .type_into(&by_name(LOGIN_PASSWORD), &self.config.password)
            .await?;
        self.session.click(&by_name(LOGIN_BUTTON)).await?;

        if !self
            .session
            .try_wait_for_selector(LOGIN_STATUS, Duration::from_secs(3))
            .await?
        {
            return Err(CheckerError::AuthenticationFailed {
                terminal: "WMS".to_string(),
                reason: "login page did not transition to a signed-in session".to_string(),
            });
        }

        info!("WMS login successful");
        Ok(())
    }

    async fn existing_refs(&self) -> Result<HashSet<String>> {
        self.grid_refs(&self.config.inbound_url).await
    }

    async fn lookup(&self, container: &str) -> Result<bool> {
        // fresh grid scrape each time: the check must see entries created by
        // other users since the batch started
        let refs = self.existing_refs().await?;
        Ok(refs.contains(&container.trim().to_uppercase()))
    }

    async fn create_inbound(&self, record: &TransactionRecord) -> Result<()> {
        self.session.goto(&self.config.inbound_url).await?;
        self.session.click(&by_name(NEW_RECEIPT_BTN)).await?;
        self.session
            .wait_for_selector(&by_name(WAREHOUSE_SELECT), Duration::from_secs(5))
            .await?;

        self.session
            .select_option(&by_name(WAREHOUSE_SELECT), &self.config.warehouse)
            .await?;
        self.session
            .type_into(&by_name(RECEIVE_REF), &record.container)
            .await?;

        let today = Local::now().format("%d-%b-%y").to_string();
        self.session
            .type_into(&by_name(BOOKING_DATE), &today)
            .await?;
        self.session
            .type_into(&by_name(TOTAL_UNITS), &record.total_units().to_string())
            .await?;
        self.session
            .type_into(&by_name(TOTAL_PALLETS), &record.pallets.to_string())
            .await?;

        // grid lines are 1-based at control index 2
        for index in 2..record.pallets + 2 {
            self.fill_receipt_line(index, &record.product).await?;
        }

        self.session.click(&by_name(SAVE_RECEIVE)).await?;
        let _ = self.session.page().wait_for_navigation().await;
        info!(container = record.container, pallets = record.pallets, "inbound receipt saved");
        Ok(())
    }

    async fn create_outbound(&self, record: &TransactionRecord) -> Result<()> {
        self.session.goto(&self.config.outbound_url).await?;
        self.session.click(&by_name(NEW_RECEIPT_BTN)).await?;
        self.session
            .wait_for_selector(&by_name(WAREHOUSE_SELECT), Duration::from_secs(5))
            .await?;

        self.session
            .select_option(&by_name(WAREHOUSE_SELECT), &self.config.warehouse)
            .await?;
        self.session
            .type_into(&by_name(ORDER_NUMBER), &record.container)
            .await?;
        self.session
            .type_into(&by_name(REQUIRED_DATE), &record.date)
            .await?;
        self.session
            .type_into(&by_name(TOTAL_UNITS), &record.total_units().to_string())
            .await?;

        self.session.click(&by_name(SAVE_ORDER)).await?;
        let _ = self.session.page().wait_for_navigation().await;
        info!(container = record.container, "outbound order saved");
        Ok(())
    }

    async fn export_inventory(&self) -> Result<String> {
        self.session.goto(&self.config.inbound_url).await?;
        self.session.click(&by_name(FIND_BTN)).await?;
        self.session
            .wait_for_selector(RESULTS_GRID, Duration::from_secs(5))
            .await?;
        self.session.click(&by_name(EXPORT_BTN)).await?;

        // the portal names every export SearchResults.xls
        let downloaded = self.config.download_dir.join("SearchResults.xls");
        let appeared = poll_until(Duration::from_secs(30), Duration::from_millis(500), || {
            let path = downloaded.clone();
            async move { Ok(path.exists().then_some(())) }
        })
        .await?;
        if appeared.is_none() {
            return Err(CheckerError::PortalTimeout {
                terminal: "WMS".to_string(),
                seconds: 30,
            });
        }

        let target = self.config.download_dir.join("inbound.xls");
        std::fs::rename(&downloaded, &target)?;
        info!(path = %target.display(), "inventory exported");
        Ok(target.display().to_string())
    }
}

const SCRAPE_GRID_REFS_JS: &str = r#"(() => {
    const grid = document.querySelector('#ctl07_SearchResultsDataGridController_SearchResultsDataGrid');
    if (!grid) return [];
    return Array.from(grid.querySelectorAll('tr')).slice(1)
        .map(tr => tr.querySelector('td'))
        .filter(td => td !== null)
        .map(td => td.innerText.trim());
})()"#;
