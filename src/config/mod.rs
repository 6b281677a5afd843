use crate::core::report::OutputFormat;
use crate::domain::model::{Direction, Terminal, TransactionRecord};
use crate::utils::error::{CheckerError, Result};
use crate::utils::validation::{
    self, credentials_from_env, normalize_container_number, Validate,
};
use crate::wms::session::WmsConfig;
use clap::Parser;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "container-status")]
#[command(about = "Check container status across the Trapac, STE and OICT terminal portals")]
pub struct StatusCliConfig {
    #[arg(required = true, help = "Container numbers to check")]
    pub container_numbers: Vec<String>,

    #[arg(long, help = "Run browsers headless (Trapac stays visible for the captcha)")]
    pub headless: bool,

    #[arg(long, default_value = "table", help = "Output format: csv, json or table")]
    pub output: OutputFormat,

    #[arg(long, help = "Write the report to this file instead of stdout")]
    pub output_file: Option<PathBuf>,

    #[arg(
        long = "terminal",
        help = "Terminal to query (repeatable; default: all of trapac, ste, oict)"
    )]
    pub terminals: Vec<Terminal>,

    #[arg(
        long,
        default_value = "300",
        help = "How long to wait for a human to clear a captcha"
    )]
    pub captcha_timeout_secs: u64,

    #[arg(long, help = "Path to a Chrome/Chromium executable")]
    pub chrome: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl StatusCliConfig {
    pub fn terminals(&self) -> Vec<Terminal> {
        if self.terminals.is_empty() {
            Terminal::ALL.to_vec()
        } else {
            let mut seen = HashSet::new();
            self.terminals
                .iter()
                .copied()
                .filter(|t| seen.insert(*t))
                .collect()
        }
    }

    pub fn captcha_timeout(&self) -> Duration {
        Duration::from_secs(self.captcha_timeout_secs)
    }

    /// Trimmed, uppercased container numbers. Numbers that do not look like
    /// ISO 6346 are still queried, with a warning: the portals accept other
    /// reference formats too.
    pub fn normalized_containers(&self) -> Vec<String> {
        self.container_numbers
            .iter()
            .map(|c| normalize_container_number(c))
            .inspect(|c| {
                if !validation::is_valid_container_number(c) {
                    tracing::warn!(container = %c, "does not look like an ISO 6346 container number");
                }
            })
            .collect()
    }
}

impl Validate for StatusCliConfig {
    fn validate(&self) -> Result<()> {
        for container in &self.container_numbers {
            validation::validate_non_empty_string("container_numbers", container)?;
        }
        validation::validate_positive_number("captcha_timeout_secs", self.captcha_timeout_secs, 1)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "wms")]
#[command(about = "Transcribe container movement records into the WMS web UI")]
pub struct WmsCliConfig {
    #[arg(
        long,
        help = "CSV file of records (headers: container,direction,date,product,pallets)"
    )]
    pub input: Option<PathBuf>,

    #[arg(short = 'c', long = "container", help = "Container numbers for one-off records")]
    pub containers: Vec<String>,

    #[arg(long, help = "Movement direction for one-off records: inbound or outbound")]
    pub direction: Option<Direction>,

    #[arg(long, help = "Required-by date for outbound orders (DD-MMM-YY)")]
    pub date: Option<String>,

    #[arg(short = 'p', long, help = "Product (part number) for one-off records")]
    pub product: Option<String>,

    #[arg(long, default_value = "22", help = "Pallets per record")]
    pub pallets: u32,

    #[arg(short = 'q', long, help = "Export the current inventory grid and exit")]
    pub query: bool,

    #[arg(long, help = "Run the browser headless")]
    pub headless: bool,

    #[arg(long, help = "Path to a Chrome/Chromium executable")]
    pub chrome: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl WmsCliConfig {
    /// Records from the CSV input, or assembled from the one-off flags.
    pub fn records(&self) -> Result<Vec<TransactionRecord>> {
        if let Some(path) = &self.input {
            return crate::wms::batch::read_records(path);
        }

        if self.containers.is_empty() {
            return Ok(Vec::new());
        }

        let direction = self.direction.ok_or(CheckerError::MissingConfigError {
            field: "direction".to_string(),
        })?;
        let product = self
            .product
            .clone()
            .ok_or(CheckerError::MissingConfigError {
                field: "product".to_string(),
            })?;
        let date = self.date.clone().unwrap_or_default();

        Ok(self
            .containers
            .iter()
            .map(|container| TransactionRecord {
                container: normalize_container_number(container),
                direction,
                date: date.clone(),
                product: product.clone(),
                pallets: self.pallets,
            })
            .collect())
    }
}

impl Validate for WmsCliConfig {
    fn validate(&self) -> Result<()> {
        if self.input.is_none() && self.containers.is_empty() && !self.query {
            return Err(CheckerError::MissingConfigError {
                field: "--input, --container or --query".to_string(),
            });
        }
        if self.input.is_some() && !self.containers.is_empty() {
            return Err(CheckerError::InvalidConfigValueError {
                field: "input".to_string(),
                value: "--input with --container".to_string(),
                reason: "pass a CSV file or one-off containers, not both".to_string(),
            });
        }
        if !self.containers.is_empty() {
            if self.direction == Some(Direction::Outbound) && self.date.is_none() {
                return Err(CheckerError::MissingConfigError {
                    field: "date (required for outbound orders)".to_string(),
                });
            }
            validation::validate_positive_number("pallets", self.pallets as u64, 1)?;
        }
        Ok(())
    }
}

const DEFAULT_WAREHOUSE: &str = "HAYMAN WAREHOUSE";

/// Assemble the WMS portal configuration from the environment:
/// `WMS_URL`, `WMS_USERNAME`, `WMS_PASSWORD`, and optionally
/// `WMS_WAREHOUSE` and `WMS_DOWNLOAD_DIR`.
pub fn wms_config_from_env() -> Result<WmsConfig> {
    let base = std::env::var("WMS_URL").map_err(|_| CheckerError::MissingConfigError {
        field: "WMS_URL".to_string(),
    })?;
    validation::validate_url("WMS_URL", &base)?;
    let base = base.trim_end_matches('/');

    let (username, password) = credentials_from_env("WMS_USERNAME", "WMS_PASSWORD")?;

    Ok(WmsConfig {
        login_url: format!("{base}/login"),
        inbound_url: format!("{base}/inbound"),
        outbound_url: format!("{base}/outbound"),
        username,
        password,
        warehouse: std::env::var("WMS_WAREHOUSE").unwrap_or_else(|_| DEFAULT_WAREHOUSE.to_string()),
        download_dir: std::env::var("WMS_DOWNLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./downloads")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_cli_parses_a_typical_invocation() {
        let config = StatusCliConfig::parse_from([
            "container-status",
            "ABCD1234567",
            "EFGH7654321",
            "--headless",
            "--output",
            "json",
        ]);
        assert_eq!(config.container_numbers.len(), 2);
        assert!(config.headless);
        assert_eq!(config.output, OutputFormat::Json);
        assert_eq!(config.terminals(), Terminal::ALL.to_vec());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn status_cli_normalizes_container_numbers() {
        let config = StatusCliConfig::parse_from(["container-status", " abcd1234567 "]);
        assert_eq!(config.normalized_containers(), vec!["ABCD1234567"]);
    }

    #[test]
    fn status_cli_restricts_terminals() {
        let config =
            StatusCliConfig::parse_from(["container-status", "ABCD1234567", "--terminal", "oict"]);
        assert_eq!(config.terminals(), vec![Terminal::Oict]);
    }

    #[test]
    fn repeated_terminal_flags_run_each_terminal_once() {
        let config = StatusCliConfig::parse_from([
            "container-status",
            "ABCD1234567",
            "--terminal",
            "oict",
            "--terminal",
            "ste",
            "--terminal",
            "oict",
        ]);
        assert_eq!(config.terminals(), vec![Terminal::Oict, Terminal::Ste]);
    }

    #[test]
    fn wms_cli_builds_one_off_records() {
        let config = WmsCliConfig::parse_from([
            "wms",
            "-c",
            "abcd1234567",
            "-c",
            "EFGH7654321",
            "--direction",
            "inbound",
            "-p",
            "PN-100",
            "--pallets",
            "10",
        ]);
        assert!(config.validate().is_ok());
        let records = config.records().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].container, "ABCD1234567");
        assert_eq!(records[0].pallets, 10);
    }

    #[test]
    fn wms_cli_outbound_requires_a_date() {
        let config = WmsCliConfig::parse_from([
            "wms",
            "-c",
            "ABCD1234567",
            "--direction",
            "outbound",
            "-p",
            "PN-100",
        ]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn wms_cli_requires_some_work() {
        let config = WmsCliConfig::parse_from(["wms"]);
        assert!(config.validate().is_err());
        let config = WmsCliConfig::parse_from(["wms", "--query"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn wms_cli_missing_direction_is_reported() {
        let config = WmsCliConfig::parse_from(["wms", "-c", "ABCD1234567", "-p", "PN-100"]);
        assert!(matches!(
            config.records(),
            Err(CheckerError::MissingConfigError { .. })
        ));
    }
}
