use crate::utils::error::{CheckerError, Result};
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// ISO 6346 shape: four letters (owner + equipment category) then seven digits.
fn container_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z]{4}\d{7}$").expect("valid regex"))
}

pub fn is_valid_container_number(number: &str) -> bool {
    container_number_re().is_match(number)
}

/// Trim and uppercase, the way terminal portals expect container numbers.
pub fn normalize_container_number(raw: &str) -> String {
    raw.trim().to_uppercase()
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(CheckerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(CheckerError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(CheckerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CheckerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(CheckerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

/// Read a pair of credential environment variables, erroring with both names
/// when either is unset.
pub fn credentials_from_env(user_var: &str, pass_var: &str) -> Result<(String, String)> {
    match (std::env::var(user_var), std::env::var(pass_var)) {
        (Ok(user), Ok(pass)) if !user.is_empty() && !pass.is_empty() => Ok((user, pass)),
        _ => Err(CheckerError::MissingCredentials {
            vars: format!("{}, {}", user_var, pass_var),
        }),
    }
}
