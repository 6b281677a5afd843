use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckerError {
    #[error("Login rejected by {terminal}: {reason}")]
    AuthenticationFailed { terminal: String, reason: String },

    #[error("Portal {terminal} did not respond within {seconds}s")]
    PortalTimeout { terminal: String, seconds: u64 },

    #[error("Element not found: {selector} (the page layout may have changed)")]
    ElementNotFound { selector: String },

    #[error("Captcha not resolved within {seconds}s")]
    CaptchaUnresolved { seconds: u64 },

    #[error("Browser launch failed: {0}")]
    BrowserLaunch(String),

    #[error("CDP error: {0}")]
    Cdp(String),

    #[error("Record {container} already exists in the WMS")]
    DuplicateRecord { container: String },

    #[error("Submission failed for {container}: {reason}")]
    SubmissionFailed { container: String, reason: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Missing credentials: set {vars}")]
    MissingCredentials { vars: String },
}

impl From<chromiumoxide::error::CdpError> for CheckerError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        CheckerError::Cdp(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Scoped to one terminal or one record; the run continued.
    Low,
    /// The batch ran but produced nothing useful.
    Medium,
    /// The workflow could not run at all.
    High,
    /// Bad configuration or environment; nothing was attempted.
    Critical,
}

impl CheckerError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CheckerError::AuthenticationFailed { .. }
            | CheckerError::PortalTimeout { .. }
            | CheckerError::ElementNotFound { .. }
            | CheckerError::CaptchaUnresolved { .. }
            | CheckerError::DuplicateRecord { .. }
            | CheckerError::SubmissionFailed { .. } => ErrorSeverity::Low,
            CheckerError::Cdp(_) => ErrorSeverity::Medium,
            CheckerError::BrowserLaunch(_)
            | CheckerError::CsvError(_)
            | CheckerError::IoError(_)
            | CheckerError::SerializationError(_) => ErrorSeverity::High,
            CheckerError::InvalidConfigValueError { .. }
            | CheckerError::MissingConfigError { .. }
            | CheckerError::MissingCredentials { .. } => ErrorSeverity::Critical,
        }
    }

    /// Process exit code for a fatal error, following severity.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            CheckerError::AuthenticationFailed { .. } => {
                "Check the portal credentials in your environment variables"
            }
            CheckerError::PortalTimeout { .. } => "The portal may be down or slow; retry later",
            CheckerError::ElementNotFound { .. } => {
                "The portal layout may have changed; the selectors need updating"
            }
            CheckerError::CaptchaUnresolved { .. } => {
                "Re-run without --headless and complete the challenge in the browser window"
            }
            CheckerError::BrowserLaunch(_) => {
                "Install Chrome/Chromium or point --chrome (or $CHROME) at an executable"
            }
            CheckerError::MissingCredentials { .. } => {
                "Export the listed environment variables before running"
            }
            _ => "See the log output above for details",
        }
    }
}

pub type Result<T> = std::result::Result<T, CheckerError>;
