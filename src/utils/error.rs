use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaseOddsError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Timed out after {waited:?} waiting for {what}")]
    TimeoutError { what: String, waited: Duration },

    #[error("Failed to extract case data from {url}: {message}")]
    ExtractionError { url: String, message: String },

    #[error("Case discovery returned no URLs after {attempts} attempts")]
    DiscoveryExhausted { attempts: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CaseOddsError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CaseOddsError::TimeoutError { .. } | CaseOddsError::ExtractionError { .. } => {
                ErrorSeverity::Low
            }
            CaseOddsError::HttpError(_) | CaseOddsError::DiscoveryExhausted { .. } => {
                ErrorSeverity::Medium
            }
            CaseOddsError::CsvError(_)
            | CaseOddsError::SerializationError(_)
            | CaseOddsError::ConfigError { .. }
            | CaseOddsError::InvalidConfigValueError { .. } => ErrorSeverity::High,
            CaseOddsError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    /// Whether the crawl may drop the current case and keep going.
    pub fn is_case_local(&self) -> bool {
        matches!(
            self,
            CaseOddsError::TimeoutError { .. }
                | CaseOddsError::ExtractionError { .. }
                | CaseOddsError::HttpError(_)
        )
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            CaseOddsError::HttpError(_) => {
                "Could not reach the case site. Check the network connection.".to_string()
            }
            CaseOddsError::CsvError(_) => {
                "A stats CSV file is malformed. Delete it or run with --refresh.".to_string()
            }
            CaseOddsError::IoError(e) => format!("File system error: {}", e),
            CaseOddsError::SerializationError(_) => {
                "Failed to render the ranking summary.".to_string()
            }
            CaseOddsError::ConfigError { message } => format!("Bad configuration: {}", message),
            CaseOddsError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid setting '{}': {}", field, reason)
            }
            CaseOddsError::TimeoutError { what, .. } => {
                format!("The page took too long to show {}", what)
            }
            CaseOddsError::ExtractionError { url, .. } => {
                format!("Could not read case data from {}", url)
            }
            CaseOddsError::DiscoveryExhausted { attempts } => format!(
                "No cases were found after {} attempts. Is the site up?",
                attempts
            ),
        }
    }
}

pub type Result<T> = std::result::Result<T, CaseOddsError>;
