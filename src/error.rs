use thiserror::Error;

/// Errors surfaced by the library.
///
/// Validation problems found while building tables are not errors: they are
/// collected into a [`crate::sheet::ValidationReport`] and never abort a run.
#[derive(Debug, Error)]
pub enum LocalizationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Sheet request failed ({status}): {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Unknown language: '{0}'")]
    UnknownLanguage(String),

    #[error("Unknown sheet: '{0}'")]
    UnknownSheet(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("{0} not set")]
    Env(&'static str),
}

impl LocalizationError {
    /// Network failures, rate limiting and server errors are worth retrying.
    /// Client errors (other 4xx) and local failures are not.
    pub fn is_transient(&self) -> bool {
        match self {
            LocalizationError::Http(_) => true,
            LocalizationError::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, LocalizationError>;
