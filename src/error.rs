use thiserror::Error;

use crate::models::JobSource;

/// A result page could not be retrieved.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("blocked by site (HTTP {status})")]
    Blocked { status: u16 },

    #[error("unexpected HTTP status {status}")]
    Status { status: u16 },

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Blocked sites keep blocking; paging further is pointless.
    pub fn is_blocked(&self) -> bool {
        matches!(self, FetchError::Blocked { .. })
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => FetchError::Status { status: status.as_u16() },
            None => FetchError::Network(e.to_string()),
        }
    }
}

/// Page content did not have the structure the extractor expects.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("no job listings found on {site} page")]
    NoListings { site: JobSource },

    #[error("invalid selector: {0}")]
    Selector(String),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("could not parse config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
