//! Fetch error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid granularity: {0}. Allowed values are 60, 300, 900, 3600, 21600, 86400 seconds.")]
    InvalidGranularity(u32),

    #[error("Failed to send request: {0}")]
    RequestFailure(String),

    #[error("Error fetching data: {status} {reason}")]
    HttpStatus { status: u16, reason: String },

    #[error("Error decoding JSON response: {0}")]
    ResponseParse(String),

    #[error("Interrupted")]
    Interrupted,

    #[error("Failed to write output: {0}")]
    Output(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        Self::RequestFailure(err.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::ResponseParse(err.to_string())
    }
}

impl From<csv::Error> for FetchError {
    fn from(err: csv::Error) -> Self {
        Self::Output(err.to_string())
    }
}

impl From<std::io::Error> for FetchError {
    fn from(err: std::io::Error) -> Self {
        Self::Output(err.to_string())
    }
}

pub type FetchResult<T> = Result<T, FetchError>;
