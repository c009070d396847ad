//! Error types for Alpha Vantage API operations.

use thiserror::Error;

/// Errors from Alpha Vantage API operations.
#[derive(Error, Debug)]
pub enum AlphaVantageError {
    #[error("Rate limited by Alpha Vantage: {0}")]
    RateLimited(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Request failed with status {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("Failed to parse response: {0}")]
    ParseFailed(String),
    #[error("Network error")]
    Network(#[from] reqwest::Error),
}
