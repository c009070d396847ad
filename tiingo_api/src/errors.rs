//! Error types for the Tiingo API client.

/// Errors that can occur when making Tiingo API requests.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The request could not be sent, timed out, or the body could not be read.
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// The base URL and path did not form a valid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The API returned a status >= 400, with a body snippet.
    #[error("Tiingo request failed with status {status}: {body}")]
    HttpStatus { status: u16, body: String },
    /// The API rejected the token (HTTP 401 or 403).
    #[error("Invalid API key (HTTP {status})")]
    InvalidApiKey { status: u16, body: String },
    /// Tiingo answered with its plain-text rate limit notice.
    #[error("Rate limited by Tiingo API")]
    RateLimited,
    /// The body was not valid JSON for the expected type.
    #[error("Failed to parse response: {0}")]
    Parse(String),
    /// The body was valid JSON but not the expected shape.
    #[error("Unexpected payload: {0}")]
    UnexpectedPayload(String),
}

impl Error {
    /// HTTP status code carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } | Self::InvalidApiKey { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Response body carried by the error, if any.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::HttpStatus { body, .. } | Self::InvalidApiKey { body, .. } => Some(body),
            _ => None,
        }
    }
}
