//! Error types for the library layer.

use std::fmt;

use crate::alphavantage::AlphaVantageError;

/// Errors produced by the library layer, wrapping upstream API errors
/// and adding input validation and payload shaping failures.
#[derive(Debug)]
pub enum FintristError {
    /// An error from the Tiingo API client.
    Api(tiingo_api::Error),
    /// An error from the Alpha Vantage client.
    AlphaVantage(AlphaVantageError),
    /// User-provided input failed validation.
    InvalidInput(String),
    /// No API key was passed in or configured.
    MissingApiKey {
        provider: &'static str,
        env: &'static str,
    },
    /// A requested symbol is absent from a response or table.
    MissingSymbol {
        symbol: String,
        lookup: SymbolLookup,
    },
    /// The response was valid JSON but could not be shaped into a table.
    Payload(String),
    /// The market calendar has no session for the requested window.
    Calendar(String),
    /// The data source cannot serve this kind of request.
    UnsupportedSource(String),
}

/// Where a [`FintristError::MissingSymbol`] lookup failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolLookup {
    /// A multi-ticker response had no entry for the symbol.
    BatchResponse,
    /// Slicing a price table found no rows for the symbol.
    PriceTable,
}

impl fmt::Display for FintristError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api(e) => write!(f, "Tiingo API error: {}", e),
            Self::AlphaVantage(e) => write!(f, "Alpha Vantage error: {}", e),
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            Self::MissingApiKey { provider, env } => write!(
                f,
                "The {} API key must be provided either through the api_key argument or the {} environment variable",
                provider, env
            ),
            Self::MissingSymbol {
                symbol,
                lookup: SymbolLookup::BatchResponse,
            } => write!(f, "batch response missing data for symbol '{}'", symbol),
            Self::MissingSymbol {
                symbol,
                lookup: SymbolLookup::PriceTable,
            } => write!(f, "price table has no rows for symbol '{}'", symbol),
            Self::Payload(msg) => write!(f, "Unexpected payload: {}", msg),
            Self::Calendar(msg) => write!(f, "Market calendar error: {}", msg),
            Self::UnsupportedSource(msg) => write!(f, "Unsupported source: {}", msg),
        }
    }
}

impl std::error::Error for FintristError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Api(e) => Some(e),
            Self::AlphaVantage(e) => Some(e),
            _ => None,
        }
    }
}

impl From<tiingo_api::Error> for FintristError {
    fn from(e: tiingo_api::Error) -> Self {
        Self::Api(e)
    }
}

impl From<AlphaVantageError> for FintristError {
    fn from(e: AlphaVantageError) -> Self {
        Self::AlphaVantage(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_is_visible_through_wrapper() {
        let err = FintristError::from(tiingo_api::Error::HttpStatus {
            status: 404,
            body: "{\"detail\":\"Not Found\"}".to_string(),
        });
        let msg = err.to_string();
        assert!(msg.contains("404"));
        assert!(msg.contains("Not Found"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn missing_key_names_env_var() {
        let err = FintristError::MissingApiKey {
            provider: "Tiingo",
            env: "APIKEY_TIINGO",
        };
        assert!(err.to_string().contains("APIKEY_TIINGO"));
        assert!(err.to_string().contains("Tiingo"));
    }

    #[test]
    fn missing_symbol_display_names_lookup() {
        let batch = FintristError::MissingSymbol {
            symbol: "MSFT".to_string(),
            lookup: SymbolLookup::BatchResponse,
        };
        assert_eq!(batch.to_string(), "batch response missing data for symbol 'MSFT'");

        let table = FintristError::MissingSymbol {
            symbol: "MSFT".to_string(),
            lookup: SymbolLookup::PriceTable,
        };
        assert_eq!(table.to_string(), "price table has no rows for symbol 'MSFT'");
    }
}
