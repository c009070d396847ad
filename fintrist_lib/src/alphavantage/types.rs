//! Response types for the Alpha Vantage `TIME_SERIES_DAILY` function.

use std::collections::BTreeMap;

use serde::Deserialize;
use tiingo_api::types::PriceRecord;

use super::error::AlphaVantageError;

/// Top-level response. On failure Alpha Vantage still answers HTTP 200 and
/// puts the reason in one of the message fields.
#[derive(Debug, Clone, Deserialize)]
pub struct DailySeriesResponse {
    #[serde(rename = "Time Series (Daily)", default)]
    pub time_series: Option<BTreeMap<String, DailyBar>>,
    #[serde(rename = "Error Message", default)]
    pub error_message: Option<String>,
    #[serde(rename = "Note", default)]
    pub note: Option<String>,
    #[serde(rename = "Information", default)]
    pub information: Option<String>,
}

/// One day's bar. Every number arrives as a string.
#[derive(Debug, Clone, Deserialize)]
pub struct DailyBar {
    #[serde(rename = "1. open")]
    pub open: String,
    #[serde(rename = "2. high")]
    pub high: String,
    #[serde(rename = "3. low")]
    pub low: String,
    #[serde(rename = "4. close")]
    pub close: String,
    #[serde(rename = "5. volume")]
    pub volume: String,
}

impl DailyBar {
    /// Converts to the shared record shape, keyed by `date`.
    pub fn to_record(&self, date: &str) -> Result<PriceRecord, AlphaVantageError> {
        Ok(PriceRecord {
            date: Some(date.to_string()),
            open: Some(parse_number(&self.open)?),
            high: Some(parse_number(&self.high)?),
            low: Some(parse_number(&self.low)?),
            close: Some(parse_number(&self.close)?),
            volume: Some(parse_number(&self.volume)?),
            extra: BTreeMap::new(),
        })
    }
}

fn parse_number(raw: &str) -> Result<f64, AlphaVantageError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| AlphaVantageError::ParseFailed(format!("not a number: '{}'", raw)))
}
