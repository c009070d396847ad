//! Alpha Vantage REST client for daily price history.

use chrono::NaiveDate;
use std::time::Duration;
use tiingo_api::types::PriceRecord;

use super::error::AlphaVantageError;
use super::types::DailySeriesResponse;

pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co";

/// Request timeout for Alpha Vantage API calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Alpha Vantage client for `TIME_SERIES_DAILY`.
pub struct AlphaVantageClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl AlphaVantageClient {
    /// Create a new AlphaVantageClient with default base URL.
    pub fn new(api_key: String) -> Result<Self, AlphaVantageError> {
        Self::with_base_url(DEFAULT_BASE_URL, api_key)
    }

    /// Create a new AlphaVantageClient with custom base URL (for testing with wiremock).
    pub fn with_base_url(base_url: &str, api_key: String) -> Result<Self, AlphaVantageError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn with_timeout(self, timeout: Duration) -> Result<Self, AlphaVantageError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, ..self })
    }

    /// Full daily history for `symbol`, oldest first, dropping bars before `start`.
    pub async fn get_daily(
        &self,
        symbol: &str,
        start: Option<NaiveDate>,
    ) -> Result<Vec<PriceRecord>, AlphaVantageError> {
        let url = format!("{}/query", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("function", "TIME_SERIES_DAILY"),
                ("symbol", symbol),
                ("outputsize", "full"),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if status.as_u16() >= 400 {
            return Err(AlphaVantageError::HttpStatus {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let parsed: DailySeriesResponse = serde_json::from_str(&body).map_err(|e| {
            AlphaVantageError::ParseFailed(format!("Failed to deserialize response: {}", e))
        })?;

        if let Some(message) = parsed.error_message {
            return Err(AlphaVantageError::InvalidRequest(message));
        }
        if let Some(message) = parsed.note.or(parsed.information) {
            return Err(AlphaVantageError::RateLimited(message));
        }
        let series = parsed.time_series.ok_or_else(|| {
            AlphaVantageError::ParseFailed("response has no 'Time Series (Daily)'".to_string())
        })?;

        let mut records = Vec::with_capacity(series.len());
        for (date, bar) in &series {
            let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
                AlphaVantageError::ParseFailed(format!("invalid date key '{}'", date))
            })?;
            if start.is_some_and(|start| day < start) {
                continue;
            }
            records.push(bar.to_record(date)?);
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_series_json() -> serde_json::Value {
        serde_json::json!({
            "Meta Data": {
                "1. Information": "Daily Prices (open, high, low, close) and Volumes",
                "2. Symbol": "IBM"
            },
            "Time Series (Daily)": {
                "2024-01-03": {
                    "1. open": "161.0000",
                    "2. high": "161.7300",
                    "3. low": "160.0800",
                    "4. close": "160.1000",
                    "5. volume": "4086840"
                },
                "2024-01-02": {
                    "1. open": "161.0000",
                    "2. high": "162.0600",
                    "3. low": "159.7800",
                    "4. close": "161.5000",
                    "5. volume": "4300416"
                },
                "1999-11-01": {
                    "1. open": "98.5000",
                    "2. high": "98.8100",
                    "3. low": "96.3700",
                    "4. close": "96.7500",
                    "5. volume": "9551800"
                }
            }
        })
    }

    #[tokio::test]
    async fn daily_series_sorted_and_filtered() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/query"))
            .and(query_param("function", "TIME_SERIES_DAILY"))
            .and(query_param("symbol", "IBM"))
            .and(query_param("outputsize", "full"))
            .and(query_param("apikey", "demo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_series_json()))
            .mount(&server)
            .await;

        let client = AlphaVantageClient::with_base_url(&server.uri(), "demo".to_string()).unwrap();
        let all = client.get_daily("IBM", None).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].date.as_deref(), Some("1999-11-01"));

        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let recent = client.get_daily("IBM", Some(start)).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].date.as_deref(), Some("2024-01-02"));
        assert_eq!(recent[1].close, Some(160.1));
    }

    #[tokio::test]
    async fn error_message_is_invalid_request() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Error Message": "Invalid API call."
            })))
            .mount(&server)
            .await;

        let client = AlphaVantageClient::with_base_url(&server.uri(), "demo".to_string()).unwrap();
        let err = client.get_daily("NOPE", None).await.unwrap_err();
        assert!(matches!(err, AlphaVantageError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn note_is_rate_limited() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute."
            })))
            .mount(&server)
            .await;

        let client = AlphaVantageClient::with_base_url(&server.uri(), "demo".to_string()).unwrap();
        let err = client.get_daily("IBM", None).await.unwrap_err();
        assert!(matches!(err, AlphaVantageError::RateLimited(_)));
    }

    #[tokio::test]
    async fn http_error_carries_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&server)
            .await;

        let client = AlphaVantageClient::with_base_url(&server.uri(), "demo".to_string()).unwrap();
        let err = client.get_daily("IBM", None).await.unwrap_err();
        assert!(matches!(err, AlphaVantageError::HttpStatus { status: 503, .. }));
    }

    #[test]
    fn alphavantage_error_display() {
        let err = AlphaVantageError::RateLimited("slow down".to_string());
        assert!(err.to_string().contains("Rate limited"));

        let err = AlphaVantageError::ParseFailed("bad json".to_string());
        assert!(err.to_string().contains("parse"));
        assert!(err.to_string().contains("bad json"));
    }
}
