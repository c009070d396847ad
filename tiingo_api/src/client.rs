//! HTTP client for the Tiingo REST API.

use std::time::Duration;

use serde_json::Value;
use url::Url;

use crate::{
    query::{DailyQuery, IexQuery, Query},
    types::PriceRecord,
    Error,
};

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://api.tiingo.com";

/// Multi-ticker end-of-day endpoint. Takes `tickers=A,B,...`.
pub const DAILY_BATCH_PATH: &str = "/tiingo/daily/prices";

/// Multi-ticker IEX endpoint. Takes `tickers=A,B,...`.
pub const IEX_BATCH_PATH: &str = "/iex/prices";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("fintrist/", env!("CARGO_PKG_VERSION"));

/// Per-ticker end-of-day endpoint.
pub fn daily_prices_path(ticker: &str) -> String {
    format!("/tiingo/daily/{}/prices", ticker)
}

/// Per-ticker IEX endpoint.
pub fn iex_prices_path(ticker: &str) -> String {
    format!("/iex/{}/prices", ticker)
}

/// HTTP client for the Tiingo REST API.
///
/// Authenticates with an `Authorization: Token ...` header. Requests are
/// issued one at a time; there is no retry or caching layer.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    api_key: String,
    /// Base URL for the API. Defaults to `https://api.tiingo.com`.
    base_url: String,
}

impl Client {
    /// Creates a client pointing at the production Tiingo API.
    pub fn new(api_key: impl Into<String>) -> Result<Self, Error> {
        Self::with_base_url(DEFAULT_BASE_URL, api_key)
    }

    /// Creates a client with a custom base URL. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str, api_key: impl Into<String>) -> Result<Self, Error> {
        Self::build(base_url, api_key.into(), REQUEST_TIMEOUT)
    }

    /// Rebuilds the client with a different request timeout.
    pub fn with_timeout(self, timeout: Duration) -> Result<Self, Error> {
        Self::build(&self.base_url, self.api_key, timeout)
    }

    fn build(base_url: &str, api_key: String, timeout: Duration) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get_url(
        &self,
        path: &str,
        query: &impl Query,
        tickers: Option<&[String]>,
    ) -> Result<Url, Error> {
        let url = Url::parse(format!("{}{}", &self.base_url, path).as_str()).map_err(|e| {
            tracing::error!("Invalid URL constructed: {}", e);
            e
        })?;
        let mut url = query.add_to_url(&url);
        if let Some(tickers) = tickers {
            url.query_pairs_mut()
                .append_pair("tickers", &tickers.join(","));
        }
        Ok(url)
    }

    async fn get(&self, url: Url) -> Result<Value, Error> {
        tracing::debug!("GET {}?{}", url.path(), url.query().unwrap_or(""));
        let resp = self
            .http
            .get(url)
            .header("Authorization", format!("Token {}", self.api_key))
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to get resource: {}", e);
                Error::Network(e)
            })?;

        let status = resp.status();
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_lowercase();
        let body = resp.text().await.map_err(|e| {
            tracing::error!("Failed to read response body: {}", e);
            Error::Network(e)
        })?;

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(Error::InvalidApiKey {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        if status.as_u16() >= 400 {
            let snippet = truncate_body(&body);
            tracing::error!("Request failed with status {}: {}", status, snippet);
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: snippet,
            });
        }

        // Tiingo quirk: rate-limit responses are HTTP 200 with a text body
        if content_type.contains("text/plain") || content_type.contains("text/html") {
            let lower = body.to_lowercase();
            if lower.contains("rate limit") || lower.contains("too many requests") {
                tracing::warn!("Tiingo rate limit hit");
                return Err(Error::RateLimited);
            }
        }

        serde_json::from_str::<Value>(&body).map_err(|e| {
            let snippet = truncate_body(&body);
            tracing::error!("Failed to parse resource: {} | body: {}", e, snippet);
            Error::Parse(format!("{} | body: {}", e, snippet))
        })
    }

    /// Fetches the price records for one ticker from `path`.
    pub async fn get_prices<Q: Query>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<Vec<PriceRecord>, Error> {
        let url = self.get_url(path, query, None)?;
        let payload = self.get(url).await?;
        if !payload.is_array() {
            return Err(Error::UnexpectedPayload(
                "Tiingo response did not contain price records".to_string(),
            ));
        }
        serde_json::from_value(payload).map_err(|e| Error::Parse(e.to_string()))
    }

    /// Fetches a multi-ticker response from `path`.
    ///
    /// Entries are returned as raw JSON: the batch shape varies between
    /// `{ticker, priceData}` objects and flat records.
    pub async fn get_batch_prices<Q: Query>(
        &self,
        path: &str,
        tickers: &[String],
        query: &Q,
    ) -> Result<Vec<Value>, Error> {
        let url = self.get_url(path, query, Some(tickers))?;
        match self.get(url).await? {
            Value::Array(entries) => Ok(entries),
            _ => Err(Error::UnexpectedPayload(
                "Tiingo batch response was not a list".to_string(),
            )),
        }
    }

    /// Fetches end-of-day bars for one ticker.
    pub async fn get_daily_prices(
        &self,
        ticker: &str,
        query: &DailyQuery,
    ) -> Result<Vec<PriceRecord>, Error> {
        self.get_prices(&daily_prices_path(ticker), query).await
    }

    /// Fetches end-of-day bars for several tickers in one request.
    pub async fn get_daily_prices_batch(
        &self,
        tickers: &[String],
        query: &DailyQuery,
    ) -> Result<Vec<Value>, Error> {
        self.get_batch_prices(DAILY_BATCH_PATH, tickers, query)
            .await
    }

    /// Fetches intraday IEX bars for one ticker.
    pub async fn get_iex_prices(
        &self,
        ticker: &str,
        query: &IexQuery,
    ) -> Result<Vec<PriceRecord>, Error> {
        self.get_prices(&iex_prices_path(ticker), query).await
    }

    /// Fetches intraday IEX bars for several tickers in one request.
    pub async fn get_iex_prices_batch(
        &self,
        tickers: &[String],
        query: &IexQuery,
    ) -> Result<Vec<Value>, Error> {
        self.get_batch_prices(IEX_BATCH_PATH, tickers, query).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    match body.char_indices().nth(MAX) {
        None => body.to_string(),
        Some((idx, _)) => format!("{}...[truncated]", &body[..idx]),
    }
}
