//! Daily and IEX price readers.
//!
//! A [`Reader`] resolves symbols and the date window, picks between the
//! multi-ticker endpoint and one request per symbol, and returns a
//! multi-level [`PriceFrame`].

use chrono::{NaiveDate, Utc};
use tiingo_api::{
    daily_prices_path, iex_prices_path, is_valid_resample_freq, Client, DailyQuery, IexQuery,
    Query, DAILY_BATCH_PATH, DEFAULT_RESAMPLE_FREQ, IEX_BATCH_PATH,
};

use crate::batch::group_batch_payload;
use crate::config::Settings;
use crate::dates::{years_before, DateWindow};
use crate::error::{FintristError, SymbolLookup};
use crate::frame::{IndexKind, PriceFrame};
use crate::symbols::SymbolSpec;

/// Years of history the daily reader asks for by default.
pub const DAILY_DEFAULT_YEARS: u32 = 5;

/// A Tiingo price endpoint family.
pub trait PriceEndpoint {
    type Query: Query + Clone;

    fn symbol_path(&self, symbol: &str) -> String;

    /// Multi-ticker path, if the endpoint has one.
    fn batch_path(&self) -> Option<&'static str>;

    fn index_kind(&self) -> IndexKind;

    /// Start date used when only the end of the window is known.
    fn default_start(&self, end: NaiveDate) -> NaiveDate;

    /// Query carrying the endpoint's own parameters, without dates.
    fn query(&self) -> Self::Query;

    fn validate(&self) -> Result<(), FintristError> {
        Ok(())
    }
}

/// End-of-day bars.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Daily;

impl PriceEndpoint for Daily {
    type Query = DailyQuery;

    fn symbol_path(&self, symbol: &str) -> String {
        daily_prices_path(symbol)
    }

    fn batch_path(&self) -> Option<&'static str> {
        Some(DAILY_BATCH_PATH)
    }

    fn index_kind(&self) -> IndexKind {
        IndexKind::Date
    }

    fn default_start(&self, end: NaiveDate) -> NaiveDate {
        years_before(end, DAILY_DEFAULT_YEARS)
    }

    fn query(&self) -> DailyQuery {
        DailyQuery::default()
    }
}

/// Intraday IEX bars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Iex {
    pub freq: String,
    pub after_hours: Option<bool>,
}

impl Default for Iex {
    fn default() -> Self {
        Self {
            freq: DEFAULT_RESAMPLE_FREQ.to_string(),
            after_hours: None,
        }
    }
}

impl Iex {
    pub fn with_freq(freq: impl Into<String>) -> Self {
        Self {
            freq: freq.into(),
            ..Self::default()
        }
    }
}

impl PriceEndpoint for Iex {
    type Query = IexQuery;

    fn symbol_path(&self, symbol: &str) -> String {
        iex_prices_path(symbol)
    }

    fn batch_path(&self) -> Option<&'static str> {
        Some(IEX_BATCH_PATH)
    }

    fn index_kind(&self) -> IndexKind {
        IndexKind::Timestamp
    }

    fn default_start(&self, end: NaiveDate) -> NaiveDate {
        end
    }

    fn query(&self) -> IexQuery {
        let query = IexQuery::default().with_resample_freq(&self.freq);
        match self.after_hours {
            Some(after_hours) => query.with_after_hours(after_hours),
            None => query,
        }
    }

    fn validate(&self) -> Result<(), FintristError> {
        if is_valid_resample_freq(&self.freq) {
            Ok(())
        } else {
            Err(FintristError::InvalidInput(format!(
                "invalid resample frequency '{}', expected e.g. 5min, 1hour or 1day",
                self.freq
            )))
        }
    }
}

/// Reads prices for one or more symbols from a Tiingo endpoint.
pub struct Reader<E: PriceEndpoint> {
    client: Client,
    symbols: SymbolSpec,
    endpoint: E,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    date_filter: bool,
}

pub type DailyReader = Reader<Daily>;
pub type IexReader = Reader<Iex>;

impl Reader<Daily> {
    pub fn daily(client: Client, symbols: impl Into<SymbolSpec>) -> Self {
        Self::new(client, symbols, Daily)
    }
}

impl Reader<Iex> {
    pub fn iex(client: Client, symbols: impl Into<SymbolSpec>, freq: impl Into<String>) -> Self {
        Self::new(client, symbols, Iex::with_freq(freq))
    }
}

impl<E: PriceEndpoint> Reader<E> {
    pub fn new(client: Client, symbols: impl Into<SymbolSpec>, endpoint: E) -> Self {
        Self {
            client,
            symbols: symbols.into(),
            endpoint,
            start: None,
            end: None,
            date_filter: true,
        }
    }

    pub fn with_start(mut self, start: NaiveDate) -> Self {
        self.start = Some(start);
        self
    }

    pub fn with_end(mut self, end: NaiveDate) -> Self {
        self.end = Some(end);
        self
    }

    /// Sends no dates at all, letting Tiingo pick its latest window.
    /// This is the only mode in which several symbols share one request.
    pub fn without_date_filter(mut self) -> Self {
        self.date_filter = false;
        self
    }

    pub fn symbols(&self) -> &SymbolSpec {
        &self.symbols
    }

    pub fn endpoint(&self) -> &E {
        &self.endpoint
    }

    /// The resolved window, or `None` when no date filter is sent.
    pub fn window(&self, today: NaiveDate) -> Result<Option<DateWindow>, FintristError> {
        if !self.date_filter {
            return Ok(None);
        }
        DateWindow::resolve(self.start, self.end, today, |end| {
            self.endpoint.default_start(end)
        })
        .map(Some)
    }

    pub fn query(&self, today: NaiveDate) -> Result<E::Query, FintristError> {
        let query = self.endpoint.query();
        Ok(match self.window(today)? {
            Some(window) => query.with_date_range(window.start, window.end),
            None => query,
        })
    }

    pub fn should_use_batch(&self, symbols: &[String], query: &E::Query) -> bool {
        symbols.len() > 1 && self.endpoint.batch_path().is_some() && !query.has_date_filter()
    }

    /// Fetches every symbol and returns a frame keyed by (symbol, date).
    pub async fn read(&self) -> Result<PriceFrame, FintristError> {
        self.endpoint.validate()?;
        let symbols = self.symbols.to_list()?;
        let query = self.query(Utc::now().date_naive())?;
        let kind = self.endpoint.index_kind();

        let mut parts = Vec::with_capacity(symbols.len());
        match self.endpoint.batch_path() {
            Some(path) if self.should_use_batch(&symbols, &query) => {
                tracing::debug!("Fetching {} symbols in one batch request", symbols.len());
                let payload = self.client.get_batch_prices(path, &symbols, &query).await?;
                let mut grouped = group_batch_payload(payload)?;
                for symbol in symbols {
                    let records = grouped.remove(&symbol).ok_or_else(|| {
                        FintristError::MissingSymbol {
                            symbol: symbol.clone(),
                            lookup: SymbolLookup::BatchResponse,
                        }
                    })?;
                    parts.push((symbol, PriceFrame::from_records(records, kind)?));
                }
            }
            _ => {
                tracing::debug!("Fetching {} symbols one request each", symbols.len());
                for symbol in symbols {
                    let records = self
                        .client
                        .get_prices(&self.endpoint.symbol_path(&symbol), &query)
                        .await?;
                    tracing::debug!("{}: {} records", symbol, records.len());
                    parts.push((symbol, PriceFrame::from_records(records, kind)?));
                }
            }
        }
        Ok(PriceFrame::concat(kind, parts))
    }
}

/// Slices out the symbol when a single bare symbol was asked for.
pub fn collapse_single(frame: PriceFrame, symbols: &SymbolSpec) -> Result<PriceFrame, FintristError> {
    match symbols {
        SymbolSpec::Single(symbol) if frame.is_multi() => {
            if frame.is_empty() {
                return Ok(PriceFrame::empty(frame.kind()));
            }
            frame.xs(symbol.trim())
        }
        _ => Ok(frame),
    }
}

/// Reads end-of-day bars in one call.
pub async fn read_daily(
    symbols: impl Into<SymbolSpec>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    api_key: Option<&str>,
    settings: &Settings,
) -> Result<PriceFrame, FintristError> {
    let mut reader = Reader::daily(settings.tiingo_client(api_key)?, symbols);
    reader.start = start;
    reader.end = end;
    reader.read().await
}

/// Reads IEX bars in one call.
pub async fn read_intraday(
    symbols: impl Into<SymbolSpec>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    freq: &str,
    api_key: Option<&str>,
    settings: &Settings,
) -> Result<PriceFrame, FintristError> {
    let mut reader = Reader::iex(settings.tiingo_client(api_key)?, symbols, freq);
    reader.start = start;
    reader.end = end;
    reader.read().await
}
