//! High-level access to a symbol's price history.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, Utc};
use tiingo_api::{is_valid_resample_freq, DEFAULT_RESAMPLE_FREQ};

use crate::calendar::{end_of_day, latest_market_day, MarketCalendar, NyseCalendar};
use crate::config::Settings;
use crate::error::FintristError;
use crate::frame::{IndexKind, PriceFrame};
use crate::reader::{collapse_single, Reader};
use crate::symbols::SymbolSpec;

/// Earliest date requested from Alpha Vantage.
const ALPHAVANTAGE_START: (i32, u32, u32) = (1900, 1, 1);

/// Bar size for a [`Stock`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frequency {
    Daily,
    /// Tiingo resample string such as `5min` or `1hour`.
    Intraday(String),
}

impl FromStr for Frequency {
    type Err = FintristError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        if s == "daily" {
            return Ok(Self::Daily);
        }
        if is_valid_resample_freq(&s) {
            return Ok(Self::Intraday(s));
        }
        Err(FintristError::InvalidInput(format!(
            "unknown frequency '{}', expected 'daily' or e.g. 5min",
            s
        )))
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Daily => write!(f, "daily"),
            Self::Intraday(freq) => write!(f, "{}", freq),
        }
    }
}

/// Where price data comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Tiingo,
    AlphaVantage,
    /// A prepared frame, returned as-is.
    Mock(PriceFrame),
}

impl FromStr for Source {
    type Err = FintristError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tiingo" => Ok(Self::Tiingo),
            "av" | "alphavantage" => Ok(Self::AlphaVantage),
            other => Err(FintristError::UnsupportedSource(format!(
                "unknown source '{}'",
                other
            ))),
        }
    }
}

/// One or more symbols at a given frequency.
pub struct Stock {
    symbols: SymbolSpec,
    freq: Frequency,
    settings: Settings,
    calendar: Box<dyn MarketCalendar + Send + Sync>,
}

impl Stock {
    pub fn new(symbols: impl Into<SymbolSpec>, freq: Frequency) -> Self {
        Self {
            symbols: symbols.into(),
            freq,
            settings: Settings::default(),
            calendar: Box::new(NyseCalendar),
        }
    }

    /// Like [`Stock::new`] with settings read from the environment.
    pub fn from_env(symbols: impl Into<SymbolSpec>, freq: Frequency) -> Result<Self, FintristError> {
        Ok(Self::new(symbols, freq).with_settings(Settings::from_env()?))
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_calendar(mut self, calendar: impl MarketCalendar + Send + Sync + 'static) -> Self {
        self.calendar = Box::new(calendar);
        self
    }

    pub fn symbols(&self) -> &SymbolSpec {
        &self.symbols
    }

    pub fn freq(&self) -> &Frequency {
        &self.freq
    }

    /// Daily history or the latest session's bars, depending on frequency.
    pub async fn get_data(&self) -> Result<PriceFrame, FintristError> {
        match &self.freq {
            Frequency::Daily => self.daily(None).await,
            Frequency::Intraday(freq) => self.intraday(None, Some(freq), None).await,
        }
    }

    /// Daily history. Tiingo is used when no source is given.
    pub async fn daily(&self, source: Option<Source>) -> Result<PriceFrame, FintristError> {
        let frame = match source.unwrap_or(Source::Tiingo) {
            Source::Tiingo => {
                let client = self.settings.tiingo_client(None)?;
                Reader::daily(client, self.symbols.clone()).read().await?
            }
            Source::AlphaVantage => self.alphavantage_daily().await?,
            Source::Mock(frame) => frame,
        };
        collapse_single(frame, &self.symbols)
    }

    /// Bars for the latest session at or before `day`.
    pub async fn intraday(
        &self,
        day: Option<NaiveDate>,
        freq: Option<&str>,
        source: Option<Source>,
    ) -> Result<PriceFrame, FintristError> {
        let reference = match day {
            Some(day) => end_of_day(day).ok_or_else(|| {
                FintristError::InvalidInput(format!("no end of day for {}", day))
            })?,
            None => Utc::now(),
        };
        let session = latest_market_day(self.calendar.as_ref(), reference)?;
        let freq = freq.unwrap_or(DEFAULT_RESAMPLE_FREQ);
        tracing::debug!("Intraday session {} at {}", session.date, freq);

        let frame = match source.unwrap_or(Source::Tiingo) {
            Source::Tiingo => {
                let client = self.settings.tiingo_client(None)?;
                Reader::iex(client, self.symbols.clone(), freq)
                    .with_start(session.date)
                    .with_end(session.date)
                    .read()
                    .await?
            }
            Source::AlphaVantage => {
                return Err(FintristError::UnsupportedSource(
                    "Alpha Vantage does not serve intraday bars".to_string(),
                ))
            }
            Source::Mock(frame) => frame,
        };
        collapse_single(frame, &self.symbols)
    }

    async fn alphavantage_daily(&self) -> Result<PriceFrame, FintristError> {
        let client = self.settings.alphavantage_client(None)?;
        let (y, m, d) = ALPHAVANTAGE_START;
        let start = NaiveDate::from_ymd_opt(y, m, d);
        let mut parts = Vec::new();
        for symbol in self.symbols.to_list()? {
            let records = client.get_daily(&symbol, start).await?;
            parts.push((symbol, PriceFrame::from_records(records, IndexKind::Date)?));
        }
        Ok(PriceFrame::concat(IndexKind::Date, parts))
    }
}

impl fmt::Display for Stock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Stock: {}, {}", self.symbols, self.freq)
    }
}
