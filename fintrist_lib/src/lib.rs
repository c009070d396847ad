//! Library layer for fintrist: Tiingo price readers, a market calendar and
//! a `Stock` facade.
//!
//! Wraps the `tiingo_api` crate with symbol and date normalization, batch
//! response grouping and a sorted (symbol, date) price table.

pub mod alphavantage;
pub mod batch;
pub mod calendar;
pub mod config;
pub mod dates;
pub mod error;
pub mod frame;
pub mod reader;
pub mod stock;
pub mod symbols;

pub use tiingo_api;
pub use tiingo_api::types;
pub use tiingo_api::{DailyQuery, IexQuery, Query};

pub use alphavantage::{AlphaVantageClient, AlphaVantageError};
pub use calendar::{
    latest_market_day, market_current, market_open, market_schedule, LocalSession,
    MarketCalendar, MarketSession, NyseCalendar,
};
pub use config::Settings;
pub use dates::{parse_date_input, parse_timestamp, DateWindow};
pub use error::{FintristError, SymbolLookup};
pub use frame::{IndexKind, PriceFrame, PriceRow, INDEX_NAME};
pub use reader::{read_daily, read_intraday, Daily, DailyReader, Iex, IexReader, PriceEndpoint, Reader};
pub use stock::{Frequency, Source, Stock};
pub use symbols::SymbolSpec;
