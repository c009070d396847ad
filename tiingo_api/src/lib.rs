//! Minimal async client for the Tiingo end-of-day and IEX price endpoints.

mod client;
mod errors;
mod query;
pub mod types;
pub use self::client::{
    daily_prices_path, iex_prices_path, Client, DAILY_BATCH_PATH, DEFAULT_BASE_URL,
    IEX_BATCH_PATH,
};
pub use self::errors::Error;
pub use self::query::{
    is_valid_resample_freq, DailyQuery, IexQuery, Query, QueryCommon, DATE_FORMAT,
    DEFAULT_IEX_COLUMNS, DEFAULT_RESAMPLE_FREQ,
};
