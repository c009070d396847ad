//! Alpha Vantage client for daily bars.
//!
//! The legacy alternate source for daily history. Tiingo is the default;
//! this provider only serves `TIME_SERIES_DAILY`, one symbol per request.

pub mod client;
pub mod error;
pub mod types;

pub use client::{AlphaVantageClient, DEFAULT_BASE_URL};
pub use error::AlphaVantageError;
