//! In-memory price table keyed by (symbol, date).
//!
//! A [`PriceFrame`] is either single-level (rows keyed by date only) or
//! multi-level (rows keyed by symbol, then date). Rows are always kept
//! sorted by key with no duplicate keys.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use tiingo_api::types::PriceRecord;

use crate::dates::parse_timestamp;
use crate::error::{FintristError, SymbolLookup};

/// Name of the time index level.
pub const INDEX_NAME: &str = "date";

/// The price columns every reader may fill.
pub const OHLCV_COLUMNS: [&str; 5] = ["open", "high", "low", "close", "volume"];

/// How the time index is keyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    /// One row per day, keyed at midnight UTC.
    Date,
    /// One row per bar, keyed at the bar's instant.
    Timestamp,
}

impl IndexKind {
    pub fn parse_key(self, raw: &str) -> Result<DateTime<Utc>, FintristError> {
        let at = parse_timestamp(raw)?;
        Ok(match self {
            Self::Date => at.date_naive().and_time(chrono::NaiveTime::MIN).and_utc(),
            Self::Timestamp => at,
        })
    }

    pub fn format_key(self, at: &DateTime<Utc>) -> String {
        match self {
            Self::Date => at.format("%Y-%m-%d").to_string(),
            Self::Timestamp => at.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// One row of a [`PriceFrame`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceRow {
    /// Set on multi-level frames only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    pub at: DateTime<Utc>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
    /// Provider-specific columns such as `adjClose` or `divCash`.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl PriceRow {
    fn from_record(record: PriceRecord, kind: IndexKind) -> Result<Self, FintristError> {
        let key = record.time_key().ok_or_else(|| {
            FintristError::Payload("Tiingo response missing 'date' field".to_string())
        })?;
        let at = kind.parse_key(key)?;
        let mut extra = record.extra;
        extra.remove("timestamp");
        Ok(Self {
            symbol: None,
            at,
            open: record.open,
            high: record.high,
            low: record.low,
            close: record.close,
            volume: record.volume,
            extra,
        })
    }

    /// Numeric value of `column`, looking at OHLCV first and then `extra`.
    pub fn value(&self, column: &str) -> Option<f64> {
        match column {
            "open" => self.open,
            "high" => self.high,
            "low" => self.low,
            "close" => self.close,
            "volume" => self.volume,
            other => self.extra.get(other).and_then(Value::as_f64),
        }
    }

    fn key(&self) -> (Option<&str>, DateTime<Utc>) {
        (self.symbol.as_deref(), self.at)
    }
}

/// Sorted price table.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceFrame {
    kind: IndexKind,
    multi: bool,
    rows: Vec<PriceRow>,
}

impl PriceFrame {
    /// A single-level frame with no rows.
    pub fn empty(kind: IndexKind) -> Self {
        Self {
            kind,
            multi: false,
            rows: Vec::new(),
        }
    }

    /// Single-level frame from raw API records.
    pub fn from_records(records: Vec<PriceRecord>, kind: IndexKind) -> Result<Self, FintristError> {
        let rows = records
            .into_iter()
            .map(|r| PriceRow::from_record(r, kind))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_rows(rows, kind))
    }

    /// Frame from prepared rows. It is multi-level when any row carries a symbol.
    pub fn from_rows(rows: Vec<PriceRow>, kind: IndexKind) -> Self {
        let multi = rows.iter().any(|r| r.symbol.is_some());
        Self {
            kind,
            multi,
            rows: sort_dedup(rows),
        }
    }

    /// Stacks per-symbol frames under a symbol level.
    pub fn concat(kind: IndexKind, parts: Vec<(String, PriceFrame)>) -> Self {
        let mut rows = Vec::with_capacity(parts.iter().map(|(_, f)| f.len()).sum());
        for (symbol, frame) in parts {
            rows.extend(frame.rows.into_iter().map(|mut row| {
                row.symbol = Some(symbol.clone());
                row
            }));
        }
        Self {
            kind,
            multi: true,
            rows: sort_dedup(rows),
        }
    }

    pub fn kind(&self) -> IndexKind {
        self.kind
    }

    /// True when rows are keyed by (symbol, date).
    pub fn is_multi(&self) -> bool {
        self.multi
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[PriceRow] {
        &self.rows
    }

    /// Distinct symbols in index order.
    pub fn symbols(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for symbol in self.rows.iter().filter_map(|r| r.symbol.as_deref()) {
            if out.last() != Some(&symbol) {
                out.push(symbol);
            }
        }
        out
    }

    pub fn get(&self, symbol: &str, at: DateTime<Utc>) -> Option<&PriceRow> {
        self.rows
            .iter()
            .find(|r| r.at == at && r.symbol.as_deref().is_some_and(|s| s.eq_ignore_ascii_case(symbol)))
    }

    /// Row at `at` on a single-level frame.
    pub fn row_at(&self, at: DateTime<Utc>) -> Option<&PriceRow> {
        self.rows.iter().find(|r| r.at == at)
    }

    /// Values of one column in row order.
    pub fn column(&self, name: &str) -> Vec<Option<f64>> {
        self.rows.iter().map(|r| r.value(name)).collect()
    }

    /// OHLCV columns that hold any value, then extra columns sorted by name.
    pub fn columns(&self) -> Vec<String> {
        let mut out: Vec<String> = OHLCV_COLUMNS
            .iter()
            .filter(|c| self.rows.iter().any(|r| r.value(c).is_some()))
            .map(|c| c.to_string())
            .collect();
        let extra: BTreeSet<&String> = self.rows.iter().flat_map(|r| r.extra.keys()).collect();
        out.extend(extra.into_iter().cloned());
        out
    }

    /// Rows for `symbol` as a single-level frame.
    pub fn xs(&self, symbol: &str) -> Result<PriceFrame, FintristError> {
        let rows: Vec<PriceRow> = self
            .rows
            .iter()
            .filter(|r| r.symbol.as_deref().is_some_and(|s| s.eq_ignore_ascii_case(symbol)))
            .cloned()
            .map(|mut r| {
                r.symbol = None;
                r
            })
            .collect();
        if rows.is_empty() {
            return Err(FintristError::MissingSymbol {
                symbol: symbol.to_string(),
                lookup: SymbolLookup::PriceTable,
            });
        }
        Ok(Self {
            kind: self.kind,
            multi: false,
            rows,
        })
    }

    /// Rendered index value for `row`.
    pub fn index_label(&self, row: &PriceRow) -> String {
        self.kind.format_key(&row.at)
    }
}

/// Stable sort by key; on duplicate keys the later row wins.
fn sort_dedup(mut rows: Vec<PriceRow>) -> Vec<PriceRow> {
    rows.sort_by(|a, b| a.key().cmp(&b.key()));
    let mut out: Vec<PriceRow> = Vec::with_capacity(rows.len());
    for row in rows {
        match out.last_mut() {
            Some(last) if last.key() == row.key() => *last = row,
            _ => out.push(row),
        }
    }
    out
}
