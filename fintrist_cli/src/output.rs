use std::collections::BTreeMap;

use anyhow::Result;
use chrono_tz::Tz;
use fintrist_lib::{IndexKind, LocalSession, PriceFrame, PriceRow};
use serde::Serialize;
use serde_json::Value;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
    Markdown,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Self {
        match s {
            "json" => Self::Json,
            "csv" => Self::Csv,
            "markdown" | "md" => Self::Markdown,
            _ => Self::Table,
        }
    }
}

#[derive(Tabled, Serialize)]
struct PriceRowOut {
    #[tabled(rename = "Symbol")]
    #[serde(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "Date")]
    #[serde(rename = "Date")]
    date: String,
    #[tabled(rename = "Open", display_with = "format_price")]
    #[serde(rename = "Open")]
    open: Option<f64>,
    #[tabled(rename = "High", display_with = "format_price")]
    #[serde(rename = "High")]
    high: Option<f64>,
    #[tabled(rename = "Low", display_with = "format_price")]
    #[serde(rename = "Low")]
    low: Option<f64>,
    #[tabled(rename = "Close", display_with = "format_price")]
    #[serde(rename = "Close")]
    close: Option<f64>,
    #[tabled(rename = "Volume", display_with = "format_volume")]
    #[serde(rename = "Volume")]
    volume: Option<f64>,
}

/// JSON bar: the table's `date` label plus every provider column.
#[derive(Serialize)]
struct PriceJsonOut {
    #[serde(skip_serializing_if = "Option::is_none")]
    symbol: Option<String>,
    date: String,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
    volume: Option<f64>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

#[derive(Tabled, Serialize)]
struct SessionRowOut {
    #[tabled(rename = "Date")]
    #[serde(rename = "Date")]
    date: String,
    #[tabled(rename = "Open")]
    #[serde(rename = "Open")]
    open: String,
    #[tabled(rename = "Close")]
    #[serde(rename = "Close")]
    close: String,
    #[tabled(rename = "Trading Now")]
    #[serde(rename = "Trading Now")]
    trading_now: bool,
}

// -- Row builders --

/// `YYYY-MM-DD` for daily frames, RFC 3339 in `tz` for intraday ones.
fn date_label(frame: &PriceFrame, row: &PriceRow, tz: Tz) -> String {
    match frame.kind() {
        IndexKind::Date => frame.index_label(row),
        IndexKind::Timestamp => row.at.with_timezone(&tz).to_rfc3339(),
    }
}

fn build_price_rows(frame: &PriceFrame, tz: Tz) -> Vec<PriceRowOut> {
    frame
        .rows()
        .iter()
        .map(|r| PriceRowOut {
            symbol: r.symbol.clone().unwrap_or_default(),
            date: date_label(frame, r, tz),
            open: r.open,
            high: r.high,
            low: r.low,
            close: r.close,
            volume: r.volume,
        })
        .collect()
}

fn build_price_json(frame: &PriceFrame, tz: Tz) -> Vec<PriceJsonOut> {
    frame
        .rows()
        .iter()
        .map(|r| PriceJsonOut {
            symbol: r.symbol.clone(),
            date: date_label(frame, r, tz),
            open: r.open,
            high: r.high,
            low: r.low,
            close: r.close,
            volume: r.volume,
            extra: r.extra.clone(),
        })
        .collect()
}

fn build_session_rows(session: &LocalSession, trading_now: bool) -> Vec<SessionRowOut> {
    vec![SessionRowOut {
        date: session.date.to_string(),
        open: session.open.to_rfc3339(),
        close: session.close.to_rfc3339(),
        trading_now,
    }]
}

// -- Printing --

/// Prints a price frame in `format`. JSON carries every column, including
/// provider-specific ones such as `adjClose`.
pub fn print_prices(frame: &PriceFrame, tz: Tz, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            print_json(&build_price_json(frame, tz));
            Ok(())
        }
        _ => print_rows(build_price_rows(frame, tz), format),
    }
}

pub fn print_session(session: &LocalSession, trading_now: bool, format: &OutputFormat) -> Result<()> {
    print_rows(build_session_rows(session, trading_now), format)
}

fn print_rows<R: Tabled + Serialize>(rows: Vec<R>, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", Table::new(rows)),
        OutputFormat::Markdown => {
            let mut table = Table::new(rows);
            table.with(Style::markdown());
            println!("{}", table);
        }
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(std::io::stdout());
            for row in rows {
                wtr.serialize(row)?;
            }
            wtr.flush()?;
        }
        OutputFormat::Json => print_json(&rows),
    }
    Ok(())
}

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}

fn format_price(value: &Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_default()
}

fn format_volume(value: &Option<f64>) -> String {
    match value {
        Some(v) if *v >= 1_000_000.0 => format!("{:.1}M", v / 1_000_000.0),
        Some(v) if *v >= 1_000.0 => format!("{:.1}K", v / 1_000.0),
        Some(v) => format!("{}", v),
        None => String::new(),
    }
}
