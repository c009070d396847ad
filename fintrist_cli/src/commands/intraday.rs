use anyhow::Result;
use chrono_tz::Tz;
use clap::Args;
use fintrist_lib::{parse_date_input, Frequency, Settings, Stock};

use super::symbol_spec;
use crate::output::{print_prices, OutputFormat};

#[derive(Args)]
pub struct IntradayArgs {
    /// Ticker symbols (e.g. SPY QQQ)
    #[arg(required = true)]
    pub symbols: Vec<String>,

    /// Use the latest session on or before this day (YYYY-MM-DD). Defaults to now
    #[arg(long)]
    pub day: Option<String>,

    /// Bar size, e.g. 1min, 5min, 1hour
    #[arg(long, default_value = "5min")]
    pub freq: String,

    /// Timezone for timestamps (e.g. America/New_York). Defaults to TIMEZONE
    #[arg(long)]
    pub tz: Option<String>,
}

pub async fn run(args: &IntradayArgs, settings: &Settings, format: &OutputFormat) -> Result<()> {
    let freq: Frequency = args.freq.parse()?;
    let tz = match args.tz {
        Some(ref name) => name
            .parse::<Tz>()
            .map_err(|_| anyhow::anyhow!("unknown timezone '{}'", name))?,
        None => settings.timezone,
    };
    let day = args.day.as_deref().map(parse_date_input).transpose()?;

    let stock = Stock::new(symbol_spec(&args.symbols), freq.clone()).with_settings(settings.clone());
    let freq = freq.to_string();
    let frame = stock.intraday(day, Some(&freq), None).await?;

    eprintln!("{} bars", frame.len());
    print_prices(&frame, tz, format)
}
