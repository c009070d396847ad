use anyhow::Result;
use clap::Args;
use fintrist_lib::reader::collapse_single;
use fintrist_lib::{parse_date_input, Frequency, Reader, Settings, Source, Stock};

use super::symbol_spec;
use crate::output::{print_prices, OutputFormat};

#[derive(Args)]
pub struct DailyArgs {
    /// Ticker symbols (e.g. AAPL MSFT)
    #[arg(required = true)]
    pub symbols: Vec<String>,

    /// First date (YYYY-MM-DD or YYYY). Defaults to five years before --end
    #[arg(long)]
    pub start: Option<String>,

    /// Last date (YYYY-MM-DD). Defaults to today
    #[arg(long)]
    pub end: Option<String>,

    /// Send no dates and take Tiingo's latest bar; several symbols share one request
    #[arg(long, conflicts_with_all = ["start", "end"])]
    pub latest: bool,

    /// Data source: tiingo or av
    #[arg(long, default_value = "tiingo")]
    pub source: String,
}

pub async fn run(args: &DailyArgs, settings: &Settings, format: &OutputFormat) -> Result<()> {
    let spec = symbol_spec(&args.symbols);
    let source: Source = args.source.parse()?;

    let frame = match source {
        Source::Tiingo => {
            let mut reader = Reader::daily(settings.tiingo_client(None)?, spec.clone());
            if let Some(ref start) = args.start {
                reader = reader.with_start(parse_date_input(start)?);
            }
            if let Some(ref end) = args.end {
                reader = reader.with_end(parse_date_input(end)?);
            }
            if args.latest {
                reader = reader.without_date_filter();
            }
            collapse_single(reader.read().await?, &spec)?
        }
        other => {
            Stock::new(spec, Frequency::Daily)
                .with_settings(settings.clone())
                .daily(Some(other))
                .await?
        }
    };

    eprintln!("{} rows", frame.len());
    print_prices(&frame, settings.timezone, format)
}
