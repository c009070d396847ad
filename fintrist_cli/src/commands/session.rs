use anyhow::Result;
use chrono::Utc;
use clap::Args;
use fintrist_lib::{
    latest_market_day, market_open, market_schedule, parse_timestamp, NyseCalendar, Settings,
};

use crate::output::{print_session, OutputFormat};

#[derive(Args)]
pub struct SessionArgs {
    /// Reference instant (RFC 3339 or YYYY-MM-DD HH:MM, UTC). Defaults to now
    #[arg(long)]
    pub at: Option<String>,
}

pub fn run(args: &SessionArgs, settings: &Settings, format: &OutputFormat) -> Result<()> {
    let now = match args.at {
        Some(ref at) => parse_timestamp(at)?,
        None => Utc::now(),
    };
    let calendar = NyseCalendar;
    let session = latest_market_day(&calendar, now)?;
    let local = market_schedule(&calendar, session.date, session.date, settings.timezone);
    let Some(local) = local.first() else {
        anyhow::bail!("no session found for {}", session.date);
    };
    print_session(local, market_open(&calendar, now), format)
}
