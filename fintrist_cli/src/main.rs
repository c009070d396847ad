mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use fintrist_lib::Settings;

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "fintrist")]
#[command(about = "Fetch daily and intraday stock prices from Tiingo")]
struct Cli {
    /// Output format: table, json, csv or markdown
    #[arg(long, default_value = "table", global = true)]
    output: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Daily bars for one or more symbols
    Daily(commands::daily::DailyArgs),
    /// Intraday IEX bars for the latest market session
    Intraday(commands::intraday::IntradayArgs),
    /// Latest NYSE session and whether the market is open
    Session(commands::session::SessionArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fintrist=info".parse::<tracing_subscriber::filter::Directive>()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let format = OutputFormat::parse(&cli.output);
    let settings = Settings::from_env()?;

    match &cli.command {
        Commands::Daily(args) => commands::daily::run(args, &settings, &format).await?,
        Commands::Intraday(args) => commands::intraday::run(args, &settings, &format).await?,
        Commands::Session(args) => commands::session::run(args, &settings, &format)?,
    }

    Ok(())
}
