// @file: trade_history/src/cli.rs
// @description: Command-line surface: fetch a window of trades or summarise it.
// @author: LAS.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::time::Duration;

use chrono::DateTime;
use clap::{Args, Parser, Subcommand};
use log::info;

use crate::core::error::{FetchError, Result};
use crate::core::models::{Credentials, FetchRequest, MalformedPolicy};
use crate::core::summary::{large_trades, TradeSummary};
use crate::fetcher::TradeFetcher;
use crate::utils::config::FetcherConfig;
use crate::utils::export::{write_trades, OutputFormat};


//
// ARGUMENTS
//

/// Bybit trade history fetcher
#[derive(Parser, Debug)]
#[command(name = "trade_history")]
#[command(about = "Fetch historical Bybit trades for a time window")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch trades and print or export them
    Fetch(FetchArgs),
    /// Fetch trades for one or more symbols and print statistics
    Summary(SummaryArgs),
}

/// Window and connection options shared by every command
#[derive(Args, Debug, Clone)]
pub struct WindowArgs {
    /// Start of the window (unix millis or RFC3339)
    #[arg(long, value_parser = parse_time_arg)]
    pub start: i64,

    /// End of the window (unix millis or RFC3339)
    #[arg(long, value_parser = parse_time_arg)]
    pub end: i64,

    /// Trades per page (1-1000); defaults to the configured value
    #[arg(long)]
    pub limit: Option<i64>,

    /// Override the configured API base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Give up on the whole fetch after this many seconds
    #[arg(long)]
    pub deadline_secs: Option<u64>,

    /// Drop malformed trades instead of failing the fetch
    #[arg(long)]
    pub skip_malformed: bool,
}

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Trading symbol, e.g. BTCUSDT
    #[arg(long, short)]
    pub symbol: String,

    #[command(flatten)]
    pub window: WindowArgs,

    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Write to this file instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct SummaryArgs {
    /// Symbols to summarise (comma-separated)
    #[arg(long, short, value_delimiter = ',', default_value = "BTCUSDT")]
    pub symbols: Vec<String>,

    #[command(flatten)]
    pub window: WindowArgs,

    /// Also list trades in this top fraction by size (e.g. 0.1)
    #[arg(long)]
    pub large: Option<f64>,
}


//
// COMMAND RUNNER
//

pub async fn run(cli: Cli, config: &FetcherConfig, credentials: Credentials) -> Result<()> {
    match cli.command {
        Commands::Fetch(args) => run_fetch(args, config, credentials).await,
        Commands::Summary(args) => run_summary(args, config, credentials).await,
    }
}

async fn run_fetch(args: FetchArgs, config: &FetcherConfig, credentials: Credentials) -> Result<()> {
    let fetcher = build_fetcher(&args.window, config)?;
    let request = build_request(&args.symbol, &args.window, config, &credentials);

    let trades = fetcher.fetch(&request).await?;

    let written = match &args.output {
        Some(path) => {
            let file = File::create(path)
                .map_err(|e| FetchError::InvalidArgument(format!("cannot create {}: {}", path.display(), e)))?;
            write_trades(BufWriter::new(file), &trades, args.format)
        }
        None => write_trades(io::stdout().lock(), &trades, args.format),
    };
    written.map_err(|e| FetchError::TransportError(format!("failed to write output: {}", e)))?;

    info!("Wrote {} trades for {}", trades.len(), args.symbol);
    Ok(())
}

async fn run_summary(args: SummaryArgs, config: &FetcherConfig, credentials: Credentials) -> Result<()> {
    let fetcher = build_fetcher(&args.window, config)?;

    // One bounded fetch per symbol; any failure stops the run
    for symbol in &args.symbols {
        let request = build_request(symbol, &args.window, config, &credentials);
        let trades = fetcher.fetch(&request).await?;
        let s = TradeSummary::from_trades(&trades);

        println!("{}: {} trades | volume {:.6} | buy {} / sell {}", symbol, s.count, s.total_volume, s.buy_count, s.sell_count);
        if let (Some(min), Some(max), Some(avg), Some(vwap)) = (s.min_price, s.max_price, s.average_price, s.vwap) {
            println!("  price range {:.2} - {:.2} | avg {:.2} | vwap {:.2}", min, max, avg, vwap);
        }

        if let Some(fraction) = args.large {
            let big = large_trades(&trades, fraction);
            println!("  large trades (top {:.0}%): {}", fraction * 100.0, big.len());
            for t in big.iter().take(3) {
                println!("    {} {} {} @ {}", t.timestamp, t.side, t.size, t.price);
            }
        }
    }

    Ok(())
}


//
// INTERNAL HELPERS
//

fn build_fetcher(window: &WindowArgs, config: &FetcherConfig) -> Result<TradeFetcher> {
    let mut settings = config.fetch_settings();
    settings.deadline = window.deadline_secs.map(Duration::from_secs);
    if window.skip_malformed {
        settings.malformed_policy = MalformedPolicy::Skip;
    }
    TradeFetcher::with_settings(settings)
}

fn build_request(symbol: &str, window: &WindowArgs, config: &FetcherConfig, credentials: &Credentials) -> FetchRequest {
    FetchRequest::new(symbol, window.start, window.end)
        .with_limit(window.limit.unwrap_or(config.default_limit))
        .with_credentials(credentials.api_key.clone(), credentials.secret.clone())
        .with_base_url(window.base_url.clone().unwrap_or_else(|| config.base_url.clone()))
}

pub fn parse_time_arg(raw: &str) -> std::result::Result<i64, String> {
    if let Ok(ms) = raw.parse::<i64>() {
        return Ok(ms);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.timestamp_millis())
        .map_err(|e| format!("expected unix millis or RFC3339, got {:?}: {}", raw, e))
}
