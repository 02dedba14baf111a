// @file: trade_history/src/main.rs
// @description: CLI entry point: loads config and credentials, then runs the requested command.
// @author: LAS.

use clap::Parser;
use log::{error, info, warn};
use std::process::ExitCode;

use trade_history::cli::{self, Cli};
use trade_history::core::models::Credentials;
use trade_history::utils::config::FetcherConfig;

#[tokio::main]
async fn main() -> ExitCode {
    // 1. Pick up BYBIT_* credentials from a local .env if there is one
    dotenv::dotenv().ok();

    // 2. Load layered config before the logger so log_level can come from it
    let (config, config_error) = match FetcherConfig::load() {
        Ok(c) => (c, None),
        Err(e) => (FetcherConfig::default(), Some(e)),
    };

    // 3. Initialize Logger; RUST_LOG still wins over the configured level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_level.as_str())).init();

    if let Some(e) = config_error {
        warn!("Config could not be loaded ({}), using built-in defaults", e);
    }

    let cli = Cli::parse();

    let credentials = Credentials::new(
        std::env::var("BYBIT_API_KEY").unwrap_or_default(),
        std::env::var("BYBIT_API_SECRET").unwrap_or_default(),
    );
    if !credentials.is_empty() {
        info!("Using authenticated requests");
    }

    match cli::run(cli, &config, credentials).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
