// @file: trade_history/src/lib.rs
// @description: Exposes the fetcher, its building blocks and the CLI for the binary and the Python bindings.
// @author: LAS.


pub mod cli;
pub mod connectors;
pub mod core;
pub mod fetcher;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::core::error::{FetchError, Result};
pub use crate::core::models::{Credentials, FetchRequest, FetchSettings, MalformedPolicy, TradeRecord, TradeSide};
pub use crate::fetcher::{fetch_trades, fetch_trades_with, TradeFetcher};
