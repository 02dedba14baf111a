// @file: trade_history/src/core/summary.rs
// @description: Aggregate statistics over a fetched trade list.
// @author: LAS.

use serde::Serialize;

use crate::core::models::{TradeRecord, TradeSide};


#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TradeSummary {
    pub count: usize,
    pub buy_count: usize,
    pub sell_count: usize,
    pub total_volume: f64,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub average_price: Option<f64>,
    pub vwap: Option<f64>,
    pub first_timestamp: Option<i64>,
    pub last_timestamp: Option<i64>,
}

impl TradeSummary {
    pub fn from_trades(trades: &[TradeRecord]) -> Self {
        let count = trades.len();
        let buy_count = trades.iter().filter(|t| t.side == TradeSide::Buy).count();

        let total_volume: f64 = trades.iter().map(|t| t.size).sum();
        let notional: f64 = trades.iter().map(|t| t.price * t.size).sum();

        let min_price = trades.iter().map(|t| t.price).reduce(f64::min);
        let max_price = trades.iter().map(|t| t.price).reduce(f64::max);
        let average_price = if count == 0 {
            None
        } else {
            Some(trades.iter().map(|t| t.price).sum::<f64>() / count as f64)
        };

        // Sizes are strictly positive, so a non-empty list has volume > 0
        let vwap = if total_volume > 0.0 { Some(notional / total_volume) } else { None };

        TradeSummary {
            count,
            buy_count,
            sell_count: count - buy_count,
            total_volume,
            min_price,
            max_price,
            average_price,
            vwap,
            first_timestamp: trades.iter().map(|t| t.timestamp).min(),
            last_timestamp: trades.iter().map(|t| t.timestamp).max(),
        }
    }
}

/// Trades whose size is strictly above the size ranked at `top_fraction`
/// of the list (0.1 = the largest 10%). Server order is preserved.
pub fn large_trades(trades: &[TradeRecord], top_fraction: f64) -> Vec<&TradeRecord> {
    if trades.is_empty() || !(0.0..=1.0).contains(&top_fraction) {
        return Vec::new();
    }

    let mut sizes: Vec<f64> = trades.iter().map(|t| t.size).collect();
    sizes.sort_by(|a, b| b.total_cmp(a));

    let rank = ((sizes.len() as f64) * top_fraction) as usize;
    let threshold = sizes[rank.min(sizes.len() - 1)];

    trades.iter().filter(|t| t.size > threshold).collect()
}
