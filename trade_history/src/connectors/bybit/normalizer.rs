// @file: trade_history/src/connectors/bybit/normalizer.rs
// @description: Validates raw Bybit trades and converts them into TradeRecord.
// @author: LAS.

use log::warn;
use serde_json::Value;

use crate::connectors::bybit::RawTrade;
use crate::core::error::{FetchError, Result};
use crate::core::models::{MalformedPolicy, TradeRecord, TradeSide};


//
// PUBLIC INTERFACE
//

pub fn normalize_trade(raw: &RawTrade) -> Result<TradeRecord> {
    // #1. Symbol
    let symbol: String = match &raw.symbol {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        other => return Err(FetchError::malformed("symbol", format!("expected non-empty string, got {}", show(other)))),
    };

    // #2. Side (exact spelling only)
    let side: TradeSide = match &raw.side {
        Some(Value::String(s)) if s == "Buy" => TradeSide::Buy,
        Some(Value::String(s)) if s == "Sell" => TradeSide::Sell,
        other => return Err(FetchError::malformed("side", format!("expected \"Buy\" or \"Sell\", got {}", show(other)))),
    };

    // #3. Numeric fields
    let price: f64 = parse_positive("price", &raw.price)?;
    let size: f64 = parse_positive("size", &raw.size)?;
    let timestamp: i64 = parse_millis(&raw.time)?;

    Ok(TradeRecord {
        timestamp,
        symbol,
        side,
        size,
        price,
    })
}

/// Normalizes a page in server order. Under `Abort` the first bad record
/// fails the page; under `Skip` it is logged and dropped.
pub fn normalize_page(raw: &[RawTrade], policy: MalformedPolicy) -> Result<Vec<TradeRecord>> {
    let mut records: Vec<TradeRecord> = Vec::with_capacity(raw.len());

    for item in raw {
        match normalize_trade(item) {
            Ok(record) => records.push(record),
            Err(e) if policy == MalformedPolicy::Skip => {
                warn!("Skipping malformed trade: {}", e);
            }
            Err(e) => return Err(e),
        }
    }

    Ok(records)
}


//
// INTERNAL HELPERS
//

fn parse_positive(field: &'static str, value: &Option<Value>) -> Result<f64> {
    let parsed: f64 = match value {
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map_err(|_| FetchError::malformed(field, format!("not a decimal: {:?}", s)))?,
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| FetchError::malformed(field, format!("not representable as f64: {}", n)))?,
        other => return Err(FetchError::malformed(field, format!("expected decimal, got {}", show(other)))),
    };

    // "NaN" and "inf" parse fine as f64, so the range check has to catch them
    if !parsed.is_finite() || parsed <= 0.0 {
        return Err(FetchError::malformed(field, format!("must be finite and > 0, got {}", parsed)));
    }

    Ok(parsed)
}

fn parse_millis(value: &Option<Value>) -> Result<i64> {
    match value {
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| FetchError::malformed("time", format!("not integer millis: {:?}", s))),
        Some(Value::Number(n)) => n
            .as_i64()
            .ok_or_else(|| FetchError::malformed("time", format!("not integer millis: {}", n))),
        other => Err(FetchError::malformed("time", format!("expected millis, got {}", show(other)))),
    }
}

fn show(value: &Option<Value>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "nothing".to_string(),
    }
}
