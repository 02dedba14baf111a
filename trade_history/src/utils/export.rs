// @file: trade_history/src/utils/export.rs
// @description: Renders fetched trades as a table, JSON or CSV onto any writer.
// @author: LAS.

use std::io::Write;

use chrono::{TimeZone, Utc};

use crate::core::models::TradeRecord;


#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

pub fn write_trades<W: Write>(writer: W, trades: &[TradeRecord], format: OutputFormat) -> std::io::Result<()> {
    match format {
        OutputFormat::Table => write_table(writer, trades),
        OutputFormat::Json => write_json(writer, trades),
        OutputFormat::Csv => write_csv(writer, trades),
    }
}


//
// INTERNAL HELPERS
//

fn write_table<W: Write>(mut writer: W, trades: &[TradeRecord]) -> std::io::Result<()> {
    writeln!(writer, "{:<24} {:<12} {:<4} {:>14} {:>14}", "time (UTC)", "symbol", "side", "size", "price")?;

    for t in trades {
        let when: String = match Utc.timestamp_millis_opt(t.timestamp).single() {
            Some(dt) => dt.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
            None => t.timestamp.to_string(),
        };
        writeln!(writer, "{:<24} {:<12} {:<4} {:>14} {:>14}", when, t.symbol, t.side, t.size, t.price)?;
    }

    writer.flush()
}

fn write_json<W: Write>(mut writer: W, trades: &[TradeRecord]) -> std::io::Result<()> {
    serde_json::to_writer_pretty(&mut writer, trades)?;
    writeln!(writer)?;
    writer.flush()
}

fn write_csv<W: Write>(writer: W, trades: &[TradeRecord]) -> std::io::Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for t in trades {
        csv_writer.serialize(t)?;
    }
    csv_writer.flush()
}
