// @file: trade_history/src/connectors/mod.rs
// @description: Exchange connectors. Only Bybit's trade-history endpoint is wired up.
// @author: LAS.

pub mod bybit;
