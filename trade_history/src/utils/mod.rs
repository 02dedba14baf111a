// @file: trade_history/src/utils/mod.rs
// @description: Configuration loading and trade export helpers.
// @author: LAS.

pub mod config;
pub mod export;
