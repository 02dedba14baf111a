// @file: trade_history/src/core/mod.rs
// @description: Exports domain types, errors and the injectable seams.
// @author: LAS.

pub mod error;
pub mod interfaces;
pub mod models;
pub mod summary;
