// @file: trade_history/src/tests/mod.rs
// @description: Test harness: scripted exchange plus flow, backoff and config suites.
// @author: LAS.


mod fetch_flow;
