// @file: trade_history/src/utils/config.rs
// @description: Layered configuration (defaults -> config file -> APP_* env) for the fetcher.
// @author: LAS.

use serde::Deserialize;
use config::{Config, ConfigError, File, Environment};
use std::time::Duration;

use crate::core::models::{FetchSettings, MalformedPolicy, DEFAULT_BASE_URL, DEFAULT_LIMIT};

//
// TYPE DEFINITIONS
//

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct FetcherConfig {
    pub log_level: String,

    // Endpoint
    pub base_url: String,
    pub recv_window_ms: u64,
    pub request_timeout_secs: u64,

    // Pacing & Limits
    pub default_limit: i64,
    pub backoff_base_ms: u64,
    pub max_rate_limit_retries: u32,
    pub page_delay_ms: u64,
    pub max_pages: usize,

    // Record Handling
    pub malformed_policy: MalformedPolicy,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        FetcherConfig {
            log_level: "info".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            recv_window_ms: 5000,
            request_timeout_secs: 10,
            default_limit: DEFAULT_LIMIT,
            backoff_base_ms: 50,
            max_rate_limit_retries: 5,
            page_delay_ms: 50,
            max_pages: 10_000,
            malformed_policy: MalformedPolicy::Abort,
        }
    }
}

impl FetcherConfig {
    //
    // PUBLIC INTERFACE
    //

    pub fn load() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .set_default("log_level", "info")?
            .set_default("base_url", DEFAULT_BASE_URL)?

            // Endpoint
            .set_default("recv_window_ms", 5000)?
            .set_default("request_timeout_secs", 10)?

            // Pacing & Limits
            .set_default("default_limit", DEFAULT_LIMIT)?
            .set_default("backoff_base_ms", 50)?
            .set_default("max_rate_limit_retries", 5)?
            .set_default("page_delay_ms", 50)?
            .set_default("max_pages", 10_000)?

            // Record Handling
            .set_default("malformed_policy", "abort")?

            // File & Env Overrides
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("APP"));

        let config = builder.build()?;
        config.try_deserialize()
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            recv_window_ms: self.recv_window_ms,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            backoff_base: Duration::from_millis(self.backoff_base_ms),
            max_rate_limit_retries: self.max_rate_limit_retries,
            page_delay: Duration::from_millis(self.page_delay_ms),
            max_pages: self.max_pages,
            malformed_policy: self.malformed_policy,
            deadline: None,
        }
    }
}
