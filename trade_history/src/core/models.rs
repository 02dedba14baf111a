// @file: trade_history/src/core/models.rs
// @description: Canonical trade records, fetch requests and per-fetch settings.
// @author: LAS.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use url::Url;

use crate::core::error::{FetchError, Result};


//
// CONSTANTS
//

pub const DEFAULT_BASE_URL: &str = "https://api.bybit.com";
pub const TRADES_PATH: &str = "/v5/market/trades";

pub const MIN_LIMIT: i64 = 1;
pub const MAX_LIMIT: i64 = 1000;
pub const DEFAULT_LIMIT: i64 = 1000;


//
// FETCH SETTINGS
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    // Abort the whole fetch on the first bad record
    #[default]
    Abort,
    // Drop the bad record with a warning and keep going
    Skip,
}

/// Tunables for a single fetch. Built from `FetcherConfig::fetch_settings`
/// or taken from `Default`, which carries the exchange's documented values.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchSettings {
    pub recv_window_ms: u64,
    pub request_timeout: Duration,
    pub backoff_base: Duration,
    pub max_rate_limit_retries: u32,
    pub page_delay: Duration,
    pub max_pages: usize,
    pub malformed_policy: MalformedPolicy,
    // Covers the whole paginated fetch, not a single request
    pub deadline: Option<Duration>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        FetchSettings {
            recv_window_ms: 5000,
            request_timeout: Duration::from_secs(10),
            backoff_base: Duration::from_millis(50),
            max_rate_limit_retries: 5,
            page_delay: Duration::from_millis(50),
            max_pages: 10_000,
            malformed_policy: MalformedPolicy::Abort,
            deadline: None,
        }
    }
}


//
// CREDENTIALS
//

#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, secret: impl Into<String>) -> Self {
        Credentials {
            api_key: api_key.into(),
            secret: secret.into(),
        }
    }

    /// Both halves empty means the request goes out unauthenticated.
    pub fn is_empty(&self) -> bool {
        self.api_key.is_empty() && self.secret.is_empty()
    }
}

// Keeps the secret out of logs and panic messages.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("secret", &if self.secret.is_empty() { "" } else { "<redacted>" })
            .finish()
    }
}


//
// FETCH REQUEST
//

#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub symbol: String,
    pub start_time: i64,
    pub end_time: i64,
    pub limit: i64,
    pub credentials: Credentials,
    pub base_url: String,
}

impl FetchRequest {
    pub fn new(symbol: impl Into<String>, start_time: i64, end_time: i64) -> Self {
        FetchRequest {
            symbol: symbol.into(),
            start_time,
            end_time,
            limit: DEFAULT_LIMIT,
            credentials: Credentials::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_credentials(mut self, api_key: impl Into<String>, secret: impl Into<String>) -> Self {
        self.credentials = Credentials::new(api_key, secret);
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Rejects everything that would otherwise only surface after the
    /// first network round trip.
    pub fn validate(&self) -> Result<()> {
        // #1. Page size
        if !(MIN_LIMIT..=MAX_LIMIT).contains(&self.limit) {
            return Err(FetchError::InvalidArgument(format!(
                "limit must be within [{}, {}], got {}",
                MIN_LIMIT, MAX_LIMIT, self.limit
            )));
        }

        // #2. Time window
        if self.start_time > self.end_time {
            return Err(FetchError::InvalidArgument(format!(
                "start_time {} is after end_time {}",
                self.start_time, self.end_time
            )));
        }

        // #3. Symbol goes into the query verbatim, so keep it to plain tokens
        if self.symbol.is_empty() || !self.symbol.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(FetchError::InvalidArgument(format!(
                "symbol must be a non-empty ticker of [A-Za-z0-9_-], got {:?}",
                self.symbol
            )));
        }

        // #4. Credentials come as a pair or not at all
        if self.credentials.api_key.is_empty() != self.credentials.secret.is_empty() {
            return Err(FetchError::InvalidArgument(
                "api_key and secret must be supplied together".to_string(),
            ));
        }

        // #5. Base URL
        let parsed = Url::parse(&self.base_url)
            .map_err(|e| FetchError::InvalidArgument(format!("invalid base_url {:?}: {}", self.base_url, e)))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(FetchError::InvalidArgument(format!(
                "base_url must be http(s), got scheme {:?}",
                parsed.scheme()
            )));
        }

        Ok(())
    }

    /// Query in the fixed order the exchange signs against.
    pub fn query_string(&self, cursor: Option<&str>) -> String {
        let mut query = format!(
            "symbol={}&startTime={}&endTime={}&limit={}",
            self.symbol, self.start_time, self.end_time, self.limit
        );
        if let Some(c) = cursor {
            query.push_str("&cursor=");
            query.push_str(c);
        }
        query
    }

    pub fn url_for(&self, query_string: &str) -> String {
        format!("{}{}?{}", self.base_url.trim_end_matches('/'), TRADES_PATH, query_string)
    }
}


//
// TRADE RECORDS
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TradeSide {
    Buy,  // Taker was a Buyer
    Sell, // Taker was a Seller
}

impl TradeSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeSide::Buy => "Buy",
            TradeSide::Sell => "Sell",
        }
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TradeRecord {
    pub timestamp: i64,
    pub symbol: String,
    pub side: TradeSide,
    pub size: f64,
    pub price: f64,
}


//
// UNIT TESTS
//
