// @file: trade_history/src/connectors/bybit/backoff.rs
// @description: Response classification and exponential backoff for rate limits.
// @author: LAS.

use std::time::Duration;

use crate::core::error::{FetchError, Result};


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseClass {
    Success,
    RateLimited,
    HardFailure,
}

impl ResponseClass {
    pub fn from_status(status: u16) -> Self {
        match status {
            429 => ResponseClass::RateLimited,
            200..=299 => ResponseClass::Success,
            _ => ResponseClass::HardFailure,
        }
    }
}

/// Per-fetch retry state. Only rate limits are retried; the counter
/// resets on every successful response.
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    base_delay: Duration,
    max_retries: u32,
    retries: u32,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        BackoffPolicy::new(Duration::from_millis(50), 5)
    }
}

impl BackoffPolicy {
    pub fn new(base_delay: Duration, max_retries: u32) -> Self {
        BackoffPolicy {
            base_delay,
            max_retries,
            retries: 0,
        }
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    pub fn on_success(&mut self) {
        self.retries = 0;
    }

    /// `base * 2^attempt`, saturating instead of overflowing.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor: u32 = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    /// Called on a rate-limited response. Returns how long to wait before
    /// retrying, or RateLimitExceeded once the cap is spent.
    pub fn next_delay(&mut self) -> Result<Duration> {
        if self.retries >= self.max_retries {
            return Err(FetchError::RateLimitExceeded { retries: self.retries });
        }

        let delay = self.delay_for(self.retries);
        self.retries += 1;
        Ok(delay)
    }
}
