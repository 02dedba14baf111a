// @file: trade_history/src/core/interfaces.rs
// @description: Seams injected into a fetch: the HTTP transport and the clock.
// @author: LAS.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::core::error::Result;


//
// TYPE DEFINITIONS
//

/// Header name -> value. Ordered so signed requests are reproducible.
pub type RequestHeaders = BTreeMap<&'static str, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        HttpResponse {
            status,
            body: body.into(),
        }
    }
}


//
// TRAIT DEFINITIONS
//

#[async_trait]
pub trait Transport: Send + Sync {
    // #1. Issue a GET and hand back status + raw body
    // Network-level failures come back as Err; HTTP error statuses do not.
    async fn get(&self, url: &str, headers: &RequestHeaders) -> Result<HttpResponse>;
}

#[async_trait]
pub trait Clock: Send + Sync {
    // #1. Wall clock in unix millis, used for request signing
    fn now_ms(&self) -> i64;

    // #2. Suspend the current fetch only
    async fn sleep(&self, duration: Duration);
}


//
// DEFAULT CLOCK
//

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
