// @file: trade_history/src/connectors/bybit/bybit_rest.rs
// @description: reqwest-backed Transport used for real Bybit calls.
// @author: LAS.

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use std::time::Duration;

use crate::core::error::Result;
use crate::core::interfaces::{HttpResponse, RequestHeaders, Transport};


/// Owns its own connection pool; build one per fetcher, not per process.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(request_timeout: Duration) -> Result<Self> {
        let client: Client = Client::builder()
            .timeout(request_timeout)
            .build()?;

        Ok(ReqwestTransport { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str, headers: &RequestHeaders) -> Result<HttpResponse> {
        // #1. Attach auth headers (empty for public requests)
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, value.as_str());
        }

        // #2. Execute; connect/read failures and timeouts map through From<reqwest::Error>
        let response = request.send().await?;
        let status: u16 = response.status().as_u16();
        let body: String = response.text().await?;

        debug!("GET {} -> {} ({} bytes)", url, status, body.len());

        Ok(HttpResponse { status, body })
    }
}
