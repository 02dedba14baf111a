// @file: trade_history/src/connectors/bybit.rs
// @description: Bybit v5 trade-history connector: wire models and page decoding.
// @author: LAS.

pub mod backoff;
pub mod bybit_rest;
pub mod normalizer;
pub mod paginator;
pub mod signer;

use serde::Deserialize;
use serde_json::Value;

use crate::core::error::{FetchError, Result};


// Bybit answers HTTP 200 with this retCode when the IP is throttled
pub const RATE_LIMIT_RET_CODE: i64 = 10006;


//
// BYBIT WIRE MODELS
//

#[derive(Debug, Deserialize)]
pub struct TradeEnvelope {
    #[serde(rename = "retCode")] pub ret_code: i64,
    #[serde(rename = "retMsg", default)] pub ret_msg: String,
    // Error envelopes frequently omit `result` or send `{}`
    #[serde(default)] pub result: Option<TradeResultBody>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TradeResultBody {
    #[serde(default)] pub list: Vec<RawTrade>,
    #[serde(rename = "nextPageCursor", default)] pub next_page_cursor: Option<String>,
}

/// One trade as the server sent it. Fields stay untyped until the
/// normalizer checks them; `execId` and `isBlockTrade` are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTrade {
    #[serde(default)] pub symbol: Option<Value>,
    #[serde(default)] pub price: Option<Value>,
    #[serde(default)] pub size: Option<Value>,
    #[serde(default)] pub side: Option<Value>,
    #[serde(default)] pub time: Option<Value>,
}


//
// PAGE DECODING
//

/// A decoded page: raw trades plus the continuation cursor, if any.
#[derive(Debug, Default)]
pub struct RawTradePage {
    pub trades: Vec<RawTrade>,
    pub next_cursor: Option<String>,
}

pub fn decode_envelope(body: &str) -> Result<TradeEnvelope> {
    serde_json::from_str(body)
        .map_err(|e| FetchError::ProtocolError(format!("undecodable response body: {}", e)))
}

impl TradeEnvelope {
    pub fn is_rate_limited(&self) -> bool {
        self.ret_code == RATE_LIMIT_RET_CODE
    }

    // #1. Turn a successful envelope into a page, failing on a non-zero retCode
    pub fn into_page(self) -> Result<RawTradePage> {
        if self.ret_code != 0 {
            return Err(FetchError::ApiError {
                code: self.ret_code,
                message: self.ret_msg,
            });
        }

        let body = self.result.unwrap_or_default();

        // #2. Absent, null and "" all mean "last page"
        let next_cursor = body.next_page_cursor.filter(|c| !c.is_empty());

        Ok(RawTradePage {
            trades: body.list,
            next_cursor,
        })
    }
}
