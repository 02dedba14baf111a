// @file: trade_history/src/connectors/bybit/signer.rs
// @description: HMAC-SHA256 request signing for Bybit v5 REST calls.
// @author: LAS.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::core::error::{FetchError, Result};
use crate::core::interfaces::RequestHeaders;

type HmacSha256 = Hmac<Sha256>;

pub const HEADER_SIGN: &str = "X-BAPI-SIGN";
pub const HEADER_API_KEY: &str = "X-BAPI-API-KEY";
pub const HEADER_TIMESTAMP: &str = "X-BAPI-TIMESTAMP";
pub const HEADER_RECV_WINDOW: &str = "X-BAPI-RECV-WINDOW";


//
// PUBLIC INTERFACE
//

/// Builds the auth headers for one request.
///
/// The signed payload is `timestamp + method + path + query + recv_window`
/// with no separators. With no credentials at all the header set is empty
/// and nothing is hashed.
pub fn sign(
    method: &str,
    path: &str,
    query_string: &str,
    timestamp: i64,
    recv_window: u64,
    api_key: &str,
    secret: &str,
) -> Result<RequestHeaders> {
    let mut headers = RequestHeaders::new();

    if api_key.is_empty() && secret.is_empty() {
        return Ok(headers);
    }

    let payload = canonical_string(method, path, query_string, timestamp, recv_window);
    let signature = hmac_sha256_hex(secret, &payload)?;

    headers.insert(HEADER_SIGN, signature);
    headers.insert(HEADER_API_KEY, api_key.to_string());
    headers.insert(HEADER_TIMESTAMP, timestamp.to_string());
    headers.insert(HEADER_RECV_WINDOW, recv_window.to_string());

    Ok(headers)
}

pub fn canonical_string(method: &str, path: &str, query_string: &str, timestamp: i64, recv_window: u64) -> String {
    format!("{}{}{}{}{}", timestamp, method, path, query_string, recv_window)
}

pub fn hmac_sha256_hex(secret: &str, payload: &str) -> Result<String> {
    // The key is deliberately left out of the error text
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| FetchError::InvalidArgument("secret rejected as HMAC key".to_string()))?;
    mac.update(payload.as_bytes());

    Ok(hex::encode(mac.finalize().into_bytes()))
}
