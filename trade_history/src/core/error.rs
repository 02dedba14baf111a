// @file: trade_history/src/core/error.rs
// @description: Error taxonomy shared by every stage of a fetch.
// @author: LAS.

use thiserror::Error;

pub type Result<T, E = FetchError> = std::result::Result<T, E>;

/// Exactly one of these ends a failed fetch. Nothing partial is returned
/// alongside it.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Non-zero `retCode` in the envelope, or a non-success HTTP status that
    /// is not a rate limit (the HTTP status is then used as the code).
    #[error("API error {code}: {message}")]
    ApiError { code: i64, message: String },

    #[error("Rate limited: gave up after {retries} backoff retries")]
    RateLimitExceeded { retries: u32 },

    #[error("Malformed trade record (field `{field}`): {reason}")]
    MalformedRecord { field: &'static str, reason: String },

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Timed out: {0}")]
    TimeoutError(String),

    #[error("Protocol error: {0}")]
    ProtocolError(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::TimeoutError(format!("request timed out: {}", e))
        } else {
            FetchError::TransportError(e.to_string())
        }
    }
}

impl FetchError {
    pub fn malformed(field: &'static str, reason: impl Into<String>) -> Self {
        FetchError::MalformedRecord {
            field,
            reason: reason.into(),
        }
    }
}
