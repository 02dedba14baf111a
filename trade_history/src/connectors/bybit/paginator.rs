// @file: trade_history/src/connectors/bybit/paginator.rs
// @description: Cursor walker driving signed page requests until the server stops handing out cursors.
// @author: LAS.

use log::{debug, info, warn};

use crate::connectors::bybit::backoff::{BackoffPolicy, ResponseClass};
use crate::connectors::bybit::normalizer::normalize_page;
use crate::connectors::bybit::signer::sign;
use crate::connectors::bybit::{decode_envelope, RawTradePage};
use crate::core::error::{FetchError, Result};
use crate::core::interfaces::{Clock, Transport};
use crate::core::models::{FetchRequest, FetchSettings, TradeRecord, TRADES_PATH};


/// Walks every page of one request. Holds no state between walks: the
/// cursor, retry counter and buffer all live inside `walk`.
pub struct PageCursorWalker<'a> {
    transport: &'a dyn Transport,
    clock: &'a dyn Clock,
    settings: &'a FetchSettings,
    request: &'a FetchRequest,
}

impl<'a> PageCursorWalker<'a> {
    pub fn new(
        transport: &'a dyn Transport,
        clock: &'a dyn Clock,
        settings: &'a FetchSettings,
        request: &'a FetchRequest,
    ) -> Self {
        PageCursorWalker {
            transport,
            clock,
            settings,
            request,
        }
    }

    //
    // PUBLIC INTERFACE
    //

    pub async fn walk(&self) -> Result<Vec<TradeRecord>> {
        let mut trades: Vec<TradeRecord> = Vec::new();
        let mut cursor: Option<String> = None;
        let mut backoff = BackoffPolicy::new(self.settings.backoff_base, self.settings.max_rate_limit_retries);
        let mut pages: usize = 0;

        loop {
            // #1. Fetch one page (retries on rate limits happen inside)
            let page: RawTradePage = self.fetch_page(cursor.as_deref(), &mut backoff).await?;
            pages += 1;

            // #2. Normalize in server order
            let records = normalize_page(&page.trades, self.settings.malformed_policy)?;
            debug!(
                "{}: page {} -> {} trades (cursor {:?})",
                self.request.symbol, pages, records.len(), cursor
            );
            trades.extend(records);

            // #3. Decide whether there is another page
            let next = match page.next_cursor {
                Some(next) => next,
                None => break,
            };

            if cursor.as_deref() == Some(next.as_str()) {
                return Err(FetchError::ProtocolError(format!(
                    "server repeated cursor {:?} after page {}",
                    next, pages
                )));
            }

            if pages >= self.settings.max_pages {
                return Err(FetchError::ProtocolError(format!(
                    "page cap of {} reached with cursor {:?} still pending",
                    self.settings.max_pages, next
                )));
            }

            cursor = Some(next);

            // #4. Pace successive pages
            self.clock.sleep(self.settings.page_delay).await;
        }

        info!(
            "{}: fetched {} trades over {} page(s) for [{}, {}]",
            self.request.symbol, trades.len(), pages, self.request.start_time, self.request.end_time
        );

        Ok(trades)
    }

    //
    // INTERNAL HELPERS
    //

    async fn fetch_page(&self, cursor: Option<&str>, backoff: &mut BackoffPolicy) -> Result<RawTradePage> {
        let query: String = self.request.query_string(cursor);
        let url: String = self.request.url_for(&query);

        loop {
            // #1. Sign fresh on every attempt so the timestamp stays inside the recv window
            let headers = sign(
                "GET",
                TRADES_PATH,
                &query,
                self.clock.now_ms(),
                self.settings.recv_window_ms,
                &self.request.credentials.api_key,
                &self.request.credentials.secret,
            )?;

            // #2. Send. Network failures are hard failures and propagate as-is.
            let response = self.transport.get(&url, &headers).await?;

            let envelope = match ResponseClass::from_status(response.status) {
                ResponseClass::HardFailure => {
                    return Err(FetchError::ApiError {
                        code: i64::from(response.status),
                        message: format!("HTTP status {}: {}", response.status, snippet(&response.body)),
                    });
                }
                ResponseClass::RateLimited => None,
                ResponseClass::Success => {
                    let envelope = decode_envelope(&response.body)?;
                    if envelope.is_rate_limited() { None } else { Some(envelope) }
                }
            };

            // #3. Rate limited: wait and retry the same page
            match envelope {
                Some(envelope) => {
                    backoff.on_success();
                    return envelope.into_page();
                }
                None => {
                    let delay = backoff.next_delay()?;
                    warn!(
                        "{}: rate limited, retry {} in {:?}",
                        self.request.symbol, backoff.retries(), delay
                    );
                    self.clock.sleep(delay).await;
                }
            }
        }
    }
}

fn snippet(body: &str) -> &str {
    let end = body
        .char_indices()
        .nth(200)
        .map(|(i, _)| i)
        .unwrap_or(body.len());
    &body[..end]
}
