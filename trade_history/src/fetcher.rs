// @file: trade_history/src/fetcher.rs
// @description: Public entry points composing validation, pagination and the blocking bridge.
// @author: LAS.

use std::sync::Arc;

use log::{debug, error};

use crate::connectors::bybit::bybit_rest::ReqwestTransport;
use crate::connectors::bybit::paginator::PageCursorWalker;
use crate::core::error::{FetchError, Result};
use crate::core::interfaces::{Clock, SystemClock, Transport};
use crate::core::models::{FetchRequest, FetchSettings, TradeRecord};


//
// FETCHER
//

/// A transport + clock + settings bundle. Cheap to clone; holds no
/// per-fetch state, so one fetcher can serve concurrent calls.
#[derive(Clone)]
pub struct TradeFetcher {
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    settings: FetchSettings,
}

impl TradeFetcher {
    pub fn new(transport: Arc<dyn Transport>, clock: Arc<dyn Clock>, settings: FetchSettings) -> Self {
        TradeFetcher {
            transport,
            clock,
            settings,
        }
    }

    /// Real network transport and wall clock.
    pub fn with_settings(settings: FetchSettings) -> Result<Self> {
        let transport = ReqwestTransport::new(settings.request_timeout)?;
        Ok(TradeFetcher::new(Arc::new(transport), Arc::new(SystemClock), settings))
    }

    //
    // PUBLIC INTERFACE
    //

    pub async fn fetch(&self, request: &FetchRequest) -> Result<Vec<TradeRecord>> {
        // #1. Nothing touches the network before the request is known good
        request.validate()?;
        debug!("Fetching {:?}", request);

        // #2. Walk all pages, optionally under an overall deadline
        let walker = PageCursorWalker::new(self.transport.as_ref(), self.clock.as_ref(), &self.settings, request);

        let outcome = match self.settings.deadline {
            Some(deadline) => match tokio::time::timeout(deadline, walker.walk()).await {
                Ok(result) => result,
                Err(_) => Err(FetchError::TimeoutError(format!(
                    "{} not fully fetched within {:?}",
                    request.symbol, deadline
                ))),
            },
            None => walker.walk().await,
        };

        // #3. Whatever was accumulated is dropped with the walker on error
        if let Err(ref e) = outcome {
            error!("Fetch for {} failed: {}", request.symbol, e);
        }
        outcome
    }

    /// Blocks the caller until the fetch finishes. Runs on a current-thread
    /// runtime that lives only for this call. When the caller is already on
    /// a tokio runtime, that private runtime is driven from a scoped thread.
    pub fn fetch_blocking(&self, request: &FetchRequest) -> Result<Vec<TradeRecord>> {
        request.validate()?;

        // #1. A runtime cannot be blocked on from inside another one
        if tokio::runtime::Handle::try_current().is_err() {
            return self.block_on_local_runtime(request);
        }

        debug!("Already inside a tokio runtime, fetching {} on a scoped thread", request.symbol);
        std::thread::scope(|scope| {
            scope
                .spawn(|| self.block_on_local_runtime(request))
                .join()
                .unwrap_or_else(|_| Err(FetchError::TransportError("fetch thread panicked".to_string())))
        })
    }

    fn block_on_local_runtime(&self, request: &FetchRequest) -> Result<Vec<TradeRecord>> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| FetchError::TransportError(format!("failed to start runtime: {}", e)))?;

        runtime.block_on(self.fetch(request))
    }
}


//
// CONVENIENCE ENTRY POINT
//

/// One-shot blocking fetch with default settings over the real network.
///
/// Arguments mirror the Python binding: empty `api_key`/`secret` means an
/// unauthenticated request.
pub fn fetch_trades(
    symbol: &str,
    start_time: i64,
    end_time: i64,
    limit: i64,
    api_key: &str,
    secret: &str,
    base_url: &str,
) -> Result<Vec<TradeRecord>> {
    fetch_trades_with(
        FetchSettings::default(),
        symbol,
        start_time,
        end_time,
        limit,
        api_key,
        secret,
        base_url,
    )
}

#[allow(clippy::too_many_arguments)]
pub fn fetch_trades_with(
    settings: FetchSettings,
    symbol: &str,
    start_time: i64,
    end_time: i64,
    limit: i64,
    api_key: &str,
    secret: &str,
    base_url: &str,
) -> Result<Vec<TradeRecord>> {
    let request = FetchRequest::new(symbol, start_time, end_time)
        .with_limit(limit)
        .with_credentials(api_key, secret)
        .with_base_url(base_url);

    // Validate before building a client so bad arguments never cost a connection
    request.validate()?;

    TradeFetcher::with_settings(settings)?.fetch_blocking(&request)
}
