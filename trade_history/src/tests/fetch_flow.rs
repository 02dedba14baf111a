// @file: trade_history/src/tests/fetch_flow.rs
// @description: End-to-end pagination, validation and failure handling against a scripted exchange.
// @author: LAS.

#[cfg(test)]
mod fetch_flow_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use crate::connectors::bybit::signer::{HEADER_API_KEY, HEADER_RECV_WINDOW, HEADER_SIGN, HEADER_TIMESTAMP};
    use crate::core::error::FetchError;
    use crate::core::models::{FetchRequest, FetchSettings, MalformedPolicy, TradeSide};
    use crate::fetcher::TradeFetcher;
    use crate::tests::mock_exchange::{
        error_body, trade, HangingTransport, RecordingClock, ScriptedTransport, T0,
    };

    //
    // HELPERS
    //

    fn three_page_exchange() -> ScriptedTransport {
        ScriptedTransport::new()
            .then_page(vec![trade(1, "Buy"), trade(2, "Sell")], "c1")
            .then_page(vec![trade(3, "Buy"), trade(4, "Buy")], "c2")
            .then_page(vec![trade(5, "Sell")], "")
    }

    fn request() -> FetchRequest {
        FetchRequest::new("BTCUSDT", T0, T0 + 3_600_000).with_base_url("http://mock.local")
    }

    fn fetcher(transport: Arc<ScriptedTransport>, clock: Arc<RecordingClock>) -> TradeFetcher {
        TradeFetcher::new(transport, clock, FetchSettings::default())
    }

    //
    // TEST: PAGINATION
    //
    #[tokio::test]
    async fn test_three_pages_in_server_order() {
        let transport = Arc::new(three_page_exchange());
        let clock = Arc::new(RecordingClock::at(T0));

        let trades = fetcher(transport.clone(), clock.clone()).fetch(&request()).await.unwrap();

        // #1. All five, in the order the server sent them
        let times: Vec<i64> = trades.iter().map(|t| t.timestamp - T0).collect();
        assert_eq!(times, vec![1000, 2000, 3000, 4000, 5000]);
        assert_eq!(trades[1].side, TradeSide::Sell);
        assert_eq!(trades[4].price, 42005.5);

        // #2. Cursor threading
        let requests = transport.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].cursor(), None);
        assert_eq!(requests[1].cursor(), Some("c1"));
        assert_eq!(requests[2].cursor(), Some("c2"));
        assert!(requests[0].url.starts_with(
            "http://mock.local/v5/market/trades?symbol=BTCUSDT&startTime=1704067200000&endTime=1704070800000&limit=1000"
        ));

        // #3. Pacing delay between pages only, none after the last one
        assert_eq!(clock.sleeps_ms(), vec![50, 50]);
    }

    #[tokio::test]
    async fn test_empty_window_returns_empty_list() {
        let transport = Arc::new(ScriptedTransport::new().then_page(vec![], ""));
        let clock = Arc::new(RecordingClock::at(T0));

        let trades = fetcher(transport.clone(), clock.clone()).fetch(&request()).await.unwrap();

        assert!(trades.is_empty());
        assert_eq!(transport.requests().len(), 1);
        assert!(clock.sleeps_ms().is_empty());
    }

    #[tokio::test]
    async fn test_identical_calls_give_identical_results() {
        let clock = Arc::new(RecordingClock::at(T0));

        let first = fetcher(Arc::new(three_page_exchange()), clock.clone()).fetch(&request()).await.unwrap();
        let second = fetcher(Arc::new(three_page_exchange()), clock.clone()).fetch(&request()).await.unwrap();

        assert_eq!(first, second);
    }

    //
    // TEST: VALIDATION HAPPENS BEFORE THE NETWORK
    //
    #[tokio::test]
    async fn test_invalid_limit_never_hits_network() {
        for limit in [0, -5, 1001, 100_000] {
            let transport = Arc::new(three_page_exchange());
            let clock = Arc::new(RecordingClock::at(T0));

            let result = fetcher(transport.clone(), clock).fetch(&request().with_limit(limit)).await;

            assert!(matches!(result, Err(FetchError::InvalidArgument(_))), "limit {}", limit);
            assert!(transport.requests().is_empty(), "limit {} reached the network", limit);
        }
    }

    #[tokio::test]
    async fn test_inverted_window_never_hits_network() {
        let transport = Arc::new(three_page_exchange());
        let clock = Arc::new(RecordingClock::at(T0));
        let inverted = FetchRequest::new("BTCUSDT", T0 + 1, T0);

        let result = fetcher(transport.clone(), clock).fetch(&inverted).await;

        assert!(matches!(result, Err(FetchError::InvalidArgument(_))));
        assert!(transport.requests().is_empty());
    }

    //
    // TEST: SIGNING
    //
    #[tokio::test]
    async fn test_authenticated_requests_carry_signature() {
        let transport = Arc::new(ScriptedTransport::new().then_page(vec![trade(1, "Buy")], ""));
        let clock = Arc::new(RecordingClock::at(T0));
        let req = FetchRequest::new("BTCUSDT", T0, T0 + 3_600_000).with_credentials("key", "test_secret");

        fetcher(transport.clone(), clock).fetch(&req).await.unwrap();

        let requests = transport.requests();
        let headers = &requests[0].headers;
        assert_eq!(headers[HEADER_SIGN], "6864e1b287f706d8bdb587b02fe1f50644e973c108fa294ce98328eef70cab4f");
        assert_eq!(headers[HEADER_API_KEY], "key");
        assert_eq!(headers[HEADER_TIMESTAMP], T0.to_string());
        assert_eq!(headers[HEADER_RECV_WINDOW], "5000");
    }

    #[tokio::test]
    async fn test_public_requests_are_unsigned() {
        let transport = Arc::new(ScriptedTransport::new().then_page(vec![trade(1, "Buy")], ""));
        let clock = Arc::new(RecordingClock::at(T0));

        fetcher(transport.clone(), clock).fetch(&request()).await.unwrap();

        assert!(transport.requests()[0].headers.is_empty());
    }

    //
    // TEST: ALL-OR-NOTHING FAILURES
    //
    #[tokio::test]
    async fn test_unknown_side_fails_whole_fetch() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .then_page(vec![trade(1, "Buy"), trade(2, "Sell")], "c1")
                .then_page(vec![trade(3, "Unknown")], ""),
        );
        let clock = Arc::new(RecordingClock::at(T0));

        let result = fetcher(transport, clock).fetch(&request()).await;

        assert!(matches!(result, Err(FetchError::MalformedRecord { field: "side", .. })));
    }

    #[tokio::test]
    async fn test_skip_policy_drops_only_bad_records() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .then_page(vec![trade(1, "Buy"), trade(2, "Unknown")], "c1")
                .then_page(vec![trade(3, "Sell")], ""),
        );
        let clock = Arc::new(RecordingClock::at(T0));
        let settings = FetchSettings { malformed_policy: MalformedPolicy::Skip, ..FetchSettings::default() };

        let trades = TradeFetcher::new(transport, clock, settings).fetch(&request()).await.unwrap();

        assert_eq!(trades.len(), 2);
        assert_eq!(trades[1].timestamp, T0 + 3000);
    }

    #[tokio::test]
    async fn test_api_error_after_first_page_discards_everything() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .then_page(vec![trade(1, "Buy")], "c1")
                .then(200, error_body(10001, "Illegal category")),
        );
        let clock = Arc::new(RecordingClock::at(T0));

        match fetcher(transport, clock).fetch(&request()).await {
            Err(FetchError::ApiError { code, message }) => {
                assert_eq!(code, 10001);
                assert_eq!(message, "Illegal category");
            }
            other => panic!("expected ApiError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_http_failure_is_not_retried() {
        let transport = Arc::new(ScriptedTransport::new().then(503, "upstream down").otherwise(200, ""));
        let clock = Arc::new(RecordingClock::at(T0));

        let result = fetcher(transport.clone(), clock.clone()).fetch(&request()).await;

        assert!(matches!(result, Err(FetchError::ApiError { code: 503, .. })));
        assert_eq!(transport.requests().len(), 1);
        assert!(clock.sleeps_ms().is_empty());
    }

    #[tokio::test]
    async fn test_network_failure_is_not_retried() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .then_error(FetchError::TransportError("connection reset".to_string()))
                .otherwise(200, ""),
        );
        let clock = Arc::new(RecordingClock::at(T0));

        let result = fetcher(transport.clone(), clock).fetch(&request()).await;

        assert!(matches!(result, Err(FetchError::TransportError(_))));
        assert_eq!(transport.requests().len(), 1);
    }

    //
    // TEST: LOOP GUARDS
    //
    #[tokio::test]
    async fn test_repeated_cursor_is_protocol_error() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .then_page(vec![trade(1, "Buy")], "same")
                .then_page(vec![trade(2, "Buy")], "same"),
        );
        let clock = Arc::new(RecordingClock::at(T0));

        let result = fetcher(transport.clone(), clock).fetch(&request()).await;

        assert!(matches!(result, Err(FetchError::ProtocolError(_))));
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_page_cap_is_protocol_error() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .then_page(vec![trade(1, "Buy")], "p1")
                .then_page(vec![trade(2, "Buy")], "p2")
                .then_page(vec![trade(3, "Buy")], "p3")
                .then_page(vec![trade(4, "Buy")], ""),
        );
        let clock = Arc::new(RecordingClock::at(T0));
        let settings = FetchSettings { max_pages: 3, ..FetchSettings::default() };

        let result = TradeFetcher::new(transport.clone(), clock, settings).fetch(&request()).await;

        assert!(matches!(result, Err(FetchError::ProtocolError(_))));
        assert_eq!(transport.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_deadline_surfaces_timeout() {
        let clock = Arc::new(RecordingClock::at(T0));
        let settings = FetchSettings { deadline: Some(Duration::from_millis(50)), ..FetchSettings::default() };

        let result = TradeFetcher::new(Arc::new(HangingTransport), clock, settings).fetch(&request()).await;

        assert!(matches!(result, Err(FetchError::TimeoutError(_))));
    }

    #[tokio::test]
    async fn test_deadline_mid_pagination_discards_partial_pages() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .then_page(vec![trade(1, "Buy"), trade(2, "Sell")], "c1")
                .then_stall(),
        );
        let clock = Arc::new(RecordingClock::at(T0));
        let settings = FetchSettings { deadline: Some(Duration::from_millis(50)), ..FetchSettings::default() };

        let result = TradeFetcher::new(transport.clone(), clock, settings).fetch(&request()).await;

        // First page arrived, second never did: no partial list comes back
        assert!(matches!(result, Err(FetchError::TimeoutError(_))));
        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].cursor(), Some("c1"));
    }

    //
    // TEST: BLOCKING BRIDGE
    //
    #[test]
    fn test_blocking_fetch_outside_runtime() {
        let transport = Arc::new(three_page_exchange());
        let clock = Arc::new(RecordingClock::at(T0));

        let trades = fetcher(transport, clock).fetch_blocking(&request()).unwrap();

        assert_eq!(trades.len(), 5);
    }

    #[tokio::test]
    async fn test_blocking_fetch_inside_runtime_returns_trades() {
        let transport = Arc::new(three_page_exchange());
        let clock = Arc::new(RecordingClock::at(T0));
        let fetcher = fetcher(transport.clone(), clock);

        let trades = fetcher.fetch_blocking(&request()).unwrap();

        assert_eq!(trades.len(), 5);
        assert_eq!(transport.requests().len(), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_blocking_fetch_inside_runtime_surfaces_errors() {
        let transport = Arc::new(ScriptedTransport::new().then(200, error_body(10001, "params error")));
        let clock = Arc::new(RecordingClock::at(T0));

        let result = fetcher(transport, clock).fetch_blocking(&request());

        assert!(matches!(result, Err(FetchError::ApiError { code: 10001, .. })));
    }
}
