// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2025 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! Integration tests for the HTTP client using a mock Axum server.

use std::{
    net::SocketAddr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use axum::{
    extract::RawQuery,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use binance_http::{
    common::credential::Credential,
    config::BinanceClientConfig,
    factory::ClientFactory,
    http::{
        client::{BinanceHttpClient, ParamLocation},
        error::BinanceHttpError,
        params::Params,
        resolver::EndpointResolver,
    },
};
use reqwest::Method;
use rstest::rstest;

const TEST_API_KEY: &str = "test-api-key";
const TEST_API_SECRET: &str = "test-api-secret";

#[derive(Default)]
struct TestServerState {
    last_signed_query: Mutex<Option<String>>,
    last_signed_headers: Mutex<Option<HeaderMap>>,
    drift_rejections: AtomicUsize,
    time_failures: AtomicUsize,
    server_time_offset_ms: i64,
}

impl TestServerState {
    fn with_server_time_offset(offset_ms: i64) -> Self {
        Self {
            server_time_offset_ms: offset_ms,
            ..Default::default()
        }
    }

    fn with_drift_rejections(count: usize) -> Self {
        Self {
            drift_rejections: AtomicUsize::new(count),
            ..Default::default()
        }
    }

    fn with_time_failures(count: usize) -> Self {
        Self {
            time_failures: AtomicUsize::new(count),
            ..Default::default()
        }
    }

    fn consume(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn record_signed(&self, query: Option<String>, headers: HeaderMap) {
        *self.last_signed_query.lock().unwrap() = query;
        *self.last_signed_headers.lock().unwrap() = Some(headers);
    }
}

fn json_response(status: StatusCode, body: &'static str) -> impl IntoResponse {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        body.to_string(),
    )
}

fn unauthorized_response() -> impl IntoResponse {
    json_response(
        StatusCode::UNAUTHORIZED,
        r#"{"code":-2015,"msg":"Invalid API-key, IP, or permissions for action"}"#,
    )
}

fn clock_drift_response() -> impl IntoResponse {
    json_response(
        StatusCode::BAD_REQUEST,
        r#"{"code":-1021,"msg":"Timestamp outside of recvWindow"}"#,
    )
}

const ACCOUNT_BODY: &str = r#"{
    "makerCommission": 15,
    "takerCommission": 15,
    "canTrade": true,
    "canWithdraw": true,
    "canDeposit": true,
    "updateTime": 123456789,
    "balances": [
        {"asset": "BTC", "free": "1.00000000", "locked": "0.50000000"},
        {"asset": "USDT", "free": "10000.00000000", "locked": "0.00000000"}
    ]
}"#;

const ORDER_ACK_BODY: &str = r#"{
    "symbol": "BTCUSDT",
    "orderId": 28,
    "clientOrderId": "6gCrw2kRUAF9CvJDGP16IP",
    "transactTime": 1507725176595,
    "price": "0.10000000",
    "origQty": "1.00000000",
    "executedQty": "0.00000000",
    "status": "NEW"
}"#;

fn create_router(state: Arc<TestServerState>) -> Router {
    let time_state = state.clone();
    let account_state = state.clone();
    let order_state = state.clone();
    let cancel_state = state;

    Router::new()
        .route("/api/v3/ping", get(|| async { json_response(StatusCode::OK, "{}") }))
        .route(
            "/api/v3/time",
            get(move || {
                let state = time_state.clone();
                async move {
                    if TestServerState::consume(&state.time_failures) {
                        return json_response(
                            StatusCode::INTERNAL_SERVER_ERROR,
                            r#"{"code":-1000,"msg":"An unknown error occurred"}"#,
                        )
                        .into_response();
                    }
                    let server_time =
                        chrono::Utc::now().timestamp_millis() + state.server_time_offset_ms;
                    (
                        StatusCode::OK,
                        [(header::CONTENT_TYPE, "application/json")],
                        format!(r#"{{"serverTime":{server_time}}}"#),
                    )
                        .into_response()
                }
            }),
        )
        .route(
            "/api/v3/depth",
            get(|| async {
                json_response(
                    StatusCode::OK,
                    r#"{"lastUpdateId":12345,"bids":[["1000.00","0.10"]],"asks":[["1001.00","0.15"]]}"#,
                )
            }),
        )
        .route(
            "/api/v3/account",
            get(move |headers: HeaderMap, RawQuery(query): RawQuery| {
                let state = account_state.clone();
                async move {
                    state.record_signed(query, headers.clone());
                    if !headers.contains_key("x-mbx-apikey") {
                        return unauthorized_response().into_response();
                    }
                    if TestServerState::consume(&state.drift_rejections) {
                        return clock_drift_response().into_response();
                    }
                    json_response(StatusCode::OK, ACCOUNT_BODY).into_response()
                }
            }),
        )
        .route(
            "/api/v3/order",
            post(move |headers: HeaderMap, RawQuery(query): RawQuery| {
                let state = order_state.clone();
                async move {
                    state.record_signed(query.clone(), headers.clone());
                    if !headers.contains_key("x-mbx-apikey") {
                        return unauthorized_response().into_response();
                    }
                    if query.as_deref().is_some_and(|q| q.contains("symbol=BROKEUSDT")) {
                        return json_response(
                            StatusCode::BAD_REQUEST,
                            r#"{"code":-2010,"msg":"Account has insufficient balance for requested action."}"#,
                        )
                        .into_response();
                    }
                    json_response(StatusCode::OK, ORDER_ACK_BODY).into_response()
                }
            })
            .delete(move |headers: HeaderMap, RawQuery(query): RawQuery| {
                let state = cancel_state.clone();
                async move {
                    state.record_signed(query, headers.clone());
                    if !headers.contains_key("x-mbx-apikey") {
                        return unauthorized_response().into_response();
                    }
                    json_response(StatusCode::OK, ORDER_ACK_BODY).into_response()
                }
            }),
        )
        .route(
            "/api/v3/boom",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error") }),
        )
}

async fn start_test_server(state: Arc<TestServerState>) -> SocketAddr {
    let router = create_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router.into_make_service())
            .await
            .unwrap();
    });

    wait_for_server(addr).await;
    addr
}

async fn wait_for_server(addr: SocketAddr) {
    let url = format!("http://{addr}/api/v3/ping");
    for _ in 0..50 {
        if reqwest::get(&url).await.is_ok_and(|r| r.status().is_success()) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    panic!("mock server at {addr} never became ready");
}

/// Binds and drops a listener so the port is very likely refused afterwards.
async fn dead_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

fn public_config(addr: SocketAddr) -> BinanceClientConfig {
    BinanceClientConfig {
        base_url: Some(format!("http://{addr}")),
        sync_clock_on_connect: false,
        ..Default::default()
    }
}

fn signed_config(addr: SocketAddr) -> BinanceClientConfig {
    BinanceClientConfig {
        api_key: Some(TEST_API_KEY.to_string()),
        api_secret: Some(TEST_API_SECRET.to_string()),
        base_url: Some(format!("http://{addr}")),
        recv_window_ms: Some(5_000),
        sync_clock_on_connect: false,
        ..Default::default()
    }
}

// ------------------------------------------------------------------------------------------------
// Construction and endpoint resolution
// ------------------------------------------------------------------------------------------------

#[rstest]
#[tokio::test]
async fn test_connect_with_pinned_url_succeeds() {
    let addr = start_test_server(Arc::new(TestServerState::default())).await;

    let client = BinanceHttpClient::connect(public_config(addr)).await.unwrap();

    client.ping().await.unwrap();
    assert_eq!(client.raw().base_url(), format!("http://{addr}"));
}

#[rstest]
#[tokio::test]
async fn test_connect_with_dead_pinned_url_fails_fast() {
    let config = BinanceClientConfig {
        base_url: Some(dead_base_url().await),
        sync_clock_on_connect: false,
        ..Default::default()
    };

    let result = BinanceHttpClient::connect(config).await;

    match result {
        Err(BinanceHttpError::ConfigError(msg)) => {
            assert!(msg.contains("failed liveness probe"));
        }
        other => panic!("Expected ConfigError, got {other:?}"),
    }
}

#[rstest]
#[tokio::test]
async fn test_resolver_fails_over_to_next_candidate() {
    let addr = start_test_server(Arc::new(TestServerState::default())).await;
    let resolver =
        EndpointResolver::new(vec![dead_base_url().await, format!("http://{addr}")]);

    let base = resolver.resolve(&reqwest::Client::new()).await.unwrap();

    assert_eq!(base, format!("http://{addr}"));
}

#[rstest]
#[tokio::test]
async fn test_resolver_errors_when_no_candidate_reachable() {
    let resolver =
        EndpointResolver::new(vec![dead_base_url().await, dead_base_url().await]);

    let result = resolver.resolve(&reqwest::Client::new()).await;

    assert!(matches!(result, Err(BinanceHttpError::ConfigError(_))));
}

// ------------------------------------------------------------------------------------------------
// Public endpoints and clock synchronization
// ------------------------------------------------------------------------------------------------

#[rstest]
#[tokio::test]
async fn test_server_time_typed() {
    let addr = start_test_server(Arc::new(TestServerState::default())).await;
    let client = BinanceHttpClient::connect(public_config(addr)).await.unwrap();

    let time = client.server_time().await.unwrap();

    assert!(time.server_time > 1_577_836_800_000);
}

#[rstest]
#[tokio::test]
async fn test_depth_returns_structured_document() {
    let addr = start_test_server(Arc::new(TestServerState::default())).await;
    let client = BinanceHttpClient::connect(public_config(addr)).await.unwrap();

    let doc = client.depth("BTCUSDT", Some(5)).await.unwrap();

    assert_eq!(doc["lastUpdateId"], 12345);
    assert_eq!(doc["bids"][0][0], "1000.00");
}

#[rstest]
#[tokio::test]
async fn test_sync_clock_measures_server_offset() {
    let state = Arc::new(TestServerState::with_server_time_offset(2_500));
    let addr = start_test_server(state).await;
    let mut config = public_config(addr);
    config.sync_clock_on_connect = true;

    let client = BinanceHttpClient::connect(config).await.unwrap();

    // Offset should be close to the simulated 2500 ms of skew (allowing for
    // request latency), and timestamps must track it.
    let offset = client.clock().offset_ms();
    assert!((1_500..=3_500).contains(&offset), "offset was {offset}");
    let drift = client.clock().now_millis() - chrono::Utc::now().timestamp_millis();
    assert!((drift - offset).abs() < 1_000);
}

#[rstest]
#[tokio::test]
async fn test_sync_clock_failure_leaves_offset_untouched() {
    let state = Arc::new(TestServerState::with_time_failures(1));
    let addr = start_test_server(state).await;
    let client = BinanceHttpClient::connect(public_config(addr)).await.unwrap();
    client.clock().set_offset_ms(777);

    // First refresh hits the simulated outage and must not disturb the offset.
    let failed = client.sync_clock().await;
    assert!(failed.is_err());
    assert_eq!(client.clock().offset_ms(), 777);

    // A later refresh succeeds and replaces it.
    client.sync_clock().await.unwrap();
    assert_ne!(client.clock().offset_ms(), 777);
}

// ------------------------------------------------------------------------------------------------
// Signed requests
// ------------------------------------------------------------------------------------------------

#[rstest]
#[tokio::test]
async fn test_signed_account_request_carries_valid_signature() {
    let state = Arc::new(TestServerState::default());
    let addr = start_test_server(state.clone()).await;
    let client = BinanceHttpClient::connect(signed_config(addr)).await.unwrap();

    let account = client.account().await.unwrap();
    assert_eq!(account.maker_commission, 15);
    assert!(account.can_trade);
    assert_eq!(account.balances.len(), 2);

    let query = state.last_signed_query.lock().unwrap().clone().unwrap();
    let headers = state.last_signed_headers.lock().unwrap().clone().unwrap();

    assert_eq!(headers.get("x-mbx-apikey").unwrap(), TEST_API_KEY);

    // The signature must be the trailing parameter and verify over the exact
    // preceding canonical string.
    let (canonical, signature) = query.rsplit_once("&signature=").unwrap();
    let credential = Credential::new(TEST_API_KEY.to_string(), TEST_API_SECRET.to_string());
    assert_eq!(credential.sign(canonical), signature);
    assert!(canonical.contains("timestamp="));
    assert!(canonical.contains("recvWindow=5000"));
}

#[rstest]
#[tokio::test]
async fn test_recv_window_above_maximum_is_clamped() {
    let state = Arc::new(TestServerState::default());
    let addr = start_test_server(state.clone()).await;
    let mut config = signed_config(addr);
    config.recv_window_ms = Some(120_000);

    let client = BinanceHttpClient::connect(config).await.unwrap();
    client.account().await.unwrap();

    let query = state.last_signed_query.lock().unwrap().clone().unwrap();
    assert!(query.contains("recvWindow=60000"));
    assert!(!query.contains("recvWindow=120000"));
}

#[rstest]
#[tokio::test]
async fn test_signed_post_sends_parameters_in_query_string() {
    let state = Arc::new(TestServerState::default());
    let addr = start_test_server(state.clone()).await;
    let client = BinanceHttpClient::connect(signed_config(addr)).await.unwrap();

    let mut params = Params::new();
    params.insert("symbol", "BTCUSDT");
    params.insert("side", "BUY");
    params.insert("type", "LIMIT");
    params.insert("quantity", "1");
    params.insert("price", "0.1");

    let ack = client.new_order(params).await.unwrap();
    assert_eq!(ack.symbol, "BTCUSDT");
    assert_eq!(ack.order_id, 28);
    assert_eq!(ack.status, "NEW");

    let query = state.last_signed_query.lock().unwrap().clone().unwrap();
    assert!(query.starts_with("symbol=BTCUSDT&side=BUY&type=LIMIT&quantity=1&price=0.1"));
    assert!(query.contains("&signature="));
}

#[rstest]
#[tokio::test]
async fn test_signed_call_without_credentials_fails_before_network() {
    let addr = start_test_server(Arc::new(TestServerState::default())).await;
    let client = BinanceHttpClient::connect(public_config(addr)).await.unwrap();

    let result = client.account().await;

    assert!(matches!(result, Err(BinanceHttpError::MissingCredentials)));
}

// ------------------------------------------------------------------------------------------------
// Error surfacing
// ------------------------------------------------------------------------------------------------

#[rstest]
#[tokio::test]
async fn test_business_rejection_surfaces_code_and_last_error() {
    let addr = start_test_server(Arc::new(TestServerState::default())).await;
    let client = BinanceHttpClient::connect(signed_config(addr)).await.unwrap();

    let mut params = Params::new();
    params.insert("symbol", "BROKEUSDT");
    params.insert("side", "BUY");
    params.insert("type", "MARKET");
    params.insert("quantity", "1000000");

    let result = client.new_order(params).await;

    match result {
        Err(BinanceHttpError::BinanceError { code, message }) => {
            assert_eq!(code, -2010);
            assert!(message.contains("insufficient balance"));
        }
        other => panic!("Expected BinanceError, got {other:?}"),
    }

    // Both the structured error and the raw body remain queryable after the
    // failed call.
    let last = client.last_error().unwrap();
    assert_eq!(last.code, -2010);
    let body = client.last_error_body().unwrap();
    assert!(body.contains("-2010"));
}

#[rstest]
#[tokio::test]
async fn test_clock_drift_rejection_recoverable_by_resync() {
    let state = Arc::new(TestServerState::with_drift_rejections(1));
    let addr = start_test_server(state).await;
    let client = BinanceHttpClient::connect(signed_config(addr)).await.unwrap();

    let first = client.account().await;
    let err = first.unwrap_err();
    assert!(err.is_clock_drift());
    assert_eq!(client.last_error().unwrap().code, -1021);

    // Caller-driven recovery: resynchronize once and retry.
    client.sync_clock().await.unwrap();
    let second = client.account().await.unwrap();
    assert!(second.can_trade);
}

#[rstest]
#[tokio::test]
async fn test_non_json_error_body_becomes_unexpected_status() {
    let addr = start_test_server(Arc::new(TestServerState::default())).await;
    let client = BinanceHttpClient::connect(public_config(addr)).await.unwrap();

    let result = client
        .request_raw(Method::GET, "boom", Params::new(), false, ParamLocation::Query)
        .await;

    match result {
        Err(BinanceHttpError::UnexpectedStatus { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "Internal Server Error");
        }
        other => panic!("Expected UnexpectedStatus, got {other:?}"),
    }

    assert!(client.last_error().is_none());
    assert_eq!(client.last_error_body().unwrap(), "Internal Server Error");
}

// ------------------------------------------------------------------------------------------------
// Factory credential reuse
// ------------------------------------------------------------------------------------------------

#[rstest]
#[tokio::test]
async fn test_factory_reuses_last_credentials() {
    let state = Arc::new(TestServerState::default());
    let addr = start_test_server(state.clone()).await;
    let factory = ClientFactory::new();

    let first = factory.connect(signed_config(addr)).await.unwrap();
    first.account().await.unwrap();

    // Second client supplies no credentials and borrows the recorded pair.
    let second = factory
        .connect(BinanceClientConfig {
            base_url: Some(format!("http://{addr}")),
            sync_clock_on_connect: false,
            ..Default::default()
        })
        .await
        .unwrap();

    second.account().await.unwrap();
    let headers = state.last_signed_headers.lock().unwrap().clone().unwrap();
    assert_eq!(headers.get("x-mbx-apikey").unwrap(), TEST_API_KEY);
}
