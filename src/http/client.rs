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

//! Binance HTTP client implementation.

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT},
    Method,
};
use serde_json::Value;

use crate::{
    common::{
        consts::{
            BINANCE_API_KEY_HEADER, BINANCE_HTTP_USER_AGENT, BINANCE_MAX_RECV_WINDOW_MS,
            BINANCE_SPOT_API_PATH,
        },
        credential::Credential,
    },
    config::BinanceClientConfig,
};

use super::{
    clock::ServerClock,
    error::{BinanceHttpError, BinanceHttpResult},
    models::{AccountInfo, ErrorResponse, OrderAck, ServerTime},
    params::Params,
    resolver::EndpointResolver,
    response::{parse_document, parse_typed, FromDocument},
};

/// Where the serialized parameter string travels in a request.
///
/// GET and DELETE use the query string; POST and PUT default to a form-encoded
/// body. Some signed POST endpoints take query-string parameters instead — the
/// placement follows the documented convention per endpoint rather than one
/// universal rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamLocation {
    /// Parameters appended to the URL as a query string.
    Query,
    /// Parameters sent as an `application/x-www-form-urlencoded` body.
    Body,
}

impl ParamLocation {
    /// Returns the conventional placement for `method`.
    #[must_use]
    pub fn default_for(method: &Method) -> Self {
        if *method == Method::POST || *method == Method::PUT {
            Self::Body
        } else {
            Self::Query
        }
    }
}

/// Builds the final signed query: canonical parameters, then the trailing tag.
///
/// The signature covers the exact serialized string including `timestamp` and
/// `recvWindow`; the tag itself is appended afterwards and is never part of
/// the signed material.
pub(crate) fn build_signed_query(
    credential: &Credential,
    timestamp: i64,
    recv_window_ms: Option<u64>,
    mut params: Params,
) -> String {
    params.insert("timestamp", timestamp);
    if let Some(window) = recv_window_ms {
        params.insert("recvWindow", window);
    }
    let canonical = params.serialize();
    let signature = credential.sign(&canonical);
    format!("{canonical}&signature={signature}")
}

/// Lightweight raw HTTP client for Binance REST API access.
///
/// Handles:
/// - Base URL resolution across API mirrors (or a pinned override) at construction.
/// - Clock-offset-adjusted timestamps and HMAC SHA256 signing for private endpoints.
/// - Query-string or form-body parameter placement per endpoint convention.
/// - Structured error deserialization for Binance error payloads, with the last
///   error retained for inspection after a failed call.
///
/// The client never retries: signed, time-stamped calls are not safely
/// idempotent, so retry policy stays with the caller.
#[derive(Clone, Debug)]
pub struct BinanceRawHttpClient {
    client: reqwest::Client,
    base_url: String,
    api_path: &'static str,
    credential: Option<Credential>,
    recv_window_ms: Option<u64>,
    clock: Arc<ServerClock>,
    last_error: Arc<Mutex<Option<ErrorResponse>>>,
    last_error_body: Arc<Mutex<Option<String>>>,
}

impl BinanceRawHttpClient {
    /// Creates a new client, resolving the base URL among the configured
    /// endpoint candidates (or probing the pinned override).
    ///
    /// # Errors
    ///
    /// Returns [`BinanceHttpError::ConfigError`] when no endpoint is reachable
    /// or the pinned base URL fails its liveness probe; this is a fatal
    /// construction error, not deferred to first use.
    pub async fn connect(
        config: &BinanceClientConfig,
        credential: Option<Credential>,
    ) -> BinanceHttpResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BINANCE_HTTP_USER_AGENT));
        if let Some(cred) = &credential {
            let value = HeaderValue::from_str(cred.api_key()).map_err(|_| {
                BinanceHttpError::ConfigError("API key contains invalid header characters".to_string())
            })?;
            headers.insert(BINANCE_API_KEY_HEADER, value);
        }

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout_secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(timeout_secs));
        }
        let client = builder
            .build()
            .map_err(|e| BinanceHttpError::NetworkError(e.to_string()))?;

        let resolver = match &config.base_url {
            Some(url) => EndpointResolver::pinned(url.clone()),
            None => EndpointResolver::spot_mainnet(),
        };
        let base_url = resolver.resolve(&client).await?;

        let recv_window_ms = config.recv_window_ms.map(|window| {
            if window > BINANCE_MAX_RECV_WINDOW_MS {
                tracing::warn!(
                    "recvWindow {window} ms above maximum, clamping to {BINANCE_MAX_RECV_WINDOW_MS}"
                );
                BINANCE_MAX_RECV_WINDOW_MS
            } else {
                window
            }
        });

        Ok(Self {
            client,
            base_url,
            api_path: BINANCE_SPOT_API_PATH,
            credential,
            recv_window_ms,
            clock: Arc::new(ServerClock::new()),
            last_error: Arc::new(Mutex::new(None)),
            last_error_body: Arc::new(Mutex::new(None)),
        })
    }

    /// Returns the resolved base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the server clock used to stamp signed requests.
    #[must_use]
    pub fn clock(&self) -> &ServerClock {
        &self.clock
    }

    /// Sends a request and returns the raw response body.
    ///
    /// When `signed` is true, `timestamp` (and `recvWindow` if configured) are
    /// appended to `params`, the canonical string is signed, and the signature
    /// is added as the trailing parameter.
    ///
    /// # Errors
    ///
    /// Returns [`BinanceHttpError::MissingCredentials`] for a signed call on a
    /// credential-less client, a transient error for network failures, and
    /// [`BinanceHttpError::BinanceError`] for structured server rejections.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        params: Params,
        signed: bool,
        location: ParamLocation,
    ) -> BinanceHttpResult<String> {
        let query = if signed {
            let credential = self
                .credential
                .as_ref()
                .ok_or(BinanceHttpError::MissingCredentials)?;
            build_signed_query(
                credential,
                self.clock.now_millis(),
                self.recv_window_ms,
                params,
            )
        } else {
            params.serialize()
        };

        let mut request = match location {
            ParamLocation::Query => self
                .client
                .request(method, self.build_url(path, &query)),
            ParamLocation::Body => self
                .client
                .request(method, self.build_url(path, ""))
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded"),
        };
        if location == ParamLocation::Body && !query.is_empty() {
            request = request.body(query);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return self.record_error(status.as_u16(), body);
        }

        Ok(body)
    }

    /// Performs a GET request with query-string parameters.
    pub async fn get(
        &self,
        path: &str,
        params: Params,
        signed: bool,
    ) -> BinanceHttpResult<String> {
        self.send(Method::GET, path, params, signed, ParamLocation::Query)
            .await
    }

    /// Performs a POST request; `location` follows the endpoint's convention.
    pub async fn post(
        &self,
        path: &str,
        params: Params,
        signed: bool,
        location: ParamLocation,
    ) -> BinanceHttpResult<String> {
        self.send(Method::POST, path, params, signed, location).await
    }

    /// Performs a PUT request; `location` follows the endpoint's convention.
    pub async fn put(
        &self,
        path: &str,
        params: Params,
        signed: bool,
        location: ParamLocation,
    ) -> BinanceHttpResult<String> {
        self.send(Method::PUT, path, params, signed, location).await
    }

    /// Performs a DELETE request with query-string parameters.
    pub async fn delete(
        &self,
        path: &str,
        params: Params,
        signed: bool,
    ) -> BinanceHttpResult<String> {
        self.send(Method::DELETE, path, params, signed, ParamLocation::Query)
            .await
    }

    /// Returns the structured error from the most recent failed call, if any.
    #[must_use]
    pub fn last_error(&self) -> Option<ErrorResponse> {
        lock_ignore_poison(&self.last_error).clone()
    }

    /// Returns the raw error body from the most recent failed call, if any.
    #[must_use]
    pub fn last_error_body(&self) -> Option<String> {
        lock_ignore_poison(&self.last_error_body).clone()
    }

    /// Logs the most recent error through `tracing`.
    pub fn log_last_error(&self) {
        if let Some(err) = self.last_error() {
            tracing::error!("Binance error {}: {}", err.code, err.msg);
        } else if let Some(body) = self.last_error_body() {
            tracing::error!("HTTP error body: {body}");
        }
    }

    fn record_error<T>(&self, status: u16, body: String) -> BinanceHttpResult<T> {
        *lock_ignore_poison(&self.last_error_body) = Some(body.clone());

        if let Ok(err) = serde_json::from_str::<ErrorResponse>(&body) {
            *lock_ignore_poison(&self.last_error) = Some(err.clone());
            return Err(BinanceHttpError::BinanceError {
                code: err.code,
                message: err.msg,
            });
        }

        *lock_ignore_poison(&self.last_error) = None;
        Err(BinanceHttpError::UnexpectedStatus { status, body })
    }

    fn build_url(&self, path: &str, query: &str) -> String {
        Self::build_url_impl(&self.base_url, self.api_path, path, query)
    }

    pub(crate) fn build_url_impl(
        base_url: &str,
        api_path: &str,
        path: &str,
        query: &str,
    ) -> String {
        let mut url = format!("{}{}{}", base_url, api_path, Self::normalize_path(path));
        if !query.is_empty() {
            url.push('?');
            url.push_str(query);
        }
        url
    }

    pub(crate) fn normalize_path(path: &str) -> String {
        if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        }
    }
}

fn lock_ignore_poison<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Higher-level HTTP client providing typed endpoints over the raw transport.
///
/// Every response is available in three shapes through the `request_*`
/// methods: raw text, a schema-less document, or a typed model derived from
/// that document. The typed endpoint methods below cover a representative
/// slice of the API surface.
#[derive(Clone, Debug)]
pub struct BinanceHttpClient {
    raw: BinanceRawHttpClient,
}

impl BinanceHttpClient {
    /// Creates a new client from configuration.
    ///
    /// Credentials are optional; public market-data endpoints work without
    /// them. Supplying exactly one of key/secret is an error.
    ///
    /// # Errors
    ///
    /// Returns an error when endpoint resolution fails, credentials are
    /// half-supplied, or the initial clock sync (when enabled) fails.
    pub async fn connect(config: BinanceClientConfig) -> BinanceHttpResult<Self> {
        let credential = match (config.api_key.clone(), config.api_secret.clone()) {
            (Some(key), Some(secret)) => Some(Credential::new(key, secret)),
            (None, None) => None,
            _ => return Err(BinanceHttpError::MissingCredentials),
        };
        Self::connect_with_credential(&config, credential).await
    }

    pub(crate) async fn connect_with_credential(
        config: &BinanceClientConfig,
        credential: Option<Credential>,
    ) -> BinanceHttpResult<Self> {
        let raw = BinanceRawHttpClient::connect(config, credential).await?;
        let client = Self { raw };
        if config.sync_clock_on_connect {
            client.sync_clock().await?;
        }
        Ok(client)
    }

    /// Returns a reference to the underlying raw client.
    #[must_use]
    pub fn raw(&self) -> &BinanceRawHttpClient {
        &self.raw
    }

    /// Returns the server clock used to stamp signed requests.
    #[must_use]
    pub fn clock(&self) -> &ServerClock {
        self.raw.clock()
    }

    /// Re-measures the server clock offset via `GET /api/v3/time`.
    ///
    /// Idempotent and safe to call at any time, including after a clock-drift
    /// rejection. On failure the previous offset is left untouched.
    ///
    /// # Errors
    ///
    /// Returns a transient network error when the time endpoint is unreachable.
    pub async fn sync_clock(&self) -> BinanceHttpResult<i64> {
        let body = self.raw.get("time", Params::new(), false).await?;
        let time: ServerTime = parse_typed(&body)?;
        let offset = self.raw.clock().set_offset_from_server(time.server_time);
        tracing::debug!("Clock synchronized, offset {offset} ms");
        Ok(offset)
    }

    // --------------------------------------------------------------------------------------------
    // Shape-generic request methods
    // --------------------------------------------------------------------------------------------

    /// Sends a request and returns the raw response body text.
    pub async fn request_raw(
        &self,
        method: Method,
        path: &str,
        params: Params,
        signed: bool,
        location: ParamLocation,
    ) -> BinanceHttpResult<String> {
        self.raw.send(method, path, params, signed, location).await
    }

    /// Sends a request and parses the body into a schema-less document.
    pub async fn request_document(
        &self,
        method: Method,
        path: &str,
        params: Params,
        signed: bool,
        location: ParamLocation,
    ) -> BinanceHttpResult<Value> {
        let body = self.raw.send(method, path, params, signed, location).await?;
        parse_document(&body)
    }

    /// Sends a request and maps the structured document into `T`.
    pub async fn request_typed<T: FromDocument>(
        &self,
        method: Method,
        path: &str,
        params: Params,
        signed: bool,
        location: ParamLocation,
    ) -> BinanceHttpResult<T> {
        let body = self.raw.send(method, path, params, signed, location).await?;
        parse_typed(&body)
    }

    // --------------------------------------------------------------------------------------------
    // Public endpoints
    // --------------------------------------------------------------------------------------------

    /// Connectivity test (`GET /api/v3/ping`).
    pub async fn ping(&self) -> BinanceHttpResult<()> {
        self.raw.get("ping", Params::new(), false).await.map(|_| ())
    }

    /// Server time (`GET /api/v3/time`).
    pub async fn server_time(&self) -> BinanceHttpResult<ServerTime> {
        self.request_typed(Method::GET, "time", Params::new(), false, ParamLocation::Query)
            .await
    }

    /// Exchange information (`GET /api/v3/exchangeInfo`).
    pub async fn exchange_info(&self) -> BinanceHttpResult<Value> {
        self.request_document(
            Method::GET,
            "exchangeInfo",
            Params::new(),
            false,
            ParamLocation::Query,
        )
        .await
    }

    /// Order book depth (`GET /api/v3/depth`).
    pub async fn depth(&self, symbol: &str, limit: Option<u32>) -> BinanceHttpResult<Value> {
        let mut params = Params::new();
        params.insert("symbol", symbol);
        params.insert_opt("limit", limit);
        self.request_document(Method::GET, "depth", params, false, ParamLocation::Query)
            .await
    }

    // --------------------------------------------------------------------------------------------
    // Signed endpoints
    // --------------------------------------------------------------------------------------------

    /// Account information (`GET /api/v3/account`, signed).
    pub async fn account(&self) -> BinanceHttpResult<AccountInfo> {
        self.request_typed(
            Method::GET,
            "account",
            Params::new(),
            true,
            ParamLocation::Query,
        )
        .await
    }

    /// Current open orders (`GET /api/v3/openOrders`, signed).
    pub async fn open_orders(&self, symbol: Option<&str>) -> BinanceHttpResult<Value> {
        let mut params = Params::new();
        params.insert_opt("symbol", symbol);
        self.request_document(Method::GET, "openOrders", params, true, ParamLocation::Query)
            .await
    }

    /// Submits a new order (`POST /api/v3/order`, signed).
    ///
    /// Binance documents this endpoint with query-string parameters despite
    /// the POST verb, so the signed string travels in the URL.
    pub async fn new_order(&self, params: Params) -> BinanceHttpResult<OrderAck> {
        self.request_typed(Method::POST, "order", params, true, ParamLocation::Query)
            .await
    }

    /// Cancels an order (`DELETE /api/v3/order`, signed).
    pub async fn cancel_order(&self, params: Params) -> BinanceHttpResult<OrderAck> {
        self.request_typed(Method::DELETE, "order", params, true, ParamLocation::Query)
            .await
    }

    // --------------------------------------------------------------------------------------------
    // Last-error accessors
    // --------------------------------------------------------------------------------------------

    /// Returns the structured error from the most recent failed call, if any.
    #[must_use]
    pub fn last_error(&self) -> Option<ErrorResponse> {
        self.raw.last_error()
    }

    /// Returns the raw error body from the most recent failed call, if any.
    #[must_use]
    pub fn last_error_body(&self) -> Option<String> {
        self.raw.last_error_body()
    }

    /// Logs the most recent error through `tracing`.
    pub fn log_last_error(&self) {
        self.raw.log_last_error();
    }
}
