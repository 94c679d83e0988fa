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

//! Client library for the [Binance](https://www.binance.com) Spot REST API.
//!
//! The crate is built around a shared signed-request core which every endpoint
//! wrapper goes through:
//!
//! - [`http::params::Params`]: an insertion-ordered parameter set with a canonical,
//!   deterministic query-string serialization (the exact bytes that get signed).
//! - [`common::credential::Credential`]: API key storage and HMAC SHA256 request
//!   signing with hexadecimal encoding.
//! - [`http::clock::ServerClock`]: local/server clock offset tracking so request
//!   timestamps stay inside the server's `recvWindow` even on skewed hosts.
//! - [`http::resolver::EndpointResolver`]: liveness probing across the documented
//!   API mirrors (or a caller-pinned base URL), failing fast at construction when
//!   nothing is reachable.
//! - [`http::client::BinanceRawHttpClient`]: the transport orchestrating the
//!   above for GET/POST/PUT/DELETE calls, surfacing structured Binance errors and
//!   retaining the last error for inspection after a failed call.
//! - [`http::response`]: uniform response shaping as raw text, a schema-less
//!   `serde_json::Value` document, or a typed model derived from that document.
//!
//! [`http::client::BinanceHttpClient`] layers a representative set of typed
//! endpoint methods on top, and [`factory::ClientFactory`] supports constructing
//! sibling clients that reuse the most recently supplied credentials without any
//! process-global state.
//!
//! The core never retries on its own: signed, time-stamped calls are not safely
//! idempotent, so retry policy belongs to the caller. Error classification
//! helpers ([`http::error::BinanceHttpError::is_clock_drift`] and
//! [`http::error::BinanceHttpError::is_signature_rejection`]) support the
//! standard sync-clock-and-retry-once recovery for timestamp rejections.

pub mod common;
pub mod config;
pub mod factory;
pub mod http;

pub use config::BinanceClientConfig;
pub use factory::ClientFactory;
pub use http::{
    client::{BinanceHttpClient, BinanceRawHttpClient, ParamLocation},
    error::{BinanceHttpError, BinanceHttpResult},
    params::Params,
};
