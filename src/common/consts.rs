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

//! Binance venue constants and API endpoints.

/// User agent sent with every request.
pub const BINANCE_HTTP_USER_AGENT: &str =
    concat!("binance-http/", env!("CARGO_PKG_VERSION"), " (Rust)");

/// Header carrying the API key on every request.
pub const BINANCE_API_KEY_HEADER: &str = "X-MBX-APIKEY";

// ------------------------------------------------------------------------------------------------
// HTTP Base URLs
// ------------------------------------------------------------------------------------------------

/// Binance Spot API base URL (mainnet, primary).
pub const BINANCE_SPOT_HTTP_URL: &str = "https://api.binance.com";

/// Binance Spot API base URL (testnet).
pub const BINANCE_SPOT_TESTNET_HTTP_URL: &str = "https://testnet.binance.vision";

/// Documented Spot API mirrors, probed in order when no base URL is pinned.
pub const BINANCE_SPOT_HTTP_CANDIDATES: &[&str] = &[
    BINANCE_SPOT_HTTP_URL,
    "https://api-gcp.binance.com",
    "https://api1.binance.com",
    "https://api2.binance.com",
    "https://api3.binance.com",
    "https://api4.binance.com",
];

// ------------------------------------------------------------------------------------------------
// API Paths
// ------------------------------------------------------------------------------------------------

/// Binance Spot REST API path prefix.
pub const BINANCE_SPOT_API_PATH: &str = "/api/v3";

// ------------------------------------------------------------------------------------------------
// Request validity window
// ------------------------------------------------------------------------------------------------

/// Maximum `recvWindow` accepted by the server (milliseconds).
pub const BINANCE_MAX_RECV_WINDOW_MS: u64 = 60_000;

/// Default `recvWindow` applied by the server when none is sent (milliseconds).
pub const BINANCE_DEFAULT_RECV_WINDOW_MS: u64 = 5_000;

// ------------------------------------------------------------------------------------------------
// Error codes with dedicated handling
// ------------------------------------------------------------------------------------------------

/// Request timestamp fell outside the server's validity window.
pub const BINANCE_ERROR_CODE_CLOCK_DRIFT: i64 = -1021;

/// Signature verification failed on the server.
pub const BINANCE_ERROR_CODE_INVALID_SIGNATURE: i64 = -1022;
