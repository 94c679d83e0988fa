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

//! Client configuration structures.

/// Configuration for constructing a Binance HTTP client.
#[derive(Clone, Debug)]
pub struct BinanceClientConfig {
    /// API key for authenticated endpoints.
    pub api_key: Option<String>,
    /// API secret for request signing.
    pub api_secret: Option<String>,
    /// Pinned base URL, bypassing mirror discovery (still liveness-probed).
    pub base_url: Option<String>,
    /// Request validity window in milliseconds, clamped to the server maximum.
    pub recv_window_ms: Option<u64>,
    /// Per-request timeout in seconds; no implicit timeout when unset.
    pub timeout_secs: Option<u64>,
    /// Whether to measure the server clock offset during construction.
    pub sync_clock_on_connect: bool,
}

impl Default for BinanceClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_secret: None,
            base_url: None,
            recv_window_ms: None,
            timeout_secs: None,
            sync_clock_on_connect: true,
        }
    }
}
