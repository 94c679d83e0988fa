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

//! Server clock offset tracking for signed request timestamps.

use std::{
    fmt::Debug,
    sync::atomic::{AtomicI64, Ordering},
};

use chrono::Utc;

/// Local clock source returning milliseconds since the Unix epoch.
pub type LocalClockFn = Box<dyn Fn() -> i64 + Send + Sync>;

/// Tracks the offset between the local clock and the Binance server clock.
///
/// Every signed request embeds a millisecond timestamp which the server rejects
/// when it drifts outside the request's validity window (`recvWindow`). The
/// offset is measured from the server time endpoint and applied to every
/// subsequent timestamp, so a skewed host can still produce acceptable
/// requests.
///
/// The offset is a single atomic value: concurrent readers observe either the
/// previous or the new offset, never a torn write. Refreshing is the
/// transport's job (see `BinanceHttpClient::sync_clock`); a failed refresh
/// leaves the previous offset untouched.
pub struct ServerClock {
    offset_ms: AtomicI64,
    local_clock: LocalClockFn,
}

impl Debug for ServerClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(ServerClock))
            .field("offset_ms", &self.offset_ms.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

impl Default for ServerClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerClock {
    /// Creates a clock backed by the system UTC clock with zero offset.
    #[must_use]
    pub fn new() -> Self {
        Self::with_local_clock(Box::new(|| Utc::now().timestamp_millis()))
    }

    /// Creates a clock with a custom local time source (used for testing).
    #[must_use]
    pub fn with_local_clock(local_clock: LocalClockFn) -> Self {
        Self {
            offset_ms: AtomicI64::new(0),
            local_clock,
        }
    }

    /// Returns the local clock reading in milliseconds.
    #[must_use]
    pub fn local_millis(&self) -> i64 {
        (self.local_clock)()
    }

    /// Returns the cached offset (server time minus local time) in milliseconds.
    #[must_use]
    pub fn offset_ms(&self) -> i64 {
        self.offset_ms.load(Ordering::Acquire)
    }

    /// Returns the offset-adjusted current time in milliseconds.
    #[must_use]
    pub fn now_millis(&self) -> i64 {
        self.local_millis() + self.offset_ms()
    }

    /// Stores an explicit offset in milliseconds.
    pub fn set_offset_ms(&self, offset_ms: i64) {
        self.offset_ms.store(offset_ms, Ordering::Release);
    }

    /// Computes and stores the offset from a server time reading, returning it.
    pub fn set_offset_from_server(&self, server_ms: i64) -> i64 {
        let offset = server_ms - self.local_millis();
        self.set_offset_ms(offset);
        offset
    }
}
