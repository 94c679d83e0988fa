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

//! Binance HTTP error types.

use std::fmt::{self, Display};

use crate::common::consts::{
    BINANCE_ERROR_CODE_CLOCK_DRIFT, BINANCE_ERROR_CODE_INVALID_SIGNATURE,
};

/// Binance HTTP client error type.
///
/// Variants separate the failure classes callers branch on: configuration
/// errors are fatal at construction, network errors are retryable by the
/// caller, and `BinanceError` carries the server's structured rejection.
#[derive(Debug)]
pub enum BinanceHttpError {
    /// Missing API credentials for an authenticated request.
    MissingCredentials,
    /// Client misconfiguration: unreachable endpoints or absent credentials at construction.
    ConfigError(String),
    /// Binance API returned an error response.
    BinanceError {
        /// Binance error code.
        code: i64,
        /// Error message from Binance.
        message: String,
    },
    /// JSON parsing or serialization error.
    JsonError(String),
    /// Request validation error.
    ValidationError(String),
    /// Network or connection error.
    NetworkError(String),
    /// Request timed out.
    Timeout(String),
    /// Unexpected HTTP status code with a non-Binance body.
    UnexpectedStatus {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },
}

impl BinanceHttpError {
    /// Returns `true` if the server rejected the request timestamp as outside
    /// its validity window.
    ///
    /// Recoverable by re-synchronizing the clock and retrying once.
    #[must_use]
    pub fn is_clock_drift(&self) -> bool {
        matches!(
            self,
            Self::BinanceError { code, .. } if *code == BINANCE_ERROR_CODE_CLOCK_DRIFT
        )
    }

    /// Returns `true` if the server rejected the request signature.
    ///
    /// Not recoverable by retry; indicates a credential or canonicalization bug.
    #[must_use]
    pub fn is_signature_rejection(&self) -> bool {
        matches!(
            self,
            Self::BinanceError { code, .. } if *code == BINANCE_ERROR_CODE_INVALID_SIGNATURE
        )
    }

    /// Returns `true` for transient failures worth a caller-initiated retry.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::NetworkError(_) | Self::Timeout(_))
    }
}

impl Display for BinanceHttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCredentials => write!(f, "Missing API credentials"),
            Self::ConfigError(msg) => write!(f, "Configuration error: {msg}"),
            Self::BinanceError { code, message } => {
                write!(f, "Binance error {code}: {message}")
            }
            Self::JsonError(msg) => write!(f, "JSON error: {msg}"),
            Self::ValidationError(msg) => write!(f, "Validation error: {msg}"),
            Self::NetworkError(msg) => write!(f, "Network error: {msg}"),
            Self::Timeout(msg) => write!(f, "Timeout: {msg}"),
            Self::UnexpectedStatus { status, body } => {
                write!(f, "Unexpected status {status}: {body}")
            }
        }
    }
}

impl std::error::Error for BinanceHttpError {}

impl From<serde_json::Error> for BinanceHttpError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError(err.to_string())
    }
}

impl From<reqwest::Error> for BinanceHttpError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else {
            Self::NetworkError(err.to_string())
        }
    }
}

/// Result type for Binance HTTP operations.
pub type BinanceHttpResult<T> = Result<T, BinanceHttpError>;
