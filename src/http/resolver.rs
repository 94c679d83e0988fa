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

//! Endpoint candidate resolution with liveness probing.

use crate::common::consts::{BINANCE_SPOT_API_PATH, BINANCE_SPOT_HTTP_CANDIDATES};

use super::error::{BinanceHttpError, BinanceHttpResult};

/// Resolves the base URL to use among candidate API mirrors.
///
/// Candidates are probed in list order with an unauthenticated
/// `GET /api/v3/ping`; the first responsive one wins. A pinned base URL
/// bypasses list discovery but is still probed, so a misconfigured client
/// fails at construction instead of issuing calls against an unreachable
/// host.
///
/// Resolution happens once, during client construction; the chosen address
/// is cached for the client's lifetime. A mirror that dies mid-session
/// surfaces as ordinary per-call network errors, not automatic re-resolution.
#[derive(Clone, Debug)]
pub struct EndpointResolver {
    pinned: Option<String>,
    candidates: Vec<String>,
}

impl EndpointResolver {
    /// Creates a resolver over an ordered candidate list.
    #[must_use]
    pub fn new(candidates: Vec<String>) -> Self {
        Self {
            pinned: None,
            candidates,
        }
    }

    /// Creates a resolver pinned to a single base URL.
    #[must_use]
    pub fn pinned(base_url: impl Into<String>) -> Self {
        Self {
            pinned: Some(base_url.into()),
            candidates: Vec::new(),
        }
    }

    /// Creates a resolver over the documented Spot mainnet mirrors.
    #[must_use]
    pub fn spot_mainnet() -> Self {
        Self::new(
            BINANCE_SPOT_HTTP_CANDIDATES
                .iter()
                .map(ToString::to_string)
                .collect(),
        )
    }

    /// Resolves the base URL to use, probing candidates for liveness.
    ///
    /// # Errors
    ///
    /// Returns [`BinanceHttpError::ConfigError`] when the pinned address fails
    /// its probe, or when no candidate responds.
    pub async fn resolve(&self, client: &reqwest::Client) -> BinanceHttpResult<String> {
        if let Some(base) = &self.pinned {
            let base = base.trim_end_matches('/');
            if Self::probe(client, base).await {
                tracing::debug!("Using pinned base URL {base}");
                return Ok(base.to_string());
            }
            return Err(BinanceHttpError::ConfigError(format!(
                "pinned base URL {base} failed liveness probe"
            )));
        }

        for base in &self.candidates {
            let base = base.trim_end_matches('/');
            if Self::probe(client, base).await {
                tracing::debug!("Resolved base URL {base}");
                return Ok(base.to_string());
            }
            tracing::warn!("Endpoint candidate {base} unreachable, trying next");
        }

        Err(BinanceHttpError::ConfigError(
            "no reachable endpoint among candidates".to_string(),
        ))
    }

    async fn probe(client: &reqwest::Client, base: &str) -> bool {
        let url = format!("{base}{BINANCE_SPOT_API_PATH}/ping");
        match client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!("Probe of {base} failed: {e}");
                false
            }
        }
    }
}
