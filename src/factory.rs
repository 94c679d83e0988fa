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

//! Client factory with explicit credential reuse.

use std::sync::{Mutex, MutexGuard};

use crate::{
    common::credential::Credential,
    config::BinanceClientConfig,
    http::{
        client::BinanceHttpClient,
        error::{BinanceHttpError, BinanceHttpResult},
    },
};

/// Constructs clients, remembering the most recently supplied credentials.
///
/// Applications that build several clients with one credential pair pass the
/// same factory to each construction: a config carrying both key and secret
/// records them here, and a config carrying neither borrows the recorded pair.
/// The reuse is explicit and scoped to the factory the application holds;
/// there is no process-global credential state.
#[derive(Debug, Default)]
pub struct ClientFactory {
    last_credential: Mutex<Option<Credential>>,
}

impl ClientFactory {
    /// Creates an empty factory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if credentials have been recorded.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        self.lock_last().is_some()
    }

    /// Connects a client, recording or reusing credentials.
    ///
    /// # Errors
    ///
    /// Returns [`BinanceHttpError::ConfigError`] when the config carries no
    /// credentials and none were previously recorded, and
    /// [`BinanceHttpError::MissingCredentials`] when exactly one of key/secret
    /// is supplied. Construction errors from the client itself pass through.
    pub async fn connect(
        &self,
        config: BinanceClientConfig,
    ) -> BinanceHttpResult<BinanceHttpClient> {
        let credential = match (config.api_key.clone(), config.api_secret.clone()) {
            (Some(key), Some(secret)) => {
                let credential = Credential::new(key, secret);
                *self.lock_last() = Some(credential.clone());
                credential
            }
            (None, None) => self.lock_last().clone().ok_or_else(|| {
                BinanceHttpError::ConfigError(
                    "no credentials supplied and none previously recorded by this factory"
                        .to_string(),
                )
            })?,
            _ => return Err(BinanceHttpError::MissingCredentials),
        };

        BinanceHttpClient::connect_with_credential(&config, Some(credential)).await
    }

    fn lock_last(&self) -> MutexGuard<'_, Option<Credential>> {
        self.last_credential.lock().unwrap_or_else(|e| e.into_inner())
    }
}
