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

//! Typed response models for the representative endpoint layer.

use serde::Deserialize;
use serde_json::Value;

use super::{
    error::{BinanceHttpError, BinanceHttpResult},
    response::{DocumentExt, FromDocument},
};

/// Binance API error response structure.
///
/// Binance returns this format for error responses:
/// ```json
/// {"code": -1000, "msg": "An unknown error occurred"}
/// ```
#[derive(Clone, Debug, Deserialize)]
pub struct ErrorResponse {
    /// Binance error code (negative number indicates error).
    pub code: i64,
    /// Error message describing the issue.
    pub msg: String,
}

/// Server time response from `GET /api/v3/time`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ServerTime {
    /// Server time in milliseconds since the Unix epoch.
    pub server_time: i64,
}

impl FromDocument for ServerTime {
    fn from_document(doc: &Value) -> BinanceHttpResult<Self> {
        Ok(Self {
            server_time: doc.req_i64("serverTime")?,
        })
    }
}

/// A single asset balance within an account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Balance {
    /// Asset code (e.g. "BTC").
    pub asset: String,
    /// Free amount as a decimal string.
    pub free: String,
    /// Locked amount as a decimal string.
    pub locked: String,
}

impl FromDocument for Balance {
    fn from_document(doc: &Value) -> BinanceHttpResult<Self> {
        Ok(Self {
            asset: doc.req_str("asset")?,
            free: doc.opt_str("free", "0"),
            locked: doc.opt_str("locked", "0"),
        })
    }
}

/// Account information from `GET /api/v3/account` (signed).
///
/// Optional numeric fields default to `-1` and flags to `false` when the
/// server omits them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountInfo {
    /// Maker commission rate in basis points, `-1` when absent.
    pub maker_commission: i64,
    /// Taker commission rate in basis points, `-1` when absent.
    pub taker_commission: i64,
    /// Whether the account may trade.
    pub can_trade: bool,
    /// Whether the account may withdraw.
    pub can_withdraw: bool,
    /// Whether the account may deposit.
    pub can_deposit: bool,
    /// Last update time in milliseconds, `-1` when absent.
    pub update_time: i64,
    /// Per-asset balances.
    pub balances: Vec<Balance>,
}

impl FromDocument for AccountInfo {
    fn from_document(doc: &Value) -> BinanceHttpResult<Self> {
        let balances = match doc.get("balances") {
            Some(Value::Array(items)) => items
                .iter()
                .map(Balance::from_document)
                .collect::<BinanceHttpResult<Vec<_>>>()?,
            Some(_) => {
                return Err(BinanceHttpError::JsonError(
                    "field `balances` is not an array".to_string(),
                ));
            }
            None => Vec::new(),
        };

        Ok(Self {
            maker_commission: doc.opt_i64("makerCommission", -1),
            taker_commission: doc.opt_i64("takerCommission", -1),
            can_trade: doc.opt_bool("canTrade", false),
            can_withdraw: doc.opt_bool("canWithdraw", false),
            can_deposit: doc.opt_bool("canDeposit", false),
            update_time: doc.opt_i64("updateTime", -1),
            balances,
        })
    }
}

/// Order acknowledgement from `POST /api/v3/order` and `DELETE /api/v3/order`.
///
/// Binance varies which fields are present by response type (ACK, RESULT,
/// FULL) and by endpoint; missing optionals resolve to sentinels rather than
/// failing the mapping.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderAck {
    /// Trading symbol.
    pub symbol: String,
    /// Exchange-assigned order ID, `-1` when absent.
    pub order_id: i64,
    /// Client order ID, empty when absent.
    pub client_order_id: String,
    /// Transaction time in milliseconds, `-1` when absent.
    pub transact_time: i64,
    /// Order price as a decimal string, `"0"` when absent.
    pub price: String,
    /// Original quantity as a decimal string, `"0"` when absent.
    pub orig_qty: String,
    /// Executed quantity as a decimal string, `"0"` when absent.
    pub executed_qty: String,
    /// Order status, `"UNKNOWN"` when absent.
    pub status: String,
}

impl FromDocument for OrderAck {
    fn from_document(doc: &Value) -> BinanceHttpResult<Self> {
        Ok(Self {
            symbol: doc.req_str("symbol")?,
            order_id: doc.opt_i64("orderId", -1),
            client_order_id: doc.opt_str("clientOrderId", ""),
            transact_time: doc.opt_i64("transactTime", -1),
            price: doc.opt_str("price", "0"),
            orig_qty: doc.opt_str("origQty", "0"),
            executed_qty: doc.opt_str("executedQty", "0"),
            status: doc.opt_str("status", "UNKNOWN"),
        })
    }
}
