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

//! Response shaping: raw text, structured documents, and typed models.
//!
//! Every endpoint response is available in three shapes. RAW is the
//! transport's untouched body text. STRUCTURED is a schema-less
//! [`serde_json::Value`] document. TYPED is always derived from the structured
//! document through [`FromDocument`], never through a separate parse path, so
//! adding a typed result is only ever a new mapping impl.

use serde_json::Value;

use super::error::{BinanceHttpError, BinanceHttpResult};

/// Parses a raw response body into a schema-less JSON document.
pub fn parse_document(raw: &str) -> BinanceHttpResult<Value> {
    serde_json::from_str(raw).map_err(|e| BinanceHttpError::JsonError(e.to_string()))
}

/// Conversion from a structured document into a typed result.
pub trait FromDocument: Sized {
    /// Maps the known fields of `doc` into the typed result.
    ///
    /// # Errors
    ///
    /// Returns an error only when a *required* field is missing or malformed;
    /// optional fields resolve to their documented defaults.
    fn from_document(doc: &Value) -> BinanceHttpResult<Self>;
}

/// Parses a raw response body into a typed result via its structured form.
pub fn parse_typed<T: FromDocument>(raw: &str) -> BinanceHttpResult<T> {
    let doc = parse_document(raw)?;
    T::from_document(&doc)
}

/// Optional- and required-field accessors on structured documents.
///
/// Optional accessors substitute the caller's default when the field is
/// missing or has the wrong type; numeric accessors also accept values Binance
/// serializes as strings.
pub trait DocumentExt {
    /// Returns the string field or `default` when missing.
    fn opt_str(&self, name: &str, default: &str) -> String;
    /// Returns the integer field or `default` when missing.
    fn opt_i64(&self, name: &str, default: i64) -> i64;
    /// Returns the unsigned integer field or `default` when missing.
    fn opt_u64(&self, name: &str, default: u64) -> u64;
    /// Returns the float field or `default` when missing.
    fn opt_f64(&self, name: &str, default: f64) -> f64;
    /// Returns the boolean field or `default` when missing.
    fn opt_bool(&self, name: &str, default: bool) -> bool;
    /// Returns the string field, erroring when missing or malformed.
    fn req_str(&self, name: &str) -> BinanceHttpResult<String>;
    /// Returns the integer field, erroring when missing or malformed.
    fn req_i64(&self, name: &str) -> BinanceHttpResult<i64>;
}

fn field_i64(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}

impl DocumentExt for Value {
    fn opt_str(&self, name: &str, default: &str) -> String {
        self.get(name)
            .and_then(Value::as_str)
            .unwrap_or(default)
            .to_string()
    }

    fn opt_i64(&self, name: &str, default: i64) -> i64 {
        self.get(name).and_then(field_i64).unwrap_or(default)
    }

    fn opt_u64(&self, name: &str, default: u64) -> u64 {
        self.get(name)
            .and_then(|v| v.as_u64().or_else(|| v.as_str().and_then(|s| s.parse().ok())))
            .unwrap_or(default)
    }

    fn opt_f64(&self, name: &str, default: f64) -> f64 {
        self.get(name)
            .and_then(|v| v.as_f64().or_else(|| v.as_str().and_then(|s| s.parse().ok())))
            .unwrap_or(default)
    }

    fn opt_bool(&self, name: &str, default: bool) -> bool {
        self.get(name).and_then(Value::as_bool).unwrap_or(default)
    }

    fn req_str(&self, name: &str) -> BinanceHttpResult<String> {
        self.get(name)
            .and_then(Value::as_str)
            .map(ToString::to_string)
            .ok_or_else(|| {
                BinanceHttpError::JsonError(format!("missing or invalid string field `{name}`"))
            })
    }

    fn req_i64(&self, name: &str) -> BinanceHttpResult<i64> {
        self.get(name).and_then(field_i64).ok_or_else(|| {
            BinanceHttpError::JsonError(format!("missing or invalid integer field `{name}`"))
        })
    }
}
