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

//! Insertion-ordered request parameter sets with canonical serialization.

use std::fmt::Display;

/// An ordered set of request parameters with unique names.
///
/// Insertion order is preserved and overwriting an existing name keeps its
/// original position, so [`Params::serialize`] is a pure function of content.
/// This matters because the HMAC signature is computed over the serialized
/// string and the server recomputes it over the bytes it receives: the signed
/// form and the transmitted form must be identical.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(String, String)>,
}

impl Params {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the set contains no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the value for `name`, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Inserts a parameter, overwriting in place if `name` already exists.
    ///
    /// New names are appended, so first-seen order is preserved across
    /// overwrites.
    pub fn insert(&mut self, name: &str, value: impl Display) -> &mut Self {
        let value = value.to_string();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| k == name) {
            entry.1 = value;
        } else {
            self.entries.push((name.to_string(), value));
        }
        self
    }

    /// Inserts a parameter only when a value is present.
    ///
    /// Absent optional parameters are omitted entirely rather than serialized
    /// as `name=null`.
    pub fn insert_opt(&mut self, name: &str, value: Option<impl Display>) -> &mut Self {
        if let Some(value) = value {
            self.insert(name, value);
        }
        self
    }

    /// Overlays another set's entries onto this one.
    ///
    /// Names already present are overwritten in their existing position; new
    /// names are appended in `other`'s order.
    pub fn merge(&mut self, other: &Self) -> &mut Self {
        for (name, value) in &other.entries {
            self.insert(name, value);
        }
        self
    }

    /// Serializes to the canonical `name=value&name=value` query string.
    ///
    /// Entries are emitted in insertion order with names and values
    /// percent-encoded per RFC 3986. Never fails for UTF-8 input.
    #[must_use]
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        for (i, (name, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                out.push('&');
            }
            out.push_str(&urlencoding::encode(name));
            out.push('=');
            out.push_str(&urlencoding::encode(value));
        }
        out
    }
}

impl<N: Into<String>, V: Display> FromIterator<(N, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (name, value) in iter {
            params.insert(&name.into(), value);
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_serialize_preserves_insertion_order() {
        let mut params = Params::new();
        params.insert("amount", "1.5");
        params.insert("symbol", "BTCUSDT");
        params.insert("timestamp", 1_700_000_000_000_i64);

        assert_eq!(
            params.serialize(),
            "amount=1.5&symbol=BTCUSDT&timestamp=1700000000000"
        );
    }

    #[rstest]
    fn test_serialize_is_deterministic() {
        let mut params = Params::new();
        params.insert("b", 2);
        params.insert("a", 1);

        let first = params.serialize();
        let second = params.serialize();

        assert_eq!(first, second);
        assert_eq!(first, "b=2&a=1");
    }

    #[rstest]
    fn test_insert_overwrites_in_place() {
        let mut params = Params::new();
        params.insert("symbol", "BTCUSDT");
        params.insert("limit", 100);
        params.insert("symbol", "ETHUSDT");

        assert_eq!(params.serialize(), "symbol=ETHUSDT&limit=100");
        assert_eq!(params.get("symbol"), Some("ETHUSDT"));
    }

    #[rstest]
    fn test_insert_opt_omits_absent_values() {
        let mut params = Params::new();
        params.insert("symbol", "BTCUSDT");
        params.insert_opt("limit", None::<u32>);
        params.insert_opt("fromId", Some(42));

        assert_eq!(params.serialize(), "symbol=BTCUSDT&fromId=42");
    }

    #[rstest]
    fn test_merge_keeps_existing_order_for_present_keys() {
        let mut base = Params::new();
        base.insert("symbol", "BTCUSDT");
        base.insert("side", "BUY");

        let mut overlay = Params::new();
        overlay.insert("side", "SELL");
        overlay.insert("quantity", "1");

        base.merge(&overlay);

        assert_eq!(base.serialize(), "symbol=BTCUSDT&side=SELL&quantity=1");
    }

    #[rstest]
    #[case("BTC USDT", "BTC%20USDT")]
    #[case("a&b=c", "a%26b%3Dc")]
    #[case("1.5", "1.5")]
    #[case("ценá", "%D1%86%D0%B5%D0%BD%C3%A1")]
    fn test_serialize_percent_encodes_values(#[case] value: &str, #[case] expected: &str) {
        let mut params = Params::new();
        params.insert("v", value);

        assert_eq!(params.serialize(), format!("v={expected}"));
    }

    #[rstest]
    fn test_booleans_and_numbers_render_as_primitives() {
        let mut params = Params::new();
        params.insert("dryRun", true);
        params.insert("limit", 500_u32);
        params.insert("price", 0.1);

        assert_eq!(params.serialize(), "dryRun=true&limit=500&price=0.1");
    }

    #[rstest]
    fn test_from_iterator() {
        let params: Params = [("symbol", "BTCUSDT"), ("limit", "10")].into_iter().collect();

        assert_eq!(params.serialize(), "symbol=BTCUSDT&limit=10");
    }

    #[rstest]
    fn test_empty_set_serializes_to_empty_string() {
        assert_eq!(Params::new().serialize(), "");
        assert!(Params::new().is_empty());
    }
}
