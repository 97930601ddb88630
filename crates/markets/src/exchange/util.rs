use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

use crate::errors::MarketsError;
use crate::models::{Exchange, Market};
use crate::pair::SymbolTable;
use crate::precision::{calc_precision, parse_f64};

/// Decode a raw response into the typed view an adapter expects.
pub(crate) fn decode<T: DeserializeOwned>(
    exchange: Exchange,
    value: Value,
    what: &str,
) -> Result<T, MarketsError> {
    serde_json::from_value(value)
        .map_err(|e| MarketsError::upstream(exchange, format!("Failed to parse {}: {}", what, e)))
}

/// Cross-check every market against `table`, then sort by pair.
///
/// The sort is stable so markets sharing a pair keep upstream order.
pub(crate) fn finalize(
    table: &SymbolTable,
    mut markets: Vec<Market>,
) -> Result<Vec<Market>, MarketsError> {
    for market in &markets {
        table.verify(market)?;
    }
    markets.sort_by(|a, b| a.pair.cmp(&b.pair));

    if let Some(first) = markets.first() {
        debug!(
            "{} {}: {} markets",
            first.exchange,
            first.market_type,
            markets.len()
        );
    }
    Ok(markets)
}

/// Remove live-data fields (prices, volumes, timestamps) from a raw entry.
pub(crate) fn strip_fields(mut info: Value, fields: &[&str]) -> Value {
    if let Some(object) = info.as_object_mut() {
        for field in fields {
            object.remove(*field);
        }
    }
    info
}

/// `10^-digits` as a float, correctly rounded.
pub(crate) fn step_from_digits(digits: i32) -> Result<f64, MarketsError> {
    format!("1e{}", -digits)
        .parse()
        .map_err(|_| MarketsError::InvalidNumber(digits.to_string()))
}

/// A decimal that exchanges send either as a JSON string or a JSON number.
///
/// The textual form is kept so precision is computed on what was sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Numeric(String);

impl Numeric {
    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn precision(&self) -> Result<i32, MarketsError> {
        calc_precision(&self.0)
    }

    pub(crate) fn to_f64(&self) -> Result<f64, MarketsError> {
        parse_f64(&self.0)
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Numeric {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(text) => Numeric(text.trim().to_string()),
            Raw::Number(number) => Numeric(number.to_string()),
        })
    }
}
