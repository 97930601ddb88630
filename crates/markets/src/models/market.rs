use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Exchange, MarketType};

/// Maker and taker fee rates, as fractions (0.001 = 0.1%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fees {
    pub maker: f64,
    pub taker: f64,
}

/// Decimal digits after the dot accepted for price and quantities.
///
/// `None` means the exchange does not publish enough to know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Precision {
    pub price: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<i32>,
}

/// Minimum order size, in base and/or quote units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MinQuantity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<f64>,
}

/// One tradable instrument on one exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Market {
    pub exchange: Exchange,
    #[serde(rename = "type")]
    pub market_type: MarketType,
    /// Exchange-native instrument id
    pub id: String,
    /// Canonical `BASE_QUOTE`
    pub pair: String,
    pub base: String,
    pub quote: String,
    pub base_id: String,
    pub quote_id: String,
    pub active: bool,
    pub fees: Fees,
    pub precision: Precision,
    pub min_quantity: MinQuantity,
    /// Raw exchange entry, with live-data fields removed
    pub info: Value,
}
