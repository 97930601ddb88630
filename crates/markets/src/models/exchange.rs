use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::MarketsError;

/// Exchanges with a market adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Exchange {
    Biki,
    Binance,
    Bitfinex,
    #[serde(rename = "BitMEX")]
    BitMex,
    Bitstamp,
    CoinbasePro,
    Huobi,
    Kraken,
    #[serde(rename = "MXC")]
    Mxc,
    Newdex,
    #[serde(rename = "OKEx")]
    Okex,
    WhaleEx,
    #[serde(rename = "ZB")]
    Zb,
}

impl Exchange {
    /// Every supported exchange, sorted by display name.
    pub const ALL: [Exchange; 13] = [
        Exchange::Biki,
        Exchange::Binance,
        Exchange::Bitfinex,
        Exchange::BitMex,
        Exchange::Bitstamp,
        Exchange::CoinbasePro,
        Exchange::Huobi,
        Exchange::Kraken,
        Exchange::Mxc,
        Exchange::Newdex,
        Exchange::Okex,
        Exchange::WhaleEx,
        Exchange::Zb,
    ];

    /// Display name, as the exchange spells itself.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Biki => "Biki",
            Self::Binance => "Binance",
            Self::Bitfinex => "Bitfinex",
            Self::BitMex => "BitMEX",
            Self::Bitstamp => "Bitstamp",
            Self::CoinbasePro => "CoinbasePro",
            Self::Huobi => "Huobi",
            Self::Kraken => "Kraken",
            Self::Mxc => "MXC",
            Self::Newdex => "Newdex",
            Self::Okex => "OKEx",
            Self::WhaleEx => "WhaleEx",
            Self::Zb => "ZB",
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Exchange {
    type Err = MarketsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|e| e.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| MarketsError::UnknownExchange(s.to_string()))
    }
}
