use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::MarketsError;

/// Contract type of a market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MarketType {
    Spot,
    Futures,
    Swap,
    Option,
}

impl MarketType {
    /// All market types, in canonical order.
    pub const ALL: [MarketType; 4] = [
        MarketType::Spot,
        MarketType::Futures,
        MarketType::Swap,
        MarketType::Option,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spot => "Spot",
            Self::Futures => "Futures",
            Self::Swap => "Swap",
            Self::Option => "Option",
        }
    }
}

impl fmt::Display for MarketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarketType {
    type Err = MarketsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| MarketsError::InvalidMarketType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("spot".parse::<MarketType>().unwrap(), MarketType::Spot);
        assert_eq!("SWAP".parse::<MarketType>().unwrap(), MarketType::Swap);
        assert_eq!("Option".parse::<MarketType>().unwrap(), MarketType::Option);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "Perpetual".parse::<MarketType>().unwrap_err();
        assert!(matches!(err, MarketsError::InvalidMarketType(s) if s == "Perpetual"));
    }

    #[test]
    fn test_serializes_as_name() {
        assert_eq!(
            serde_json::to_string(&MarketType::Futures).unwrap(),
            "\"Futures\""
        );
    }
}
