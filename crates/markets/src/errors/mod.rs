//! Error types for the crypto markets crate.
//!
//! Every failure aborts the current fetch. Nothing in this crate catches and
//! recovers from a [`MarketsError`]; there is no partial-result mode.

use thiserror::Error;

use crate::models::{Exchange, MarketType};

/// Errors that can occur while fetching and normalizing markets.
#[derive(Error, Debug)]
pub enum MarketsError {
    /// The requested exchange is not in the supported set.
    #[error("Unknown exchange: {0}")]
    UnknownExchange(String),

    /// The market type string is outside {Spot, Futures, Swap, Option}.
    #[error("Invalid market type: {0}")]
    InvalidMarketType(String),

    /// The exchange does not offer the requested market type.
    #[error("Unsupported market type {market_type} for {exchange}")]
    UnsupportedMarketType {
        /// The exchange that was asked
        exchange: Exchange,
        /// The market type it does not offer
        market_type: MarketType,
    },

    /// The exchange answered with an unexpected status, an embedded error
    /// code, or a payload we cannot decode.
    #[error("Upstream error: {exchange} - {message}")]
    UpstreamResponse {
        /// The exchange whose response was rejected
        exchange: Exchange,
        /// What was wrong with it
        message: String,
    },

    /// An adapter produced a pair that disagrees with the canonical pair
    /// derived from the market id. This is an adapter defect.
    #[error("Consistency check failed: {exchange} {id} - expected {expected}, got {actual}")]
    ConsistencyCheckFailed {
        /// Exchange of the offending market
        exchange: Exchange,
        /// Exchange-native market id
        id: String,
        /// Pair derived from the id through the symbol table
        expected: String,
        /// Pair computed by the adapter
        actual: String,
    },

    /// A precision or step field is not a positive finite number.
    #[error("Invalid number: {0}")]
    InvalidNumber(String),

    /// The transport failed before a response was received.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MarketsError {
    /// Shorthand for [`MarketsError::UpstreamResponse`].
    pub fn upstream(exchange: Exchange, message: impl Into<String>) -> Self {
        Self::UpstreamResponse {
            exchange,
            message: message.into(),
        }
    }
}
