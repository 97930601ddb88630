//! Crypto Markets Crate
//!
//! This crate fetches the tradable markets (instruments) listed by
//! cryptocurrency exchanges and normalizes them into one [`Market`] shape.
//!
//! # Overview
//!
//! The markets crate supports:
//! - Thirteen exchanges, from centralized venues to EOS-based DEXs
//! - Spot, futures and perpetual swap markets
//! - Canonical `BASE_QUOTE` pairs that line up across exchanges
//! - Trading fees, precision and minimum order sizes per market
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! | ExchangeRegistry |  (exchange name -> adapter)
//! +------------------+
//!          |
//!          v
//! +------------------+     +------------------+
//! | ExchangeAdapter  | --> |  HttpTransport   |  (REST, EOS RPC)
//! +------------------+     +------------------+
//!          |
//!          v
//! +------------------+
//! |   SymbolTable    |  (symbol aliases, pair cross-check)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! |     Market       |  (normalized record)
//! +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`Market`] - One tradable instrument on one exchange
//! - [`Exchange`] - Supported exchanges
//! - [`MarketType`] - Spot, Futures, Swap or Option
//! - [`ExchangeRegistry`] - Name-based entry point over every adapter
//! - [`MarketsError`] - Error type for every fallible operation
//!
//! # Example
//!
//! ```ignore
//! let markets = crypto_markets::fetch_markets("Binance", Some("Spot")).await?;
//! for market in markets {
//!     println!("{} {}", market.id, market.pair);
//! }
//! ```

pub mod config;
pub mod eos;
pub mod errors;
pub mod exchange;
pub mod fees;
pub mod merge;
pub mod models;
pub mod pair;
pub mod precision;
pub mod registry;
pub mod transport;

// Re-export all public types from models
pub use models::{Exchange, Fees, Market, MarketType, MinQuantity, Precision};

pub use config::MarketsConfig;
pub use errors::MarketsError;
pub use exchange::ExchangeAdapter;
pub use merge::{group_by_pair, merge_markets, MarketsByPair};
pub use pair::{canonical_pair, normalize_pair, normalize_symbol};
pub use precision::calc_precision;
pub use registry::ExchangeRegistry;
pub use transport::{HttpTransport, ReqwestTransport};

/// Fetch the markets of `exchange`, optionally limited to one market type.
///
/// Uses a fresh [`ExchangeRegistry::from_env`]. Callers fetching repeatedly
/// should keep a registry around instead.
pub async fn fetch_markets(
    exchange: &str,
    market_type: Option<&str>,
) -> Result<Vec<Market>, MarketsError> {
    ExchangeRegistry::from_env()
        .fetch_markets(exchange, market_type)
        .await
}
