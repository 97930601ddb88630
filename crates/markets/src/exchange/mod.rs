//! Per-exchange adapters.
//!
//! Each adapter fetches one exchange's instrument listing and maps it onto
//! [`Market`]. They share the [`ExchangeAdapter`] contract:
//!
//! - `fetch_markets(Some(t))` for a type the exchange does not offer fails
//!   with [`MarketsError::UnsupportedMarketType`] before any request is made.
//! - `fetch_markets(None)` fetches every supported type concurrently and
//!   concatenates the results in [`ExchangeAdapter::market_types`] order.
//! - Every per-type result is cross-checked against the pair table and
//!   sorted by pair.

mod util;

pub mod biki;
pub mod binance;
pub mod bitfinex;
pub mod bitmex;
pub mod bitstamp;
pub mod coinbase_pro;
pub mod huobi;
pub mod kraken;
pub mod mxc;
pub mod newdex;
pub mod okex;
pub mod whaleex;
pub mod zb;

use async_trait::async_trait;
use futures::future::try_join_all;

use crate::errors::MarketsError;
use crate::models::{Exchange, Market, MarketType};

pub use biki::BikiAdapter;
pub use binance::BinanceAdapter;
pub use bitfinex::BitfinexAdapter;
pub use bitmex::BitMexAdapter;
pub use bitstamp::BitstampAdapter;
pub use coinbase_pro::CoinbaseProAdapter;
pub use huobi::HuobiAdapter;
pub use kraken::KrakenAdapter;
pub use mxc::MxcAdapter;
pub use newdex::NewdexAdapter;
pub use okex::OkexAdapter;
pub use whaleex::WhaleExAdapter;
pub use zb::ZbAdapter;

/// Fetches and normalizes the markets of one exchange.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use crypto_markets::exchange::{ExchangeAdapter, KrakenAdapter};
/// use crypto_markets::transport::ReqwestTransport;
///
/// let kraken = KrakenAdapter::new(Arc::new(ReqwestTransport::default()));
/// let markets = kraken.fetch_markets(None).await?;
/// ```
#[async_trait]
pub trait ExchangeAdapter: Send + Sync {
    fn exchange(&self) -> Exchange;

    /// Market types this exchange offers, in output order.
    fn market_types(&self) -> &'static [MarketType];

    /// Markets of a single supported type, cross-checked and sorted by pair.
    async fn fetch_markets_of(&self, market_type: MarketType) -> Result<Vec<Market>, MarketsError>;

    /// Markets of `market_type`, or of every supported type when `None`.
    async fn fetch_markets(
        &self,
        market_type: Option<MarketType>,
    ) -> Result<Vec<Market>, MarketsError> {
        match market_type {
            Some(market_type) => {
                self.ensure_supported(market_type)?;
                self.fetch_markets_of(market_type).await
            }
            None => {
                let per_type = try_join_all(
                    self.market_types()
                        .iter()
                        .map(|market_type| self.fetch_markets_of(*market_type)),
                )
                .await?;
                Ok(per_type.into_iter().flatten().collect())
            }
        }
    }

    fn ensure_supported(&self, market_type: MarketType) -> Result<(), MarketsError> {
        if self.market_types().contains(&market_type) {
            Ok(())
        } else {
            Err(MarketsError::UnsupportedMarketType {
                exchange: self.exchange(),
                market_type,
            })
        }
    }
}
