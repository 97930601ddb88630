//! Registry holding one adapter per supported exchange.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::config::MarketsConfig;
use crate::errors::MarketsError;
use crate::exchange::{
    BikiAdapter, BinanceAdapter, BitMexAdapter, BitfinexAdapter, BitstampAdapter,
    CoinbaseProAdapter, ExchangeAdapter, HuobiAdapter, KrakenAdapter, MxcAdapter, NewdexAdapter,
    OkexAdapter, WhaleExAdapter, ZbAdapter,
};
use crate::merge::{group_by_pair, MarketsByPair};
use crate::models::{Exchange, Market, MarketType};
use crate::transport::{HttpTransport, ReqwestTransport};

/// Adapters for every supported exchange, sharing one transport.
pub struct ExchangeRegistry {
    adapters: HashMap<Exchange, Arc<dyn ExchangeAdapter>>,
}

impl ExchangeRegistry {
    /// Register every built-in adapter on top of `transport`.
    pub fn new(transport: Arc<dyn HttpTransport>, config: &MarketsConfig) -> Self {
        let adapters: Vec<Arc<dyn ExchangeAdapter>> = vec![
            Arc::new(BikiAdapter::new(transport.clone())),
            Arc::new(BinanceAdapter::new(transport.clone())),
            Arc::new(BitfinexAdapter::new(transport.clone())),
            Arc::new(BitMexAdapter::new(transport.clone())),
            Arc::new(BitstampAdapter::new(transport.clone())),
            Arc::new(CoinbaseProAdapter::new(transport.clone())),
            Arc::new(HuobiAdapter::new(transport.clone())),
            Arc::new(KrakenAdapter::new(transport.clone())),
            Arc::new(MxcAdapter::new(transport.clone())),
            Arc::new(NewdexAdapter::new(
                transport.clone(),
                config.eos_endpoints.clone(),
            )),
            Arc::new(OkexAdapter::new(transport.clone())),
            Arc::new(WhaleExAdapter::new(transport.clone())),
            Arc::new(ZbAdapter::new(transport)),
        ];
        Self::with_adapters(adapters)
    }

    /// Registry over a custom adapter set. Later adapters replace earlier
    /// ones for the same exchange.
    pub fn with_adapters(adapters: Vec<Arc<dyn ExchangeAdapter>>) -> Self {
        Self {
            adapters: adapters
                .into_iter()
                .map(|adapter| (adapter.exchange(), adapter))
                .collect(),
        }
    }

    /// Registry using `reqwest` and configuration from the environment.
    pub fn from_env() -> Self {
        let config = MarketsConfig::from_env();
        Self::new(Arc::new(ReqwestTransport::new(&config)), &config)
    }

    pub fn adapter(&self, exchange: Exchange) -> Result<&Arc<dyn ExchangeAdapter>, MarketsError> {
        self.adapters
            .get(&exchange)
            .ok_or_else(|| MarketsError::UnknownExchange(exchange.to_string()))
    }

    /// Markets of `exchange`, for one type or for all of its types.
    pub async fn fetch(
        &self,
        exchange: Exchange,
        market_type: Option<MarketType>,
    ) -> Result<Vec<Market>, MarketsError> {
        debug!(
            "Fetching {} markets of type {}",
            exchange,
            market_type.map_or_else(|| "All".to_string(), |t| t.to_string())
        );
        self.adapter(exchange)?.fetch_markets(market_type).await
    }

    /// Markets by exchange name and optional market type name.
    ///
    /// Both names are matched case-insensitively.
    pub async fn fetch_markets(
        &self,
        exchange: &str,
        market_type: Option<&str>,
    ) -> Result<Vec<Market>, MarketsError> {
        let exchange: Exchange = exchange.parse()?;
        let market_type = market_type.map(str::parse::<MarketType>).transpose()?;
        self.fetch(exchange, market_type).await
    }

    /// Same as [`fetch_markets`](Self::fetch_markets), grouped by pair.
    pub async fn fetch_markets_by_pair(
        &self,
        exchange: &str,
        market_type: Option<&str>,
    ) -> Result<MarketsByPair, MarketsError> {
        Ok(group_by_pair(self.fetch_markets(exchange, market_type).await?))
    }
}

impl Default for ExchangeRegistry {
    fn default() -> Self {
        let config = MarketsConfig::default();
        Self::new(Arc::new(ReqwestTransport::new(&config)), &config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::fake::FakeTransport;

    fn registry() -> (Arc<FakeTransport>, ExchangeRegistry) {
        let transport = Arc::new(FakeTransport::new());
        let registry = ExchangeRegistry::new(transport.clone(), &MarketsConfig::default());
        (transport, registry)
    }

    #[test]
    fn test_every_exchange_registered() {
        let (_, registry) = registry();
        for exchange in Exchange::ALL {
            let adapter = registry.adapter(exchange).unwrap();
            assert_eq!(adapter.exchange(), exchange);
            assert!(!adapter.market_types().is_empty());
        }
    }

    #[tokio::test]
    async fn test_unknown_exchange() {
        let (transport, registry) = registry();
        let err = registry.fetch_markets("Coincheck", None).await.unwrap_err();
        assert!(matches!(err, MarketsError::UnknownExchange(name) if name == "Coincheck"));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_market_type() {
        let (_, registry) = registry();
        let err = registry
            .fetch_markets("Kraken", Some("Perpetual"))
            .await
            .unwrap_err();
        assert!(matches!(err, MarketsError::InvalidMarketType(_)));
    }

    #[tokio::test]
    async fn test_unsupported_market_type() {
        let (transport, registry) = registry();
        let err = registry
            .fetch_markets("kraken", Some("swap"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MarketsError::UnsupportedMarketType {
                exchange: Exchange::Kraken,
                market_type: MarketType::Swap
            }
        ));
        assert_eq!(transport.request_count(), 0);
    }

    #[test]
    fn test_with_adapters_keeps_only_given() {
        let transport: Arc<dyn HttpTransport> = Arc::new(FakeTransport::new());
        let registry =
            ExchangeRegistry::with_adapters(vec![Arc::new(ZbAdapter::new(transport))]);
        assert!(registry.adapter(Exchange::Zb).is_ok());
        assert!(matches!(
            registry.adapter(Exchange::Kraken),
            Err(MarketsError::UnknownExchange(_))
        ));
    }
}
