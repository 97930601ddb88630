//! Bitstamp spot markets.
//!
//! API documentation: https://www.bitstamp.net/api/

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::MarketsError;
use crate::fees;
use crate::models::{Exchange, Market, MarketType, MinQuantity, Precision};
use crate::pair::{canonical_pair, normalize_symbol, SymbolTable};
use crate::precision::parse_f64;
use crate::transport::HttpTransport;

use super::util::{decode, finalize};
use super::ExchangeAdapter;

const PAIRS_URL: &str = "https://www.bitstamp.net/api/v2/trading-pairs-info/";
const EXCHANGE: Exchange = Exchange::Bitstamp;

#[derive(Debug, Deserialize)]
struct PairInfo {
    /// `BTC/USD`
    name: String,
    /// `btcusd`
    url_symbol: String,
    base_decimals: i32,
    counter_decimals: i32,
    /// `10.0 USD`
    minimum_order: String,
    trading: String,
}

pub struct BitstampAdapter {
    transport: Arc<dyn HttpTransport>,
}

impl BitstampAdapter {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    async fn fetch_spot(&self) -> Result<Vec<Market>, MarketsError> {
        let value = self.transport.get_json(EXCHANGE, PAIRS_URL).await?;
        let pairs: Vec<Value> = decode(EXCHANGE, value, "trading pairs")?;
        let markets = pairs
            .into_iter()
            .map(to_market)
            .collect::<Result<Vec<_>, _>>()?;
        finalize(SymbolTable::shared(EXCHANGE), markets)
    }
}

fn to_market(raw: Value) -> Result<Market, MarketsError> {
    let entry: PairInfo = decode(EXCHANGE, raw.clone(), "trading pair")?;
    let (base_id, quote_id) = entry
        .name
        .split_once('/')
        .ok_or_else(|| MarketsError::upstream(EXCHANGE, format!("malformed name {}", entry.name)))?;
    let base = normalize_symbol(base_id, EXCHANGE);
    let quote = normalize_symbol(quote_id, EXCHANGE);
    let min_quote = entry.minimum_order.split_whitespace().next().unwrap_or_default();

    Ok(Market {
        exchange: EXCHANGE,
        market_type: MarketType::Spot,
        id: entry.url_symbol.clone(),
        pair: canonical_pair(&base, &quote),
        base,
        quote,
        base_id: base_id.to_string(),
        quote_id: quote_id.to_string(),
        active: entry.trading == "Enabled",
        fees: fees::lookup(EXCHANGE, MarketType::Spot)?,
        precision: Precision {
            price: entry.counter_decimals,
            base: Some(entry.base_decimals),
            quote: Some(entry.counter_decimals),
        },
        min_quantity: MinQuantity {
            base: None,
            quote: Some(parse_f64(min_quote)?),
        },
        info: raw,
    })
}

#[async_trait]
impl ExchangeAdapter for BitstampAdapter {
    fn exchange(&self) -> Exchange {
        EXCHANGE
    }

    fn market_types(&self) -> &'static [MarketType] {
        &[MarketType::Spot]
    }

    async fn fetch_markets_of(&self, market_type: MarketType) -> Result<Vec<Market>, MarketsError> {
        self.ensure_supported(market_type)?;
        self.fetch_spot().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::fake::FakeTransport;
    use serde_json::json;

    fn pair(name: &str, url_symbol: &str, trading: &str, minimum_order: &str) -> Value {
        json!({
            "base_decimals": 8,
            "minimum_order": minimum_order,
            "name": name,
            "counter_decimals": 2,
            "trading": trading,
            "url_symbol": url_symbol,
            "description": name
        })
    }

    fn adapter(body: Value) -> BitstampAdapter {
        BitstampAdapter::new(Arc::new(FakeTransport::new().with_get(PAIRS_URL, body)))
    }

    #[tokio::test]
    async fn test_fetch_spot() {
        let markets = adapter(json!([
            pair("USDC/USD", "usdcusd", "Enabled", "10.0 USD"),
            pair("BTC/USD", "btcusd", "Enabled", "10.0 USD"),
            pair("ETH/BTC", "ethbtc", "Disabled", "0.0002 BTC"),
        ]))
        .fetch_markets(None)
        .await
        .unwrap();

        let pairs: Vec<&str> = markets.iter().map(|m| m.pair.as_str()).collect();
        assert_eq!(pairs, vec!["BTC_USD", "ETH_BTC", "USDC_USD"]);

        let eth = &markets[1];
        assert!(!eth.active);
        assert_eq!(eth.min_quantity.quote, Some(0.0002));
        assert_eq!(eth.precision.base, Some(8));
        assert_eq!(eth.precision.quote, Some(2));
    }

    #[tokio::test]
    async fn test_malformed_name() {
        let err = adapter(json!([pair("BTCUSD", "btcusd", "Enabled", "10.0 USD")]))
            .fetch_markets(None)
            .await
            .unwrap_err();
        assert!(matches!(err, MarketsError::UpstreamResponse { .. }));
    }
}
