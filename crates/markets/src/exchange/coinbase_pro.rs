//! Coinbase Pro spot markets.
//!
//! API documentation: https://docs.pro.coinbase.com/#products

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::MarketsError;
use crate::fees;
use crate::models::{Exchange, Market, MarketType, MinQuantity, Precision};
use crate::pair::{canonical_pair, normalize_symbol, SymbolTable};
use crate::transport::HttpTransport;

use super::util::{decode, finalize, Numeric};
use super::ExchangeAdapter;

const PRODUCTS_URL: &str = "https://api.pro.coinbase.com/products";
const EXCHANGE: Exchange = Exchange::CoinbasePro;

#[derive(Debug, Deserialize)]
struct Product {
    id: String,
    base_currency: String,
    quote_currency: String,
    base_min_size: Numeric,
    base_increment: Numeric,
    quote_increment: Numeric,
    min_market_funds: Numeric,
    status: String,
}

pub struct CoinbaseProAdapter {
    transport: Arc<dyn HttpTransport>,
}

impl CoinbaseProAdapter {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    async fn fetch_spot(&self) -> Result<Vec<Market>, MarketsError> {
        let value = self.transport.get_json(EXCHANGE, PRODUCTS_URL).await?;
        let products: Vec<Value> = decode(EXCHANGE, value, "products")?;
        let markets = products
            .into_iter()
            .map(to_market)
            .collect::<Result<Vec<_>, _>>()?;
        finalize(SymbolTable::shared(EXCHANGE), markets)
    }
}

fn to_market(raw: Value) -> Result<Market, MarketsError> {
    let entry: Product = decode(EXCHANGE, raw.clone(), "product")?;
    let base = normalize_symbol(&entry.base_currency, EXCHANGE);
    let quote = normalize_symbol(&entry.quote_currency, EXCHANGE);
    let quote_precision = entry.quote_increment.precision()?;

    Ok(Market {
        exchange: EXCHANGE,
        market_type: MarketType::Spot,
        id: entry.id,
        pair: canonical_pair(&base, &quote),
        base,
        quote,
        base_id: entry.base_currency,
        quote_id: entry.quote_currency,
        active: entry.status == "online",
        fees: fees::lookup(EXCHANGE, MarketType::Spot)?,
        precision: Precision {
            price: quote_precision,
            base: Some(entry.base_increment.precision()?),
            quote: Some(quote_precision),
        },
        min_quantity: MinQuantity {
            base: Some(entry.base_min_size.to_f64()?),
            quote: Some(entry.min_market_funds.to_f64()?),
        },
        info: raw,
    })
}

#[async_trait]
impl ExchangeAdapter for CoinbaseProAdapter {
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

    fn product(id: &str, base: &str, quote: &str, status: &str) -> Value {
        json!({
            "id": id,
            "base_currency": base,
            "quote_currency": quote,
            "base_min_size": "0.00100000",
            "base_max_size": "280.00000000",
            "quote_increment": "0.01000000",
            "base_increment": "0.00000001",
            "display_name": id.replace('-', "/"),
            "min_market_funds": "5",
            "max_market_funds": "1000000",
            "margin_enabled": false,
            "post_only": false,
            "limit_only": false,
            "cancel_only": false,
            "status": status,
            "status_message": ""
        })
    }

    #[tokio::test]
    async fn test_fetch_spot() {
        let transport = FakeTransport::new().with_get(
            PRODUCTS_URL,
            json!([
                product("ETH-USD", "ETH", "USD", "online"),
                product("BTC-USD", "BTC", "USD", "online"),
                product("BAT-USDC", "BAT", "USDC", "delisted"),
            ]),
        );
        let markets = CoinbaseProAdapter::new(Arc::new(transport))
            .fetch_markets(Some(MarketType::Spot))
            .await
            .unwrap();

        let ids: Vec<&str> = markets.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["BAT-USDC", "BTC-USD", "ETH-USD"]);
        assert!(!markets[0].active);

        let btc = &markets[1];
        assert_eq!(btc.precision.price, 2);
        assert_eq!(btc.precision.base, Some(8));
        assert_eq!(btc.precision.quote, Some(2));
        assert_eq!(btc.min_quantity.base, Some(0.001));
        assert_eq!(btc.min_quantity.quote, Some(5.0));
    }

    #[tokio::test]
    async fn test_http_error_propagates() {
        let err = CoinbaseProAdapter::new(Arc::new(FakeTransport::new()))
            .fetch_markets(None)
            .await
            .unwrap_err();
        assert!(matches!(err, MarketsError::UpstreamResponse { .. }));
    }
}
