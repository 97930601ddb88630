//! WhaleEx spot markets.
//!
//! WhaleEx is an EOS-based exchange; the symbol listing also carries live
//! ticker fields, which are dropped from `info`.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::MarketsError;
use crate::fees;
use crate::models::{Exchange, Market, MarketType, MinQuantity, Precision};
use crate::pair::{canonical_pair, normalize_symbol, SymbolTable};
use crate::transport::HttpTransport;

use super::util::{decode, finalize, strip_fields, Numeric};
use super::ExchangeAdapter;

const SYMBOLS_URL: &str = "https://api.whaleex.com/BUSINESS/api/public/symbol";
const EXCHANGE: Exchange = Exchange::WhaleEx;

const VOLATILE_FIELDS: &[&str] = &[
    "baseVolume",
    "high",
    "low",
    "lastPrice",
    "priceChangePercent",
    "quoteVolume",
    "updatedTime",
    "weight",
    "weightChange",
    "weightVolume",
];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SymbolInfo {
    /// `EOSUSDT`
    name: String,
    base_currency: String,
    quote_currency: String,
    base_precision: i32,
    quote_precision: i32,
    enable: bool,
    status: String,
    tick_size: Numeric,
    min_qty: Numeric,
    min_notional: Numeric,
}

pub struct WhaleExAdapter {
    transport: Arc<dyn HttpTransport>,
}

impl WhaleExAdapter {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    async fn fetch_spot(&self) -> Result<Vec<Market>, MarketsError> {
        let value = self.transport.get_json(EXCHANGE, SYMBOLS_URL).await?;
        let symbols: Vec<Value> = decode(EXCHANGE, value, "symbols")?;
        let markets = symbols
            .into_iter()
            .map(to_market)
            .collect::<Result<Vec<_>, _>>()?;
        finalize(SymbolTable::shared(EXCHANGE), markets)
    }
}

fn to_market(raw: Value) -> Result<Market, MarketsError> {
    let entry: SymbolInfo = decode(EXCHANGE, raw.clone(), "symbol")?;
    let base = normalize_symbol(&entry.base_currency, EXCHANGE);
    let quote = normalize_symbol(&entry.quote_currency, EXCHANGE);

    Ok(Market {
        exchange: EXCHANGE,
        market_type: MarketType::Spot,
        id: entry.name,
        pair: canonical_pair(&base, &quote),
        base,
        quote,
        base_id: entry.base_currency,
        quote_id: entry.quote_currency,
        active: entry.enable && entry.status == "ON",
        fees: fees::lookup(EXCHANGE, MarketType::Spot)?,
        precision: Precision {
            price: entry.tick_size.precision()?,
            base: Some(entry.base_precision),
            quote: Some(entry.quote_precision),
        },
        min_quantity: MinQuantity {
            base: Some(entry.min_qty.to_f64()?),
            quote: Some(entry.min_notional.to_f64()?),
        },
        info: strip_fields(raw, VOLATILE_FIELDS),
    })
}

#[async_trait]
impl ExchangeAdapter for WhaleExAdapter {
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

    fn symbol(name: &str, base: &str, quote: &str, status: &str) -> Value {
        json!({
            "name": name,
            "baseCurrency": base,
            "basePrecision": 4,
            "quoteCurrency": quote,
            "quotePrecision": 4,
            "precision": 8,
            "enable": true,
            "status": status,
            "baseContract": "mykeystoken",
            "tickSize": "0.0001",
            "lotSize": "0.0001",
            "minQty": "1",
            "minNotional": "0.1",
            "lastPrice": "0.0021",
            "baseVolume": "1500.0",
            "weight": 3
        })
    }

    #[tokio::test]
    async fn test_fetch_spot() {
        let transport = FakeTransport::new().with_get(
            SYMBOLS_URL,
            json!([
                symbol("KEYEOS", "KEY", "EOS", "ON"),
                symbol("EOSUSDT", "EOS", "USDT", "OFF"),
            ]),
        );
        let markets = WhaleExAdapter::new(Arc::new(transport))
            .fetch_markets(None)
            .await
            .unwrap();

        let eos = &markets[0];
        assert_eq!(eos.pair, "EOS_USDT");
        assert!(!eos.active);

        let key = &markets[1];
        assert_eq!(key.pair, "MYKEY_EOS");
        assert_eq!(key.base_id, "KEY");
        assert!(key.active);
        assert_eq!(key.precision.price, 4);
        assert_eq!(key.min_quantity.quote, Some(0.1));

        let info = key.info.as_object().unwrap();
        assert!(!info.contains_key("lastPrice"));
        assert!(!info.contains_key("weight"));
        assert_eq!(info["baseContract"], "mykeystoken");
    }
}
