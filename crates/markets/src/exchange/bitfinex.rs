//! Bitfinex spot pairs and USDT perpetual swaps.
//!
//! One listing covers both types: perpetuals are the ids quoted in `ustf0`.
//! Bitfinex also publishes its own currency-code map, which is layered under
//! the built-in aliases before any pair is derived.
//!
//! API documentation: https://docs.bitfinex.com/docs

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::MarketsError;
use crate::fees;
use crate::models::{Exchange, Market, MarketType, MinQuantity, Precision};
use crate::pair::{canonical_pair, SymbolTable};
use crate::transport::HttpTransport;

use super::util::{decode, finalize, Numeric};
use super::ExchangeAdapter;

const SYMBOLS_URL: &str = "https://api.bitfinex.com/v1/symbols_details";
const CURRENCY_MAP_URL: &str = "https://api-pub.bitfinex.com/v2/conf/pub:map:currency:sym";
const EXCHANGE: Exchange = Exchange::Bitfinex;

/// Order sizes are accepted with up to 8 decimals on every pair.
const BASE_PRECISION: i32 = 8;

#[derive(Debug, Deserialize)]
struct SymbolDetails {
    pair: String,
    price_precision: i32,
    minimum_order_size: Numeric,
}

pub struct BitfinexAdapter {
    transport: Arc<dyn HttpTransport>,
}

impl BitfinexAdapter {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    async fn fetch_symbol_table(&self) -> Result<SymbolTable, MarketsError> {
        let value = self.transport.get_json(EXCHANGE, CURRENCY_MAP_URL).await?;
        let maps: Vec<Vec<(String, String)>> = decode(EXCHANGE, value, "currency map")?;
        let published = maps.into_iter().next().unwrap_or_default();
        Ok(SymbolTable::for_exchange(EXCHANGE).with_published_aliases(published))
    }

    /// Every market of every type, sorted by pair.
    async fn fetch_all(&self) -> Result<Vec<Market>, MarketsError> {
        let (value, table) = try_join(
            self.transport.get_json(EXCHANGE, SYMBOLS_URL),
            self.fetch_symbol_table(),
        )
        .await?;
        let symbols: Vec<Value> = decode(EXCHANGE, value, "symbols_details")?;

        let markets = symbols
            .into_iter()
            .map(|raw| to_market(&table, raw))
            .collect::<Result<Vec<_>, _>>()?;
        finalize(&table, markets)
    }
}

fn market_type(id: &str) -> MarketType {
    if id.to_lowercase().ends_with(":ustf0") {
        MarketType::Swap
    } else {
        MarketType::Spot
    }
}

/// Raw base and quote codes of a `symbols_details` pair.
fn split_symbol(id: &str) -> Result<(String, String), MarketsError> {
    let id = id.to_uppercase();
    let (base, quote) = match id.split_once(':') {
        Some((base, quote)) => (
            base.strip_suffix("F0").unwrap_or(base),
            quote.strip_suffix("F0").unwrap_or(quote),
        ),
        None if id.len() > 3 && id.is_char_boundary(id.len() - 3) => id.split_at(id.len() - 3),
        None => return Err(MarketsError::upstream(EXCHANGE, format!("malformed pair {}", id))),
    };
    Ok((base.to_string(), quote.to_string()))
}

fn to_market(table: &SymbolTable, raw: Value) -> Result<Market, MarketsError> {
    let entry: SymbolDetails = decode(EXCHANGE, raw.clone(), "symbol details")?;
    let (base_id, quote_id) = split_symbol(&entry.pair)?;
    let base = table.normalize_symbol(&base_id);
    let quote = table.normalize_symbol(&quote_id);
    let market_type = market_type(&entry.pair);

    Ok(Market {
        exchange: EXCHANGE,
        market_type,
        id: entry.pair,
        pair: canonical_pair(&base, &quote),
        base,
        quote,
        base_id,
        quote_id,
        active: true,
        fees: fees::lookup(EXCHANGE, market_type)?,
        precision: Precision {
            price: entry.price_precision,
            base: Some(BASE_PRECISION),
            quote: None,
        },
        min_quantity: MinQuantity {
            base: Some(entry.minimum_order_size.to_f64()?),
            quote: None,
        },
        info: raw,
    })
}

#[async_trait]
impl ExchangeAdapter for BitfinexAdapter {
    fn exchange(&self) -> Exchange {
        EXCHANGE
    }

    fn market_types(&self) -> &'static [MarketType] {
        &[MarketType::Spot, MarketType::Swap]
    }

    async fn fetch_markets_of(&self, market_type: MarketType) -> Result<Vec<Market>, MarketsError> {
        self.ensure_supported(market_type)?;
        let mut markets = self.fetch_all().await?;
        markets.retain(|m| m.market_type == market_type);
        Ok(markets)
    }

    /// Fetches the shared listing once even when every type is requested.
    async fn fetch_markets(
        &self,
        market_type: Option<MarketType>,
    ) -> Result<Vec<Market>, MarketsError> {
        if let Some(market_type) = market_type {
            return self.fetch_markets_of(market_type).await;
        }
        let (spot, swap): (Vec<Market>, Vec<Market>) = self
            .fetch_all()
            .await?
            .into_iter()
            .partition(|m| m.market_type == MarketType::Spot);
        Ok(spot.into_iter().chain(swap).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::fake::FakeTransport;
    use serde_json::json;

    fn details(pair: &str, min: &str) -> Value {
        json!({
            "pair": pair,
            "price_precision": 5,
            "initial_margin": "30.0",
            "minimum_margin": "15.0",
            "maximum_order_size": "2000.0",
            "minimum_order_size": min,
            "expiration": "NA",
            "margin": true
        })
    }

    fn transport() -> Arc<FakeTransport> {
        Arc::new(
            FakeTransport::new()
                .with_get(
                    SYMBOLS_URL,
                    json!([
                        details("btcusd", "0.0006"),
                        details("btcf0:ustf0", "0.0002"),
                        details("edousd", "6.0"),
                        details("hotusd", "20.0"),
                    ]),
                )
                .with_get(
                    CURRENCY_MAP_URL,
                    json!([[["EDO", "PNT"], ["HOT", "HOLO"], ["MNA", "MANA"]]]),
                ),
        )
    }

    #[test]
    fn test_split_symbol() {
        assert_eq!(
            split_symbol("btcusd").unwrap(),
            ("BTC".to_string(), "USD".to_string())
        );
        assert_eq!(
            split_symbol("ethf0:ustf0").unwrap(),
            ("ETH".to_string(), "UST".to_string())
        );
        assert!(split_symbol("usd").is_err());
    }

    #[tokio::test]
    async fn test_fetch_all_types_once() {
        let transport = transport();
        let bitfinex = BitfinexAdapter::new(transport.clone());
        let markets = bitfinex.fetch_markets(None).await.unwrap();
        assert_eq!(transport.request_count(), 2);

        let summary: Vec<(MarketType, &str)> = markets
            .iter()
            .map(|m| (m.market_type, m.pair.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (MarketType::Spot, "BTC_USD"),
                (MarketType::Spot, "HYDRO_USD"),
                (MarketType::Spot, "PNT_USD"),
                (MarketType::Swap, "BTC_USDT"),
            ]
        );
    }

    #[tokio::test]
    async fn test_swap_fields() {
        let bitfinex = BitfinexAdapter::new(transport());
        let swaps = bitfinex.fetch_markets(Some(MarketType::Swap)).await.unwrap();
        assert_eq!(swaps.len(), 1);

        let swap = &swaps[0];
        assert_eq!(swap.id, "btcf0:ustf0");
        assert_eq!(swap.base_id, "BTC");
        assert_eq!(swap.quote_id, "UST");
        assert_eq!(swap.quote, "USDT");
        assert_eq!(swap.precision.base, Some(8));
        assert_eq!(swap.min_quantity.base, Some(0.0002));
        assert_eq!(swap.fees.taker, 0.002);
    }
}
