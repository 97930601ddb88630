//! Biki spot markets.
//!
//! API documentation: https://github.com/code-biki/open-api

use std::collections::HashSet;
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

const SYMBOLS_URL: &str = "https://openapi.biki.com/open/api/common/symbols";
const EXCHANGE: Exchange = Exchange::Biki;

#[derive(Debug, Deserialize)]
struct SymbolsResponse {
    code: Numeric,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    data: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct SymbolInfo {
    symbol: String,
    base_coin: String,
    count_coin: String,
    price_precision: i32,
    amount_precision: i32,
    limit_volume_min: Numeric,
}

pub struct BikiAdapter {
    transport: Arc<dyn HttpTransport>,
}

impl BikiAdapter {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    async fn fetch_spot(&self) -> Result<Vec<Market>, MarketsError> {
        let value = self.transport.get_json(EXCHANGE, SYMBOLS_URL).await?;
        let response: SymbolsResponse = decode(EXCHANGE, value, "symbols")?;
        if response.code.as_str() != "0" || response.msg != "suc" {
            return Err(MarketsError::upstream(
                EXCHANGE,
                format!("code {} - {}", response.code, response.msg),
            ));
        }

        // The listing repeats some entries verbatim
        let mut seen = HashSet::new();
        let markets = response
            .data
            .into_iter()
            .filter(|raw| seen.insert(raw.to_string()))
            .map(to_market)
            .collect::<Result<Vec<_>, _>>()?;

        finalize(SymbolTable::shared(EXCHANGE), markets)
    }
}

fn to_market(raw: Value) -> Result<Market, MarketsError> {
    let entry: SymbolInfo = decode(EXCHANGE, raw.clone(), "symbol")?;
    let base = normalize_symbol(&entry.base_coin, EXCHANGE);
    let quote = normalize_symbol(&entry.count_coin, EXCHANGE);

    Ok(Market {
        exchange: EXCHANGE,
        market_type: MarketType::Spot,
        id: entry.symbol,
        pair: canonical_pair(&base, &quote),
        base,
        quote,
        base_id: entry.base_coin,
        quote_id: entry.count_coin,
        active: true,
        fees: fees::lookup(EXCHANGE, MarketType::Spot)?,
        precision: Precision {
            price: entry.price_precision,
            base: Some(entry.amount_precision),
            quote: None,
        },
        min_quantity: MinQuantity {
            base: None,
            quote: Some(entry.limit_volume_min.to_f64()?),
        },
        info: raw,
    })
}

#[async_trait]
impl ExchangeAdapter for BikiAdapter {
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
