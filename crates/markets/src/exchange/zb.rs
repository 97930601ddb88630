//! ZB spot markets.
//!
//! The listing is an object keyed by lower-case market id (`btc_usdt`).

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::MarketsError;
use crate::fees;
use crate::models::{Exchange, Market, MarketType, MinQuantity, Precision};
use crate::pair::{canonical_pair, normalize_symbol, SymbolTable};
use crate::transport::HttpTransport;

use super::util::{decode, finalize, step_from_digits};
use super::ExchangeAdapter;

const MARKETS_URL: &str = "https://api.zb.plus/data/v1/markets";
const EXCHANGE: Exchange = Exchange::Zb;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarketInfo {
    amount_scale: i32,
    price_scale: i32,
}

pub struct ZbAdapter {
    transport: Arc<dyn HttpTransport>,
}

impl ZbAdapter {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    async fn fetch_spot(&self) -> Result<Vec<Market>, MarketsError> {
        let value = self.transport.get_json(EXCHANGE, MARKETS_URL).await?;
        let listing: BTreeMap<String, Value> = decode(EXCHANGE, value, "markets")?;
        let markets = listing
            .into_iter()
            .map(|(id, raw)| to_market(id, raw))
            .collect::<Result<Vec<_>, _>>()?;
        finalize(SymbolTable::shared(EXCHANGE), markets)
    }
}

fn to_market(id: String, raw: Value) -> Result<Market, MarketsError> {
    let entry: MarketInfo = decode(EXCHANGE, raw.clone(), "market")?;
    let (base_id, quote_id) = id
        .split_once('_')
        .map(|(b, q)| (b.to_string(), q.to_string()))
        .ok_or_else(|| MarketsError::upstream(EXCHANGE, format!("malformed market id {}", id)))?;
    let base = normalize_symbol(&base_id, EXCHANGE);
    let quote = normalize_symbol(&quote_id, EXCHANGE);

    Ok(Market {
        exchange: EXCHANGE,
        market_type: MarketType::Spot,
        id,
        pair: canonical_pair(&base, &quote),
        base,
        quote,
        base_id,
        quote_id,
        active: true,
        fees: fees::lookup(EXCHANGE, MarketType::Spot)?,
        precision: Precision {
            price: entry.price_scale,
            base: Some(entry.amount_scale),
            quote: None,
        },
        min_quantity: MinQuantity {
            base: Some(step_from_digits(entry.amount_scale)?),
            quote: None,
        },
        info: raw,
    })
}

#[async_trait]
impl ExchangeAdapter for ZbAdapter {
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
