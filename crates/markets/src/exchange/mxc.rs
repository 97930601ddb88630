//! MXC spot markets.
//!
//! The listing is an object keyed by market id (`BTC_USDT`); entries carry
//! no id of their own.

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

use super::util::{decode, finalize, Numeric};
use super::ExchangeAdapter;

const MARKETS_URL: &str = "https://www.mxc.com/open/api/v1/data/markets_info";
const EXCHANGE: Exchange = Exchange::Mxc;

#[derive(Debug, Deserialize)]
struct MarketsInfoResponse {
    code: i64,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    data: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarketInfo {
    price_scale: i32,
    quantity_scale: i32,
    min_amount: Numeric,
}

pub struct MxcAdapter {
    transport: Arc<dyn HttpTransport>,
}

impl MxcAdapter {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    async fn fetch_spot(&self) -> Result<Vec<Market>, MarketsError> {
        let value = self.transport.get_json(EXCHANGE, MARKETS_URL).await?;
        let response: MarketsInfoResponse = decode(EXCHANGE, value, "markets_info")?;
        if response.code != 200 {
            return Err(MarketsError::upstream(
                EXCHANGE,
                format!("code {} - {}", response.code, response.msg.unwrap_or_default()),
            ));
        }

        let markets = response
            .data
            .into_iter()
            .map(|(id, raw)| to_market(id, raw))
            .collect::<Result<Vec<_>, _>>()?;
        finalize(SymbolTable::shared(EXCHANGE), markets)
    }
}

fn to_market(id: String, raw: Value) -> Result<Market, MarketsError> {
    let entry: MarketInfo = decode(EXCHANGE, raw.clone(), "market info")?;
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
            base: Some(entry.quantity_scale),
            quote: Some(entry.price_scale),
        },
        min_quantity: MinQuantity {
            base: None,
            quote: Some(entry.min_amount.to_f64()?),
        },
        info: raw,
    })
}

#[async_trait]
impl ExchangeAdapter for MxcAdapter {
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
