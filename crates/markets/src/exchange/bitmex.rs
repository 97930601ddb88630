//! BitMEX futures and perpetual swaps.
//!
//! `instrument/active` lists every live instrument, including indices and
//! options. Only instruments typed `FFCCSX` (futures) and `FFWCSX`
//! (perpetuals) are kept.
//!
//! API documentation: https://www.bitmex.com/api/explorer/

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

const INSTRUMENTS_URL: &str = "https://www.bitmex.com/api/v1/instrument/active";
const EXCHANGE: Exchange = Exchange::BitMex;

/// Fields that change with every trade.
const VOLATILE_FIELDS: &[&str] = &[
    "askPrice",
    "bidPrice",
    "fairBasis",
    "fairBasisRate",
    "fairPrice",
    "foreignNotional24h",
    "fundingRate",
    "highPrice",
    "homeNotional24h",
    "impactAskPrice",
    "impactBidPrice",
    "impactMidPrice",
    "indicativeFundingRate",
    "indicativeSettlePrice",
    "lastChangePcnt",
    "lastPrice",
    "lastPriceProtected",
    "lastTickDirection",
    "lowPrice",
    "markPrice",
    "midPrice",
    "openInterest",
    "openValue",
    "prevPrice24h",
    "prevTotalTurnover",
    "prevTotalVolume",
    "timestamp",
    "totalTurnover",
    "totalVolume",
    "turnover",
    "turnover24h",
    "volume",
    "volume24h",
    "vwap",
];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Instrument {
    symbol: String,
    root_symbol: String,
    quote_currency: String,
    state: String,
    tick_size: Numeric,
    lot_size: Numeric,
}

/// Market type from the CFI-like `typ` code. Indices, spot and others are `None`.
fn market_type_of(raw: &Value) -> Option<MarketType> {
    match raw.get("typ").and_then(Value::as_str)? {
        "FFCCSX" => Some(MarketType::Futures),
        "FFWCSX" => Some(MarketType::Swap),
        _ => None,
    }
}

pub struct BitMexAdapter {
    transport: Arc<dyn HttpTransport>,
}

impl BitMexAdapter {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    /// Futures and swaps, sorted by pair.
    async fn fetch_all(&self) -> Result<Vec<Market>, MarketsError> {
        let value = self.transport.get_json(EXCHANGE, INSTRUMENTS_URL).await?;
        let instruments: Vec<Value> = decode(EXCHANGE, value, "instruments")?;

        let mut markets = Vec::new();
        for raw in instruments {
            let Some(market_type) = market_type_of(&raw) else {
                continue;
            };
            let entry: Instrument = decode(EXCHANGE, raw.clone(), "instrument")?;
            markets.push(to_market(entry, market_type, raw)?);
        }
        finalize(SymbolTable::shared(EXCHANGE), markets)
    }
}

fn to_market(entry: Instrument, market_type: MarketType, raw: Value) -> Result<Market, MarketsError> {
    let base = normalize_symbol(&entry.root_symbol, EXCHANGE);
    let quote = normalize_symbol(&entry.quote_currency, EXCHANGE);

    Ok(Market {
        exchange: EXCHANGE,
        market_type,
        id: entry.symbol,
        pair: canonical_pair(&base, &quote),
        base,
        quote,
        base_id: entry.root_symbol,
        quote_id: entry.quote_currency,
        active: entry.state == "Open",
        fees: fees::lookup(EXCHANGE, market_type)?,
        precision: Precision {
            price: entry.tick_size.precision()?,
            base: Some(entry.lot_size.precision()?),
            quote: None,
        },
        min_quantity: MinQuantity {
            base: Some(entry.lot_size.to_f64()?),
            quote: None,
        },
        info: strip_fields(raw, VOLATILE_FIELDS),
    })
}

#[async_trait]
impl ExchangeAdapter for BitMexAdapter {
    fn exchange(&self) -> Exchange {
        EXCHANGE
    }

    fn market_types(&self) -> &'static [MarketType] {
        &[MarketType::Futures, MarketType::Swap]
    }

    async fn fetch_markets_of(&self, market_type: MarketType) -> Result<Vec<Market>, MarketsError> {
        self.ensure_supported(market_type)?;
        let mut markets = self.fetch_all().await?;
        markets.retain(|m| m.market_type == market_type);
        Ok(markets)
    }

    async fn fetch_markets(
        &self,
        market_type: Option<MarketType>,
    ) -> Result<Vec<Market>, MarketsError> {
        if let Some(market_type) = market_type {
            return self.fetch_markets_of(market_type).await;
        }
        let (futures, swaps): (Vec<Market>, Vec<Market>) = self
            .fetch_all()
            .await?
            .into_iter()
            .partition(|m| m.market_type == MarketType::Futures);
        Ok(futures.into_iter().chain(swaps).collect())
    }
}
