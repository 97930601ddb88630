//! OKEx spot, delivery futures and perpetual swap instruments.
//!
//! API documentation: https://www.okex.com/docs/en/

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::MarketsError;
use crate::fees;
use crate::models::{Exchange, Market, MarketType, MinQuantity, Precision};
use crate::pair::{canonical_pair, normalize_symbol, SymbolTable};
use crate::precision::{calc_precision, parse_decimal, parse_f64};
use crate::transport::HttpTransport;

use super::util::{decode, finalize, Numeric};
use super::ExchangeAdapter;

const SPOT_URL: &str = "https://www.okex.com/api/spot/v3/instruments";
const FUTURES_URL: &str = "https://www.okex.com/api/futures/v3/instruments";
const SWAP_URL: &str = "https://www.okex.com/api/swap/v3/instruments";
const EXCHANGE: Exchange = Exchange::Okex;

#[derive(Debug, Deserialize)]
struct Instrument {
    instrument_id: String,
    base_currency: String,
    quote_currency: String,
    tick_size: Numeric,
    /// Spot only
    #[serde(default)]
    size_increment: Option<Numeric>,
    /// Spot only
    #[serde(default)]
    min_size: Option<Numeric>,
    /// Futures only, in contracts
    #[serde(default)]
    trade_increment: Option<Numeric>,
    /// Futures and swaps, base units per contract for USDT-margined contracts
    #[serde(default)]
    contract_val: Option<Numeric>,
}

impl Instrument {
    fn required<'a>(&self, field: &'a Option<Numeric>, name: &str) -> Result<&'a Numeric, MarketsError> {
        field.as_ref().ok_or_else(|| {
            MarketsError::upstream(
                EXCHANGE,
                format!("{} has no {}", self.instrument_id, name),
            )
        })
    }

    /// Base-unit precision and minimum order, where the listing allows it.
    fn base_quantity(&self, market_type: MarketType) -> Result<(Option<i32>, Option<f64>), MarketsError> {
        match market_type {
            MarketType::Spot => {
                let increment = self.required(&self.size_increment, "size_increment")?;
                let min_size = self.required(&self.min_size, "min_size")?;
                Ok((Some(increment.precision()?), Some(min_size.to_f64()?)))
            }
            // USDT-margined futures: one order step is trade_increment contracts
            // of contract_val base units each
            MarketType::Futures if self.quote_currency == "USDT" => {
                let increment = self.required(&self.trade_increment, "trade_increment")?;
                let contract_val = self.required(&self.contract_val, "contract_val")?;
                let step = (parse_decimal(increment.as_str())? * parse_decimal(contract_val.as_str())?)
                    .normalize()
                    .to_string();
                Ok((Some(calc_precision(&step)?), Some(parse_f64(&step)?)))
            }
            // Coin-margined contracts are sized in USD
            _ => Ok((None, None)),
        }
    }
}

pub struct OkexAdapter {
    transport: Arc<dyn HttpTransport>,
}

impl OkexAdapter {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    async fn fetch_instruments(&self, market_type: MarketType) -> Result<Vec<Market>, MarketsError> {
        let url = match market_type {
            MarketType::Spot => SPOT_URL,
            MarketType::Futures => FUTURES_URL,
            _ => SWAP_URL,
        };
        let value = self.transport.get_json(EXCHANGE, url).await?;
        let instruments: Vec<Value> = decode(EXCHANGE, value, "instruments")?;

        let markets = instruments
            .into_iter()
            .map(|raw| to_market(market_type, raw))
            .collect::<Result<Vec<_>, _>>()?;
        finalize(SymbolTable::shared(EXCHANGE), markets)
    }
}

fn to_market(market_type: MarketType, raw: Value) -> Result<Market, MarketsError> {
    let entry: Instrument = decode(EXCHANGE, raw.clone(), "instrument")?;
    let (base_precision, min_base) = entry.base_quantity(market_type)?;
    let base = normalize_symbol(&entry.base_currency, EXCHANGE);
    let quote = normalize_symbol(&entry.quote_currency, EXCHANGE);

    Ok(Market {
        exchange: EXCHANGE,
        market_type,
        pair: canonical_pair(&base, &quote),
        base,
        quote,
        active: true,
        fees: fees::lookup(EXCHANGE, market_type)?,
        precision: Precision {
            price: entry.tick_size.precision()?,
            base: base_precision,
            quote: None,
        },
        min_quantity: MinQuantity {
            base: min_base,
            quote: None,
        },
        id: entry.instrument_id,
        base_id: entry.base_currency,
        quote_id: entry.quote_currency,
        info: raw,
    })
}

#[async_trait]
impl ExchangeAdapter for OkexAdapter {
    fn exchange(&self) -> Exchange {
        EXCHANGE
    }

    fn market_types(&self) -> &'static [MarketType] {
        &[MarketType::Spot, MarketType::Futures, MarketType::Swap]
    }

    async fn fetch_markets_of(&self, market_type: MarketType) -> Result<Vec<Market>, MarketsError> {
        self.ensure_supported(market_type)?;
        self.fetch_instruments(market_type).await
    }
}
