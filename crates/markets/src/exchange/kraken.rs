//! Kraken spot markets.
//!
//! API documentation: https://www.kraken.com/features/api#get-tradable-pairs

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::errors::MarketsError;
use crate::fees;
use crate::models::{Exchange, Market, MarketType, MinQuantity, Precision};
use crate::pair::{canonical_pair, SymbolTable};
use crate::transport::HttpTransport;

use super::util::{decode, finalize};
use super::ExchangeAdapter;

const ASSET_PAIRS_URL: &str = "https://api.kraken.com/0/public/AssetPairs";
const EXCHANGE: Exchange = Exchange::Kraken;

/// Published minimum order sizes, keyed by canonical base currency.
///
/// See https://support.kraken.com/hc/en-us/articles/205893708-Minimum-order-size-volume-
const MIN_BASE_QUANTITY: &[(&str, f64)] = &[
    ("ADA", 1.0),
    ("ATOM", 1.0),
    ("BAT", 50.0),
    ("BCH", 0.000002),
    ("BTC", 0.002),
    ("DAI", 10.0),
    ("DASH", 0.03),
    ("DOGE", 3000.0),
    ("EOS", 3.0),
    ("ETC", 0.3),
    ("ETH", 0.02),
    ("GNO", 0.03),
    ("ICX", 50.0),
    ("LINK", 10.0),
    ("LSK", 10.0),
    ("LTC", 0.1),
    ("MLN", 0.1),
    ("NANO", 10.0),
    ("OMG", 10.0),
    ("PAXG", 0.01),
    ("QTUM", 0.1),
    ("REP", 0.3),
    ("SC", 5000.0),
    ("USDC", 5.0),
    ("USDT", 5.0),
    ("WAVES", 10.0),
    ("XLM", 30.0),
    ("XMR", 0.1),
    ("XRP", 30.0),
    ("XTZ", 1.0),
    ("ZEC", 0.03),
];

#[derive(Debug, Deserialize)]
struct AssetPairsResponse {
    #[serde(default)]
    error: Vec<String>,
    #[serde(default)]
    result: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct AssetPair {
    #[serde(default)]
    wsname: Option<String>,
    base: String,
    quote: String,
    pair_decimals: i32,
    lot_decimals: i32,
}

fn min_base_quantity(base: &str) -> Option<f64> {
    MIN_BASE_QUANTITY
        .iter()
        .find(|(code, _)| *code == base)
        .map(|(_, min)| *min)
}

pub struct KrakenAdapter {
    transport: Arc<dyn HttpTransport>,
}

impl KrakenAdapter {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    async fn fetch_spot(&self) -> Result<Vec<Market>, MarketsError> {
        let value = self.transport.get_json(EXCHANGE, ASSET_PAIRS_URL).await?;
        let response: AssetPairsResponse = decode(EXCHANGE, value, "asset pairs")?;
        if !response.error.is_empty() {
            return Err(MarketsError::upstream(EXCHANGE, response.error.join(", ")));
        }

        let table = SymbolTable::shared(EXCHANGE);
        let mut markets = Vec::new();
        for (id, raw) in response.result {
            let entry: AssetPair = decode(EXCHANGE, raw.clone(), "asset pair")?;
            match entry.wsname.clone() {
                Some(wsname) => markets.push(to_market(table, id, &wsname, entry, raw)?),
                None => warn!("Kraken {}: no wsname, skipped", id),
            }
        }
        finalize(table, markets)
    }
}

fn to_market(
    table: &SymbolTable,
    id: String,
    wsname: &str,
    entry: AssetPair,
    raw: Value,
) -> Result<Market, MarketsError> {
    let base = table.normalize_symbol(&entry.base);
    let quote = table.normalize_symbol(&entry.quote);
    let pair = canonical_pair(&base, &quote);

    // The websocket name spells the same pair with short codes: XBT/USD
    let ws_pair = wsname
        .split_once('/')
        .map(|(b, q)| canonical_pair(&table.normalize_symbol(b), &table.normalize_symbol(q)))
        .unwrap_or_default();
    if ws_pair != pair {
        return Err(MarketsError::ConsistencyCheckFailed {
            exchange: EXCHANGE,
            id,
            expected: ws_pair,
            actual: pair,
        });
    }

    Ok(Market {
        exchange: EXCHANGE,
        market_type: MarketType::Spot,
        id,
        pair,
        min_quantity: MinQuantity {
            base: min_base_quantity(&base),
            quote: None,
        },
        base,
        quote,
        base_id: entry.base,
        quote_id: entry.quote,
        active: true,
        fees: fees::lookup(EXCHANGE, MarketType::Spot)?,
        precision: Precision {
            price: entry.pair_decimals,
            base: Some(entry.lot_decimals),
            quote: Some(entry.pair_decimals),
        },
        info: raw,
    })
}

#[async_trait]
impl ExchangeAdapter for KrakenAdapter {
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
