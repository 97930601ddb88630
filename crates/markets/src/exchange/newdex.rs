//! Newdex spot markets.
//!
//! Newdex keeps its pair registry on the EOS chain, in the `exchangepair`
//! table of the `newdexpublic` contract. Several token contracts can issue
//! the same symbol (`bitpietokens-eeth-eos`, `ethsidechain-eeth-eos`), so one
//! canonical pair can appear more than once; only the listing with the
//! largest 24h volume is kept. Listings absent from the 24h tickers are
//! dormant and dropped.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::eos::{TableQuery, TableRowsClient};
use crate::errors::MarketsError;
use crate::fees;
use crate::models::{Exchange, Market, MarketType, MinQuantity, Precision};
use crate::pair::{canonical_pair, normalize_symbol, SymbolTable};
use crate::transport::HttpTransport;

use super::util::{decode, finalize, strip_fields};
use super::ExchangeAdapter;

const TICKERS_URL: &str = "https://api.newdex.io/v1/tickers";
const EXCHANGE: Exchange = Exchange::Newdex;

const PAIR_TABLE: TableQuery<'static> = TableQuery {
    code: "newdexpublic",
    scope: "newdexpublic",
    table: "exchangepair",
};
const PAIR_KEY: &str = "pair_id";

/// Smallest order value, in EOS.
const MIN_QUOTE_QUANTITY: f64 = 0.01;

#[derive(Debug, Deserialize)]
struct TokenSymbol {
    /// `4,EOS`: decimals, then the token code
    sym: String,
}

impl TokenSymbol {
    fn split(&self) -> Result<(i32, &str), MarketsError> {
        self.sym
            .split_once(',')
            .and_then(|(digits, code)| Some((digits.trim().parse().ok()?, code.trim())))
            .filter(|(_, code)| !code.is_empty())
            .ok_or_else(|| MarketsError::upstream(EXCHANGE, format!("malformed symbol {}", self.sym)))
    }
}

#[derive(Debug, Deserialize)]
struct PairRow {
    pair_symbol: String,
    price_precision: i32,
    status: i64,
    base_symbol: TokenSymbol,
    quote_symbol: TokenSymbol,
}

#[derive(Debug, Deserialize)]
struct TickersResponse {
    code: i64,
    #[serde(default)]
    data: Vec<Ticker>,
}

#[derive(Debug, Deserialize)]
struct Ticker {
    /// Same as the pair's `pair_symbol`
    symbol: String,
    #[serde(default)]
    volume: f64,
}

pub struct NewdexAdapter {
    transport: Arc<dyn HttpTransport>,
    eos: TableRowsClient,
}

impl NewdexAdapter {
    pub fn new(transport: Arc<dyn HttpTransport>, eos_endpoints: Vec<String>) -> Self {
        Self {
            eos: TableRowsClient::new(transport.clone(), eos_endpoints),
            transport,
        }
    }

    /// 24h volume by market id.
    async fn fetch_volumes(&self) -> Result<HashMap<String, f64>, MarketsError> {
        let value = self.transport.get_json(EXCHANGE, TICKERS_URL).await?;
        let response: TickersResponse = decode(EXCHANGE, value, "tickers")?;
        if response.code != 200 {
            return Err(MarketsError::upstream(
                EXCHANGE,
                format!("tickers code {}", response.code),
            ));
        }
        Ok(response
            .data
            .into_iter()
            .map(|ticker| (ticker.symbol, ticker.volume))
            .collect())
    }

    async fn fetch_spot(&self) -> Result<Vec<Market>, MarketsError> {
        let (rows, volumes) = try_join(
            self.eos.get_all_rows(EXCHANGE, PAIR_TABLE, PAIR_KEY),
            self.fetch_volumes(),
        )
        .await?;

        let markets = rows
            .into_iter()
            .map(to_market)
            .collect::<Result<Vec<_>, _>>()?;
        finalize(
            SymbolTable::shared(EXCHANGE),
            keep_most_traded(markets, &volumes),
        )
    }
}

fn to_market(raw: Value) -> Result<Market, MarketsError> {
    let entry: PairRow = decode(EXCHANGE, raw.clone(), "exchangepair row")?;
    let (base_digits, base_id) = entry.base_symbol.split()?;
    let (quote_digits, quote_id) = entry.quote_symbol.split()?;
    let base = normalize_symbol(base_id, EXCHANGE);
    let quote = normalize_symbol(quote_id, EXCHANGE);

    Ok(Market {
        exchange: EXCHANGE,
        market_type: MarketType::Spot,
        id: entry.pair_symbol.clone(),
        pair: canonical_pair(&base, &quote),
        base,
        quote,
        base_id: base_id.to_string(),
        quote_id: quote_id.to_string(),
        active: entry.status == 0,
        fees: fees::lookup(EXCHANGE, MarketType::Spot)?,
        precision: Precision {
            price: entry.price_precision,
            base: Some(base_digits),
            quote: Some(quote_digits),
        },
        min_quantity: MinQuantity {
            base: None,
            quote: Some(MIN_QUOTE_QUANTITY),
        },
        info: strip_fields(raw, &["current_price"]),
    })
}

/// One market per pair: the one with the largest 24h volume.
///
/// Markets without a ticker are dropped. Equal volumes keep the smallest id.
fn keep_most_traded(markets: Vec<Market>, volumes: &HashMap<String, f64>) -> Vec<Market> {
    let volume = |market: &Market| volumes.get(&market.id).copied().unwrap_or(0.0);

    let mut by_pair: BTreeMap<String, Market> = BTreeMap::new();
    for market in markets {
        if !volumes.contains_key(&market.id) {
            debug!("Newdex {}: no ticker, skipped", market.id);
            continue;
        }
        match by_pair.get(&market.pair) {
            Some(kept) => {
                let (challenger, incumbent) = (volume(&market), volume(kept));
                let wins = challenger > incumbent
                    || (challenger == incumbent && market.id < kept.id);
                debug!(
                    "Newdex {}: {} ({}) vs {} ({})",
                    market.pair, market.id, challenger, kept.id, incumbent
                );
                if wins {
                    by_pair.insert(market.pair.clone(), market);
                }
            }
            None => {
                by_pair.insert(market.pair.clone(), market);
            }
        }
    }
    by_pair.into_values().collect()
}

#[async_trait]
impl ExchangeAdapter for NewdexAdapter {
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
