//! Huobi spot markets and coin-margined contracts.
//!
//! Spot: https://huobiapi.github.io/docs/spot/v1/en/
//! Contracts: https://huobiapi.github.io/docs/dm/v1/en/,
//! https://huobiapi.github.io/docs/coin_margined_swap/v1/en/

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

const SPOT_URL: &str = "https://api.huobi.pro/v1/common/symbols";
const FUTURES_URL: &str = "https://api.hbdm.com/api/v1/contract_contract_info";
const SWAP_URL: &str = "https://api.hbdm.com/swap-api/v1/swap_contract_info";
const EXCHANGE: Exchange = Exchange::Huobi;

/// Contracts are quoted and sized in USD.
const CONTRACT_QUOTE: &str = "USD";

#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    #[serde(default, rename = "err-msg", alias = "err_msg")]
    err_msg: Option<String>,
    #[serde(default)]
    data: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct SpotSymbol {
    symbol: String,
    #[serde(rename = "base-currency")]
    base_currency: String,
    #[serde(rename = "quote-currency")]
    quote_currency: String,
    #[serde(rename = "price-precision")]
    price_precision: i32,
    #[serde(rename = "amount-precision")]
    amount_precision: i32,
    #[serde(default, rename = "value-precision")]
    value_precision: Option<i32>,
    #[serde(default, rename = "min-order-amt")]
    min_order_amt: Option<Numeric>,
    #[serde(default, rename = "min-order-value")]
    min_order_value: Option<Numeric>,
    state: String,
}

#[derive(Debug, Deserialize)]
struct ContractInfo {
    symbol: String,
    contract_code: String,
    price_tick: Numeric,
    contract_status: i64,
}

pub struct HuobiAdapter {
    transport: Arc<dyn HttpTransport>,
}

impl HuobiAdapter {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    async fn fetch_data(&self, url: &str) -> Result<Vec<Value>, MarketsError> {
        let value = self.transport.get_json(EXCHANGE, url).await?;
        let envelope: Envelope = decode(EXCHANGE, value, "response")?;
        if envelope.status != "ok" {
            return Err(MarketsError::upstream(
                EXCHANGE,
                format!(
                    "status {} - {}",
                    envelope.status,
                    envelope.err_msg.unwrap_or_default()
                ),
            ));
        }
        Ok(envelope.data)
    }

    async fn fetch_spot(&self) -> Result<Vec<Market>, MarketsError> {
        let markets = self
            .fetch_data(SPOT_URL)
            .await?
            .into_iter()
            .map(spot_market)
            .collect::<Result<Vec<_>, _>>()?;
        finalize(SymbolTable::shared(EXCHANGE), markets)
    }

    async fn fetch_contracts(&self, market_type: MarketType) -> Result<Vec<Market>, MarketsError> {
        let url = match market_type {
            MarketType::Futures => FUTURES_URL,
            _ => SWAP_URL,
        };
        let markets = self
            .fetch_data(url)
            .await?
            .into_iter()
            .map(|raw| contract_market(market_type, raw))
            .collect::<Result<Vec<_>, _>>()?;
        finalize(SymbolTable::shared(EXCHANGE), markets)
    }
}

fn spot_market(raw: Value) -> Result<Market, MarketsError> {
    let entry: SpotSymbol = decode(EXCHANGE, raw.clone(), "symbol")?;
    let base = normalize_symbol(&entry.base_currency, EXCHANGE);
    let quote = normalize_symbol(&entry.quote_currency, EXCHANGE);

    Ok(Market {
        exchange: EXCHANGE,
        market_type: MarketType::Spot,
        id: entry.symbol,
        pair: canonical_pair(&base, &quote),
        base,
        quote,
        base_id: entry.base_currency,
        quote_id: entry.quote_currency,
        active: entry.state == "online",
        fees: fees::lookup(EXCHANGE, MarketType::Spot)?,
        precision: Precision {
            price: entry.price_precision,
            base: Some(entry.amount_precision),
            quote: entry.value_precision,
        },
        min_quantity: MinQuantity {
            base: entry.min_order_amt.as_ref().map(Numeric::to_f64).transpose()?,
            quote: entry.min_order_value.as_ref().map(Numeric::to_f64).transpose()?,
        },
        info: raw,
    })
}

/// Minimum order value in USD: one contract, which is 100 USD for BTC and
/// 10 USD for everything else.
fn contract_min_quote(symbol: &str) -> f64 {
    if symbol == "BTC" {
        100.0
    } else {
        10.0
    }
}

fn contract_market(market_type: MarketType, raw: Value) -> Result<Market, MarketsError> {
    let entry: ContractInfo = decode(EXCHANGE, raw.clone(), "contract")?;
    let base = normalize_symbol(&entry.symbol, EXCHANGE);
    let quote = normalize_symbol(CONTRACT_QUOTE, EXCHANGE);

    Ok(Market {
        exchange: EXCHANGE,
        market_type,
        id: entry.contract_code,
        pair: canonical_pair(&base, &quote),
        base,
        quote,
        min_quantity: MinQuantity {
            base: None,
            quote: Some(contract_min_quote(&entry.symbol)),
        },
        base_id: entry.symbol,
        quote_id: CONTRACT_QUOTE.to_string(),
        active: entry.contract_status == 1,
        fees: fees::lookup(EXCHANGE, market_type)?,
        precision: Precision {
            price: entry.price_tick.precision()?,
            base: None,
            quote: None,
        },
        info: raw,
    })
}

#[async_trait]
impl ExchangeAdapter for HuobiAdapter {
    fn exchange(&self) -> Exchange {
        EXCHANGE
    }

    fn market_types(&self) -> &'static [MarketType] {
        &[MarketType::Spot, MarketType::Futures, MarketType::Swap]
    }

    async fn fetch_markets_of(&self, market_type: MarketType) -> Result<Vec<Market>, MarketsError> {
        self.ensure_supported(market_type)?;
        match market_type {
            MarketType::Spot => self.fetch_spot().await,
            _ => self.fetch_contracts(market_type).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::fake::FakeTransport;
    use serde_json::json;

    fn spot(symbol: &str, base: &str, quote: &str) -> Value {
        json!({
            "base-currency": base,
            "quote-currency": quote,
            "price-precision": 6,
            "amount-precision": 2,
            "symbol-partition": "innovation",
            "symbol": symbol,
            "state": "online",
            "value-precision": 8,
            "min-order-amt": 0.01,
            "max-order-amt": 10000000,
            "min-order-value": 1
        })
    }

    fn transport() -> FakeTransport {
        FakeTransport::new()
            .with_get(
                SPOT_URL,
                json!({"status": "ok", "data": [
                    spot("hotusdt", "hot", "usdt"),
                    spot("btcusdt", "btc", "usdt"),
                ]}),
            )
            .with_get(
                FUTURES_URL,
                json!({"status": "ok", "data": [
                    {
                        "symbol": "ETH",
                        "contract_code": "ETH201225",
                        "contract_type": "quarter",
                        "contract_size": 10,
                        "price_tick": 0.001,
                        "delivery_date": "20201225",
                        "create_date": "20200911",
                        "contract_status": 1
                    },
                    {
                        "symbol": "BTC",
                        "contract_code": "BTC201002",
                        "contract_type": "this_week",
                        "contract_size": 100,
                        "price_tick": 0.01,
                        "delivery_date": "20201002",
                        "create_date": "20200918",
                        "contract_status": 5
                    }
                ]}),
            )
            .with_get(
                SWAP_URL,
                json!({"status": "error", "err-msg": "system busy", "data": []}),
            )
    }

    #[tokio::test]
    async fn test_spot_aliases_hot() {
        let markets = HuobiAdapter::new(Arc::new(transport()))
            .fetch_markets(Some(MarketType::Spot))
            .await
            .unwrap();
        let pairs: Vec<&str> = markets.iter().map(|m| m.pair.as_str()).collect();
        assert_eq!(pairs, vec!["BTC_USDT", "HYDRO_USDT"]);

        let hydro = &markets[1];
        assert_eq!(hydro.base_id, "hot");
        assert_eq!(hydro.precision.quote, Some(8));
        assert_eq!(hydro.min_quantity.base, Some(0.01));
        assert_eq!(hydro.min_quantity.quote, Some(1.0));
    }

    #[tokio::test]
    async fn test_futures() {
        let markets = HuobiAdapter::new(Arc::new(transport()))
            .fetch_markets(Some(MarketType::Futures))
            .await
            .unwrap();
        assert_eq!(markets.len(), 2);

        let btc = &markets[0];
        assert_eq!(btc.pair, "BTC_USD");
        assert!(!btc.active);
        assert_eq!(btc.precision.price, 2);
        assert_eq!(btc.precision.base, None);
        assert_eq!(btc.min_quantity.quote, Some(100.0));

        let eth = &markets[1];
        assert!(eth.active);
        assert_eq!(eth.precision.price, 3);
        assert_eq!(eth.min_quantity.quote, Some(10.0));
        assert_eq!(eth.fees.taker, 0.0003);
    }

    #[tokio::test]
    async fn test_error_status_fails_whole_fetch() {
        let huobi = HuobiAdapter::new(Arc::new(transport()));
        let err = huobi.fetch_markets(None).await.unwrap_err();
        match err {
            MarketsError::UpstreamResponse { message, .. } => {
                assert_eq!(message, "status error - system busy")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
