//! Binance spot, delivery futures and perpetual swap markets.
//!
//! Spot comes from the `api` host. Contracts come from two hosts: `fapi`
//! (USDT-margined) and `dapi` (coin-margined). Both list perpetual and
//! delivery contracts, told apart by `contractType`.
//!
//! API documentation: https://binance-docs.github.io/apidocs/

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::errors::MarketsError;
use crate::fees;
use crate::models::{Exchange, Market, MarketType, MinQuantity, Precision};
use crate::pair::{canonical_pair, normalize_symbol, SymbolTable};
use crate::transport::HttpTransport;

use super::util::{decode, finalize, Numeric};
use super::ExchangeAdapter;

const SPOT_URL: &str = "https://api.binance.com/api/v3/exchangeInfo";
const USDT_FUTURES_URL: &str = "https://fapi.binance.com/fapi/v1/exchangeInfo";
const COIN_FUTURES_URL: &str = "https://dapi.binance.com/dapi/v1/exchangeInfo";
const EXCHANGE: Exchange = Exchange::Binance;

#[derive(Debug, Deserialize)]
struct ExchangeInfo {
    symbols: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "filterType")]
enum Filter {
    #[serde(rename = "PRICE_FILTER", rename_all = "camelCase")]
    Price { tick_size: Numeric },
    #[serde(rename = "LOT_SIZE", rename_all = "camelCase")]
    LotSize { step_size: Numeric, min_qty: Numeric },
    /// Spot sends `minNotional`, USDT-margined contracts `notional`
    #[serde(rename = "MIN_NOTIONAL", rename_all = "camelCase")]
    MinNotional {
        #[serde(alias = "notional")]
        min_notional: Numeric,
    },
    #[serde(rename = "NOTIONAL", rename_all = "camelCase")]
    Notional { min_notional: Numeric },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpotSymbol {
    symbol: String,
    status: String,
    base_asset: String,
    quote_asset: String,
    #[serde(default)]
    filters: Vec<Filter>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContractSymbol {
    symbol: String,
    /// USDT-margined listings call it `status`, coin-margined `contractStatus`
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    contract_status: Option<String>,
    /// Absent on older USDT-margined listings, which only had perpetuals
    #[serde(default)]
    contract_type: Option<String>,
    base_asset: String,
    quote_asset: String,
    price_precision: i32,
    quantity_precision: i32,
    #[serde(default)]
    filters: Vec<Filter>,
}

fn contract_market_type(contract_type: Option<&str>) -> MarketType {
    match contract_type {
        None | Some("PERPETUAL") => MarketType::Swap,
        Some(_) => MarketType::Futures,
    }
}

/// Symbol table that also knows every asset named in `symbols`.
fn listed_table(symbols: &[Value]) -> SymbolTable {
    let assets = symbols.iter().flat_map(|raw| {
        ["baseAsset", "quoteAsset"]
            .into_iter()
            .filter_map(move |key| raw.get(key).and_then(Value::as_str))
            .map(str::to_string)
    });
    SymbolTable::for_exchange(EXCHANGE).with_listed_assets(assets)
}

impl ContractSymbol {
    fn market_type(&self) -> MarketType {
        contract_market_type(self.contract_type.as_deref())
    }

    fn is_trading(&self) -> bool {
        self.contract_status.as_ref().or(self.status.as_ref()).map(String::as_str) == Some("TRADING")
    }
}

/// The filters a market needs, pulled out of the `filters` list.
struct Filters<'a> {
    tick_size: &'a Numeric,
    step_size: &'a Numeric,
    min_qty: &'a Numeric,
    min_notional: Option<&'a Numeric>,
}

impl<'a> Filters<'a> {
    fn extract(symbol: &str, filters: &'a [Filter]) -> Result<Self, MarketsError> {
        let mut tick_size = None;
        let mut lot = None;
        let mut min_notional = None;
        for filter in filters {
            match filter {
                Filter::Price { tick_size: tick } => tick_size = Some(tick),
                Filter::LotSize { step_size, min_qty } => lot = Some((step_size, min_qty)),
                Filter::MinNotional { min_notional: n } | Filter::Notional { min_notional: n } => {
                    min_notional = min_notional.or(Some(n))
                }
                Filter::Other => {}
            }
        }

        let missing = |name: &str| {
            MarketsError::upstream(EXCHANGE, format!("{} has no {} filter", symbol, name))
        };
        let tick_size = tick_size.ok_or_else(|| missing("PRICE_FILTER"))?;
        let (step_size, min_qty) = lot.ok_or_else(|| missing("LOT_SIZE"))?;
        Ok(Self {
            tick_size,
            step_size,
            min_qty,
            min_notional,
        })
    }
}

pub struct BinanceAdapter {
    transport: Arc<dyn HttpTransport>,
}

impl BinanceAdapter {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    async fn fetch_symbols(&self, url: &str) -> Result<Vec<Value>, MarketsError> {
        let value = self.transport.get_json(EXCHANGE, url).await?;
        let info: ExchangeInfo = decode(EXCHANGE, value, "exchangeInfo")?;
        Ok(info.symbols)
    }

    async fn fetch_spot(&self) -> Result<Vec<Market>, MarketsError> {
        let symbols = self.fetch_symbols(SPOT_URL).await?;
        let table = listed_table(&symbols);

        let mut markets = Vec::new();
        for raw in symbols {
            let spot_allowed = raw
                .get("isSpotTradingAllowed")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            if !spot_allowed {
                continue;
            }
            let entry: SpotSymbol = decode(EXCHANGE, raw.clone(), "spot symbol")?;
            markets.push(spot_market(entry, raw)?);
        }
        finalize(&table, markets)
    }

    /// Contracts of `market_type` from both the USDT- and coin-margined hosts.
    async fn fetch_contracts(&self, market_type: MarketType) -> Result<Vec<Market>, MarketsError> {
        let (usdt, coin) = try_join(
            self.fetch_symbols(USDT_FUTURES_URL),
            self.fetch_symbols(COIN_FUTURES_URL),
        )
        .await?;

        let symbols: Vec<Value> = usdt.into_iter().chain(coin).collect();
        let table = listed_table(&symbols);

        let mut markets = Vec::new();
        for raw in symbols {
            let contract_type = raw.get("contractType").and_then(Value::as_str);
            if contract_market_type(contract_type) != market_type {
                continue;
            }
            let entry: ContractSymbol = decode(EXCHANGE, raw.clone(), "contract symbol")?;
            markets.push(contract_market(entry, raw)?);
        }
        finalize(&table, markets)
    }
}

fn spot_market(entry: SpotSymbol, raw: Value) -> Result<Market, MarketsError> {
    let filters = Filters::extract(&entry.symbol, &entry.filters)?;
    let base = normalize_symbol(&entry.base_asset, EXCHANGE);
    let quote = normalize_symbol(&entry.quote_asset, EXCHANGE);

    Ok(Market {
        exchange: EXCHANGE,
        market_type: MarketType::Spot,
        pair: canonical_pair(&base, &quote),
        base,
        quote,
        active: entry.status == "TRADING",
        fees: fees::lookup(EXCHANGE, MarketType::Spot)?,
        precision: Precision {
            price: filters.tick_size.precision()?,
            base: Some(filters.step_size.precision()?),
            quote: None,
        },
        min_quantity: MinQuantity {
            base: Some(filters.min_qty.to_f64()?),
            quote: filters.min_notional.map(Numeric::to_f64).transpose()?,
        },
        id: entry.symbol,
        base_id: entry.base_asset,
        quote_id: entry.quote_asset,
        info: raw,
    })
}

fn contract_market(entry: ContractSymbol, raw: Value) -> Result<Market, MarketsError> {
    let filters = Filters::extract(&entry.symbol, &entry.filters)?;
    let tick_precision = filters.tick_size.precision()?;
    let step_precision = filters.step_size.precision()?;
    if tick_precision != entry.price_precision || step_precision != entry.quantity_precision {
        warn!(
            "Binance {}: pricePrecision/quantityPrecision {}/{} disagree with filters {}/{}",
            entry.symbol,
            entry.price_precision,
            entry.quantity_precision,
            tick_precision,
            step_precision
        );
    }

    let market_type = entry.market_type();
    let base = normalize_symbol(&entry.base_asset, EXCHANGE);
    let quote = normalize_symbol(&entry.quote_asset, EXCHANGE);

    Ok(Market {
        exchange: EXCHANGE,
        market_type,
        pair: canonical_pair(&base, &quote),
        base,
        quote,
        active: entry.is_trading(),
        fees: fees::lookup(EXCHANGE, market_type)?,
        precision: Precision {
            price: entry.price_precision,
            base: Some(entry.quantity_precision),
            quote: None,
        },
        min_quantity: MinQuantity {
            base: Some(filters.min_qty.to_f64()?),
            quote: None,
        },
        id: entry.symbol,
        base_id: entry.base_asset,
        quote_id: entry.quote_asset,
        info: raw,
    })
}

#[async_trait]
impl ExchangeAdapter for BinanceAdapter {
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

    fn spot_symbol(symbol: &str, base: &str, quote: &str, spot: bool) -> Value {
        json!({
            "symbol": symbol,
            "status": "TRADING",
            "baseAsset": base,
            "quoteAsset": quote,
            "isSpotTradingAllowed": spot,
            "filters": [
                {"filterType": "PRICE_FILTER", "minPrice": "0.01000000", "tickSize": "0.01000000"},
                {"filterType": "PERCENT_PRICE", "multiplierUp": "5"},
                {"filterType": "LOT_SIZE", "minQty": "0.00001000", "stepSize": "0.00001000"},
                {"filterType": "MIN_NOTIONAL", "minNotional": "10.00000000"}
            ]
        })
    }

    fn contract(symbol: &str, base: &str, quote: &str, contract_type: &str) -> Value {
        json!({
            "symbol": symbol,
            "contractStatus": "TRADING",
            "contractType": contract_type,
            "baseAsset": base,
            "quoteAsset": quote,
            "pricePrecision": 1,
            "quantityPrecision": 0,
            "filters": [
                {"filterType": "PRICE_FILTER", "tickSize": "0.1"},
                {"filterType": "LOT_SIZE", "stepSize": "1", "minQty": "1"}
            ]
        })
    }

    fn transport() -> FakeTransport {
        FakeTransport::new()
            .with_get(
                SPOT_URL,
                json!({"symbols": [
                    spot_symbol("ETHBTC", "ETH", "BTC", true),
                    spot_symbol("BTCUSDT", "BTC", "USDT", true),
                    spot_symbol("LEVERAGEDUSDT", "LEVERAGED", "USDT", false),
                ]}),
            )
            .with_get(
                USDT_FUTURES_URL,
                json!({"symbols": [
                    {
                        "symbol": "BTCUSDT",
                        "status": "TRADING",
                        "baseAsset": "BTC",
                        "quoteAsset": "USDT",
                        "pricePrecision": 2,
                        "quantityPrecision": 3,
                        "filters": [
                            {"filterType": "PRICE_FILTER", "minPrice": "556.80", "maxPrice": "4529764", "tickSize": "0.10"},
                            {"filterType": "LOT_SIZE", "stepSize": "0.001", "maxQty": "1000", "minQty": "0.001"},
                            {"filterType": "MARKET_LOT_SIZE", "stepSize": "0.001", "maxQty": "120", "minQty": "0.001"},
                            {"filterType": "MAX_NUM_ORDERS", "limit": 200},
                            {"filterType": "MIN_NOTIONAL", "notional": "100"},
                            {"filterType": "PERCENT_PRICE", "multiplierUp": "1.0500", "multiplierDown": "0.9500", "multiplierDecimal": "4"}
                        ]
                    },
                    {
                        "symbol": "ETHUSDT_240628",
                        "status": "TRADING",
                        "contractType": "CURRENT_QUARTER",
                        "baseAsset": "ETH",
                        "quoteAsset": "USDT",
                        "pricePrecision": 2,
                        "quantityPrecision": 3,
                        "filters": [
                            {"filterType": "PRICE_FILTER", "tickSize": "0.01"},
                            {"filterType": "LOT_SIZE", "stepSize": "0.001", "minQty": "0.001"},
                            {"filterType": "MIN_NOTIONAL", "notional": "5"}
                        ]
                    }
                ]}),
            )
            .with_get(
                COIN_FUTURES_URL,
                json!({"symbols": [
                    contract("BTCUSD_PERP", "BTC", "USD", "PERPETUAL"),
                    contract("BTCUSD_210625", "BTC", "USD", "CURRENT_QUARTER"),
                    contract("ETHUSD_210625", "ETH", "USD", "CURRENT_QUARTER"),
                ]}),
            )
    }

    #[tokio::test]
    async fn test_fetch_spot() {
        let binance = BinanceAdapter::new(Arc::new(transport()));
        let markets = binance.fetch_markets(Some(MarketType::Spot)).await.unwrap();

        let ids: Vec<&str> = markets.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["BTCUSDT", "ETHBTC"]);

        let btc = &markets[0];
        assert_eq!(btc.pair, "BTC_USDT");
        assert!(btc.active);
        assert_eq!(btc.precision.price, 2);
        assert_eq!(btc.precision.base, Some(5));
        assert_eq!(btc.min_quantity.base, Some(0.00001));
        assert_eq!(btc.min_quantity.quote, Some(10.0));
    }

    #[tokio::test]
    async fn test_contracts_split_by_contract_type() {
        let binance = BinanceAdapter::new(Arc::new(transport()));

        let swaps = binance.fetch_markets(Some(MarketType::Swap)).await.unwrap();
        let ids: Vec<&str> = swaps.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["BTCUSD_PERP", "BTCUSDT"]);
        assert!(swaps.iter().all(|m| m.market_type == MarketType::Swap));
        assert_eq!(swaps[0].fees.maker, 0.0002);

        let futures = binance.fetch_markets(Some(MarketType::Futures)).await.unwrap();
        let pairs: Vec<&str> = futures.iter().map(|m| m.pair.as_str()).collect();
        assert_eq!(pairs, vec!["BTC_USD", "ETH_USD", "ETH_USDT"]);
        assert_eq!(futures[0].precision.price, 1);
        assert_eq!(futures[0].precision.base, Some(0));
        assert_eq!(futures[0].min_quantity.base, Some(1.0));
    }

    #[tokio::test]
    async fn test_fetch_all_types_in_order() {
        let binance = BinanceAdapter::new(Arc::new(transport()));
        let markets = binance.fetch_markets(None).await.unwrap();
        let types: Vec<MarketType> = markets.iter().map(|m| m.market_type).collect();
        assert_eq!(
            types,
            vec![
                MarketType::Spot,
                MarketType::Spot,
                MarketType::Futures,
                MarketType::Futures,
                MarketType::Futures,
                MarketType::Swap,
                MarketType::Swap,
            ]
        );
    }

    #[tokio::test]
    async fn test_usdt_contract_with_notional_filter() {
        let binance = BinanceAdapter::new(Arc::new(transport()));
        let swaps = binance.fetch_markets(Some(MarketType::Swap)).await.unwrap();
        let btc = swaps.iter().find(|m| m.id == "BTCUSDT").unwrap();
        assert_eq!(btc.pair, "BTC_USDT");
        assert!(btc.active);
        assert_eq!(btc.precision.price, 2);
        assert_eq!(btc.precision.base, Some(3));
        assert_eq!(btc.min_quantity.base, Some(0.001));
    }

    #[tokio::test]
    async fn test_spot_snapshot_with_overlapping_quotes() {
        let transport = FakeTransport::new().with_get(
            SPOT_URL,
            json!({"symbols": [
                spot_symbol("BTCEURI", "BTC", "EURI", true),
                spot_symbol("ETHEURI", "ETH", "EURI", true),
                spot_symbol("BTCAEUR", "BTC", "AEUR", true),
                spot_symbol("ADAEUR", "ADA", "EUR", true),
                spot_symbol("BTCFDUSD", "BTC", "FDUSD", true),
                spot_symbol("ETHTUSD", "ETH", "TUSD", true),
                spot_symbol("BNBBTC", "BNB", "BTC", true),
                spot_symbol("DOGETRY", "DOGE", "TRY", true),
                spot_symbol("BTCUSDT", "BTC", "USDT", true),
            ]}),
        );
        let markets = BinanceAdapter::new(Arc::new(transport))
            .fetch_markets(Some(MarketType::Spot))
            .await
            .unwrap();

        let pairs: Vec<&str> = markets.iter().map(|m| m.pair.as_str()).collect();
        assert_eq!(
            pairs,
            vec![
                "ADA_EUR",
                "BNB_BTC",
                "BTC_AEUR",
                "BTC_EURI",
                "BTC_FDUSD",
                "BTC_USDT",
                "DOGE_TRY",
                "ETH_EURI",
                "ETH_TUSD",
            ]
        );
    }

    #[tokio::test]
    async fn test_ignored_rows_are_not_decoded() {
        let transport = FakeTransport::new()
            .with_get(
                SPOT_URL,
                json!({"symbols": [
                    {"symbol": "BTCUSDT", "status": "BREAK", "baseAsset": "BTC", "isSpotTradingAllowed": false},
                    spot_symbol("ETHBTC", "ETH", "BTC", true),
                ]}),
            )
            .with_get(
                USDT_FUTURES_URL,
                json!({"symbols": [
                    {"symbol": "BTCUSDT_240329", "contractType": "CURRENT_QUARTER", "quoteAsset": null}
                ]}),
            )
            .with_get(
                COIN_FUTURES_URL,
                json!({"symbols": [contract("BTCUSD_PERP", "BTC", "USD", "PERPETUAL")]}),
            );
        let binance = BinanceAdapter::new(Arc::new(transport));

        let spot = binance.fetch_markets(Some(MarketType::Spot)).await.unwrap();
        assert_eq!(spot.len(), 1);
        assert_eq!(spot[0].id, "ETHBTC");

        let swaps = binance.fetch_markets(Some(MarketType::Swap)).await.unwrap();
        assert_eq!(swaps.len(), 1);
        assert_eq!(swaps[0].id, "BTCUSD_PERP");
    }

    #[tokio::test]
    async fn test_missing_filter_is_upstream_error() {
        let transport = FakeTransport::new().with_get(
            SPOT_URL,
            json!({"symbols": [{
                "symbol": "BTCUSDT",
                "status": "TRADING",
                "baseAsset": "BTC",
                "quoteAsset": "USDT",
                "isSpotTradingAllowed": true,
                "filters": []
            }]}),
        );
        let err = BinanceAdapter::new(Arc::new(transport))
            .fetch_markets(Some(MarketType::Spot))
            .await
            .unwrap_err();
        assert!(matches!(err, MarketsError::UpstreamResponse { .. }));
    }
}
