//! Static fee schedule keyed by exchange and market type.
//!
//! Loads `fees.json` at compile time via `include_str!` and parses it once via
//! `lazy_static`. Rates come from each exchange's published fee page, not
//! from any API response:
//!
//! - Biki: <https://bikiuser.zendesk.com/hc/en-us/articles/360016487751>
//! - Binance: <https://www.binance.com/en/fee/trading>, <https://www.binance.com/en/fee/futureFee>
//! - Bitfinex: <https://www.bitfinex.com/fees>
//! - BitMEX: <https://www.bitmex.com/app/fees>
//! - Bitstamp: <https://www.bitstamp.net/fee-schedule/>
//! - CoinbasePro: <https://pro.coinbase.com/fees>
//! - Huobi: <https://www.huobi.com/en-us/fee/>
//! - Kraken: <https://support.kraken.com/hc/en-us/articles/360000526126>
//! - MXC: <https://www.mxc.com/intro/fees>
//! - Newdex: <https://newdex.zendesk.com/hc/en-us/articles/360015745751-Rate-standard>
//! - OKEx: <https://www.okex.com/pages/products/fees.html>
//! - WhaleEx, ZB: flat 0.1%

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::errors::MarketsError;
use crate::models::{Exchange, Fees, MarketType};

type FeeTable = HashMap<(Exchange, MarketType), Fees>;

lazy_static! {
    static ref FEES: FeeTable = load();
}

fn load() -> FeeTable {
    let json = include_str!("fees.json");
    let raw: HashMap<String, HashMap<String, Fees>> =
        serde_json::from_str(json).expect("fees.json must be valid");

    let mut table = FeeTable::new();
    for (exchange, by_type) in raw {
        let exchange: Exchange = exchange.parse().expect("fees.json: unknown exchange");
        for (market_type, fees) in by_type {
            let market_type: MarketType =
                market_type.parse().expect("fees.json: unknown market type");
            table.insert((exchange, market_type), fees);
        }
    }
    table
}

/// Fee rates for one exchange and market type.
pub fn lookup(exchange: Exchange, market_type: MarketType) -> Result<Fees, MarketsError> {
    FEES.get(&(exchange, market_type))
        .copied()
        .ok_or(MarketsError::UnsupportedMarketType {
            exchange,
            market_type,
        })
}
