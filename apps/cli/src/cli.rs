//! Command-line interface definitions.

use clap::Parser;
use crypto_markets::{Exchange, MarketType};

/// Fetch the markets listed by a cryptocurrency exchange as JSON.
#[derive(Parser, Debug)]
#[command(name = "crypto-markets")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Exchange name, e.g. Binance, BitMEX, OKEx (case-insensitive)
    #[arg(value_parser = parse_exchange)]
    pub exchange: Exchange,

    /// Only fetch markets of this type: Spot, Futures, Swap or Option
    #[arg(long, short = 't', value_parser = parse_market_type)]
    pub market_type: Option<MarketType>,

    /// Print markets grouped by canonical pair
    #[arg(long)]
    pub by_pair: bool,
}

fn parse_exchange(s: &str) -> Result<Exchange, String> {
    s.parse::<Exchange>().map_err(|_| {
        let names: Vec<&str> = Exchange::ALL.iter().map(Exchange::name).collect();
        format!("unknown exchange '{}', expected one of: {}", s, names.join(", "))
    })
}

fn parse_market_type(s: &str) -> Result<MarketType, String> {
    s.parse::<MarketType>().map_err(|e| e.to_string())
}
