//! Pair-keyed views over market lists.
//!
//! The flat `Vec<Market>` is the only form adapters produce. Grouping by
//! canonical pair is derived from it on demand.

use std::collections::BTreeMap;

use crate::models::Market;

/// Markets grouped by canonical pair.
pub type MarketsByPair = BTreeMap<String, Vec<Market>>;

/// Group a flat market list by canonical pair, keeping list order per pair.
pub fn group_by_pair(markets: impl IntoIterator<Item = Market>) -> MarketsByPair {
    let mut grouped = MarketsByPair::new();
    for market in markets {
        grouped.entry(market.pair.clone()).or_default().push(market);
    }
    grouped
}

/// Append every entry of `markets` to `result` under the same pair.
///
/// Entries already in `result` come first. Nothing is de-duplicated.
pub fn merge_markets(result: &mut MarketsByPair, markets: MarketsByPair) {
    for (pair, entries) in markets {
        result.entry(pair).or_default().extend(entries);
    }
}
