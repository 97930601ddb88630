//! Currency and pair canonicalization.
//!
//! Exchanges name the same asset differently (`XBT`, `XXBT`, `btc`) and
//! encode pairs differently (`BTC-USD`, `btcusd`, `XXBTZUSD`, `BTC_USDT`).
//! This module maps both to canonical upper-case codes and `BASE_QUOTE`
//! pairs.
//!
//! Adapters build `pair` from the base/quote fields of a response. The same
//! table then re-derives the pair from the raw market id alone, and
//! [`SymbolTable::verify`] rejects any market where the two disagree.
//!
//! ```ignore
//! use crypto_markets::pair::{normalize_pair, normalize_symbol};
//! use crypto_markets::Exchange;
//!
//! assert_eq!(normalize_symbol("XXBT", Exchange::Kraken), "BTC");
//! assert_eq!(normalize_pair("XXBTZUSD", Exchange::Kraken).as_deref(), Some("BTC_USD"));
//! ```

mod aliases;
mod rules;

use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;

use crate::errors::MarketsError;
use crate::models::{Exchange, Market};

lazy_static! {
    static ref TABLES: HashMap<Exchange, SymbolTable> = Exchange::ALL
        .into_iter()
        .map(|exchange| (exchange, SymbolTable::for_exchange(exchange)))
        .collect();
}

/// Canonical currency code for an exchange-native code.
pub fn normalize_symbol(symbol: &str, exchange: Exchange) -> String {
    table(exchange).normalize_symbol(symbol)
}

/// Canonical `BASE_QUOTE` pair for an exchange-native market id.
///
/// Returns `None` when the id cannot be split into two currencies.
pub fn normalize_pair(id: &str, exchange: Exchange) -> Option<String> {
    table(exchange).normalize_pair(id)
}

/// Join two canonical codes into a pair.
pub fn canonical_pair(base: &str, quote: &str) -> String {
    format!("{}_{}", base, quote)
}

fn table(exchange: Exchange) -> &'static SymbolTable {
    // Every Exchange is inserted when TABLES is built.
    &TABLES[&exchange]
}

/// Alias table for one exchange.
#[derive(Clone, Debug)]
pub struct SymbolTable {
    exchange: Exchange,
    aliases: HashMap<String, String>,
    /// Raw asset codes listed by the exchange, when it publishes them
    listed_assets: HashSet<String>,
}

impl SymbolTable {
    /// The built-in table for `exchange`.
    pub fn for_exchange(exchange: Exchange) -> Self {
        let aliases = aliases::exchange_aliases(exchange)
            .iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect();
        Self {
            exchange,
            aliases,
            listed_assets: HashSet::new(),
        }
    }

    /// Shared table for `exchange`, without rebuilding it.
    pub fn shared(exchange: Exchange) -> &'static SymbolTable {
        table(exchange)
    }

    /// Add aliases published by the exchange itself.
    ///
    /// Built-in aliases win over published ones for the same code.
    pub fn with_published_aliases(
        mut self,
        published: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        for (from, to) in published {
            self.aliases
                .entry(from.to_uppercase())
                .or_insert_with(|| to.to_uppercase());
        }
        self
    }

    /// Add the raw asset codes the exchange lists.
    ///
    /// Concatenated ids are then split where both halves are listed assets,
    /// before falling back to the built-in quote list.
    pub fn with_listed_assets(mut self, assets: impl IntoIterator<Item = String>) -> Self {
        self.listed_assets
            .extend(assets.into_iter().map(|asset| asset.trim().to_uppercase()));
        self
    }

    pub fn exchange(&self) -> Exchange {
        self.exchange
    }

    /// Canonical currency code for an exchange-native code.
    pub fn normalize_symbol(&self, symbol: &str) -> String {
        let mut code = symbol.trim().to_uppercase();
        if self.exchange == Exchange::Kraken {
            code = rules::kraken_currency_code(&code);
        }
        if let Some(alias) = self.aliases.get(&code) {
            code = alias.clone();
        }
        match aliases::COMMON_ALIASES.iter().find(|(from, _)| *from == code) {
            Some((_, to)) => to.to_string(),
            None => code,
        }
    }

    /// Canonical `BASE_QUOTE` pair for an exchange-native market id.
    pub fn normalize_pair(&self, id: &str) -> Option<String> {
        let (base, quote) = self
            .split_listed(id)
            .or_else(|| rules::split_id(self.exchange, id))?;
        if base.is_empty() || quote.is_empty() {
            return None;
        }
        Some(canonical_pair(
            &self.normalize_symbol(&base),
            &self.normalize_symbol(&quote),
        ))
    }

    fn split_listed(&self, id: &str) -> Option<(String, String)> {
        if self.listed_assets.is_empty() {
            return None;
        }
        let symbol = rules::concatenated_symbol(self.exchange, id)?;
        rules::split_by_listed_assets(self.exchange, &symbol, &self.listed_assets)
    }

    /// Check that `market.pair` is `base_quote` and matches the pair derived
    /// from `market.id`.
    pub fn verify(&self, market: &Market) -> Result<(), MarketsError> {
        let joined = canonical_pair(&market.base, &market.quote);
        if market.pair != joined {
            return Err(MarketsError::ConsistencyCheckFailed {
                exchange: market.exchange,
                id: market.id.clone(),
                expected: joined,
                actual: market.pair.clone(),
            });
        }

        let derived = self.normalize_pair(&market.id).unwrap_or_default();
        if market.pair != derived {
            return Err(MarketsError::ConsistencyCheckFailed {
                exchange: market.exchange,
                id: market.id.clone(),
                expected: derived,
                actual: market.pair.clone(),
            });
        }
        Ok(())
    }
}
