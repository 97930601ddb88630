//! Splitting exchange-native market ids into raw base and quote codes.

use std::collections::HashSet;

use crate::models::Exchange;

use super::aliases::quote_currencies;

/// Raw `(base, quote)` codes encoded in `id`, upper-cased but not aliased.
pub(super) fn split_id(exchange: Exchange, id: &str) -> Option<(String, String)> {
    let id = id.trim().to_uppercase();
    match exchange {
        Exchange::CoinbasePro => split_delimited(&id, '-'),
        Exchange::Mxc | Exchange::Zb => split_delimited(&id, '_'),
        Exchange::Okex => {
            let mut parts = id.split('-');
            pair_of(parts.next()?, parts.next()?)
        }
        Exchange::Newdex => {
            let mut parts = id.rsplit('-');
            let quote = parts.next()?;
            let base = parts.next()?;
            pair_of(base, quote)
        }
        Exchange::Huobi => split_huobi(&id),
        Exchange::Binance => {
            let symbol = id.split('_').next().unwrap_or_default();
            split_by_quote(exchange, symbol)
        }
        Exchange::BitMex => split_bitmex(&id),
        Exchange::Bitfinex => split_bitfinex(&id),
        Exchange::Kraken => split_kraken(&id),
        Exchange::Biki | Exchange::Bitstamp | Exchange::WhaleEx => split_by_quote(exchange, &id),
    }
}

/// The glued `BASEQUOTE` part of an id, for exchanges that concatenate codes.
///
/// Binance contract ids carry a settlement suffix (`BTCUSD_PERP`), which is dropped.
pub(super) fn concatenated_symbol(exchange: Exchange, id: &str) -> Option<String> {
    let id = id.trim().to_uppercase();
    match exchange {
        Exchange::Binance => id.split('_').next().map(str::to_string),
        Exchange::Biki | Exchange::Bitstamp | Exchange::WhaleEx => Some(id),
        _ => None,
    }
}

/// Split `symbol` where both halves are assets the exchange lists.
///
/// Longer quotes are tried first, so `BTCAEUR` is `BTC`/`AEUR` while
/// `ADAEUR` is still `ADA`/`EUR`.
pub(super) fn split_by_listed_assets(
    exchange: Exchange,
    symbol: &str,
    assets: &HashSet<String>,
) -> Option<(String, String)> {
    let mut quotes: Vec<&str> = quote_currencies(exchange)
        .iter()
        .copied()
        .chain(assets.iter().map(String::as_str))
        .collect();
    quotes.sort_by_key(|q| std::cmp::Reverse(q.len()));

    quotes.into_iter().find_map(|quote| {
        symbol
            .strip_suffix(quote)
            .filter(|base| assets.contains(*base))
            .and_then(|base| pair_of(base, quote))
    })
}

/// Kraken prefixes legacy codes with `X` (crypto) or `Z` (fiat): `XXBT`, `ZUSD`.
pub(super) fn kraken_currency_code(code: &str) -> String {
    if code.len() > 3 && (code.starts_with('X') || code.starts_with('Z')) && !code.contains('.') {
        code[1..].to_string()
    } else {
        code.to_string()
    }
}

fn pair_of(base: &str, quote: &str) -> Option<(String, String)> {
    if base.is_empty() || quote.is_empty() {
        return None;
    }
    Some((base.to_string(), quote.to_string()))
}

fn split_delimited(id: &str, delimiter: char) -> Option<(String, String)> {
    let (base, quote) = id.split_once(delimiter)?;
    pair_of(base, quote)
}

fn split_by_quote(exchange: Exchange, symbol: &str) -> Option<(String, String)> {
    let mut quotes: Vec<&str> = quote_currencies(exchange).to_vec();
    quotes.sort_by_key(|q| std::cmp::Reverse(q.len()));

    quotes.into_iter().find_map(|quote| {
        symbol
            .strip_suffix(quote)
            .and_then(|base| pair_of(base, quote))
    })
}

fn split_huobi(id: &str) -> Option<(String, String)> {
    if id.contains('-') {
        return split_delimited(id, '-');
    }
    // Delivery contracts: BTC201225
    if id.len() > 6 {
        let (symbol, expiry) = id.split_at(id.len() - 6);
        if expiry.bytes().all(|b| b.is_ascii_digit()) {
            return pair_of(symbol, "USD");
        }
    }
    split_by_quote(Exchange::Huobi, id)
}

const BITMEX_MONTH_CODES: &str = "FGHJKMNQUVXZ";

fn split_bitmex(id: &str) -> Option<(String, String)> {
    let symbol = strip_bitmex_expiry(id);
    if let Some(pair) = split_by_quote(Exchange::BitMex, symbol) {
        return Some(pair);
    }
    match symbol {
        "XBT" => pair_of("XBT", "USD"),
        // Non-XBT futures without a quote suffix settle in XBT
        base => pair_of(base, "XBT"),
    }
}

/// `XBTZ20` -> `XBT`. Ids without a month code and two-digit year are unchanged.
fn strip_bitmex_expiry(id: &str) -> &str {
    let bytes = id.as_bytes();
    if bytes.len() > 3 {
        let n = bytes.len();
        let month = bytes[n - 3] as char;
        if BITMEX_MONTH_CODES.contains(month)
            && bytes[n - 2].is_ascii_digit()
            && bytes[n - 1].is_ascii_digit()
        {
            return &id[..n - 3];
        }
    }
    id
}

fn split_bitfinex(id: &str) -> Option<(String, String)> {
    if let Some((base, quote)) = id.split_once(':') {
        return pair_of(strip_f0(base), strip_f0(quote));
    }
    if id.len() <= 3 {
        return None;
    }
    let (base, quote) = id.split_at(id.len() - 3);
    pair_of(base, quote)
}

fn strip_f0(code: &str) -> &str {
    code.strip_suffix("F0").unwrap_or(code)
}

fn split_kraken(id: &str) -> Option<(String, String)> {
    let bytes = id.as_bytes();
    if bytes.len() == 8
        && matches!(bytes[0], b'X' | b'Z')
        && matches!(bytes[4], b'X' | b'Z')
    {
        let (base, quote) = id.split_at(4);
        return pair_of(base, quote);
    }
    split_by_quote(Exchange::Kraken, id)
}
