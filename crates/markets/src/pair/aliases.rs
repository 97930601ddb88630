//! Currency alias and quote-currency data.

use crate::models::Exchange;

/// Exchange-independent aliases (exchange code -> canonical code).
pub(super) const COMMON_ALIASES: &[(&str, &str)] = &[("XBT", "BTC")];

/// Exchange-specific aliases, applied before [`COMMON_ALIASES`].
pub(super) fn exchange_aliases(exchange: Exchange) -> &'static [(&'static str, &'static str)] {
    match exchange {
        Exchange::Bitfinex => &[
            ("ABS", "ABYSS"),
            ("AIO", "AION"),
            ("ALG", "ALGO"),
            ("AMP", "AMPL"),
            ("ATO", "ATOM"),
            ("BAB", "BCH"),
            ("CTX", "CTXC"),
            ("DAT", "DATA"),
            ("DSH", "DASH"),
            ("EUS", "EURS"),
            ("EUT", "EURT"),
            ("GSD", "GUSD"),
            ("HOT", "HYDRO"),
            ("IOT", "IOTA"),
            ("IQX", "IQ"),
            ("MIT", "MITH"),
            ("MNA", "MANA"),
            ("NCA", "NCASH"),
            ("ORS", "ORSGROUP"),
            ("PAS", "PASS"),
            ("POY", "POLY"),
            ("QSH", "QASH"),
            ("QTM", "QTUM"),
            ("SNG", "SNGLS"),
            ("SPK", "SPANK"),
            ("STJ", "STORJ"),
            ("TSD", "TUSD"),
            ("UDC", "USDC"),
            ("UST", "USDT"),
            ("XCH", "XCHF"),
            ("YYW", "YOYOW"),
        ],
        Exchange::Huobi => &[("HOT", "HYDRO")],
        Exchange::Kraken => &[("XDG", "DOGE")],
        Exchange::Newdex | Exchange::WhaleEx => &[("KEY", "MYKEY")],
        _ => &[],
    }
}

/// Quote currencies that can end a concatenated pair id (`BTCUSDT`).
///
/// Matching tries longer codes first, so order here does not matter.
pub(super) fn quote_currencies(exchange: Exchange) -> &'static [&'static str] {
    match exchange {
        Exchange::Biki => &["USDT", "BTC", "ETH", "BIKI", "EOS", "TRX"],
        Exchange::Binance => &[
            "USDT", "BUSD", "USDC", "TUSD", "USDP", "USDS", "FDUSD", "PAX", "DAI", "UST", "VAI",
            "BIDR", "BKRW", "BVND", "IDRT", "BNB", "BTC", "ETH", "XRP", "TRX", "DOGE", "EUR",
            "GBP", "AUD", "BRL", "RUB", "TRY", "UAH", "NGN", "ZAR", "JPY", "ARS", "PLN", "RON",
            "MXN", "COP", "CZK", "USD", "EURI",
        ],
        Exchange::BitMex => &["USDT", "USD", "EUR", "XBT"],
        Exchange::Bitstamp => &["USDT", "USDC", "USD", "EUR", "GBP", "BTC", "ETH", "PAX"],
        Exchange::Huobi => &[
            "USDT", "HUSD", "USDC", "BTC", "ETH", "HT", "TRX", "EUR", "GBP",
        ],
        Exchange::Kraken => &[
            "ZUSD", "ZEUR", "ZCAD", "ZJPY", "ZGBP", "ZCHF", "ZAUD", "XXBT", "XETH", "USDT",
            "USDC", "USD", "EUR", "CAD", "JPY", "GBP", "CHF", "AUD", "XBT", "ETH", "DAI",
        ],
        Exchange::WhaleEx => &["USDT", "EOS", "ETH", "BTC"],
        _ => &[],
    }
}
