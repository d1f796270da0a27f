use smol_str::SmolStr;

/// Quote currencies recognised when splitting a dashless symbol.
///
/// Checked in order, so longer suffixes that embed shorter ones (FDUSD vs
/// USD) appear first. USDT outranks any longer `*SUSDT` reading: a symbol
/// like `ALPHASUSDT` splits as `ALPHAS-USDT`.
const QUOTE_SUFFIXES: &[&str] = &[
    "EUR", "EUT", "GBP", "JPY", "MIM", "TRY", "FDUSD", "TUSD", "UST", "USDT", "USDC", "USDS",
    "USDP", "USDU", "USD",
];

/// Remove every dash: `"BTC-USDT"` -> `"BTCUSDT"`.
pub fn dashless_symbol(symbol: &str) -> String {
    symbol.chars().filter(|c| *c != '-').collect()
}

/// Insert the dash separating base and quote assets.
///
/// A symbol already containing a dash is returned unchanged. Otherwise the
/// known quote suffixes are tried in order; unrecognised symbols fall back
/// to a three-character base split.
pub fn dashy_symbol(symbol: &str) -> String {
    if symbol.contains('-') {
        return symbol.to_string();
    }

    for suffix in QUOTE_SUFFIXES {
        if symbol.len() > suffix.len() && symbol.ends_with(suffix) {
            let split = symbol.len() - suffix.len();
            return format!("{}-{}", &symbol[..split], &symbol[split..]);
        }
    }

    if symbol.len() <= 3 {
        return symbol.to_string();
    }
    format!("{}-{}", &symbol[..3], &symbol[3..])
}

/// Replace underscores with dashes: `"BTC_USDT"` -> `"BTC-USDT"`.
pub fn underline_to_dashy_symbol(symbol: &str) -> String {
    symbol.replace('_', "-")
}

/// Replace dashes with underscores: `"BTC-USDT"` -> `"BTC_USDT"`.
pub fn dashy_to_underline(symbol: &str) -> String {
    symbol.replace('-', "_")
}

/// The base asset of a symbol, eg/ `"BTC"` of `"BTC-USDT"`.
pub fn base_asset(symbol: &str) -> SmolStr {
    let dashy = dashy_symbol(symbol);
    match dashy.split_once('-') {
        Some((base, _)) => SmolStr::new(base),
        None => SmolStr::new(dashy),
    }
}

/// The quote asset of a symbol, eg/ `"USDT"` of `"BTC-USDT"`.
pub fn quote_asset(symbol: &str) -> SmolStr {
    let dashy = dashy_symbol(symbol);
    match dashy.split_once('-') {
        Some((_, quote)) => SmolStr::new(quote),
        None => SmolStr::new(dashy),
    }
}
