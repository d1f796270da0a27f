use crate::{error::InstrumentError, exchange::ExchangeId, timeframe::Timeframe};

/// Hash key identifying one market-data slot: `exchange-symbol[-timeframe]`.
///
/// Exchange identifiers never contain a dash, and no quote asset collides
/// with a timeframe string, so [`parse_composite_key`] inverts
/// [`generate_composite_key`] for every `(exchange, symbol, timeframe)`.
pub fn generate_composite_key(
    exchange: ExchangeId,
    symbol: &str,
    timeframe: Option<Timeframe>,
) -> String {
    match timeframe {
        Some(tf) => format!("{}-{}-{}", exchange.as_str(), symbol, tf.as_str()),
        None => format!("{}-{}", exchange.as_str(), symbol),
    }
}

/// Split a composite key back into its parts.
pub fn parse_composite_key(
    key: &str,
) -> Result<(ExchangeId, String, Option<Timeframe>), InstrumentError> {
    let (exchange_str, rest) = key
        .split_once('-')
        .ok_or_else(|| InstrumentError::InvalidCompositeKey(key.to_string()))?;

    let exchange: ExchangeId = exchange_str
        .parse()
        .map_err(|_| InstrumentError::InvalidCompositeKey(key.to_string()))?;

    if rest.is_empty() {
        return Err(InstrumentError::InvalidCompositeKey(key.to_string()));
    }

    // A trailing timeframe segment is optional; quote assets never parse as
    // timeframes so the longest-match split is unambiguous.
    if let Some((symbol, tail)) = rest.rsplit_once('-')
        && let Ok(tf) = tail.parse::<Timeframe>()
    {
        return Ok((exchange, symbol.to_string(), Some(tf)));
    }

    Ok((exchange, rest.to_string(), None))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_with_and_without_timeframe() {
        assert_eq!(
            generate_composite_key(ExchangeId::BinanceSpot, "BTC-USDT", None),
            "binance_spot-BTC-USDT"
        );
        assert_eq!(
            generate_composite_key(ExchangeId::BinanceSpot, "BTC-USDT", Some(Timeframe::Hour1)),
            "binance_spot-BTC-USDT-1h"
        );
    }

    #[test]
    fn parse_round_trip() {
        for tf in [None, Some(Timeframe::Minute15), Some(Timeframe::Day1)] {
            let key = generate_composite_key(ExchangeId::BybitUsdtPerpetual, "ETH-USDT", tf);
            let (exchange, symbol, parsed_tf) = parse_composite_key(&key).unwrap();
            assert_eq!(exchange, ExchangeId::BybitUsdtPerpetual);
            assert_eq!(symbol, "ETH-USDT");
            assert_eq!(parsed_tf, tf);
        }
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_composite_key("nodashes").is_err());
        assert!(parse_composite_key("mtgox-BTC-USDT").is_err());
        assert!(parse_composite_key("binance_spot-").is_err());
    }
}
