use cipher_ta::{
    error::IndicatorError,
    helpers,
    source::CandleSource,
    test_utils::generate_range_candles,
};

#[test]
fn sma_helper_matches_the_documented_contract() {
    let out = helpers::sma(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
    assert!(out[0].is_nan());
    assert!(out[1].is_nan());
    assert_eq!(&out[2..], &[2.0, 3.0, 4.0]);
}

#[test]
fn warmup_positions_are_nan_then_finite() {
    let candles = generate_range_candles(120);

    let ema = cipher_ta::ema(&candles, 14, CandleSource::Close, true).unwrap();
    assert_eq!(ema.len(), 120);
    assert!(ema.iter().all(|v| v.is_finite()));

    let atr = cipher_ta::atr(&candles, 14, true).unwrap();
    assert!(atr[..13].iter().all(|v| v.is_nan()));
    assert!(atr[13..].iter().all(|v| v.is_finite()));

    let cci = cipher_ta::cci(&candles, 14, true).unwrap();
    assert!(cci[..13].iter().all(|v| v.is_nan()));
    assert!(cci[13..].iter().all(|v| v.is_finite()));

    let donchian = cipher_ta::donchian(&candles, 20, true).unwrap();
    assert!(donchian.upperband[..19].iter().all(|v| v.is_nan()));
    assert!(donchian.upperband[19..].iter().all(|v| v.is_finite()));
}

#[test]
fn non_sequential_equals_last_sequential_value() {
    let candles = generate_range_candles(100);

    let seq = cipher_ta::cmo(&candles, 14, CandleSource::Close, true).unwrap();
    let last = cipher_ta::cmo(&candles, 14, CandleSource::Close, false).unwrap();
    assert_eq!(last.len(), 1);
    assert!((last[0] - seq[99]).abs() < 1e-12);

    let seq = cipher_ta::bbw(&candles, 20, 2.0, CandleSource::Close, true).unwrap();
    let last = cipher_ta::bbw(&candles, 20, 2.0, CandleSource::Close, false).unwrap();
    assert!((last[0] - seq[99]).abs() < 1e-12);
}

#[test]
fn insufficient_data_is_reported_not_computed() {
    let candles = generate_range_candles(10);
    assert!(matches!(
        cipher_ta::adx(&candles, 14, true),
        Err(IndicatorError::InsufficientData { .. })
    ));
    assert!(matches!(
        cipher_ta::acosc(&candles, true),
        Err(IndicatorError::InsufficientData { .. })
    ));
}

#[test]
fn invalid_period_is_rejected_everywhere() {
    let candles = generate_range_candles(50);
    assert!(matches!(
        cipher_ta::ema(&candles, 0, CandleSource::Close, true),
        Err(IndicatorError::InvalidParameter(_))
    ));
    assert!(matches!(
        cipher_ta::aroon(&candles, 0, true),
        Err(IndicatorError::InvalidParameter(_))
    ));
    assert!(matches!(
        cipher_ta::cksp(&candles, 0, 1.0, 9, true),
        Err(IndicatorError::InvalidParameter(_))
    ));
}

#[test]
fn multi_series_results_share_length() {
    let candles = generate_range_candles(100);

    let gator = cipher_ta::alligator(&candles, CandleSource::Hl2, true).unwrap();
    assert_eq!(gator.jaw.len(), 100);
    assert_eq!(gator.teeth.len(), 100);
    assert_eq!(gator.lips.len(), 100);

    let aroon = cipher_ta::aroon(&candles, 14, true).unwrap();
    assert_eq!(aroon.up.len(), aroon.down.len());

    let di = cipher_ta::di(&candles, 14, true).unwrap();
    assert_eq!(di.plus.len(), di.minus.len());

    let cksp = cipher_ta::cksp(&candles, 10, 1.0, 9, true).unwrap();
    assert_eq!(cksp.long_stop.len(), cksp.short_stop.len());
}
