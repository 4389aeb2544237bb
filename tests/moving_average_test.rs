use common_test_utils::*;

use chart_indicators::IndicatorError;
use chart_indicators::indicator::TABuilder;
use chart_indicators::indicator::ma::ema::{EMABuilder, calculate_ema};
use chart_indicators::indicator::ma::sma::{SMABuilder, calculate_sma};
use chart_indicators::indicator::ma::{EmaSeed, MABuilderFactory, MAType};
use chrono::Duration;

#[test]
fn test_sma_on_uptrend() {
    let candles = create_uptrend_candles(30, 100.0, 1.0);
    let points = calculate_sma(&candles, 10);

    assert_eq!(points.len(), candles.len());
    assert!(points[..9].iter().all(|p| p.value.is_none()));
    // 종가 100.5..=109.5 평균
    assert_eq!(points[9].value, Some(105.0));
    assert_eq!(points[29].value, Some(125.0));
}

#[test]
fn test_sma_longer_than_data() {
    let candles = create_uptrend_candles(5, 100.0, 1.0);
    assert!(calculate_sma(&candles, 10).iter().all(|p| p.value.is_none()));
}

#[test]
fn test_ema_first_close_seed_defined_everywhere() {
    let candles = create_downtrend_candles(40, 200.0, 2.0);
    let points = calculate_ema(&candles, 20, EmaSeed::FirstClose);

    assert_eq!(points.len(), candles.len());
    assert_eq!(points[0].value, Some(candles[0].close));
    assert!(points.iter().all(|p| p.value.is_some()));

    // 하락 추세에서는 EMA가 종가보다 위에 머문다
    for (point, candle) in points.iter().zip(candles.iter()).skip(1) {
        assert!(point.value.unwrap() > candle.close);
    }
}

#[test]
fn test_ema_constant_closes() {
    let closes = vec![42.0; 25];
    let candles = candles_from_closes(base_time(), Duration::hours(1), &closes);

    for point in calculate_ema(&candles, 10, EmaSeed::FirstClose) {
        assert!((point.value.unwrap() - 42.0).abs() < 1e-12);
    }
}

#[test]
fn test_ema_sma_seed_matches_sma_at_seed_index() {
    let candles = create_sideways_candles(30, 50.0, 4.0);
    let ema = calculate_ema(&candles, 8, EmaSeed::Sma);
    let sma = calculate_sma(&candles, 8);

    assert!(ema[..7].iter().all(|p| p.value.is_none()));
    assert_eq!(ema[7].value, sma[7].value);
    assert!(ema[8..].iter().all(|p| p.value.is_some()));
}

#[test]
fn test_zero_period() {
    let candles = create_uptrend_candles(5, 100.0, 1.0);

    assert!(calculate_sma(&candles, 0).iter().all(|p| p.value.is_none()));
    assert!(calculate_ema(&candles, 0, EmaSeed::FirstClose).iter().all(|p| p.value.is_none()));
    assert_eq!(
        SMABuilder::<TestCandle>::new(0).unwrap_err(),
        IndicatorError::InvalidPeriod {
            indicator: "SMA",
            period: 0
        }
    );
    assert!(EMABuilder::<TestCandle>::new(0).is_err());
    assert!(MABuilderFactory::build::<TestCandle>(MAType::EMA, 0, EmaSeed::FirstClose).is_err());
}

#[test]
fn test_factory_builders_match_free_functions() {
    let candles = create_sideways_candles(60, 100.0, 10.0);

    let sma = MABuilderFactory::build::<TestCandle>(MAType::SMA, 10, EmaSeed::FirstClose).unwrap();
    assert_eq!(sma.build(&candles), calculate_sma(&candles, 10));

    let ema = MABuilderFactory::build::<TestCandle>(MAType::EMA, 20, EmaSeed::Sma).unwrap();
    assert_eq!(ema.build(&candles), calculate_ema(&candles, 20, EmaSeed::Sma));
}
