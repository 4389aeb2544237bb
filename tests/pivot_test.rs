use common_test_utils::*;

use chart_indicators::Candle;
use chart_indicators::indicator::TABuilder;
use chart_indicators::indicator::pivot::{
    PivotBuilder, calculate_pivot_cpr, calculate_pivot_levels, group_by_day,
};

fn assert_close(actual: f64, expected: f64) {
    assert!((actual - expected).abs() < 1e-9, "expected {}, got {}", expected, actual);
}

#[test]
fn test_levels_from_second_to_last_day() {
    let candles = create_intraday_candles(base_time(), 3, 6);
    let levels = calculate_pivot_levels(&candles).unwrap();

    // 둘째 날: 고가 117, 저가 108, 종가 116
    let pivot = (117.0 + 108.0 + 116.0) / 3.0;
    assert_close(levels.pivot, pivot);
    assert_close(levels.bc, 112.5);
    assert_close(levels.tc, 2.0 * pivot - 112.5);
    assert_close(levels.s1, 2.0 * pivot - 117.0);
    assert_close(levels.r1, 2.0 * pivot - 108.0);
    assert_close(levels.s2, pivot - 9.0);
    assert_close(levels.r2, pivot + 9.0);
}

#[test]
fn test_single_day_yields_nothing() {
    let candles = create_intraday_candles(base_time(), 1, 8);

    assert_eq!(group_by_day(&candles).len(), 1);
    assert!(calculate_pivot_levels(&candles).is_none());
    assert!(calculate_pivot_cpr(&candles).is_empty());
}

#[test]
fn test_seven_horizontal_lines_over_full_range() {
    let candles = create_intraday_candles(base_time(), 4, 5);
    let series = PivotBuilder::<TestCandle>::new().build(&candles);

    let names: Vec<_> = series.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Pivot", "S1", "R1", "S2", "R2", "BC (CPR Bottom)", "TC (CPR Top)"]
    );

    let first = candles.first().unwrap().datetime();
    let last = candles.last().unwrap().datetime();
    for line in &series {
        assert_eq!(line.points.len(), 2);
        assert_eq!(line.points[0].time, first);
        assert_eq!(line.points[1].time, last);
        assert_eq!(line.points[0].value, line.points[1].value);
    }
}

#[test]
fn test_range_uses_min_and_max_time() {
    let candles = create_intraday_candles(base_time(), 2, 3);
    let first = candles.first().unwrap().datetime();
    let last = candles.last().unwrap().datetime();

    let mut shuffled = candles.clone();
    shuffled.swap(0, 5);
    let series = calculate_pivot_cpr(&shuffled);

    assert_eq!(series[0].points[0].time, first);
    assert_eq!(series[0].points[1].time, last);
}
