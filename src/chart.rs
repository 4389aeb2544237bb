use crate::model::{Candle, IndicatorSeries};
use crate::registry::{IndicatorKind, IndicatorRegistry};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// 캔들스틱 한 개 (`[시가, 고가, 저가, 종가]`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CandlePoint {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub time: DateTime<Utc>,
    pub ohlc: [f64; 4],
}

impl CandlePoint {
    pub fn from_candle<C: Candle>(candle: &C) -> Self {
        CandlePoint {
            time: candle.datetime(),
            ohlc: [
                candle.open_price(),
                candle.high_price(),
                candle.low_price(),
                candle.close_price(),
            ],
        }
    }
}

/// 보조 축 범위
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

/// RSI용 0-100 보조 축
pub const OSCILLATOR_AXIS: AxisRange = AxisRange { min: 0.0, max: 100.0 };

/// 차트 표면에 넘길 완성된 데이터
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub candles: Vec<CandlePoint>,
    pub series: Vec<IndicatorSeries>,
    /// 오실레이터(RSI)를 선택했을 때만 존재
    pub oscillator_axis: Option<AxisRange>,
}

impl Chart {
    /// 캔들과 선택된 지표로 차트 데이터를 만듭니다.
    ///
    /// # Arguments
    /// * `registry` - 지표 등록부
    /// * `selected` - 선택된 지표 (순서 유지)
    /// * `data` - 시간 오름차순 캔들 데이터
    pub fn build<C: Candle + 'static>(
        registry: &IndicatorRegistry<C>,
        selected: &[IndicatorKind],
        data: &[C],
    ) -> Chart {
        let oscillator_axis = selected
            .iter()
            .any(|kind| !kind.is_overlay())
            .then_some(OSCILLATOR_AXIS);

        Chart {
            candles: data.iter().map(CandlePoint::from_candle).collect(),
            series: registry.compute(selected, data),
            oscillator_axis,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::model::Ohlcv;
    use chrono::{Duration, TimeZone};

    fn data() -> Vec<Ohlcv> {
        let start = Utc.with_ymd_and_hms(2024, 2, 5, 9, 15, 0).unwrap();
        (0..5)
            .map(|i| {
                let p = 10.0 + i as f64;
                Ohlcv::new(start + Duration::minutes(i), p, p + 1.0, p - 1.0, p + 0.5, 100.0)
            })
            .collect()
    }

    #[test]
    fn test_chart_without_oscillator() {
        let registry = IndicatorRegistry::new(&EngineConfig::default()).unwrap();
        let chart = Chart::build(&registry, &[IndicatorKind::SMA10], &data());

        assert_eq!(chart.candles.len(), 5);
        assert_eq!(chart.candles[0].ohlc, [10.0, 11.0, 9.0, 10.5]);
        assert_eq!(chart.series.len(), 1);
        assert_eq!(chart.oscillator_axis, None);
    }

    #[test]
    fn test_chart_with_rsi_axis() {
        let registry = IndicatorRegistry::new(&EngineConfig::default()).unwrap();
        let chart = Chart::build(&registry, &[IndicatorKind::RSI14], &data());
        assert_eq!(chart.oscillator_axis, Some(OSCILLATOR_AXIS));
    }

    #[test]
    fn test_serializes_epoch_millis() {
        let registry = IndicatorRegistry::new(&EngineConfig::default()).unwrap();
        let chart = Chart::build(&registry, &[], &data());
        let json = serde_json::to_value(&chart).unwrap();

        let start = Utc.with_ymd_and_hms(2024, 2, 5, 9, 15, 0).unwrap();
        assert_eq!(json["candles"][0]["time"], start.timestamp_millis());
        assert!(json["oscillator_axis"].is_null());
    }
}
