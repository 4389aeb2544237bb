use crate::error::IndicatorError;
use crate::indicator::TABuilder;
use crate::indicator::ma::EmaSeed;
use crate::indicator::ma::moving_average::{calculate_ema_alpha, calculate_ema_step};
use crate::model::{Candle, IndicatorPoint};
use std::fmt::Display;
use std::marker::PhantomData;

/// EMA 누적 상태
///
/// 이전 EMA 값(시드 전이면 None)과 SMA 시드용 워밍업 합계를 들고 다닙니다.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmaAccumulator {
    period: usize,
    alpha: f64,
    seed: EmaSeed,
    warmup_sum: f64,
    warmup_count: usize,
    previous: Option<f64>,
}

impl EmaAccumulator {
    pub fn new(period: usize, seed: EmaSeed) -> Self {
        EmaAccumulator {
            period,
            alpha: calculate_ema_alpha(period),
            seed,
            warmup_sum: 0.0,
            warmup_count: 0,
            previous: None,
        }
    }

    /// 종가 하나를 반영하고 현재 EMA를 반환합니다.
    ///
    /// `period`가 0이면 항상 None입니다.
    pub fn step(self, close: f64) -> (Self, Option<f64>) {
        if self.period == 0 {
            return (self, None);
        }

        let mut next = self;
        let value = match (self.previous, self.seed) {
            (Some(previous), _) => calculate_ema_step(close, previous, self.alpha),
            (None, EmaSeed::FirstClose) => close,
            (None, EmaSeed::Sma) => {
                next.warmup_sum += close;
                next.warmup_count += 1;
                if next.warmup_count < self.period {
                    return (next, None);
                }
                next.warmup_sum / self.period as f64
            }
        };

        next.previous = Some(value);
        (next, Some(value))
    }
}

/// 종가 지수이동평균 계산
///
/// `k = 2 / (period + 1)`, `ema[i] = close[i]·k + ema[i-1]·(1-k)`.
/// `EmaSeed::FirstClose`이면 첫 값은 첫 종가이고 모든 인덱스에 값이 있습니다.
/// `period`가 0이면 모든 값이 None입니다.
pub fn calculate_ema<C: Candle>(data: &[C], period: usize, seed: EmaSeed) -> Vec<IndicatorPoint> {
    let (_, points) = data.iter().fold(
        (EmaAccumulator::new(period, seed), Vec::with_capacity(data.len())),
        |(acc, mut points), candle| {
            let (acc, value) = acc.step(candle.close_price());
            points.push(IndicatorPoint::new(candle.datetime(), value));
            (acc, points)
        },
    );
    points
}

/// 지수이동평균(EMA) 계산 빌더
#[derive(Debug)]
pub struct EMABuilder<C: Candle> {
    /// EMA 계산 기간
    pub period: usize,
    /// 초기값 방식
    pub seed: EmaSeed,
    _phantom: PhantomData<C>,
}

impl<C> Display for EMABuilder<C>
where
    C: Candle,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EMA({})", self.period)
    }
}

impl<C> EMABuilder<C>
where
    C: Candle,
{
    /// 새 EMA 빌더 생성
    ///
    /// # Arguments
    /// * `period` - EMA 계산 기간
    ///
    /// # Returns
    /// * `Result<EMABuilder, IndicatorError>` - 기간이 0이면 오류
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        if period == 0 {
            return Err(IndicatorError::invalid_period("EMA", period));
        }

        Ok(EMABuilder {
            period,
            seed: EmaSeed::default(),
            _phantom: PhantomData,
        })
    }

    pub fn with_seed(mut self, seed: EmaSeed) -> Self {
        self.seed = seed;
        self
    }
}

impl<C> TABuilder<Vec<IndicatorPoint>, C> for EMABuilder<C>
where
    C: Candle,
{
    fn build(&self, data: &[C]) -> Vec<IndicatorPoint> {
        calculate_ema(data, self.period, self.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Ohlcv;
    use chrono::{Duration, TimeZone, Utc};

    fn closes(values: &[f64]) -> Vec<Ohlcv> {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &c)| Ohlcv::new(start + Duration::days(i as i64), c, c, c, c, 1.0))
            .collect()
    }

    #[test]
    fn test_ema_first_close_seed() {
        let data = closes(&[10.0, 20.0]);
        let points = calculate_ema(&data, 2, EmaSeed::FirstClose);

        assert_eq!(points[0].value, Some(10.0));
        let expected = 20.0 * (2.0 / 3.0) + 10.0 * (1.0 / 3.0);
        assert!((points[1].value.unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_ema_defined_everywhere() {
        let data = closes(&[5.0, 6.0, 7.0, 8.0]);
        let points = EMABuilder::<Ohlcv>::new(200).unwrap().build(&data);
        assert_eq!(points.len(), 4);
        assert!(points.iter().all(|p| p.value.is_some()));
    }

    #[test]
    fn test_ema_sma_seed() {
        let data = closes(&[1.0, 2.0, 3.0, 4.0]);
        let values: Vec<_> = calculate_ema(&data, 3, EmaSeed::Sma)
            .iter()
            .map(|p| p.value)
            .collect();

        assert_eq!(values[0], None);
        assert_eq!(values[1], None);
        assert_eq!(values[2], Some(2.0));
        // alpha = 0.5
        assert_eq!(values[3], Some(3.0));
    }

    #[test]
    fn test_constant_series_stays_constant() {
        let data = closes(&[7.0; 30]);
        for point in calculate_ema(&data, 20, EmaSeed::FirstClose) {
            assert!((point.value.unwrap() - 7.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_zero_period_accumulator_yields_nothing() {
        for seed in [EmaSeed::FirstClose, EmaSeed::Sma] {
            let (acc, first) = EmaAccumulator::new(0, seed).step(10.0);
            let (_, second) = acc.step(20.0);
            assert_eq!((first, second), (None, None));
        }
    }
}
