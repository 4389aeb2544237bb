use crate::error::IndicatorError;
use crate::indicator::TABuilder;
use crate::indicator::ma::moving_average::mean;
use crate::model::{Candle, IndicatorPoint, align_points};
use std::fmt::Display;
use std::marker::PhantomData;

/// 종가 단순이동평균 계산
///
/// 인덱스 `i < period - 1`은 값 없음, 그 이후는 `[i - period + 1, i]` 구간 종가 평균입니다.
/// `period`가 0이면 모든 값이 None입니다.
pub fn calculate_sma<C: Candle>(data: &[C], period: usize) -> Vec<IndicatorPoint> {
    let closes = data.iter().map(|c| c.close_price()).collect::<Vec<_>>();
    let values = (0..closes.len())
        .map(|i| {
            if period == 0 || i + 1 < period {
                None
            } else {
                Some(mean(&closes[i + 1 - period..=i]))
            }
        })
        .collect();

    align_points(data, values)
}

#[derive(Debug)]
pub struct SMABuilder<C: Candle> {
    period: usize,
    _phantom: PhantomData<C>,
}

impl<C> Display for SMABuilder<C>
where
    C: Candle,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SMA({})", self.period)
    }
}

impl<C> SMABuilder<C>
where
    C: Candle,
{
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        if period == 0 {
            return Err(IndicatorError::invalid_period("SMA", period));
        }

        Ok(SMABuilder {
            period,
            _phantom: PhantomData,
        })
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl<C> TABuilder<Vec<IndicatorPoint>, C> for SMABuilder<C>
where
    C: Candle,
{
    fn build(&self, data: &[C]) -> Vec<IndicatorPoint> {
        calculate_sma(data, self.period)
    }
}
