use crate::error::IndicatorError;
use crate::indicator::TABuilder;
use crate::model::{Candle, IndicatorPoint, align_points};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt::Display;
use std::marker::PhantomData;

/// 기본 RSI 기간
pub const DEFAULT_RSI_PERIOD: usize = 14;

/// 평균 손실이 0일 때 사용하는 RS 값
///
/// 무한대 대신 100으로 고정하므로 RSI는 100이 아니라 `100 - 100/101 ≈ 99.01`이 됩니다.
pub const NO_LOSS_RS: f64 = 100.0;

/// RSI 평활화 점화식
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RsiRecurrence {
    /// 기존 차트와 동일한 출력을 내는 점화식
    ///
    /// * 인덱스 1부터 매 캔들의 변화량을 누적 합계에 더합니다.
    /// * `period - 1`에서 누적 합계를 `period`로 나눠 시드를 만듭니다.
    /// * `period + 1`부터는 현재 변화량이 아니라 `close[i-period] - close[i-period-1]`로 평활화합니다.
    #[default]
    LaggedDelta,
    /// 표준 Wilder RSI (첫 `period`개 변화량 평균으로 시드, 이후 현재 변화량으로 평활화)
    Wilder,
}

/// RS 값을 0-100 RSI로 변환
///
/// # Arguments
/// * `gains` - 평균 상승폭
/// * `losses` - 평균 하락폭
pub fn rsi_value(gains: f64, losses: f64) -> f64 {
    let rs = if losses == 0.0 { NO_LOSS_RS } else { gains / losses };
    100.0 - 100.0 / (1.0 + rs)
}

fn split_change(change: f64) -> (f64, f64) {
    let gain = if change > 0.0 { change } else { 0.0 };
    let loss = if change < 0.0 { -change } else { 0.0 };
    (gain, loss)
}

/// RSI 누적 상태
///
/// 직전 종가, 지금까지 본 종가 수, 상승/하락 합계(시드 후에는 평균)를 들고 다닙니다.
/// `LaggedDelta`는 `period`개 전 변화량이 필요하므로 최근 `period + 1`개 변화량을 보관합니다.
#[derive(Debug, Clone, PartialEq)]
pub struct RsiAccumulator {
    period: usize,
    recurrence: RsiRecurrence,
    previous_close: Option<f64>,
    index: usize,
    gains: f64,
    losses: f64,
    recent_changes: VecDeque<f64>,
}

impl RsiAccumulator {
    pub fn new(period: usize, recurrence: RsiRecurrence) -> Self {
        RsiAccumulator {
            period,
            recurrence,
            previous_close: None,
            index: 0,
            gains: 0.0,
            losses: 0.0,
            recent_changes: VecDeque::with_capacity(period + 1),
        }
    }

    /// 다음 종가를 반영하고 해당 캔들의 RSI를 반환합니다.
    ///
    /// `period`가 0이면 항상 None입니다.
    pub fn step(self, close: f64) -> (Self, Option<f64>) {
        let mut next = self;
        let index = next.index;
        next.index += 1;

        let Some(previous) = next.previous_close.replace(close) else {
            return (next, None);
        };
        if next.period == 0 {
            return (next, None);
        }

        let change = close - previous;
        let value = match next.recurrence {
            RsiRecurrence::LaggedDelta => next.apply_lagged(change, index),
            RsiRecurrence::Wilder => next.apply_wilder(change, index),
        };
        (next, value)
    }

    fn apply_lagged(&mut self, change: f64, index: usize) -> Option<f64> {
        let period = self.period;
        let divisor = period as f64;

        self.recent_changes.push_back(change);
        if self.recent_changes.len() > period + 1 {
            self.recent_changes.pop_front();
        }

        let (gain, loss) = split_change(change);
        self.gains += gain;
        self.losses += loss;

        if index < period {
            if index == period - 1 {
                self.gains /= divisor;
                self.losses /= divisor;
            }
            return None;
        }

        if index > period {
            // 맨 앞은 `period`개 전 변화량
            let lagged = self.recent_changes.front().copied().unwrap_or_default();
            let (gain, loss) = split_change(lagged);
            self.gains = (self.gains * (divisor - 1.0) + gain) / divisor;
            self.losses = (self.losses * (divisor - 1.0) + loss) / divisor;
        }

        Some(rsi_value(self.gains, self.losses))
    }

    fn apply_wilder(&mut self, change: f64, index: usize) -> Option<f64> {
        let period = self.period;
        let divisor = period as f64;
        let (gain, loss) = split_change(change);

        if index <= period {
            self.gains += gain;
            self.losses += loss;
            if index < period {
                return None;
            }
            self.gains /= divisor;
            self.losses /= divisor;
        } else {
            self.gains = (self.gains * (divisor - 1.0) + gain) / divisor;
            self.losses = (self.losses * (divisor - 1.0) + loss) / divisor;
        }

        Some(rsi_value(self.gains, self.losses))
    }
}

/// 종가 RSI 시계열 계산
///
/// 출력 길이는 입력과 같고, 시드 전 구간은 값 없음입니다.
pub fn calculate_rsi<C: Candle>(
    data: &[C],
    period: usize,
    recurrence: RsiRecurrence,
) -> Vec<IndicatorPoint> {
    let (_, values) = data.iter().fold(
        (RsiAccumulator::new(period, recurrence), Vec::with_capacity(data.len())),
        |(acc, mut values), candle| {
            let (acc, value) = acc.step(candle.close_price());
            values.push(value);
            (acc, values)
        },
    );

    align_points(data, values)
}

/// 상대강도지수(RSI) 기술적 지표 빌더
#[derive(Debug)]
pub struct RSIBuilder<C: Candle> {
    /// RSI 계산 기간
    period: usize,
    recurrence: RsiRecurrence,
    _phantom: PhantomData<C>,
}

impl<C> Display for RSIBuilder<C>
where
    C: Candle,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RSI({})", self.period)
    }
}

impl<C> RSIBuilder<C>
where
    C: Candle,
{
    /// 새 RSI 빌더 생성
    ///
    /// # Arguments
    /// * `period` - RSI 계산 기간 (일반적으로 14)
    ///
    /// # Returns
    /// * `Result<RSIBuilder, IndicatorError>` - 기간이 0이면 오류
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        if period == 0 {
            return Err(IndicatorError::invalid_period("RSI", period));
        }

        Ok(Self {
            period,
            recurrence: RsiRecurrence::default(),
            _phantom: PhantomData,
        })
    }

    pub fn with_recurrence(mut self, recurrence: RsiRecurrence) -> Self {
        self.recurrence = recurrence;
        self
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl<C> TABuilder<Vec<IndicatorPoint>, C> for RSIBuilder<C>
where
    C: Candle,
{
    fn build(&self, data: &[C]) -> Vec<IndicatorPoint> {
        calculate_rsi(data, self.period, self.recurrence)
    }
}
