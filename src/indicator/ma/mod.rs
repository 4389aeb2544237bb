pub mod ema;
pub mod sma;

use crate::error::IndicatorError;
use crate::indicator::TABuilder;
use crate::model::{Candle, IndicatorPoint};
use ema::EMABuilder;
use serde::{Deserialize, Serialize};
use sma::SMABuilder;
use std::fmt::Display;

/// 이동평균 계산 방식
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MAType {
    /// 지수이동평균 (Exponential Moving Average)
    /// 최근 데이터에 더 큰 가중치를 부여합니다.
    EMA,
    /// 단순이동평균 (Simple Moving Average)
    /// 윈도우 안의 모든 데이터에 동일한 가중치를 부여합니다.
    SMA,
}

impl Display for MAType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MAType::EMA => write!(f, "EMA"),
            MAType::SMA => write!(f, "SMA"),
        }
    }
}

/// EMA 초기값 결정 방식
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmaSeed {
    /// 첫 캔들의 종가를 그대로 첫 EMA 값으로 사용 (기존 차트와 동일한 출력)
    #[default]
    FirstClose,
    /// 첫 `period`개 종가의 SMA로 시작. 그 전 구간은 값 없음
    Sma,
}

/// 이동평균 공통 계산 함수
pub mod moving_average {
    /// 지수이동평균(EMA) 평활화 계수 `2 / (period + 1)`
    pub fn calculate_ema_alpha(period: usize) -> f64 {
        2.0 / (period + 1) as f64
    }

    /// 지수이동평균(EMA) 한 스텝 계산
    ///
    /// # Arguments
    /// * `current_price` - 현재 가격
    /// * `previous_ema` - 이전 EMA 값
    /// * `alpha` - 평활화 계수
    pub fn calculate_ema_step(current_price: f64, previous_ema: f64, alpha: f64) -> f64 {
        current_price * alpha + previous_ema * (1.0 - alpha)
    }

    /// 윈도우의 산술평균
    pub fn mean(window: &[f64]) -> f64 {
        window.iter().sum::<f64>() / window.len() as f64
    }
}

/// 이동평균 빌더 팩토리
///
/// 지정된 유형의 이동평균 빌더를 생성합니다.
pub struct MABuilderFactory;

impl MABuilderFactory {
    /// 이동평균 유형과 기간에 따른 빌더 생성
    ///
    /// # Arguments
    /// * `ma_type` - 이동평균 유형 (EMA, SMA)
    /// * `period` - 이동평균 계산 기간
    /// * `seed` - EMA 초기값 방식 (SMA에는 영향 없음)
    ///
    /// # Returns
    /// * `Result<Box<dyn TABuilder<Vec<IndicatorPoint>, C>>, IndicatorError>` - 기간이 0이면 오류
    pub fn build<C: Candle + 'static>(
        ma_type: MAType,
        period: usize,
        seed: EmaSeed,
    ) -> Result<Box<dyn TABuilder<Vec<IndicatorPoint>, C>>, IndicatorError> {
        Ok(match ma_type {
            MAType::EMA => Box::new(EMABuilder::<C>::new(period)?.with_seed(seed)),
            MAType::SMA => Box::new(SMABuilder::<C>::new(period)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::moving_average::*;
    use super::*;
    use crate::model::Ohlcv;

    #[test]
    fn test_ema_alpha() {
        assert_eq!(calculate_ema_alpha(1), 1.0);
        assert!((calculate_ema_alpha(2) - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_factory_rejects_zero_period() {
        assert!(MABuilderFactory::build::<Ohlcv>(MAType::SMA, 0, EmaSeed::default()).is_err());
        assert!(MABuilderFactory::build::<Ohlcv>(MAType::EMA, 20, EmaSeed::default()).is_ok());
    }
}
