use crate::config_loader::ConfigValidation;
use crate::error::{ConfigError, ConfigResult};
use crate::indicator::bucket::Timeframe;
use crate::indicator::ma::EmaSeed;
use crate::indicator::rsi::RsiRecurrence;
use crate::registry::IndicatorKind;
use crate::scan::ScanConfig;
use serde::{Deserialize, Serialize};

/// 지표 엔진 설정
///
/// 모든 항목에 기본값이 있어 빈 설정 파일도 유효합니다.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// 차트에 그릴 지표 (선택 순서대로 출력)
    pub indicators: Vec<IndicatorKind>,
    /// VWAP을 선택했을 때 그릴 누적 구간 단위
    pub vwap_timeframes: Vec<Timeframe>,
    /// RSI 평활화 점화식
    pub rsi_recurrence: RsiRecurrence,
    /// EMA 초기값 방식
    pub ema_seed: EmaSeed,
    /// 연간 VWAP 스캐너 설정
    pub scan: ScanConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            indicators: Vec::new(),
            vwap_timeframes: Timeframe::ALL.to_vec(),
            rsi_recurrence: RsiRecurrence::default(),
            ema_seed: EmaSeed::default(),
            scan: ScanConfig::default(),
        }
    }
}

impl ConfigValidation for EngineConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.vwap_timeframes.is_empty() {
            return Err(ConfigError::ValidationError(
                "vwap_timeframes는 비어 있을 수 없습니다".to_string(),
            ));
        }
        if self.scan.lookback_years == 0 {
            return Err(ConfigError::ValidationError(
                "scan.lookback_years는 0보다 커야 합니다".to_string(),
            ));
        }
        if self.scan.min_years <= self.scan.lookback_years {
            return Err(ConfigError::ValidationError(format!(
                "scan.min_years({})는 scan.lookback_years({})보다 커야 합니다",
                self.scan.min_years, self.scan.lookback_years
            )));
        }
        Ok(())
    }
}
