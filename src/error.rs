use thiserror::Error;

/// 지표 생성 오류
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndicatorError {
    /// 기간이 0인 지표
    #[error("{indicator} 기간은 0보다 커야 합니다: {period}")]
    InvalidPeriod {
        indicator: &'static str,
        period: usize,
    },
    /// 지원하지 않는 지표 식별자
    #[error("지원되지 않는 지표: {0}")]
    UnknownIndicator(String),
}

impl IndicatorError {
    pub fn invalid_period(indicator: &'static str, period: usize) -> Self {
        IndicatorError::InvalidPeriod { indicator, period }
    }
}

/// 설정 로드 오류
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 파일 오류
    #[error("설정 파일 오류: {0}")]
    FileError(String),
    /// 파싱 오류
    #[error("설정 파싱 오류: {0}")]
    ParseError(String),
    /// 유효성 검사 오류
    #[error("설정 유효성 검사 오류: {0}")]
    ValidationError(String),
}

impl From<IndicatorError> for ConfigError {
    fn from(err: IndicatorError) -> Self {
        ConfigError::ValidationError(err.to_string())
    }
}

/// 설정 로드 결과
pub type ConfigResult<T> = Result<T, ConfigError>;
