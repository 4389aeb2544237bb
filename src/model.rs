use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Debug;

/// 캔들(OHLCV) 데이터 인터페이스
///
/// 모든 지표 계산은 이 트레이트를 구현한 타입 위에서 동작합니다.
/// 시계열은 호출자가 시간 오름차순으로 정렬해서 넘겨야 합니다.
pub trait Candle: Debug + Send + Sync {
    /// 캔들 시각 (UTC)
    fn datetime(&self) -> DateTime<Utc>;
    /// 시가
    fn open_price(&self) -> f64;
    /// 고가
    fn high_price(&self) -> f64;
    /// 저가
    fn low_price(&self) -> f64;
    /// 종가
    fn close_price(&self) -> f64;
    /// 거래량 (없으면 0)
    fn volume(&self) -> f64;

    /// 대표가격 (고가 + 저가 + 종가) / 3
    fn typical_price(&self) -> f64 {
        (self.high_price() + self.low_price() + self.close_price()) / 3.0
    }
}

/// 차트 데이터 파일에서 읽어오는 기본 OHLCV 레코드
///
/// `time`은 RFC 3339 문자열, 오프셋 없는 날짜-시각(UTC), `YYYY-MM-DD` 날짜(UTC 자정) 또는 epoch 밀리초를 허용합니다.
/// `volume`이 없거나 null이면 0으로 취급합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ohlcv {
    #[serde(deserialize_with = "deserialize_time")]
    pub time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default, deserialize_with = "deserialize_volume")]
    pub volume: f64,
}

impl Ohlcv {
    pub fn new(time: DateTime<Utc>, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Ohlcv {
            time,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

impl Candle for Ohlcv {
    fn datetime(&self) -> DateTime<Utc> {
        self.time
    }
    fn open_price(&self) -> f64 {
        self.open
    }
    fn high_price(&self) -> f64 {
        self.high
    }
    fn low_price(&self) -> f64 {
        self.low
    }
    fn close_price(&self) -> f64 {
        self.close
    }
    fn volume(&self) -> f64 {
        self.volume
    }
}

/// 오프셋 없는 시각 형식 (`%.f`는 소수 초가 없어도 통과)
const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTime {
    Millis(i64),
    Text(String),
}

/// 시각 문자열/숫자를 UTC 시각으로 변환
///
/// # Arguments
/// * `raw` - RFC 3339 문자열, 오프셋 없는 `YYYY-MM-DDTHH:MM:SS[.fff]`(UTC로 간주, `T` 대신 공백 허용)
///   또는 `YYYY-MM-DD` 날짜
///
/// # Returns
/// * `Option<DateTime<Utc>>` - 변환된 시각 (해석 불가 시 None)
pub fn parse_time(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Some(naive) = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
    {
        return Some(Utc.from_utc_datetime(&naive));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn deserialize_time<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    match RawTime::deserialize(deserializer)? {
        RawTime::Millis(ms) => DateTime::from_timestamp_millis(ms)
            .ok_or_else(|| serde::de::Error::custom(format!("범위를 벗어난 시각: {}", ms))),
        RawTime::Text(text) => parse_time(&text)
            .ok_or_else(|| serde::de::Error::custom(format!("시각 형식 오류: {}", text))),
    }
}

fn deserialize_volume<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

/// 지표 출력의 한 점
///
/// `value`가 None이면 아직 정의되지 않은 구간입니다 (예: 이동평균 윈도우가 채워지기 전).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorPoint {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub time: DateTime<Utc>,
    pub value: Option<f64>,
}

impl IndicatorPoint {
    pub fn new(time: DateTime<Utc>, value: Option<f64>) -> Self {
        IndicatorPoint { time, value }
    }
}

/// 차트에 바로 그릴 수 있는 이름/색상이 붙은 지표 시계열
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSeries {
    pub name: String,
    pub points: Vec<IndicatorPoint>,
    pub color: String,
}

impl IndicatorSeries {
    pub fn new(name: impl Into<String>, points: Vec<IndicatorPoint>, color: impl Into<String>) -> Self {
        IndicatorSeries {
            name: name.into(),
            points,
            color: color.into(),
        }
    }

    /// 값만 추출 (테스트 및 후처리용)
    pub fn values(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.value).collect()
    }
}

/// 입력 시계열의 각 캔들 시각에 값을 붙여 출력 시계열을 만듭니다.
///
/// 출력 길이와 시간 정렬은 입력과 동일합니다.
pub(crate) fn align_points<C: Candle>(data: &[C], values: Vec<Option<f64>>) -> Vec<IndicatorPoint> {
    data.iter()
        .zip(values)
        .map(|(candle, value)| IndicatorPoint::new(candle.datetime(), value))
        .collect()
}
