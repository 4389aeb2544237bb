use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// 누적 집계 구간(캘린더 버킷) 단위
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    /// 일 (UTC 날짜)
    #[default]
    Day,
    /// ISO-8601 주 (월요일 시작)
    Week,
    /// 월
    Month,
    /// 분기
    Quarter,
    /// 연
    Year,
}

impl Timeframe {
    /// 지원하는 모든 단위 (짧은 구간부터)
    pub const ALL: [Timeframe; 5] = [
        Timeframe::Day,
        Timeframe::Week,
        Timeframe::Month,
        Timeframe::Quarter,
        Timeframe::Year,
    ];

    /// 문자열에서 단위 해석
    ///
    /// 알 수 없는 값은 `Day`로 처리합니다.
    pub fn parse_or_day(value: &str) -> Timeframe {
        match value.trim().to_ascii_lowercase().as_str() {
            "week" => Timeframe::Week,
            "month" => Timeframe::Month,
            "quarter" => Timeframe::Quarter,
            "year" => Timeframe::Year,
            _ => Timeframe::Day,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Day => "day",
            Timeframe::Week => "week",
            Timeframe::Month => "month",
            Timeframe::Quarter => "quarter",
            Timeframe::Year => "year",
        }
    }
}

impl Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 캘린더 버킷 식별자
///
/// 키가 같으면 같은 누적 구간입니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BucketKey(String);

impl BucketKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for BucketKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// 시각과 단위로부터 버킷 키를 계산합니다.
///
/// * `day` - `YYYY-MM-DD`
/// * `week` - `YYYY-Www` (ISO 주차 연도 기준, 1주차는 그 해 첫 목요일을 포함하는 주)
/// * `month` - `YYYY-MM`
/// * `quarter` - `YYYY-Qn`
/// * `year` - `YYYY`
pub fn bucket_key(time: DateTime<Utc>, timeframe: Timeframe) -> BucketKey {
    let key = match timeframe {
        Timeframe::Day => time.format("%Y-%m-%d").to_string(),
        Timeframe::Week => {
            // 달력 연도가 아닌 ISO 주차 연도를 씀. 기존 차트는 달력 연도를 붙여 새해 첫날 주 중간에 초기화됐음
            let week = time.iso_week();
            format!("{:04}-W{:02}", week.year(), week.week())
        }
        Timeframe::Month => format!("{:04}-{:02}", time.year(), time.month()),
        Timeframe::Quarter => format!("{:04}-Q{}", time.year(), time.month0() / 3 + 1),
        Timeframe::Year => format!("{:04}", time.year()),
    };
    BucketKey(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 10, 30, 0).unwrap()
    }

    #[test]
    fn test_day_month_quarter_year_keys() {
        let t = at(2024, 8, 7);
        assert_eq!(bucket_key(t, Timeframe::Day).as_str(), "2024-08-07");
        assert_eq!(bucket_key(t, Timeframe::Month).as_str(), "2024-08");
        assert_eq!(bucket_key(t, Timeframe::Quarter).as_str(), "2024-Q3");
        assert_eq!(bucket_key(t, Timeframe::Year).as_str(), "2024");
    }

    #[test]
    fn test_quarter_boundaries() {
        assert_eq!(bucket_key(at(2024, 3, 31), Timeframe::Quarter).as_str(), "2024-Q1");
        assert_eq!(bucket_key(at(2024, 4, 1), Timeframe::Quarter).as_str(), "2024-Q2");
        assert_eq!(bucket_key(at(2024, 12, 31), Timeframe::Quarter).as_str(), "2024-Q4");
    }

    #[test]
    fn test_iso_week_keys() {
        // 2021-01-01은 금요일이므로 2020년 53주차
        assert_eq!(bucket_key(at(2021, 1, 1), Timeframe::Week).as_str(), "2020-W53");
        assert_eq!(bucket_key(at(2021, 1, 4), Timeframe::Week).as_str(), "2021-W01");
        // 2024-12-30(월)은 2025년 1주차
        assert_eq!(bucket_key(at(2024, 12, 30), Timeframe::Week).as_str(), "2025-W01");
        assert_eq!(
            bucket_key(at(2024, 12, 30), Timeframe::Week),
            bucket_key(at(2025, 1, 5), Timeframe::Week)
        );
    }

    #[test]
    fn test_week_starts_on_monday() {
        let sunday = bucket_key(at(2024, 8, 11), Timeframe::Week);
        let monday = bucket_key(at(2024, 8, 12), Timeframe::Week);
        assert_ne!(sunday, monday);
        assert_eq!(monday.as_str(), "2024-W33");
    }

    #[test]
    fn test_day_key_uses_utc_date() {
        let late = Utc.with_ymd_and_hms(2024, 8, 7, 23, 59, 59).unwrap();
        assert_eq!(bucket_key(late, Timeframe::Day).as_str(), "2024-08-07");
    }

    #[test]
    fn test_unknown_timeframe_falls_back_to_day() {
        assert_eq!(Timeframe::parse_or_day("fortnight"), Timeframe::Day);
        assert_eq!(Timeframe::parse_or_day("Quarter"), Timeframe::Quarter);
    }
}
