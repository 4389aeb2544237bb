use crate::indicator::TABuilder;
use crate::model::{Candle, IndicatorPoint, IndicatorSeries};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::marker::PhantomData;

/// 하루치 캔들 요약 (고가 최대, 저가 최소, 마지막 종가)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DaySummary {
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl DaySummary {
    fn merge(self, high: f64, low: f64, close: f64) -> Self {
        DaySummary {
            high: self.high.max(high),
            low: self.low.min(low),
            close,
        }
    }
}

/// 피벗 포인트와 CPR(Central Pivot Range) 레벨
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PivotLevels {
    pub pivot: f64,
    pub s1: f64,
    pub r1: f64,
    pub s2: f64,
    pub r2: f64,
    /// CPR 하단
    pub bc: f64,
    /// CPR 상단
    pub tc: f64,
}

impl Display for PivotLevels {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Pivot({:.2}) S1({:.2}) R1({:.2}) S2({:.2}) R2({:.2}) BC({:.2}) TC({:.2})",
            self.pivot, self.s1, self.r1, self.s2, self.r2, self.bc, self.tc
        )
    }
}

impl PivotLevels {
    /// 기준일 요약으로부터 레벨 계산
    pub fn from_summary(day: &DaySummary) -> Self {
        let DaySummary { high, low, close } = *day;
        let pivot = (high + low + close) / 3.0;
        let bc = (high + low) / 2.0;

        PivotLevels {
            pivot,
            s1: 2.0 * pivot - high,
            r1: 2.0 * pivot - low,
            s2: pivot - (high - low),
            r2: pivot + (high - low),
            bc,
            tc: pivot + (pivot - bc),
        }
    }

    /// 차트 표시 순서대로 (이름, 값, 색상)
    pub fn lines(&self) -> [(&'static str, f64, &'static str); 7] {
        [
            ("Pivot", self.pivot, "#FFA500"),
            ("S1", self.s1, "#FF6347"),
            ("R1", self.r1, "#9ACD32"),
            ("S2", self.s2, "#FF4500"),
            ("R2", self.r2, "#32CD32"),
            ("BC (CPR Bottom)", self.bc, "#00CED1"),
            ("TC (CPR Top)", self.tc, "#20B2AA"),
        ]
    }
}

/// UTC 날짜별 요약 (날짜 오름차순)
pub fn group_by_day<C: Candle>(data: &[C]) -> BTreeMap<NaiveDate, DaySummary> {
    data.iter().fold(BTreeMap::new(), |mut days, candle| {
        let (high, low, close) = (candle.high_price(), candle.low_price(), candle.close_price());
        days.entry(candle.datetime().date_naive())
            .and_modify(|summary: &mut DaySummary| *summary = summary.merge(high, low, close))
            .or_insert(DaySummary { high, low, close });
        days
    })
}

/// 직전 완료일(끝에서 두 번째 날짜) 기준 피벗 레벨
///
/// 마지막 날짜는 진행 중일 수 있으므로 사용하지 않습니다.
/// 날짜가 2개 미만이면 None입니다.
pub fn calculate_pivot_levels<C: Candle>(data: &[C]) -> Option<PivotLevels> {
    let days = group_by_day(data);
    if days.len() < 2 {
        log::debug!("피벗 계산 불가: 날짜 그룹 {}개", days.len());
        return None;
    }

    days.values()
        .rev()
        .nth(1)
        .map(PivotLevels::from_summary)
}

/// 피벗/CPR 수평선 7개 생성
///
/// 각 선은 전체 구간의 최소/최대 시각 두 점을 잇는 고정값 선입니다.
/// 날짜가 2개 미만이면 빈 목록을 반환합니다.
pub fn calculate_pivot_cpr<C: Candle>(data: &[C]) -> Vec<IndicatorSeries> {
    let Some(levels) = calculate_pivot_levels(data) else {
        return Vec::new();
    };
    let Some((start, end)) = time_range(data) else {
        return Vec::new();
    };

    levels
        .lines()
        .iter()
        .map(|(name, value, color)| {
            IndicatorSeries::new(
                *name,
                vec![
                    IndicatorPoint::new(start, Some(*value)),
                    IndicatorPoint::new(end, Some(*value)),
                ],
                *color,
            )
        })
        .collect()
}

fn time_range<C: Candle>(data: &[C]) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = data.iter().map(|c| c.datetime()).min()?;
    let end = data.iter().map(|c| c.datetime()).max()?;
    Some((start, end))
}

/// 피벗/CPR 빌더
#[derive(Debug, Default)]
pub struct PivotBuilder<C: Candle> {
    _phantom: PhantomData<C>,
}

impl<C> PivotBuilder<C>
where
    C: Candle,
{
    pub fn new() -> Self {
        PivotBuilder {
            _phantom: PhantomData,
        }
    }
}

impl<C> TABuilder<Vec<IndicatorSeries>, C> for PivotBuilder<C>
where
    C: Candle,
{
    fn build(&self, data: &[C]) -> Vec<IndicatorSeries> {
        calculate_pivot_cpr(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Ohlcv;
    use chrono::TimeZone;

    fn candle(day: u32, hour: u32, high: f64, low: f64, close: f64) -> Ohlcv {
        let time = Utc.with_ymd_and_hms(2024, 7, day, hour, 0, 0).unwrap();
        Ohlcv::new(time, close, high, low, close, 100.0)
    }

    #[test]
    fn test_levels_from_previous_day() {
        let data = vec![
            candle(1, 9, 105.0, 95.0, 98.0),
            candle(1, 15, 110.0, 90.0, 100.0),
            candle(2, 9, 130.0, 120.0, 125.0),
        ];
        let levels = calculate_pivot_levels(&data).unwrap();

        assert_eq!(levels.pivot, 100.0);
        assert_eq!(levels.s1, 90.0);
        assert_eq!(levels.r1, 110.0);
        assert_eq!(levels.s2, 80.0);
        assert_eq!(levels.r2, 120.0);
        assert_eq!(levels.bc, 100.0);
        assert_eq!(levels.tc, 100.0);
    }

    #[test]
    fn test_uses_second_to_last_day() {
        let data = vec![
            candle(1, 9, 50.0, 40.0, 45.0),
            candle(2, 9, 110.0, 90.0, 100.0),
            candle(3, 9, 200.0, 190.0, 195.0),
        ];
        assert_eq!(calculate_pivot_levels(&data).unwrap().pivot, 100.0);
    }

    #[test]
    fn test_single_day_is_empty() {
        let data = vec![candle(1, 9, 110.0, 90.0, 100.0), candle(1, 10, 111.0, 91.0, 101.0)];
        assert!(calculate_pivot_levels(&data).is_none());
        assert!(calculate_pivot_cpr(&data).is_empty());
        assert!(calculate_pivot_cpr::<Ohlcv>(&[]).is_empty());
    }

    #[test]
    fn test_lines_span_full_range() {
        let data = vec![candle(1, 9, 110.0, 90.0, 100.0), candle(2, 15, 120.0, 100.0, 110.0)];
        let lines = PivotBuilder::<Ohlcv>::new().build(&data);

        let names: Vec<_> = lines.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Pivot", "S1", "R1", "S2", "R2", "BC (CPR Bottom)", "TC (CPR Top)"]
        );
        for line in &lines {
            assert_eq!(line.points.len(), 2);
            assert_eq!(line.points[0].time, data[0].time);
            assert_eq!(line.points[1].time, data[1].time);
            assert_eq!(line.points[0].value, line.points[1].value);
        }
        assert_eq!(lines[0].color, "#FFA500");
    }
}
