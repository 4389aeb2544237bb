//! 연간 VWAP 추세 스캐너
//!
//! 일봉 시계열에서 연도별 VWAP을 구하고, 최근 연도의 VWAP과 직전 몇 해의 연말 종가를 비교해
//! 상승(rise)/하락(decline) 추세 종목을 분류합니다. 데이터 다운로드와 파일 내보내기는 호출자 몫입니다.

use crate::model::Candle;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;

/// 스캐너 설정
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct ScanConfig {
    /// 비교할 직전 연도 수
    pub lookback_years: usize,
    /// 필요한 최소 연도 수 (최근 연도 포함)
    pub min_years: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            lookback_years: 4,
            min_years: 5,
        }
    }
}

/// 추세 방향
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Rise,
    Decline,
}

impl Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trend::Rise => write!(f, "↑ Rising"),
            Trend::Decline => write!(f, "↓ Declining"),
        }
    }
}

/// 한 해의 VWAP
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct YearlyVwap {
    pub year: i32,
    pub vwap: f64,
}

/// 스캔 결과 한 건
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ScanHit {
    pub symbol: String,
    pub current_year: i32,
    pub current_year_vwap: f64,
    pub last_price: f64,
    /// 최근 연도부터 거슬러 올라간 직전 연도들의 마지막 종가
    pub previous_closes: Vec<f64>,
    pub trend: Trend,
}

/// 종목 전체 스캔 결과
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct ScanReport {
    pub rise: Vec<ScanHit>,
    pub decline: Vec<ScanHit>,
}

impl ScanReport {
    /// 상승 종목 다음에 하락 종목
    pub fn all(&self) -> impl Iterator<Item = &ScanHit> {
        self.rise.iter().chain(self.decline.iter())
    }
}

/// 백테스트에서 찾은 연도별 돌파 구간
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct BacktestOccurrence {
    pub year: i32,
    pub trend: Trend,
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_price: f64,
    pub end_price: f64,
    pub percent_change: f64,
}

/// 종목별 백테스트 요약
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct BacktestSummary {
    pub symbol: String,
    pub occurrences: usize,
    pub details: Vec<BacktestOccurrence>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 연도별 캔들 묶음 (연도 오름차순, 연도 안에서는 입력 순서 유지)
fn group_by_year<C: Candle>(data: &[C]) -> BTreeMap<i32, Vec<&C>> {
    data.iter().fold(BTreeMap::new(), |mut years, candle| {
        years
            .entry(candle.datetime().year())
            .or_insert_with(Vec::new)
            .push(candle);
        years
    })
}

fn last_close<C: Candle>(candles: &[&C]) -> Option<f64> {
    candles.last().map(|c| c.close_price())
}

/// 연도별 VWAP 계산
///
/// 거래량 합계가 0인 연도는 제외합니다.
pub fn yearly_vwaps<C: Candle>(data: &[C]) -> Vec<YearlyVwap> {
    group_by_year(data)
        .into_iter()
        .filter_map(|(year, candles)| {
            let (pv, volume) = candles.iter().fold((0.0, 0.0), |(pv, vol), c| {
                (pv + c.typical_price() * c.volume(), vol + c.volume())
            });
            (volume > 0.0).then(|| YearlyVwap {
                year,
                vwap: pv / volume,
            })
        })
        .collect()
}

/// 한 종목 스캔
///
/// 최근 연도 VWAP보다 마지막 종가가 높고, 직전 `lookback_years`년의 연말 종가가
/// 모두 VWAP보다 높으면 `Decline`, 모두 낮으면 `Rise`입니다.
///
/// # Returns
/// * `Option<ScanHit>` - 조건을 만족하지 않거나 데이터가 부족하면 None
pub fn scan_series<C: Candle>(symbol: &str, data: &[C], config: &ScanConfig) -> Option<ScanHit> {
    let vwaps = yearly_vwaps(data)
        .into_iter()
        .map(|y| (y.year, y.vwap))
        .collect::<BTreeMap<_, _>>();
    if vwaps.len() < config.min_years {
        log::debug!("{}: 연도 데이터 부족 ({}년)", symbol, vwaps.len());
        return None;
    }

    let (&latest_year, &current_vwap) = vwaps.iter().next_back()?;
    let previous_years = (1..=config.lookback_years as i32)
        .map(|offset| latest_year - offset)
        .collect::<Vec<_>>();
    if !previous_years.iter().all(|year| vwaps.contains_key(year)) {
        log::debug!("{}: 직전 연도 누락", symbol);
        return None;
    }

    let years = group_by_year(data);
    let previous_closes = previous_years
        .iter()
        .map(|year| years.get(year).and_then(|candles| last_close(candles)))
        .collect::<Option<Vec<_>>>()?;
    let last_price = years.get(&latest_year).and_then(|candles| last_close(candles))?;

    if last_price <= current_vwap {
        return None;
    }

    let trend = if previous_closes.iter().all(|close| *close > current_vwap) {
        Trend::Decline
    } else if previous_closes.iter().all(|close| *close < current_vwap) {
        Trend::Rise
    } else {
        return None;
    };

    log::info!("{}: {:?} (VWAP {:.2})", symbol, trend, current_vwap);
    Some(ScanHit {
        symbol: symbol.to_string(),
        current_year: latest_year,
        current_year_vwap: round2(current_vwap),
        last_price: round2(last_price),
        previous_closes: previous_closes.into_iter().map(round2).collect(),
        trend,
    })
}

/// 여러 종목 스캔
pub fn scan_universe<C: Candle>(universe: &[(String, Vec<C>)], config: &ScanConfig) -> ScanReport {
    universe
        .iter()
        .filter_map(|(symbol, data)| scan_series(symbol, data, config))
        .fold(ScanReport::default(), |mut report, hit| {
            match hit.trend {
                Trend::Rise => report.rise.push(hit),
                Trend::Decline => report.decline.push(hit),
            }
            report
        })
}

/// 연도별 VWAP 돌파 백테스트
///
/// 직전 `lookback_years`개 연도가 있는 각 연도에 대해, 그 해 VWAP이 직전 연도들의 연말 종가보다
/// 모두 높을 때 종가가 처음으로 VWAP을 넘은 날을 진입일로 보고 그 해 마지막 종가까지의 수익률을 구합니다.
pub fn backtest_series<C: Candle>(
    symbol: &str,
    data: &[C],
    config: &ScanConfig,
) -> Vec<BacktestOccurrence> {
    let vwaps = yearly_vwaps(data);
    let years = group_by_year(data);
    let lookback = config.lookback_years;

    (lookback..vwaps.len())
        .filter_map(|i| {
            let current = vwaps[i];
            let candles = years.get(&current.year)?;
            let previous_closes = vwaps[i - lookback..i]
                .iter()
                .map(|prev| years.get(&prev.year).and_then(|c| last_close(c)))
                .collect::<Option<Vec<_>>>()?;

            if !previous_closes.iter().all(|close| current.vwap > *close) {
                return None;
            }
            let breakout = candles.iter().find(|c| c.close_price() > current.vwap)?;
            let end = candles.last()?;

            let start_price = breakout.close_price();
            let end_price = end.close_price();
            Some(BacktestOccurrence {
                year: current.year,
                trend: Trend::Rise,
                symbol: symbol.to_string(),
                start_date: breakout.datetime().date_naive(),
                end_date: end.datetime().date_naive(),
                start_price: round2(start_price),
                end_price: round2(end_price),
                percent_change: round2((end_price - start_price) / start_price * 100.0),
            })
        })
        .collect()
}

/// 여러 종목 백테스트 (돌파가 한 번도 없는 종목은 제외)
pub fn backtest_universe<C: Candle>(
    universe: &[(String, Vec<C>)],
    config: &ScanConfig,
) -> Vec<BacktestSummary> {
    universe
        .iter()
        .filter_map(|(symbol, data)| {
            let details = backtest_series(symbol, data, config);
            (!details.is_empty()).then(|| BacktestSummary {
                symbol: symbol.clone(),
                occurrences: details.len(),
                details,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Ohlcv;
    use chrono::{TimeZone, Utc};

    fn day(year: i32, month: u32, d: u32, close: f64, volume: f64) -> Ohlcv {
        let time = Utc.with_ymd_and_hms(year, month, d, 0, 0, 0).unwrap();
        Ohlcv::new(time, close, close, close, close, volume)
    }

    #[test]
    fn test_yearly_vwap_weighted() {
        let data = vec![
            day(2020, 1, 2, 10.0, 1.0),
            day(2020, 6, 1, 20.0, 3.0),
            day(2021, 1, 4, 5.0, 0.0),
        ];
        let vwaps = yearly_vwaps(&data);
        assert_eq!(vwaps, vec![YearlyVwap { year: 2020, vwap: 17.5 }]);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(123.456), 123.46);
        assert_eq!(round2(-1.234), -1.23);
    }

    #[test]
    fn test_trend_display() {
        assert_eq!(Trend::Rise.to_string(), "↑ Rising");
        assert_eq!(Trend::Decline.to_string(), "↓ Declining");
    }
}
