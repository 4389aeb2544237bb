use crate::indicator::bucket::{BucketKey, Timeframe, bucket_key};
use crate::indicator::{TABuilder, TAs, TAsBuilder};
use crate::model::{Candle, IndicatorPoint, IndicatorSeries};
use std::fmt::Display;
use std::marker::PhantomData;

/// VWAP(거래량가중평균가격) 매개변수
///
/// 누적 합계를 초기화할 캘린더 구간 단위를 지정합니다.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub struct VWAPParams {
    /// 누적 구간 단위
    pub timeframe: Timeframe,
}

impl Display for VWAPParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VWAP ({})", self.timeframe)
    }
}

impl VWAPParams {
    pub fn new(timeframe: Timeframe) -> Self {
        VWAPParams { timeframe }
    }

    /// 차트 표시 색상
    pub fn color(&self) -> &'static str {
        match self.timeframe {
            Timeframe::Day => "red",
            Timeframe::Week => "green",
            Timeframe::Month => "purple",
            Timeframe::Quarter => "orange",
            Timeframe::Year => "red",
        }
    }
}

/// VWAP 누적 상태
///
/// 현재 버킷 키와 `Σ(대표가격 × 거래량)`, `Σ거래량`을 들고 다닙니다.
/// 버킷 키가 바뀌면 현재 캔들을 더하기 전에 두 합계를 0으로 되돌립니다.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VwapAccumulator {
    bucket: Option<BucketKey>,
    cumulative_pv: f64,
    cumulative_volume: f64,
}

impl VwapAccumulator {
    /// 한 캔들을 누적하고 현재 VWAP을 계산합니다.
    ///
    /// # Arguments
    /// * `key` - 캔들의 버킷 키
    /// * `typical_price` - 대표가격
    /// * `volume` - 거래량
    ///
    /// # Returns
    /// * `(VwapAccumulator, Option<f64>)` - 다음 상태와 VWAP (누적 거래량이 0이면 None)
    pub fn step(self, key: BucketKey, typical_price: f64, volume: f64) -> (Self, Option<f64>) {
        let (cumulative_pv, cumulative_volume) = if self.bucket.as_ref() == Some(&key) {
            (self.cumulative_pv, self.cumulative_volume)
        } else {
            log::trace!("VWAP 구간 초기화: {}", key);
            (0.0, 0.0)
        };

        let next = VwapAccumulator {
            bucket: Some(key),
            cumulative_pv: cumulative_pv + typical_price * volume,
            cumulative_volume: cumulative_volume + volume,
        };
        let value = next.value();
        (next, value)
    }

    /// 현재 누적 VWAP
    pub fn value(&self) -> Option<f64> {
        if self.cumulative_volume == 0.0 {
            None
        } else {
            Some(self.cumulative_pv / self.cumulative_volume)
        }
    }
}

/// 구간별로 초기화되는 누적 VWAP 시계열 계산
///
/// 출력은 입력과 같은 길이/시각을 갖습니다.
///
/// # Arguments
/// * `data` - 시간 오름차순 캔들 데이터
/// * `timeframe` - 누적 구간 단위
pub fn calculate_vwap<C: Candle>(data: &[C], timeframe: Timeframe) -> Vec<IndicatorPoint> {
    let (_, points) = data.iter().fold(
        (VwapAccumulator::default(), Vec::with_capacity(data.len())),
        |(acc, mut points), candle| {
            let key = bucket_key(candle.datetime(), timeframe);
            let (acc, value) = acc.step(key, candle.typical_price(), candle.volume());
            points.push(IndicatorPoint::new(candle.datetime(), value));
            (acc, points)
        },
    );
    points
}

/// VWAP 빌더
#[derive(Debug)]
pub struct VWAPBuilder<C: Candle> {
    params: VWAPParams,
    _phantom: PhantomData<C>,
}

impl<C> VWAPBuilder<C>
where
    C: Candle,
{
    pub fn new(params: VWAPParams) -> Self {
        Self {
            params,
            _phantom: PhantomData,
        }
    }

    pub fn params(&self) -> VWAPParams {
        self.params
    }
}

impl<C> TABuilder<Vec<IndicatorPoint>, C> for VWAPBuilder<C>
where
    C: Candle,
{
    fn build(&self, data: &[C]) -> Vec<IndicatorPoint> {
        calculate_vwap(data, self.params.timeframe)
    }
}

/// 단위별 VWAP 컬렉션
pub type VWAPs = TAs<VWAPParams, Vec<IndicatorPoint>>;
pub type VWAPsBuilder<C> = TAsBuilder<VWAPParams, Vec<IndicatorPoint>, C>;

/// 단위별 VWAP을 `VWAP (day)` 같은 이름과 색상이 붙은 차트 시계열로 변환
impl<C> TABuilder<Vec<IndicatorSeries>, C> for VWAPsBuilder<C>
where
    C: Candle,
{
    fn build(&self, data: &[C]) -> Vec<IndicatorSeries> {
        TAsBuilder::build(self, data)
            .iter()
            .map(|(params, points)| {
                IndicatorSeries::new(params.to_string(), points.clone(), params.color())
            })
            .collect()
    }
}

/// 다중 단위 VWAP 빌더 팩토리
pub struct VWAPsBuilderFactory;

impl VWAPsBuilderFactory {
    pub fn build<C: Candle + 'static>(timeframes: &[Timeframe]) -> VWAPsBuilder<C> {
        let params_list = timeframes
            .iter()
            .map(|tf| VWAPParams::new(*tf))
            .collect::<Vec<_>>();
        VWAPsBuilder::new("vwaps".to_owned(), &params_list, |params| {
            Box::new(VWAPBuilder::<C>::new(*params))
        })
    }

    /// 일/주/월/분기/연 VWAP 전체
    pub fn build_default<C: Candle + 'static>() -> VWAPsBuilder<C> {
        Self::build::<C>(&Timeframe::ALL)
    }
}
