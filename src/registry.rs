//! 지표 식별자별 계산기 등록부
//!
//! 식별자 하나가 계산 함수와 표시 정보(라벨, 색상, 오버레이 여부)를 가진 서술자 하나에 대응합니다.
//! 지표를 추가할 때는 서술자를 하나 등록하면 됩니다.

use crate::config::EngineConfig;
use crate::error::IndicatorError;
use crate::indicator::TABuilder;
use crate::indicator::ma::ema::EMABuilder;
use crate::indicator::ma::sma::SMABuilder;
use crate::indicator::pivot::PivotBuilder;
use crate::indicator::rsi::RSIBuilder;
use crate::indicator::vwap::VWAPsBuilderFactory;
use crate::model::{Candle, IndicatorPoint, IndicatorSeries};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::str::FromStr;

/// 선택 가능한 지표 식별자
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorKind {
    VWAP,
    SMA10,
    RSI14,
    EMA20,
    EMA50,
    EMA100,
    EMA200,
    PivotCPR,
}

impl IndicatorKind {
    pub const ALL: [IndicatorKind; 8] = [
        IndicatorKind::VWAP,
        IndicatorKind::SMA10,
        IndicatorKind::RSI14,
        IndicatorKind::EMA20,
        IndicatorKind::EMA50,
        IndicatorKind::EMA100,
        IndicatorKind::EMA200,
        IndicatorKind::PivotCPR,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            IndicatorKind::VWAP => "VWAP",
            IndicatorKind::SMA10 => "SMA10",
            IndicatorKind::RSI14 => "RSI14",
            IndicatorKind::EMA20 => "EMA20",
            IndicatorKind::EMA50 => "EMA50",
            IndicatorKind::EMA100 => "EMA100",
            IndicatorKind::EMA200 => "EMA200",
            IndicatorKind::PivotCPR => "PivotCPR",
        }
    }

    /// 화면 표시용 라벨
    pub fn label(&self) -> &'static str {
        match self {
            IndicatorKind::VWAP => "VWAP",
            IndicatorKind::SMA10 => "SMA 10",
            IndicatorKind::RSI14 => "RSI 14",
            IndicatorKind::EMA20 => "EMA 20",
            IndicatorKind::EMA50 => "EMA 50",
            IndicatorKind::EMA100 => "EMA 100",
            IndicatorKind::EMA200 => "EMA 200",
            IndicatorKind::PivotCPR => "Pivot & CPR",
        }
    }

    /// 가격 차트 위에 겹쳐 그리는지 여부 (RSI는 별도 0-100 축)
    pub fn is_overlay(&self) -> bool {
        !matches!(self, IndicatorKind::RSI14)
    }
}

impl Display for IndicatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for IndicatorKind {
    type Err = IndicatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IndicatorKind::ALL
            .into_iter()
            .find(|kind| kind.id() == s)
            .ok_or_else(|| IndicatorError::UnknownIndicator(s.to_string()))
    }
}

/// 단일 선 지표를 이름/색상이 붙은 시계열 하나로 감싸는 어댑터
#[derive(Debug)]
pub struct LineBuilder<C: Candle> {
    name: String,
    color: String,
    inner: Box<dyn TABuilder<Vec<IndicatorPoint>, C>>,
}

impl<C> LineBuilder<C>
where
    C: Candle,
{
    pub fn new(
        name: impl Into<String>,
        color: impl Into<String>,
        inner: Box<dyn TABuilder<Vec<IndicatorPoint>, C>>,
    ) -> Self {
        LineBuilder {
            name: name.into(),
            color: color.into(),
            inner,
        }
    }
}

impl<C> TABuilder<Vec<IndicatorSeries>, C> for LineBuilder<C>
where
    C: Candle,
{
    fn build(&self, data: &[C]) -> Vec<IndicatorSeries> {
        vec![IndicatorSeries::new(
            self.name.clone(),
            self.inner.build(data),
            self.color.clone(),
        )]
    }
}

/// 지표 서술자 (계산기 + 표시 정보)
pub struct IndicatorDescriptor<C: Candle> {
    pub kind: IndicatorKind,
    pub label: String,
    pub is_overlay: bool,
    builder: Box<dyn TABuilder<Vec<IndicatorSeries>, C>>,
}

impl<C> IndicatorDescriptor<C>
where
    C: Candle,
{
    pub fn new(kind: IndicatorKind, builder: Box<dyn TABuilder<Vec<IndicatorSeries>, C>>) -> Self {
        IndicatorDescriptor {
            kind,
            label: kind.label().to_string(),
            is_overlay: kind.is_overlay(),
            builder,
        }
    }

    /// 이 지표의 시계열 계산
    pub fn compute(&self, data: &[C]) -> Vec<IndicatorSeries> {
        self.builder.build(data)
    }
}

impl<C: Candle> Debug for IndicatorDescriptor<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndicatorDescriptor")
            .field("kind", &self.kind)
            .field("label", &self.label)
            .field("is_overlay", &self.is_overlay)
            .finish()
    }
}

/// 지표 등록부
#[derive(Debug)]
pub struct IndicatorRegistry<C: Candle> {
    keys: Vec<IndicatorKind>,
    descriptors: HashMap<IndicatorKind, IndicatorDescriptor<C>>,
}

impl<C> IndicatorRegistry<C>
where
    C: Candle + 'static,
{
    /// 빈 등록부
    pub fn empty() -> Self {
        IndicatorRegistry {
            keys: Vec::new(),
            descriptors: HashMap::new(),
        }
    }

    /// 기본 지표 8종을 등록한 등록부
    ///
    /// # Arguments
    /// * `config` - VWAP 단위, RSI 점화식, EMA 시드 설정
    pub fn new(config: &EngineConfig) -> Result<Self, IndicatorError> {
        let mut registry = Self::empty();

        registry.register(IndicatorDescriptor::new(
            IndicatorKind::VWAP,
            Box::new(VWAPsBuilderFactory::build::<C>(&config.vwap_timeframes)),
        ));
        registry.register(line(
            IndicatorKind::SMA10,
            "#00E396",
            Box::new(SMABuilder::<C>::new(10)?),
        ));
        registry.register(line(
            IndicatorKind::RSI14,
            "#775DD0",
            Box::new(RSIBuilder::<C>::new(14)?.with_recurrence(config.rsi_recurrence)),
        ));
        for (kind, period, color) in [
            (IndicatorKind::EMA20, 20, "#FF9800"),
            (IndicatorKind::EMA50, 50, "#2196F3"),
            (IndicatorKind::EMA100, 100, "#9C27B0"),
            (IndicatorKind::EMA200, 200, "#009688"),
        ] {
            registry.register(line(
                kind,
                color,
                Box::new(EMABuilder::<C>::new(period)?.with_seed(config.ema_seed)),
            ));
        }
        registry.register(IndicatorDescriptor::new(
            IndicatorKind::PivotCPR,
            Box::new(PivotBuilder::<C>::new()),
        ));

        Ok(registry)
    }

    /// 서술자 등록 (같은 식별자가 있으면 교체)
    pub fn register(&mut self, descriptor: IndicatorDescriptor<C>) {
        let kind = descriptor.kind;
        if self.descriptors.insert(kind, descriptor).is_none() {
            self.keys.push(kind);
        }
    }

    pub fn get(&self, kind: IndicatorKind) -> Option<&IndicatorDescriptor<C>> {
        self.descriptors.get(&kind)
    }

    /// 등록 순서대로 식별자 반환
    pub fn kinds(&self) -> &[IndicatorKind] {
        &self.keys
    }

    /// 선택된 지표를 선택 순서대로 계산합니다.
    ///
    /// 중복 선택은 한 번만 계산하고, 등록되지 않은 지표는 건너뜁니다.
    pub fn compute(&self, selected: &[IndicatorKind], data: &[C]) -> Vec<IndicatorSeries> {
        let mut seen = Vec::with_capacity(selected.len());
        let mut series = Vec::new();

        for kind in selected {
            if seen.contains(kind) {
                continue;
            }
            seen.push(*kind);

            match self.descriptors.get(kind) {
                Some(descriptor) => {
                    log::debug!("지표 계산: {} ({}개 캔들)", kind, data.len());
                    series.extend(descriptor.compute(data));
                }
                None => log::warn!("등록되지 않은 지표: {}", kind),
            }
        }

        series
    }
}

fn line<C: Candle + 'static>(
    kind: IndicatorKind,
    color: &str,
    inner: Box<dyn TABuilder<Vec<IndicatorPoint>, C>>,
) -> IndicatorDescriptor<C> {
    IndicatorDescriptor::new(kind, Box::new(LineBuilder::new(kind.label(), color, inner)))
}
