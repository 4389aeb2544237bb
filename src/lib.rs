pub mod candle_store;
pub mod chart;
pub mod config;
pub mod error;
pub mod indicator;
pub mod model;
pub mod registry;
pub mod scan;

/// 설정 로더
pub mod config_loader;

pub use chart::Chart;
pub use config::EngineConfig;
pub use error::{ConfigError, IndicatorError};
pub use model::{Candle, IndicatorPoint, IndicatorSeries, Ohlcv};
pub use registry::{IndicatorKind, IndicatorRegistry};
