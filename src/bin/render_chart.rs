use chart_indicators::candle_store::CandleStore;
use chart_indicators::config_loader::{ConfigFormat, ConfigLoader};
use chart_indicators::scan::{backtest_universe, scan_universe};
use chart_indicators::{Chart, EngineConfig, IndicatorRegistry, Ohlcv};
use log::{debug, error, info, warn};
use serde::Serialize;
use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const USAGE: &str = "사용법: render_chart <chart|scan|backtest> <시계열.json|디렉터리> [설정_파일_경로]";

fn main() -> ExitCode {
    // 로그 초기화
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    debug!("커맨드 라인 인수: {:?}", args);

    if args.len() < 3 {
        error!("인수가 충분하지 않습니다.");
        println!("{}", USAGE);
        return ExitCode::FAILURE;
    }

    let input = PathBuf::from(&args[2]);
    let config = match args.get(3) {
        Some(path) => match ConfigLoader::load_from_file::<EngineConfig>(Path::new(path), ConfigFormat::Auto) {
            Ok(config) => config,
            Err(err) => {
                println!("설정 로드 실패: {}", err);
                return ExitCode::FAILURE;
            }
        },
        None => {
            debug!("기본 설정 사용");
            EngineConfig::default()
        }
    };

    let result = match args[1].as_str() {
        "chart" => render_chart(&input, &config),
        "scan" => load_universe(&input).and_then(|universe| {
            print_json(&scan_universe(&universe, &config.scan))
        }),
        "backtest" => load_universe(&input).and_then(|universe| {
            print_json(&backtest_universe(&universe, &config.scan))
        }),
        other => {
            println!("지원되지 않는 명령: {}", other);
            println!("{}", USAGE);
            return ExitCode::FAILURE;
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            error!("{}", msg);
            println!("{}", msg);
            ExitCode::FAILURE
        }
    }
}

fn render_chart(path: &Path, config: &EngineConfig) -> Result<(), String> {
    let candles = load_series(path)?;
    let registry = IndicatorRegistry::<Ohlcv>::new(config).map_err(|e| e.to_string())?;

    info!(
        "차트 생성: {} ({}개 캔들, 지표 {:?})",
        path.display(),
        candles.len(),
        config.indicators
    );
    print_json(&Chart::build(&registry, &config.indicators, &candles))
}

/// JSON 배열 파일을 읽어 시간 오름차순/중복 제거된 캔들 목록으로 변환
fn load_series(path: &Path) -> Result<Vec<Ohlcv>, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("파일 읽기 실패: {} - {}", path.display(), e))?;
    let rows: Vec<Ohlcv> = serde_json::from_str(&content)
        .map_err(|e| format!("시계열 파싱 실패: {} - {}", path.display(), e))?;

    let count = rows.len();
    let store = CandleStore::new(rows, usize::MAX);
    if store.len() != count {
        warn!("{}: 중복 시각 {}개 제거됨", path.display(), count - store.len());
    }
    Ok(store.into_items())
}

/// 디렉터리의 `*.json` 파일을 종목별 시계열로 읽습니다 (파일 이름 = 종목 코드).
fn load_universe(dir: &Path) -> Result<Vec<(String, Vec<Ohlcv>)>, String> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| format!("디렉터리 읽기 실패: {} - {}", dir.display(), e))?;

    let mut paths = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("json"))
        .collect::<Vec<_>>();
    paths.sort();

    let mut universe = Vec::with_capacity(paths.len());
    for path in paths {
        let Some(symbol) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        match load_series(&path) {
            Ok(series) => universe.push((symbol.to_string(), series)),
            Err(msg) => warn!("종목 건너뜀: {}", msg),
        }
    }

    info!("{}개 종목 로드", universe.len());
    Ok(universe)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value).map_err(|e| format!("JSON 직렬화 실패: {}", e))?;
    println!("{}", json);
    Ok(())
}
