//! 티커 시계열 차트 명령.
//!
//! 조회 → 정규화 → `date` 열 생성 → 시계열 선택 → 렌더링.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use ticker_analytics::{
    series_from_table, ChartError, ChartRenderer, HtmlRenderer, LineChart, SvgRenderer,
};
use ticker_core::{columns, ChartConfig, Event, Table};
use ticker_data::{normalize_label, PriceSource};
use tracing::info;

use super::fetch_prepared;

/// 차트로 그릴 수 있는 시계열.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesField {
    /// 조정 종가
    AdjClose,
    /// 종가
    Close,
    /// 고가
    High,
    /// 저가
    Low,
    /// 시가
    Open,
    /// 거래량
    Volume,
}

impl SeriesField {
    pub const ALL: [SeriesField; 6] = [
        SeriesField::AdjClose,
        SeriesField::Close,
        SeriesField::High,
        SeriesField::Low,
        SeriesField::Open,
        SeriesField::Volume,
    ];

    /// 정규화된 열 이름.
    pub fn column_name(&self) -> &'static str {
        match self {
            SeriesField::AdjClose => columns::ADJ_CLOSE,
            SeriesField::Close => columns::CLOSE,
            SeriesField::High => columns::HIGH,
            SeriesField::Low => columns::LOW,
            SeriesField::Open => columns::OPEN,
            SeriesField::Volume => columns::VOLUME,
        }
    }
}

impl FromStr for SeriesField {
    type Err = String;

    /// `"Adj Close"`처럼 정규화 전 이름도 허용합니다.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = normalize_label(s);
        Self::ALL
            .into_iter()
            .find(|f| f.column_name() == label)
            .ok_or_else(|| {
                format!(
                    "Invalid series: {}. Supported: adj_close, close, high, low, open, volume",
                    s
                )
            })
    }
}

impl fmt::Display for SeriesField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// 차트 요청.
#[derive(Debug, Clone)]
pub struct PlotRequest {
    pub ticker: String,
    pub series: SeriesField,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// 표시할 이벤트 (비어 있으면 세로선 없음)
    pub events: Vec<Event>,
    /// HTML 대화형 차트 여부
    pub interactive: bool,
    /// 저장 경로 (없으면 렌더링 결과 반환)
    pub output: Option<PathBuf>,
}

/// 차트 명령 결과.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlotOutput {
    /// 파일로 저장됨
    Saved(PathBuf),
    /// 렌더링된 문서
    Rendered(String),
}

/// 준비된 테이블에서 차트 정의를 만듭니다.
///
/// X축 레이블은 `date`, Y축 레이블과 제목은 시계열 이름입니다.
pub fn build_chart(
    table: &Table,
    series: SeriesField,
    events: Vec<Event>,
) -> Result<LineChart, ChartError> {
    let name = series.column_name();
    let points = series_from_table(table, columns::DATE, name)?;

    Ok(LineChart::new(name, points)
        .with_labels(columns::DATE, name)
        .with_events(events))
}

/// 출력 형식에 맞는 렌더러.
pub fn renderer(interactive: bool, config: &ChartConfig) -> Box<dyn ChartRenderer> {
    if interactive {
        Box::new(HtmlRenderer::from_config(config))
    } else {
        Box::new(SvgRenderer::from_config(config))
    }
}

/// 티커 시계열을 조회해 차트를 렌더링합니다.
pub async fn plot_ticker(
    source: &dyn PriceSource,
    request: &PlotRequest,
    config: &ChartConfig,
) -> Result<PlotOutput> {
    let table = fetch_prepared(source, &request.ticker, request.start, request.end).await?;

    let chart = build_chart(&table, request.series, request.events.clone())
        .with_context(|| format!("Failed to build {} chart", request.series))?;
    let renderer = renderer(request.interactive, config);

    match &request.output {
        Some(path) => {
            renderer
                .render_to_file(&chart, path)
                .with_context(|| format!("Failed to save chart to {}", path.display()))?;
            info!(ticker = %request.ticker, series = %request.series, "chart saved");
            Ok(PlotOutput::Saved(path.clone()))
        }
        None => {
            let rendered = renderer.render(&chart).context("Failed to render chart")?;
            Ok(PlotOutput::Rendered(rendered))
        }
    }
}
