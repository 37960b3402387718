//! 이벤트 주석 시계열 차트.
//!
//! [`LineChart`]는 렌더링 백엔드와 무관한 차트 정의이고, [`ChartRenderer`]
//! 구현체가 이를 문자열(SVG/HTML)로 만듭니다.
//!
//! # 백엔드
//!
//! - [`SvgRenderer`]: 정적 SVG, 파일로 내보내기용
//! - [`HtmlRenderer`]: 확대/툴팁을 지원하는 단일 HTML 페이지

mod html;
mod svg;

use std::fs;
use std::path::Path;

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use ticker_core::{Event, Table};
use tracing::info;

use crate::error::ChartError;

pub use html::HtmlRenderer;
pub use svg::SvgRenderer;

/// 이벤트 레이블을 세로선 오른쪽으로 띄우는 간격 (일).
pub const EVENT_LABEL_OFFSET_DAYS: i64 = 10;

/// 차트 데이터 포인트.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartPoint {
    /// X축 값
    pub date: NaiveDate,
    /// Y축 값
    pub value: f64,
}

impl ChartPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// 단일 시계열 선 차트 정의.
#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// 범례에 표시할 시계열 이름
    pub series_label: String,
    pub points: Vec<ChartPoint>,
    /// 세로선으로 표시할 이벤트
    pub events: Vec<Event>,
}

impl LineChart {
    /// 제목과 점으로 차트를 생성합니다. 축 레이블과 범례는 제목을 따릅니다.
    pub fn new(title: impl Into<String>, points: Vec<ChartPoint>) -> Self {
        let title = title.into();
        Self {
            x_label: String::new(),
            y_label: title.clone(),
            series_label: title.clone(),
            title,
            points,
            events: Vec::new(),
        }
    }

    /// 축 레이블 (x, y)을 설정합니다.
    pub fn with_labels(mut self, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        self.x_label = x_label.into();
        self.y_label = y_label.into();
        self
    }

    pub fn with_series_label(mut self, label: impl Into<String>) -> Self {
        self.series_label = label.into();
        self
    }

    pub fn with_events(mut self, events: Vec<Event>) -> Self {
        self.events = events;
        self
    }

    /// 시계열 최댓값 (이벤트 레이블 높이).
    pub fn max_value(&self) -> Option<f64> {
        self.points
            .iter()
            .map(|p| p.value)
            .fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.max(v))))
    }
}

/// 차트 렌더링 백엔드.
pub trait ChartRenderer {
    /// 차트를 문자열로 렌더링합니다.
    fn render(&self, chart: &LineChart) -> Result<String, ChartError>;

    /// 출력 파일 확장자.
    fn extension(&self) -> &'static str;

    /// 렌더링 결과를 파일로 저장합니다.
    fn render_to_file(&self, chart: &LineChart, path: &Path) -> Result<(), ChartError> {
        let rendered = self.render(chart)?;
        fs::write(path, rendered)?;
        info!(path = %path.display(), title = %chart.title, "chart saved");
        Ok(())
    }
}

/// 테이블의 두 열로 차트 점을 만듭니다.
///
/// `x_column`은 날짜 열, `y_column`은 숫자 열이어야 합니다. 어느 한쪽이 결측인
/// 행은 건너뜁니다.
pub fn series_from_table(
    table: &Table,
    x_column: &str,
    y_column: &str,
) -> Result<Vec<ChartPoint>, ChartError> {
    let dates = table.dates(x_column)?;
    let values = table.floats(y_column)?;

    Ok(dates
        .iter()
        .zip(values)
        .filter_map(|(d, v)| Some(ChartPoint::new((*d)?, v?)))
        .collect())
}

/// 데이터 좌표 → 픽셀 좌표 변환.
///
/// X 범위는 시계열과 모든 이벤트 날짜를 포함합니다.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Frame {
    pub width: f64,
    pub height: f64,
    pub x_min: NaiveDate,
    pub x_max: NaiveDate,
    pub y_min: f64,
    pub y_max: f64,
}

impl Frame {
    /// 플롯 영역 여백 (좌, 우, 상, 하).
    pub const MARGIN_LEFT: f64 = 70.0;
    pub const MARGIN_RIGHT: f64 = 30.0;
    pub const MARGIN_TOP: f64 = 50.0;
    pub const MARGIN_BOTTOM: f64 = 60.0;

    pub fn fit(chart: &LineChart, width: u32, height: u32) -> Result<Self, ChartError> {
        let first = chart.points.first().ok_or(ChartError::EmptySeries)?;

        let mut x_min = first.date;
        let mut x_max = first.date;
        let mut y_min = first.value;
        let mut y_max = first.value;
        for p in &chart.points {
            x_min = x_min.min(p.date);
            x_max = x_max.max(p.date);
            y_min = y_min.min(p.value);
            y_max = y_max.max(p.value);
        }
        for event in &chart.events {
            x_min = x_min.min(event.date);
            x_max = x_max.max(event.date);
        }

        // 단일 점/평탄한 구간은 범위를 넓힘
        if x_min == x_max {
            x_min -= Duration::days(1);
            x_max += Duration::days(1);
        }
        if y_min == y_max {
            let pad = if y_min == 0.0 { 1.0 } else { y_min.abs() * 0.1 };
            y_min -= pad;
            y_max += pad;
        }

        Ok(Self {
            width: f64::from(width),
            height: f64::from(height),
            x_min,
            x_max,
            y_min,
            y_max,
        })
    }

    pub fn left(&self) -> f64 {
        Self::MARGIN_LEFT
    }

    pub fn right(&self) -> f64 {
        self.width - Self::MARGIN_RIGHT
    }

    pub fn top(&self) -> f64 {
        Self::MARGIN_TOP
    }

    pub fn bottom(&self) -> f64 {
        self.height - Self::MARGIN_BOTTOM
    }

    pub fn x(&self, date: NaiveDate) -> f64 {
        let span = (self.x_max - self.x_min).num_days() as f64;
        let offset = (date - self.x_min).num_days() as f64;
        self.left() + (self.right() - self.left()) * offset / span
    }

    pub fn y(&self, value: f64) -> f64 {
        let norm = (value - self.y_min) / (self.y_max - self.y_min);
        self.bottom() - (self.bottom() - self.top()) * norm
    }

    /// X축 눈금 날짜 (양 끝 포함 `count`개).
    pub fn x_ticks(&self, count: usize) -> Vec<NaiveDate> {
        let span = (self.x_max - self.x_min).num_days();
        let steps = count.saturating_sub(1).max(1) as i64;
        let mut ticks: Vec<NaiveDate> = (0..=steps)
            .map(|i| self.x_min + Duration::days(span * i / steps))
            .collect();
        ticks.dedup();
        ticks
    }

    /// Y축 눈금 값 (양 끝 포함 `count`개).
    pub fn y_ticks(&self, count: usize) -> Vec<f64> {
        let steps = count.saturating_sub(1).max(1);
        (0..=steps)
            .map(|i| self.y_min + (self.y_max - self.y_min) * i as f64 / steps as f64)
            .collect()
    }
}

/// 이벤트 레이블의 X 위치 날짜.
pub(crate) fn event_label_date(event: &Event) -> NaiveDate {
    event.date + Duration::days(EVENT_LABEL_OFFSET_DAYS)
}

/// 눈금 값 표기.
pub(crate) fn format_value(value: f64) -> String {
    if value.abs() >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if value.abs() >= 10_000.0 {
        format!("{:.0}K", value / 1_000.0)
    } else {
        format!("{:.2}", value)
    }
}

/// XML 특수문자 이스케이프.
pub(crate) fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
