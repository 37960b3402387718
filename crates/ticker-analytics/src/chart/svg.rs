//! 정적 SVG 렌더러.

use ticker_core::ChartConfig;

use super::{
    escape_xml, event_label_date, format_value, ChartRenderer, Frame, LineChart,
};
use crate::error::ChartError;

const SERIES_COLOR: &str = "#1f77b4";
const EVENT_COLOR: &str = "red";
const AXIS_COLOR: &str = "#333";
const GRID_COLOR: &str = "#e5e5e5";
const X_TICKS: usize = 6;
const Y_TICKS: usize = 5;

/// 정적 SVG 차트 렌더러.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SvgRenderer {
    width: u32,
    height: u32,
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self::from_config(&ChartConfig::default())
    }
}

impl SvgRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn from_config(config: &ChartConfig) -> Self {
        Self::new(config.width, config.height)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// `<svg>` 요소 전체를 만듭니다. HTML 렌더러도 이 결과를 감쌉니다.
    pub(crate) fn render_svg(&self, chart: &LineChart, frame: &Frame) -> String {
        let mut svg = String::new();
        svg.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" id="chart" viewBox="0 0 {w} {h}" width="{w}" height="{h}">"#,
            w = self.width,
            h = self.height
        ));
        svg.push_str(
            "<style>text{font-family:Arial,sans-serif;font-size:12px;fill:#333}</style>",
        );
        svg.push_str(&format!(
            r#"<rect width="{}" height="{}" fill="white"/>"#,
            self.width, self.height
        ));

        draw_grid_and_ticks(&mut svg, frame);
        draw_axes(&mut svg, chart, frame);

        svg.push_str(r#"<g id="plot">"#);
        draw_series(&mut svg, chart, frame);
        draw_events(&mut svg, chart, frame);
        svg.push_str("</g>");

        draw_legend(&mut svg, chart, frame);
        svg.push_str(&format!(
            r#"<text x="{x:.2}" y="{y:.2}" text-anchor="middle" font-size="16">{title}</text>"#,
            x = self.width as f64 / 2.0,
            y = Frame::MARGIN_TOP / 2.0,
            title = escape_xml(&chart.title)
        ));
        svg.push_str("</svg>");
        svg
    }
}

impl ChartRenderer for SvgRenderer {
    fn render(&self, chart: &LineChart) -> Result<String, ChartError> {
        let frame = Frame::fit(chart, self.width, self.height)?;
        Ok(self.render_svg(chart, &frame))
    }

    fn extension(&self) -> &'static str {
        "svg"
    }
}

fn draw_grid_and_ticks(svg: &mut String, frame: &Frame) {
    for value in frame.y_ticks(Y_TICKS) {
        let y = frame.y(value);
        svg.push_str(&format!(
            r#"<line x1="{x1:.2}" y1="{y:.2}" x2="{x2:.2}" y2="{y:.2}" stroke="{GRID_COLOR}"/>"#,
            x1 = frame.left(),
            x2 = frame.right(),
        ));
        svg.push_str(&format!(
            r#"<text x="{x:.2}" y="{y:.2}" text-anchor="end" dominant-baseline="middle">{label}</text>"#,
            x = frame.left() - 6.0,
            label = format_value(value)
        ));
    }

    for date in frame.x_ticks(X_TICKS) {
        let x = frame.x(date);
        svg.push_str(&format!(
            r#"<line x1="{x:.2}" y1="{y1:.2}" x2="{x:.2}" y2="{y2:.2}" stroke="{AXIS_COLOR}"/>"#,
            y1 = frame.bottom(),
            y2 = frame.bottom() + 5.0,
        ));
        svg.push_str(&format!(
            r#"<text class="x-tick" x="{x:.2}" y="{y:.2}" text-anchor="middle">{label}</text>"#,
            y = frame.bottom() + 18.0,
            label = date.format("%Y-%m-%d")
        ));
    }
}

fn draw_axes(svg: &mut String, chart: &LineChart, frame: &Frame) {
    svg.push_str(&format!(
        r#"<line x1="{l:.2}" y1="{b:.2}" x2="{r:.2}" y2="{b:.2}" stroke="{AXIS_COLOR}"/><line x1="{l:.2}" y1="{t:.2}" x2="{l:.2}" y2="{b:.2}" stroke="{AXIS_COLOR}"/>"#,
        l = frame.left(),
        r = frame.right(),
        t = frame.top(),
        b = frame.bottom(),
    ));

    svg.push_str(&format!(
        r#"<text x="{x:.2}" y="{y:.2}" text-anchor="middle">{label}</text>"#,
        x = (frame.left() + frame.right()) / 2.0,
        y = frame.height - 15.0,
        label = escape_xml(&chart.x_label)
    ));
    let y_mid = (frame.top() + frame.bottom()) / 2.0;
    svg.push_str(&format!(
        r#"<text x="18" y="{y:.2}" text-anchor="middle" transform="rotate(-90 18 {y:.2})">{label}</text>"#,
        y = y_mid,
        label = escape_xml(&chart.y_label)
    ));
}

/// 시계열 전체를 하나의 polyline으로 그립니다.
fn draw_series(svg: &mut String, chart: &LineChart, frame: &Frame) {
    let coords = chart
        .points
        .iter()
        .map(|p| format!("{:.2},{:.2}", frame.x(p.date), frame.y(p.value)))
        .collect::<Vec<_>>()
        .join(" ");
    svg.push_str(&format!(
        r#"<polyline class="series" points="{coords}" fill="none" stroke="{SERIES_COLOR}" stroke-width="1.5"/>"#
    ));
}

/// 이벤트마다 빨간 점선 세로선과 레이블 (10일 오른쪽, 시계열 최댓값 높이).
fn draw_events(svg: &mut String, chart: &LineChart, frame: &Frame) {
    let Some(max_value) = chart.max_value() else {
        return;
    };
    let label_y = frame.y(max_value);

    for event in &chart.events {
        let x = frame.x(event.date);
        svg.push_str(&format!(
            r#"<line class="event" x1="{x:.2}" y1="{t:.2}" x2="{x:.2}" y2="{b:.2}" stroke="{EVENT_COLOR}" stroke-width="0.8" stroke-dasharray="5 3"/>"#,
            t = frame.top(),
            b = frame.bottom(),
        ));
        svg.push_str(&format!(
            r#"<text class="event-label" x="{x:.2}" y="{y:.2}" fill="{EVENT_COLOR}" style="fill:{EVENT_COLOR}" text-anchor="start" dominant-baseline="hanging">{name}</text>"#,
            x = frame.x(event_label_date(event)),
            y = label_y,
            name = escape_xml(&event.name)
        ));
    }
}

fn draw_legend(svg: &mut String, chart: &LineChart, frame: &Frame) {
    let x = frame.left() + 12.0;
    let y = frame.top() + 14.0;
    svg.push_str(&format!(
        r#"<g class="legend"><line x1="{x1:.2}" y1="{y:.2}" x2="{x2:.2}" y2="{y:.2}" stroke="{SERIES_COLOR}" stroke-width="2"/><text x="{tx:.2}" y="{ty:.2}">{label}</text></g>"#,
        x1 = x,
        x2 = x + 20.0,
        tx = x + 26.0,
        ty = y + 4.0,
        label = escape_xml(&chart.series_label)
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ticker_core::{default_events, Event};

    use crate::chart::ChartPoint;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn chart() -> LineChart {
        let points = (0..30)
            .map(|i| ChartPoint::new(date(2020, 1, 1) + chrono::Duration::days(i), 100.0 + i as f64))
            .collect();
        LineChart::new("adj_close", points).with_labels("date", "adj_close")
    }

    #[test]
    fn test_single_polyline_with_all_points() {
        let svg = SvgRenderer::new(800, 400).render(&chart()).unwrap();

        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("<polyline").count(), 1);
        let points = svg
            .split(r#"points=""#)
            .nth(1)
            .and_then(|s| s.split('"').next())
            .unwrap();
        assert_eq!(points.split(' ').count(), 30);
    }

    #[test]
    fn test_event_lines_and_labels() {
        let chart = chart().with_events(vec![
            Event::new("Start", date(2020, 1, 5)),
            Event::new("A & B", date(2020, 1, 20)),
        ]);
        let renderer = SvgRenderer::new(800, 400);
        let svg = renderer.render(&chart).unwrap();

        assert_eq!(svg.matches(r#"class="event""#).count(), 2);
        assert_eq!(svg.matches("stroke-dasharray").count(), 2);
        assert!(svg.contains("A &amp; B"));

        // 레이블은 이벤트 10일 뒤, 최댓값 높이
        let frame = Frame::fit(&chart, 800, 400).unwrap();
        let expected = format!(
            r#"x="{:.2}" y="{:.2}""#,
            frame.x(date(2020, 1, 15)),
            frame.y(129.0)
        );
        assert!(svg.contains(&expected));
    }

    #[test]
    fn test_labels_title_and_legend() {
        let chart = chart().with_series_label("AAPL adj_close");
        let svg = SvgRenderer::default().render(&chart).unwrap();

        assert!(svg.contains(r#"viewBox="0 0 1200 600""#));
        assert!(svg.contains(">date</text>"));
        assert!(svg.contains(">adj_close</text>"));
        assert!(svg.contains("AAPL adj_close"));
    }

    #[test]
    fn test_default_events_extend_x_domain() {
        let chart = chart().with_events(default_events());
        let svg = SvgRenderer::new(800, 400).render(&chart).unwrap();
        assert!(svg.contains(">1987-10-19</text>"));
        assert_eq!(svg.matches(r#"class="event""#).count(), 4);
    }

    #[test]
    fn test_grid_and_tick_labels_match_frame() {
        let chart = chart();
        let svg = SvgRenderer::new(800, 400).render(&chart).unwrap();
        let frame = Frame::fit(&chart, 800, 400).unwrap();

        let grid = format!(r#"stroke="{GRID_COLOR}""#);
        assert_eq!(svg.matches(&grid).count(), frame.y_ticks(Y_TICKS).len());
        assert_eq!(
            svg.matches(r#"class="x-tick""#).count(),
            frame.x_ticks(X_TICKS).len()
        );
        assert!(svg.contains(r#"<g class="legend">"#));
    }

    #[test]
    fn test_empty_series() {
        let chart = LineChart::new("empty", vec![]);
        assert!(matches!(
            SvgRenderer::default().render(&chart),
            Err(ChartError::EmptySeries)
        ));
    }
}
