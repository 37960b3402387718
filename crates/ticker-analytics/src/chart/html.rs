//! 대화형 HTML 렌더러.
//!
//! 정적 SVG에 시계열 JSON 데이터와 짧은 스크립트를 붙여 하나의 HTML 페이지로
//! 만듭니다. 마우스 휠로 X축 확대/축소, 마우스 위치에서 가장 가까운 점의
//! 날짜와 값을 툴팁으로 보여줍니다.

use serde::Serialize;
use ticker_core::{ChartConfig, Event};

use super::{escape_xml, ChartPoint, ChartRenderer, Frame, LineChart, SvgRenderer};
use crate::error::ChartError;

/// 페이지에 포함되는 차트 데이터.
#[derive(Debug, Serialize)]
struct Payload<'a> {
    title: &'a str,
    series: &'a str,
    points: Vec<PlotPoint>,
    events: &'a [Event],
    /// 플롯 영역 픽셀 범위 (left, right)
    plot_x: (f64, f64),
}

/// 데이터 값과 픽셀 좌표.
#[derive(Debug, Serialize)]
struct PlotPoint {
    #[serde(flatten)]
    point: ChartPoint,
    px: f64,
    py: f64,
}

const SCRIPT: &str = r#"
(function () {
  const data = JSON.parse(document.getElementById('chart-data').textContent);
  const svg = document.getElementById('chart');
  const tip = document.getElementById('tooltip');
  const base = svg.viewBox.baseVal;
  const full = { x: base.x, width: base.width };

  svg.addEventListener('wheel', function (e) {
    e.preventDefault();
    const rect = svg.getBoundingClientRect();
    const focus = base.x + (e.clientX - rect.left) / rect.width * base.width;
    const scale = e.deltaY < 0 ? 0.8 : 1.25;
    const width = Math.min(full.width, base.width * scale);
    let x = focus - (focus - base.x) * (width / base.width);
    x = Math.max(full.x, Math.min(x, full.x + full.width - width));
    base.x = x;
    base.width = width;
  }, { passive: false });

  svg.addEventListener('mousemove', function (e) {
    const rect = svg.getBoundingClientRect();
    const px = base.x + (e.clientX - rect.left) / rect.width * base.width;
    let best = null;
    for (const p of data.points) {
      if (best === null || Math.abs(p.px - px) < Math.abs(best.px - px)) best = p;
    }
    if (best === null) return;
    tip.style.display = 'block';
    tip.style.left = (e.pageX + 12) + 'px';
    tip.style.top = (e.pageY + 12) + 'px';
    tip.textContent = best.date + '  ' + data.series + ': ' + best.value.toFixed(2);
  });

  svg.addEventListener('mouseleave', function () {
    tip.style.display = 'none';
  });

  svg.addEventListener('dblclick', function () {
    base.x = full.x;
    base.width = full.width;
  });
})();
"#;

/// 대화형 HTML 차트 렌더러.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HtmlRenderer {
    svg: SvgRenderer,
}

impl HtmlRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            svg: SvgRenderer::new(width, height),
        }
    }

    pub fn from_config(config: &ChartConfig) -> Self {
        Self {
            svg: SvgRenderer::from_config(config),
        }
    }
}

impl ChartRenderer for HtmlRenderer {
    fn render(&self, chart: &LineChart) -> Result<String, ChartError> {
        let frame = Frame::fit(chart, self.svg.width(), self.svg.height())?;
        let svg = self.svg.render_svg(chart, &frame);

        let payload = Payload {
            title: &chart.title,
            series: &chart.series_label,
            points: chart
                .points
                .iter()
                .map(|p| PlotPoint {
                    point: *p,
                    px: frame.x(p.date),
                    py: frame.y(p.value),
                })
                .collect(),
            events: &chart.events,
            plot_x: (frame.left(), frame.right()),
        };
        // </script> 조기 종료 방지
        let json = serde_json::to_string(&payload)?.replace("</", "<\\/");

        Ok(format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
body {{ margin: 0; padding: 16px; background: #fafafa; font-family: Arial, sans-serif; }}
#chart {{ max-width: 100%; height: auto; cursor: crosshair; }}
#tooltip {{ position: absolute; display: none; padding: 4px 8px; background: rgba(0,0,0,0.75); color: #fff; font-size: 12px; border-radius: 3px; pointer-events: none; }}
</style>
</head>
<body>
{svg}
<div id="tooltip"></div>
<script type="application/json" id="chart-data">{json}</script>
<script>{SCRIPT}</script>
</body>
</html>
"#,
            title = escape_xml(&chart.title),
        ))
    }

    fn extension(&self) -> &'static str {
        "html"
    }
}
