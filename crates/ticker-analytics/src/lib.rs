//! 수익률 통계 및 차트.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 월말/연말 수익률 집계 ([`returns`])
//! - 일간 지표 추가와 요약 테이블 생성 ([`analysis`])
//! - 요약 테이블 CSV 내보내기/읽기 ([`export`])
//! - 이벤트 주석이 있는 시계열 차트 ([`chart`])
//!
//! 입력 테이블은 `ticker_data::normalize` → `ticker_data::materialize_dates`를
//! 거친 형태를 가정합니다.

pub mod analysis;
pub mod chart;
pub mod error;
pub mod export;
pub mod returns;
mod stats;

pub use analysis::{augment, build_analysis, daily_range, daily_returns, summarize, Analysis};
pub use chart::{
    series_from_table, ChartPoint, ChartRenderer, HtmlRenderer, LineChart, SvgRenderer,
};
pub use error::{AnalyticsError, ChartError, Result};
pub use export::{export_summary, load_summary, summary_frame, write_summary};
pub use returns::{returns_series, returns_stats, Period, ReturnsSeries, ReturnsStats};
