//! 도메인 모델.

pub mod event;
pub mod summary;
pub mod table;

pub use event::{default_events, Event};
pub use summary::{AnalysisSummary, Metric, SummaryRow};
pub use table::{columns, date_values, float_values, RowIndex, Table};
