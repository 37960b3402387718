//! 차트 주석용 시장 이벤트.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 이름이 붙은 시점.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// 이벤트 레이블 (예: "COVID-19 Crash")
    pub name: String,
    /// 이벤트 날짜
    pub date: NaiveDate,
}

impl Event {
    pub fn new(name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            date,
        }
    }
}

/// 기본 이벤트 목록.
///
/// 호출할 때마다 새 목록을 반환합니다.
pub fn default_events() -> Vec<Event> {
    [
        ("Black Monday", 1987, 10, 19),
        ("Dot-com Peak", 2000, 3, 10),
        ("Lehman Collapse", 2008, 9, 15),
        ("COVID-19 Crash", 2020, 3, 16),
    ]
    .into_iter()
    .filter_map(|(name, y, m, d)| NaiveDate::from_ymd_opt(y, m, d).map(|date| Event::new(name, date)))
    .collect()
}
