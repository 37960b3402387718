//! 기본 이벤트 목록 명령.

use anyhow::Result;
use ticker_core::Event;

/// 이벤트 목록을 표 또는 JSON 문자열로 만듭니다.
pub fn format_events(events: &[Event], json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(events)?);
    }

    let mut out = format!("{:<12} {}\n", "DATE", "EVENT");
    for event in events {
        out.push_str(&format!("{:<12} {}\n", event.date.format("%Y-%m-%d"), event.name));
    }
    Ok(out)
}
