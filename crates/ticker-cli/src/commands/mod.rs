//! CLI 명령어 구현 모듈.

pub mod analyze;
pub mod events;
pub mod plot;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use ticker_core::Table;
use ticker_data::{materialize_dates, normalize, PriceSource};
use tracing::debug;

/// `YYYY-MM-DD` 날짜를 파싱합니다.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date format: {}. Expected YYYY-MM-DD", s))
}

/// 선택적 날짜 인자를 파싱합니다.
pub fn parse_optional_date(s: Option<&str>) -> Result<Option<NaiveDate>> {
    s.map(parse_date).transpose()
}

/// 시작일이 종료일보다 늦으면 에러.
pub fn validate_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<()> {
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            bail!("Start date must be before end date ({} > {})", start, end);
        }
    }
    Ok(())
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb
}

/// 조회 → 정규화 → `date` 열 생성.
pub async fn fetch_prepared(
    source: &dyn PriceSource,
    ticker: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<Table> {
    validate_range(start, end)?;

    let pb = spinner(format!("Fetching {} ...", ticker));
    let raw = source.fetch(ticker, start, end).await;
    pb.finish_and_clear();

    let raw = raw.with_context(|| format!("Failed to fetch price history for {}", ticker))?;
    debug!(ticker, rows = raw.len(), "raw table fetched");

    let table = normalize(&raw)
        .and_then(|normalized| materialize_dates(&normalized))
        .with_context(|| format!("Failed to prepare price table for {}", ticker))?;
    Ok(table)
}
