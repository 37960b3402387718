//! 수익률 분석 명령.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use ticker_analytics::{build_analysis, Analysis};
use ticker_core::{ticker_span, ExportConfig};
use ticker_data::PriceSource;
use tracing::Instrument;

use super::fetch_prepared;

/// 분석 요청.
#[derive(Debug, Clone)]
pub struct AnalyzeRequest {
    pub ticker: String,
    /// 회사 레이블 (없으면 티커)
    pub company: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// 요약 CSV 내보내기 여부
    pub export: bool,
}

impl AnalyzeRequest {
    pub fn company(&self) -> &str {
        self.company.as_deref().unwrap_or(&self.ticker)
    }
}

/// 티커 시세를 조회해 분석 요약을 만듭니다.
pub async fn run_analyze(
    source: &dyn PriceSource,
    request: &AnalyzeRequest,
    export: &ExportConfig,
) -> Result<Analysis> {
    let company = request.company();
    let span = ticker_span!("analyze", request.ticker, company);

    async {
        let table = fetch_prepared(source, &request.ticker, request.start, request.end).await?;
        let export = request.export.then_some(export);

        build_analysis(&table, company, export)
            .with_context(|| format!("Failed to analyze {}", request.ticker))
    }
    .instrument(span)
    .await
}
