//! 요약 테이블 CSV 내보내기.
//!
//! 파일 형식: 지표 이름 헤더 한 줄, 평균 행, 표준편차 행. 행 레이블은 쓰지 않으며
//! 결측값은 빈 칸입니다.
//!
//! ```text
//! open,high,low,close,adj_close,volume,daily_return,daily_range,monthly_return,annual_return
//! 101.5,103.5,100.5,101.5,101.5,1004.5,0.9,3.0,12.1,
//! 2.449,2.449,2.449,2.449,2.449,2.449,0.047,0.0,,
//! ```

use std::fs::File;
use std::path::{Path, PathBuf};

use polars::prelude::*;
use ticker_core::{AnalysisSummary, ExportConfig, Metric, SummaryRow};
use tracing::{debug, info};

use crate::error::{AnalyticsError, Result};

/// 지표별 열에 평균/표준편차 두 행을 담은 프레임.
pub fn summary_frame(summary: &AnalysisSummary) -> PolarsResult<DataFrame> {
    let columns = Metric::ALL
        .iter()
        .map(|metric| {
            let values = [summary.mean.get(*metric), summary.std.get(*metric)];
            Column::from(Series::new(metric.column_name().into(), values))
        })
        .collect();
    DataFrame::new(columns)
}

/// 요약 테이블을 지정한 경로에 씁니다.
///
/// 상위 디렉토리는 만들지 않습니다. 기존 파일은 덮어씁니다.
pub fn write_summary(summary: &AnalysisSummary, path: &Path) -> Result<()> {
    let write = || -> PolarsResult<()> {
        let mut frame = summary_frame(summary)?;
        let mut file = File::create(path)?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut frame)
    };
    write().map_err(|source| AnalyticsError::Export {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(path = %path.display(), "summary written");
    Ok(())
}

/// 설정된 데이터 디렉토리에 `<company>_analysis.csv`로 내보냅니다.
///
/// 쓴 파일 경로를 반환합니다.
pub fn export_summary(summary: &AnalysisSummary, config: &ExportConfig) -> Result<PathBuf> {
    let path = config.summary_path(&summary.company);
    write_summary(summary, &path)?;
    info!(company = %summary.company, path = %path.display(), "summary exported");
    Ok(path)
}

/// 내보낸 요약 파일을 다시 읽습니다.
pub fn load_summary(path: &Path, company: &str) -> Result<AnalysisSummary> {
    let load_err = |source: PolarsError| AnalyticsError::Load {
        path: path.to_path_buf(),
        source,
    };

    let frame = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .map_err(load_err)?;

    if frame.height() != 2 {
        return Err(AnalyticsError::MalformedSummary {
            path: path.to_path_buf(),
            rows: frame.height(),
        });
    }

    // 값이 모두 빈 칸인 열은 문자열로 추론되므로 f64로 맞춤
    let mut values = Vec::with_capacity(Metric::ALL.len());
    for metric in Metric::ALL {
        let column = frame
            .column(metric.column_name())
            .and_then(|c| c.cast(&DataType::Float64))
            .map_err(load_err)?;
        let floats = column.f64().map_err(load_err)?;
        values.push((metric, floats.get(0), floats.get(1)));
    }

    let row = |pick: fn(&(Metric, Option<f64>, Option<f64>)) -> Option<f64>| {
        SummaryRow::from_fn(|metric| {
            values
                .iter()
                .find(|entry| entry.0 == metric)
                .and_then(pick)
        })
    };

    Ok(AnalysisSummary {
        company: company.to_string(),
        mean: row(|entry| entry.1),
        std: row(|entry| entry.2),
    })
}
