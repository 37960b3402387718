//! 분석 모듈 에러 타입.

use std::path::PathBuf;

use polars::error::PolarsError;
use thiserror::Error;
use ticker_core::TableError;

/// 분석/내보내기 에러.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// 입력 테이블 구조 에러
    #[error(transparent)]
    Table(#[from] TableError),

    /// 요약 파일 쓰기 실패
    #[error("Export error ({}): {source}", path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    /// 요약 파일 읽기 실패
    #[error("Load error ({}): {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    /// 요약 파일 형태가 다름 (mean/std 두 행이 아님)
    #[error("Malformed summary file ({}): expected 2 rows, found {rows}", path.display())]
    MalformedSummary { path: PathBuf, rows: usize },
}

/// 차트 렌더링 에러.
#[derive(Debug, Error)]
pub enum ChartError {
    /// 그릴 점이 없음
    #[error("Chart has no data points")]
    EmptySeries,

    /// 입력 테이블 구조 에러
    #[error(transparent)]
    Table(#[from] TableError),

    /// 파일 저장 실패
    #[error("Chart IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 차트 데이터 직렬화 실패
    #[error("Chart serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;
