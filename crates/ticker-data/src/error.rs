//! 데이터 모듈 오류 타입.

use polars::prelude::PolarsError;
use thiserror::Error;
use ticker_core::TableError;

/// 데이터 소스 조회 오류.
#[derive(Debug, Error)]
pub enum FetchError {
    /// 원격 소스에 연결할 수 없음
    #[error("Network error: {0}")]
    Network(String),

    /// 제공자가 오류를 반환함 (알 수 없는 티커 등)
    #[error("Provider error: {0}")]
    Provider(String),

    /// 응답 파싱 오류
    #[error("Parse error: {0}")]
    Parse(String),

    /// 요청한 기간에 데이터가 없음
    #[error("No data for {ticker} in the requested range")]
    EmptyRange { ticker: String },
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Parse(err.to_string())
    }
}

impl From<PolarsError> for FetchError {
    fn from(err: PolarsError) -> Self {
        FetchError::Parse(format!("DataFrame 생성 실패: {}", err))
    }
}

impl From<TableError> for FetchError {
    fn from(err: TableError) -> Self {
        FetchError::Parse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
