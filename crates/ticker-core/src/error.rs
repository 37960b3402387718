//! 테이블 처리 에러 타입.
//!
//! 정규화, 날짜 열 생성, 통계 계산 단계에서 공통으로 사용됩니다.

use polars::prelude::PolarsError;
use thiserror::Error;

/// 테이블 구조 에러.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// 날짜 인덱스도 `date` 열도 없음
    #[error("날짜 정보 없음: 날짜 인덱스나 'date' 열이 필요합니다")]
    MissingDate,

    /// 필요한 열이 없음
    #[error("열을 찾을 수 없음: {0}")]
    ColumnNotFound(String),

    /// 열 길이가 인덱스 길이와 다름
    #[error("열 길이 불일치: {column} (예상 {expected}, 실제 {actual})")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// 날짜로 해석할 수 없는 값
    #[error("잘못된 날짜 값: {0}")]
    InvalidDate(String),

    /// 열 타입이 요구 타입과 다름
    #[error("열 타입 불일치: {column} ({expected} 타입 필요, 실제 {found})")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        found: String,
    },

    /// DataFrame 연산 실패
    #[error("DataFrame 연산 실패: {0}")]
    Frame(String),
}

impl From<PolarsError> for TableError {
    fn from(err: PolarsError) -> Self {
        Self::Frame(err.to_string())
    }
}

/// 테이블 작업을 위한 Result 타입.
pub type TableResult<T> = Result<T, TableError>;
