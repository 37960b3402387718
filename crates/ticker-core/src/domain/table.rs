//! DataFrame 기반 가격 테이블.
//!
//! [`Table`]은 polars [`DataFrame`]에 행 인덱스([`RowIndex`])와 열 인덱스 이름을
//! 더한 래퍼입니다. 데이터 소스가 반환하는 원본 테이블과 정규화 이후의 테이블을
//! 같은 타입으로 표현하며, 모든 변환은 `&Table`을 받아 새 `Table`을 반환합니다.
//!
//! # 2단 열 키
//!
//! 원본 테이블은 티커 이름의 struct 열 하나에 필드(`Adj Close`, `Close`, ...)를
//! 담습니다. 즉 열 키는 `(필드, 티커)`이고, 정규화 단계에서 struct 열을 풀어
//! 필드 열만 남깁니다.
//!
//! 결측값은 null이며, 실수 열의 NaN도 결측으로 읽힙니다.
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use polars::prelude::*;
//! use ticker_core::Table;
//!
//! let frame = df! {
//!     "date" => &[NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()],
//!     "adj_close" => &[184.5],
//! }?;
//! let table = Table::new(frame);
//! assert_eq!(table.floats("adj_close")?, vec![Some(184.5)]);
//! ```

use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;

use crate::error::{TableError, TableResult};

/// 정규화 이후 사용하는 표준 열 이름.
pub mod columns {
    pub const DATE: &str = "date";
    pub const OPEN: &str = "open";
    pub const HIGH: &str = "high";
    pub const LOW: &str = "low";
    pub const CLOSE: &str = "close";
    pub const ADJ_CLOSE: &str = "adj_close";
    pub const VOLUME: &str = "volume";
    pub const DAILY_RETURN: &str = "daily_return";
    pub const DAILY_RANGE: &str = "daily_range";
    pub const MONTHLY_RETURN: &str = "monthly_return";
    pub const ANNUAL_RETURN: &str = "annual_return";
}

/// 인덱스 시리즈의 내부 이름. 공개 이름은 [`RowIndex::name`]입니다.
const INDEX_SERIES: &str = "index";

/// 행 인덱스.
///
/// 값은 프레임 밖의 시리즈로 보관합니다. 인덱스가 없는 테이블은 `0..n` 위치 인덱스입니다.
#[derive(Debug, Clone)]
pub struct RowIndex {
    /// 인덱스 이름 (예: "Date")
    pub name: Option<String>,
    pub values: Series,
}

impl RowIndex {
    pub fn new(name: Option<String>, values: Series) -> Self {
        Self { name, values }
    }

    /// 타임스탬프 인덱스.
    pub fn timestamps(name: Option<String>, values: &[NaiveDateTime]) -> Self {
        Self::new(name, Series::new(INDEX_SERIES.into(), values))
    }

    /// 문자열 레이블 인덱스.
    pub fn labels(name: Option<String>, values: &[&str]) -> Self {
        Self::new(name, Series::new(INDEX_SERIES.into(), values))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 날짜/시간 타입 인덱스인지 확인합니다.
    pub fn is_temporal(&self) -> bool {
        matches!(self.values.dtype(), DataType::Date | DataType::Datetime(_, _))
    }

    fn equals(&self, other: &Self) -> bool {
        self.name == other.name && self.values.equals_missing(&other.values)
    }
}

/// 가격 테이블.
#[derive(Debug, Clone)]
pub struct Table {
    frame: DataFrame,
    index: Option<RowIndex>,
    columns_name: Option<String>,
}

impl Table {
    /// 위치 인덱스 테이블을 생성합니다.
    pub fn new(frame: DataFrame) -> Self {
        Self {
            frame,
            index: None,
            columns_name: None,
        }
    }

    /// 행 인덱스를 붙입니다.
    ///
    /// 열이 있으면 인덱스 길이가 프레임 높이와 같아야 합니다.
    pub fn with_index(mut self, index: RowIndex) -> TableResult<Self> {
        let expected = self.frame.height();
        if self.frame.width() > 0 && index.len() != expected {
            return Err(TableError::LengthMismatch {
                column: index.name.clone().unwrap_or_else(|| INDEX_SERIES.to_string()),
                expected,
                actual: index.len(),
            });
        }
        self.index = Some(index);
        Ok(self)
    }

    /// 열 인덱스 이름을 설정합니다.
    pub fn with_columns_name(mut self, name: Option<String>) -> Self {
        self.columns_name = name;
        self
    }

    /// 행 인덱스 이름을 설정합니다. 위치 인덱스에는 적용되지 않습니다.
    pub fn with_index_name(mut self, name: Option<String>) -> Self {
        if let Some(index) = self.index.as_mut() {
            index.name = name;
        }
        self
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    /// 행 인덱스. 위치 인덱스이면 `None`.
    pub fn index(&self) -> Option<&RowIndex> {
        self.index.as_ref()
    }

    pub fn is_positional(&self) -> bool {
        self.index.is_none()
    }

    pub fn columns_name(&self) -> Option<&str> {
        self.columns_name.as_deref()
    }

    /// 행 개수.
    pub fn len(&self) -> usize {
        match &self.index {
            Some(index) => index.len(),
            None => self.frame.height(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame.column(name).is_ok()
    }

    /// 이름으로 열을 찾고, 없으면 에러를 반환합니다.
    pub fn require(&self, name: &str) -> TableResult<&Column> {
        self.frame
            .column(name)
            .map_err(|_| TableError::ColumnNotFound(name.to_string()))
    }

    /// 숫자 열을 찾습니다. 숫자 타입이 아니면 [`TableError::TypeMismatch`].
    pub fn require_numeric(&self, name: &str) -> TableResult<&Column> {
        let column = self.require(name)?;
        if column.dtype().is_numeric() {
            Ok(column)
        } else {
            Err(type_mismatch(column, "float"))
        }
    }

    /// 날짜 또는 날짜/시간 열을 찾습니다.
    pub fn require_dates(&self, name: &str) -> TableResult<&Column> {
        let column = self.require(name)?;
        match column.dtype() {
            DataType::Date | DataType::Datetime(_, _) => Ok(column),
            _ => Err(type_mismatch(column, "date")),
        }
    }

    /// 숫자 열을 `f64` 값으로 읽습니다.
    pub fn floats(&self, name: &str) -> TableResult<Vec<Option<f64>>> {
        float_values(self.require(name)?)
    }

    /// 날짜 열을 읽습니다.
    pub fn dates(&self, name: &str) -> TableResult<Vec<Option<NaiveDate>>> {
        date_values(self.require(name)?)
    }

    /// 프레임만 바꾼 새 테이블을 반환합니다. 인덱스와 열 인덱스 이름은 유지됩니다.
    pub fn with_frame(&self, frame: DataFrame) -> TableResult<Self> {
        let table = Self::new(frame).with_columns_name(self.columns_name.clone());
        match &self.index {
            Some(index) => table.with_index(index.clone()),
            None => Ok(table),
        }
    }

    /// 행 인덱스를 `0..n` 위치 인덱스로 바꾼 새 테이블을 반환합니다.
    ///
    /// 기존 인덱스 값은 버려집니다.
    pub fn reset_index(&self) -> Self {
        Self::new(self.frame.clone()).with_columns_name(self.columns_name.clone())
    }

    /// 인덱스, 열 인덱스 이름, 열 이름과 값이 모두 같은지 확인합니다.
    ///
    /// 같은 위치의 null은 같은 값으로 봅니다.
    pub fn equals(&self, other: &Self) -> bool {
        let same_index = match (&self.index, &other.index) {
            (None, None) => true,
            (Some(a), Some(b)) => a.equals(b),
            _ => false,
        };
        same_index
            && self.columns_name == other.columns_name
            && self.column_names() == other.column_names()
            && self.frame.equals_missing(&other.frame)
    }
}

/// 숫자 열을 `f64` 값으로 읽습니다. NaN은 `None`이 됩니다.
pub fn float_values(column: &Column) -> TableResult<Vec<Option<f64>>> {
    if !column.dtype().is_numeric() {
        return Err(type_mismatch(column, "float"));
    }
    let values = column.cast(&DataType::Float64)?;
    Ok(values
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect())
}

/// 날짜 또는 날짜/시간 열을 날짜 값으로 읽습니다. 시간 성분은 버립니다.
pub fn date_values(column: &Column) -> TableResult<Vec<Option<NaiveDate>>> {
    match column.dtype() {
        DataType::Date => Ok(column.date()?.as_date_iter().collect()),
        DataType::Datetime(_, _) => {
            let dates = column.cast(&DataType::Date)?;
            Ok(dates.date()?.as_date_iter().collect())
        }
        _ => Err(type_mismatch(column, "date")),
    }
}

fn type_mismatch(column: &Column, expected: &'static str) -> TableError {
    TableError::TypeMismatch {
        column: column.name().to_string(),
        expected,
        found: column.dtype().to_string(),
    }
}
