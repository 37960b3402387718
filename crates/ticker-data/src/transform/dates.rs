//! `date` 열 생성.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use ticker_core::{columns, Table, TableError, TableResult};
use tracing::debug;

/// 문자열 날짜로 허용하는 형식. 마지막으로 RFC 3339를 시도합니다.
const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// 출력 테이블이 날짜 타입 `date` 열과 `0..n` 위치 인덱스를 갖도록 합니다.
///
/// - 행 인덱스가 타임스탬프이면 일 단위로 자른 값을 첫 번째 `date` 열로 넣고
///   인덱스를 초기화합니다.
/// - 그렇지 않으면 기존 `date` 열을 날짜 타입으로 변환하고 인덱스를 초기화합니다.
/// - 둘 다 없으면 [`TableError::MissingDate`].
pub fn materialize_dates(table: &Table) -> TableResult<Table> {
    if let Some(index) = table.index().filter(|index| index.is_temporal()) {
        debug!(rows = index.len(), "moving timestamp index into date column");
        let mut date = Column::from(index.values.cast(&DataType::Date)?);
        date.rename(columns::DATE.into());

        // 같은 이름의 열이 이미 있으면 인덱스 값으로 교체
        let mut fields = vec![date];
        fields.extend(
            table
                .frame()
                .get_columns()
                .iter()
                .filter(|c| c.name().as_str() != columns::DATE)
                .cloned(),
        );
        return table.reset_index().with_frame(DataFrame::new(fields)?);
    }

    let column = table
        .frame()
        .column(columns::DATE)
        .map_err(|_| TableError::MissingDate)?;
    let dates = coerce_dates(column)?;

    let mut frame = table.frame().clone();
    frame.with_column(dates)?;
    table.reset_index().with_frame(frame)
}

/// 열 값을 날짜 타입으로 변환. 시간 성분은 버립니다.
fn coerce_dates(column: &Column) -> TableResult<Column> {
    match column.dtype() {
        DataType::Date => Ok(column.clone()),
        DataType::Datetime(_, _) => Ok(column.cast(&DataType::Date)?),
        DataType::String => {
            let dates = column
                .str()?
                .into_iter()
                .map(|v| match v.map(str::trim) {
                    None | Some("") => Ok(None),
                    Some(s) => parse_date(s).map(Some),
                })
                .collect::<TableResult<Vec<_>>>()?;
            Ok(Column::from(Series::new(columns::DATE.into(), dates)))
        }
        other => Err(TableError::TypeMismatch {
            column: columns::DATE.to_string(),
            expected: "date",
            found: other.to_string(),
        }),
    }
}

/// 문자열을 날짜로 해석합니다.
fn parse_date(s: &str) -> TableResult<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(s, DATE_FORMAT) {
        return Ok(date);
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.date_naive())
        .map_err(|_| TableError::InvalidDate(s.to_string()))
}
