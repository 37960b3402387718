//! 열/인덱스 이름 정규화.

use std::collections::HashSet;

use polars::prelude::*;
use ticker_core::{Table, TableResult};

/// 레이블 하나를 정규화합니다.
///
/// 앞뒤 공백 제거 → 소문자 → 내부 공백을 `_`로 치환.
pub fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase().replace(' ', "_")
}

/// 필드 열을 모두 티커 이름의 struct 열 하나로 묶습니다.
///
/// 데이터 소스의 `(필드, 티커)` 열 키 형태이며, [`normalize`]가 다시 풉니다.
pub fn group_fields(frame: DataFrame, ticker: &str) -> TableResult<DataFrame> {
    let fields: Vec<Expr> = frame
        .get_column_names()
        .iter()
        .map(|name| col(name.as_str()))
        .collect();

    Ok(frame
        .lazy()
        .select([as_struct(fields).alias(ticker)])
        .collect()?)
}

/// 테이블의 열/인덱스 이름을 정규화한 새 테이블을 반환합니다.
///
/// - struct 열(티커 레벨)을 풀어 필드 열만 남김
/// - 열 이름을 [`normalize_label`]로 변환
/// - 행 인덱스 이름과 열 인덱스 이름을 소문자로 변환
///
/// 이름이 없는 인덱스는 그대로 둡니다. 두 번 적용해도 결과가 같습니다.
/// 정규화한 이름이 앞 열과 겹치면 `_1`, `_2`, ... 접미사를 붙입니다.
pub fn normalize(raw: &Table) -> TableResult<Table> {
    let mut fields = Vec::with_capacity(raw.frame().width());
    for column in raw.frame().get_columns() {
        match column.dtype() {
            DataType::Struct(_) => fields.extend(
                column
                    .as_materialized_series()
                    .struct_()?
                    .fields_as_series()
                    .into_iter()
                    .map(Column::from),
            ),
            _ => fields.push(column.clone()),
        }
    }

    let mut seen = HashSet::with_capacity(fields.len());
    for column in &mut fields {
        let label = unique_label(normalize_label(column.name()), &mut seen);
        column.rename(label.into());
    }

    let index_name = raw
        .index()
        .and_then(|index| index.name.as_deref())
        .map(str::to_lowercase);
    let columns_name = raw.columns_name().map(str::to_lowercase);

    Ok(raw
        .with_frame(DataFrame::new(fields)?)?
        .with_index_name(index_name)
        .with_columns_name(columns_name))
}

fn unique_label(label: String, seen: &mut HashSet<String>) -> String {
    let mut candidate = label.clone();
    let mut suffix = 1;
    while !seen.insert(candidate.clone()) {
        candidate = format!("{label}_{suffix}");
        suffix += 1;
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use ticker_core::RowIndex;

    fn raw_table() -> Table {
        let day = |d| {
            NaiveDate::from_ymd_opt(2024, 1, d)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap()
        };
        let fields = df! {
            "Adj Close" => &[1.0, 2.0],
            " Open " => &[1.5, 2.5],
            "Volume" => &[10i64, 20],
        }
        .unwrap();

        Table::new(group_fields(fields, "AAPL").unwrap())
            .with_index(RowIndex::timestamps(Some("Date".to_string()), &[day(2), day(3)]))
            .unwrap()
            .with_columns_name(Some("Price".to_string()))
    }

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("Adj Close"), "adj_close");
        assert_eq!(normalize_label("  High "), "high");
        assert_eq!(normalize_label("adj_close"), "adj_close");
    }

    #[test]
    fn test_group_fields_builds_one_struct_column() {
        let raw = raw_table();
        assert_eq!(raw.column_names(), vec!["AAPL"]);
        assert!(matches!(
            raw.require("AAPL").unwrap().dtype(),
            DataType::Struct(fields) if fields.len() == 3
        ));
    }

    #[test]
    fn test_normalize_drops_ticker_and_renames() {
        let normalized = normalize(&raw_table()).unwrap();

        assert_eq!(normalized.column_names(), vec!["adj_close", "open", "volume"]);
        assert_eq!(
            normalized.index().and_then(|i| i.name.as_deref()),
            Some("date")
        );
        assert_eq!(normalized.columns_name(), Some("price"));
        assert_eq!(normalized.floats("open").unwrap(), vec![Some(1.5), Some(2.5)]);
        assert_eq!(
            normalized.require("volume").unwrap().dtype(),
            &DataType::Int64
        );
    }

    #[test]
    fn test_normalize_leaves_input_untouched() {
        let raw = raw_table();
        let before = raw.clone();
        let _ = normalize(&raw).unwrap();
        assert!(raw.equals(&before));
    }

    #[test]
    fn test_normalize_without_names_is_noop_on_names() {
        let table = Table::new(df! { "Close" => &[1.0] }.unwrap());
        let normalized = normalize(&table).unwrap();
        assert!(normalized.index().is_none());
        assert_eq!(normalized.columns_name(), None);
        assert_eq!(normalized.column_names(), vec!["close"]);
    }

    #[test]
    fn test_normalize_suffixes_colliding_labels() {
        let table = Table::new(
            df! { "Adj Close" => &[1.0], "adj_close" => &[2.0], "ADJ CLOSE" => &[3.0] }.unwrap(),
        );

        let normalized = normalize(&table).unwrap();

        assert_eq!(
            normalized.column_names(),
            vec!["adj_close", "adj_close_1", "adj_close_2"]
        );
        assert_eq!(normalized.floats("adj_close_1").unwrap(), vec![Some(2.0)]);
        assert!(normalize(&normalized).unwrap().equals(&normalized));
    }

    #[test]
    fn test_normalize_flattens_multiple_tickers() {
        let fields = |v: f64| df! { "Close" => &[v] }.unwrap();
        let mut frame = group_fields(fields(1.0), "AAPL").unwrap();
        frame
            .hstack_mut(group_fields(fields(2.0), "MSFT").unwrap().get_columns())
            .unwrap();

        let normalized = normalize(&Table::new(frame)).unwrap();

        assert_eq!(normalized.column_names(), vec!["close", "close_1"]);
        assert_eq!(normalized.floats("close_1").unwrap(), vec![Some(2.0)]);
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(
            fields in prop::collection::vec("[A-Za-z][ A-Za-z_]{0,11}", 1..6),
            ticker in proptest::option::of("[A-Z]{1,5}"),
            index_name in proptest::option::of("[ A-Za-z]{0,8}"),
        ) {
            // 원본 열 이름은 서로 달라야 함
            let mut seen = HashSet::new();
            let columns: Vec<Column> = fields
                .iter()
                .filter(|f| seen.insert(f.to_string()))
                .map(|f| Column::from(Series::new(f.as_str().into(), &[1.0])))
                .collect();
            let mut frame = DataFrame::new(columns).unwrap();
            if let Some(ticker) = &ticker {
                frame = group_fields(frame, ticker).unwrap();
            }
            let table = Table::new(frame)
                .with_index(RowIndex::labels(index_name, &["a"]))
                .unwrap();

            let once = normalize(&table).unwrap();
            let twice = normalize(&once).unwrap();
            prop_assert!(once.equals(&twice));

            for name in once.column_names() {
                prop_assert_eq!(name.trim(), name.as_str());
                prop_assert!(!name.contains(' '));
                prop_assert_eq!(name.to_lowercase(), name.clone());
            }
        }
    }
}
