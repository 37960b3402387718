//! 월말/연말 수익률 집계.
//!
//! 일봉 조정 종가를 기간 단위로 리샘플링(기간 내 마지막 관측값)한 뒤
//! 직전 기간 대비 변화율을 계산합니다.
//!
//! ```text
//! 일봉 (date, adj_close)
//!         │  기간별 마지막 유효 관측값
//!         ▼
//! 기간말 가격  P₀, P₁, P₂, ...
//!         │  (Pₜ / Pₜ₋₁ - 1) × 100
//!         ▼
//! 수익률  None, R₁, R₂, ...
//! ```

use chrono::{Months, NaiveDate};
use polars::prelude::*;
use serde::Serialize;
use ticker_core::{columns, date_values, float_values, Table, TableResult};

use crate::stats::{float, pct_change};

/// 리샘플링 결과의 수익률 열 이름.
const RETURN: &str = "return";

/// 리샘플링 기간.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    /// 월말
    Month,
    /// 연말
    Year,
}

impl Period {
    fn every(&self) -> &'static str {
        match self {
            Period::Month => "1mo",
            Period::Year => "1y",
        }
    }

    /// 달력 기간 단위의 겹치지 않는 창. 창 레이블은 기간 첫날입니다.
    fn window(&self) -> DynamicGroupOptions {
        DynamicGroupOptions {
            every: Duration::parse(self.every()),
            period: Duration::parse(self.every()),
            offset: Duration::parse("0ns"),
            ..Default::default()
        }
    }

    /// 기간 첫날에서 기간의 마지막 달력일을 구합니다.
    fn period_end(&self, start: NaiveDate) -> NaiveDate {
        let months = match self {
            Period::Month => Months::new(1),
            Period::Year => Months::new(12),
        };
        start
            .checked_add_months(months)
            .and_then(|next| next.pred_opt())
            .unwrap_or(start)
    }
}

/// 기간말 수익률 시계열.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnsSeries {
    pub period: Period,
    /// (기간말 날짜, 수익률 %) - 첫 항목은 항상 `None`
    pub points: Vec<(NaiveDate, Option<f64>)>,
}

impl ReturnsSeries {
    /// 수익률 값만 추출합니다.
    pub fn values(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|(_, r)| *r).collect()
    }

    fn returns(&self) -> Float64Chunked {
        self.values().into_iter().collect()
    }

    pub fn mean(&self) -> Option<f64> {
        self.returns().mean()
    }

    /// 표본 표준편차. 유효 값이 2개 미만이면 `None`.
    pub fn std(&self) -> Option<f64> {
        let returns = self.returns();
        if returns.len() - returns.null_count() < 2 {
            return None;
        }
        returns.std(1)
    }
}

/// 월간/연간 수익률 통계.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ReturnsStats {
    pub monthly_mean: Option<f64>,
    pub monthly_std: Option<f64>,
    pub annual_mean: Option<f64>,
    pub annual_std: Option<f64>,
}

/// `date`, `adj_close` 열에서 기간말 수익률 시계열을 계산합니다.
///
/// 조정 종가가 결측인 행은 건너뛰며, 유효한 관측값이 없는 기간(행이 없는 달 포함)은
/// 시계열에 나타나지 않습니다. 그다음 기간의 수익률은 마지막으로 관측된 기간 대비입니다.
pub fn returns_series(table: &Table, period: Period) -> TableResult<ReturnsSeries> {
    table.require_dates(columns::DATE)?;
    table.require_numeric(columns::ADJ_CLOSE)?;

    // 기간별 마지막 유효 관측값 → 직전 기간 대비 변화율
    let resampled = table
        .frame()
        .clone()
        .lazy()
        .select([
            col(columns::DATE).cast(DataType::Date),
            float(columns::ADJ_CLOSE),
        ])
        .filter(
            col(columns::DATE)
                .is_not_null()
                .and(col(columns::ADJ_CLOSE).is_not_null()),
        )
        .sort([columns::DATE], SortMultipleOptions::default())
        .group_by_dynamic(col(columns::DATE), Vec::<Expr>::new(), period.window())
        .agg([col(columns::ADJ_CLOSE).last()])
        .with_column(pct_change(col(columns::ADJ_CLOSE)).alias(RETURN))
        .collect()?;

    let starts = date_values(resampled.column(columns::DATE)?)?;
    let returns = float_values(resampled.column(RETURN)?)?;

    let points = starts
        .into_iter()
        .zip(returns)
        .filter_map(|(start, value)| start.map(|s| (period.period_end(s), value)))
        .collect();

    Ok(ReturnsSeries { period, points })
}

/// 월간/연간 수익률의 평균과 표본 표준편차를 계산합니다.
pub fn returns_stats(table: &Table) -> TableResult<ReturnsStats> {
    let monthly = returns_series(table, Period::Month)?;
    let annual = returns_series(table, Period::Year)?;

    Ok(ReturnsStats {
        monthly_mean: monthly.mean(),
        monthly_std: monthly.std(),
        annual_mean: annual.mean(),
        annual_std: annual.std(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ticker_core::TableError;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn table(rows: &[(NaiveDate, Option<f64>)]) -> Table {
        let dates: Vec<NaiveDate> = rows.iter().map(|(d, _)| *d).collect();
        let prices: Vec<Option<f64>> = rows.iter().map(|(_, p)| *p).collect();
        Table::new(df! { "date" => dates, "adj_close" => prices }.unwrap())
    }

    #[test]
    fn test_monthly_series_uses_last_observation() {
        let t = table(&[
            (date(2024, 1, 2), Some(100.0)),
            (date(2024, 1, 31), Some(110.0)),
            (date(2024, 2, 15), Some(99.0)),
            (date(2024, 2, 29), None), // 결측은 건너뜀
            (date(2024, 3, 1), Some(132.0)),
        ]);

        let series = returns_series(&t, Period::Month).unwrap();

        let ends: Vec<_> = series.points.iter().map(|(d, _)| *d).collect();
        assert_eq!(ends, vec![date(2024, 1, 31), date(2024, 2, 29), date(2024, 3, 31)]);
        assert_eq!(series.points[0].1, None);
        assert!((series.points[1].1.unwrap() - -10.0).abs() < 1e-9);
        assert!((series.points[2].1.unwrap() - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_month_without_rows_is_absent() {
        // 2월 거래일 없음: 2월 항목 없이 3월 수익률은 1월 대비
        let t = table(&[
            (date(2024, 1, 31), Some(100.0)),
            (date(2024, 3, 28), Some(120.0)),
        ]);

        let series = returns_series(&t, Period::Month).unwrap();

        assert_eq!(series.points.len(), 2);
        assert_eq!(series.points[1].0, date(2024, 3, 31));
        assert!((series.points[1].1.unwrap() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_annual_series_period_end() {
        let t = table(&[
            (date(2022, 12, 30), Some(50.0)),
            (date(2023, 6, 1), Some(60.0)),
            (date(2023, 12, 29), Some(75.0)),
        ]);
        let series = returns_series(&t, Period::Year).unwrap();

        assert_eq!(series.points.len(), 2);
        assert_eq!(series.points[0].0, date(2022, 12, 31));
        assert_eq!(series.points[1].0, date(2023, 12, 31));
        assert!((series.points[1].1.unwrap() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_unsorted_rows_bucket_chronologically() {
        let t = table(&[
            (date(2024, 2, 28), Some(120.0)),
            (date(2024, 1, 31), Some(100.0)),
            (date(2024, 2, 1), Some(90.0)),
        ]);
        let series = returns_series(&t, Period::Month).unwrap();
        assert!((series.points[1].1.unwrap() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_period_stats_are_missing() {
        let t = table(&[(date(2024, 5, 1), Some(1.0)), (date(2024, 5, 2), Some(2.0))]);
        let stats = returns_stats(&t).unwrap();
        assert_eq!(stats, ReturnsStats::default());
    }

    #[test]
    fn test_two_periods_give_mean_without_std() {
        let t = table(&[(date(2024, 5, 31), Some(100.0)), (date(2024, 6, 28), Some(105.0))]);
        let stats = returns_stats(&t).unwrap();
        assert!((stats.monthly_mean.unwrap() - 5.0).abs() < 1e-9);
        assert_eq!(stats.monthly_std, None);
        assert_eq!(stats.annual_mean, None);
    }

    #[test]
    fn test_series_std_is_sample_std() {
        let series = ReturnsSeries {
            period: Period::Month,
            points: vec![
                (date(2024, 1, 31), None),
                (date(2024, 2, 29), Some(1.0)),
                (date(2024, 3, 31), Some(3.0)),
            ],
        };
        assert_eq!(series.mean(), Some(2.0));
        assert!((series.std().unwrap() - 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_missing_columns() {
        let t = Table::new(df! { "date" => &[date(2024, 1, 1)] }.unwrap());
        assert_eq!(
            returns_stats(&t).unwrap_err(),
            TableError::ColumnNotFound("adj_close".to_string())
        );
    }
}
