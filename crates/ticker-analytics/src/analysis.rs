//! 분석 빌더.
//!
//! 정규화·날짜 열 생성이 끝난 가격 테이블에 일간 지표 열을 추가하고,
//! 지표별 평균/표준편차 요약을 만듭니다.
//!
//! # 추가 열
//!
//! - `daily_return`: 조정 종가 일간 변화율 (%), 결측은 다음 유효값으로 채움 (back-fill)
//! - `daily_range`: `high - low`

use std::path::PathBuf;

use polars::prelude::*;
use ticker_core::{
    columns, AnalysisSummary, ExportConfig, Metric, SummaryRow, Table, TableError, TableResult,
};
use tracing::{debug, info, instrument};

use crate::error::Result;
use crate::export::export_summary;
use crate::returns::{returns_stats, ReturnsStats};
use crate::stats::{float, pct_change, sample_std, scalar};

/// 요약 값 반올림 자릿수.
const SUMMARY_DIGITS: u32 = 3;

/// 분석에 필요한 입력 열.
const REQUIRED_COLUMNS: [&str; 6] = [
    columns::OPEN,
    columns::HIGH,
    columns::LOW,
    columns::CLOSE,
    columns::ADJ_CLOSE,
    columns::VOLUME,
];

/// 분석 결과.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// `daily_return`, `daily_range` 열이 추가된 테이블
    pub table: Table,
    /// 지표별 평균/표준편차
    pub summary: AnalysisSummary,
    /// 월간/연간 수익률 통계 (반올림 전)
    pub returns: ReturnsStats,
    /// 요약 파일을 내보낸 경우 그 경로
    pub exported_to: Option<PathBuf>,
}

/// 조정 종가의 일간 변화율 (%) 열.
///
/// 결측 가격은 직전 유효 가격으로 채운 뒤 계산하므로 변화율 0이 됩니다.
/// 결측 결과(항상 첫 행 포함)는 뒤쪽의 가장 가까운 유효값으로 채우고,
/// 뒤에 유효값이 없으면 결측으로 남습니다.
pub fn daily_returns(table: &Table) -> TableResult<Column> {
    table.require_numeric(columns::ADJ_CLOSE)?;

    let changes = table
        .frame()
        .clone()
        .lazy()
        .select([pct_change(float(columns::ADJ_CLOSE)).alias(columns::DAILY_RETURN)])
        .collect()?;

    let filled = changes
        .column(columns::DAILY_RETURN)?
        .as_materialized_series()
        .fill_null(FillNullStrategy::Backward(None))?;
    Ok(Column::from(filled))
}

/// 일간 변동폭 `high - low` 열. 어느 한쪽이 결측이면 결측입니다.
pub fn daily_range(table: &Table) -> TableResult<Column> {
    table.require_numeric(columns::HIGH)?;
    table.require_numeric(columns::LOW)?;

    let range = table
        .frame()
        .clone()
        .lazy()
        .select([(float(columns::HIGH) - float(columns::LOW)).alias(columns::DAILY_RANGE)])
        .collect()?;
    Ok(range.column(columns::DAILY_RANGE)?.clone())
}

/// `daily_return`, `daily_range` 열을 추가한 새 테이블을 반환합니다.
///
/// 같은 이름의 열이 이미 있으면 교체합니다.
pub fn augment(table: &Table) -> TableResult<Table> {
    let returns = daily_returns(table)?;
    let range = daily_range(table)?;

    let mut frame = table.frame().clone();
    frame.with_column(returns)?;
    frame.with_column(range)?;
    table.with_frame(frame)
}

/// 보강된 테이블에서 요약을 계산합니다.
///
/// 월간/연간 수익률 값은 `returns`에서 가져오며 모든 값은 소수점 3자리로
/// 반올림합니다.
pub fn summarize(
    augmented: &Table,
    company: &str,
    returns: &ReturnsStats,
) -> TableResult<AnalysisSummary> {
    let daily: Vec<&str> = Metric::ALL
        .iter()
        .filter(|m| !matches!(m, Metric::MonthlyReturn | Metric::AnnualReturn))
        .map(|m| m.column_name())
        .collect();
    for name in &daily {
        augmented.require_numeric(name)?;
    }

    let aggregates: Vec<Expr> = daily
        .iter()
        .flat_map(|name| {
            [
                float(name)
                    .mean()
                    .round(SUMMARY_DIGITS)
                    .alias(format!("{name}_mean").as_str()),
                sample_std(float(name))
                    .round(SUMMARY_DIGITS)
                    .alias(format!("{name}_std").as_str()),
            ]
        })
        .collect();
    let stats = augmented.frame().clone().lazy().select(aggregates).collect()?;

    let mut means = Vec::with_capacity(Metric::ALL.len());
    let mut stds = Vec::with_capacity(Metric::ALL.len());
    for metric in Metric::ALL {
        let (m, s) = match metric {
            Metric::MonthlyReturn => (
                returns.monthly_mean.map(round_summary),
                returns.monthly_std.map(round_summary),
            ),
            Metric::AnnualReturn => (
                returns.annual_mean.map(round_summary),
                returns.annual_std.map(round_summary),
            ),
            _ => {
                let name = metric.column_name();
                (
                    scalar(&stats, &format!("{name}_mean"))?,
                    scalar(&stats, &format!("{name}_std"))?,
                )
            }
        };
        means.push((metric, m));
        stds.push((metric, s));
    }

    let row = |values: &[(Metric, Option<f64>)]| {
        SummaryRow::from_fn(|metric| {
            values
                .iter()
                .find(|(m, _)| *m == metric)
                .and_then(|(_, v)| *v)
        })
    };

    Ok(AnalysisSummary {
        company: company.to_string(),
        mean: row(&means),
        std: row(&stds),
    })
}

/// polars `round`와 같은 방식의 반올림.
fn round_summary(value: f64) -> f64 {
    let factor = 10f64.powi(SUMMARY_DIGITS as i32);
    (value * factor).round() / factor
}

/// 분석 파이프라인: 검증 → 열 추가 → 수익률 통계 → 요약 → (선택) 내보내기.
///
/// `date` 열이 없으면 [`TableError::MissingDate`], 그 밖의 입력 열이 없으면
/// [`TableError::ColumnNotFound`]로 실패합니다. 내보내기는 마지막 단계이며
/// 실패 시 앞 단계 결과는 반환되지 않습니다.
#[instrument(skip(table, export), fields(rows = table.len()))]
pub fn build_analysis(
    table: &Table,
    company: &str,
    export: Option<&ExportConfig>,
) -> Result<Analysis> {
    if !table.has_column(columns::DATE) {
        return Err(TableError::MissingDate.into());
    }
    for name in REQUIRED_COLUMNS {
        table.require_numeric(name)?;
    }

    let augmented = augment(table)?;
    let returns = returns_stats(&augmented)?;
    debug!(?returns, "periodic returns computed");

    let summary = summarize(&augmented, company, &returns)?;

    let exported_to = match export {
        Some(config) => Some(export_summary(&summary, config)?),
        None => None,
    };

    info!(company, exported = exported_to.is_some(), "analysis built");

    Ok(Analysis {
        table: augmented,
        summary,
        returns,
        exported_to,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ticker_core::float_values;

    use crate::error::AnalyticsError;

    /// 같은 가격 함수로 만든 일봉 테이블 (high = p + 2, low = p - 1).
    fn ohlcv(dates: Vec<NaiveDate>, price: impl Fn(usize) -> f64) -> Table {
        let n = dates.len();
        let p: Vec<f64> = (0..n).map(&price).collect();
        let frame = df! {
            columns::DATE => dates,
            columns::OPEN => p.clone(),
            columns::HIGH => p.iter().map(|x| x + 2.0).collect::<Vec<_>>(),
            columns::LOW => p.iter().map(|x| x - 1.0).collect::<Vec<_>>(),
            columns::CLOSE => p.clone(),
            columns::ADJ_CLOSE => p,
            columns::VOLUME => (0..n).map(|i| 1_000 + i as i64).collect::<Vec<_>>(),
        }
        .unwrap();
        Table::new(frame)
    }

    fn consecutive_days(start: NaiveDate, n: usize) -> Vec<NaiveDate> {
        start.iter_days().take(n).collect()
    }

    fn jan(n: usize) -> Vec<NaiveDate> {
        consecutive_days(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), n)
    }

    fn assert_close(actual: &[Option<f64>], expected: &[Option<f64>]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            match (a, e) {
                (Some(a), Some(e)) => assert!((a - e).abs() < 1e-9, "{a} != {e}"),
                _ => assert_eq!(a, e),
            }
        }
    }

    #[test]
    fn test_daily_returns_backfill_first_row() {
        let table = Table::new(
            df! { columns::ADJ_CLOSE => &[Some(100.0), Some(110.0), None, Some(99.0)] }.unwrap(),
        );

        let returns = float_values(&daily_returns(&table).unwrap()).unwrap();

        // 결측 가격은 직전 가격으로 채워져 변화율 0
        assert_close(&returns, &[Some(10.0), Some(10.0), Some(0.0), Some(-10.0)]);
    }

    #[test]
    fn test_daily_returns_single_row_stays_missing() {
        let table = Table::new(df! { columns::ADJ_CLOSE => &[1.0] }.unwrap());
        let returns = float_values(&daily_returns(&table).unwrap()).unwrap();
        assert_eq!(returns, vec![None]);
    }

    #[test]
    fn test_daily_returns_zero_price_is_missing_then_filled() {
        let table = Table::new(df! { columns::ADJ_CLOSE => &[0.0, 1.0, 1.5] }.unwrap());
        let returns = float_values(&daily_returns(&table).unwrap()).unwrap();
        assert_close(&returns, &[Some(50.0), Some(50.0), Some(50.0)]);
    }

    #[test]
    fn test_daily_range() {
        let table = Table::new(
            df! {
                columns::HIGH => &[Some(5.0), None, Some(3.5)],
                columns::LOW => &[Some(4.0), Some(1.0), Some(3.0)],
            }
            .unwrap(),
        );
        let range = float_values(&daily_range(&table).unwrap()).unwrap();
        assert_close(&range, &[Some(1.0), None, Some(0.5)]);
    }

    #[test]
    fn test_augment_adds_columns_without_touching_input() {
        let table = ohlcv(jan(5), |i| 100.0 + i as f64);

        let augmented = augment(&table).unwrap();

        assert_eq!(table.column_names().len(), 7);
        assert_eq!(augmented.column_names().len(), 9);
        let high = augmented.floats(columns::HIGH).unwrap();
        let low = augmented.floats(columns::LOW).unwrap();
        let range = augmented.floats(columns::DAILY_RANGE).unwrap();
        for i in 0..5 {
            assert_eq!(range[i], Some(high[i].unwrap() - low[i].unwrap()));
        }
        assert!(augmented
            .floats(columns::DAILY_RETURN)
            .unwrap()
            .iter()
            .all(Option::is_some));
    }

    #[test]
    fn test_augment_replaces_existing_columns() {
        let augmented = augment(&ohlcv(jan(3), |_| 1.0)).unwrap();
        let again = augment(&augmented).unwrap();
        assert_eq!(again.column_names(), augmented.column_names());
    }

    #[test]
    fn test_constant_price_series() {
        let table = ohlcv(consecutive_days(NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(), 10), |_| 100.0);

        let analysis = build_analysis(&table, "Flat", None).unwrap();

        let returns = analysis.table.floats(columns::DAILY_RETURN).unwrap();
        assert_eq!(returns, vec![Some(0.0); 10]);
        assert_eq!(analysis.summary.mean.daily_return, Some(0.0));
        assert_eq!(analysis.summary.std.daily_return, Some(0.0));
        assert_eq!(analysis.summary.mean.monthly_return, None);
        assert_eq!(analysis.summary.std.monthly_return, None);
        assert_eq!(analysis.summary.mean.annual_return, None);
        assert_eq!(analysis.summary.mean.daily_range, Some(3.0));
        assert_eq!(analysis.summary.mean.adj_close, Some(100.0));
        assert_eq!(analysis.exported_to, None);
    }

    #[test]
    fn test_linear_series_over_three_years() {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2022, 12, 31).unwrap();
        let days: Vec<NaiveDate> = start.iter_days().take_while(|d| *d <= end).collect();
        let price = |i: usize| 100.0 + i as f64;
        let table = ohlcv(days.clone(), price);

        let analysis = build_analysis(&table, "Linear", None).unwrap();

        // 월말 가격으로 직접 계산한 월간 수익률 평균
        let mut month_end_prices = Vec::new();
        for (i, d) in days.iter().enumerate() {
            let is_last = days.get(i + 1).map_or(true, |next| {
                chrono::Datelike::month(next) != chrono::Datelike::month(d)
            });
            if is_last {
                month_end_prices.push(price(i));
            }
        }
        assert_eq!(month_end_prices.len(), 36);
        let hand: Vec<f64> = month_end_prices
            .windows(2)
            .map(|w| (w[1] / w[0] - 1.0) * 100.0)
            .collect();
        let hand_mean = hand.iter().sum::<f64>() / hand.len() as f64;

        let monthly_mean = analysis.summary.mean.monthly_return.unwrap();
        assert!((monthly_mean - hand_mean).abs() < 1e-3);
        assert!(analysis.summary.std.monthly_return.unwrap() >= 0.0);
        assert!(analysis.summary.mean.annual_return.unwrap() > 0.0);
        assert!(analysis.summary.std.annual_return.unwrap() >= 0.0);
    }

    #[test]
    fn test_summary_is_rounded() {
        let table = ohlcv(jan(3), |i| [1.0, 1.0, 1.5][i] + 0.123456);

        let summary = build_analysis(&table, "R", None).unwrap().summary;

        for metric in Metric::ALL {
            for v in [summary.mean.get(metric), summary.std.get(metric)].into_iter().flatten() {
                let scaled = v * 1000.0;
                assert!((scaled - scaled.round()).abs() < 1e-6, "{metric} not rounded");
            }
        }
        assert_eq!(summary.mean.volume, Some(1001.0));
    }

    #[test]
    fn test_all_missing_column_gives_none() {
        let mut frame = ohlcv(jan(3), |_| 1.0).into_frame();
        frame
            .with_column(Series::new(columns::OPEN.into(), [None::<f64>; 3]))
            .unwrap();

        let summary = build_analysis(&Table::new(frame), "Gaps", None).unwrap().summary;
        assert_eq!(summary.mean.open, None);
        assert_eq!(summary.std.open, None);
        assert_eq!(summary.mean.close, Some(1.0));
    }

    #[test]
    fn test_missing_date_column() {
        let frame = ohlcv(jan(2), |_| 1.0).into_frame().drop(columns::DATE).unwrap();

        let err = build_analysis(&Table::new(frame), "NoDate", None).unwrap_err();
        assert!(matches!(err, AnalyticsError::Table(TableError::MissingDate)));
    }

    #[test]
    fn test_missing_metric_column() {
        let frame = ohlcv(jan(2), |_| 1.0).into_frame().drop(columns::VOLUME).unwrap();

        let err = build_analysis(&Table::new(frame), "NoVolume", None).unwrap_err();
        assert!(matches!(
            err,
            AnalyticsError::Table(TableError::ColumnNotFound(ref c)) if c == "volume"
        ));
    }
}
