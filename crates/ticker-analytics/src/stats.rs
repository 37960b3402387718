//! 수익률/요약 계산용 polars 식.
//!
//! 결측값(null, NaN)은 집계에서 제외합니다.

use polars::prelude::*;
use ticker_core::TableResult;

/// 숫자 열을 `f64`로 읽는 식. NaN은 null이 됩니다.
pub(crate) fn float(name: &str) -> Expr {
    col(name).cast(DataType::Float64).fill_nan(lit(NULL))
}

/// 직전 행 대비 변화율 (%).
///
/// 직전 값이 0이라 유한하지 않은 결과는 null.
pub(crate) fn pct_change(expr: Expr) -> Expr {
    let change = expr.pct_change(lit(1)) * lit(100.0);
    when(change.clone().is_finite())
        .then(change)
        .otherwise(lit(NULL))
}

/// 표본 표준편차 (ddof 1). 유효 값이 2개 미만이면 null.
pub(crate) fn sample_std(expr: Expr) -> Expr {
    when(expr.clone().count().gt(lit(1)))
        .then(expr.std(1))
        .otherwise(lit(NULL))
}

/// 한 행짜리 집계 결과에서 첫 값을 읽습니다.
pub(crate) fn scalar(frame: &DataFrame, name: &str) -> TableResult<Option<f64>> {
    Ok(frame
        .column(name)?
        .cast(&DataType::Float64)?
        .f64()?
        .get(0)
        .filter(|v| v.is_finite()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_std_skip_missing() {
        let frame = df! {
            "x" => &[Some(2.0), None, Some(4.0), Some(4.0), Some(f64::NAN), Some(4.0),
                     Some(5.0), Some(5.0), Some(7.0), Some(9.0)],
        }
        .unwrap();

        let stats = frame
            .lazy()
            .select([
                float("x").mean().alias("mean"),
                sample_std(float("x")).alias("std"),
            ])
            .collect()
            .unwrap();

        assert_eq!(scalar(&stats, "mean").unwrap(), Some(5.0));
        // 표본 표준편차: sqrt(32 / 7)
        let std = scalar(&stats, "std").unwrap().unwrap();
        assert!((std - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_std_needs_two_values() {
        let frame = df! { "x" => &[Some(1.0), None] }.unwrap();
        let stats = frame
            .lazy()
            .select([sample_std(float("x")).alias("std")])
            .collect()
            .unwrap();
        assert_eq!(scalar(&stats, "std").unwrap(), None);
    }

    #[test]
    fn test_pct_change_drops_non_finite() {
        let frame = df! { "x" => &[0.0, 1.0, 1.1] }.unwrap();
        let changes = frame
            .lazy()
            .select([pct_change(float("x")).alias("change")])
            .collect()
            .unwrap();

        let values: Vec<Option<f64>> = changes.column("change").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(values[0], None);
        // 0 → 1 은 무한대
        assert_eq!(values[1], None);
        assert!((values[2].unwrap() - 10.0).abs() < 1e-9);
    }
}
