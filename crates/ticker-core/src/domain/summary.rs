//! 분석 요약 테이블.
//!
//! 평균(`mean`)과 표준편차(`std`) 두 행, 추적 지표별 열로 구성된 고정 형태입니다.

use std::fmt;

use super::table::columns;

/// 추적 지표.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Open,
    High,
    Low,
    Close,
    AdjClose,
    Volume,
    DailyReturn,
    DailyRange,
    MonthlyReturn,
    AnnualReturn,
}

impl Metric {
    /// 요약 테이블 열 순서.
    pub const ALL: [Metric; 10] = [
        Metric::Open,
        Metric::High,
        Metric::Low,
        Metric::Close,
        Metric::AdjClose,
        Metric::Volume,
        Metric::DailyReturn,
        Metric::DailyRange,
        Metric::MonthlyReturn,
        Metric::AnnualReturn,
    ];

    /// 지표에 대응하는 열 이름.
    pub fn column_name(&self) -> &'static str {
        match self {
            Metric::Open => columns::OPEN,
            Metric::High => columns::HIGH,
            Metric::Low => columns::LOW,
            Metric::Close => columns::CLOSE,
            Metric::AdjClose => columns::ADJ_CLOSE,
            Metric::Volume => columns::VOLUME,
            Metric::DailyReturn => columns::DAILY_RETURN,
            Metric::DailyRange => columns::DAILY_RANGE,
            Metric::MonthlyReturn => columns::MONTHLY_RETURN,
            Metric::AnnualReturn => columns::ANNUAL_RETURN,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// 요약 테이블의 한 행.
///
/// 필드 순서가 내보내기 파일의 헤더 순서입니다.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SummaryRow {
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub adj_close: Option<f64>,
    pub volume: Option<f64>,
    pub daily_return: Option<f64>,
    pub daily_range: Option<f64>,
    pub monthly_return: Option<f64>,
    pub annual_return: Option<f64>,
}

impl SummaryRow {
    /// 지표별 값 함수로 행을 생성합니다.
    pub fn from_fn<F>(mut f: F) -> Self
    where
        F: FnMut(Metric) -> Option<f64>,
    {
        Self {
            open: f(Metric::Open),
            high: f(Metric::High),
            low: f(Metric::Low),
            close: f(Metric::Close),
            adj_close: f(Metric::AdjClose),
            volume: f(Metric::Volume),
            daily_return: f(Metric::DailyReturn),
            daily_range: f(Metric::DailyRange),
            monthly_return: f(Metric::MonthlyReturn),
            annual_return: f(Metric::AnnualReturn),
        }
    }

    pub fn get(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Open => self.open,
            Metric::High => self.high,
            Metric::Low => self.low,
            Metric::Close => self.close,
            Metric::AdjClose => self.adj_close,
            Metric::Volume => self.volume,
            Metric::DailyReturn => self.daily_return,
            Metric::DailyRange => self.daily_range,
            Metric::MonthlyReturn => self.monthly_return,
            Metric::AnnualReturn => self.annual_return,
        }
    }
}

/// 회사별 분석 요약.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSummary {
    /// 회사 레이블
    pub company: String,
    /// 평균 행
    pub mean: SummaryRow,
    /// 표본 표준편차 행
    pub std: SummaryRow,
}

impl fmt::Display for AnalysisSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.company)?;
        writeln!(f, "{:<16}{:>16}{:>16}", "", "mean", "std")?;
        for metric in Metric::ALL {
            let cell = |v: Option<f64>| v.map_or_else(|| "NaN".to_string(), |x| format!("{:.3}", x));
            writeln!(
                f,
                "{:<16}{:>16}{:>16}",
                metric.column_name(),
                cell(self.mean.get(metric)),
                cell(self.std.get(metric))
            )?;
        }
        Ok(())
    }
}
