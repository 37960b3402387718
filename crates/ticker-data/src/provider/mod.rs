//! 시세 데이터 소스.

pub mod yahoo;

pub use yahoo::YahooChartSource;

use async_trait::async_trait;
use chrono::NaiveDate;
use ticker_core::Table;

use crate::error::Result;

/// 원본 가격 테이블을 가져오는 데이터 소스.
///
/// 반환되는 테이블은 정규화 전 형태이며, 필드 열이 티커 이름의 struct 열로
/// 묶여 있을 수 있습니다. 오류는 재시도 없이 호출자에게 그대로 전달됩니다.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// 티커와 기간으로 일봉 테이블을 가져옵니다.
    ///
    /// `start`/`end`가 `None`이면 제공자가 허용하는 전체 기간을 사용합니다.
    async fn fetch(
        &self,
        ticker: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Table>;
}
