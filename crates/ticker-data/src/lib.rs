//! 시세 데이터 조회 및 테이블 정규화.
//!
//! 이 crate는 다음을 제공합니다:
//! - 외부 시세 제공자에서 원본 가격 테이블을 가져오는 데이터 소스 ([`PriceSource`])
//! - 열/인덱스 이름 규칙을 맞추는 정규화 ([`normalize`])
//! - `date` 열과 위치 인덱스를 보장하는 날짜 열 생성 ([`materialize_dates`])

pub mod error;
pub mod provider;
pub mod transform;

pub use error::{FetchError, Result};
pub use provider::{PriceSource, YahooChartSource};
pub use transform::{group_fields, materialize_dates, normalize, normalize_label};
