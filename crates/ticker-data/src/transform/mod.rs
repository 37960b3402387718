//! 원본 테이블 변환.
//!
//! 데이터 소스 → [`normalize`] → [`materialize_dates`] 순서로 적용합니다.
//! 모든 함수는 입력을 빌려 새 테이블을 반환합니다.

mod dates;
mod normalize;

pub use dates::materialize_dates;
pub use normalize::{group_fields, normalize, normalize_label};
