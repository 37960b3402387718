//! # Ticker Core
//!
//! 시세 분석 도구의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 워크스페이스 전반에서 사용되는 기본 타입을 제공합니다:
//! - polars `DataFrame` 기반 가격 테이블 ([`Table`])
//! - 차트 주석용 이벤트
//! - 분석 요약 테이블
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
