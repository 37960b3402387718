//! CLI 도구 모음.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - 티커 시계열 차트 (`plot`)
//! - 수익률 분석과 요약 내보내기 (`analyze`)
//! - 기본 이벤트 목록 (`events`)

pub mod commands;
