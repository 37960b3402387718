//! 설정 관리.
//!
//! TOML 파일과 `TICKER__` 접두사 환경 변수에서 애플리케이션 설정을 읽습니다.
//! 모든 섹션에 기본값이 있으므로 설정 파일이 없어도 동작합니다.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
    /// 데이터 소스 설정
    #[serde(default)]
    pub source: SourceConfig,
    /// 요약 내보내기 설정
    #[serde(default)]
    pub export: ExportConfig,
    /// 차트 설정
    #[serde(default)]
    pub chart: ChartConfig,
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
    /// span 종료 이벤트 출력
    #[serde(default)]
    pub span_events: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            span_events: false,
        }
    }
}

/// 시세 데이터 소스 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    /// Yahoo Finance chart API 기본 URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// 요청 User-Agent
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
        }
    }
}

/// 요약 테이블 내보내기 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExportConfig {
    /// 내보낼 디렉토리 (존재해야 함)
    pub data_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
        }
    }
}

impl ExportConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// 회사 레이블에서 요약 파일 경로를 만듭니다.
    ///
    /// 레이블은 앞뒤 공백을 제거하고 소문자로 바꿉니다.
    pub fn summary_path(&self, company: &str) -> PathBuf {
        self.data_dir
            .join(format!("{}_analysis.csv", company.trim().to_lowercase()))
    }
}

/// 차트 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChartConfig {
    /// 가로 크기 (px)
    pub width: u32,
    /// 세로 크기 (px)
    pub height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 600,
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값과 환경 변수만 사용합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix("TICKER")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
