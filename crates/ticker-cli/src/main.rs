//! 시세 분석 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 애플 조정 종가 차트 (기본 이벤트 표시)
//! ticker plot -s AAPL -f 2000-01-01 -t 2024-12-31 -o aapl.svg
//!
//! # 대화형 HTML 차트, 이벤트 없이
//! ticker plot -s MSFT --series close --interactive --no-events -o msft.html
//!
//! # 수익률 요약 출력 후 data/apple_analysis.csv로 내보내기
//! ticker analyze -s AAPL --company Apple -f 2010-01-01 --export
//!
//! # 기본 이벤트 목록
//! ticker events
//! ```

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use ticker_core::{default_events, init_logging, AppConfig, LogConfig};
use ticker_data::YahooChartSource;
use tracing::info;

use ticker_cli::commands::analyze::{run_analyze, AnalyzeRequest};
use ticker_cli::commands::events::format_events;
use ticker_cli::commands::parse_optional_date;
use ticker_cli::commands::plot::{plot_ticker, PlotOutput, PlotRequest, SeriesField};

#[derive(Parser)]
#[command(name = "ticker")]
#[command(about = "Historical stock price charts and return statistics", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일
    #[arg(short, long, global = true, default_value = "config/default.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 시계열 차트 그리기
    Plot {
        /// 티커 심볼 (예: AAPL, ^GSPC)
        #[arg(short, long)]
        symbol: String,

        /// 시계열 (adj_close, close, high, low, open, volume)
        #[arg(long, default_value = "adj_close")]
        series: String,

        /// 시작 날짜 (YYYY-MM-DD)
        #[arg(short = 'f', long)]
        from: Option<String>,

        /// 종료 날짜 (YYYY-MM-DD)
        #[arg(short, long)]
        to: Option<String>,

        /// 기본 이벤트 세로선 생략
        #[arg(long)]
        no_events: bool,

        /// 대화형 HTML 차트
        #[arg(long)]
        interactive: bool,

        /// 출력 파일 경로 (지정하지 않으면 stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 수익률 분석 요약
    Analyze {
        /// 티커 심볼
        #[arg(short, long)]
        symbol: String,

        /// 회사 레이블 (기본: 티커)
        #[arg(long)]
        company: Option<String>,

        /// 시작 날짜 (YYYY-MM-DD)
        #[arg(short = 'f', long)]
        from: Option<String>,

        /// 종료 날짜 (YYYY-MM-DD)
        #[arg(short, long)]
        to: Option<String>,

        /// 요약을 데이터 디렉토리에 CSV로 저장
        #[arg(long)]
        export: bool,
    },

    /// 기본 이벤트 목록 보기
    Events {
        /// JSON 형식으로 출력
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config))?;
    init_logging(LogConfig::from(&config.logging))
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    match cli.command {
        Commands::Plot {
            symbol,
            series,
            from,
            to,
            no_events,
            interactive,
            output,
        } => {
            let series = series.parse::<SeriesField>().map_err(|e| anyhow!(e))?;
            let request = PlotRequest {
                ticker: symbol,
                series,
                start: parse_optional_date(from.as_deref())?,
                end: parse_optional_date(to.as_deref())?,
                events: if no_events { Vec::new() } else { default_events() },
                interactive,
                output,
            };

            let source = YahooChartSource::new(&config.source)?;
            match plot_ticker(&source, &request, &config.chart).await? {
                PlotOutput::Saved(path) => {
                    info!("Chart saved to: {}", path.display());
                    println!("차트 저장 위치: {}", path.display());
                }
                PlotOutput::Rendered(document) => println!("{}", document),
            }
        }

        Commands::Analyze {
            symbol,
            company,
            from,
            to,
            export,
        } => {
            let request = AnalyzeRequest {
                ticker: symbol,
                company,
                start: parse_optional_date(from.as_deref())?,
                end: parse_optional_date(to.as_deref())?,
                export,
            };

            let source = YahooChartSource::new(&config.source)?;
            let analysis = run_analyze(&source, &request, &config.export).await?;

            println!("{}", analysis.summary);
            if let Some(path) = analysis.exported_to {
                println!("저장 위치: {}", path.display());
            }
        }

        Commands::Events { json } => {
            print!("{}", format_events(&default_events(), json)?);
        }
    }

    Ok(())
}
