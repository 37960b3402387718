//! Yahoo Finance chart API 데이터 소스.
//!
//! `v8/finance/chart/{ticker}` 엔드포인트에서 일봉을 받아 원본 테이블로 변환합니다.
//!
//! # 원본 테이블 형태
//!
//! - 행 인덱스: 거래소 현지 시각 타임스탬프, 이름 `Date`
//! - 열: 티커 이름의 struct 열 하나, 필드는 `Adj Close`, `Close`, `High`, `Low`,
//!   `Open`, `Volume`
//! - 열 인덱스 이름: `Price`
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use ticker_data::{PriceSource, YahooChartSource};
//!
//! let source = YahooChartSource::new(&SourceConfig::default())?;
//! let raw = source.fetch("AAPL", Some(start), Some(end)).await?;
//! ```

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use polars::prelude::{Column, DataFrame, NamedFrom, Series};
use reqwest::{Client, Url};
use serde::Deserialize;
use ticker_core::{RowIndex, SourceConfig, Table};
use tracing::{debug, info, instrument, warn};

use super::PriceSource;
use crate::error::{FetchError, Result};
use crate::transform::group_fields;

/// Yahoo Finance chart API 응답 구조
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    /// UTC 대비 거래소 시차 (초)
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
    adjclose: Option<Vec<AdjClose>>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<i64>>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    adjclose: Option<Vec<Option<f64>>>,
}

/// 하나의 거래일 값.
#[derive(Debug, Clone)]
struct QuoteRow {
    time: NaiveDateTime,
    adj_close: Option<f64>,
    close: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    open: Option<f64>,
    volume: Option<i64>,
}

impl QuoteRow {
    /// 가격 필드가 모두 비어 있는지 확인.
    fn is_blank(&self) -> bool {
        self.adj_close.is_none()
            && self.close.is_none()
            && self.high.is_none()
            && self.low.is_none()
            && self.open.is_none()
    }
}

/// Yahoo Finance chart API 데이터 소스.
pub struct YahooChartSource {
    client: Client,
    base_url: String,
}

impl YahooChartSource {
    /// 설정으로 데이터 소스를 생성합니다.
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| FetchError::Network(format!("HTTP client 생성 실패: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// 요청 URL 생성.
    ///
    /// 기간이 모두 없으면 `range=max`, 아니면 `period1`/`period2`를 사용합니다.
    /// `end`는 포함하지 않습니다.
    pub fn chart_url(
        &self,
        ticker: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| FetchError::Provider(format!("잘못된 base URL {}: {}", self.base_url, e)))?;

        url.path_segments_mut()
            .map_err(|_| FetchError::Provider(format!("잘못된 base URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", ticker]);

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("interval", "1d")
                .append_pair("events", "history")
                .append_pair("includeAdjustedClose", "true");

            match (start, end) {
                (None, None) => {
                    query.append_pair("range", "max");
                }
                _ => {
                    let period1 = start.map(day_start_timestamp).unwrap_or(0);
                    let period2 = end
                        .map(day_start_timestamp)
                        .unwrap_or_else(|| Utc::now().timestamp());
                    query
                        .append_pair("period1", &period1.to_string())
                        .append_pair("period2", &period2.to_string());
                }
            }
        }

        Ok(url)
    }

    /// 응답 본문을 원본 테이블로 변환.
    fn parse_body(ticker: &str, body: &str) -> Result<Table> {
        let response: ChartResponse = serde_json::from_str(body)?;

        if let Some(error) = response.chart.error {
            return Err(FetchError::Provider(format!(
                "{} - {} ({})",
                error.code, error.description, ticker
            )));
        }

        let result = response
            .chart
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| FetchError::EmptyRange {
                ticker: ticker.to_string(),
            })?;

        build_table(ticker, result)
    }
}

#[async_trait]
impl PriceSource for YahooChartSource {
    #[instrument(skip(self))]
    async fn fetch(
        &self,
        ticker: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Table> {
        let url = self.chart_url(ticker, start, end)?;
        debug!(%url, "Yahoo Finance chart 요청");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(bytes = body.len(), %status, "Yahoo Finance 응답 수신");

        if !status.is_success() {
            // 오류 응답도 chart.error 형식일 수 있음
            let detail = serde_json::from_str::<ChartResponse>(&body)
                .ok()
                .and_then(|r| r.chart.error)
                .map(|e| format!("{} - {}", e.code, e.description))
                .unwrap_or_else(|| body.chars().take(200).collect());
            warn!(ticker, %status, "Yahoo Finance 오류 응답");
            return Err(FetchError::Provider(format!(
                "{} ({}): {}",
                ticker, status, detail
            )));
        }

        let table = Self::parse_body(ticker, &body)?;
        if table.is_empty() {
            return Err(FetchError::EmptyRange {
                ticker: ticker.to_string(),
            });
        }

        info!(ticker, rows = table.len(), "Yahoo Finance 일봉 수신");
        Ok(table)
    }
}

/// 날짜의 UTC 자정 타임스탬프.
fn day_start_timestamp(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::default()).and_utc().timestamp()
}

/// chart 결과를 `(필드, 티커)` 열 키 테이블로 변환.
fn build_table(ticker: &str, result: ChartResult) -> Result<Table> {
    let offset = result.meta.and_then(|m| m.gmtoffset).unwrap_or(0);
    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let adj_closes = result
        .indicators
        .adjclose
        .and_then(|ac| ac.into_iter().next())
        .and_then(|ac| ac.adjclose);

    let opens = quote.open.unwrap_or_default();
    let highs = quote.high.unwrap_or_default();
    let lows = quote.low.unwrap_or_default();
    let closes = quote.close.unwrap_or_default();
    let volumes = quote.volume.unwrap_or_default();

    let at = |values: &[Option<f64>], i: usize| values.get(i).copied().flatten();

    let mut rows = Vec::with_capacity(timestamps.len());
    for (i, ts) in timestamps.iter().enumerate() {
        let time = DateTime::from_timestamp(ts + offset, 0)
            .ok_or_else(|| FetchError::Parse(format!("잘못된 타임스탬프: {}", ts)))?
            .naive_utc();

        let close = at(&closes, i);
        let row = QuoteRow {
            time,
            // 조정 종가가 없으면 종가 사용
            adj_close: adj_closes
                .as_ref()
                .map_or(close, |ac| at(ac, i)),
            close,
            high: at(&highs, i),
            low: at(&lows, i),
            open: at(&opens, i),
            volume: volumes.get(i).copied().flatten(),
        };

        if !row.is_blank() {
            rows.push(row);
        }
    }

    // 날짜순 정렬, 같은 거래일은 첫 행만 유지
    rows.sort_by_key(|r| r.time);
    rows.dedup_by(|later, earlier| later.time.date() == earlier.time.date());

    let float_column = |field: &str, f: fn(&QuoteRow) -> Option<f64>| {
        Column::from(Series::new(field.into(), rows.iter().map(f).collect::<Vec<_>>()))
    };

    let fields = DataFrame::new(vec![
        float_column("Adj Close", |r| r.adj_close),
        float_column("Close", |r| r.close),
        float_column("High", |r| r.high),
        float_column("Low", |r| r.low),
        float_column("Open", |r| r.open),
        Column::from(Series::new(
            "Volume".into(),
            rows.iter().map(|r| r.volume).collect::<Vec<_>>(),
        )),
    ])?;

    let times: Vec<NaiveDateTime> = rows.iter().map(|r| r.time).collect();
    let table = Table::new(group_fields(fields, ticker)?)
        .with_index(RowIndex::timestamps(Some("Date".to_string()), &times))?
        .with_columns_name(Some("Price".to_string()));

    Ok(table)
}
