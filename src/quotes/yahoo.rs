use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use serde_json::Value;
use url::Url;

use crate::config::ProviderConfig;
use crate::error::AppError;
use crate::model::{LookbackWindow, PriceBar, PriceSeries};

use super::QuoteProvider;

/// Client for the Yahoo Finance chart endpoint (`/v8/finance/chart/{symbol}`).
pub struct YahooChartClient {
    http: reqwest::Client,
    base_url: Url,
}

impl YahooChartClient {
    pub fn new(base_url: &str, user_agent: &str, request_timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_str(user_agent)?);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(request_timeout)
            .build()
            .context("failed to build quote HTTP client")?;
        let base_url = Url::parse(base_url)
            .with_context(|| format!("invalid provider base_url '{}'", base_url))?;
        Ok(Self { http, base_url })
    }

    pub fn from_config(cfg: &ProviderConfig) -> Result<Self> {
        Self::new(
            &cfg.base_url,
            &cfg.user_agent,
            Duration::from_millis(cfg.request_timeout_ms),
        )
    }

    /// Chart URL with the symbol encoded as a single path segment.
    pub fn chart_url(&self, symbol: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                AppError::Config(format!("base_url '{}' cannot be a base", self.base_url))
            })?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol]);
        Ok(url)
    }

    fn compact_error_body(body: &str) -> String {
        let normalized = body.split_whitespace().collect::<Vec<_>>().join(" ");
        if normalized.chars().count() > 180 {
            format!("{}...", normalized.chars().take(180).collect::<String>())
        } else {
            normalized
        }
    }
}

#[async_trait]
impl QuoteProvider for YahooChartClient {
    async fn fetch_series(&self, symbol: &str, window: LookbackWindow) -> Result<PriceSeries> {
        let period2 = chrono::Utc::now().timestamp();
        let period1 = period2 - window.lookback_days() * 86_400;
        let period1_s = period1.to_string();
        let period2_s = period2.to_string();

        let url = self.chart_url(symbol)?;
        tracing::debug!(symbol, window = %window, "fetching chart");

        let response = self
            .http
            .get(url)
            .query(&[
                ("period1", period1_s.as_str()),
                ("period2", period2_s.as_str()),
                ("interval", window.bar_interval()),
                ("includePrePost", "false"),
            ])
            .send()
            .await
            .map_err(AppError::from)
            .with_context(|| format!("chart request for {} failed", symbol))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Provider {
                symbol: symbol.to_string(),
                msg: format!("status={} {}", status, Self::compact_error_body(&body)),
            }
            .into());
        }

        let root: Value = response
            .json()
            .await
            .map_err(AppError::from)
            .with_context(|| format!("chart JSON for {} could not be parsed", symbol))?;

        let series = parse_chart_response(symbol, window, &root)?;
        tracing::debug!(symbol, window = %window, bars = series.len(), "chart fetched");
        Ok(series)
    }
}

/// Turn a chart payload into a series. Rows with a null close are skipped.
pub fn parse_chart_response(
    symbol: &str,
    window: LookbackWindow,
    root: &Value,
) -> Result<PriceSeries> {
    let chart = root.get("chart").ok_or_else(|| AppError::Provider {
        symbol: symbol.to_string(),
        msg: "payload missing 'chart'".to_string(),
    })?;

    if let Some(err) = chart.get("error").filter(|e| !e.is_null()) {
        let code = err.get("code").and_then(Value::as_str).unwrap_or("unknown");
        let description = err
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default();
        return Err(AppError::Provider {
            symbol: symbol.to_string(),
            msg: format!("{}: {}", code, description),
        }
        .into());
    }

    let Some(result) = chart
        .get("result")
        .and_then(Value::as_array)
        .and_then(|r| r.first())
    else {
        return Err(AppError::Provider {
            symbol: symbol.to_string(),
            msg: "payload has no result".to_string(),
        }
        .into());
    };

    let timestamps = result
        .get("timestamp")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    let quote = result
        .get("indicators")
        .and_then(|i| i.get("quote"))
        .and_then(Value::as_array)
        .and_then(|q| q.first());

    let column = |name: &str, idx: usize| -> Option<f64> {
        quote
            .and_then(|q| q.get(name))
            .and_then(Value::as_array)
            .and_then(|a| a.get(idx))
            .and_then(Value::as_f64)
    };

    let mut bars = Vec::with_capacity(timestamps.len());
    for (idx, ts) in timestamps.iter().enumerate() {
        let Some(secs) = ts.as_i64() else {
            continue;
        };
        let Some(close) = column("close", idx) else {
            continue;
        };
        bars.push(PriceBar {
            timestamp_ms: (secs.max(0) as u64).saturating_mul(1_000),
            open: column("open", idx).unwrap_or(close),
            high: column("high", idx).unwrap_or(close),
            low: column("low", idx).unwrap_or(close),
            close,
            volume: column("volume", idx).unwrap_or(0.0),
        });
    }

    Ok(PriceSeries::new(symbol, window, bars))
}
