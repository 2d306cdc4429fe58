//! Yahoo Finance chart client for daily price bars.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use backoff::ExponentialBackoff;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use crate::models::PriceBar;

use super::provider::PriceBarProvider;
use super::types::ChartResponse;

const CHART_API_BASE: &str = "https://query1.finance.yahoo.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_RETRY_ELAPSED: Duration = Duration::from_secs(20);
const USER_AGENT: &str = "Mozilla/5.0 (compatible; tradefit-scan/0.1)";

/// Client for the public chart endpoint (read-only).
pub struct ChartClient {
    client: Client,
    base_url: String,
}

impl ChartClient {
    /// Create a new chart client with default settings.
    pub fn new() -> Result<Self> {
        Self::with_base_url(CHART_API_BASE.to_string())
    }

    /// Create with custom base URL (for testing).
    pub fn with_base_url(base_url: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, base_url })
    }

    /// Chart URL for a symbol, wide enough to cover `lookback` daily bars.
    pub fn chart_url(&self, symbol: &str, lookback: usize) -> String {
        format!(
            "{}/v8/finance/chart/{}?range={}&interval=1d",
            self.base_url.trim_end_matches('/'),
            symbol.trim().to_uppercase(),
            range_for(lookback)
        )
    }

    async fn fetch_chart(&self, url: &str) -> Result<ChartResponse> {
        let policy = ExponentialBackoff {
            max_elapsed_time: Some(MAX_RETRY_ELAPSED),
            ..Default::default()
        };

        backoff::future::retry(policy, || async move {
            let response = self.client.get(url).send().await.map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    warn!(error = %e, "Chart request failed, retrying");
                    backoff::Error::transient(anyhow!(e).context("Failed to fetch chart"))
                } else {
                    backoff::Error::permanent(anyhow!(e).context("Failed to fetch chart"))
                }
            })?;

            let status = response.status();
            match classify_status(status) {
                StatusClass::Success => {}
                StatusClass::Transient => {
                    warn!(status = %status, "Chart request throttled or failed upstream, retrying");
                    return Err(backoff::Error::transient(anyhow!(
                        "Chart request failed: {}",
                        status
                    )));
                }
                StatusClass::Permanent => {
                    let body = response.text().await.unwrap_or_default();
                    return Err(backoff::Error::permanent(anyhow!(
                        "Chart request failed: {} - {}",
                        status,
                        body
                    )));
                }
            }

            response
                .json::<ChartResponse>()
                .await
                .map_err(|e| backoff::Error::permanent(anyhow!(e).context("Failed to parse chart response")))
        })
        .await
    }
}

#[async_trait]
impl PriceBarProvider for ChartClient {
    async fn fetch_bars(&self, symbol: &str, lookback: usize) -> Result<Vec<PriceBar>> {
        let url = self.chart_url(symbol, lookback);
        debug!(url = %url, "Fetching price bars");

        let bars = self.fetch_chart(&url).await?.into_bars()?;
        debug!(symbol = %symbol, bars = bars.len(), "Fetched price bars");

        Ok(bars)
    }
}

/// How a chart response status is handled by the retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusClass {
    Success,
    /// Server-side failure or throttling; worth retrying
    Transient,
    Permanent,
}

fn classify_status(status: StatusCode) -> StatusClass {
    if status.is_success() {
        StatusClass::Success
    } else if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        StatusClass::Transient
    } else {
        StatusClass::Permanent
    }
}

/// Smallest chart range holding `lookback` trading days with room to spare.
fn range_for(lookback: usize) -> &'static str {
    match lookback {
        0..=100 => "6mo",
        101..=200 => "1y",
        201..=450 => "2y",
        _ => "5y",
    }
}
