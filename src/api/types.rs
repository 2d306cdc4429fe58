//! Response types for the Yahoo Finance chart endpoint.

use anyhow::{bail, Result};
use serde::Deserialize;
use tracing::warn;

use crate::models::PriceBar;

/// Top-level body of `/v8/finance/chart/{symbol}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartResponse {
    pub chart: ChartBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartBody {
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
    #[serde(default)]
    pub error: Option<ChartError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartResult {
    pub indicators: ChartIndicators,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartIndicators {
    #[serde(default)]
    pub quote: Vec<QuoteSeries>,
}

/// Column-oriented OHLCV arrays; any cell may be null on halted days.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteSeries {
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
}

impl ChartResponse {
    /// Flatten into chronological bars, skipping rows with a missing
    /// high, low, or close.
    pub fn into_bars(self) -> Result<Vec<PriceBar>> {
        if let Some(err) = self.chart.error {
            bail!("Chart error {}: {}", err.code, err.description);
        }

        let Some(result) = self.chart.result.and_then(|r| r.into_iter().next()) else {
            return Ok(Vec::new());
        };
        let Some(quote) = result.indicators.quote.into_iter().next() else {
            return Ok(Vec::new());
        };

        let rows = quote.high.len().min(quote.low.len()).min(quote.close.len());
        let mut bars = Vec::with_capacity(rows);
        let mut skipped = 0usize;

        for i in 0..rows {
            match (quote.high[i], quote.low[i], quote.close[i]) {
                (Some(high), Some(low), Some(close)) => bars.push(PriceBar { high, low, close }),
                _ => skipped += 1,
            }
        }

        if skipped > 0 {
            warn!(skipped = skipped, kept = bars.len(), "Skipped incomplete price bars");
        }

        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chart_with_null_rows() {
        let body = r#"{
            "chart": {
                "result": [{
                    "meta": {"symbol": "AAPL"},
                    "timestamp": [1, 2, 3],
                    "indicators": {
                        "quote": [{
                            "open": [1.0, 2.0, 3.0],
                            "high": [10.0, null, 12.0],
                            "low": [9.0, 9.5, 11.0],
                            "close": [9.5, 10.0, 11.5],
                            "volume": [100, 200, 300]
                        }]
                    }
                }],
                "error": null
            }
        }"#;

        let resp: ChartResponse = serde_json::from_str(body).unwrap();
        let bars = resp.into_bars().unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0], PriceBar::new(10.0, 9.0, 9.5));
        assert_eq!(bars[1], PriceBar::new(12.0, 11.0, 11.5));
    }

    #[test]
    fn test_chart_error_is_reported() {
        let body = r#"{
            "chart": {
                "result": null,
                "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}
            }
        }"#;

        let resp: ChartResponse = serde_json::from_str(body).unwrap();
        let err = resp.into_bars().unwrap_err();
        assert!(err.to_string().contains("delisted"));
    }

    #[test]
    fn test_empty_result_yields_no_bars() {
        let body = r#"{"chart": {"result": [], "error": null}}"#;
        let resp: ChartResponse = serde_json::from_str(body).unwrap();
        assert!(resp.into_bars().unwrap().is_empty());
    }
}
