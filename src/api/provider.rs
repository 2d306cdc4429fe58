//! Market data seam between the scanner and whatever serves price bars.

use std::path::Path;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tracing::info;

use crate::models::PriceBar;

/// Source of daily OHLC bars, oldest first.
///
/// An error or an empty sequence both mean "no price" to the scanner.
/// Retry and caching policy, if any, belongs to the implementation.
#[async_trait]
pub trait PriceBarProvider: Send + Sync {
    async fn fetch_bars(&self, symbol: &str, lookback: usize) -> Result<Vec<PriceBar>>;
}

/// Fixed in-memory bars, for tests and offline runs.
#[derive(Debug, Clone, Default)]
pub struct StaticBars {
    bars: Vec<PriceBar>,
}

impl StaticBars {
    pub fn new(bars: Vec<PriceBar>) -> Self {
        Self { bars }
    }

    /// Parse a JSON array of `{"high", "low", "close"}` objects.
    ///
    /// Every value must be finite and every bar must have `high >= low`.
    pub fn from_json(raw: &str) -> Result<Self> {
        let bars: Vec<PriceBar> = serde_json::from_str(raw).context("Invalid bars JSON")?;

        for (i, bar) in bars.iter().enumerate() {
            if !(bar.high.is_finite() && bar.low.is_finite() && bar.close.is_finite()) {
                bail!("Bar {} has a non-finite value: {:?}", i, bar);
            }
            if bar.high < bar.low {
                bail!("Bar {} has high {} below low {}", i, bar.high, bar.low);
            }
        }

        Ok(Self::new(bars))
    }

    /// Load bars from a JSON file (see [`from_json`](Self::from_json)).
    pub async fn from_file(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read bars file {}", path.display()))?;
        let bars = Self::from_json(&raw)
            .with_context(|| format!("Failed to load bars file {}", path.display()))?;

        info!(path = %path.display(), bars = bars.bars.len(), "Loaded bars from file");
        Ok(bars)
    }
}

#[async_trait]
impl PriceBarProvider for StaticBars {
    async fn fetch_bars(&self, _symbol: &str, _lookback: usize) -> Result<Vec<PriceBar>> {
        Ok(self.bars.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_bars_returns_copy() {
        let provider = StaticBars::new(vec![PriceBar::new(2.0, 1.0, 1.5)]);
        let bars = tokio_test::block_on(provider.fetch_bars("ANY", 14)).unwrap();
        assert_eq!(bars, vec![PriceBar::new(2.0, 1.0, 1.5)]);
    }

    #[test]
    fn test_from_json() {
        let raw = r#"[
            {"high": 10.0, "low": 9.0, "close": 9.5},
            {"high": 10.5, "low": 10.5, "close": 10.5}
        ]"#;
        let provider = StaticBars::from_json(raw).unwrap();
        assert_eq!(
            provider.bars,
            vec![PriceBar::new(10.0, 9.0, 9.5), PriceBar::new(10.5, 10.5, 10.5)]
        );
    }

    #[test]
    fn test_from_json_rejects_inverted_bar() {
        let raw = r#"[
            {"high": 10.0, "low": 9.0, "close": 9.5},
            {"high": 9.0, "low": 10.0, "close": 9.5}
        ]"#;
        let err = StaticBars::from_json(raw).unwrap_err();
        assert!(err.to_string().contains("Bar 1"));
    }

    #[test]
    fn test_from_json_rejects_malformed() {
        assert!(StaticBars::from_json(r#"[{"high": 1.0, "low": 0.5}]"#).is_err());
        assert!(StaticBars::from_json("not json").is_err());
    }

    #[tokio::test]
    async fn test_from_file() {
        let path = std::env::temp_dir().join(format!("tradefit-bars-{}.json", std::process::id()));
        tokio::fs::write(&path, r#"[{"high": 2.0, "low": 1.0, "close": 1.5}]"#)
            .await
            .unwrap();

        let provider = StaticBars::from_file(&path).await.unwrap();
        tokio::fs::remove_file(&path).await.unwrap();

        assert_eq!(provider.bars, vec![PriceBar::new(2.0, 1.0, 1.5)]);
    }

    #[tokio::test]
    async fn test_from_missing_file() {
        let path = std::env::temp_dir().join("tradefit-bars-does-not-exist.json");
        let err = StaticBars::from_file(&path).await.unwrap_err();
        assert!(err.to_string().contains("Failed to read bars file"));
    }
}
