//! Price bars and the volatility estimate derived from them.

use serde::{Deserialize, Serialize};

/// One OHLC bar (open is not needed for sizing).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl PriceBar {
    pub fn new(high: f64, low: f64, close: f64) -> Self {
        Self { high, low, close }
    }

    /// True range against the previous bar's close.
    pub fn true_range(&self, prev_close: f64) -> f64 {
        (self.high - self.low)
            .max((self.high - prev_close).abs())
            .max((self.low - prev_close).abs())
    }
}

/// Average true range plus the latest close.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VolatilityEstimate {
    /// Absent when there are fewer bars than the lookback
    pub atr: Option<f64>,

    /// Absent only when there are no bars at all
    pub last_close: Option<f64>,
}
