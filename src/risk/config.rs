//! Risk policy: the scalars that shape bankroll and stop placement.

use std::str::FromStr;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// How the stop distance is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopMode {
    /// `stop_loss_pct` of the entry price
    #[default]
    Percent,
    /// `atr_multiple` times ATR, falling back to percent without enough history
    Atr,
}

impl FromStr for StopMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "percent" | "pct" => Ok(Self::Percent),
            "atr" => Ok(Self::Atr),
            other => Err(format!("unknown stop mode '{}' (expected percent or atr)", other)),
        }
    }
}

impl std::fmt::Display for StopMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopMode::Percent => f.write_str("percent"),
            StopMode::Atr => f.write_str("atr"),
        }
    }
}

/// Policy scalars threaded explicitly into every engine call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskPolicy {
    /// Fraction of total value used as bankroll before psychology scaling
    pub base_pct: f64,

    /// Multiply `base_pct` by the readiness factor
    pub scale_by_psychology: bool,

    /// Fraction of bankroll risked on one trade
    pub risk_per_trade_pct: f64,

    /// Stop distance as a fraction of entry
    pub stop_loss_pct: f64,

    pub stop_mode: StopMode,

    /// ATR multiple used in `StopMode::Atr`
    pub atr_multiple: f64,

    /// Bars averaged for the ATR
    pub atr_lookback: usize,
}

impl Default for RiskPolicy {
    fn default() -> Self {
        Self {
            base_pct: 1.0,             // Whole account is the bankroll
            scale_by_psychology: true,
            risk_per_trade_pct: 0.01,  // 1% of bankroll per trade
            stop_loss_pct: 0.01,       // Stop 1% under entry
            stop_mode: StopMode::Percent,
            atr_multiple: 2.0,
            atr_lookback: 14,
        }
    }
}

impl RiskPolicy {
    /// Reject values no computation can use.
    ///
    /// Bankroll and stop sign checks stay with the engine so they surface as
    /// `InvalidAllocation` or `InvalidStopConfiguration`. Risk per trade has no
    /// engine error of its own and must be positive here.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("base_pct", self.base_pct),
            ("risk_per_trade_pct", self.risk_per_trade_pct),
            ("stop_loss_pct", self.stop_loss_pct),
            ("atr_multiple", self.atr_multiple),
        ] {
            if !value.is_finite() {
                bail!("{} must be a finite number, got {}", name, value);
            }
        }
        if !(self.risk_per_trade_pct > 0.0) {
            bail!("risk_per_trade_pct must be > 0, got {}", self.risk_per_trade_pct);
        }
        if self.atr_lookback == 0 {
            bail!("atr_lookback must be at least 1");
        }
        Ok(())
    }
}

/// Parse a truthy flag the way the environment spells it: 1/true/yes/y.
/// Anything else is false.
pub fn parse_flag(raw: &str) -> std::result::Result<bool, String> {
    Ok(matches!(
        raw.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "y"
    ))
}
