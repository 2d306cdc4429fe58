//! Bankroll allocation and position plan produced by the sizing engine.

use serde::{Deserialize, Serialize};

/// Risk capital carved out of the account for new trades.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BankrollAllocation {
    /// Bankroll in account currency
    pub amount: f64,

    /// Fraction of total account value the bankroll represents
    pub fraction_of_total: f64,
}

/// Where the stop distance came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopBasis {
    /// Fixed percentage of the entry price
    Percent,
    /// Multiple of the average true range
    Atr,
}

impl StopBasis {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopBasis::Percent => "percent",
            StopBasis::Atr => "atr",
        }
    }
}

impl std::fmt::Display for StopBasis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Share count and stop for a single long entry. Values are unrounded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionPlan {
    pub entry_price: f64,

    /// Capital at risk on this trade (bankroll * risk per trade)
    pub risk_capital_per_trade: f64,

    /// Distance from entry to stop in price units
    pub risk_per_share: f64,

    pub stop_price: f64,

    /// Target quantity; fractional shares allowed
    pub share_count: f64,

    pub stop_basis: StopBasis,

    /// Stop distance as a fraction of entry
    pub stop_pct: f64,
}

impl PositionPlan {
    /// Notional value of the full position at entry.
    pub fn notional(&self) -> f64 {
        self.share_count * self.entry_price
    }
}
