//! Rounded, human-facing view of a scan.
//!
//! The engine never rounds; this is the only place numbers are cut down for
//! display or JSON output.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::db::StoredScan;
use crate::models::AlertLabel;
use crate::scanner::ScanOutcome;

const FACTOR_DP: u32 = 3;
const MONEY_DP: u32 = 2;
const PCT_DP: u32 = 4;
const PRICE_DP: u32 = 4;

/// Round an engine value for presentation (banker's rounding).
fn round(value: f64, dp: u32) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default().round_dp(dp)
}

/// Scan result as shown to the trader.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanReport {
    /// Storage id; absent when the scan was not persisted
    pub id: Option<i64>,
    pub created_at: String,
    pub symbol: String,
    pub total_value: Decimal,
    pub sleep_hours: f64,
    pub exercise_minutes: i64,

    pub psychology_score: Decimal,
    pub alert: AlertLabel,
    pub note: String,
    pub guidance: String,

    pub bankroll_amount: Decimal,
    pub bankroll_pct: Decimal,

    pub risk_per_trade_pct: Decimal,
    pub risk_per_trade_usd: Decimal,

    pub stop_basis: String,
    pub stop_loss_pct: Decimal,
    pub atr: Option<Decimal>,

    pub entry_price: Decimal,
    pub position_size: Decimal,
    pub whole_shares: i64,
    pub notional: Decimal,
    pub stop_price: Decimal,
    pub risk_per_share: Decimal,
}

impl ScanReport {
    pub fn from_outcome(id: Option<i64>, outcome: &ScanOutcome) -> Self {
        let plan = &outcome.plan;
        Self {
            id,
            created_at: outcome.created_at.to_rfc3339(),
            symbol: outcome.symbol.clone(),
            total_value: round(outcome.request.total_value, MONEY_DP),
            sleep_hours: outcome.request.readiness.sleep_hours,
            exercise_minutes: i64::from(outcome.request.readiness.exercise_minutes),
            psychology_score: round(outcome.factor.value, FACTOR_DP),
            alert: outcome.factor.alert,
            note: outcome.factor.note.clone(),
            guidance: outcome.factor.guidance.clone(),
            bankroll_amount: round(outcome.allocation.amount, MONEY_DP),
            bankroll_pct: round(outcome.allocation.fraction_of_total, PCT_DP),
            risk_per_trade_pct: round(outcome.policy.risk_per_trade_pct, PCT_DP),
            risk_per_trade_usd: round(plan.risk_capital_per_trade, MONEY_DP),
            stop_basis: plan.stop_basis.as_str().to_string(),
            stop_loss_pct: round(plan.stop_pct, PCT_DP),
            atr: outcome.volatility.atr.map(|atr| round(atr, PRICE_DP)),
            entry_price: round(plan.entry_price, PRICE_DP),
            position_size: round(plan.share_count, PRICE_DP),
            whole_shares: plan.share_count.floor() as i64,
            notional: round(plan.notional(), MONEY_DP),
            stop_price: round(plan.stop_price, PRICE_DP),
            risk_per_share: round(plan.risk_per_share, PRICE_DP),
        }
    }

    pub fn from_stored(scan: &StoredScan) -> Self {
        Self {
            id: Some(scan.id),
            created_at: scan.created_at.clone(),
            symbol: scan.symbol.clone(),
            total_value: round(scan.total_value, MONEY_DP),
            sleep_hours: scan.sleep_hours,
            exercise_minutes: scan.exercise_minutes,
            psychology_score: round(scan.psychology_score, FACTOR_DP),
            alert: AlertLabel::from_label(&scan.psychology_alert),
            note: scan.psychology_note.clone(),
            guidance: scan.psychology_guidance.clone(),
            bankroll_amount: round(scan.bankroll_amount, MONEY_DP),
            bankroll_pct: round(scan.bankroll_pct, PCT_DP),
            risk_per_trade_pct: round(scan.risk_per_trade_pct, PCT_DP),
            risk_per_trade_usd: round(scan.risk_per_trade, MONEY_DP),
            stop_basis: scan.stop_basis.clone(),
            stop_loss_pct: round(scan.stop_loss_used_pct, PCT_DP),
            atr: scan.atr.map(|atr| round(atr, PRICE_DP)),
            entry_price: round(scan.entry_price, PRICE_DP),
            position_size: round(scan.position_size, PRICE_DP),
            whole_shares: scan.whole_shares(),
            notional: round(scan.position_size * scan.entry_price, MONEY_DP),
            stop_price: round(scan.stop_loss_at, PRICE_DP),
            risk_per_share: round(scan.risk_per_share, PRICE_DP),
        }
    }
}

impl std::fmt::Display for ScanReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let title = match self.id {
            Some(id) => format!(" SCAN #{} {} ", id, self.symbol),
            None => format!(" SCAN {} ", self.symbol),
        };
        writeln!(f, "\n{:=^60}", title)?;
        writeln!(f, "Created: {}", self.created_at)?;
        writeln!(f)?;
        writeln!(f, "--- Readiness ---")?;
        writeln!(f, "Sleep:        {}h", self.sleep_hours)?;
        writeln!(f, "Exercise:     {} min", self.exercise_minutes)?;
        writeln!(f, "Score:        {}", self.psychology_score)?;
        writeln!(f, "Alert:        {}", self.alert)?;
        writeln!(f, "Note:         {}", self.note)?;
        if !self.guidance.is_empty() {
            writeln!(f, "Guidance:     {}", self.guidance)?;
        }
        writeln!(f)?;
        writeln!(f, "--- Bankroll ---")?;
        writeln!(f, "Account:      ${}", self.total_value)?;
        writeln!(f, "Bankroll:     ${} ({:.2}%)", self.bankroll_amount, self.bankroll_pct * dec!(100))?;
        writeln!(f, "Risk/Trade:   ${} ({:.2}%)", self.risk_per_trade_usd, self.risk_per_trade_pct * dec!(100))?;
        writeln!(f)?;
        writeln!(f, "--- Position ---")?;
        writeln!(f, "Entry:        {}", self.entry_price)?;
        writeln!(f, "Stop:         {} ({} stop, {:.2}% below entry)",
            self.stop_price, self.stop_basis, self.stop_loss_pct * dec!(100))?;
        if let Some(atr) = self.atr {
            writeln!(f, "ATR:          {}", atr)?;
        }
        writeln!(f, "Risk/Share:   {}", self.risk_per_share)?;
        writeln!(f, "Size:         {} ({} whole shares)", self.position_size, self.whole_shares)?;
        writeln!(f, "Notional:     ${}", self.notional)?;
        writeln!(f, "{:=^60}", "")?;
        Ok(())
    }
}
