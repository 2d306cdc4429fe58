//! Position sizing from bankroll, entry price, and stop distance.
//!
//! Long-only: the stop sits below entry. Nothing here rounds; presentation
//! rounding happens in the report layer.

use crate::models::{BankrollAllocation, PositionPlan, StopBasis};

use super::ScanError;

/// Turns a bankroll into a share count and stop price.
pub struct PositionSizer;

impl PositionSizer {
    /// Reject a stop percentage that cannot produce a positive stop distance.
    pub fn check_stop_pct(stop_loss_pct: f64) -> Result<(), ScanError> {
        if !(stop_loss_pct > 0.0) {
            return Err(ScanError::InvalidStopConfiguration(format!(
                "stop_loss_pct must be > 0, got {}",
                stop_loss_pct
            )));
        }
        Ok(())
    }

    /// Reject an ATR multiple that cannot produce a positive stop distance.
    pub fn check_atr_multiple(multiple: f64) -> Result<(), ScanError> {
        if !(multiple > 0.0) {
            return Err(ScanError::InvalidStopConfiguration(format!(
                "atr_multiple must be > 0, got {}",
                multiple
            )));
        }
        Ok(())
    }

    /// Entry must be a finite price above zero; anything else is treated as
    /// no usable price.
    fn usable_entry(entry_price: Option<f64>) -> Result<f64, ScanError> {
        match entry_price {
            Some(price) if price > 0.0 && price.is_finite() => Ok(price),
            _ => Err(ScanError::PriceUnavailable),
        }
    }

    /// Size with a percentage stop.
    ///
    /// * `risk_capital_per_trade = allocation.amount * risk_per_trade_pct`
    /// * `risk_per_share = entry * stop_loss_pct`
    /// * `stop_price = entry - risk_per_share`
    /// * `share_count = risk_capital_per_trade / risk_per_share`
    ///
    /// The stop is validated before the entry price is looked at.
    pub fn size(
        allocation: &BankrollAllocation,
        risk_per_trade_pct: f64,
        entry_price: Option<f64>,
        stop_loss_pct: f64,
    ) -> Result<PositionPlan, ScanError> {
        Self::check_stop_pct(stop_loss_pct)?;
        let entry_price = Self::usable_entry(entry_price)?;

        let risk_per_share = entry_price * stop_loss_pct;
        Ok(Self::plan(
            allocation,
            risk_per_trade_pct,
            entry_price,
            risk_per_share,
            StopBasis::Percent,
        ))
    }

    /// Size with the stop `multiple` ATRs under entry.
    ///
    /// A zero ATR (flat history) leaves no stop distance, and a distance at or
    /// beyond the entry puts the stop at or below zero. Both are rejected as a
    /// stop configuration error.
    pub fn size_with_atr(
        allocation: &BankrollAllocation,
        risk_per_trade_pct: f64,
        entry_price: Option<f64>,
        atr: f64,
        multiple: f64,
    ) -> Result<PositionPlan, ScanError> {
        Self::check_atr_multiple(multiple)?;
        let entry_price = Self::usable_entry(entry_price)?;

        let risk_per_share = atr * multiple;
        if !(risk_per_share > 0.0) {
            return Err(ScanError::InvalidStopConfiguration(format!(
                "ATR stop distance must be > 0, got {} (atr {} x {})",
                risk_per_share, atr, multiple
            )));
        }
        if risk_per_share >= entry_price {
            return Err(ScanError::InvalidStopConfiguration(format!(
                "ATR stop distance {} reaches below zero from entry {} (atr {} x {})",
                risk_per_share, entry_price, atr, multiple
            )));
        }

        Ok(Self::plan(
            allocation,
            risk_per_trade_pct,
            entry_price,
            risk_per_share,
            StopBasis::Atr,
        ))
    }

    fn plan(
        allocation: &BankrollAllocation,
        risk_per_trade_pct: f64,
        entry_price: f64,
        risk_per_share: f64,
        stop_basis: StopBasis,
    ) -> PositionPlan {
        let risk_capital_per_trade = allocation.amount * risk_per_trade_pct;

        PositionPlan {
            entry_price,
            risk_capital_per_trade,
            risk_per_share,
            stop_price: entry_price - risk_per_share,
            share_count: risk_capital_per_trade / risk_per_share,
            stop_basis,
            stop_pct: risk_per_share / entry_price,
        }
    }
}
