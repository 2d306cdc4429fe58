//! Bankroll allocation scaled by readiness.

use crate::models::{BankrollAllocation, RiskFactor};

use super::ScanError;

/// Derives the risk-capital bankroll from account value.
pub struct BankrollAllocator;

impl BankrollAllocator {
    /// `fraction = base_pct * factor` when scaling, else `base_pct`;
    /// `amount = total_value * fraction`.
    ///
    /// A non-positive amount (zero or negative base, or NaN) is rejected and
    /// nothing downstream should run.
    pub fn allocate(
        total_value: f64,
        factor: &RiskFactor,
        base_pct: f64,
        scale_by_psychology: bool,
    ) -> Result<BankrollAllocation, ScanError> {
        let fraction_of_total = if scale_by_psychology {
            base_pct * factor.value
        } else {
            base_pct
        };

        let amount = total_value * fraction_of_total;
        if !(amount > 0.0) {
            return Err(ScanError::InvalidAllocation { amount });
        }

        Ok(BankrollAllocation {
            amount,
            fraction_of_total,
        })
    }
}
