//! Rejections raised by the sizing pipeline.

use thiserror::Error;

/// Terminal failure for a single scan. Retrying with the same inputs
/// reproduces the same error.
///
/// Insufficient ATR history is not an error; the estimate just has no `atr`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScanError {
    #[error("computed bankroll is {amount}, must be > 0; check total value and BANKROLL_BASE_PCT")]
    InvalidAllocation { amount: f64 },

    #[error("invalid stop configuration: {0}")]
    InvalidStopConfiguration(String),

    #[error("no price data available")]
    PriceUnavailable,

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ScanError {
    /// Short machine-readable code for logs and CLI output.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidAllocation { .. } => "invalid_allocation",
            Self::InvalidStopConfiguration(_) => "invalid_stop_configuration",
            Self::PriceUnavailable => "price_unavailable",
            Self::InvalidInput(_) => "invalid_input",
        }
    }
}
