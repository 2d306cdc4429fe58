//! Sizing engine: readiness scoring, volatility, bankroll, and position sizing.
//!
//! Every function here is pure and synchronous. Market data arrives as an
//! already-resolved bar slice; policy arrives as explicit parameters.

mod bankroll;
mod config;
mod error;
mod position_sizer;
mod psychology;
mod volatility;

pub use bankroll::BankrollAllocator;
pub use config::{parse_flag, RiskPolicy, StopMode};
pub use error::ScanError;
pub use position_sizer::PositionSizer;
pub use psychology::PsychologyScorer;
pub use volatility::VolatilityEstimator;
