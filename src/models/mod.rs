//! Data models for readiness, price bars, and sizing results.

mod market;
mod plan;
mod readiness;

pub use market::{PriceBar, VolatilityEstimate};
pub use plan::{BankrollAllocation, PositionPlan, StopBasis};
pub use readiness::{AlertLabel, ExerciseLevel, ReadinessInput, RiskFactor, SleepLevel};
