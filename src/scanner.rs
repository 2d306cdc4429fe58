//! Scan runner: wires readiness, bankroll, market data, and sizing together.
//!
//! Order matters for the rejection contract:
//! 1. Validate the request
//! 2. Score readiness and allocate the bankroll (`InvalidAllocation` stops here)
//! 3. Check the stop configuration before any position math
//! 4. Fetch bars, estimate volatility, size the position (`PriceUnavailable`
//!    when there is no usable price)
//!
//! Each scan is independent; nothing is retried at this level.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::api::PriceBarProvider;
use crate::models::{
    BankrollAllocation, PositionPlan, ReadinessInput, RiskFactor, VolatilityEstimate,
};
use crate::risk::{
    BankrollAllocator, PositionSizer, PsychologyScorer, RiskPolicy, ScanError, StopMode,
    VolatilityEstimator,
};

const MAX_SLEEP_HOURS: f64 = 12.0;
const MAX_EXERCISE_MINUTES: u32 = 120;

/// Sleep must lie in [0, 12] hours and exercise in [0, 120] minutes.
pub fn validate_readiness(readiness: &ReadinessInput) -> Result<(), ScanError> {
    let sleep = readiness.sleep_hours;
    if !(0.0..=MAX_SLEEP_HOURS).contains(&sleep) {
        return Err(ScanError::InvalidInput(format!(
            "sleep_hours must be within [0, {}], got {}",
            MAX_SLEEP_HOURS, sleep
        )));
    }
    if readiness.exercise_minutes > MAX_EXERCISE_MINUTES {
        return Err(ScanError::InvalidInput(format!(
            "exercise_minutes must be within [0, {}], got {}",
            MAX_EXERCISE_MINUTES, readiness.exercise_minutes
        )));
    }
    Ok(())
}

/// Inputs for one morning scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRequest {
    pub symbol: String,

    /// Total account value in account currency
    pub total_value: f64,

    pub readiness: ReadinessInput,
}

impl ScanRequest {
    pub fn new(symbol: impl Into<String>, total_value: f64, sleep_hours: f64, exercise_minutes: u32) -> Self {
        Self {
            symbol: symbol.into(),
            total_value,
            readiness: ReadinessInput::new(sleep_hours, exercise_minutes),
        }
    }

    /// Enforce the input domain: positive account value, sleep in [0, 12],
    /// exercise in [0, 120], non-empty symbol.
    pub fn validate(&self) -> Result<(), ScanError> {
        if self.symbol.trim().is_empty() {
            return Err(ScanError::InvalidInput("symbol must not be empty".to_string()));
        }
        if !(self.total_value > 0.0) || !self.total_value.is_finite() {
            return Err(ScanError::InvalidInput(format!(
                "total_value must be > 0, got {}",
                self.total_value
            )));
        }
        validate_readiness(&self.readiness)?;
        Ok(())
    }

    /// Normalized ticker.
    pub fn normalized_symbol(&self) -> String {
        self.symbol.trim().to_uppercase()
    }
}

/// Everything a completed scan produced, unrounded.
#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    pub symbol: String,
    pub created_at: DateTime<Utc>,
    pub request: ScanRequest,
    pub factor: RiskFactor,
    pub allocation: BankrollAllocation,
    pub volatility: VolatilityEstimate,
    pub plan: PositionPlan,
    pub policy: RiskPolicy,
}

/// Runs scans against a market data provider under a fixed policy.
pub struct Scanner {
    provider: Arc<dyn PriceBarProvider>,
    policy: RiskPolicy,
}

impl Scanner {
    pub fn new(provider: Arc<dyn PriceBarProvider>, policy: RiskPolicy) -> Self {
        Self { provider, policy }
    }

    /// Run the full pipeline for one request.
    pub async fn scan(&self, request: &ScanRequest) -> Result<ScanOutcome, ScanError> {
        request.validate()?;
        let symbol = request.normalized_symbol();
        let policy = &self.policy;

        let factor = PsychologyScorer::score_input(&request.readiness);
        info!(
            symbol = %symbol,
            factor = factor.value,
            alert = %factor.alert.as_str(),
            "Readiness scored"
        );

        let allocation = BankrollAllocator::allocate(
            request.total_value,
            &factor,
            policy.base_pct,
            policy.scale_by_psychology,
        )?;
        debug!(
            amount = allocation.amount,
            fraction = allocation.fraction_of_total,
            "Bankroll allocated"
        );

        // Percent stop is also the ATR fallback, so it must always be valid
        PositionSizer::check_stop_pct(policy.stop_loss_pct)?;
        if policy.stop_mode == StopMode::Atr {
            PositionSizer::check_atr_multiple(policy.atr_multiple)?;
        }

        let bars = match self.provider.fetch_bars(&symbol, policy.atr_lookback).await {
            Ok(bars) => bars,
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "Price bars unavailable");
                Vec::new()
            }
        };

        let volatility = VolatilityEstimator::estimate(&bars, policy.atr_lookback);
        match volatility.last_close {
            Some(close) if close > 0.0 && close.is_finite() => {}
            Some(close) => {
                warn!(symbol = %symbol, close = close, "Last close is not a usable price");
                return Err(ScanError::PriceUnavailable);
            }
            None => {
                warn!(symbol = %symbol, "No price data available");
                return Err(ScanError::PriceUnavailable);
            }
        }

        let plan = match (policy.stop_mode, volatility.atr) {
            (StopMode::Atr, Some(atr)) => PositionSizer::size_with_atr(
                &allocation,
                policy.risk_per_trade_pct,
                volatility.last_close,
                atr,
                policy.atr_multiple,
            )?,
            (StopMode::Atr, None) => {
                warn!(
                    symbol = %symbol,
                    bars = bars.len(),
                    lookback = policy.atr_lookback,
                    "Not enough history for ATR stop, using percent stop"
                );
                PositionSizer::size(
                    &allocation,
                    policy.risk_per_trade_pct,
                    volatility.last_close,
                    policy.stop_loss_pct,
                )?
            }
            (StopMode::Percent, _) => PositionSizer::size(
                &allocation,
                policy.risk_per_trade_pct,
                volatility.last_close,
                policy.stop_loss_pct,
            )?,
        };

        info!(
            symbol = %symbol,
            entry = plan.entry_price,
            stop = plan.stop_price,
            shares = plan.share_count,
            basis = %plan.stop_basis,
            "Position sized"
        );

        Ok(ScanOutcome {
            symbol,
            created_at: Utc::now(),
            request: request.clone(),
            factor,
            allocation,
            volatility,
            plan,
            policy: policy.clone(),
        })
    }
}
