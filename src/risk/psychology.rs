//! Readiness scoring: sleep and exercise fused into a bounded risk factor.
//!
//! The numeric factor comes from an exponential penalty on normalized
//! deficits:
//!
//! ```text
//! ds = clamp((6 - sleep) / 2, 0, 1)
//! de = clamp((40 - exercise) / 20, 0, 1)
//! f  = 0.2 + 0.8 * exp(-3 * (0.95 * ds + 0.05 * de))
//! ```
//!
//! The alert and guidance come from fixed tables keyed by the categorical
//! levels, so the classification stays exhaustive and an unlisted pair
//! maps to `AlertLabel::Unknown`.

use crate::models::{AlertLabel, ExerciseLevel, ReadinessInput, RiskFactor, SleepLevel};

const SLEEP_TARGET_HOURS: f64 = 6.0;
const SLEEP_RAMP_HOURS: f64 = 2.0;
const LIGHT_REST_HOURS: f64 = 4.0;

const EXERCISE_TARGET_MINUTES: f64 = 40.0;
const EXERCISE_RAMP_MINUTES: f64 = 20.0;
const MODERATE_EXERCISE_MINUTES: u32 = 20;
const HIGH_EXERCISE_MINUTES: u32 = 40;

// Sleep-dominant. Kept as shipped even though older notes mention 65/35.
const SLEEP_WEIGHT: f64 = 0.95;
const EXERCISE_WEIGHT: f64 = 0.05;
const PENALTY_ALPHA: f64 = 3.0;

/// Lowest factor the fusion can approach; never reached exactly.
pub const FACTOR_FLOOR: f64 = 0.2;
const FACTOR_SPAN: f64 = 0.8;

const UNEXPECTED_COMBINATION: &str = "Unexpected combination.";

/// Alert and description for each (sleep, exercise) pair.
pub type RiskMatrix = [(SleepLevel, ExerciseLevel, AlertLabel, &'static str)];

pub const RISK_MATRIX: &RiskMatrix = &[
    (
        SleepLevel::SleepDeprived,
        ExerciseLevel::Inactive,
        AlertLabel::HighRisk,
        "Severe fatigue and inactivity: judgment, focus, and discipline highly compromised.",
    ),
    (
        SleepLevel::SleepDeprived,
        ExerciseLevel::Moderate,
        AlertLabel::HighRisk,
        "Exercise provides some balance, but lack of sleep dominates; high chance of costly mistakes.",
    ),
    (
        SleepLevel::SleepDeprived,
        ExerciseLevel::High,
        AlertLabel::HighRisk,
        "Strong fitness helps, but poor rest still limits focus and reaction time.",
    ),
    (
        SleepLevel::LightRest,
        ExerciseLevel::Inactive,
        AlertLabel::HighRisk,
        "Partial rest plus inactivity: sluggish responses, reactive decision-making.",
    ),
    (
        SleepLevel::LightRest,
        ExerciseLevel::Moderate,
        AlertLabel::ModerateRisk,
        "Fair balance, but not peak performance; reduce trade size and frequency.",
    ),
    (
        SleepLevel::LightRest,
        ExerciseLevel::High,
        AlertLabel::Caution,
        "Reasonable discipline, but endurance may fade in longer sessions.",
    ),
    (
        SleepLevel::WellRested,
        ExerciseLevel::Inactive,
        AlertLabel::ModerateRisk,
        "Mind is sharp, but low fitness means reduced stamina in volatile markets.",
    ),
    (
        SleepLevel::WellRested,
        ExerciseLevel::Moderate,
        AlertLabel::Caution,
        "Balanced state; trade cautiously with discipline, avoid overconfidence.",
    ),
    (
        SleepLevel::WellRested,
        ExerciseLevel::High,
        AlertLabel::Optimal,
        "Peak focus, strong discipline, and endurance; ideal trading state.",
    ),
];

/// Guidance text per alert.
pub type GuidanceTable = [(AlertLabel, &'static str)];

pub const TRADING_GUIDANCE: &GuidanceTable = &[
    (
        AlertLabel::Optimal,
        "Conditions are excellent. Trade normally within your risk rules.",
    ),
    (
        AlertLabel::Caution,
        "Conditions are decent. Reduce position size slightly and monitor stamina.",
    ),
    (
        AlertLabel::ModerateRisk,
        "Conditions are mixed. Reduce trade frequency and size; stay defensive.",
    ),
    (
        AlertLabel::HighRisk,
        "Avoid trading. High probability of emotional or impulsive mistakes.",
    ),
];

/// Scores physiological readiness.
pub struct PsychologyScorer;

impl PsychologyScorer {
    /// Score sleep hours and exercise minutes into a `RiskFactor`.
    pub fn score(sleep_hours: f64, exercise_minutes: u32) -> RiskFactor {
        Self::score_with_tables(sleep_hours, exercise_minutes, RISK_MATRIX, TRADING_GUIDANCE)
    }

    pub fn score_input(input: &ReadinessInput) -> RiskFactor {
        Self::score(input.sleep_hours, input.exercise_minutes)
    }

    /// Same as [`score`](Self::score) against caller-supplied tables.
    pub fn score_with_tables(
        sleep_hours: f64,
        exercise_minutes: u32,
        matrix: &RiskMatrix,
        guidance: &GuidanceTable,
    ) -> RiskFactor {
        let sleep_level = Self::sleep_level(sleep_hours);
        let exercise_level = Self::exercise_level(exercise_minutes);

        let (ds, de) = Self::deficits(sleep_hours, exercise_minutes);
        let value = Self::fuse_penalty(ds, de);

        let (alert, description, advice) =
            Self::lookup(matrix, guidance, sleep_level, exercise_level);

        RiskFactor {
            value,
            sleep_level,
            exercise_level,
            alert,
            note: format!(
                "{} (sleep={}, exercise={}, risk scale x{:.2})",
                description, sleep_level, exercise_level, value
            ),
            guidance: advice.to_string(),
        }
    }

    pub fn sleep_level(sleep_hours: f64) -> SleepLevel {
        if sleep_hours >= SLEEP_TARGET_HOURS {
            SleepLevel::WellRested
        } else if sleep_hours >= LIGHT_REST_HOURS {
            SleepLevel::LightRest
        } else {
            SleepLevel::SleepDeprived
        }
    }

    pub fn exercise_level(exercise_minutes: u32) -> ExerciseLevel {
        if exercise_minutes < MODERATE_EXERCISE_MINUTES {
            ExerciseLevel::Inactive
        } else if exercise_minutes < HIGH_EXERCISE_MINUTES {
            ExerciseLevel::Moderate
        } else {
            ExerciseLevel::High
        }
    }

    /// Normalized (sleep, exercise) deficits: 0 means on target, 1 means
    /// a full ramp below it.
    pub fn deficits(sleep_hours: f64, exercise_minutes: u32) -> (f64, f64) {
        let ds = ((SLEEP_TARGET_HOURS - sleep_hours) / SLEEP_RAMP_HOURS).clamp(0.0, 1.0);
        let de = ((EXERCISE_TARGET_MINUTES - f64::from(exercise_minutes)) / EXERCISE_RAMP_MINUTES)
            .clamp(0.0, 1.0);
        (ds, de)
    }

    /// Exponential penalty fusion into `[0.2, 1.0]`.
    pub fn fuse_penalty(sleep_deficit: f64, exercise_deficit: f64) -> f64 {
        let weighted = SLEEP_WEIGHT * sleep_deficit + EXERCISE_WEIGHT * exercise_deficit;
        let raw = (-PENALTY_ALPHA * weighted).exp();
        FACTOR_FLOOR + FACTOR_SPAN * raw
    }

    fn lookup(
        matrix: &RiskMatrix,
        guidance: &GuidanceTable,
        sleep_level: SleepLevel,
        exercise_level: ExerciseLevel,
    ) -> (AlertLabel, &'static str, &'static str) {
        let Some(&(_, _, alert, description)) = matrix
            .iter()
            .find(|(s, e, _, _)| *s == sleep_level && *e == exercise_level)
        else {
            return (AlertLabel::Unknown, UNEXPECTED_COMBINATION, "");
        };

        let text = guidance
            .iter()
            .find(|(label, _)| *label == alert)
            .map(|(_, text)| *text)
            .unwrap_or("");

        (alert, description, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_optimal_readiness() {
        let factor = PsychologyScorer::score(8.0, 90);

        assert_eq!(factor.sleep_level, SleepLevel::WellRested);
        assert_eq!(factor.exercise_level, ExerciseLevel::High);
        assert_eq!(PsychologyScorer::deficits(8.0, 90), (0.0, 0.0));
        assert_eq!(factor.value, 1.0);
        assert_eq!(factor.alert, AlertLabel::Optimal);
        assert!(factor.guidance.starts_with("Conditions are excellent"));
    }

    #[test]
    fn test_deprived_readiness() {
        let factor = PsychologyScorer::score(3.0, 10);

        assert_eq!(factor.sleep_level, SleepLevel::SleepDeprived);
        assert_eq!(factor.exercise_level, ExerciseLevel::Inactive);
        assert_eq!(PsychologyScorer::deficits(3.0, 10), (1.0, 1.0));
        let expected = 0.2 + 0.8 * (-3.0f64).exp();
        assert!((factor.value - expected).abs() < EPS);
        assert!((factor.value - 0.2398).abs() < 1e-4);
        assert_eq!(factor.alert, AlertLabel::HighRisk);
        assert!(factor.guidance.starts_with("Avoid trading"));
    }

    #[test]
    fn test_classification_boundaries() {
        assert_eq!(PsychologyScorer::sleep_level(6.0), SleepLevel::WellRested);
        assert_eq!(PsychologyScorer::sleep_level(5.99), SleepLevel::LightRest);
        assert_eq!(PsychologyScorer::sleep_level(4.0), SleepLevel::LightRest);
        assert_eq!(PsychologyScorer::sleep_level(3.99), SleepLevel::SleepDeprived);

        assert_eq!(PsychologyScorer::exercise_level(19), ExerciseLevel::Inactive);
        assert_eq!(PsychologyScorer::exercise_level(20), ExerciseLevel::Moderate);
        assert_eq!(PsychologyScorer::exercise_level(39), ExerciseLevel::Moderate);
        assert_eq!(PsychologyScorer::exercise_level(40), ExerciseLevel::High);
    }

    #[test]
    fn test_factor_bounded_over_input_domain() {
        for tenth_hours in 0..=120 {
            for minutes in 0..=120 {
                let f = PsychologyScorer::score(tenth_hours as f64 / 10.0, minutes).value;
                assert!((FACTOR_FLOOR..=1.0).contains(&f), "factor {} out of range", f);
            }
        }
    }

    #[test]
    fn test_factor_monotonic_in_sleep() {
        for minutes in [0, 20, 35, 40, 120] {
            let mut prev = 0.0;
            for tenth_hours in 0..=120 {
                let f = PsychologyScorer::score(tenth_hours as f64 / 10.0, minutes).value;
                assert!(f >= prev, "sleep monotonicity broken at {}h/{}m", tenth_hours, minutes);
                prev = f;
            }
        }
    }

    #[test]
    fn test_factor_monotonic_in_exercise() {
        for hours in [0.0, 4.5, 5.5, 6.0, 12.0] {
            let mut prev = 0.0;
            for minutes in 0..=120 {
                let f = PsychologyScorer::score(hours, minutes).value;
                assert!(f >= prev, "exercise monotonicity broken at {}h/{}m", hours, minutes);
                prev = f;
            }
        }
    }

    #[test]
    fn test_sleep_dominates_exercise() {
        // Full exercise deficit alone barely moves the factor
        let no_exercise = PsychologyScorer::score(8.0, 0).value;
        let no_sleep = PsychologyScorer::score(0.0, 120).value;
        assert!(no_exercise > 0.85);
        assert!(no_sleep < 0.3);
    }

    #[test]
    fn test_deterministic() {
        let a = PsychologyScorer::score(5.3, 27);
        let b = PsychologyScorer::score(5.3, 27);
        assert_eq!(a.value.to_bits(), b.value.to_bits());
        assert_eq!(a, b);
    }

    #[test]
    fn test_note_format() {
        let factor = PsychologyScorer::score(5.0, 30);
        assert_eq!(factor.alert, AlertLabel::ModerateRisk);
        assert!(factor.note.starts_with("Fair balance"));
        assert!(factor
            .note
            .ends_with(&format!("(sleep=Light rest, exercise=Moderate activity, risk scale x{:.2})", factor.value)));
    }

    #[test]
    fn test_every_pair_has_known_alert() {
        for sleep in [0.0, 5.0, 8.0] {
            for minutes in [0, 30, 60] {
                let factor = PsychologyScorer::score(sleep, minutes);
                assert_ne!(factor.alert, AlertLabel::Unknown);
                assert!(!factor.guidance.is_empty());
            }
        }
    }

    #[test]
    fn test_missing_matrix_entry_falls_back_to_unknown() {
        let partial = &RISK_MATRIX[..8]; // drops (WellRested, High)
        let factor = PsychologyScorer::score_with_tables(8.0, 90, partial, TRADING_GUIDANCE);

        assert_eq!(factor.alert, AlertLabel::Unknown);
        assert_eq!(factor.guidance, "");
        assert!(factor.note.starts_with(UNEXPECTED_COMBINATION));
        // Numeric factor does not depend on the tables
        assert_eq!(factor.value, 1.0);
    }

    #[test]
    fn test_missing_guidance_is_empty() {
        let factor = PsychologyScorer::score_with_tables(8.0, 90, RISK_MATRIX, &[]);
        assert_eq!(factor.alert, AlertLabel::Optimal);
        assert_eq!(factor.guidance, "");
    }
}
