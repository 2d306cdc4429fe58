//! Readiness model: sleep/exercise inputs and the risk factor derived from them.

use serde::{Deserialize, Serialize};

/// Physiological inputs reported for a single morning scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReadinessInput {
    /// Hours slept last night (0 to 12)
    pub sleep_hours: f64,

    /// Minutes of exercise (0 to 120)
    pub exercise_minutes: u32,
}

impl ReadinessInput {
    pub fn new(sleep_hours: f64, exercise_minutes: u32) -> Self {
        Self {
            sleep_hours,
            exercise_minutes,
        }
    }
}

/// How rested the trader is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SleepLevel {
    SleepDeprived,
    LightRest,
    WellRested,
}

impl SleepLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SleepLevel::SleepDeprived => "Sleep-deprived",
            SleepLevel::LightRest => "Light rest",
            SleepLevel::WellRested => "Well-rested",
        }
    }
}

impl std::fmt::Display for SleepLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How active the trader has been.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseLevel {
    Inactive,
    Moderate,
    High,
}

impl ExerciseLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseLevel::Inactive => "Inactive",
            ExerciseLevel::Moderate => "Moderate activity",
            ExerciseLevel::High => "High activity",
        }
    }
}

impl std::fmt::Display for ExerciseLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Categorical risk alert shown alongside the numeric factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLabel {
    Optimal,
    Caution,
    ModerateRisk,
    HighRisk,
    Unknown,
}

impl AlertLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLabel::Optimal => "Optimal",
            AlertLabel::Caution => "Caution",
            AlertLabel::ModerateRisk => "Moderate Risk",
            AlertLabel::HighRisk => "High Risk",
            AlertLabel::Unknown => "Unknown",
        }
    }

    /// Inverse of `as_str`; anything unrecognized is `Unknown`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Optimal" => AlertLabel::Optimal,
            "Caution" => AlertLabel::Caution,
            "Moderate Risk" => AlertLabel::ModerateRisk,
            "High Risk" => AlertLabel::HighRisk,
            _ => AlertLabel::Unknown,
        }
    }

    /// Traffic-light marker used in terminal output.
    pub fn icon(&self) -> &'static str {
        match self {
            AlertLabel::Optimal => "🟢",
            AlertLabel::Caution => "🟡",
            AlertLabel::ModerateRisk => "🟠",
            AlertLabel::HighRisk => "🔴",
            AlertLabel::Unknown => "❓",
        }
    }
}

impl std::fmt::Display for AlertLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.icon(), self.as_str())
    }
}

/// Readiness multiplier and its categorical explanation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    /// Multiplier applied to risk capital (0.2 to 1.0)
    pub value: f64,

    pub sleep_level: SleepLevel,

    pub exercise_level: ExerciseLevel,

    pub alert: AlertLabel,

    /// Description plus levels and the factor to two decimals
    pub note: String,

    /// Trading guidance for the alert; empty when the alert is unknown
    pub guidance: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_display_includes_icon() {
        assert_eq!(AlertLabel::HighRisk.to_string(), "🔴 High Risk");
        assert_eq!(AlertLabel::Optimal.as_str(), "Optimal");
    }

    #[test]
    fn test_alert_label_parses_back() {
        for alert in [
            AlertLabel::Optimal,
            AlertLabel::Caution,
            AlertLabel::ModerateRisk,
            AlertLabel::HighRisk,
            AlertLabel::Unknown,
        ] {
            assert_eq!(AlertLabel::from_label(alert.as_str()), alert);
        }
        assert_eq!(AlertLabel::from_label("Elevated Risk"), AlertLabel::Unknown);
    }

    #[test]
    fn test_level_labels() {
        assert_eq!(SleepLevel::LightRest.to_string(), "Light rest");
        assert_eq!(ExerciseLevel::Moderate.to_string(), "Moderate activity");
    }
}
