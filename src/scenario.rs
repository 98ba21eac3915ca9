use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::EnvError;

/// Difficulty preset selecting the dynamics parameters of an episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [Scenario::Easy, Scenario::Medium, Scenario::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::Easy => "easy",
            Scenario::Medium => "medium",
            Scenario::Hard => "hard",
        }
    }

    pub fn config(&self) -> ScenarioConfig {
        match self {
            Scenario::Easy => ScenarioConfig {
                base_price: 0.25,
                base_load: 0.40,
                load_threshold: 0.90,
                charge_rate_scale: 0.10,
            },
            Scenario::Medium => ScenarioConfig {
                base_price: 0.30,
                base_load: 0.50,
                load_threshold: 0.85,
                charge_rate_scale: 0.08,
            },
            Scenario::Hard => ScenarioConfig {
                base_price: 0.35,
                base_load: 0.60,
                load_threshold: 0.80,
                charge_rate_scale: 0.06,
            },
        }
    }
}

impl FromStr for Scenario {
    type Err = EnvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Scenario::Easy),
            "medium" => Ok(Scenario::Medium),
            "hard" => Ok(Scenario::Hard),
            other => Err(EnvError::InvalidScenario(other.to_string())),
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four tunable simulation parameters, fixed for a whole episode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScenarioConfig {
    /// Long-run mean of the price process.
    pub base_price: f64,
    /// Long-run mean of the grid-load process.
    pub base_load: f64,
    /// Grid load above which the overload penalty accrues.
    pub load_threshold: f64,
    /// Charge gained per step at full action.
    pub charge_rate_scale: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_labels() {
        for scenario in Scenario::ALL {
            assert_eq!(scenario.as_str().parse::<Scenario>().unwrap(), scenario);
        }
    }

    #[test]
    fn rejects_unknown_label() {
        let err = "extreme".parse::<Scenario>().unwrap_err();
        assert!(matches!(err, EnvError::InvalidScenario(ref s) if s == "extreme"));
        assert!("Easy".parse::<Scenario>().is_err());
    }

    #[test]
    fn medium_table_values() {
        let cfg = Scenario::Medium.config();
        assert_eq!(cfg.base_price, 0.30);
        assert_eq!(cfg.base_load, 0.50);
        assert_eq!(cfg.load_threshold, 0.85);
        assert_eq!(cfg.charge_rate_scale, 0.08);
    }

    #[test]
    fn hard_is_harder_than_easy() {
        let easy = Scenario::Easy.config();
        let hard = Scenario::Hard.config();
        assert!(hard.charge_rate_scale < easy.charge_rate_scale);
        assert!(hard.load_threshold < easy.load_threshold);
        assert!(hard.base_price > easy.base_price);
        assert!(hard.base_load > easy.base_load);
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Scenario::Hard).unwrap(), "\"hard\"");
    }
}
