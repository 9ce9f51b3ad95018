use crate::analysis::RiskModel;
use crate::constants::{DEFAULT_ACCIDENT_BASELINE, DEFAULT_CONGESTION_BASELINE, DEFAULT_TRIAL_COUNT};
use crate::error::{Result, SimError};
use crate::scenario::{BaselineMode, NoiseProfile};
use crate::weights::RiskWeights;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Everything a simulation run depends on besides its input rows.
///
/// `random_seed: None` makes the run nondeterministic: a fresh base seed is
/// drawn for every run. Set a seed to get bit-identical output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub trial_count: u64,
    pub random_seed: Option<u64>,
    pub congestion_baseline: f64,
    pub accident_baseline: f64,
    pub baseline_mode: BaselineMode,
    pub noise: NoiseProfile,
    pub weights: RiskWeights,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            trial_count: DEFAULT_TRIAL_COUNT,
            random_seed: None,
            congestion_baseline: DEFAULT_CONGESTION_BASELINE,
            accident_baseline: DEFAULT_ACCIDENT_BASELINE,
            baseline_mode: BaselineMode::default(),
            noise: NoiseProfile::default(),
            weights: RiskWeights::default(),
        }
    }
}

impl SimulationConfig {
    /// Reads a JSON config. Keys that are absent keep their defaults.
    pub fn from_json_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, p) in [
            ("congestion_baseline", self.congestion_baseline),
            ("accident_baseline", self.accident_baseline),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(SimError::InvalidConfig(format!(
                    "{name} must be within [0, 1], got {p}"
                )));
            }
        }
        self.noise.validate()?;
        self.weights.validate()
    }

    #[must_use]
    pub const fn model(&self) -> RiskModel<'_> {
        RiskModel::new(&self.weights, self.congestion_baseline, self.accident_baseline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = SimulationConfig::from_json_str(
            r#"{ "trial_count": 10, "random_seed": 7, "noise": { "rain_mm": 0.0 } }"#,
        )
        .unwrap();

        assert_eq!(config.trial_count, 10);
        assert_eq!(config.random_seed, Some(7));
        assert_eq!(config.congestion_baseline, DEFAULT_CONGESTION_BASELINE);
        assert_eq!(config.noise.rain_mm, 0.0);
        assert_eq!(config.noise.temperature_c, NoiseProfile::default().temperature_c);
        assert_eq!(config.weights, RiskWeights::default());
    }

    #[test]
    fn weight_table_can_be_overridden() {
        let config = SimulationConfig::from_json_str(
            r#"{ "weights": { "congestion": [
                { "condition": { "op": "above", "field": "rain_mm", "value": 5.0 }, "weight": 0.4 }
            ] } }"#,
        )
        .unwrap();

        assert_eq!(config.weights.congestion.rules.len(), 1);
        assert_eq!(config.weights.accident, RiskWeights::default().accident);
    }

    #[test]
    fn baseline_out_of_range_is_rejected() {
        let err = SimulationConfig::from_json_str(r#"{ "accident_baseline": 1.5 }"#).unwrap_err();
        assert!(matches!(err, SimError::InvalidConfig(msg) if msg.contains("accident_baseline")));
    }

    #[test]
    fn unknown_mode_is_a_json_error() {
        let err = SimulationConfig::from_json_str(r#"{ "baseline_mode": "median" }"#).unwrap_err();
        assert!(matches!(err, SimError::Json(_)));
    }
}
