use crate::types::{Features, RiskLevel, Scenario, SimulationResult};
use crate::weights::{RiskWeights, WeightTable};

#[must_use]
pub fn clamp_probability(p: f64) -> f64 {
    p.clamp(0.0, 1.0)
}

/// Weight tables plus the ambient probability each score starts from.
#[derive(Debug, Clone, Copy)]
pub struct RiskModel<'a> {
    pub weights: &'a RiskWeights,
    pub congestion_baseline: f64,
    pub accident_baseline: f64,
}

#[derive(Debug)]
pub struct ScenarioAssessment {
    pub result: SimulationResult,
    pub congestion_level: RiskLevel,
    pub accident_level: RiskLevel,
    pub congestion_rules: Vec<String>,
    pub accident_rules: Vec<String>,
}

impl<'a> RiskModel<'a> {
    #[must_use]
    pub const fn new(weights: &'a RiskWeights, congestion_baseline: f64, accident_baseline: f64) -> Self {
        Self {
            weights,
            congestion_baseline,
            accident_baseline,
        }
    }

    /// Baseline plus every triggered congestion weight, clamped to [0, 1].
    #[must_use]
    pub fn congestion(&self, features: &Features) -> f64 {
        clamp_probability(self.congestion_baseline + self.weights.congestion.contribution(features))
    }

    /// Baseline plus triggered accident weights scaled by traffic volume, clamped to [0, 1].
    #[must_use]
    pub fn accident(&self, features: &Features) -> f64 {
        let weather = self.weights.accident.contribution(features);
        let factor = self.weights.amplification.factor(features.vehicle_count);
        clamp_probability(self.accident_baseline + weather * factor)
    }

    #[must_use]
    pub fn score(&self, scenario: &Scenario) -> SimulationResult {
        SimulationResult {
            congestion_probability: self.congestion(&scenario.features),
            accident_probability: self.accident(&scenario.features),
        }
    }

    pub fn assess(&self, features: &Features) -> ScenarioAssessment {
        let congestion = self.congestion(features);
        let accident = self.accident(features);

        let names = |rules: &WeightTable| {
            rules
                .triggered(features)
                .map(|r| r.condition.to_string())
                .collect::<Vec<_>>()
        };

        ScenarioAssessment {
            result: SimulationResult {
                congestion_probability: congestion,
                accident_probability: accident,
            },
            congestion_level: RiskLevel::from_probability(congestion),
            accident_level: RiskLevel::from_probability(accident),
            congestion_rules: names(&self.weights.congestion),
            accident_rules: names(&self.weights.accident),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weights::{Condition, WeightRule};
    use crate::types::Field;

    fn benign() -> Features {
        Features {
            temperature_c: 15.0,
            humidity: 60.0,
            rain_mm: 10.0,
            wind_speed_kmh: 20.0,
            visibility_m: 2000.0,
            vehicle_count: 2000.0,
        }
    }

    #[test]
    fn benign_conditions_score_baseline() {
        let weights = RiskWeights::default();
        let model = RiskModel::new(&weights, 0.1, 0.15);
        assert_eq!(model.congestion(&benign()), 0.1);
        assert_eq!(model.accident(&benign()), 0.15);
    }

    #[test]
    fn rain_adds_exactly_its_weight() {
        let weights = RiskWeights::default();
        let model = RiskModel::new(&weights, 0.1, 0.15);
        let dry = benign();
        let mut wet = benign();
        wet.rain_mm = 25.0;

        let diff = model.congestion(&wet) - model.congestion(&dry);
        assert!((diff - 0.25).abs() < 1e-12);
    }

    #[test]
    fn everything_triggered_is_clamped() {
        let weights = RiskWeights::default();
        let model = RiskModel::new(&weights, 0.9, 0.9);
        let storm = Features {
            temperature_c: -10.0,
            humidity: 95.0,
            rain_mm: 60.0,
            wind_speed_kmh: 80.0,
            visibility_m: 100.0,
            vehicle_count: 8000.0,
        };
        assert_eq!(model.congestion(&storm), 1.0);
        assert_eq!(model.accident(&storm), 1.0);
    }

    #[test]
    fn negative_weights_clamp_at_zero() {
        let mut weights = RiskWeights::default();
        weights.congestion.rules.push(WeightRule::new(
            Condition::Below { field: Field::VehicleCount, value: 5000.0 },
            -0.5,
        ));
        let model = RiskModel::new(&weights, 0.1, 0.15);
        assert_eq!(model.congestion(&benign()), 0.0);
    }

    #[test]
    fn traffic_amplifies_accident_weather_only() {
        let weights = RiskWeights::default();
        let model = RiskModel::new(&weights, 0.1, 0.15);

        let mut quiet = benign();
        quiet.visibility_m = 250.0;
        quiet.vehicle_count = 0.0;
        let mut busy = quiet;
        busy.vehicle_count = 5000.0;

        assert!((model.accident(&quiet) - (0.15 + 0.35)).abs() < 1e-12);
        assert!((model.accident(&busy) - (0.15 + 0.35 * 1.5)).abs() < 1e-12);

        // no hazard, no amplification
        let mut calm_busy = benign();
        calm_busy.vehicle_count = 5000.0;
        assert_eq!(model.accident(&calm_busy), 0.15);
    }

    #[test]
    fn assessment_names_triggered_rules() {
        let weights = RiskWeights::default();
        let model = RiskModel::new(&weights, 0.1, 0.15);
        let mut f = benign();
        f.rain_mm = 25.0;
        f.visibility_m = 400.0;

        let a = model.assess(&f);
        assert_eq!(a.congestion_rules, vec!["rain_mm > 20", "visibility_m < 500"]);
        assert!(a.accident_rules.is_empty());
        assert_eq!(a.congestion_level, RiskLevel::High);
        assert_eq!(a.accident_level, RiskLevel::Low);
    }
}
