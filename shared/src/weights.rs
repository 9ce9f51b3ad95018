//! Threshold-triggered weight tables.
//!
//! Each table is an ordered list of `(condition, weight)` rules. A rule whose
//! condition holds adds its weight to the running score. Conditions are strict
//! comparisons so a value sitting exactly on a threshold does not trigger.

use crate::constants::{VOLUME_AMPLIFICATION_GAIN, VOLUME_REFERENCE_COUNT};
use crate::error::{Result, SimError};
use crate::types::{Features, Field};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Condition {
    Above { field: Field, value: f64 },
    Below { field: Field, value: f64 },
    Outside { field: Field, low: f64, high: f64 },
}

impl Condition {
    #[must_use]
    pub fn holds(&self, features: &Features) -> bool {
        match *self {
            Self::Above { field, value } => features.get(field) > value,
            Self::Below { field, value } => features.get(field) < value,
            Self::Outside { field, low, high } => {
                let v = features.get(field);
                v < low || v > high
            }
        }
    }

    fn validate(&self) -> Result<()> {
        match *self {
            Self::Above { value, .. } | Self::Below { value, .. } if !value.is_finite() => Err(
                SimError::InvalidConfig(format!("threshold for `{self}` is not finite")),
            ),
            Self::Outside { low, high, .. } if !low.is_finite() || !high.is_finite() => Err(
                SimError::InvalidConfig(format!("bounds for `{self}` are not finite")),
            ),
            Self::Outside { low, high, .. } if low > high => Err(SimError::InvalidConfig(
                format!("condition `{self}` has low bound above high bound"),
            )),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Above { field, value } => write!(f, "{field} > {value}"),
            Self::Below { field, value } => write!(f, "{field} < {value}"),
            Self::Outside { field, low, high } => write!(f, "{field} < {low} or > {high}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightRule {
    pub condition: Condition,
    pub weight: f64,
}

impl WeightRule {
    #[must_use]
    pub const fn new(condition: Condition, weight: f64) -> Self {
        Self { condition, weight }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightTable {
    pub rules: Vec<WeightRule>,
}

impl WeightTable {
    #[must_use]
    pub fn new(rules: Vec<WeightRule>) -> Self {
        Self { rules }
    }

    pub fn triggered<'a>(&'a self, features: &'a Features) -> impl Iterator<Item = &'a WeightRule> {
        self.rules.iter().filter(move |r| r.condition.holds(features))
    }

    /// Sum of the weights of every rule that holds, in table order.
    #[must_use]
    pub fn contribution(&self, features: &Features) -> f64 {
        self.triggered(features).map(|r| r.weight).sum()
    }

    fn validate(&self, table: &str) -> Result<()> {
        for rule in &self.rules {
            rule.condition.validate()?;
            if !rule.weight.is_finite() {
                return Err(SimError::InvalidConfig(format!(
                    "{table} weight for `{}` is not finite",
                    rule.condition
                )));
            }
        }
        Ok(())
    }
}

/// Scales accident weather contributions with traffic volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeAmplification {
    pub gain: f64,
    pub reference_count: f64,
}

impl Default for VolumeAmplification {
    fn default() -> Self {
        Self {
            gain: VOLUME_AMPLIFICATION_GAIN,
            reference_count: VOLUME_REFERENCE_COUNT,
        }
    }
}

impl VolumeAmplification {
    #[must_use]
    pub fn factor(&self, vehicle_count: f64) -> f64 {
        let load = (vehicle_count / self.reference_count).clamp(0.0, 1.0);
        1.0 + self.gain * load
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskWeights {
    pub congestion: WeightTable,
    pub accident: WeightTable,
    pub amplification: VolumeAmplification,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            congestion: default_congestion_table(),
            accident: default_accident_table(),
            amplification: VolumeAmplification::default(),
        }
    }
}

impl RiskWeights {
    pub fn validate(&self) -> Result<()> {
        self.congestion.validate("congestion")?;
        self.accident.validate("accident")?;

        let amp = &self.amplification;
        if !amp.gain.is_finite() {
            return Err(SimError::InvalidConfig("amplification gain is not finite".into()));
        }
        if !(amp.reference_count.is_finite() && amp.reference_count > 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "amplification reference count must be positive, got {}",
                amp.reference_count
            )));
        }
        Ok(())
    }
}

#[must_use]
pub fn default_congestion_table() -> WeightTable {
    use Condition::{Above, Below, Outside};

    WeightTable::new(vec![
        WeightRule::new(Above { field: Field::RainMm, value: 20.0 }, 0.25),
        WeightRule::new(Outside { field: Field::TemperatureC, low: 0.0, high: 35.0 }, 0.15),
        WeightRule::new(Above { field: Field::Humidity, value: 85.0 }, 0.10),
        WeightRule::new(Below { field: Field::VisibilityM, value: 500.0 }, 0.30),
        WeightRule::new(Above { field: Field::WindSpeedKmh, value: 50.0 }, 0.10),
        WeightRule::new(Above { field: Field::VehicleCount, value: 3000.0 }, 0.20),
    ])
}

#[must_use]
pub fn default_accident_table() -> WeightTable {
    use Condition::{Above, Below};

    WeightTable::new(vec![
        WeightRule::new(Below { field: Field::VisibilityM, value: 300.0 }, 0.35),
        WeightRule::new(Above { field: Field::RainMm, value: 30.0 }, 0.30),
        WeightRule::new(Below { field: Field::TemperatureC, value: 0.0 }, 0.20),
        WeightRule::new(Above { field: Field::WindSpeedKmh, value: 60.0 }, 0.10),
        WeightRule::new(Above { field: Field::Humidity, value: 90.0 }, 0.05),
    ])
}
