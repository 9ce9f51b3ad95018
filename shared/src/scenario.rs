//! Scenario generation.
//!
//! Every trial owns a generator seeded with [`trial_seed`], a splitmix64 mix of
//! the base seed and the trial index, so a trial's values depend only on those
//! two numbers. A seeded run is bit-identical whether trials are generated in
//! order or in parallel, and neighbouring base seeds give unrelated streams.
//! Without a seed the base seed is drawn from the thread RNG and results differ
//! between runs.

use crate::constants::{
    HUMIDITY_RANGE, HUMIDITY_SPREAD, RAIN_SPREAD, TEMPERATURE_RANGE, TEMPERATURE_SPREAD,
    VEHICLE_SPREAD, VISIBILITY_SPREAD, WIND_SPREAD,
};
use crate::error::{Result, SimError};
use crate::types::{Features, Field, Observation, Scenario};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use statrs::distribution::Normal;
use strum_macros::Display;

/// Standard deviation of the zero-mean noise added to each field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseProfile {
    pub temperature_c: f64,
    pub humidity: f64,
    pub rain_mm: f64,
    pub wind_speed_kmh: f64,
    pub visibility_m: f64,
    pub vehicle_count: f64,
}

impl Default for NoiseProfile {
    fn default() -> Self {
        Self {
            temperature_c: TEMPERATURE_SPREAD,
            humidity: HUMIDITY_SPREAD,
            rain_mm: RAIN_SPREAD,
            wind_speed_kmh: WIND_SPREAD,
            visibility_m: VISIBILITY_SPREAD,
            vehicle_count: VEHICLE_SPREAD,
        }
    }
}

impl NoiseProfile {
    /// No perturbation at all: every scenario equals its baseline.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            temperature_c: 0.0,
            humidity: 0.0,
            rain_mm: 0.0,
            wind_speed_kmh: 0.0,
            visibility_m: 0.0,
            vehicle_count: 0.0,
        }
    }

    #[must_use]
    pub const fn spread(&self, field: Field) -> f64 {
        match field {
            Field::TemperatureC => self.temperature_c,
            Field::Humidity => self.humidity,
            Field::RainMm => self.rain_mm,
            Field::WindSpeedKmh => self.wind_speed_kmh,
            Field::VisibilityM => self.visibility_m,
            Field::VehicleCount => self.vehicle_count,
        }
    }

    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            temperature_c: self.temperature_c * factor,
            humidity: self.humidity * factor,
            rain_mm: self.rain_mm * factor,
            wind_speed_kmh: self.wind_speed_kmh * factor,
            visibility_m: self.visibility_m * factor,
            vehicle_count: self.vehicle_count * factor,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for field in Field::ALL {
            let s = self.spread(field);
            if !(s.is_finite() && s >= 0.0) {
                return Err(SimError::InvalidConfig(format!(
                    "noise spread for `{field}` must be a non-negative number, got {s}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum BaselineMode {
    /// One baseline for all trials: the field-wise mean of the table.
    #[default]
    Mean,
    /// Each trial perturbs a row drawn uniformly from the table.
    Bootstrap,
}

/// Where the unperturbed values of a trial come from. How a table is turned
/// into baselines is decided by the run's [`BaselineMode`].
#[derive(Debug, Clone)]
pub enum BaselineSource {
    Single(Features),
    Table(Vec<Observation>),
}

impl BaselineSource {
    #[must_use]
    pub const fn single(observation: &Observation) -> Self {
        Self::Single(observation.features)
    }

    #[must_use]
    pub fn table(rows: Vec<Observation>) -> Self {
        Self::Table(rows)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Table(rows) if rows.is_empty())
    }
}

/// Sub-seed of one trial: splitmix64 finalizer over the base seed mixed with the
/// golden-ratio-scaled trial index.
#[must_use]
pub const fn trial_seed(base_seed: u64, trial: u64) -> u64 {
    let mut z = base_seed ^ trial.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Clamp a generated value into the physical range of its field.
#[must_use]
pub fn clamp_physical(field: Field, value: f64) -> f64 {
    match field {
        Field::TemperatureC => value.clamp(TEMPERATURE_RANGE.0, TEMPERATURE_RANGE.1),
        Field::Humidity => value.clamp(HUMIDITY_RANGE.0, HUMIDITY_RANGE.1),
        Field::RainMm | Field::WindSpeedKmh | Field::VisibilityM => value.max(0.0),
        Field::VehicleCount => value.max(0.0).round(),
    }
}

#[derive(Debug)]
pub struct ScenarioGenerator {
    source: Baseline,
    noise: [Option<Normal>; 6],
    base_seed: u64,
}

#[derive(Debug)]
enum Baseline {
    Fixed(Features),
    Resample(Vec<Features>),
}

impl ScenarioGenerator {
    /// Returns `Ok(None)` when the source table is empty. `mode` only applies to tables.
    pub fn new(
        source: &BaselineSource,
        mode: BaselineMode,
        noise: &NoiseProfile,
        base_seed: u64,
    ) -> Result<Option<Self>> {
        noise.validate()?;

        let source = match (source, mode) {
            (BaselineSource::Single(features), _) => Baseline::Fixed(*features),
            (BaselineSource::Table(rows), BaselineMode::Mean) => match Features::mean_of(rows) {
                Some(mean) => Baseline::Fixed(mean),
                None => return Ok(None),
            },
            (BaselineSource::Table(rows), BaselineMode::Bootstrap) => {
                if rows.is_empty() {
                    return Ok(None);
                }
                Baseline::Resample(rows.iter().map(|r| r.features).collect())
            }
        };

        let mut dists: [Option<Normal>; 6] = Default::default();
        for (slot, field) in dists.iter_mut().zip(Field::ALL) {
            let spread = noise.spread(field);
            if spread > 0.0 {
                let normal = Normal::new(0.0, spread)
                    .map_err(|e| SimError::InvalidConfig(format!("noise for `{field}`: {e}")))?;
                *slot = Some(normal);
            }
        }

        Ok(Some(Self {
            source,
            noise: dists,
            base_seed,
        }))
    }

    #[must_use]
    pub const fn base_seed(&self) -> u64 {
        self.base_seed
    }

    /// Build the scenario for one trial. Pure in `(self, trial)`.
    #[must_use]
    pub fn scenario(&self, trial: u64) -> Scenario {
        let mut rng = StdRng::seed_from_u64(trial_seed(self.base_seed, trial));

        let mut features = match &self.source {
            Baseline::Fixed(f) => *f,
            Baseline::Resample(rows) => rows[rng.gen_range(0..rows.len())],
        };

        for (dist, field) in self.noise.iter().zip(Field::ALL) {
            if let Some(normal) = dist {
                let delta: f64 = rng.sample(normal);
                features.set(field, clamp_physical(field, features.get(field) + delta));
            } else {
                features.set(field, clamp_physical(field, features.get(field)));
            }
        }

        Scenario { trial, features }
    }

    pub fn generate(&self, trials: u64) -> impl Iterator<Item = Scenario> + '_ {
        (0..trials).map(move |t| self.scenario(t))
    }
}
