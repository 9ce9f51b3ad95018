use crate::constants::RISK_LEVEL_BOUNDS;
use crate::error::{Result, SimError};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

#[derive(Copy, Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Field {
    TemperatureC,
    Humidity,
    RainMm,
    WindSpeedKmh,
    VisibilityM,
    VehicleCount,
}

impl Field {
    pub const ALL: [Self; 6] = [
        Self::TemperatureC,
        Self::Humidity,
        Self::RainMm,
        Self::WindSpeedKmh,
        Self::VisibilityM,
        Self::VehicleCount,
    ];

    /// Column name used in the input dataset
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::TemperatureC => "temperature_c",
            Self::Humidity => "humidity",
            Self::RainMm => "rain_mm",
            Self::WindSpeedKmh => "wind_speed_kmh",
            Self::VisibilityM => "visibility_m",
            Self::VehicleCount => "vehicle_count",
        }
    }
}

/// The weather and traffic values shared by observations and scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Features {
    pub temperature_c: f64,
    pub humidity: f64,
    pub rain_mm: f64,
    pub wind_speed_kmh: f64,
    pub visibility_m: f64,
    pub vehicle_count: f64,
}

impl Features {
    #[must_use]
    pub const fn get(&self, field: Field) -> f64 {
        match field {
            Field::TemperatureC => self.temperature_c,
            Field::Humidity => self.humidity,
            Field::RainMm => self.rain_mm,
            Field::WindSpeedKmh => self.wind_speed_kmh,
            Field::VisibilityM => self.visibility_m,
            Field::VehicleCount => self.vehicle_count,
        }
    }

    pub fn set(&mut self, field: Field, value: f64) {
        let slot = match field {
            Field::TemperatureC => &mut self.temperature_c,
            Field::Humidity => &mut self.humidity,
            Field::RainMm => &mut self.rain_mm,
            Field::WindSpeedKmh => &mut self.wind_speed_kmh,
            Field::VisibilityM => &mut self.visibility_m,
            Field::VehicleCount => &mut self.vehicle_count,
        };
        *slot = value;
    }

    /// Field-wise arithmetic mean. `None` for an empty slice.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn mean_of(rows: &[Observation]) -> Option<Self> {
        let first = rows.first()?;
        let n = rows.len() as f64;

        let mut out = first.features;
        for field in Field::ALL {
            let total: f64 = rows.iter().map(|r| r.features.get(field)).sum();
            out.set(field, total / n);
        }
        Some(out)
    }
}

/// One input row of the merged weather + traffic dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    #[serde(flatten)]
    pub features: Features,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub season: Option<String>,
}

impl Observation {
    #[must_use]
    pub const fn new(features: Features) -> Self {
        Self {
            features,
            timestamp: None,
            season: None,
        }
    }
}

/// Partially filled observation, as read from a CSV row or a config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservationRecord {
    pub temperature_c: Option<f64>,
    pub humidity: Option<f64>,
    pub rain_mm: Option<f64>,
    pub wind_speed_kmh: Option<f64>,
    #[serde(alias = "visibility")]
    pub visibility_m: Option<f64>,
    pub vehicle_count: Option<f64>,
    pub timestamp: Option<String>,
    pub season: Option<String>,
}

impl ObservationRecord {
    #[must_use]
    pub const fn value(&self, field: Field) -> Option<f64> {
        match field {
            Field::TemperatureC => self.temperature_c,
            Field::Humidity => self.humidity,
            Field::RainMm => self.rain_mm,
            Field::WindSpeedKmh => self.wind_speed_kmh,
            Field::VisibilityM => self.visibility_m,
            Field::VehicleCount => self.vehicle_count,
        }
    }

    /// Fails with the first required field that is absent.
    pub fn into_observation(self) -> Result<Observation> {
        let require = |field: Field| {
            self.value(field)
                .ok_or(SimError::MissingField { field: field.name() })
        };

        let features = Features {
            temperature_c: require(Field::TemperatureC)?,
            humidity: require(Field::Humidity)?,
            rain_mm: require(Field::RainMm)?,
            wind_speed_kmh: require(Field::WindSpeedKmh)?,
            visibility_m: require(Field::VisibilityM)?,
            vehicle_count: require(Field::VehicleCount)?,
        };

        Ok(Observation {
            features,
            timestamp: self.timestamp,
            season: self.season,
        })
    }
}

/// A single randomized trial. Values are already clamped into physical ranges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Scenario {
    pub trial: u64,
    pub features: Features,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub congestion_probability: f64,
    pub accident_probability: f64,
}

impl SimulationResult {
    #[must_use]
    pub const fn get(&self, kind: RiskKind) -> f64 {
        match kind {
            RiskKind::Congestion => self.congestion_probability,
            RiskKind::Accident => self.accident_probability,
        }
    }
}

#[derive(Copy, Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum RiskKind {
    Congestion,
    Accident,
}

impl RiskKind {
    pub const ALL: [Self; 2] = [Self::Congestion, Self::Accident];
}

#[derive(Copy, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Severe,
}

impl RiskLevel {
    pub const ALL: [Self; 4] = [Self::Low, Self::Moderate, Self::High, Self::Severe];

    #[must_use]
    pub fn from_probability(p: f64) -> Self {
        let [low, moderate, high] = RISK_LEVEL_BOUNDS;
        if p < low {
            Self::Low
        } else if p < moderate {
            Self::Moderate
        } else if p < high {
            Self::High
        } else {
            Self::Severe
        }
    }

    #[must_use]
    pub const fn idx(self) -> usize {
        match self {
            Self::Low => 0,
            Self::Moderate => 1,
            Self::High => 2,
            Self::Severe => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_display_matches_column_name() {
        for field in Field::ALL {
            assert_eq!(field.to_string(), field.name());
        }
        assert_eq!(Field::WindSpeedKmh.to_string(), "wind_speed_kmh");
    }

    #[test]
    fn record_reports_first_missing_field() {
        let record = ObservationRecord {
            temperature_c: Some(12.0),
            humidity: Some(70.0),
            rain_mm: Some(0.0),
            wind_speed_kmh: Some(8.0),
            visibility_m: None,
            vehicle_count: None,
            ..Default::default()
        };

        match record.into_observation() {
            Err(SimError::MissingField { field }) => assert_eq!(field, "visibility_m"),
            other => panic!("expected missing visibility_m, got {other:?}"),
        }
    }

    #[test]
    fn record_accepts_visibility_alias() {
        let json = r#"{"temperature_c":1,"humidity":2,"rain_mm":3,"wind_speed_kmh":4,"visibility":5,"vehicle_count":6}"#;
        let record: ObservationRecord = serde_json::from_str(json).unwrap();
        let obs = record.into_observation().unwrap();
        assert_eq!(obs.features.visibility_m, 5.0);
        assert_eq!(obs.timestamp, None);
    }

    #[test]
    fn mean_of_rows() {
        let a = Observation::new(Features {
            temperature_c: 10.0,
            humidity: 50.0,
            rain_mm: 0.0,
            wind_speed_kmh: 10.0,
            visibility_m: 1000.0,
            vehicle_count: 1000.0,
        });
        let mut b = a.clone();
        b.features.temperature_c = 20.0;
        b.features.rain_mm = 10.0;

        let mean = Features::mean_of(&[a, b]).unwrap();
        assert_eq!(mean.temperature_c, 15.0);
        assert_eq!(mean.rain_mm, 5.0);
        assert_eq!(mean.visibility_m, 1000.0);
        assert!(Features::mean_of(&[]).is_none());
    }

    #[test]
    fn risk_level_bands() {
        assert_eq!(RiskLevel::from_probability(0.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_probability(0.25), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_probability(0.65), RiskLevel::High);
        assert_eq!(RiskLevel::from_probability(0.75), RiskLevel::Severe);
        assert_eq!(RiskLevel::from_probability(1.0), RiskLevel::Severe);
    }
}
