//! Reading the merged weather + traffic table.

use crate::error::{Result, SimError};
use crate::types::{Field, Observation, ObservationRecord};
use csv::{ReaderBuilder, StringRecord};
use log::{debug, info};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const VISIBILITY_ALIAS: &str = "visibility";

struct Columns {
    required: [usize; 6],
    timestamp: Option<usize>,
    season: Option<usize>,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self> {
        let position = |name: &str| headers.iter().position(|h| h.trim() == name);

        let mut required = [0; 6];
        for (slot, field) in required.iter_mut().zip(Field::ALL) {
            let idx = match field {
                Field::VisibilityM => position(field.name()).or_else(|| position(VISIBILITY_ALIAS)),
                _ => position(field.name()),
            };
            *slot = idx.ok_or(SimError::MissingField { field: field.name() })?;
        }

        Ok(Self {
            required,
            timestamp: position("timestamp"),
            season: position("season"),
        })
    }

    fn parse(&self, record: &StringRecord, row: usize) -> Result<Observation> {
        let mut out = ObservationRecord::default();

        for (&idx, field) in self.required.iter().zip(Field::ALL) {
            let raw = record.get(idx).unwrap_or("").trim();
            if raw.is_empty() {
                return Err(SimError::MissingValue { row, field: field.name() });
            }
            let value: f64 = raw.parse().map_err(|_| SimError::InvalidValue {
                row,
                field: field.name(),
                value: raw.to_string(),
            })?;

            match field {
                Field::TemperatureC => out.temperature_c = Some(value),
                Field::Humidity => out.humidity = Some(value),
                Field::RainMm => out.rain_mm = Some(value),
                Field::WindSpeedKmh => out.wind_speed_kmh = Some(value),
                Field::VisibilityM => out.visibility_m = Some(value),
                Field::VehicleCount => out.vehicle_count = Some(value),
            }
        }

        let optional = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)
        };
        out.timestamp = optional(self.timestamp);
        out.season = optional(self.season);

        out.into_observation()
    }
}

/// Parse observations from CSV with a header row. Unknown columns are ignored.
pub fn read_observations<R: Read>(reader: R) -> Result<Vec<Observation>> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let columns = Columns::resolve(rdr.headers()?)?;

    let mut rows = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        rows.push(columns.parse(&record, i + 1)?);
    }

    debug!("Parsed {} observation rows", rows.len());
    Ok(rows)
}

pub fn load_observations(path: &Path) -> Result<Vec<Observation>> {
    info!("Loading observations from {}", path.display());
    let file = File::open(path)?;
    read_observations(file)
}
