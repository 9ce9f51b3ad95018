pub const DEFAULT_TRIAL_COUNT: u64 = 5000;

pub const DEFAULT_CONGESTION_BASELINE: f64 = 0.10;
pub const DEFAULT_ACCIDENT_BASELINE: f64 = 0.15;

/// Scenarios above this congestion probability count as "high risk" in reports
pub const DEFAULT_HIGH_RISK_THRESHOLD: f64 = 0.5;
pub const DEFAULT_HISTOGRAM_BINS: usize = 50;

pub const DEFAULT_OUTPUT_PATH: &str = "simulation_results.csv";

pub const CONGESTION_COLUMN: &str = "congestion_probability";
pub const ACCIDENT_COLUMN: &str = "accident_probability";

// noise spread (standard deviation) per field
pub const TEMPERATURE_SPREAD: f64 = 5.0;
pub const HUMIDITY_SPREAD: f64 = 10.0;
pub const RAIN_SPREAD: f64 = 8.0;
pub const WIND_SPREAD: f64 = 10.0;
pub const VISIBILITY_SPREAD: f64 = 300.0;
pub const VEHICLE_SPREAD: f64 = 600.0;

// physical ranges, generated values are clamped into these
pub const TEMPERATURE_RANGE: (f64, f64) = (-40.0, 50.0);
pub const HUMIDITY_RANGE: (f64, f64) = (0.0, 100.0);

/// Accident weather weights are scaled by `1 + gain * min(vehicles / reference, 1)`
pub const VOLUME_AMPLIFICATION_GAIN: f64 = 0.5;
pub const VOLUME_REFERENCE_COUNT: f64 = 5000.0;

/// Upper bounds (exclusive) of the Low, Moderate and High bands. Anything above is Severe.
pub const RISK_LEVEL_BOUNDS: [f64; 3] = [0.25, 0.5, 0.75];

