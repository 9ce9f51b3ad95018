use clap::{Args, Parser, Subcommand, ValueEnum};
use shared::constants::{DEFAULT_HIGH_RISK_THRESHOLD, DEFAULT_OUTPUT_PATH};
use shared::{BaselineMode, Features, Observation, SimulationConfig};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Monte Carlo congestion and accident risk simulator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: RunMode,

    /// JSON file with simulation settings and weight tables
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Number of simulated trials
    #[arg(long, global = true)]
    pub trials: Option<u64>,

    /// Base random seed. Without it every run differs
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Multiplier applied to every noise spread
    #[arg(long, global = true)]
    pub noise_scale: Option<f64>,

    #[arg(long, global = true, default_value = DEFAULT_OUTPUT_PATH)]
    pub output: PathBuf,

    /// Append a timestamp to the output file name
    #[arg(long, global = true)]
    pub timestamped: bool,

    #[arg(long, global = true, default_value_t = DEFAULT_HIGH_RISK_THRESHOLD)]
    pub high_risk_threshold: f64,

    /// Also write the summary report as JSON
    #[arg(long, global = true)]
    pub summary_json: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum RunMode {
    /// Simulate around the rows of a merged weather + traffic CSV
    Run(DatasetArgs),

    /// Simulate around a single observation
    Single(ObservationArgs),

    /// Print the active weight tables
    Weights,
}

#[derive(Args, Debug, Clone)]
pub struct DatasetArgs {
    #[arg(long)]
    pub input: PathBuf,

    /// Overrides `baseline_mode` from the config file
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum ModeArg {
    Mean,
    Bootstrap,
}

impl From<ModeArg> for BaselineMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Mean => Self::Mean,
            ModeArg::Bootstrap => Self::Bootstrap,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ObservationArgs {
    #[arg(long, allow_negative_numbers = true)]
    pub temperature_c: f64,
    #[arg(long)]
    pub humidity: f64,
    #[arg(long)]
    pub rain_mm: f64,
    #[arg(long)]
    pub wind_speed_kmh: f64,
    #[arg(long)]
    pub visibility_m: f64,
    #[arg(long)]
    pub vehicle_count: f64,
}

impl From<&ObservationArgs> for Observation {
    fn from(a: &ObservationArgs) -> Self {
        Self::new(Features {
            temperature_c: a.temperature_c,
            humidity: a.humidity,
            rain_mm: a.rain_mm,
            wind_speed_kmh: a.wind_speed_kmh,
            visibility_m: a.visibility_m,
            vehicle_count: a.vehicle_count,
        })
    }
}

impl Cli {
    /// Command-line flags take precedence over the config file.
    pub fn apply_overrides(&self, config: &mut SimulationConfig) {
        if let Some(trials) = self.trials {
            config.trial_count = trials;
        }
        if self.seed.is_some() {
            config.random_seed = self.seed;
        }
        if let Some(scale) = self.noise_scale {
            config.noise = config.noise.scaled(scale);
        }
        if let RunMode::Run(DatasetArgs { mode: Some(mode), .. }) = &self.command {
            config.baseline_mode = (*mode).into();
        }
    }
}
