mod cli;
mod csv_writer;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use env_logger::Env;
use log::{info, warn};
use shared::dataset::load_observations;
use shared::report::SimulationSummary;
use shared::{BaselineSource, Observation, SimulationConfig, WeightTable};

use cli::{Cli, RunMode};

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => SimulationConfig::from_json_path(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    cli.apply_overrides(&mut config);
    config.validate().context("Invalid simulation settings")?;

    let source = match &cli.command {
        RunMode::Weights => {
            print_weights(&config);
            return Ok(());
        }
        RunMode::Single(args) => {
            let obs = Observation::from(args);
            log_assessment(&config, &obs);
            BaselineSource::single(&obs)
        }
        RunMode::Run(args) => {
            let rows = load_observations(&args.input)
                .with_context(|| format!("Failed to read observations from {}", args.input.display()))?;
            info!("Loaded {} observations ({} baseline)", rows.len(), config.baseline_mode);
            BaselineSource::table(rows)
        }
    };

    let run = shared::run(&config, &source).context("Simulation failed")?;

    let output = if cli.timestamped {
        csv_writer::timestamped(&cli.output)
    } else {
        cli.output.clone()
    };
    csv_writer::write_results_csv(&run.results, &output)
        .map_err(|e| anyhow!("Failed to write {}: {e}", output.display()))?;

    if run.results.is_empty() {
        warn!("Empty result set, skipping summary");
        return Ok(());
    }

    let summary = SimulationSummary::from_results(&run.results, run.seed, cli.high_risk_threshold)?;
    summary.log();
    if let Some(path) = &cli.summary_json {
        summary
            .write_json(path)
            .with_context(|| format!("Failed to write summary {}", path.display()))?;
    }

    Ok(())
}

fn log_assessment(config: &SimulationConfig, obs: &Observation) {
    let assessment = config.model().assess(&obs.features);
    info!(
        "Baseline observation: congestion {:.3} ({}), accident {:.3} ({})",
        assessment.result.congestion_probability,
        assessment.congestion_level,
        assessment.result.accident_probability,
        assessment.accident_level,
    );
    if !assessment.congestion_rules.is_empty() {
        info!("  congestion triggers: {}", assessment.congestion_rules.join(", "));
    }
    if !assessment.accident_rules.is_empty() {
        info!("  accident triggers: {}", assessment.accident_rules.join(", "));
    }
}

fn print_weights(config: &SimulationConfig) {
    let print_table = |name: &str, baseline: f64, table: &WeightTable| {
        println!("{name} (baseline {baseline:.2})");
        for rule in &table.rules {
            println!("  {:<32} {:+.2}", rule.condition.to_string(), rule.weight);
        }
    };

    print_table("Congestion", config.congestion_baseline, &config.weights.congestion);
    print_table("Accident", config.accident_baseline, &config.weights.accident);

    let amp = &config.weights.amplification;
    println!(
        "  accident weather weights x (1 + {} * min(vehicle_count / {}, 1))",
        amp.gain, amp.reference_count
    );
}
