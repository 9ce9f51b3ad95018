use crate::aggregate::SimulationResults;
use crate::config::SimulationConfig;
use crate::error::Result;
use crate::scenario::{BaselineSource, ScenarioGenerator};
use log::{info, trace, warn};
use rand::RngCore;
use rayon::prelude::*;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct SimulationRun {
    pub results: SimulationResults,
    /// Base seed the trials were derived from. Pass it back as `random_seed` to replay the run.
    pub seed: u64,
}

/// Resolve the configured seed, or draw one from the thread RNG.
#[must_use]
pub fn resolve_seed(configured: Option<u64>) -> u64 {
    configured.unwrap_or_else(|| rand::thread_rng().next_u64())
}

/// Generate, score and collect `config.trial_count` scenarios.
///
/// Trials run in parallel; the output is in trial order and, for a fixed
/// seed, identical to [`run_sequential`].
pub fn run(config: &SimulationConfig, source: &BaselineSource) -> Result<SimulationRun> {
    execute(config, source, true)
}

/// Same as [`run`] on the calling thread only.
pub fn run_sequential(config: &SimulationConfig, source: &BaselineSource) -> Result<SimulationRun> {
    execute(config, source, false)
}

fn execute(config: &SimulationConfig, source: &BaselineSource, parallel: bool) -> Result<SimulationRun> {
    config.validate()?;
    let seed = resolve_seed(config.random_seed);

    let Some(generator) = ScenarioGenerator::new(source, config.baseline_mode, &config.noise, seed)? else {
        warn!("Observation table is empty, no trials to run");
        return Ok(SimulationRun {
            results: SimulationResults::new(),
            seed,
        });
    };

    if config.trial_count == 0 {
        warn!("Trial count is 0, no trials to run");
        return Ok(SimulationRun {
            results: SimulationResults::new(),
            seed,
        });
    }

    let baseline = match source {
        BaselineSource::Single(_) => "single observation".to_string(),
        BaselineSource::Table(rows) => format!("{} rows, {} baseline", rows.len(), config.baseline_mode),
    };
    info!(
        "Running {} trials (seed {}, {}, {})",
        config.trial_count,
        seed,
        baseline,
        if parallel { "parallel" } else { "sequential" }
    );

    let model = config.model();
    let start = Instant::now();

    let score = |trial: u64| {
        let scenario = generator.scenario(trial);
        let result = model.score(&scenario);
        trace!("trial {trial}: {:?} -> {:?}", scenario.features, result);
        result
    };

    let results: SimulationResults = if parallel {
        let scored: Vec<_> = (0..config.trial_count).into_par_iter().map(score).collect();
        scored.into_iter().collect()
    } else {
        (0..config.trial_count).map(score).collect()
    };

    info!(
        "Finished {} trials in {} ms",
        results.len(),
        start.elapsed().as_millis()
    );

    Ok(SimulationRun { results, seed })
}
