use proptest::prelude::*;
use shared::{
    run, run_sequential, BaselineMode, BaselineSource, Features, NoiseProfile, Observation,
    RiskWeights, Scenario, SimulationConfig,
};

fn observation(
    temperature_c: f64,
    humidity: f64,
    rain_mm: f64,
    wind_speed_kmh: f64,
    visibility_m: f64,
    vehicle_count: f64,
) -> Observation {
    Observation::new(Features {
        temperature_c,
        humidity,
        rain_mm,
        wind_speed_kmh,
        visibility_m,
        vehicle_count,
    })
}

fn seeded(trials: u64, seed: u64) -> SimulationConfig {
    SimulationConfig {
        trial_count: trials,
        random_seed: Some(seed),
        ..Default::default()
    }
}

fn arb_observation() -> impl Strategy<Value = Observation> {
    (
        -40.0..50.0f64,
        0.0..100.0f64,
        0.0..120.0f64,
        0.0..150.0f64,
        0.0..20_000.0f64,
        0.0..10_000.0f64,
    )
        .prop_map(|(t, h, r, w, v, n)| observation(t, h, r, w, v, n))
}

// ── Bounds ────────────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn probabilities_stay_in_unit_interval(
        obs in arb_observation(),
        trials in 1u64..200,
        seed in any::<u64>(),
        noise_scale in 0.0..5.0f64,
        congestion_baseline in 0.0..=1.0f64,
        accident_baseline in 0.0..=1.0f64,
    ) {
        let config = SimulationConfig {
            congestion_baseline,
            accident_baseline,
            noise: NoiseProfile::default().scaled(noise_scale),
            ..seeded(trials, seed)
        };
        let run = run(&config, &BaselineSource::single(&obs)).unwrap();

        prop_assert_eq!(run.results.len() as u64, trials);
        for r in &run.results {
            prop_assert!((0.0..=1.0).contains(&r.congestion_probability));
            prop_assert!((0.0..=1.0).contains(&r.accident_probability));
        }
    }

    #[test]
    fn scoring_is_pure(obs in arb_observation()) {
        let weights = RiskWeights::default();
        let config = SimulationConfig { weights, ..Default::default() };
        let scenario = Scenario { trial: 0, features: obs.features };
        let model = config.model();
        prop_assert_eq!(model.score(&scenario), model.score(&scenario));
    }
}

// ── Determinism ───────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn fixed_seed_is_bit_identical(obs in arb_observation(), seed in any::<u64>()) {
        let config = seeded(300, seed);
        let source = BaselineSource::single(&obs);
        let a = run(&config, &source).unwrap();
        let b = run(&config, &source).unwrap();
        prop_assert_eq!(a.results, b.results);
    }

    #[test]
    fn parallel_matches_sequential(
        rows in prop::collection::vec(arb_observation(), 1..20),
        seed in any::<u64>(),
    ) {
        let mut config = seeded(250, seed);
        config.baseline_mode = BaselineMode::Bootstrap;
        let source = BaselineSource::table(rows);

        let par = run(&config, &source).unwrap();
        let seq = run_sequential(&config, &source).unwrap();
        prop_assert_eq!(par.results, seq.results);
    }
}

// ── Weight effects ────────────────────────────────────────────────────────

fn zero_noise(baseline: f64) -> SimulationConfig {
    SimulationConfig {
        trial_count: 1,
        random_seed: Some(0),
        congestion_baseline: baseline,
        noise: NoiseProfile::none(),
        ..Default::default()
    }
}

fn congestion_of(obs: &Observation, baseline: f64) -> f64 {
    let run = run(&zero_noise(baseline), &BaselineSource::single(obs)).unwrap();
    run.results.as_slice()[0].congestion_probability
}

#[test]
fn heavy_rain_adds_its_weight() {
    let wet = observation(15.0, 60.0, 25.0, 20.0, 2000.0, 2000.0);
    let dry = observation(15.0, 60.0, 10.0, 20.0, 2000.0, 2000.0);

    let diff = congestion_of(&wet, 0.1) - congestion_of(&dry, 0.1);
    assert!((diff - 0.25).abs() < 1e-12, "diff was {diff}");
}

#[test]
fn rain_and_visibility_add_up() {
    let obs = observation(15.0, 60.0, 25.0, 20.0, 400.0, 2000.0);
    for baseline in [0.0, 0.1, 0.3, 0.5] {
        let expected = (baseline + 0.25 + 0.30_f64).clamp(0.0, 1.0);
        assert!((congestion_of(&obs, baseline) - expected).abs() < 1e-12);
    }
}

#[test]
fn end_to_end_example() {
    let obs = observation(15.0, 60.0, 25.0, 20.0, 400.0, 2000.0);
    assert!((congestion_of(&obs, 0.1) - 0.65).abs() < 1e-12);
}

#[test]
fn zero_trials_and_no_data() {
    let obs = observation(15.0, 60.0, 25.0, 20.0, 400.0, 2000.0);
    let run = run(&seeded(0, 1), &BaselineSource::single(&obs)).unwrap();
    assert!(run.results.is_empty());
    assert!(run.results.mean(shared::RiskKind::Congestion).is_err());
}

#[test]
fn histogram_accounts_for_every_trial() {
    let obs = observation(2.0, 88.0, 18.0, 45.0, 550.0, 2900.0);
    let run = run(&seeded(2000, 11), &BaselineSource::single(&obs)).unwrap();
    let bins = run.results.histogram(shared::RiskKind::Congestion, 50);
    assert_eq!(bins.len(), 50);
    assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 2000);
}

#[test]
fn noisy_run_spreads_around_thresholds() {
    // baseline sits just under several thresholds, so noise should trigger them sometimes
    let obs = observation(2.0, 84.0, 19.0, 48.0, 520.0, 2950.0);
    let run = run(&seeded(2000, 3), &BaselineSource::single(&obs)).unwrap();

    let congestion = run.results.distribution(shared::RiskKind::Congestion);
    let min = congestion.iter().copied().fold(f64::INFINITY, f64::min);
    let max = congestion.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    assert!(max > min);
    assert!(min >= 0.1 - 1e-12);
}
