use crate::aggregate::{DistributionSummary, HistogramBin, SimulationResults};
use crate::constants::DEFAULT_HISTOGRAM_BINS;
use crate::error::Result;
use crate::types::{RiskKind, RiskLevel};
use log::info;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize)]
pub struct RiskSummary {
    pub stats: DistributionSummary,
    pub levels: BTreeMap<RiskLevel, usize>,
    pub histogram: Vec<HistogramBin>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationSummary {
    pub trials: usize,
    pub seed: u64,
    pub high_risk_threshold: f64,
    /// Share of scenarios whose congestion probability is above the threshold, in percent
    pub high_risk_percent: f64,
    pub congestion: RiskSummary,
    pub accident: RiskSummary,
    pub correlation: Option<f64>,
}

impl SimulationSummary {
    /// Fails with `NoData` for an empty result set.
    pub fn from_results(results: &SimulationResults, seed: u64, high_risk_threshold: f64) -> Result<Self> {
        let risk = |kind: RiskKind| -> Result<RiskSummary> {
            let counts = results.level_counts(kind);
            Ok(RiskSummary {
                stats: results.describe(kind)?,
                levels: RiskLevel::ALL.iter().map(|&l| (l, counts[l.idx()])).collect(),
                histogram: results.histogram(kind, DEFAULT_HISTOGRAM_BINS),
            })
        };

        let correlation = if results.len() > 1 { results.correlation()? } else { None };

        Ok(Self {
            trials: results.len(),
            seed,
            high_risk_threshold,
            high_risk_percent: results.percent_exceeding(RiskKind::Congestion, high_risk_threshold)?,
            congestion: risk(RiskKind::Congestion)?,
            accident: risk(RiskKind::Accident)?,
            correlation,
        })
    }

    pub fn log(&self) {
        info!("=================================================================");
        info!("Simulation Summary ({} trials, seed {}):", self.trials, self.seed);
        for (kind, summary) in [(RiskKind::Congestion, &self.congestion), (RiskKind::Accident, &self.accident)] {
            let s = &summary.stats;
            info!(
                "  {kind:<10} mean {:.3} | std {:.3} | min {:.3} | p25 {:.3} | p50 {:.3} | p75 {:.3} | max {:.3}",
                s.mean, s.std_dev, s.min, s.p25, s.median, s.p75, s.max
            );
            let bands: Vec<String> = summary.levels.iter().map(|(l, n)| format!("{l}: {n}")).collect();
            info!("  {:<10} {}", "", bands.join(", "));
        }
        info!(
            "  High risk scenarios (congestion > {}): {:.1}%",
            self.high_risk_threshold, self.high_risk_percent
        );
        match self.correlation {
            Some(r) => info!("  Congestion/accident correlation: {r:.3}"),
            None => info!("  Congestion/accident correlation: undefined"),
        }
        info!("=================================================================");
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!("Summary saved to {}", path.display());
        Ok(())
    }
}
