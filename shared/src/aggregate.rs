//! Ordered collection of trial results and the reducers the reports use.

use crate::error::{Result, SimError};
use crate::types::{RiskKind, RiskLevel, SimulationResult};
use serde::Serialize;
use statrs::statistics::{Data, OrderStatistics, Statistics};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationResults {
    results: Vec<SimulationResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistributionSummary {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

impl SimulationResults {
    #[must_use]
    pub const fn new() -> Self {
        Self { results: Vec::new() }
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            results: Vec::with_capacity(capacity),
        }
    }

    pub fn record(&mut self, result: SimulationResult) {
        self.results.push(result);
    }

    #[must_use]
    pub fn as_slice(&self) -> &[SimulationResult] {
        &self.results
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SimulationResult> {
        self.results.iter()
    }

    /// Every value of one risk type, in trial order.
    #[must_use]
    pub fn distribution(&self, kind: RiskKind) -> Vec<f64> {
        self.results.iter().map(|r| r.get(kind)).collect()
    }

    pub fn mean(&self, kind: RiskKind) -> Result<f64> {
        if self.is_empty() {
            return Err(SimError::NoData("mean of an empty result set"));
        }
        Ok(self.results.iter().map(|r| r.get(kind)).mean())
    }

    /// Number of results strictly above `threshold`.
    #[must_use]
    pub fn count_exceeding(&self, kind: RiskKind, threshold: f64) -> usize {
        self.results.iter().filter(|r| r.get(kind) > threshold).count()
    }

    /// Share of results strictly above `threshold`, as a percentage.
    #[allow(clippy::cast_precision_loss)]
    pub fn percent_exceeding(&self, kind: RiskKind, threshold: f64) -> Result<f64> {
        if self.is_empty() {
            return Err(SimError::NoData("exceedance share of an empty result set"));
        }
        Ok(self.count_exceeding(kind, threshold) as f64 / self.len() as f64 * 100.0)
    }

    pub fn describe(&self, kind: RiskKind) -> Result<DistributionSummary> {
        if self.is_empty() {
            return Err(SimError::NoData("summary of an empty result set"));
        }

        let values = self.distribution(kind);
        let mean = self.mean(kind)?;
        let std_dev = if values.len() > 1 { values.iter().std_dev() } else { 0.0 };

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let mut data = Data::new(values);
        Ok(DistributionSummary {
            count: self.len(),
            mean,
            std_dev,
            min,
            p25: linear_quantile(&mut data, 0.25),
            median: linear_quantile(&mut data, 0.5),
            p75: linear_quantile(&mut data, 0.75),
            max,
        })
    }

    /// Fixed-width bins over [0, 1]. Bins are half-open except the last, which includes 1.0.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    #[must_use]
    pub fn histogram(&self, kind: RiskKind, bins: usize) -> Vec<HistogramBin> {
        if bins == 0 {
            return Vec::new();
        }

        let width = 1.0 / bins as f64;
        let mut out: Vec<HistogramBin> = (0..bins)
            .map(|i| HistogramBin {
                lower: i as f64 * width,
                upper: (i + 1) as f64 * width,
                count: 0,
            })
            .collect();

        for r in &self.results {
            let idx = ((r.get(kind) / width) as usize).min(bins - 1);
            out[idx].count += 1;
        }
        out
    }

    /// Pearson correlation between congestion and accident probabilities.
    ///
    /// `Ok(None)` when either series is constant.
    pub fn correlation(&self) -> Result<Option<f64>> {
        if self.len() < 2 {
            return Err(SimError::NoData("correlation needs at least two results"));
        }

        let congestion = self.distribution(RiskKind::Congestion);
        let accident = self.distribution(RiskKind::Accident);
        if is_constant(&congestion) || is_constant(&accident) {
            return Ok(None);
        }

        let cov = congestion.iter().covariance(accident.iter());
        let r = cov / (congestion.iter().std_dev() * accident.iter().std_dev());
        Ok(Some(r.clamp(-1.0, 1.0)))
    }

    /// Results per risk band, indexed by `RiskLevel::idx`.
    #[must_use]
    pub fn level_counts(&self, kind: RiskKind) -> [usize; 4] {
        let mut counts = [0; 4];
        for r in &self.results {
            counts[RiskLevel::from_probability(r.get(kind)).idx()] += 1;
        }
        counts
    }
}

fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

/// Quantile interpolated linearly between the order statistics around `(n - 1) * p`.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn linear_quantile(data: &mut Data<Vec<f64>>, p: f64) -> f64 {
    let h = (data.len() - 1) as f64 * p;
    let lower = h.floor();
    let below = data.order_statistic(lower as usize + 1);
    let above = data.order_statistic(h.ceil() as usize + 1);
    below + (h - lower) * (above - below)
}

impl FromIterator<SimulationResult> for SimulationResults {
    fn from_iter<I: IntoIterator<Item = SimulationResult>>(iter: I) -> Self {
        Self {
            results: iter.into_iter().collect(),
        }
    }
}

impl Extend<SimulationResult> for SimulationResults {
    fn extend<I: IntoIterator<Item = SimulationResult>>(&mut self, iter: I) {
        self.results.extend(iter);
    }
}

impl<'a> IntoIterator for &'a SimulationResults {
    type Item = &'a SimulationResult;
    type IntoIter = std::slice::Iter<'a, SimulationResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}
