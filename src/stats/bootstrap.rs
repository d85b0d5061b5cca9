//! Bootstrap resampling of per-run samples.
//!
//! `B` resamples of the same size are drawn with replacement; the statistic
//! of each resample forms the bootstrap distribution. Its mean is the point
//! estimate and its population standard deviation the standard error.
//!
//! # References
//!
//! - Efron & Tibshirani (1993), "An Introduction to the Bootstrap"

use crate::error::{BenchError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Statistic computed on every resample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Statistic {
    #[default]
    Mean,
    Median,
}

impl Statistic {
    /// Evaluates the statistic. `values` must be non-empty.
    pub fn compute(self, values: &mut [f64]) -> f64 {
        match self {
            Statistic::Mean => values.iter().sum::<f64>() / values.len() as f64,
            Statistic::Median => {
                values.sort_by(f64::total_cmp);
                let mid = values.len() / 2;
                if values.len() % 2 == 0 {
                    (values[mid - 1] + values[mid]) / 2.0
                } else {
                    values[mid]
                }
            }
        }
    }
}

/// Bootstrap configuration.
///
/// ```
/// use u_metabench::stats::{BootstrapConfig, Statistic};
///
/// let config = BootstrapConfig::default()
///     .with_resamples(500)
///     .with_statistic(Statistic::Median);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BootstrapConfig {
    /// Number of resamples `B` (default 1000).
    pub resamples: usize,
    /// RNG seed; equal seeds give equal results.
    pub seed: u64,
    pub statistic: Statistic,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            resamples: 1000,
            seed: 42,
            statistic: Statistic::Mean,
        }
    }
}

impl BootstrapConfig {
    pub fn with_resamples(mut self, resamples: usize) -> Self {
        self.resamples = resamples;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_statistic(mut self, statistic: Statistic) -> Self {
        self.statistic = statistic;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.resamples == 0 {
            return Err(BenchError::Configuration(
                "bootstrap needs at least one resample".into(),
            ));
        }
        Ok(())
    }
}

/// Point estimate and its standard error.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BootstrapResult {
    pub point_estimate: f64,
    /// Always `>= 0`; exactly `0` when every resample statistic is equal.
    pub standard_error: f64,
}

/// Bootstraps `sample` under `config`.
///
/// Fails with [`BenchError::EmptySample`] on an empty sample.
pub fn bootstrap(sample: &[f64], config: &BootstrapConfig) -> Result<BootstrapResult> {
    if sample.is_empty() {
        return Err(BenchError::EmptySample);
    }
    config.validate()?;

    let n = sample.len();
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut buffer = vec![0.0; n];
    let mut statistics = Vec::with_capacity(config.resamples);

    for _ in 0..config.resamples {
        for slot in buffer.iter_mut() {
            *slot = sample[rng.random_range(0..n)];
        }
        statistics.push(config.statistic.compute(&mut buffer));
    }

    let point_estimate = statistics.iter().sum::<f64>() / statistics.len() as f64;
    let first = statistics[0];
    let standard_error = if statistics.iter().all(|&s| s == first) {
        0.0
    } else {
        let variance = statistics
            .iter()
            .map(|s| (s - point_estimate).powi(2))
            .sum::<f64>()
            / statistics.len() as f64;
        variance.sqrt()
    };

    Ok(BootstrapResult {
        point_estimate,
        standard_error,
    })
}
