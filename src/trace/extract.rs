//! Regrouping of run traces by cost.
//!
//! Runs of one algorithm publish at different budgets (a metaepoch of HGS
//! costs more than a generation of NSGA-II), so raw traces are not
//! comparable entry by entry. An [`Extractor`] cuts every run at the same
//! nominal checkpoints `step, 2·step, …` and gathers, for each checkpoint,
//! one sample per run that reached it.

use super::recorder::{RunTrace, TraceEntry};
use crate::error::{BenchError, Result};
use std::collections::BTreeMap;

/// Samples of every run at one nominal checkpoint.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtractedPoint {
    /// Nominal checkpoint (evaluations or seconds).
    pub key: f64,
    /// One cost sample per contributing run.
    pub cost: Vec<f64>,
    /// Metric name → one sample per contributing run. Non-finite values
    /// are left out.
    pub metrics: BTreeMap<String, Vec<f64>>,
}

impl ExtractedPoint {
    /// Runs that reached this checkpoint.
    pub fn runs(&self) -> usize {
        self.cost.len()
    }
}

/// Cuts the runs of one (problem, algorithm) into checkpoints.
pub trait Extractor {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Extracts checkpoints in ascending key order.
    ///
    /// Fails with [`BenchError::MalformedTrace`] if any run is malformed.
    fn extract(&self, runs: &[RunTrace]) -> Result<Vec<ExtractedPoint>>;
}

/// Checkpoints every `step` evaluations. The cost sample is the actual
/// budget of the entry that reached the checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BudgetResultsExtractor {
    pub step: u64,
}

impl Default for BudgetResultsExtractor {
    fn default() -> Self {
        Self { step: 500 }
    }
}

impl BudgetResultsExtractor {
    pub fn new(step: u64) -> Self {
        Self { step }
    }
}

impl Extractor for BudgetResultsExtractor {
    fn name(&self) -> &'static str {
        "budget"
    }

    fn extract(&self, runs: &[RunTrace]) -> Result<Vec<ExtractedPoint>> {
        if self.step == 0 {
            return Err(BenchError::Configuration("budget step must be positive".into()));
        }
        checkpoints(runs, self.step as f64, |e| e.budget as f64, |e, _| e.budget as f64)
    }
}

/// Checkpoints every `step_secs` seconds of wall-clock time. The cost
/// sample is the nominal checkpoint itself, so its error is zero.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeResultsExtractor {
    pub step_secs: f64,
}

impl Default for TimeResultsExtractor {
    fn default() -> Self {
        Self { step_secs: 1.0 }
    }
}

impl TimeResultsExtractor {
    pub fn new(step_secs: f64) -> Self {
        Self { step_secs }
    }
}

impl Extractor for TimeResultsExtractor {
    fn name(&self) -> &'static str {
        "time"
    }

    fn extract(&self, runs: &[RunTrace]) -> Result<Vec<ExtractedPoint>> {
        if !(self.step_secs.is_finite() && self.step_secs > 0.0) {
            return Err(BenchError::Configuration("time step must be positive".into()));
        }
        checkpoints(runs, self.step_secs, |e| e.elapsed_secs, |_, key| key)
    }
}

fn checkpoints<C, S>(
    runs: &[RunTrace],
    step: f64,
    coordinate: C,
    cost: S,
) -> Result<Vec<ExtractedPoint>>
where
    C: Fn(&TraceEntry) -> f64,
    S: Fn(&TraceEntry, f64) -> f64,
{
    for (i, run) in runs.iter().enumerate() {
        run.validate(i)?;
    }

    let reach = runs
        .iter()
        .filter_map(|run| run.last().map(&coordinate))
        .fold(0.0_f64, f64::max);
    let count = (reach / step).floor() as usize;

    let mut points = Vec::with_capacity(count);
    for k in 1..=count {
        let key = k as f64 * step;
        let mut point = ExtractedPoint {
            key,
            cost: Vec::new(),
            metrics: BTreeMap::new(),
        };

        for run in runs {
            let Some(entry) = run.entries.iter().find(|&e| coordinate(e) >= key) else {
                continue;
            };
            point.cost.push(cost(entry, key));
            for (name, &value) in &entry.metrics {
                let samples = point.metrics.entry(name.clone()).or_default();
                if value.is_finite() {
                    samples.push(value);
                }
            }
        }

        if point.runs() > 0 {
            points.push(point);
        }
    }

    Ok(points)
}
