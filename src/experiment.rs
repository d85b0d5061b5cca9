//! Repeated independent trials.
//!
//! Each trial builds its own driver tree from a seed, runs it under a
//! [`StepsRun`] and records a [`RunTrace`]. Trials share nothing, so they
//! are fanned out over the rayon thread pool; results come back in seed
//! order either way.

use crate::driver::{Driver, StepsRun};
use crate::error::{BenchError, Result};
use crate::trace::{RunTrace, TraceRecorder};
use log::info;
use rayon::prelude::*;
use std::time::Instant;

/// How many trials to run and how to seed them.
///
/// ```
/// use u_metabench::experiment::TrialConfig;
///
/// let config = TrialConfig::default().with_trials(3).with_base_seed(100);
/// assert_eq!(config.seeds(), vec![100, 101, 102]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrialConfig {
    /// Number of independent runs (default 10).
    pub trials: usize,
    /// Trial `i` is seeded with `base_seed + i`.
    pub base_seed: u64,
    /// Whether to run trials in parallel using rayon.
    pub parallel: bool,
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self {
            trials: 10,
            base_seed: 0,
            parallel: true,
        }
    }
}

impl TrialConfig {
    pub fn with_trials(mut self, trials: usize) -> Self {
        self.trials = trials;
        self
    }

    pub fn with_base_seed(mut self, seed: u64) -> Self {
        self.base_seed = seed;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn seeds(&self) -> Vec<u64> {
        (0..self.trials as u64).map(|i| self.base_seed.wrapping_add(i)).collect()
    }

    pub fn validate(&self) -> Result<()> {
        if self.trials == 0 {
            return Err(BenchError::Configuration("at least one trial is required".into()));
        }
        Ok(())
    }
}

/// Runs one trial per seed and returns their traces in seed order.
///
/// `build` creates the driver of a trial from its seed. The first error
/// (from `build` or from a driver) is returned.
pub fn run_trials<D, F>(config: &TrialConfig, run: &StepsRun, build: F) -> Result<Vec<RunTrace>>
where
    D: Driver,
    F: Fn(u64) -> Result<D> + Sync,
{
    config.validate()?;
    let started = Instant::now();
    let seeds = config.seeds();

    let trial = |&seed: &u64| -> Result<RunTrace> {
        let mut driver = build(seed)?;
        let mut recorder = TraceRecorder::new(seed);
        run.create_job(&mut driver)
            .subscribe(|proxy| recorder.observe(proxy))
            .run()?;
        Ok(recorder.finish())
    };

    let traces: Result<Vec<RunTrace>> = if config.parallel {
        seeds.par_iter().map(trial).collect()
    } else {
        seeds.iter().map(trial).collect()
    };
    let traces = traces?;

    info!(
        "{} trials of {} steps done in {:.3}s",
        traces.len(),
        run.steps(),
        started.elapsed().as_secs_f64()
    );
    Ok(traces)
}
