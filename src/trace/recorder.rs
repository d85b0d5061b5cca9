//! Raw per-run traces.

use crate::driver::Proxy;
use crate::error::{BenchError, Result};
use std::collections::BTreeMap;
use std::time::Instant;

/// Observation of one published proxy.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TraceEntry {
    pub step: usize,
    pub budget: u64,
    /// Wall-clock seconds since the recorder was created.
    pub elapsed_secs: f64,
    pub metrics: BTreeMap<String, f64>,
}

/// Everything observed during one run, in publication order.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunTrace {
    pub seed: u64,
    pub entries: Vec<TraceEntry>,
}

impl RunTrace {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            entries: Vec::new(),
        }
    }

    pub fn last(&self) -> Option<&TraceEntry> {
        self.entries.last()
    }

    /// Checks that budget and elapsed time never decrease.
    ///
    /// `run` is the index reported in the error.
    pub fn validate(&self, run: usize) -> Result<()> {
        for (i, pair) in self.entries.windows(2).enumerate() {
            if pair[1].budget < pair[0].budget {
                return Err(BenchError::MalformedTrace {
                    run,
                    reason: format!(
                        "budget decreases from {} to {} at entry {}",
                        pair[0].budget,
                        pair[1].budget,
                        i + 1
                    ),
                });
            }
            if pair[1].elapsed_secs < pair[0].elapsed_secs {
                return Err(BenchError::MalformedTrace {
                    run,
                    reason: format!("elapsed time decreases at entry {}", i + 1),
                });
            }
        }
        Ok(())
    }
}

/// Subscriber that turns published proxies into a [`RunTrace`].
///
/// ```ignore
/// let mut recorder = TraceRecorder::new(seed);
/// StepsRun::new(50)
///     .create_job(&mut driver)
///     .subscribe(|proxy| recorder.observe(proxy))
///     .run()?;
/// let trace = recorder.finish();
/// ```
#[derive(Debug)]
pub struct TraceRecorder {
    started: Instant,
    trace: RunTrace,
}

impl TraceRecorder {
    pub fn new(seed: u64) -> Self {
        Self {
            started: Instant::now(),
            trace: RunTrace::new(seed),
        }
    }

    /// Records the proxy's budget and evaluates all of its metrics.
    pub fn observe<G>(&mut self, proxy: &Proxy<G>) {
        self.trace.entries.push(TraceEntry {
            step: proxy.step(),
            budget: proxy.budget(),
            elapsed_secs: self.started.elapsed().as_secs_f64(),
            metrics: proxy.metrics(),
        });
    }

    pub fn len(&self) -> usize {
        self.trace.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trace.entries.is_empty()
    }

    pub fn finish(self) -> RunTrace {
        self.trace
    }
}
