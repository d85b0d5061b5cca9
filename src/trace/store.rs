//! In-memory result source.

use super::extract::{ExtractedPoint, Extractor};
use super::recorder::RunTrace;
use crate::error::Result;
use crate::metrics::ReferenceFront;
use log::debug;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
struct ProblemEntry {
    front: Option<Arc<ReferenceFront>>,
    algorithms: BTreeMap<String, Vec<RunTrace>>,
}

/// Run traces grouped by problem and algorithm name.
///
/// Iteration order is lexicographic on both keys.
#[derive(Debug, Clone, Default)]
pub struct ResultStore {
    problems: BTreeMap<String, ProblemEntry>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches the reference Pareto front of a problem.
    pub fn set_front(&mut self, problem: &str, front: Arc<ReferenceFront>) {
        self.problems.entry(problem.to_string()).or_default().front = Some(front);
    }

    pub fn push(&mut self, problem: &str, algorithm: &str, trace: RunTrace) {
        self.runs_mut(problem, algorithm).push(trace);
    }

    pub fn extend<I: IntoIterator<Item = RunTrace>>(
        &mut self,
        problem: &str,
        algorithm: &str,
        traces: I,
    ) {
        self.runs_mut(problem, algorithm).extend(traces);
    }

    fn runs_mut(&mut self, problem: &str, algorithm: &str) -> &mut Vec<RunTrace> {
        self.problems
            .entry(problem.to_string())
            .or_default()
            .algorithms
            .entry(algorithm.to_string())
            .or_default()
    }

    pub fn problems(&self) -> impl Iterator<Item = &str> {
        self.problems.keys().map(String::as_str)
    }

    pub fn algorithms(&self, problem: &str) -> Vec<&str> {
        self.problems
            .get(problem)
            .map(|p| p.algorithms.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn front(&self, problem: &str) -> Option<&Arc<ReferenceFront>> {
        self.problems.get(problem).and_then(|p| p.front.as_ref())
    }

    pub fn runs(&self, problem: &str, algorithm: &str) -> Option<&[RunTrace]> {
        self.problems
            .get(problem)
            .and_then(|p| p.algorithms.get(algorithm))
            .map(Vec::as_slice)
    }

    /// Total number of stored runs.
    pub fn len(&self) -> usize {
        self.problems
            .values()
            .flat_map(|p| p.algorithms.values())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Extracted checkpoints of one algorithm on one problem.
#[derive(Debug, Clone, PartialEq)]
pub struct AlgorithmResults {
    pub algorithm: String,
    pub points: Vec<ExtractedPoint>,
}

/// Everything extracted for one problem.
#[derive(Debug, Clone)]
pub struct ProblemResults {
    pub problem: String,
    pub front: Option<Arc<ReferenceFront>>,
    pub algorithms: Vec<AlgorithmResults>,
}

/// Runs `extractor` over every (problem, algorithm) in `store`.
///
/// The first malformed trace aborts the whole batch.
pub fn each_result<E: Extractor + ?Sized>(
    extractor: &E,
    store: &ResultStore,
) -> Result<Vec<ProblemResults>> {
    let mut out = Vec::with_capacity(store.problems.len());
    for (problem, entry) in &store.problems {
        let mut algorithms = Vec::with_capacity(entry.algorithms.len());
        for (algorithm, runs) in &entry.algorithms {
            let points = extractor.extract(runs)?;
            debug!(
                "{} extraction of {}/{}: {} runs, {} checkpoints",
                extractor.name(),
                problem,
                algorithm,
                runs.len(),
                points.len()
            );
            algorithms.push(AlgorithmResults {
                algorithm: algorithm.clone(),
                points,
            });
        }
        out.push(ProblemResults {
            problem: problem.clone(),
            front: entry.front.clone(),
            algorithms,
        });
    }
    Ok(out)
}
