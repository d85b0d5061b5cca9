//! Core types of the step protocol.
//!
//! A [`Driver`] is advanced one step at a time and answers each step with an
//! immutable [`Proxy`]. Leaf algorithms and composite meta-algorithms all
//! implement the same trait, so the execution engine never needs to know
//! which one it is stepping.

use crate::error::Result;
use crate::metrics::MetricSet;
use std::collections::BTreeMap;
use std::sync::Arc;

/// An evaluated individual: opaque genome plus its (minimized) objectives.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Candidate<G> {
    pub genome: G,
    pub objectives: Vec<f64>,
}

impl<G> Candidate<G> {
    pub fn new(genome: G, objectives: Vec<f64>) -> Self {
        Self { genome, objectives }
    }
}

impl<G> AsRef<[f64]> for Candidate<G> {
    fn as_ref(&self) -> &[f64] {
        &self.objectives
    }
}

/// Shared, immutable population handle.
///
/// Drivers replace the whole vector on every step (copy-on-step), so a
/// handle held by an observer never changes underneath it.
pub type Population<G> = Arc<Vec<Candidate<G>>>;

/// Snapshot of a driver right after one step.
#[derive(Debug, Clone)]
pub struct Proxy<G> {
    step: usize,
    budget: u64,
    population: Population<G>,
    metrics: Arc<MetricSet>,
}

impl<G> Proxy<G> {
    pub fn new(
        step: usize,
        budget: u64,
        population: Population<G>,
        metrics: Arc<MetricSet>,
    ) -> Self {
        Self {
            step,
            budget,
            population,
            metrics,
        }
    }

    /// 1-based index of the step that produced this proxy.
    pub fn step(&self) -> usize {
        self.step
    }

    /// Fitness evaluations consumed by the lineage so far.
    pub fn budget(&self) -> u64 {
        self.budget
    }

    pub fn population(&self) -> &Population<G> {
        &self.population
    }

    /// Names of the metrics this proxy can produce.
    pub fn metric_names(&self) -> Vec<&str> {
        self.metrics.names()
    }

    /// Evaluates one metric on the population's non-dominated front.
    ///
    /// Nothing is computed until this is called.
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.evaluate(name, self.population.as_slice())
    }

    /// Evaluates every metric at once.
    pub fn metrics(&self) -> BTreeMap<String, f64> {
        self.metrics.evaluate_all(self.population.as_slice())
    }
}

/// How immigrants displace incumbents when they arrive on an island.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Replacement {
    /// Evict the incumbents the receiving driver ranks lowest.
    #[default]
    Worst,
    /// Evict uniformly random incumbents.
    Random,
}

/// A stepwise unit of metaheuristic execution.
///
/// # Contract
///
/// - Successive proxies have non-decreasing [`Proxy::budget`].
/// - Once [`is_exhausted`](Driver::is_exhausted) returns `true` it stays
///   `true`, and [`step`](Driver::step) returns
///   [`BenchError::InvalidState`](crate::BenchError::InvalidState).
/// - The only observable effect of a step is the returned proxy.
pub trait Driver {
    /// Genome type of the individuals in this driver's population.
    type Genome: Clone;

    /// Advances by one unit of work.
    fn step(&mut self) -> Result<Proxy<Self::Genome>>;

    /// Whether no further step is possible.
    fn is_exhausted(&self) -> bool;

    /// Fitness evaluations consumed so far.
    fn budget(&self) -> u64;

    /// Current population handle.
    fn population(&self) -> Population<Self::Genome>;

    /// Inserts already-evaluated individuals, evicting incumbents so the
    /// population size is preserved.
    fn receive_immigrants(
        &mut self,
        immigrants: Vec<Candidate<Self::Genome>>,
        replacement: Replacement,
    );
}

impl<D: Driver + ?Sized> Driver for Box<D> {
    type Genome = D::Genome;

    fn step(&mut self) -> Result<Proxy<Self::Genome>> {
        (**self).step()
    }

    fn is_exhausted(&self) -> bool {
        (**self).is_exhausted()
    }

    fn budget(&self) -> u64 {
        (**self).budget()
    }

    fn population(&self) -> Population<Self::Genome> {
        (**self).population()
    }

    fn receive_immigrants(
        &mut self,
        immigrants: Vec<Candidate<Self::Genome>>,
        replacement: Replacement,
    ) {
        (**self).receive_immigrants(immigrants, replacement)
    }
}

/// Boxed driver used by composites to own heterogeneous children.
pub type BoxedDriver<G> = Box<dyn Driver<Genome = G> + Send>;
