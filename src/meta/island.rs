//! Island model (IMGA).
//!
//! Several inner drivers evolve independently and periodically exchange
//! individuals along a migration topology.
//!
//! # Round
//!
//! 1. Every live island is stepped once, in index order.
//! 2. Every `interval` rounds, each live island selects its emigrants.
//! 3. Copies are delivered to live neighbours, which evict incumbents
//!    according to the [`Replacement`] policy.
//!
//! Emigrants are all selected before anything is delivered, so the order
//! of islands never changes who migrates.

use crate::driver::{BoxedDriver, Candidate, Driver, Population, Proxy, Replacement};
use crate::error::{BenchError, Result};
use crate::metrics::MetricSet;
use crate::moea::pareto::pareto_order;
use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

/// Who sends emigrants to whom.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Topology {
    /// Island `i` sends to island `(i + 1) mod k`.
    #[default]
    Ring,
    /// Every island sends to every other island.
    FullyConnected,
    /// `adjacency[i]` lists the destinations of island `i`.
    Custom(Vec<Vec<usize>>),
}

impl Topology {
    /// Destinations of `island` among `count` islands. Never includes
    /// `island` itself.
    pub fn neighbours(&self, island: usize, count: usize) -> Vec<usize> {
        match self {
            Topology::Ring if count > 1 => vec![(island + 1) % count],
            Topology::Ring => Vec::new(),
            Topology::FullyConnected => (0..count).filter(|&j| j != island).collect(),
            Topology::Custom(adjacency) => adjacency
                .get(island)
                .map(|dst| dst.iter().copied().filter(|&j| j != island && j < count).collect())
                .unwrap_or_default(),
        }
    }

    fn validate(&self, count: usize) -> Result<()> {
        if let Topology::Custom(adjacency) = self {
            if adjacency.len() != count {
                return Err(BenchError::Configuration(format!(
                    "custom topology lists {} islands, driver has {count}",
                    adjacency.len()
                )));
            }
            if let Some(bad) = adjacency.iter().flatten().find(|&&j| j >= count) {
                return Err(BenchError::Configuration(format!(
                    "custom topology references island {bad} of {count}"
                )));
            }
        }
        Ok(())
    }
}

/// How emigrants are picked from a source island.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EmigrantSelection {
    /// Best individuals by Pareto rank, then crowding distance.
    #[default]
    Best,
    /// Uniformly random individuals, without repetition.
    Random,
}

/// Migration settings of an [`IslandDriver`].
///
/// ```
/// use u_metabench::meta::{MigrationPolicy, Topology};
///
/// let policy = MigrationPolicy::default()
///     .with_interval(10)
///     .with_emigrants(3)
///     .with_topology(Topology::FullyConnected);
/// assert!(policy.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MigrationPolicy {
    /// Rounds between migrations.
    pub interval: usize,
    /// Individuals sent by each island per migration.
    pub emigrants: usize,
    pub selection: EmigrantSelection,
    pub replacement: Replacement,
    pub topology: Topology,
    /// Seed for random emigrant selection.
    pub seed: Option<u64>,
}

impl Default for MigrationPolicy {
    fn default() -> Self {
        Self {
            interval: 5,
            emigrants: 2,
            selection: EmigrantSelection::Best,
            replacement: Replacement::Worst,
            topology: Topology::Ring,
            seed: None,
        }
    }
}

impl MigrationPolicy {
    pub fn with_interval(mut self, rounds: usize) -> Self {
        self.interval = rounds;
        self
    }

    pub fn with_emigrants(mut self, n: usize) -> Self {
        self.emigrants = n;
        self
    }

    pub fn with_selection(mut self, selection: EmigrantSelection) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_replacement(mut self, replacement: Replacement) -> Self {
        self.replacement = replacement;
        self
    }

    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.interval == 0 {
            return Err(BenchError::Configuration(
                "migration interval must be at least 1".into(),
            ));
        }
        if self.emigrants == 0 {
            return Err(BenchError::Configuration(
                "emigrants must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Composite driver running inner drivers as islands.
pub struct IslandDriver<G> {
    islands: Vec<BoxedDriver<G>>,
    policy: MigrationPolicy,
    rng: StdRng,
    round: usize,
    migrations: usize,
    metrics: Arc<MetricSet>,
}

impl<G: Clone + Send + Sync + 'static> IslandDriver<G> {
    pub fn new(
        islands: Vec<BoxedDriver<G>>,
        policy: MigrationPolicy,
        metrics: Arc<MetricSet>,
    ) -> Result<Self> {
        if islands.is_empty() {
            return Err(BenchError::Configuration("island model needs at least one island".into()));
        }
        policy.validate()?;
        policy.topology.validate(islands.len())?;

        let rng = match policy.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::random()),
        };

        Ok(Self {
            islands,
            policy,
            rng,
            round: 0,
            migrations: 0,
            metrics,
        })
    }

    pub fn islands(&self) -> &[BoxedDriver<G>] {
        &self.islands
    }

    pub fn policy(&self) -> &MigrationPolicy {
        &self.policy
    }

    /// Rounds completed so far.
    pub fn round(&self) -> usize {
        self.round
    }

    /// Migration events performed so far.
    pub fn migrations(&self) -> usize {
        self.migrations
    }

    fn live(&self) -> Vec<usize> {
        (0..self.islands.len())
            .filter(|&i| !self.islands[i].is_exhausted())
            .collect()
    }

    fn select_emigrants(&mut self, island: usize) -> Vec<Candidate<G>> {
        let population = self.islands[island].population();
        let n = self.policy.emigrants.min(population.len());
        let picked: Vec<usize> = match self.policy.selection {
            EmigrantSelection::Best => {
                pareto_order(population.as_slice()).into_iter().take(n).collect()
            }
            EmigrantSelection::Random => {
                rand::seq::index::sample(&mut self.rng, population.len(), n).into_vec()
            }
        };
        picked.into_iter().map(|i| population[i].clone()).collect()
    }

    fn migrate(&mut self) {
        let live = self.live();
        let count = self.islands.len();

        let outgoing: Vec<(usize, Vec<Candidate<G>>)> = live
            .iter()
            .map(|&src| (src, self.select_emigrants(src)))
            .collect();

        let mut inbox: Vec<Vec<Candidate<G>>> = vec![Vec::new(); count];
        for (src, emigrants) in &outgoing {
            for dst in self.policy.topology.neighbours(*src, count) {
                if live.contains(&dst) {
                    inbox[dst].extend(emigrants.iter().cloned());
                }
            }
        }

        let mut delivered = 0;
        for (dst, immigrants) in inbox.into_iter().enumerate() {
            if !immigrants.is_empty() {
                delivered += immigrants.len();
                self.islands[dst].receive_immigrants(immigrants, self.policy.replacement);
            }
        }

        self.migrations += 1;
        debug!(
            "migration {} after round {}: {} individuals among {} live islands",
            self.migrations,
            self.round,
            delivered,
            live.len()
        );
    }
}

impl<G: Clone + Send + Sync + 'static> Driver for IslandDriver<G> {
    type Genome = G;

    fn step(&mut self) -> Result<Proxy<G>> {
        if self.is_exhausted() {
            return Err(BenchError::InvalidState(format!(
                "island model stepped after exhaustion (round {})",
                self.round
            )));
        }

        for island in self.islands.iter_mut() {
            if !island.is_exhausted() {
                island.step()?;
            }
        }
        self.round += 1;

        if self.round % self.policy.interval == 0 {
            self.migrate();
        }

        Ok(Proxy::new(self.round, self.budget(), self.population(), self.metrics.clone()))
    }

    fn is_exhausted(&self) -> bool {
        self.islands.iter().all(|island| island.is_exhausted())
    }

    fn budget(&self) -> u64 {
        self.islands.iter().map(|island| island.budget()).sum()
    }

    /// Concatenation of every island's population, in island order.
    fn population(&self) -> Population<G> {
        let merged: Vec<Candidate<G>> = self
            .islands
            .iter()
            .flat_map(|island| island.population().to_vec())
            .collect();
        Arc::new(merged)
    }

    /// Spreads immigrants over the live islands round-robin.
    fn receive_immigrants(&mut self, immigrants: Vec<Candidate<G>>, replacement: Replacement) {
        let live = self.live();
        if live.is_empty() {
            return;
        }
        let mut batches: Vec<Vec<Candidate<G>>> = vec![Vec::new(); live.len()];
        for (i, immigrant) in immigrants.into_iter().enumerate() {
            batches[i % live.len()].push(immigrant);
        }
        for (island, batch) in live.into_iter().zip(batches) {
            if !batch.is_empty() {
                self.islands[island].receive_immigrants(batch, replacement);
            }
        }
    }
}
