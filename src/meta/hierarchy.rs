//! Hierarchic genetic strategy (HGS).
//!
//! A tree of drivers. The root explores coarsely; after each metaepoch every
//! node may sprout a child seeded with its best individual, which then
//! refines that region on the next level.
//!
//! # Metaepoch
//!
//! 1. Every node is visited in pre-order and stepped up to its level's
//!    `metaepoch_length` times, while the level budget lasts.
//! 2. Every node that did work and is not on the deepest level may sprout
//!    one child, unless it already has `max_sprouts` children or the new
//!    seed lies within `sprout_min_distance` of an existing child's best.

use crate::driver::{BoxedDriver, Candidate, Driver, Population, Proxy, Replacement};
use crate::error::{BenchError, Result};
use crate::metrics::MetricSet;
use crate::moea::pareto::{euclidean, pareto_order};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

/// Settings of one tree level.
///
/// ```
/// use u_metabench::meta::LevelConfig;
///
/// let level = LevelConfig::default().with_metaepoch_length(3).with_budget(5_000);
/// assert!(level.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LevelConfig {
    /// Steps per node per metaepoch.
    pub metaepoch_length: usize,
    /// Children a node on this level may sprout.
    pub max_sprouts: usize,
    /// Evaluations shared by all nodes on this level. `None` = unbounded.
    pub budget: Option<u64>,
    /// A sprout into this level is redundant when its seed is closer than
    /// this (in objective space) to the best of a sibling.
    pub sprout_min_distance: f64,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            metaepoch_length: 5,
            max_sprouts: 3,
            budget: None,
            sprout_min_distance: 0.1,
        }
    }
}

impl LevelConfig {
    pub fn with_metaepoch_length(mut self, steps: usize) -> Self {
        self.metaepoch_length = steps;
        self
    }

    pub fn with_max_sprouts(mut self, n: usize) -> Self {
        self.max_sprouts = n;
        self
    }

    pub fn with_budget(mut self, evaluations: u64) -> Self {
        self.budget = Some(evaluations);
        self
    }

    pub fn with_sprout_min_distance(mut self, distance: f64) -> Self {
        self.sprout_min_distance = distance;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.metaepoch_length == 0 {
            return Err(BenchError::Configuration(
                "metaepoch_length must be at least 1".into(),
            ));
        }
        if self.budget == Some(0) {
            return Err(BenchError::Configuration(
                "level budget must be positive or None".into(),
            ));
        }
        if self.sprout_min_distance.is_nan() || self.sprout_min_distance < 0.0 {
            return Err(BenchError::Configuration(
                "sprout_min_distance must be non-negative".into(),
            ));
        }
        Ok(())
    }
}

/// Builds the driver of a new node: `(level, seed individual, rng seed)`.
pub type Spawner<G> = Box<dyn FnMut(usize, &Candidate<G>, u64) -> Result<BoxedDriver<G>> + Send>;

struct HgsNode<G> {
    level: usize,
    driver: BoxedDriver<G>,
    children: Vec<HgsNode<G>>,
    worked: bool,
}

impl<G: Clone> HgsNode<G> {
    fn new(level: usize, driver: BoxedDriver<G>) -> Self {
        Self {
            level,
            driver,
            children: Vec::new(),
            worked: false,
        }
    }

    fn run_metaepoch(&mut self, levels: &[LevelConfig], spent: &mut [u64]) -> Result<()> {
        let config = &levels[self.level];
        self.worked = false;
        for _ in 0..config.metaepoch_length {
            let capped = config.budget.is_some_and(|cap| spent[self.level] >= cap);
            if self.driver.is_exhausted() || capped {
                break;
            }
            let before = self.driver.budget();
            self.driver.step()?;
            spent[self.level] += self.driver.budget().saturating_sub(before);
            self.worked = true;
        }
        for child in self.children.iter_mut() {
            child.run_metaepoch(levels, spent)?;
        }
        Ok(())
    }

    fn sprout(
        &mut self,
        levels: &[LevelConfig],
        spawner: &mut Spawner<G>,
        rng: &mut StdRng,
    ) -> Result<usize> {
        let mut sprouted = 0;
        for child in self.children.iter_mut() {
            sprouted += child.sprout(levels, spawner, rng)?;
        }

        let next = self.level + 1;
        if !self.worked
            || next >= levels.len()
            || self.children.len() >= levels[self.level].max_sprouts
        {
            return Ok(sprouted);
        }
        let Some(seed) = best_of(self.driver.population().as_slice()) else {
            return Ok(sprouted);
        };
        let min_distance = levels[next].sprout_min_distance;
        let redundant = self.children.iter().any(|child| {
            best_of(child.driver.population().as_slice())
                .is_some_and(|best| euclidean(&best.objectives, &seed.objectives) < min_distance)
        });
        if redundant {
            return Ok(sprouted);
        }

        let driver = spawner(next, &seed, rng.random())?;
        self.children.push(HgsNode::new(next, driver));
        Ok(sprouted + 1)
    }
}

fn best_of<G: Clone>(population: &[Candidate<G>]) -> Option<Candidate<G>> {
    pareto_order(population).first().map(|&i| population[i].clone())
}

/// Composite driver running a tree of nodes level by level.
pub struct HierarchicalDriver<G> {
    root: HgsNode<G>,
    levels: Vec<LevelConfig>,
    spawner: Spawner<G>,
    rng: StdRng,
    metaepoch: usize,
    metrics: Arc<MetricSet>,
}

impl<G: Clone + Send + Sync + 'static> HierarchicalDriver<G> {
    /// Creates the tree with `root` on level 0. `spawner` builds every
    /// later node.
    pub fn new<F>(
        root: BoxedDriver<G>,
        levels: Vec<LevelConfig>,
        spawner: F,
        metrics: Arc<MetricSet>,
    ) -> Result<Self>
    where
        F: FnMut(usize, &Candidate<G>, u64) -> Result<BoxedDriver<G>> + Send + 'static,
    {
        if levels.is_empty() {
            return Err(BenchError::Configuration("hierarchy needs at least one level".into()));
        }
        for level in &levels {
            level.validate()?;
        }

        Ok(Self {
            root: HgsNode::new(0, root),
            levels,
            spawner: Box::new(spawner),
            rng: StdRng::seed_from_u64(rand::random()),
            metaepoch: 0,
            metrics,
        })
    }

    /// Reseeds the RNG that derives the seeds handed to the spawner.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn levels(&self) -> &[LevelConfig] {
        &self.levels
    }

    /// Metaepochs completed so far.
    pub fn metaepoch(&self) -> usize {
        self.metaepoch
    }

    /// Nodes currently in the tree, root included.
    pub fn node_count(&self) -> usize {
        self.nodes().len()
    }

    /// Evaluations spent on each level.
    pub fn level_budgets(&self) -> Vec<u64> {
        let mut spent = vec![0; self.levels.len()];
        for node in self.nodes() {
            spent[node.level] += node.driver.budget();
        }
        spent
    }

    fn nodes(&self) -> Vec<&HgsNode<G>> {
        let mut out = Vec::new();
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children.iter().rev());
        }
        out
    }

    fn is_live(&self, node: &HgsNode<G>, spent: &[u64]) -> bool {
        !node.driver.is_exhausted()
            && !self.levels[node.level]
                .budget
                .is_some_and(|cap| spent[node.level] >= cap)
    }
}

impl<G: Clone + Send + Sync + 'static> Driver for HierarchicalDriver<G> {
    type Genome = G;

    fn step(&mut self) -> Result<Proxy<G>> {
        if self.is_exhausted() {
            return Err(BenchError::InvalidState(format!(
                "hierarchy stepped after exhaustion (metaepoch {})",
                self.metaepoch
            )));
        }

        let mut spent = self.level_budgets();
        self.root.run_metaepoch(&self.levels, &mut spent)?;
        let sprouted = self.root.sprout(&self.levels, &mut self.spawner, &mut self.rng)?;
        self.metaepoch += 1;

        debug!(
            "metaepoch {} done: {} nodes, {} sprouted, level budgets {:?}",
            self.metaepoch,
            self.node_count(),
            sprouted,
            spent
        );

        Ok(Proxy::new(self.metaepoch, self.budget(), self.population(), self.metrics.clone()))
    }

    fn is_exhausted(&self) -> bool {
        let spent = self.level_budgets();
        !self.nodes().into_iter().any(|node| self.is_live(node, &spent))
    }

    fn budget(&self) -> u64 {
        self.nodes().iter().map(|node| node.driver.budget()).sum()
    }

    /// Concatenation of every node's population, in pre-order.
    fn population(&self) -> Population<G> {
        let merged: Vec<Candidate<G>> = self
            .nodes()
            .into_iter()
            .flat_map(|node| node.driver.population().to_vec())
            .collect();
        Arc::new(merged)
    }

    /// Immigrants always enter at the root.
    fn receive_immigrants(&mut self, immigrants: Vec<Candidate<G>>, replacement: Replacement) {
        self.root.driver.receive_immigrants(immigrants, replacement);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{CountingDriver, StepsRun};
    use crate::metrics::ReferenceFront;
    use crate::moea::{zdt1_front, LeafConfig, LeafDriver, Nsga2, Zdt1};
    use std::sync::Mutex;

    fn front(tag: u32) -> Vec<Candidate<u32>> {
        vec![
            Candidate::new(tag, vec![0.0, 1.0]),
            Candidate::new(tag, vec![1.0, 0.0]),
            Candidate::new(tag, vec![2.0, 2.0]),
        ]
    }

    fn counting_tree(
        levels: Vec<LevelConfig>,
        spawned: Arc<Mutex<Vec<usize>>>,
    ) -> HierarchicalDriver<u32> {
        let root: BoxedDriver<u32> = Box::new(CountingDriver::with_population(10, 100, front(0)));
        HierarchicalDriver::new(
            root,
            levels,
            move |level, seed: &Candidate<u32>, _| {
                spawned.lock().unwrap().push(level);
                let driver: BoxedDriver<u32> =
                    Box::new(CountingDriver::with_population(1, 100, vec![seed.clone()]));
                Ok(driver)
            },
            Arc::new(MetricSet::new()),
        )
        .unwrap()
        .with_seed(1)
    }

    #[test]
    fn test_metaepochs_and_sprouting() {
        let spawned = Arc::new(Mutex::new(Vec::new()));
        let levels = vec![
            LevelConfig::default().with_metaepoch_length(2).with_max_sprouts(2),
            LevelConfig::default()
                .with_metaepoch_length(1)
                .with_sprout_min_distance(0.0),
        ];
        let mut driver = counting_tree(levels, spawned.clone());

        let mut budgets = Vec::new();
        StepsRun::new(3)
            .create_job(&mut driver)
            .subscribe(|p| budgets.push(p.budget()))
            .run()
            .unwrap();

        assert_eq!(budgets, vec![20, 41, 63]);
        assert_eq!(driver.node_count(), 3);
        assert_eq!(*spawned.lock().unwrap(), vec![1, 1]);
        assert_eq!(driver.level_budgets(), vec![60, 3]);
    }

    #[test]
    fn test_redundant_sprout_is_skipped() {
        let spawned = Arc::new(Mutex::new(Vec::new()));
        let levels = vec![
            LevelConfig::default().with_metaepoch_length(1).with_max_sprouts(3),
            LevelConfig::default().with_sprout_min_distance(0.5),
        ];
        let mut driver = counting_tree(levels, spawned.clone());
        for _ in 0..4 {
            driver.step().unwrap();
        }
        assert_eq!(driver.node_count(), 2);
        assert_eq!(spawned.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_level_budget_cap_exhausts() {
        let levels = vec![LevelConfig::default().with_metaepoch_length(2).with_budget(30)];
        let mut driver = counting_tree(levels, Arc::new(Mutex::new(Vec::new())));

        assert_eq!(driver.step().unwrap().budget(), 20);
        assert!(!driver.is_exhausted());
        assert_eq!(driver.step().unwrap().budget(), 30);
        assert!(driver.is_exhausted());
        assert!(matches!(driver.step(), Err(BenchError::InvalidState(_))));
    }

    #[test]
    fn test_live_child_outlasts_exhausted_root() {
        let root: BoxedDriver<u32> = Box::new(CountingDriver::with_population(10, 2, front(0)));
        let levels = vec![
            LevelConfig::default().with_metaepoch_length(1).with_max_sprouts(1),
            LevelConfig::default().with_metaepoch_length(1),
        ];
        let mut driver = HierarchicalDriver::new(
            root,
            levels,
            |_, seed: &Candidate<u32>, _| {
                let driver: BoxedDriver<u32> =
                    Box::new(CountingDriver::with_population(1, 3, vec![seed.clone()]));
                Ok(driver)
            },
            Arc::new(MetricSet::new()),
        )
        .unwrap()
        .with_seed(1);

        let mut budgets = Vec::new();
        for _ in 0..4 {
            assert!(!driver.is_exhausted());
            budgets.push(driver.step().unwrap().budget());
        }
        assert_eq!(budgets, vec![10, 21, 22, 23]);
        assert_eq!(driver.node_count(), 2);
        assert!(driver.is_exhausted());
        assert!(matches!(driver.step(), Err(BenchError::InvalidState(_))));
    }

    #[test]
    fn test_immigrants_enter_at_root() {
        let levels = vec![LevelConfig::default()];
        let mut driver = counting_tree(levels, Arc::new(Mutex::new(Vec::new())));
        driver.receive_immigrants(vec![Candidate::new(99, vec![0.0, 0.0])], Replacement::Worst);
        let genomes: Vec<u32> = driver.population().iter().map(|c| c.genome).collect();
        assert_eq!(genomes, vec![0, 0, 99]);
    }

    #[test]
    fn test_invalid_levels() {
        let root: BoxedDriver<u32> = Box::new(CountingDriver::new(1, 1));
        let spawner = |_: usize, _: &Candidate<u32>, _: u64| -> Result<BoxedDriver<u32>> {
            Err(BenchError::InvalidState("unused".into()))
        };
        let metrics = Arc::new(MetricSet::new());
        assert!(HierarchicalDriver::new(root, Vec::new(), spawner, metrics.clone()).is_err());

        let root: BoxedDriver<u32> = Box::new(CountingDriver::new(1, 1));
        let levels = vec![LevelConfig::default().with_metaepoch_length(0)];
        assert!(HierarchicalDriver::new(root, levels, spawner, metrics).is_err());
    }

    #[test]
    fn test_spawner_error_aborts_step() {
        let root: BoxedDriver<u32> = Box::new(CountingDriver::with_population(1, 10, front(0)));
        let levels = vec![LevelConfig::default(), LevelConfig::default()];
        let mut driver = HierarchicalDriver::new(
            root,
            levels,
            |_, _: &Candidate<u32>, _| -> Result<BoxedDriver<u32>> {
                Err(BenchError::InvalidState("spawn failed".into()))
            },
            Arc::new(MetricSet::new()),
        )
        .unwrap();
        assert!(driver.step().is_err());
    }

    #[test]
    fn test_nsga2_tree_on_zdt1() {
        let problem = Arc::new(Zdt1 { dim: 6 });
        let reference = Arc::new(ReferenceFront::new(zdt1_front(51)));
        let metrics = Arc::new(MetricSet::standard(reference, None));

        let root_config = LeafConfig::default()
            .with_population_size(12)
            .with_max_generations(20)
            .with_seed(4);
        let root_leaf = LeafDriver::new(problem.clone(), Nsga2, root_config, metrics.clone());
        let root: BoxedDriver<Vec<f64>> = Box::new(root_leaf.unwrap());

        let child_metrics = metrics.clone();
        let spawner = move |_level: usize, seed: &Candidate<Vec<f64>>, rng_seed: u64| {
            let config = LeafConfig::default()
                .with_population_size(6)
                .with_max_generations(10)
                .with_mutation_rate(1.0)
                .with_seed(rng_seed);
            let leaf =
                LeafDriver::from_seed(problem.clone(), Nsga2, config, child_metrics.clone(), seed)?;
            Ok::<BoxedDriver<Vec<f64>>, BenchError>(Box::new(leaf))
        };

        let levels = vec![
            LevelConfig::default().with_metaepoch_length(2).with_max_sprouts(2),
            LevelConfig::default()
                .with_metaepoch_length(2)
                .with_max_sprouts(0)
                .with_sprout_min_distance(0.0),
        ];
        let mut driver = HierarchicalDriver::new(root, levels, spawner, metrics)
            .unwrap()
            .with_seed(8);

        let outcome = StepsRun::new(4).run(&mut driver).unwrap();
        assert_eq!(outcome.len(), 4);
        for w in outcome.proxies.windows(2) {
            assert!(w[0].budget() <= w[1].budget());
        }
        assert!(driver.node_count() >= 2);
        assert!(outcome.last().unwrap().metric("dst").is_some());
        let per_level: u64 = driver.level_budgets().iter().sum();
        assert_eq!(per_level, driver.budget());
    }
}
