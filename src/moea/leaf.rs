//! Generic leaf driver.
//!
//! [`LeafDriver`] owns one problem, one [`Metaheuristic`] and the state of a
//! single population. Each [`Driver::step`] runs exactly one generation of
//! the algorithm; the evaluations it makes are added to the budget.

use super::config::LeafConfig;
use super::types::{Evaluator, MoProblem};
use crate::driver::{Candidate, Driver, Population, Proxy, Replacement};
use crate::error::{BenchError, Result};
use crate::metrics::MetricSet;
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

/// One generation loop of a population-based algorithm.
pub trait Metaheuristic<P: MoProblem>: Send {
    /// Short identifier, e.g. `"NSGAII"`.
    fn name(&self) -> &'static str;

    /// Produces the next population from the current one.
    ///
    /// All objective evaluations must go through `evaluator`.
    fn next_generation<R: Rng>(
        &mut self,
        population: &[Candidate<P::Genome>],
        evaluator: &mut Evaluator<'_, P>,
        config: &LeafConfig,
        rng: &mut R,
    ) -> Vec<Candidate<P::Genome>>;

    /// Population indices ordered from worst to best under this algorithm's
    /// own selection rule. Used to pick incumbents evicted by immigrants.
    fn eviction_order(&self, population: &[Candidate<P::Genome>]) -> Vec<usize>;
}

/// A driver wrapping one metaheuristic's generation loop.
pub struct LeafDriver<P: MoProblem, A: Metaheuristic<P>> {
    problem: Arc<P>,
    algorithm: A,
    config: LeafConfig,
    rng: StdRng,
    population: Population<P::Genome>,
    generation: usize,
    budget: u64,
    metrics: Arc<MetricSet>,
}

impl<P: MoProblem, A: Metaheuristic<P>> LeafDriver<P, A> {
    /// Creates the driver and evaluates a random initial population.
    ///
    /// The initial evaluations count toward the budget.
    pub fn new(
        problem: Arc<P>,
        algorithm: A,
        config: LeafConfig,
        metrics: Arc<MetricSet>,
    ) -> Result<Self> {
        config.validate()?;
        let mut rng = create_rng(config.seed);

        let mut evaluator = Evaluator::new(problem.as_ref());
        let population: Vec<_> = (0..config.population_size)
            .map(|_| {
                let genome = problem.create_genome(&mut rng);
                evaluator.evaluate(genome)
            })
            .collect();
        let budget = evaluator.evaluations();

        Ok(Self {
            problem,
            algorithm,
            config,
            rng,
            population: Arc::new(population),
            generation: 0,
            budget,
            metrics,
        })
    }

    /// Creates the driver around an already evaluated seed individual.
    ///
    /// The population is the seed plus mutated copies of it; only the
    /// copies are evaluated. Used to sprout child nodes in hierarchical
    /// search.
    pub fn from_seed(
        problem: Arc<P>,
        algorithm: A,
        config: LeafConfig,
        metrics: Arc<MetricSet>,
        seed: &Candidate<P::Genome>,
    ) -> Result<Self> {
        config.validate()?;
        let mut rng = create_rng(config.seed);

        let mut evaluator = Evaluator::new(problem.as_ref());
        let mut population = Vec::with_capacity(config.population_size);
        population.push(seed.clone());
        while population.len() < config.population_size {
            let mut genome = seed.genome.clone();
            problem.mutate(&mut genome, &mut rng);
            population.push(evaluator.evaluate(genome));
        }
        let budget = evaluator.evaluations();

        Ok(Self {
            problem,
            algorithm,
            config,
            rng,
            population: Arc::new(population),
            generation: 0,
            budget,
            metrics,
        })
    }

    pub fn algorithm_name(&self) -> &'static str {
        self.algorithm.name()
    }

    /// Generations completed so far.
    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn config(&self) -> &LeafConfig {
        &self.config
    }

    pub fn problem(&self) -> &Arc<P> {
        &self.problem
    }
}

impl<P: MoProblem, A: Metaheuristic<P>> Driver for LeafDriver<P, A> {
    type Genome = P::Genome;

    fn step(&mut self) -> Result<Proxy<P::Genome>> {
        if self.is_exhausted() {
            return Err(BenchError::InvalidState(format!(
                "{} stepped after exhaustion (generation {}, budget {})",
                self.algorithm.name(),
                self.generation,
                self.budget
            )));
        }

        let mut evaluator = Evaluator::new(self.problem.as_ref());
        let next = self
            .algorithm
            .next_generation(&self.population, &mut evaluator, &self.config, &mut self.rng);

        self.budget += evaluator.evaluations();
        self.generation += 1;
        self.population = Arc::new(next);

        debug!(
            "{} generation {} done, budget {}",
            self.algorithm.name(),
            self.generation,
            self.budget
        );

        Ok(Proxy::new(
            self.generation,
            self.budget,
            self.population.clone(),
            self.metrics.clone(),
        ))
    }

    fn is_exhausted(&self) -> bool {
        let generations_spent = self
            .config
            .max_generations
            .is_some_and(|max| self.generation >= max);
        let budget_spent = self.config.max_budget.is_some_and(|max| self.budget >= max);
        generations_spent || budget_spent
    }

    fn budget(&self) -> u64 {
        self.budget
    }

    fn population(&self) -> Population<P::Genome> {
        self.population.clone()
    }

    fn receive_immigrants(
        &mut self,
        mut immigrants: Vec<Candidate<P::Genome>>,
        replacement: Replacement,
    ) {
        let mut population = self.population.to_vec();
        immigrants.truncate(population.len());
        if immigrants.is_empty() {
            return;
        }

        let slots: Vec<usize> = match replacement {
            Replacement::Worst => self
                .algorithm
                .eviction_order(&population)
                .into_iter()
                .take(immigrants.len())
                .collect(),
            Replacement::Random => {
                let count = immigrants.len();
                rand::seq::index::sample(&mut self.rng, population.len(), count).into_vec()
            }
        };

        for (slot, immigrant) in slots.into_iter().zip(immigrants) {
            population[slot] = immigrant;
        }
        self.population = Arc::new(population);
    }
}

/// Breeds `config.population_size` evaluated offspring.
///
/// `select` picks a parent index; crossover and mutation are applied with
/// the configured probabilities.
pub fn breed<P, R, F>(
    population: &[Candidate<P::Genome>],
    evaluator: &mut Evaluator<'_, P>,
    config: &LeafConfig,
    rng: &mut R,
    mut select: F,
) -> Vec<Candidate<P::Genome>>
where
    P: MoProblem,
    R: Rng,
    F: FnMut(&mut R) -> usize,
{
    let problem = evaluator.problem();
    let mut offspring = Vec::with_capacity(config.population_size);

    while offspring.len() < config.population_size {
        let p1 = &population[select(rng)];
        let p2 = &population[select(rng)];

        let mut children = if rng.random_range(0.0..1.0) < config.crossover_rate {
            problem.crossover(&p1.genome, &p2.genome, rng)
        } else {
            Vec::new()
        };
        if children.is_empty() {
            children.push(p1.genome.clone());
        }

        for mut child in children {
            if offspring.len() >= config.population_size {
                break;
            }
            if rng.random_range(0.0..1.0) < config.mutation_rate {
                problem.mutate(&mut child, rng);
            }
            offspring.push(evaluator.evaluate(child));
        }
    }

    offspring
}

fn create_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::seed_from_u64(rand::random()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moea::pareto::pareto_order;
    use crate::moea::types::tests::Zdt1;

    /// Keeps the best half of parents + offspring by Pareto order.
    struct Elitist;

    impl Metaheuristic<Zdt1> for Elitist {
        fn name(&self) -> &'static str {
            "ELITIST"
        }

        fn next_generation<R: Rng>(
            &mut self,
            population: &[Candidate<Vec<f64>>],
            evaluator: &mut Evaluator<'_, Zdt1>,
            config: &LeafConfig,
            rng: &mut R,
        ) -> Vec<Candidate<Vec<f64>>> {
            let n = population.len();
            let offspring = breed(population, evaluator, config, rng, |r| r.random_range(0..n));
            let mut combined: Vec<_> = population.iter().cloned().chain(offspring).collect();
            let order = pareto_order(&combined);
            let keep: Vec<usize> = order.into_iter().take(config.population_size).collect();
            let mut next = Vec::with_capacity(keep.len());
            for i in keep {
                let empty = Candidate::new(Vec::new(), Vec::new());
                next.push(std::mem::replace(&mut combined[i], empty));
            }
            next
        }

        fn eviction_order(&self, population: &[Candidate<Vec<f64>>]) -> Vec<usize> {
            let mut order = pareto_order(population);
            order.reverse();
            order
        }
    }

    fn driver(config: LeafConfig) -> LeafDriver<Zdt1, Elitist> {
        LeafDriver::new(
            Arc::new(Zdt1 { dim: 6 }),
            Elitist,
            config,
            Arc::new(MetricSet::new()),
        )
        .unwrap()
    }

    #[test]
    fn test_initial_population_counts_budget() {
        let d = driver(LeafConfig::default().with_population_size(10).with_seed(1));
        assert_eq!(d.budget(), 10);
        assert_eq!(d.population().len(), 10);
        assert_eq!(d.generation(), 0);
        assert_eq!(d.algorithm_name(), "ELITIST");
    }

    #[test]
    fn test_budget_grows_by_offspring() {
        let mut d = driver(LeafConfig::default().with_population_size(10).with_seed(1));
        for k in 1..=3u64 {
            let proxy = d.step().unwrap();
            assert_eq!(proxy.budget(), 10 * (k + 1));
            assert_eq!(proxy.step() as u64, k);
            assert_eq!(proxy.population().len(), 10);
        }
    }

    #[test]
    fn test_generation_limit_exhausts() {
        let mut d = driver(
            LeafConfig::default()
                .with_population_size(8)
                .with_max_generations(2)
                .with_seed(5),
        );
        d.step().unwrap();
        assert!(!d.is_exhausted());
        d.step().unwrap();
        assert!(d.is_exhausted());
        assert!(matches!(d.step(), Err(BenchError::InvalidState(_))));
        assert!(d.is_exhausted());
    }

    #[test]
    fn test_budget_limit_exhausts() {
        let mut d = driver(
            LeafConfig::default()
                .with_population_size(10)
                .unbounded_generations()
                .with_max_budget(25)
                .with_seed(5),
        );
        d.step().unwrap();
        assert!(!d.is_exhausted());
        d.step().unwrap();
        assert!(d.is_exhausted());
    }

    #[test]
    fn test_invalid_config_is_error() {
        let result = LeafDriver::new(
            Arc::new(Zdt1 { dim: 6 }),
            Elitist,
            LeafConfig::default().with_population_size(1),
            Arc::new(MetricSet::new()),
        );
        assert!(matches!(result, Err(BenchError::Configuration(_))));
    }

    #[test]
    fn test_same_seed_same_trajectory() {
        let config = LeafConfig::default().with_population_size(12).with_seed(99);
        let mut a = driver(config.clone());
        let mut b = driver(config);
        for _ in 0..3 {
            let pa = a.step().unwrap();
            let pb = b.step().unwrap();
            assert_eq!(pa.population(), pb.population());
        }
    }

    #[test]
    fn test_immigrants_replace_worst() {
        let mut d = driver(LeafConfig::default().with_population_size(6).with_seed(2));
        let ideal = Candidate::new(vec![0.0; 6], vec![-1.0, -1.0]);
        d.receive_immigrants(vec![ideal.clone(), ideal.clone()], Replacement::Worst);
        let pop = d.population();
        assert_eq!(pop.len(), 6);
        assert_eq!(pop.iter().filter(|c| c.objectives == ideal.objectives).count(), 2);
        // budget untouched by migration
        assert_eq!(d.budget(), 6);
    }

    #[test]
    fn test_immigrants_random_and_truncated() {
        let mut d = driver(LeafConfig::default().with_population_size(3).with_seed(2));
        let ideal = Candidate::new(vec![0.0; 6], vec![-1.0, -1.0]);
        d.receive_immigrants(vec![ideal.clone(); 5], Replacement::Random);
        let pop = d.population();
        assert_eq!(pop.len(), 3);
        assert!(pop.iter().all(|c| c.objectives == ideal.objectives));
    }

    #[test]
    fn test_from_seed_population() {
        let problem = Arc::new(Zdt1 { dim: 6 });
        let seed_genome = vec![0.5; 6];
        let seed = Candidate::new(seed_genome.clone(), problem.evaluate(&seed_genome));
        let d = LeafDriver::from_seed(
            problem,
            Elitist,
            LeafConfig::default().with_population_size(5).with_seed(4),
            Arc::new(MetricSet::new()),
            &seed,
        )
        .unwrap();
        assert_eq!(d.budget(), 4);
        assert_eq!(d.population()[0], seed);
        assert_eq!(d.population().len(), 5);
    }
}
