//! NSGA-II leaf algorithm.
//!
//! Parents are chosen by binary tournament on (Pareto rank, crowding
//! distance). Survivors are the best `population_size` members of
//! parents + offspring under [`pareto_order`].
//!
//! # References
//!
//! - Deb et al. (2002), "A Fast and Elitist Multiobjective Genetic Algorithm: NSGA-II"

use super::config::LeafConfig;
use super::leaf::{breed, Metaheuristic};
use super::pareto::{crowding_distance, non_dominated_sort, pareto_order};
use super::types::{Evaluator, MoProblem};
use crate::driver::Candidate;
use rand::Rng;

/// Non-dominated Sorting Genetic Algorithm II.
#[derive(Debug, Clone, Copy, Default)]
pub struct Nsga2;

impl Nsga2 {
    pub fn new() -> Self {
        Self
    }
}

impl<P: MoProblem> Metaheuristic<P> for Nsga2 {
    fn name(&self) -> &'static str {
        "NSGAII"
    }

    fn next_generation<R: Rng>(
        &mut self,
        population: &[Candidate<P::Genome>],
        evaluator: &mut Evaluator<'_, P>,
        config: &LeafConfig,
        rng: &mut R,
    ) -> Vec<Candidate<P::Genome>> {
        let (ranks, crowding) = rank_and_crowding(population);
        let n = population.len();

        let offspring = breed(population, evaluator, config, rng, |rng| {
            let a = rng.random_range(0..n);
            let b = rng.random_range(0..n);
            if crowded_less(a, b, &ranks, &crowding) {
                a
            } else {
                b
            }
        });

        let mut combined: Vec<Option<Candidate<P::Genome>>> =
            population.iter().cloned().chain(offspring).map(Some).collect();
        let objectives: Vec<&[f64]> = combined
            .iter()
            .flatten()
            .map(|c| c.objectives.as_slice())
            .collect();
        let order = pareto_order(&objectives);

        order
            .into_iter()
            .take(config.population_size)
            .filter_map(|i| combined[i].take())
            .collect()
    }

    fn eviction_order(&self, population: &[Candidate<P::Genome>]) -> Vec<usize> {
        let mut order = pareto_order(population);
        order.reverse();
        order
    }
}

/// Pareto rank and front-local crowding distance of every member.
fn rank_and_crowding<G>(population: &[Candidate<G>]) -> (Vec<usize>, Vec<f64>) {
    let sorted = non_dominated_sort(population);
    let mut crowding = vec![0.0; population.len()];
    for front in &sorted.fronts {
        let members: Vec<&[f64]> = front
            .iter()
            .map(|&i| population[i].objectives.as_slice())
            .collect();
        for (local, d) in crowding_distance(&members).into_iter().enumerate() {
            crowding[front[local]] = d;
        }
    }
    (sorted.ranks, crowding)
}

/// Crowded-comparison operator: lower rank wins, then larger crowding.
fn crowded_less(a: usize, b: usize, ranks: &[usize], crowding: &[f64]) -> bool {
    ranks[a] < ranks[b] || (ranks[a] == ranks[b] && crowding[a] > crowding[b])
}
