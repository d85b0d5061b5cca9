//! IBEA leaf algorithm with the additive ε-indicator.
//!
//! Fitness of `x` is `Σ_{y≠x} -exp(-I(y, x) / (c·κ))` over objectives
//! normalized to `[0, 1]`, where `c` is the largest absolute indicator
//! value. Environmental selection removes the least fit member one at a
//! time and updates the remaining fitness values.
//!
//! # References
//!
//! - Zitzler & Künzli (2004), "Indicator-Based Selection in Multiobjective Search"

use super::config::LeafConfig;
use super::leaf::{breed, Metaheuristic};
use super::types::{Evaluator, MoProblem};
use crate::driver::Candidate;
use rand::Rng;
use std::cmp::Ordering;

/// Smallest usable κ. Keeps `exp(I / (c·κ))` finite since `|I| <= c`.
const MIN_KAPPA: f64 = 0.005;

/// Indicator-Based Evolutionary Algorithm.
#[derive(Debug, Clone, Copy)]
pub struct Ibea {
    /// Fitness scaling factor κ. Values below 0.005 act as 0.005.
    pub kappa: f64,
}

impl Default for Ibea {
    fn default() -> Self {
        Self { kappa: 0.05 }
    }
}

impl Ibea {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets κ, raised to the smallest usable value when below it.
    pub fn with_kappa(mut self, kappa: f64) -> Self {
        self.kappa = kappa.max(MIN_KAPPA);
        self
    }
}

impl<P: MoProblem> Metaheuristic<P> for Ibea {
    fn name(&self) -> &'static str {
        "IBEA"
    }

    fn next_generation<R: Rng>(
        &mut self,
        population: &[Candidate<P::Genome>],
        evaluator: &mut Evaluator<'_, P>,
        config: &LeafConfig,
        rng: &mut R,
    ) -> Vec<Candidate<P::Genome>> {
        let fitness = IndicatorFitness::compute(population, self.kappa).fitness;
        let n = population.len();

        let offspring = breed(population, evaluator, config, rng, |rng| {
            let a = rng.random_range(0..n);
            let b = rng.random_range(0..n);
            if fitness[a] > fitness[b] {
                a
            } else {
                b
            }
        });

        let combined: Vec<Candidate<P::Genome>> =
            population.iter().cloned().chain(offspring).collect();
        let mut state = IndicatorFitness::compute(&combined, self.kappa);
        let mut alive = vec![true; combined.len()];
        let mut remaining = combined.len();

        while remaining > config.population_size {
            let Some(worst) = state.least_fit(&alive) else {
                break;
            };
            alive[worst] = false;
            remaining -= 1;
            state.remove(worst, &alive);
        }

        combined
            .into_iter()
            .zip(alive)
            .filter_map(|(c, keep)| keep.then_some(c))
            .collect()
    }

    fn eviction_order(&self, population: &[Candidate<P::Genome>]) -> Vec<usize> {
        let fitness = IndicatorFitness::compute(population, self.kappa).fitness;
        let mut order: Vec<usize> = (0..population.len()).collect();
        order.sort_by(|&a, &b| fitness[a].partial_cmp(&fitness[b]).unwrap_or(Ordering::Equal));
        order
    }
}

/// Pairwise indicator matrix plus the fitness it induces.
struct IndicatorFitness {
    /// `indicator[i][j] = I(i, j)`.
    indicator: Vec<Vec<f64>>,
    fitness: Vec<f64>,
    scale: f64,
}

impl IndicatorFitness {
    fn compute<G>(population: &[Candidate<G>], kappa: f64) -> Self {
        let normalized = normalize(population);
        let n = normalized.len();

        let mut indicator = vec![vec![0.0; n]; n];
        let mut c: f64 = 0.0;
        for i in 0..n {
            for j in 0..n {
                if i != j {
                    let v = epsilon_indicator(&normalized[i], &normalized[j]);
                    indicator[i][j] = v;
                    c = c.max(v.abs());
                }
            }
        }
        if c <= 0.0 {
            c = 1.0;
        }
        let scale = c * kappa.max(MIN_KAPPA);

        let fitness: Vec<f64> = (0..n)
            .map(|x| {
                (0..n)
                    .filter(|&y| y != x)
                    .map(|y| -(-indicator[y][x] / scale).exp())
                    .sum::<f64>()
            })
            .collect();

        Self {
            indicator,
            fitness,
            scale,
        }
    }

    fn least_fit(&self, alive: &[bool]) -> Option<usize> {
        (0..self.fitness.len())
            .filter(|&i| alive[i])
            .min_by(|&a, &b| {
                self.fitness[a]
                    .partial_cmp(&self.fitness[b])
                    .unwrap_or(Ordering::Equal)
            })
    }

    fn remove(&mut self, removed: usize, alive: &[bool]) {
        for x in 0..self.fitness.len() {
            if alive[x] {
                self.fitness[x] += (-self.indicator[removed][x] / self.scale).exp();
            }
        }
    }
}

/// Additive ε-indicator: smallest shift making `a` weakly dominate `b`.
fn epsilon_indicator(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| x - y)
        .fold(f64::NEG_INFINITY, f64::max)
}

/// Objective vectors rescaled per objective to `[0, 1]`.
fn normalize<G>(population: &[Candidate<G>]) -> Vec<Vec<f64>> {
    let m = population.first().map_or(0, |c| c.objectives.len());
    let mut lo = vec![f64::INFINITY; m];
    let mut hi = vec![f64::NEG_INFINITY; m];
    for c in population {
        for (k, &v) in c.objectives.iter().enumerate().take(m) {
            lo[k] = lo[k].min(v);
            hi[k] = hi[k].max(v);
        }
    }

    population
        .iter()
        .map(|c| {
            c.objectives
                .iter()
                .take(m)
                .enumerate()
                .map(|(k, &v)| {
                    let range = hi[k] - lo[k];
                    if range > 0.0 {
                        (v - lo[k]) / range
                    } else {
                        0.0
                    }
                })
                .collect()
        })
        .collect()
}
