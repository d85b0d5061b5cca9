//! Problem contract for leaf algorithms.
//!
//! [`MoProblem`] is what callers implement to plug a benchmark problem into
//! the leaf drivers. The [`Evaluator`] wraps it so every objective
//! evaluation is counted toward the driver's budget.

use crate::driver::Candidate;
use rand::Rng;

/// A multi-objective optimization problem. All objectives are minimized.
///
/// # Implementing
///
/// ```ignore
/// struct Zdt1 { dim: usize }
///
/// impl MoProblem for Zdt1 {
///     type Genome = Vec<f64>;
///     fn num_objectives(&self) -> usize { 2 }
///     fn create_genome<R: Rng>(&self, rng: &mut R) -> Vec<f64> {
///         (0..self.dim).map(|_| rng.random_range(0.0..1.0)).collect()
///     }
///     fn evaluate(&self, x: &Vec<f64>) -> Vec<f64> { /* ... */ }
/// }
/// ```
pub trait MoProblem: Send + Sync {
    /// Genome (decision vector) representation.
    type Genome: Clone + Send + Sync;

    /// Number of objectives returned by [`evaluate`](MoProblem::evaluate).
    fn num_objectives(&self) -> usize;

    /// Creates a random genome.
    fn create_genome<R: Rng>(&self, rng: &mut R) -> Self::Genome;

    /// Computes the objective vector. This is the unit of budget.
    fn evaluate(&self, genome: &Self::Genome) -> Vec<f64>;

    /// Recombines two parents into one or more children.
    ///
    /// The default clones the first parent.
    fn crossover<R: Rng>(
        &self,
        parent1: &Self::Genome,
        _parent2: &Self::Genome,
        _rng: &mut R,
    ) -> Vec<Self::Genome> {
        vec![parent1.clone()]
    }

    /// Perturbs a genome in place. The default is a no-op.
    fn mutate<R: Rng>(&self, _genome: &mut Self::Genome, _rng: &mut R) {}
}

/// Counts objective evaluations made through it.
pub struct Evaluator<'p, P: MoProblem> {
    problem: &'p P,
    evaluations: u64,
}

impl<'p, P: MoProblem> Evaluator<'p, P> {
    pub fn new(problem: &'p P) -> Self {
        Self {
            problem,
            evaluations: 0,
        }
    }

    /// Evaluates a genome and wraps it as a candidate.
    pub fn evaluate(&mut self, genome: P::Genome) -> Candidate<P::Genome> {
        self.evaluations += 1;
        let objectives = self.problem.evaluate(&genome);
        Candidate::new(genome, objectives)
    }

    pub fn problem(&self) -> &'p P {
        self.problem
    }

    /// Evaluations made so far.
    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// ZDT1 with `dim` variables in `[0, 1]`.
    ///
    /// Pareto front: `f2 = 1 - sqrt(f1)` for `g = 1`.
    pub(crate) struct Zdt1 {
        pub dim: usize,
    }

    impl MoProblem for Zdt1 {
        type Genome = Vec<f64>;

        fn num_objectives(&self) -> usize {
            2
        }

        fn create_genome<R: Rng>(&self, rng: &mut R) -> Vec<f64> {
            (0..self.dim).map(|_| rng.random_range(0.0..1.0)).collect()
        }

        fn evaluate(&self, x: &Vec<f64>) -> Vec<f64> {
            let f1 = x[0];
            let g = 1.0 + 9.0 * x[1..].iter().sum::<f64>() / (self.dim - 1) as f64;
            let f2 = g * (1.0 - (f1 / g).sqrt());
            vec![f1, f2]
        }

        fn crossover<R: Rng>(&self, p1: &Vec<f64>, p2: &Vec<f64>, rng: &mut R) -> Vec<Vec<f64>> {
            let (mut c1, mut c2) = (p1.clone(), p2.clone());
            for i in 0..self.dim {
                if rng.random_bool(0.5) {
                    std::mem::swap(&mut c1[i], &mut c2[i]);
                }
            }
            vec![c1, c2]
        }

        fn mutate<R: Rng>(&self, x: &mut Vec<f64>, rng: &mut R) {
            let i = rng.random_range(0..self.dim);
            x[i] = (x[i] + rng.random_range(-0.2..0.2)).clamp(0.0, 1.0);
        }
    }

    /// Sampled ZDT1 Pareto front.
    pub(crate) fn zdt1_front(points: usize) -> Vec<Vec<f64>> {
        (0..points)
            .map(|i| {
                let f1 = i as f64 / (points - 1) as f64;
                vec![f1, 1.0 - f1.sqrt()]
            })
            .collect()
    }

    #[test]
    fn test_evaluator_counts() {
        let problem = Zdt1 { dim: 5 };
        let mut evaluator = Evaluator::new(&problem);
        let c = evaluator.evaluate(vec![0.0; 5]);
        assert_eq!(c.objectives, vec![0.0, 1.0]);
        evaluator.evaluate(vec![1.0; 5]);
        assert_eq!(evaluator.evaluations(), 2);
    }

    #[test]
    fn test_zdt1_front_on_optimum() {
        let problem = Zdt1 { dim: 4 };
        let f = problem.evaluate(&vec![0.25, 0.0, 0.0, 0.0]);
        assert!((f[1] - 0.5).abs() < 1e-12);
    }
}
