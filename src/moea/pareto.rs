//! Pareto dominance utilities.
//!
//! Every routine here works on plain objective vectors (all objectives
//! **minimized**) so that leaf algorithms, migration and quality metrics can
//! share one notion of "better" without knowing anything about genomes.
//!
//! - [`non_dominated_sort`]: fast non-dominated sorting (Deb et al., 2002)
//! - [`crowding_distance`]: per-front diversity estimate
//! - [`pareto_order`]: total best-first order (rank, then crowding)
//! - [`non_dominated_indices`]: the first front only
//!
//! # References
//!
//! - Deb et al. (2002), "A Fast and Elitist Multiobjective Genetic Algorithm: NSGA-II"

use std::cmp::Ordering;

/// Result of non-dominated sorting.
///
/// `ranks[i]` is the Pareto rank of solution `i` (0 = non-dominated);
/// `fronts[r]` lists the indices of rank `r`.
#[derive(Debug, Clone, Default)]
pub struct NondominatedSortResult {
    pub ranks: Vec<usize>,
    pub fronts: Vec<Vec<usize>>,
}

/// Outcome of comparing two objective vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dominance {
    /// Left dominates right.
    Left,
    /// Right dominates left.
    Right,
    /// Neither dominates the other.
    Neither,
}

/// Compares two objective vectors for Pareto dominance (minimization).
pub fn dominance(a: &[f64], b: &[f64]) -> Dominance {
    let mut a_better = false;
    let mut b_better = false;

    for (&va, &vb) in a.iter().zip(b) {
        if va < vb {
            a_better = true;
        } else if vb < va {
            b_better = true;
        }
    }

    match (a_better, b_better) {
        (true, false) => Dominance::Left,
        (false, true) => Dominance::Right,
        _ => Dominance::Neither,
    }
}

/// Fast non-dominated sorting.
///
/// O(m · n²) for `n` solutions with `m` objectives. An empty input yields an
/// empty result.
///
/// # Example
///
/// ```
/// use u_metabench::moea::pareto::non_dominated_sort;
///
/// let objectives = vec![
///     vec![1.0, 5.0],
///     vec![3.0, 3.0],
///     vec![4.0, 4.0], // dominated by (3, 3)
/// ];
/// let sorted = non_dominated_sort(&objectives);
/// assert_eq!(sorted.ranks, vec![0, 0, 1]);
/// ```
pub fn non_dominated_sort<O: AsRef<[f64]>>(objectives: &[O]) -> NondominatedSortResult {
    let n = objectives.len();
    if n == 0 {
        return NondominatedSortResult::default();
    }

    let mut domination_count = vec![0usize; n];
    let mut dominates: Vec<Vec<usize>> = vec![Vec::new(); n];

    for i in 0..n {
        for j in (i + 1)..n {
            match dominance(objectives[i].as_ref(), objectives[j].as_ref()) {
                Dominance::Left => {
                    dominates[i].push(j);
                    domination_count[j] += 1;
                }
                Dominance::Right => {
                    dominates[j].push(i);
                    domination_count[i] += 1;
                }
                Dominance::Neither => {}
            }
        }
    }

    let mut ranks = vec![0usize; n];
    let mut current: Vec<usize> = (0..n).filter(|&i| domination_count[i] == 0).collect();
    let mut fronts = Vec::new();

    while !current.is_empty() {
        let mut next = Vec::new();
        for &i in &current {
            for &j in &dominates[i] {
                domination_count[j] -= 1;
                if domination_count[j] == 0 {
                    ranks[j] = fronts.len() + 1;
                    next.push(j);
                }
            }
        }
        fronts.push(current);
        current = next;
    }

    NondominatedSortResult { ranks, fronts }
}

/// Crowding distance of every member of one front.
///
/// Boundary solutions of any objective get `f64::INFINITY`; fronts of two or
/// fewer members are all boundary.
pub fn crowding_distance<O: AsRef<[f64]>>(objectives: &[O]) -> Vec<f64> {
    let n = objectives.len();
    if n <= 2 {
        return vec![f64::INFINITY; n];
    }

    let m = objectives[0].as_ref().len();
    let mut distances = vec![0.0f64; n];
    let value = |i: usize, k: usize| objectives[i].as_ref()[k];

    for k in 0..m {
        let mut idx: Vec<usize> = (0..n).collect();
        idx.sort_by(|&a, &b| value(a, k).partial_cmp(&value(b, k)).unwrap_or(Ordering::Equal));

        distances[idx[0]] = f64::INFINITY;
        distances[idx[n - 1]] = f64::INFINITY;

        let range = value(idx[n - 1], k) - value(idx[0], k);
        if range > 0.0 {
            for w in 1..(n - 1) {
                distances[idx[w]] += (value(idx[w + 1], k) - value(idx[w - 1], k)) / range;
            }
        }
    }

    distances
}

/// Best-first ordering of a population: ascending Pareto rank, then
/// descending crowding distance inside each front. Ties keep index order.
pub fn pareto_order<O: AsRef<[f64]>>(objectives: &[O]) -> Vec<usize> {
    let sorted = non_dominated_sort(objectives);
    let mut order = Vec::with_capacity(objectives.len());

    for front in &sorted.fronts {
        let members: Vec<&[f64]> = front.iter().map(|&i| objectives[i].as_ref()).collect();
        let crowding = crowding_distance(&members);
        let mut local: Vec<usize> = (0..front.len()).collect();
        local.sort_by(|&a, &b| {
            crowding[b]
                .partial_cmp(&crowding[a])
                .unwrap_or(Ordering::Equal)
        });
        order.extend(local.into_iter().map(|l| front[l]));
    }

    order
}

/// Indices of the non-dominated members, in input order.
pub fn non_dominated_indices<O: AsRef<[f64]>>(objectives: &[O]) -> Vec<usize> {
    let mut first = non_dominated_sort(objectives)
        .fronts
        .into_iter()
        .next()
        .unwrap_or_default();
    first.sort_unstable();
    first
}

/// Euclidean distance between two objective vectors.
pub fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}
