//! Quality indicators evaluated on a population's non-dominated front.
//!
//! Each indicator declares whether lower or higher values are better; the
//! same [`Better`] value later drives ranking and winner selection.
//!
//! # Built-ins
//!
//! | name | better | meaning |
//! |---|---|---|
//! | `dst` | min | mean distance from the front to the reference front |
//! | `distribution` | max | evenness of nearest-neighbour gaps |
//! | `extent` | max | summed per-objective range of the front |
//! | `hypervolume` | max | dominated area up to a reference point (2 objectives) |

use crate::moea::pareto::{euclidean, non_dominated_indices};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Direction in which a metric improves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Better {
    Min,
    Max,
}

impl Better {
    /// Returns `true` when `a` is strictly better than `b`.
    pub fn is_better(self, a: f64, b: f64) -> bool {
        match self {
            Better::Min => a < b,
            Better::Max => a > b,
        }
    }

    /// The extremal value of `values` in this direction, ignoring NaN.
    pub fn best_of<I: IntoIterator<Item = f64>>(self, values: I) -> Option<f64> {
        values
            .into_iter()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| match acc {
                Some(best) if !self.is_better(v, best) => Some(best),
                _ => Some(v),
            })
    }
}

/// Reference (true) Pareto front of a problem, supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReferenceFront {
    points: Vec<Vec<f64>>,
}

impl ReferenceFront {
    pub fn new(points: Vec<Vec<f64>>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Vec<f64>] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// A quality indicator over a set of objective vectors.
pub trait QualityMetric: Send + Sync {
    /// Short identifier, e.g. `"dst"`.
    fn name(&self) -> &str;

    /// Whether lower or higher values are better.
    fn better(&self) -> Better;

    /// Evaluates the indicator on an (already non-dominated) front.
    fn evaluate(&self, front: &[&[f64]]) -> f64;
}

/// Mean distance from each front member to its nearest reference point.
pub struct DistanceFromFront {
    reference: Arc<ReferenceFront>,
}

impl DistanceFromFront {
    pub fn new(reference: Arc<ReferenceFront>) -> Self {
        Self { reference }
    }
}

impl QualityMetric for DistanceFromFront {
    fn name(&self) -> &str {
        "dst"
    }

    fn better(&self) -> Better {
        Better::Min
    }

    fn evaluate(&self, front: &[&[f64]]) -> f64 {
        if front.is_empty() || self.reference.is_empty() {
            return f64::INFINITY;
        }
        let total: f64 = front
            .iter()
            .map(|p| {
                self.reference
                    .points()
                    .iter()
                    .map(|r| euclidean(p, r))
                    .fold(f64::INFINITY, f64::min)
            })
            .sum();
        total / front.len() as f64
    }
}

/// `1 / (1 + cv)` of the nearest-neighbour distances inside the front,
/// where `cv` is their coefficient of variation. 1.0 is perfectly even.
pub struct Distribution;

impl QualityMetric for Distribution {
    fn name(&self) -> &str {
        "distribution"
    }

    fn better(&self) -> Better {
        Better::Max
    }

    fn evaluate(&self, front: &[&[f64]]) -> f64 {
        if front.len() < 2 {
            return 0.0;
        }
        let gaps: Vec<f64> = front
            .iter()
            .enumerate()
            .map(|(i, p)| {
                front
                    .iter()
                    .enumerate()
                    .filter(|&(j, _)| j != i)
                    .map(|(_, q)| euclidean(p, q))
                    .fold(f64::INFINITY, f64::min)
            })
            .collect();

        let n = gaps.len() as f64;
        let mean = gaps.iter().sum::<f64>() / n;
        if mean <= 0.0 {
            return 0.0;
        }
        let var = gaps.iter().map(|g| (g - mean).powi(2)).sum::<f64>() / n;
        1.0 / (1.0 + var.sqrt() / mean)
    }
}

/// Sum over objectives of the front's range.
pub struct Extent;

impl QualityMetric for Extent {
    fn name(&self) -> &str {
        "extent"
    }

    fn better(&self) -> Better {
        Better::Max
    }

    fn evaluate(&self, front: &[&[f64]]) -> f64 {
        let Some(first) = front.first() else {
            return 0.0;
        };
        (0..first.len())
            .map(|k| {
                let (lo, hi) = front.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                    (lo.min(p[k]), hi.max(p[k]))
                });
                hi - lo
            })
            .sum()
    }
}

/// Two-objective hypervolume with respect to a reference point.
///
/// Points that do not strictly dominate the reference point contribute
/// nothing.
pub struct Hypervolume2d {
    reference_point: [f64; 2],
}

impl Hypervolume2d {
    pub fn new(reference_point: [f64; 2]) -> Self {
        Self { reference_point }
    }
}

impl QualityMetric for Hypervolume2d {
    fn name(&self) -> &str {
        "hypervolume"
    }

    fn better(&self) -> Better {
        Better::Max
    }

    fn evaluate(&self, front: &[&[f64]]) -> f64 {
        let [rx, ry] = self.reference_point;
        let mut pts: Vec<(f64, f64)> = front
            .iter()
            .filter(|p| p.len() >= 2 && p[0] < rx && p[1] < ry)
            .map(|p| (p[0], p[1]))
            .collect();
        pts.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let mut volume = 0.0;
        let mut ceiling = ry;
        for (x, y) in pts {
            if y < ceiling {
                volume += (rx - x) * (ceiling - y);
                ceiling = y;
            }
        }
        volume
    }
}

/// Ordered collection of indicators shared by every proxy of a run.
#[derive(Default, Clone)]
pub struct MetricSet {
    metrics: Vec<Arc<dyn QualityMetric>>,
}

impl fmt::Debug for MetricSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl MetricSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// `dst`, `distribution`, `extent` and, when a reference point is given,
    /// `hypervolume`.
    pub fn standard(reference: Arc<ReferenceFront>, hv_reference: Option<[f64; 2]>) -> Self {
        let set = Self::new()
            .with(DistanceFromFront::new(reference))
            .with(Distribution)
            .with(Extent);
        match hv_reference {
            Some(point) => set.with(Hypervolume2d::new(point)),
            None => set,
        }
    }

    /// Adds an indicator. A later indicator with an existing name replaces it.
    pub fn with<M: QualityMetric + 'static>(mut self, metric: M) -> Self {
        self.metrics.retain(|m| m.name() != metric.name());
        self.metrics.push(Arc::new(metric));
        self
    }

    pub fn names(&self) -> Vec<&str> {
        self.metrics.iter().map(|m| m.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Direction of the named indicator.
    pub fn better(&self, name: &str) -> Option<Better> {
        self.find(name).map(|m| m.better())
    }

    /// Evaluates one indicator on the non-dominated subset of `objectives`.
    pub fn evaluate<O: AsRef<[f64]>>(&self, name: &str, objectives: &[O]) -> Option<f64> {
        let metric = self.find(name)?;
        let front = front_of(objectives);
        Some(metric.evaluate(&front))
    }

    /// Evaluates every indicator, sharing one non-dominated filter.
    pub fn evaluate_all<O: AsRef<[f64]>>(&self, objectives: &[O]) -> BTreeMap<String, f64> {
        let front = front_of(objectives);
        self.metrics
            .iter()
            .map(|m| (m.name().to_string(), m.evaluate(&front)))
            .collect()
    }

    fn find(&self, name: &str) -> Option<&Arc<dyn QualityMetric>> {
        self.metrics.iter().find(|m| m.name() == name)
    }
}

fn front_of<O: AsRef<[f64]>>(objectives: &[O]) -> Vec<&[f64]> {
    non_dominated_indices(objectives)
        .into_iter()
        .map(|i| objectives[i].as_ref())
        .collect()
}
