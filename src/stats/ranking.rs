//! Final-score ranking of algorithms per (problem, metric).

use super::align::align_to_error;
use super::series::SeriesTable;
use crate::metrics::Better;
use log::warn;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Metric name → which direction is better.
///
/// The default registry knows the bundled metrics:
///
/// ```
/// use u_metabench::metrics::Better;
/// use u_metabench::stats::ComparatorRegistry;
///
/// let registry = ComparatorRegistry::default().with("pdi", Better::Min);
/// assert_eq!(registry.get("dst"), Some(Better::Min));
/// assert_eq!(registry.get("hypervolume"), Some(Better::Max));
/// assert_eq!(registry.get("pdi"), Some(Better::Min));
/// assert_eq!(registry.get("unknown"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComparatorRegistry {
    comparators: BTreeMap<String, Better>,
}

impl Default for ComparatorRegistry {
    fn default() -> Self {
        Self::empty()
            .with("dst", Better::Min)
            .with("distribution", Better::Max)
            .with("extent", Better::Max)
            .with("hypervolume", Better::Max)
    }
}

impl ComparatorRegistry {
    /// A registry with no metric.
    pub fn empty() -> Self {
        Self {
            comparators: BTreeMap::new(),
        }
    }

    /// Registers or overrides a metric's comparator.
    pub fn with(mut self, metric: &str, better: Better) -> Self {
        self.comparators.insert(metric.to_string(), better);
        self
    }

    pub fn get(&self, metric: &str) -> Option<Better> {
        self.comparators.get(metric).copied()
    }

    pub fn contains(&self, metric: &str) -> bool {
        self.comparators.contains_key(metric)
    }

    pub fn metrics(&self) -> impl Iterator<Item = &str> {
        self.comparators.keys().map(String::as_str)
    }
}

/// Algorithms of one (problem, metric), best first.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ranking {
    pub better: Better,
    /// `(algorithm, aligned final score)`, best first; ties keep name order.
    pub entries: Vec<(String, f64)>,
    /// Every algorithm whose score equals the best one.
    pub winners: Vec<String>,
}

/// Rankings keyed by `(problem, metric)`.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankingTable {
    pub rankings: BTreeMap<(String, String), Ranking>,
}

impl RankingTable {
    pub fn get(&self, problem: &str, metric: &str) -> Option<&Ranking> {
        self.rankings.get(&(problem.to_string(), metric.to_string()))
    }

    pub fn len(&self) -> usize {
        self.rankings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rankings.is_empty()
    }
}

/// All names whose score equals the extremal value under `better`.
///
/// NaN scores never win.
pub fn winners<'a, I>(scores: I, better: Better) -> Vec<String>
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let scores: Vec<(&str, f64)> = scores.into_iter().filter(|(_, s)| !s.is_nan()).collect();
    let Some(best) = better.best_of(scores.iter().map(|&(_, s)| s)) else {
        return Vec::new();
    };
    scores
        .into_iter()
        .filter(|&(_, s)| s == best)
        .map(|(name, _)| name.to_string())
        .collect()
}

/// Ranks the final checkpoint of every series.
///
/// The final score is the last (highest-cost) point of a series, aligned to
/// its own error. Metrics without a registered comparator are skipped with
/// a warning.
pub fn rank_final(table: &SeriesTable, registry: &ComparatorRegistry) -> RankingTable {
    let mut finals: BTreeMap<(&str, &str), Vec<(&str, f64)>> = BTreeMap::new();
    for ((problem, algorithm, metric), points) in table.ungrouped() {
        let Some(last) = points.iter().max_by(|a, b| a.cost.total_cmp(&b.cost)) else {
            continue;
        };
        finals
            .entry((problem, metric))
            .or_default()
            .push((algorithm, align_to_error(last.score, last.score_error)));
    }

    let mut out = RankingTable::default();
    for ((problem, metric), scores) in finals {
        let Some(better) = registry.get(metric) else {
            warn!("no comparator for metric {metric}; {problem} not ranked");
            continue;
        };

        let mut entries: Vec<(String, f64)> = scores
            .iter()
            .filter(|(_, s)| !s.is_nan())
            .map(|&(name, s)| (name.to_string(), s))
            .collect();
        entries.sort_by(|a, b| match better {
            Better::Min => a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal),
            Better::Max => b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal),
        });

        out.rankings.insert(
            (problem.to_string(), metric.to_string()),
            Ranking {
                better,
                winners: winners(scores, better),
                entries,
            },
        );
    }
    out
}
