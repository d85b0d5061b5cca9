//! Cost/score series produced by the analysis pipeline.

use std::collections::BTreeMap;

/// Identifies one plotted series.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeriesKey {
    pub problem: String,
    pub algorithm: String,
    pub metric: String,
    /// Comparison group the series is shown in; `""` is the group holding
    /// every algorithm.
    pub group: String,
}

impl SeriesKey {
    pub fn new(problem: &str, algorithm: &str, metric: &str, group: &str) -> Self {
        Self {
            problem: problem.to_string(),
            algorithm: algorithm.to_string(),
            metric: metric.to_string(),
            group: group.to_string(),
        }
    }
}

/// One bootstrapped checkpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeriesPoint {
    pub cost: f64,
    pub cost_error: f64,
    pub score: f64,
    pub score_error: f64,
}

impl SeriesPoint {
    pub fn new(cost: f64, cost_error: f64, score: f64, score_error: f64) -> Self {
        Self {
            cost,
            cost_error,
            score,
            score_error,
        }
    }
}

/// A (problem, algorithm, metric) combination left out of the analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkippedEntry {
    pub problem: String,
    pub algorithm: String,
    pub metric: String,
    pub reason: String,
}

/// All series of an analysis plus the entries that were skipped.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeriesTable {
    pub series: BTreeMap<SeriesKey, Vec<SeriesPoint>>,
    pub skipped: Vec<SkippedEntry>,
}

impl SeriesTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: SeriesKey, point: SeriesPoint) {
        self.series.entry(key).or_default().push(point);
    }

    pub fn get(&self, key: &SeriesKey) -> Option<&[SeriesPoint]> {
        self.series.get(key).map(Vec::as_slice)
    }

    /// Sorts every series by ascending cost.
    pub fn sort_by_cost(&mut self) {
        for points in self.series.values_mut() {
            points.sort_by(|a, b| a.cost.total_cmp(&b.cost));
        }
    }

    /// One series per (problem, algorithm, metric), ignoring groups.
    ///
    /// An algorithm appearing in several groups has identical series in
    /// each; the first group in key order is used.
    pub fn ungrouped(&self) -> BTreeMap<(&str, &str, &str), &[SeriesPoint]> {
        let mut out = BTreeMap::new();
        for (key, points) in &self.series {
            out.entry((key.problem.as_str(), key.algorithm.as_str(), key.metric.as_str()))
                .or_insert(points.as_slice());
        }
        out
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
