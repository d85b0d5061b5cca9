//! Cross-problem summary of acceptable results.

use super::acceptance::{find_acceptable_result_for_budget, Acceptability};
use super::series::SeriesTable;
use log::debug;
use std::collections::BTreeMap;

/// Added to every per-problem maximum before normalizing.
const NORMALIZATION_EPSILON: f64 = 1e-4;

/// metric → algorithm → problem → normalized score.
pub type SummaryTable = BTreeMap<String, BTreeMap<String, BTreeMap<String, f64>>>;

/// Scores every (problem, algorithm, metric) at its acceptable checkpoint.
///
/// The raw score is `ln(|score| + 1)`; scores of one (problem, metric) are
/// then divided by their maximum plus a small epsilon, so every value lies
/// in `[0, 1)`. Combinations without an acceptable checkpoint are absent.
pub fn summarize(table: &SeriesTable, acceptability: Acceptability) -> SummaryTable {
    let mut raw: BTreeMap<(&str, &str), Vec<(&str, f64)>> = BTreeMap::new();
    for ((problem, algorithm, metric), points) in table.ungrouped() {
        match find_acceptable_result_for_budget(points, acceptability) {
            Some(point) => raw
                .entry((problem, metric))
                .or_default()
                .push((algorithm, (point.score.abs() + 1.0).ln())),
            None => debug!("{problem}, {algorithm}, {metric}: no acceptable budget"),
        }
    }

    let mut summary = SummaryTable::new();
    for ((problem, metric), scores) in raw {
        let max = scores
            .iter()
            .map(|&(_, s)| s)
            .fold(f64::NEG_INFINITY, f64::max)
            + NORMALIZATION_EPSILON;
        for (algorithm, score) in scores {
            summary
                .entry(metric.to_string())
                .or_default()
                .entry(algorithm.to_string())
                .or_default()
                .insert(problem.to_string(), score / max);
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::series::{SeriesKey, SeriesPoint};

    #[test]
    fn test_normalized_per_problem_and_metric() {
        let mut table = SeriesTable::new();
        let e = std::f64::consts::E;
        let point = |score: f64, error: f64| SeriesPoint::new(100.0, 0.0, score, error);
        table.push(SeriesKey::new("ZDT1", "NSGAII", "extent", ""), point(e - 1.0, 0.0));
        table.push(SeriesKey::new("ZDT1", "IBEA", "extent", ""), point(e * e - 1.0, 0.0));
        table.push(SeriesKey::new("ZDT2", "IBEA", "extent", ""), point(3.0, 0.0));
        table.push(SeriesKey::new("ZDT2", "NSGAII", "extent", ""), point(1.0, 5.0));

        let summary = summarize(&table, Acceptability::Relative(0.1));
        let extent = &summary["extent"];

        let ibea = extent["IBEA"]["ZDT1"];
        let nsga = extent["NSGAII"]["ZDT1"];
        assert!((ibea - 2.0 / 2.0001).abs() < 1e-9);
        assert!((nsga - 1.0 / 2.0001).abs() < 1e-9);

        // ZDT2: NSGAII never stable, IBEA alone is normalized against itself
        assert!(!extent["NSGAII"].contains_key("ZDT2"));
        assert!(extent["IBEA"]["ZDT2"] < 1.0);
        assert!(extent["IBEA"]["ZDT2"] > 0.999);
    }

    #[test]
    fn test_empty_table() {
        assert!(summarize(&SeriesTable::new(), Acceptability::default()).is_empty());
    }
}
