//! From stored traces to bootstrapped series.
//!
//! For every extracted checkpoint the cost samples and each analyzed
//! metric's samples are bootstrapped into `(cost, cost_error, score,
//! score_error)` and appended to the series of every comparison group of
//! the algorithm. Combinations that cannot be analyzed are recorded as
//! [`SkippedEntry`]s and logged; the rest of the batch continues.

use crate::catalog::Catalog;
use crate::config::BenchConfig;
use crate::error::Result;
use crate::stats::{bootstrap, SeriesKey, SeriesPoint, SeriesTable, SkippedEntry};
use crate::trace::{each_result, Extractor, ResultStore};
use log::{info, warn};

/// Metric name used in skips that concern every metric of an algorithm.
pub const ALL_METRICS: &str = "*";

/// Builds the series table of everything in `store`.
///
/// Fails on an invalid `config` or a malformed trace; every other problem
/// becomes a skip.
pub fn analyze<E: Extractor + ?Sized>(
    store: &ResultStore,
    extractor: &E,
    config: &BenchConfig,
    catalog: &Catalog,
) -> Result<SeriesTable> {
    config.validate()?;
    let mut table = SeriesTable::new();

    for problem in each_result(extractor, store)? {
        for algorithm in &problem.algorithms {
            let groups = match catalog.groups(&algorithm.algorithm) {
                Some(groups) if !groups.is_empty() => groups,
                Some(_) => {
                    skip(
                        &mut table,
                        &problem.problem,
                        &algorithm.algorithm,
                        ALL_METRICS,
                        "no comparison group".into(),
                    );
                    continue;
                }
                None => {
                    skip(
                        &mut table,
                        &problem.problem,
                        &algorithm.algorithm,
                        ALL_METRICS,
                        "no catalog binding".into(),
                    );
                    continue;
                }
            };

            for point in &algorithm.points {
                let cost = bootstrap(&point.cost, &config.bootstrap)?;

                for (recorded, samples) in &point.metrics {
                    let metric = config.canonical_metric(recorded);
                    if !config.comparators.contains(metric) {
                        continue;
                    }
                    if samples.is_empty() {
                        skip(
                            &mut table,
                            &problem.problem,
                            &algorithm.algorithm,
                            metric,
                            format!("no finite samples at checkpoint {}", point.key),
                        );
                        continue;
                    }

                    let score = bootstrap(samples, &config.bootstrap)?;
                    let value = SeriesPoint::new(
                        cost.point_estimate,
                        cost.standard_error,
                        score.point_estimate,
                        score.standard_error,
                    );
                    for group in groups {
                        let key =
                            SeriesKey::new(&problem.problem, &algorithm.algorithm, metric, group);
                        table.push(key, value);
                    }
                }
            }
        }
    }

    table.sort_by_cost();
    info!(
        "{} analysis: {} series, {} skipped",
        extractor.name(),
        table.len(),
        table.skipped.len()
    );
    Ok(table)
}

fn skip(table: &mut SeriesTable, problem: &str, algorithm: &str, metric: &str, reason: String) {
    warn!("skipping {problem}/{algorithm}/{metric}: {reason}");
    table.skipped.push(SkippedEntry {
        problem: problem.to_string(),
        algorithm: algorithm.to_string(),
        metric: metric.to_string(),
        reason,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::GroupLayout;
    use crate::error::BenchError;
    use crate::stats::BootstrapConfig;
    use crate::trace::{trace_with, BudgetResultsExtractor, RunTrace, TimeResultsExtractor};
    use std::collections::BTreeMap;

    fn with_metric(mut trace: RunTrace, recorded: &str) -> RunTrace {
        for entry in &mut trace.entries {
            let score = entry.metrics.remove("score").unwrap_or_default();
            entry.metrics.insert(recorded.to_string(), score);
        }
        trace
    }

    fn store() -> ResultStore {
        let mut store = ResultStore::new();
        store.extend(
            "ZDT1",
            "NSGAII",
            [
                with_metric(trace_with(1, &[(100, 0.5), (200, 0.3)]), "dst from pareto"),
                with_metric(trace_with(2, &[(100, 0.5), (200, 0.3)]), "dst from pareto"),
            ],
        );
        store.push("ZDT1", "IMGA+NSGAII", with_metric(trace_with(1, &[(150, 0.2)]), "dst"));
        store.push("ZDT1", "MOEAD", with_metric(trace_with(1, &[(100, 0.9)]), "dst"));
        store
    }

    fn config() -> BenchConfig {
        BenchConfig::default().with_bootstrap(BootstrapConfig::default().with_resamples(50))
    }

    fn by_budget(store: &ResultStore, catalog: &Catalog) -> Result<SeriesTable> {
        analyze(store, &BudgetResultsExtractor::new(100), &config(), catalog)
    }

    #[test]
    fn test_series_per_group_with_alias() {
        let table = by_budget(&store(), &Catalog::standard()).unwrap();

        let nsga = table.get(&SeriesKey::new("ZDT1", "NSGAII", "dst", "")).unwrap();
        assert_eq!(nsga.len(), 2);
        assert_eq!(nsga[0], SeriesPoint::new(100.0, 0.0, 0.5, 0.0));
        assert_eq!(nsga[1].cost, 200.0);
        assert!((nsga[1].score - 0.3).abs() < 1e-12);

        let imga = table.get(&SeriesKey::new("ZDT1", "IMGA+NSGAII", "dst", "")).unwrap();
        assert_eq!(imga.len(), 1);
        assert_eq!(imga[0].cost, 150.0);
    }

    #[test]
    fn test_unbound_algorithm_is_skipped() {
        let table = by_budget(&store(), &Catalog::standard()).unwrap();
        assert_eq!(table.skipped.len(), 1);
        assert_eq!(table.skipped[0].algorithm, "MOEAD");
        assert_eq!(table.skipped[0].metric, ALL_METRICS);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_split_layout_duplicates_series() {
        let catalog = Catalog::with_layout(GroupLayout::Split);
        let table = by_budget(&store(), &catalog).unwrap();
        let groups: Vec<&str> = table
            .series
            .keys()
            .filter(|k| k.algorithm == "NSGAII")
            .map(|k| k.group.as_str())
            .collect();
        assert_eq!(groups, vec!["0", "1"]);
    }

    #[test]
    fn test_empty_samples_are_skipped_per_metric() {
        let mut store = ResultStore::new();
        let mut trace = trace_with(1, &[(100, 0.0)]);
        trace.entries[0].metrics = BTreeMap::from([
            ("dst".to_string(), f64::INFINITY),
            ("extent".to_string(), 1.5),
        ]);
        store.push("ZDT2", "IBEA", trace);

        let table = by_budget(&store, &Catalog::standard()).unwrap();
        assert_eq!(table.skipped.len(), 1);
        assert_eq!(table.skipped[0].metric, "dst");
        assert!(table.get(&SeriesKey::new("ZDT2", "IBEA", "extent", "")).is_some());
    }

    #[test]
    fn test_time_extraction_has_zero_cost_error() {
        let extractor = TimeResultsExtractor::new(1.0);
        let table = analyze(&store(), &extractor, &config(), &Catalog::standard()).unwrap();
        let nsga = table.get(&SeriesKey::new("ZDT1", "NSGAII", "dst", "")).unwrap();
        assert_eq!(nsga[0].cost, 1.0);
        assert_eq!(nsga[0].cost_error, 0.0);
    }

    #[test]
    fn test_malformed_trace_aborts() {
        let mut store = store();
        store.push("ZDT1", "NSGAII", trace_with(3, &[(200, 1.0), (100, 1.0)]));
        let err = by_budget(&store, &Catalog::standard()).unwrap_err();
        assert!(matches!(err, BenchError::MalformedTrace { .. }));
    }
}
