//! Choice of the statistically stable result of a series.

use super::series::SeriesPoint;
use crate::error::{BenchError, Result};

/// When a bootstrapped score is precise enough to be reported.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Acceptability {
    /// `score_error <= f · |score|`.
    Relative(f64),
    /// `score_error <= c`.
    Absolute(f64),
}

impl Default for Acceptability {
    fn default() -> Self {
        Acceptability::Relative(0.1)
    }
}

impl Acceptability {
    pub fn accepts(&self, point: &SeriesPoint) -> bool {
        match *self {
            Acceptability::Relative(f) => point.score_error <= f * point.score.abs(),
            Acceptability::Absolute(c) => point.score_error <= c,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let threshold = match *self {
            Acceptability::Relative(f) => f,
            Acceptability::Absolute(c) => c,
        };
        if threshold.is_nan() || threshold < 0.0 {
            return Err(BenchError::Configuration(format!(
                "acceptability threshold must be non-negative, got {threshold}"
            )));
        }
        Ok(())
    }
}

/// The highest-cost point of `series` accepted by `acceptability`.
///
/// `None` means no checkpoint is stable enough yet, which is an ordinary
/// outcome for short experiments.
pub fn find_acceptable_result_for_budget(
    series: &[SeriesPoint],
    acceptability: Acceptability,
) -> Option<SeriesPoint> {
    series
        .iter()
        .filter(|p| acceptability.accepts(p))
        .copied()
        .reduce(|best, p| if p.cost >= best.cost { p } else { best })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(cost: f64, score: f64, score_error: f64) -> SeriesPoint {
        SeriesPoint::new(cost, 0.0, score, score_error)
    }

    #[test]
    fn test_none_when_nothing_qualifies() {
        let series = [point(100.0, 1.0, 0.5), point(200.0, 1.0, 0.3)];
        assert!(find_acceptable_result_for_budget(&series, Acceptability::Relative(0.1)).is_none());
        assert!(find_acceptable_result_for_budget(&[], Acceptability::Absolute(1.0)).is_none());
    }

    #[test]
    fn test_single_qualifying_entry_regardless_of_position() {
        let stable = point(100.0, 1.0, 0.01);
        let series = [stable, point(200.0, 1.0, 0.5), point(300.0, 1.0, 0.4)];
        assert_eq!(
            find_acceptable_result_for_budget(&series, Acceptability::Relative(0.1)),
            Some(stable)
        );
    }

    #[test]
    fn test_highest_cost_wins() {
        let series = [
            point(300.0, 2.0, 0.1),
            point(100.0, 2.0, 0.1),
            point(400.0, 2.0, 5.0),
            point(200.0, 2.0, 0.1),
        ];
        let chosen =
            find_acceptable_result_for_budget(&series, Acceptability::Absolute(0.2)).unwrap();
        assert_eq!(chosen.cost, 300.0);
    }

    #[test]
    fn test_zero_score_needs_zero_error_when_relative() {
        assert!(Acceptability::Relative(0.5).accepts(&point(1.0, 0.0, 0.0)));
        assert!(!Acceptability::Relative(0.5).accepts(&point(1.0, 0.0, 0.01)));
    }

    #[test]
    fn test_validate() {
        assert!(Acceptability::default().validate().is_ok());
        assert!(Acceptability::Absolute(-1.0).validate().is_err());
        assert!(Acceptability::Relative(f64::NAN).validate().is_err());
    }
}
