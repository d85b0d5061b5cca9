//! Analysis configuration.

use crate::error::Result;
use crate::stats::{Acceptability, BootstrapConfig, ComparatorRegistry};
use std::collections::BTreeMap;

/// Settings of the statistical comparison pipeline.
///
/// # Defaults
///
/// ```
/// use u_metabench::BenchConfig;
/// use u_metabench::stats::Acceptability;
///
/// let config = BenchConfig::default();
/// assert_eq!(config.bootstrap.resamples, 1000);
/// assert_eq!(config.acceptability, Acceptability::Relative(0.1));
/// assert_eq!(config.canonical_metric("dst from pareto"), "dst");
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BenchConfig {
    pub bootstrap: BootstrapConfig,
    pub acceptability: Acceptability,
    /// Metrics to analyze and the direction in which each improves.
    /// Metrics missing here are ignored.
    pub comparators: ComparatorRegistry,
    /// Recorded metric name → name used in series keys.
    pub metric_aliases: BTreeMap<String, String>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            bootstrap: BootstrapConfig::default(),
            acceptability: Acceptability::default(),
            comparators: ComparatorRegistry::default(),
            metric_aliases: BTreeMap::from([("dst from pareto".to_string(), "dst".to_string())]),
        }
    }
}

impl BenchConfig {
    pub fn with_bootstrap(mut self, bootstrap: BootstrapConfig) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    pub fn with_acceptability(mut self, acceptability: Acceptability) -> Self {
        self.acceptability = acceptability;
        self
    }

    pub fn with_comparators(mut self, comparators: ComparatorRegistry) -> Self {
        self.comparators = comparators;
        self
    }

    pub fn with_alias(mut self, recorded: &str, canonical: &str) -> Self {
        self.metric_aliases.insert(recorded.to_string(), canonical.to_string());
        self
    }

    /// The series name of a recorded metric.
    pub fn canonical_metric<'a>(&'a self, recorded: &'a str) -> &'a str {
        self.metric_aliases
            .get(recorded)
            .map(String::as_str)
            .unwrap_or(recorded)
    }

    pub fn validate(&self) -> Result<()> {
        self.bootstrap.validate()?;
        self.acceptability.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Better;

    #[test]
    fn test_builders_and_validate() {
        let config = BenchConfig::default()
            .with_acceptability(Acceptability::Absolute(0.5))
            .with_bootstrap(BootstrapConfig::default().with_resamples(10))
            .with_comparators(ComparatorRegistry::empty().with("pdi", Better::Min))
            .with_alias("pdi_raw", "pdi");
        assert!(config.validate().is_ok());
        assert_eq!(config.canonical_metric("pdi_raw"), "pdi");
        assert_eq!(config.canonical_metric("extent"), "extent");
        assert!(config.comparators.get("dst").is_none());

        let bad =
            BenchConfig::default().with_bootstrap(BootstrapConfig::default().with_resamples(0));
        assert!(bad.validate().is_err());
    }
}
