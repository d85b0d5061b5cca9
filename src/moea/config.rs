//! Leaf driver configuration.

use crate::error::{BenchError, Result};

/// Configuration shared by every leaf algorithm.
///
/// # Defaults
///
/// ```
/// use u_metabench::moea::LeafConfig;
///
/// let config = LeafConfig::default();
/// assert_eq!(config.population_size, 100);
/// assert_eq!(config.max_generations, Some(250));
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_metabench::moea::LeafConfig;
///
/// let config = LeafConfig::default()
///     .with_population_size(40)
///     .with_max_budget(10_000)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LeafConfig {
    /// Individuals kept per generation (and offspring bred per generation).
    pub population_size: usize,

    /// Generations after which the driver is exhausted. `None` = unbounded.
    pub max_generations: Option<usize>,

    /// Evaluations after which the driver is exhausted. `None` = unbounded.
    pub max_budget: Option<u64>,

    /// Probability of recombining a parent pair (0.0–1.0).
    pub crossover_rate: f64,

    /// Probability of mutating a child (0.0–1.0).
    pub mutation_rate: f64,

    /// Seed of the driver's private RNG. `None` draws one at random.
    pub seed: Option<u64>,
}

impl Default for LeafConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            max_generations: Some(250),
            max_budget: None,
            crossover_rate: 0.9,
            mutation_rate: 0.2,
            seed: None,
        }
    }
}

impl LeafConfig {
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = Some(n);
        self
    }

    /// Removes the generation limit.
    pub fn unbounded_generations(mut self) -> Self {
        self.max_generations = None;
        self
    }

    pub fn with_max_budget(mut self, evaluations: u64) -> Self {
        self.max_budget = Some(evaluations);
        self
    }

    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate.clamp(0.0, 1.0);
        self
    }

    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.population_size < 2 {
            return Err(BenchError::Configuration(
                "population_size must be at least 2".into(),
            ));
        }
        if self.max_generations == Some(0) {
            return Err(BenchError::Configuration(
                "max_generations must be positive or None".into(),
            ));
        }
        if self.max_budget == Some(0) {
            return Err(BenchError::Configuration(
                "max_budget must be positive or None".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LeafConfig::default();
        assert_eq!(config.population_size, 100);
        assert_eq!(config.max_generations, Some(250));
        assert!(config.max_budget.is_none());
        assert!((config.crossover_rate - 0.9).abs() < 1e-12);
        assert!((config.mutation_rate - 0.2).abs() < 1e-12);
        assert!(config.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_and_clamp() {
        let config = LeafConfig::default()
            .with_population_size(20)
            .unbounded_generations()
            .with_max_budget(500)
            .with_crossover_rate(1.5)
            .with_mutation_rate(-1.0)
            .with_seed(3);
        assert_eq!(config.population_size, 20);
        assert!(config.max_generations.is_none());
        assert_eq!(config.max_budget, Some(500));
        assert!((config.crossover_rate - 1.0).abs() < 1e-12);
        assert!(config.mutation_rate.abs() < 1e-12);
        assert_eq!(config.seed, Some(3));
    }

    #[test]
    fn test_validate_rejects() {
        assert!(LeafConfig::default().with_population_size(1).validate().is_err());
        assert!(LeafConfig::default().with_max_generations(0).validate().is_err());
        assert!(LeafConfig::default().with_max_budget(0).validate().is_err());
    }
}
