//! Multi-objective leaf algorithms.
//!
//! A leaf is a single population-based metaheuristic wrapped as a
//! [`Driver`](crate::driver::Driver): one step runs one generation.
//!
//! # Key Types
//!
//! - [`MoProblem`]: problem contract (genome, objectives, variation)
//! - [`Metaheuristic`]: one generation of an algorithm
//! - [`LeafDriver`]: drives a metaheuristic over a problem
//! - [`Nsga2`], [`Ibea`]: the bundled algorithms

mod config;
mod ibea;
mod leaf;
mod nsga2;
pub mod pareto;
mod types;

pub use config::LeafConfig;
pub use ibea::Ibea;
pub use leaf::{breed, LeafDriver, Metaheuristic};
pub use nsga2::Nsga2;
pub use types::{Evaluator, MoProblem};

#[cfg(test)]
pub(crate) use types::tests::{zdt1_front, Zdt1};
