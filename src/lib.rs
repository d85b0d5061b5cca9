//! Benchmarking core for multi-objective metaheuristics.
//!
//! Two subsystems:
//!
//! - **Stepwise execution**: every algorithm, plain or composed, is a
//!   [`Driver`](driver::Driver) advanced one unit of work at a time by a
//!   [`StepsRun`](driver::StepsRun), which publishes an immutable
//!   [`Proxy`](driver::Proxy) after each step. Leaf drivers
//!   ([`Nsga2`](moea::Nsga2), [`Ibea`](moea::Ibea)) nest inside the island
//!   model ([`IslandDriver`](meta::IslandDriver)) and the hierarchic genetic
//!   strategy ([`HierarchicalDriver`](meta::HierarchicalDriver)).
//! - **Bootstrap comparison**: recorded traces are cut at matched budgets
//!   ([`trace`]), bootstrapped into cost/score series ([`analysis`]) and
//!   ranked, filtered for stability and summarized ([`stats`]).
//!
//! # Pipeline
//!
//! ```text
//! StepsRun ─▶ Proxy ─▶ TraceRecorder ─▶ ResultStore
//!                                         │ Budget/TimeResultsExtractor
//!                                         ▼
//!                    SeriesTable ◀─ analyze (bootstrap)
//!                         │
//!                         ├─▶ rank_final
//!                         ├─▶ find_acceptable_result_for_budget
//!                         └─▶ summarize
//! ```
//!
//! The crate emits records through the `log` facade and never installs a
//! logger.

pub mod analysis;
pub mod catalog;
pub mod config;
pub mod driver;
pub mod error;
pub mod experiment;
pub mod meta;
pub mod metrics;
pub mod moea;
pub mod stats;
pub mod trace;

pub use config::BenchConfig;
pub use error::{BenchError, Result};
