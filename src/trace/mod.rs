//! Run traces and their extraction into comparable checkpoints.
//!
//! - [`TraceRecorder`]: subscriber turning proxies into a [`RunTrace`]
//! - [`ResultStore`]: traces keyed by (problem, algorithm)
//! - [`BudgetResultsExtractor`] / [`TimeResultsExtractor`]: cut traces at
//!   nominal checkpoints
//! - [`each_result`]: applies an extractor to the whole store

mod extract;
mod recorder;
mod store;

pub use extract::{BudgetResultsExtractor, ExtractedPoint, Extractor, TimeResultsExtractor};
pub use recorder::{RunTrace, TraceEntry, TraceRecorder};
pub use store::{each_result, AlgorithmResults, ProblemResults, ResultStore};

#[cfg(test)]
pub(crate) use recorder::tests::trace_with;
