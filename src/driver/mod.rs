//! Stepwise driver protocol and execution engine.
//!
//! # Core Traits
//!
//! - [`Driver`]: advance one step, yield a [`Proxy`], report exhaustion
//!
//! # Key Types
//!
//! - [`Proxy`]: immutable snapshot of a driver after one step
//! - [`Candidate`] / [`Population`]: evaluated individuals and their shared handle
//! - [`StepsRun`] / [`Job`]: runs a driver for N steps and publishes each proxy
//! - [`RunOutcome`]: the published proxies plus the [`StopReason`]

mod runner;
mod types;

pub use runner::{Job, RunOutcome, StepsRun, StopReason};
pub use types::{BoxedDriver, Candidate, Driver, Population, Proxy, Replacement};

#[cfg(test)]
pub(crate) use runner::tests::CountingDriver;
