//! Statistical comparison of bootstrapped series.
//!
//! - [`bootstrap`]: point estimate and standard error of a sample
//! - [`find_acceptable_result_for_budget`]: most expensive stable checkpoint
//! - [`rank_final`] / [`winners`]: per-problem ranking with ties
//! - [`align_to_error`]: precision honest to the error bar
//! - [`summarize`]: cross-problem normalized scores

mod acceptance;
mod align;
mod bootstrap;
mod ranking;
mod series;
mod summary;

pub use acceptance::{find_acceptable_result_for_budget, Acceptability};
pub use align::{align_to_error, decimals_for};
pub use bootstrap::{bootstrap, BootstrapConfig, BootstrapResult, Statistic};
pub use ranking::{rank_final, winners, ComparatorRegistry, Ranking, RankingTable};
pub use series::{SeriesKey, SeriesPoint, SeriesTable, SkippedEntry};
pub use summary::{summarize, SummaryTable};
