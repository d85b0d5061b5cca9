//! Meta-algorithms composed of inner drivers.
//!
//! - [`IslandDriver`]: island model with periodic migration (IMGA)
//! - [`HierarchicalDriver`]: tree of sprouted drivers (HGS)
//!
//! Both own their inner drivers as [`BoxedDriver`](crate::driver::BoxedDriver)s
//! and implement [`Driver`](crate::driver::Driver) themselves, so they nest.

mod hierarchy;
mod island;

pub use hierarchy::{HierarchicalDriver, LevelConfig, Spawner};
pub use island::{EmigrantSelection, IslandDriver, MigrationPolicy, Topology};
