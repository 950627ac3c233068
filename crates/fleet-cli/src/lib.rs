//! Fleet CLI - offline tools for the fleet simulation.
//!
//! - simulate: runs the demo fleet with a fixed time step and prints
//!   per-tick summaries or JSON frames

pub mod offline;

pub use offline::{OfflineError, OfflineSimulation, TickSummary};
