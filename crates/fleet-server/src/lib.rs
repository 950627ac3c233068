//! Fleet simulation server: state, broadcast plumbing and the tick loop.

pub mod broadcast;
pub mod commands;
pub mod config;
pub mod loops;
pub mod state;
