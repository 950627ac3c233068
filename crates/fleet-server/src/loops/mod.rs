//! Background loops.

pub mod alert_log_loop;
pub mod tick_loop;
