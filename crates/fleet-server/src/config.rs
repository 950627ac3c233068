//! Server configuration from environment.

use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    /// Fixed period of the tick loop
    pub tick_period_ms: u64,
    /// Buffered messages per stream subscriber before it starts lagging
    pub broadcast_capacity: usize,
    /// Seed for the mission re-generation random source; OS entropy if unset
    pub rng_seed: Option<u64>,
    /// Register the demo fleet and no-fly zones at start-up
    pub seed_demo: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_period_ms: 1_000,
            broadcast_capacity: 64,
            rng_seed: None,
            seed_demo: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            tick_period_ms: env::var("FLEET_TICK_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|ms| *ms > 0)
                .unwrap_or(defaults.tick_period_ms),
            broadcast_capacity: env::var("FLEET_BROADCAST_CAPACITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|cap| *cap > 0)
                .unwrap_or(defaults.broadcast_capacity),
            rng_seed: env::var("FLEET_SEED").ok().and_then(|s| s.parse().ok()),
            seed_demo: env::var("FLEET_DEMO")
                .ok()
                .map(|s| parse_bool(&s))
                .unwrap_or(defaults.seed_demo),
        }
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
