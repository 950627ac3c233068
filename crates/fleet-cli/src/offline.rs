//! Offline simulation driven by a fixed time step instead of a wall clock.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use fleet_core::scenario::ScenarioError;
use fleet_core::MissionState;
use fleet_server::broadcast::TickFrame;
use fleet_server::config::Config;
use fleet_server::loops::tick_loop::run_cycle;
use fleet_server::state::AppState;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OfflineError {
    #[error("time step must be a finite, non-negative number of seconds, got {0}")]
    InvalidStep(f64),
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
}

pub struct OfflineSimulation {
    state: AppState,
    dt: Duration,
    tick: u64,
}

impl OfflineSimulation {
    /// Demo fleet and no-fly zones, advanced by `dt_secs` per step.
    pub fn demo(dt_secs: f64, seed: Option<u64>) -> Result<Self, OfflineError> {
        let dt = Duration::try_from_secs_f64(dt_secs)
            .map_err(|_| OfflineError::InvalidStep(dt_secs))?;
        let state = AppState::new(Config {
            rng_seed: seed,
            seed_demo: true,
            ..Config::default()
        });
        state.seed_demo()?;
        Ok(Self { state, dt, tick: 0 })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Run one tick.
    pub fn step(&mut self) -> TickFrame {
        self.tick += 1;
        run_cycle(&self.state, self.tick, self.dt)
    }
}

/// One-line digest of a tick frame.
#[derive(Debug, Clone, Serialize)]
pub struct TickSummary {
    pub tick: u64,
    pub vehicles: usize,
    pub states: BTreeMap<MissionState, usize>,
    pub alerts: usize,
    pub lowest_battery: Option<(String, f64)>,
}

impl From<&TickFrame> for TickSummary {
    fn from(frame: &TickFrame) -> Self {
        let mut states = BTreeMap::new();
        for vehicle in &frame.vehicles {
            *states.entry(vehicle.mission_state).or_insert(0) += 1;
        }
        let lowest_battery = frame
            .vehicles
            .iter()
            .min_by(|a, b| a.battery_pct.total_cmp(&b.battery_pct))
            .map(|v| (v.id.clone(), v.battery_pct));

        Self {
            tick: frame.tick,
            vehicles: frame.vehicles.len(),
            states,
            alerts: frame.alerts.len(),
            lowest_battery,
        }
    }
}

impl fmt::Display for TickSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tick {:>4} | {} vehicles |", self.tick, self.vehicles)?;
        for (state, count) in &self.states {
            write!(f, " {:?}={}", state, count)?;
        }
        write!(f, " | {} alerts", self.alerts)?;
        if let Some((id, battery)) = &self.lowest_battery {
            write!(f, " | lowest battery {} {:.1}%", id, battery)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_simulation_steps_and_summarises() {
        let mut sim = OfflineSimulation::demo(1.0, Some(5)).unwrap();
        let first = sim.step();
        let second = sim.step();
        assert_eq!((first.tick, second.tick), (1, 2));

        let summary = TickSummary::from(&second);
        assert_eq!(summary.vehicles, 6);
        assert_eq!(summary.states.values().sum::<usize>(), 6);
        let (_, battery) = summary.lowest_battery.clone().unwrap();
        assert!(battery < 100.0);
        assert!(summary.to_string().starts_with("tick    2 | 6 vehicles |"));
    }

    #[test]
    fn long_run_drains_battery_into_emergency() {
        // Rotary-wing drain is 0.15%/s moving, so 2 hours is far past the floor.
        let mut sim = OfflineSimulation::demo(60.0, Some(5)).unwrap();
        let mut last = sim.step();
        for _ in 0..120 {
            last = sim.step();
        }
        assert!(last
            .vehicles
            .iter()
            .all(|v| v.mission_state == MissionState::Emergency));
        assert!(last.vehicles.iter().all(|v| v.battery_pct >= 0.0));
    }

    #[test]
    fn unusable_time_steps_are_rejected() {
        for dt in [-1.0, f64::NAN, f64::INFINITY, 1e20] {
            assert!(matches!(
                OfflineSimulation::demo(dt, Some(5)),
                Err(OfflineError::InvalidStep(_))
            ));
        }
        assert!(OfflineSimulation::demo(0.0, Some(5)).is_ok());
    }
}
