//! Fixed-period simulation loop.
//!
//! Advances the fleet, evaluates alerts and publishes one frame per tick.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::broadcast;
use tokio::time::{interval, Instant, MissedTickBehavior};

use crate::broadcast::{BroadcastError, BroadcastSink, TickFrame};
use crate::state::AppState;
use fleet_core::alerts;

/// Run one tick: advance by `dt`, snapshot the fleet, evaluate alerts.
pub fn run_cycle(state: &AppState, tick: u64, dt: Duration) -> TickFrame {
    let dt_secs = dt.as_secs_f64();
    state.fleet().tick(dt_secs);

    let timestamp = Utc::now();
    let vehicles = state.all_snapshots();
    let alerts = alerts::evaluate(&vehicles, state.geofences(), state.fleet().rules(), timestamp);

    TickFrame {
        tick,
        dt_secs,
        timestamp,
        vehicles,
        alerts,
    }
}

/// Tick until shutdown is signalled. Returns the number of completed ticks.
pub async fn run_tick_loop<S: BroadcastSink>(
    state: Arc<AppState>,
    sink: S,
    period: Duration,
    mut shutdown: broadcast::Receiver<()>,
) -> u64 {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut last = Instant::now();
    let mut tick: u64 = 0;

    tracing::info!("Tick loop started ({}ms period)", period.as_millis());

    loop {
        tokio::select! {
            _ = shutdown.recv() => {
                tracing::info!("Tick loop shutting down after {} ticks", tick);
                break;
            }
            _ = ticker.tick() => {
                let now = Instant::now();
                let dt = now.duration_since(last);
                last = now;
                tick += 1;

                let frame = run_cycle(&state, tick, dt);
                tracing::debug!(
                    tick,
                    vehicles = frame.vehicles.len(),
                    alerts = frame.alerts.len(),
                    "Tick complete"
                );

                match sink.publish(&frame) {
                    Ok(()) => {}
                    Err(BroadcastError::NoSubscribers) => {
                        tracing::debug!(tick, "No subscribers for tick frame");
                    }
                    Err(e) => {
                        tracing::warn!(tick, "Failed to publish tick frame: {}", e);
                    }
                }
            }
        }
    }

    tick
}
