//! Fleet Server - runs the fleet simulation and streams per-tick frames

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fleet_server::config::Config;
use fleet_server::loops;
use fleet_server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("fleet_server=debug".parse()?)
            .add_directive("fleet_core=info".parse()?))
        .init();

    tracing::info!("Starting Fleet Server...");

    let config = Config::from_env();
    let period = config.tick_period();
    let state = Arc::new(AppState::new(config));

    if state.config().seed_demo {
        state.seed_demo()?;
        tracing::info!(
            "Seeded demo fleet: {} vehicles, {} geofences",
            state.fleet().len(),
            state.geofences().len()
        );
    }

    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    let alert_log = tokio::spawn(loops::alert_log_loop::run_alert_log_loop(
        state.subscribe(),
        shutdown_tx.subscribe(),
    ));
    let tick_loop = tokio::spawn(loops::tick_loop::run_tick_loop(
        state.clone(),
        state.sink(),
        period,
        shutdown_tx.subscribe(),
    ));

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown requested");
    let _ = shutdown_tx.send(());

    let ticks = tick_loop.await?;
    alert_log.await?;
    tracing::info!("Fleet Server stopped after {} ticks", ticks);

    Ok(())
}
