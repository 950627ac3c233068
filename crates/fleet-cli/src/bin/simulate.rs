//! Offline fleet simulation.
//!
//! Runs the demo fleet for a fixed number of ticks with a fixed time step,
//! without a wall clock or any subscribers.

use clap::Parser;
use fleet_cli::{OfflineSimulation, TickSummary};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Offline demo fleet simulator
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Number of ticks to run
    #[arg(long, default_value_t = 60)]
    ticks: u64,

    /// Simulated seconds per tick
    #[arg(long, default_value_t = 1.0)]
    dt: f64,

    /// Seed for mission re-generation rolls
    #[arg(long)]
    seed: Option<u64>,

    /// Print every tick frame as a JSON line instead of a summary
    #[arg(long)]
    json: bool,

    /// Only print every Nth tick
    #[arg(long, default_value_t = 1)]
    every: u64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("simulate=info".parse()?)
            .add_directive("fleet_core=warn".parse()?))
        .init();

    let args = Args::parse();
    let every = args.every.max(1);

    let mut sim = OfflineSimulation::demo(args.dt, args.seed)?;
    tracing::info!(
        "Simulating {} vehicles for {} ticks of {:.1}s",
        sim.state().fleet().len(),
        args.ticks,
        args.dt
    );

    for _ in 0..args.ticks {
        let frame = sim.step();
        if frame.tick % every != 0 {
            continue;
        }

        if args.json {
            println!("{}", serde_json::to_string(&frame)?);
        } else {
            println!("{}", TickSummary::from(&frame));
            for alert in &frame.alerts {
                println!("    [{:?}] {}", alert.severity, alert.message);
            }
        }
    }

    Ok(())
}
