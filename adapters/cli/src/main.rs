#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a Waypoint Defence level headlessly.

use std::{path::PathBuf, time::Duration};

use anyhow::{ensure, Context, Result};
use clap::Parser;
use log::{info, warn};
use waypoint_defence_cli::{load_level, PlacementRequest, Simulation};
use waypoint_defence_core::{Command, Event};

/// Runs a level until it is won, lost or the tick limit is reached.
#[derive(Debug, Parser)]
#[command(name = "waypoint-defence", version)]
struct Args {
    /// Level file to load.
    #[arg(long, default_value = "levels/default.toml")]
    level: PathBuf,
    /// Simulation step in milliseconds.
    #[arg(long, default_value_t = 50)]
    dt_ms: u64,
    /// Maximum number of steps before giving up.
    #[arg(long, default_value_t = 20_000)]
    max_ticks: u64,
    /// Turret to build before the waves start, as KIND@COLUMN,ROW.
    #[arg(long = "place", value_name = "KIND@COLUMN,ROW")]
    placements: Vec<PlacementRequest>,
    /// Print the summary as JSON.
    #[arg(long)]
    json: bool,
}

/// Entry point for the Waypoint Defence command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    ensure!(args.dt_ms > 0, "--dt-ms must be positive");

    let level = load_level(&args.level)?;
    let mut simulation = Simulation::new(level);

    for request in &args.placements {
        let events = simulation.submit(Command::PlaceTurret {
            kind: request.kind,
            cell: request.cell,
        });
        for event in events {
            if let Event::TurretPlacementRejected { kind, cell, reason } = event {
                warn!("could not place {kind:?} at {cell:?}: {reason:?}");
            }
        }
    }

    let _ = simulation.start_waves();
    let dt = Duration::from_millis(args.dt_ms);
    let mut steps = 0;
    while !simulation.is_over() && steps < args.max_ticks {
        let _ = simulation.step(dt);
        steps += 1;
    }
    if !simulation.is_over() {
        info!("stopped after {steps} steps without a result");
    }

    let summary = simulation.summary();
    if args.json {
        let json = serde_json::to_string_pretty(&summary).context("failed to encode summary")?;
        println!("{json}");
    } else {
        println!(
            "{:?} after {} ticks: gold {}, health {}, kills {}, leaks {}, turrets {}",
            summary.phase,
            summary.ticks,
            summary.gold,
            summary.health,
            summary.kills,
            summary.leaks,
            summary.turrets
        );
    }
    Ok(())
}
