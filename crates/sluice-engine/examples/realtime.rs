//! Realtime mode — the shape the dashboard actually uses.
//!
//! Spawns the background tick thread, submits commands over the
//! bounded channel, and polls the snapshot ring the way the
//! visualization layer does.
//!
//! Run with:
//!   cargo run --example realtime

use std::thread;
use std::time::Duration;

use sluice_core::{Command, ValveId};
use sluice_engine::{EngineConfig, RealtimeWorld};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Sluice Realtime ===\n");

    // Tick fast so the example finishes quickly; the dashboard runs
    // the default 2 Hz.
    let config = EngineConfig {
        seed: 7,
        tick_rate_hz: Some(50.0),
        ..EngineConfig::default()
    };
    let mut world = RealtimeWorld::new(config)?;

    // Wait for the first published snapshot.
    while world.latest().is_none() {
        thread::sleep(Duration::from_millis(5));
    }

    // Open a valve and start a transit, reading the receipts back.
    let receipt = world.submit_command(Command::ToggleValve(ValveId::new(0).unwrap()))?;
    println!("{}", receipt.message());
    let receipt = world.submit_command(Command::StartTransit)?;
    println!("{}", receipt.message());

    // Poll the snapshot ring like a dashboard for half a second.
    for _ in 0..10 {
        thread::sleep(Duration::from_millis(50));
        if let Some(snap) = world.latest() {
            let levels: Vec<String> = snap
                .chambers
                .iter()
                .map(|r| format!("{:5.1}%", r.level))
                .collect();
            println!(
                "  tick {:>3}  state={} boat={} levels=[{}] history={}",
                snap.status.tick.0,
                snap.status.state,
                snap.status.boat_position,
                levels.join(" "),
                snap.history.len()
            );
        }
    }

    let report = world.shutdown();
    println!(
        "\nShutdown in {}ms (tick thread joined: {})",
        report.total_ms, report.tick_joined
    );
    Ok(())
}
