//! Sluice quickstart — a complete, minimal lockstep session.
//!
//! Demonstrates:
//!   1. Building an EngineConfig and LockEngine
//!   2. Applying operator commands and reading receipts
//!   3. Stepping the physics and watching valve equalization
//!   4. The critical-level pump interlock
//!   5. Reading the snapshot projections
//!
//! Run with:
//!   cargo run --example quickstart

use sluice_core::{Command, ValveId};
use sluice_engine::{EngineConfig, LockEngine};

fn print_levels(engine: &LockEngine) {
    let readings = engine.readings();
    let row: Vec<String> = readings
        .iter()
        .map(|r| format!("{}: {:5.1}% ({})", r.id, r.level, r.status))
        .collect();
    println!("  tick {:>3}  {}", engine.current_tick().0, row.join("  "));
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Sluice Quickstart ===\n");

    // 1. Build a deterministic engine.
    let config = EngineConfig {
        seed: 42,
        ..EngineConfig::default()
    };
    let mut engine = LockEngine::new(config)?;
    println!(
        "Engine created. Seed: {}, initial levels: {:?}\n",
        engine.seed(),
        engine.levels()
    );

    // 2. Open the valve between chambers 1 and 2 and let them equalize.
    let valve = ValveId::new(0).unwrap();
    let receipt = engine.apply_command(Command::ToggleValve(valve));
    println!("{}", receipt.message());
    for _ in 0..15 {
        engine.execute_tick();
    }
    print_levels(&engine);

    // 3. Start the pump and run it toward the critical threshold.
    engine.apply_command(Command::ToggleValve(valve)); // close again
    let receipt = engine.apply_command(Command::TogglePump);
    println!("\n{}", receipt.message());
    for _ in 0..80 {
        let result = engine.execute_tick();
        if let Some(event) = result.interlock {
            println!("  interlock: {event}");
            break;
        }
    }
    print_levels(&engine);
    println!("  pump active after interlock: {}", engine.pump_active());

    // 4. A pump restart is refused while a chamber is still critical.
    let receipt = engine.apply_command(Command::TogglePump);
    println!("\n{}", receipt.message());

    // 5. Reset and run a transit cycle.
    engine.apply_command(Command::ResetCycle);
    engine.apply_command(Command::StartTransit);
    println!("\nTransit started.");
    while engine.boat_position().value() != 0 || engine.current_tick().0 < 45 {
        engine.execute_tick();
        if engine.last_metrics().sequencer_steps > 0 {
            println!(
                "  tick {:>3}  state={} boat={}",
                engine.current_tick().0,
                engine.state(),
                engine.boat_position()
            );
        }
        if engine.current_tick().0 > 200 {
            break;
        }
    }

    println!("\nHistory samples retained: {}", engine.history().len());
    println!("Done.");
    Ok(())
}
