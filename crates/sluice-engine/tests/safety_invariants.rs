//! Safety-invariant tests: level clamping, the critical-level pump
//! interlock, and the emergency-stop postcondition, exercised through
//! whole-engine trajectories rather than individual sub-steps.

use proptest::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use sluice_core::{Command, OperationalState, ValveId};
use sluice_engine::{EngineConfig, LockEngine, LEVEL_MAX, LEVEL_MIN};

#[test]
fn pump_forced_off_within_one_tick_of_critical() {
    let config = EngineConfig {
        initial_levels: [50.0, 50.0, 50.0, 85.0],
        max_fill_rate: 2.0,
        seed: 11,
        ..EngineConfig::default()
    };
    let mut engine = LockEngine::new(config).unwrap();
    assert!(engine.apply_command(Command::TogglePump).accepted);

    // Run until some chamber crosses the critical threshold with the
    // pump running; the very next tick must cut it.
    for _ in 0..200 {
        let hot_before = engine.levels().iter().any(|&l| l >= 90.0);
        let pump_before = engine.pump_active();
        let result = engine.execute_tick();
        if pump_before && hot_before {
            assert!(!engine.pump_active(), "interlock must cut the pump");
            assert!(result.metrics.interlock_tripped);
            assert!(result.interlock.is_some());
            return;
        }
    }
    panic!("levels never reached the critical threshold");
}

#[test]
fn pump_on_rejected_and_state_unchanged_while_critical() {
    let config = EngineConfig {
        initial_levels: [50.0, 92.0, 50.0, 50.0],
        ..EngineConfig::default()
    };
    let mut engine = LockEngine::new(config).unwrap();

    let receipt = engine.apply_command(Command::TogglePump);
    assert!(!receipt.accepted);
    assert!(!engine.pump_active());
    assert!(receipt.message().contains("chamber 2"));
}

#[test]
fn stop_emergency_postcondition_from_any_prior_state() {
    for setup in [
        vec![],
        vec![Command::TogglePump],
        vec![Command::StartTransit],
        vec![
            Command::ToggleValve(ValveId::new(0).unwrap()),
            Command::ToggleValve(ValveId::new(1).unwrap()),
            Command::ToggleValve(ValveId::new(2).unwrap()),
            Command::TogglePump,
        ],
    ] {
        let mut engine = LockEngine::new(EngineConfig::default()).unwrap();
        for command in setup {
            engine.apply_command(command);
        }
        engine.execute_tick();

        engine.apply_command(Command::StopEmergency);
        assert_eq!(engine.state(), OperationalState::Emergency);
        assert!(!engine.pump_active());
        assert_eq!(engine.valves(), [false, false, false]);
    }
}

#[test]
fn reset_cycle_postcondition() {
    let mut engine = LockEngine::new(EngineConfig::default()).unwrap();
    engine.apply_command(Command::TogglePump);
    engine.apply_command(Command::ToggleValve(ValveId::new(1).unwrap()));
    engine.apply_command(Command::StartTransit);
    for _ in 0..7 {
        engine.execute_tick();
    }

    engine.apply_command(Command::ResetCycle);
    assert_eq!(engine.state(), OperationalState::Idle);
    assert!(engine.boat_position().is_outside());
    assert!(!engine.pump_active());
    assert_eq!(engine.valves(), [false, false, false]);
    assert_eq!(engine.levels(), [20.0, 20.0, 20.0, 20.0]);
}

#[test]
fn history_never_exceeds_capacity() {
    let config = EngineConfig {
        history_capacity: 100,
        history_sample_probability: 1.0,
        prewarm_history: true,
        ..EngineConfig::default()
    };
    let mut engine = LockEngine::new(config).unwrap();
    assert_eq!(engine.history().len(), 100);

    for _ in 0..250 {
        engine.execute_tick();
        assert_eq!(engine.history().len(), 100);
    }
    // The warmed ring holds only the most recent window.
    let history = engine.history();
    assert_eq!(history.first().unwrap().tick.0, 151);
    assert_eq!(history.last().unwrap().tick.0, 250);
}

proptest! {
    /// Levels stay inside [0, 100] across arbitrary command/tick
    /// interleavings.
    #[test]
    fn levels_always_clamped(
        seed in any::<u64>(),
        script in prop::collection::vec(0u8..8, 1..120),
    ) {
        let config = EngineConfig {
            seed,
            ..EngineConfig::default()
        };
        let mut engine = LockEngine::new(config).unwrap();
        let mut driver = ChaCha8Rng::seed_from_u64(seed ^ 0x5eed);

        for op in script {
            match op {
                0 => {
                    engine.apply_command(Command::TogglePump);
                }
                1..=3 => {
                    let valve = ValveId::new(op - 1).unwrap();
                    engine.apply_command(Command::ToggleValve(valve));
                }
                4 => {
                    engine.apply_command(Command::StartTransit);
                }
                5 => {
                    engine.apply_command(Command::StopEmergency);
                }
                6 => {
                    engine.apply_command(Command::ResetCycle);
                }
                _ => {}
            }
            let ticks = driver.random_range(0..4u32);
            for _ in 0..ticks {
                engine.execute_tick();
            }
            for level in engine.levels() {
                prop_assert!(
                    (LEVEL_MIN..=LEVEL_MAX).contains(&level),
                    "level {level} escaped [0, 100]"
                );
            }
        }
    }

    /// The emergency invariant holds at every observable instant: while
    /// the state is EMERGENCY the pump is off and every valve closed.
    #[test]
    fn emergency_implies_safe_actuators(
        seed in any::<u64>(),
        ticks_after in 0u32..40,
    ) {
        let config = EngineConfig {
            seed,
            ..EngineConfig::default()
        };
        let mut engine = LockEngine::new(config).unwrap();
        engine.apply_command(Command::TogglePump);
        engine.apply_command(Command::StartTransit);
        engine.apply_command(Command::StopEmergency);

        for _ in 0..ticks_after {
            engine.execute_tick();
            prop_assert_eq!(engine.state(), OperationalState::Emergency);
            prop_assert!(!engine.pump_active());
            prop_assert_eq!(engine.valves(), [false, false, false]);
        }
    }
}
