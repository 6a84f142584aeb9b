//! Physics/integration sub-steps for one simulation tick.
//!
//! Five sub-steps run in a fixed order each tick: critical-level
//! interlock, valve-driven equalization (valves 0, 1, 2 sequentially),
//! pump fill, transit drain, ambient drift. The order is part of the
//! observable behavior: a later valve reads levels already mutated by
//! an earlier valve within the same tick, and pump fill, transit drain,
//! and ambient drift are mutually exclusive. [`LockEngine`](crate::LockEngine)
//! owns the guard conditions; the functions here perform the mutations.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use sluice_core::{ChamberId, TickId, CHAMBER_COUNT, VALVE_COUNT};

use crate::config::{LEVEL_MAX, LEVEL_MIN};
use crate::snapshot::InterlockEvent;

/// Clamp a chamber level to the representable `[0, 100]` range.
pub(crate) fn clamp_level(value: f64) -> f64 {
    value.clamp(LEVEL_MIN, LEVEL_MAX)
}

/// The first chamber at or above the critical level, with its level.
pub(crate) fn first_critical(
    levels: &[f64; CHAMBER_COUNT],
    critical_level: f64,
) -> Option<(ChamberId, f64)> {
    ChamberId::ALL.into_iter().find_map(|chamber| {
        let level = levels[chamber.index()];
        (level >= critical_level).then_some((chamber, level))
    })
}

/// Critical-level interlock: force the pump off when any chamber is at
/// or above the critical level while the pump is running.
///
/// This is a silent corrective action, not an error; the returned event
/// is surfaced through the next status snapshot.
pub(crate) fn interlock(
    levels: &[f64; CHAMBER_COUNT],
    pump_active: &mut bool,
    critical_level: f64,
    tick: TickId,
) -> Option<InterlockEvent> {
    if !*pump_active {
        return None;
    }
    let (chamber, level) = first_critical(levels, critical_level)?;
    *pump_active = false;
    Some(InterlockEvent {
        tick,
        chamber,
        level,
    })
}

/// Valve-driven equalization across the three interconnection valves.
///
/// For each open valve in chain order, moves
/// `min(|diff| / 2, max_transfer_rate)` %-points from the higher
/// chamber to the lower one, but only when `|diff|` exceeds the
/// dead-band. Moving at most half the difference guarantees the pair
/// can never overshoot past equality in a single step, which bounds
/// the discrete integration error and prevents ping-pong oscillation.
///
/// Valves are evaluated sequentially: valve 1 sees chamber 2's level as
/// already mutated by valve 0 in the same tick.
pub(crate) fn equalize(
    levels: &mut [f64; CHAMBER_COUNT],
    valves: &[bool; VALVE_COUNT],
    dead_band: f64,
    max_transfer_rate: f64,
) {
    for (i, &open) in valves.iter().enumerate() {
        if !open {
            continue;
        }
        let diff = levels[i] - levels[i + 1];
        if diff.abs() <= dead_band {
            continue;
        }
        let flow = (diff.abs() / 2.0).min(max_transfer_rate).copysign(diff);
        levels[i] = clamp_level(levels[i] - flow);
        levels[i + 1] = clamp_level(levels[i + 1] + flow);
    }
}

/// Pump effect: every chamber gains a random increment bounded by
/// `max_fill_rate`, clamped to the top of range.
pub(crate) fn pump_fill(
    levels: &mut [f64; CHAMBER_COUNT],
    max_fill_rate: f64,
    rng: &mut ChaCha8Rng,
) {
    for level in levels.iter_mut() {
        *level = clamp_level(*level + rng.random::<f64>() * max_fill_rate);
    }
}

/// Transit drain: every chamber loses a random decrement bounded by
/// `max_drain_rate`, clamped to the bottom of range. Models automated
/// equalization during a transit cycle, independent of valve state.
pub(crate) fn transit_drain(
    levels: &mut [f64; CHAMBER_COUNT],
    max_drain_rate: f64,
    rng: &mut ChaCha8Rng,
) {
    for level in levels.iter_mut() {
        *level = clamp_level(*level - rng.random::<f64>() * max_drain_rate);
    }
}

/// Ambient drift: a small zero-mean perturbation that keeps the
/// telemetry visibly alive at rest.
pub(crate) fn ambient_drift(
    levels: &mut [f64; CHAMBER_COUNT],
    drift_span: f64,
    rng: &mut ChaCha8Rng,
) {
    for level in levels.iter_mut() {
        *level = clamp_level(*level + (rng.random::<f64>() - 0.5) * drift_span);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    const DEAD_BAND: f64 = 0.5;
    const MAX_TRANSFER: f64 = 1.0;

    fn rng(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }

    // ── equalization ─────────────────────────────────────────────

    #[test]
    fn equalize_moves_capped_flow_toward_lower_chamber() {
        // |20 - 45| / 2 = 12.5, capped at 1.0 per tick.
        let mut levels = [20.0, 45.0, 60.0, 10.0];
        equalize(&mut levels, &[true, false, false], DEAD_BAND, MAX_TRANSFER);
        assert_eq!(levels, [21.0, 44.0, 60.0, 10.0]);
    }

    #[test]
    fn equalize_moves_half_difference_when_below_cap() {
        // diff = 1.2 → flow = 0.6 < cap; pair meets exactly in the middle.
        let mut levels = [51.2, 50.0, 50.0, 50.0];
        equalize(&mut levels, &[true, false, false], DEAD_BAND, MAX_TRANSFER);
        assert!((levels[0] - 50.6).abs() < 1e-12);
        assert!((levels[1] - 50.6).abs() < 1e-12);
    }

    #[test]
    fn equalize_respects_dead_band() {
        let mut levels = [50.4, 50.0, 50.0, 50.0];
        equalize(&mut levels, &[true, true, true], DEAD_BAND, MAX_TRANSFER);
        assert_eq!(levels, [50.4, 50.0, 50.0, 50.0]);
    }

    #[test]
    fn equalize_flows_uphill_pair_downhill() {
        // Lower chamber upstream: flow reverses direction.
        let mut levels = [10.0, 40.0, 50.0, 50.0];
        equalize(&mut levels, &[true, false, false], DEAD_BAND, MAX_TRANSFER);
        assert_eq!(levels, [11.0, 39.0, 50.0, 50.0]);
    }

    #[test]
    fn equalize_closed_valves_do_nothing() {
        let mut levels = [20.0, 45.0, 60.0, 10.0];
        equalize(&mut levels, &[false, false, false], DEAD_BAND, MAX_TRANSFER);
        assert_eq!(levels, [20.0, 45.0, 60.0, 10.0]);
    }

    #[test]
    fn equalize_is_sequential_across_the_chain() {
        // Valve 1 must see chamber 2's level as already mutated by
        // valve 0 in the same tick.
        let mut levels = [30.0, 20.0, 20.0, 20.0];
        equalize(&mut levels, &[true, true, false], DEAD_BAND, MAX_TRANSFER);
        // Valve 0: 30/20 → 29/21. Valve 1: 21/20, diff 1.0 → flow 0.5.
        assert_eq!(levels[0], 29.0);
        assert!((levels[1] - 20.5).abs() < 1e-12);
        assert!((levels[2] - 20.5).abs() < 1e-12);
        assert_eq!(levels[3], 20.0);
    }

    #[test]
    fn equalize_conserves_total_volume() {
        let mut levels = [80.0, 10.0, 55.0, 31.0];
        let before: f64 = levels.iter().sum();
        equalize(&mut levels, &[true, true, true], DEAD_BAND, MAX_TRANSFER);
        let after: f64 = levels.iter().sum();
        assert!((before - after).abs() < 1e-9);
    }

    // ── interlock ────────────────────────────────────────────────

    #[test]
    fn interlock_cuts_pump_at_critical() {
        let levels = [95.0, 50.0, 50.0, 50.0];
        let mut pump = true;
        let event = interlock(&levels, &mut pump, 90.0, TickId(7)).unwrap();
        assert!(!pump);
        assert_eq!(event.chamber.number(), 1);
        assert_eq!(event.level, 95.0);
        assert_eq!(event.tick, TickId(7));
    }

    #[test]
    fn interlock_triggers_exactly_at_threshold() {
        let levels = [50.0, 90.0, 50.0, 50.0];
        let mut pump = true;
        assert!(interlock(&levels, &mut pump, 90.0, TickId(1)).is_some());
        assert!(!pump);
    }

    #[test]
    fn interlock_idle_when_pump_off() {
        let levels = [95.0, 50.0, 50.0, 50.0];
        let mut pump = false;
        assert!(interlock(&levels, &mut pump, 90.0, TickId(1)).is_none());
        assert!(!pump);
    }

    #[test]
    fn interlock_idle_below_threshold() {
        let levels = [89.9, 50.0, 50.0, 50.0];
        let mut pump = true;
        assert!(interlock(&levels, &mut pump, 90.0, TickId(1)).is_none());
        assert!(pump);
    }

    // ── stochastic steps ─────────────────────────────────────────

    #[test]
    fn pump_fill_raises_and_clamps() {
        let mut levels = [99.5, 50.0, 0.0, 10.0];
        let mut rng = rng(42);
        pump_fill(&mut levels, 2.0, &mut rng);
        assert!(levels[0] <= LEVEL_MAX);
        for (i, level) in levels.iter().enumerate() {
            assert!(*level >= [99.5, 50.0, 0.0, 10.0][i]);
            assert!(*level <= [99.5, 50.0, 0.0, 10.0][i] + 2.0);
        }
    }

    #[test]
    fn transit_drain_lowers_and_clamps() {
        let mut levels = [0.3, 50.0, 100.0, 10.0];
        let mut rng = rng(42);
        transit_drain(&mut levels, 1.0, &mut rng);
        assert!(levels[0] >= LEVEL_MIN);
        for (i, level) in levels.iter().enumerate() {
            assert!(*level <= [0.3, 50.0, 100.0, 10.0][i]);
        }
    }

    #[test]
    fn ambient_drift_stays_within_span() {
        let before = [50.0; CHAMBER_COUNT];
        let mut levels = before;
        let mut rng = rng(42);
        ambient_drift(&mut levels, 0.5, &mut rng);
        for (l, b) in levels.iter().zip(before.iter()) {
            assert!((l - b).abs() <= 0.25 + 1e-12);
        }
    }

    #[test]
    fn stochastic_steps_replay_with_same_seed() {
        let mut a = [20.0, 45.0, 60.0, 10.0];
        let mut b = a;
        let mut rng_a = rng(1234);
        let mut rng_b = rng(1234);
        pump_fill(&mut a, 2.0, &mut rng_a);
        ambient_drift(&mut a, 0.5, &mut rng_a);
        pump_fill(&mut b, 2.0, &mut rng_b);
        ambient_drift(&mut b, 0.5, &mut rng_b);
        assert_eq!(a, b);
    }

    // ── properties ───────────────────────────────────────────────

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// One equalization step never flips the sign of the pair
            /// difference: the levels approach each other or meet, never
            /// cross.
            #[test]
            fn equalize_never_overshoots(a in 0.0..=100.0f64, b in 0.0..=100.0f64) {
                let mut levels = [a, b, 0.0, 0.0];
                equalize(&mut levels, &[true, false, false], DEAD_BAND, MAX_TRANSFER);
                let before = a - b;
                let after = levels[0] - levels[1];
                prop_assert!(
                    before.signum() == after.signum() || after.abs() < 1e-12,
                    "sign flipped: before {before}, after {after}"
                );
                prop_assert!(after.abs() <= before.abs() + 1e-12);
            }

            /// Every sub-step keeps all levels inside [0, 100].
            #[test]
            fn all_steps_preserve_level_bounds(
                levels in prop::array::uniform4(0.0..=100.0f64),
                valves in prop::array::uniform3(any::<bool>()),
                seed in any::<u64>(),
            ) {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let mut state = levels;
                equalize(&mut state, &valves, DEAD_BAND, MAX_TRANSFER);
                pump_fill(&mut state, 2.0, &mut rng);
                transit_drain(&mut state, 1.0, &mut rng);
                ambient_drift(&mut state, 0.5, &mut rng);
                for level in state {
                    prop_assert!((LEVEL_MIN..=LEVEL_MAX).contains(&level));
                }
            }
        }
    }
}
