//! Read-only snapshot projections for the visualization layer.
//!
//! Snapshots are pure projections of engine state: nothing here mutates
//! the simulation, and the per-chamber display status is recomputed on
//! every read, never stored.

use std::fmt;
use std::time::SystemTime;

use sluice_core::{
    BoatPosition, ChamberId, ChamberStatus, OperationalState, TickId, CHAMBER_COUNT, VALVE_COUNT,
};

use crate::history::HistorySample;

/// Record of an automatic pump cutoff by the critical-level interlock.
///
/// Interlock trips are silent corrective actions, not errors; they are
/// observable only through the status snapshot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InterlockEvent {
    /// Tick at which the cutoff happened.
    pub tick: TickId,
    /// The chamber that tripped the interlock.
    pub chamber: ChamberId,
    /// That chamber's level at the moment of the cutoff, in percent.
    pub level: f64,
}

impl fmt::Display for InterlockEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pump cutoff at tick {}: chamber {} reached {:.1}%",
            self.tick, self.chamber, self.level
        )
    }
}

/// Snapshot of the control-state portion of the engine.
#[derive(Clone, Debug)]
pub struct StatusSnapshot {
    /// Current operational state.
    pub state: OperationalState,
    /// Where the boat is in the chain.
    pub boat_position: BoatPosition,
    /// Whether the shared feed pump is running.
    pub pump_active: bool,
    /// Open/closed state of the three interconnection valves, chain order.
    pub valves: [bool; VALVE_COUNT],
    /// Tick this snapshot reflects.
    pub tick: TickId,
    /// Wall-clock time the snapshot was taken.
    pub last_updated: SystemTime,
    /// The most recent automatic pump cutoff, if any.
    pub last_interlock: Option<InterlockEvent>,
}

/// One chamber's display row: identity, level, and derived status.
#[derive(Clone, Debug, PartialEq)]
pub struct ChamberReading {
    /// The chamber this row describes.
    pub id: ChamberId,
    /// Operator-facing chamber name.
    pub name: String,
    /// Fill level in percent.
    pub level: f64,
    /// Derived display status.
    pub status: ChamberStatus,
}

/// A complete owned snapshot: status, chamber readings, and history.
///
/// This is the unit published to the realtime snapshot ring; it owns all
/// of its data and is `Send + Sync`.
#[derive(Clone, Debug)]
pub struct WorldSnapshot {
    /// Control-state snapshot.
    pub status: StatusSnapshot,
    /// Per-chamber readings, chain order.
    pub chambers: [ChamberReading; CHAMBER_COUNT],
    /// History ring contents, oldest first.
    pub history: Vec<HistorySample>,
}

/// Derive the display status of one chamber.
///
/// Tie-break order is exactly: critical dominates over pump-active,
/// which dominates over low level.
pub(crate) fn chamber_status(
    level: f64,
    pump_active: bool,
    critical_level: f64,
    low_level: f64,
) -> ChamberStatus {
    if level >= critical_level {
        ChamberStatus::Critical
    } else if pump_active {
        ChamberStatus::Filling
    } else if level < low_level {
        ChamberStatus::Draining
    } else {
        ChamberStatus::Normal
    }
}

/// Operator-facing name of a chamber. The chain ends are labelled as
/// the entry and exit basins.
pub(crate) fn chamber_name(id: ChamberId) -> String {
    match id.number() {
        1 => "Chamber 1 (Entry)".to_string(),
        n if n as usize == CHAMBER_COUNT => format!("Chamber {n} (Exit)"),
        n => format!("Chamber {n}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CRITICAL: f64 = 90.0;
    const LOW: f64 = 10.0;

    #[test]
    fn status_critical_dominates_pump() {
        assert_eq!(
            chamber_status(95.0, true, CRITICAL, LOW),
            ChamberStatus::Critical
        );
        assert_eq!(
            chamber_status(90.0, false, CRITICAL, LOW),
            ChamberStatus::Critical
        );
    }

    #[test]
    fn status_filling_dominates_low_level() {
        assert_eq!(
            chamber_status(5.0, true, CRITICAL, LOW),
            ChamberStatus::Filling
        );
    }

    #[test]
    fn status_draining_below_low_threshold() {
        assert_eq!(
            chamber_status(9.9, false, CRITICAL, LOW),
            ChamberStatus::Draining
        );
        // Exactly at the low threshold is normal, not draining.
        assert_eq!(
            chamber_status(10.0, false, CRITICAL, LOW),
            ChamberStatus::Normal
        );
    }

    #[test]
    fn status_normal_in_mid_range() {
        assert_eq!(
            chamber_status(50.0, false, CRITICAL, LOW),
            ChamberStatus::Normal
        );
    }

    #[test]
    fn chamber_names_label_chain_ends() {
        assert_eq!(chamber_name(ChamberId::ALL[0]), "Chamber 1 (Entry)");
        assert_eq!(chamber_name(ChamberId::ALL[1]), "Chamber 2");
        assert_eq!(chamber_name(ChamberId::ALL[2]), "Chamber 3");
        assert_eq!(chamber_name(ChamberId::ALL[3]), "Chamber 4 (Exit)");
    }

    #[test]
    fn interlock_event_display() {
        let event = InterlockEvent {
            tick: TickId(12),
            chamber: ChamberId::new(2).unwrap(),
            level: 91.27,
        };
        let msg = event.to_string();
        assert!(msg.contains("tick 12"));
        assert!(msg.contains("chamber 2"));
        assert!(msg.contains("91.3%"));
    }
}
