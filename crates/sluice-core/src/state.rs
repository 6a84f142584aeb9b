//! Operational state and derived chamber status enums.

use std::fmt;

/// Top-level operational state of the lock system.
///
/// Exactly one value at a time; [`Idle`](OperationalState::Idle) is the
/// initial state. `Maintenance` exists in the closed vocabulary but no
/// operator command currently produces it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OperationalState {
    /// No transit in progress; ambient dynamics only.
    #[default]
    Idle,
    /// A boat is moving through the chamber chain.
    Transit,
    /// Emergency stop: pump off and all valves closed, held until reset.
    Emergency,
    /// System is down for maintenance.
    Maintenance,
}

impl OperationalState {
    /// The wire name of this state, as consumed by the visualization layer.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Transit => "TRANSIT",
            Self::Emergency => "EMERGENCY",
            Self::Maintenance => "MAINTENANCE",
        }
    }
}

impl fmt::Display for OperationalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display status of a single chamber, recomputed on every read.
///
/// Derivation order is load-bearing: `Critical` dominates over
/// `Filling` (pump active), which dominates over `Draining` (low level).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChamberStatus {
    /// Level within normal operating range.
    Normal,
    /// Pump active and the chamber is taking on water.
    Filling,
    /// Level below the low threshold.
    Draining,
    /// Level at or above the critical threshold.
    Critical,
}

impl ChamberStatus {
    /// The wire name of this status, as consumed by the visualization layer.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Filling => "filling",
            Self::Draining => "draining",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for ChamberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
