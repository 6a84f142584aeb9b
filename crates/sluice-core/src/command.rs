//! Operator commands and per-command receipts.

use std::fmt;

use crate::error::RejectReason;
use crate::id::{TickId, ValveId};

/// An operator command from the closed control vocabulary.
///
/// Commands are applied one at a time, atomically with respect to the
/// physics tick. Validation failures come back as rejected [`Receipt`]s,
/// never as panics.
///
/// # Examples
///
/// ```
/// use sluice_core::{Command, ValveId};
///
/// let cmd = Command::parse("TOGGLE_VALVE_2_3").unwrap();
/// assert_eq!(cmd, Command::ToggleValve(ValveId::new(1).unwrap()));
/// assert_eq!(cmd.as_str(), "TOGGLE_VALVE_2_3");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    /// Toggle the shared feed pump. Turning on is refused while any
    /// chamber is at or above the critical level; turning off always
    /// succeeds.
    TogglePump,
    /// Flip the given interconnection valve.
    ToggleValve(ValveId),
    /// Begin a timed transit cycle: the boat enters chamber 1 and
    /// advances through the chain on the configured dwell schedule.
    StartTransit,
    /// Emergency stop: pump off, all valves closed, state held at
    /// `EMERGENCY` until a reset.
    StopEmergency,
    /// Return to the initial operating point: idle, boat outside, pump
    /// off, valves closed, all levels at the configured reset level.
    ResetCycle,
}

impl Command {
    /// The wire name of this command.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TogglePump => "TOGGLE_PUMP",
            Self::ToggleValve(v) => match v.index() {
                0 => "TOGGLE_VALVE_1_2",
                1 => "TOGGLE_VALVE_2_3",
                _ => "TOGGLE_VALVE_3_4",
            },
            Self::StartTransit => "START_TRANSIT",
            Self::StopEmergency => "STOP_EMERGENCY",
            Self::ResetCycle => "RESET_CYCLE",
        }
    }

    /// Parse a wire name back into a command.
    ///
    /// Returns `None` for anything outside the closed vocabulary.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "TOGGLE_PUMP" => Some(Self::TogglePump),
            "TOGGLE_VALVE_1_2" => ValveId::new(0).map(Self::ToggleValve),
            "TOGGLE_VALVE_2_3" => ValveId::new(1).map(Self::ToggleValve),
            "TOGGLE_VALVE_3_4" => ValveId::new(2).map(Self::ToggleValve),
            "START_TRANSIT" => Some(Self::StartTransit),
            "STOP_EMERGENCY" => Some(Self::StopEmergency),
            "RESET_CYCLE" => Some(Self::ResetCycle),
            _ => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receipt returned for every applied or rejected command.
///
/// `accepted == false` means the command was refused by validation and
/// no state changed; `reason` then explains why.
///
/// # Examples
///
/// ```
/// use sluice_core::{Command, Receipt, TickId};
///
/// let receipt = Receipt::applied(Command::StartTransit, TickId(12));
/// assert!(receipt.accepted);
/// assert_eq!(receipt.applied_tick, Some(TickId(12)));
/// assert!(receipt.message().contains("START_TRANSIT"));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Receipt {
    /// The command this receipt answers.
    pub command: Command,
    /// Whether the command was accepted and applied.
    pub accepted: bool,
    /// The tick whose state the command mutated, if applied.
    pub applied_tick: Option<TickId>,
    /// The rejection reason, if refused.
    pub reason: Option<RejectReason>,
}

impl Receipt {
    /// Receipt for a command that was applied at the given tick.
    pub const fn applied(command: Command, tick: TickId) -> Self {
        Self {
            command,
            accepted: true,
            applied_tick: Some(tick),
            reason: None,
        }
    }

    /// Receipt for a command refused by validation.
    pub const fn rejected(command: Command, reason: RejectReason) -> Self {
        Self {
            command,
            accepted: false,
            applied_tick: None,
            reason: Some(reason),
        }
    }

    /// Human-readable outcome message for the operator log.
    pub fn message(&self) -> String {
        if self.accepted {
            match self.applied_tick {
                Some(tick) => format!("command {} applied at tick {tick}", self.command),
                None => format!("command {} applied", self.command),
            }
        } else {
            match &self.reason {
                Some(reason) => format!("command {} rejected: {reason}", self.command),
                None => format!("command {} rejected", self.command),
            }
        }
    }
}
