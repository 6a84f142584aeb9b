//! Command rejection reasons.

use std::error::Error;
use std::fmt;

use crate::id::ChamberId;

/// Reason a command was rejected by the command processor.
///
/// Rejections are local validation failures surfaced through
/// [`Receipt::reason`](crate::command::Receipt); they never abort the
/// engine and leave state unchanged.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RejectReason {
    /// The pump cannot be started while any chamber is at or above the
    /// critical level.
    PumpInterlocked {
        /// The first chamber found at or above the critical level.
        chamber: ChamberId,
        /// That chamber's fill level, in percent.
        level: f64,
    },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PumpInterlocked { chamber, level } => write!(
                f,
                "pump interlocked: chamber {chamber} at {level:.1}% is at or above the critical level"
            ),
        }
    }
}

impl Error for RejectReason {}
