//! Timed transit sequencer.
//!
//! `START_TRANSIT` puts the boat in chamber 1 immediately and schedules
//! the remaining trajectory as tick deadlines: advance to chambers 2, 3,
//! and 4 after one, two, and three dwell periods, then complete (back to
//! idle, boat outside) after four. Deadlines are plain data drained by
//! the tick loop, not OS timers, so a state-overriding command cancels
//! them atomically with the rest of its effect.

use sluice_core::{BoatPosition, ChamberId, TickId};

/// One scheduled sequencer transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TransitStep {
    /// Move the boat to the given position; state stays `Transit`.
    Advance(BoatPosition),
    /// Transit finished: state returns to `Idle`, boat leaves the chain.
    Complete,
}

/// Pending transit deadlines, ascending by tick.
#[derive(Clone, Debug, Default)]
pub(crate) struct TransitSchedule {
    pending: Vec<(TickId, TransitStep)>,
}

impl TransitSchedule {
    /// Create an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any pending schedule with a fresh trajectory starting now.
    ///
    /// A re-issued `START_TRANSIT` restarts the timeline rather than
    /// stacking a second one.
    pub fn start(&mut self, now: TickId, dwell_ticks: u64) {
        self.pending.clear();
        for (hop, chamber) in ChamberId::ALL.into_iter().skip(1).enumerate() {
            let deadline = TickId(now.0 + (hop as u64 + 1) * dwell_ticks);
            self.pending
                .push((deadline, TransitStep::Advance(BoatPosition::in_chamber(chamber))));
        }
        let completion = TickId(now.0 + (ChamberId::ALL.len() as u64) * dwell_ticks);
        self.pending.push((completion, TransitStep::Complete));
    }

    /// Drop every pending transition.
    pub fn cancel(&mut self) {
        self.pending.clear();
    }

    /// Remove and return all transitions whose deadline has arrived,
    /// in schedule order.
    pub fn due(&mut self, now: TickId) -> Vec<TransitStep> {
        let mut fired = Vec::new();
        self.pending.retain(|&(deadline, step)| {
            if deadline <= now {
                fired.push(step);
                false
            } else {
                true
            }
        });
        fired
    }

    /// Whether any transition is still pending.
    pub fn is_active(&self) -> bool {
        !self.pending.is_empty()
    }
}
