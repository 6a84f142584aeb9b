//! Per-tick performance and event metrics.

/// Timing and event metrics collected during a single tick.
///
/// Durations are in microseconds. Per-tick fields describe the most
/// recent tick; the `*_total` fields are cumulative since engine
/// construction and feed the operator telemetry panel.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickMetrics {
    /// Wall-clock time for the entire tick, in microseconds.
    pub total_us: u64,
    /// Time spent in the physics sub-steps, in microseconds.
    pub physics_us: u64,
    /// Number of sequencer transitions fired this tick.
    pub sequencer_steps: u32,
    /// Whether this tick appended a history sample.
    pub history_sampled: bool,
    /// Whether the critical-level interlock cut the pump this tick.
    pub interlock_tripped: bool,
    /// Cumulative number of commands applied.
    pub commands_applied_total: u64,
    /// Cumulative number of commands rejected by validation.
    pub commands_rejected_total: u64,
    /// Cumulative number of automatic pump cutoffs.
    pub interlock_cutoffs_total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zero() {
        let m = TickMetrics::default();
        assert_eq!(m.total_us, 0);
        assert_eq!(m.physics_us, 0);
        assert_eq!(m.sequencer_steps, 0);
        assert!(!m.history_sampled);
        assert!(!m.interlock_tripped);
        assert_eq!(m.commands_applied_total, 0);
        assert_eq!(m.commands_rejected_total, 0);
        assert_eq!(m.interlock_cutoffs_total, 0);
    }
}
