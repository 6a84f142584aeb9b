//! Engine configuration, validation, and error types.
//!
//! [`EngineConfig`] is the single input for constructing a simulation
//! engine. [`validate()`](EngineConfig::validate) checks structural
//! invariants at startup so the tick loop never has to.

use std::error::Error;
use std::fmt;

use sluice_core::{ChamberId, CHAMBER_COUNT};

/// Lowest representable chamber fill level, in percent.
pub const LEVEL_MIN: f64 = 0.0;

/// Highest representable chamber fill level, in percent.
pub const LEVEL_MAX: f64 = 100.0;

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`EngineConfig::validate()`].
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// `dt_s` is NaN, infinite, zero, or negative.
    InvalidTickPeriod {
        /// The invalid value.
        value: f64,
    },
    /// `tick_rate_hz` is NaN, infinite, zero, negative, or so small its
    /// reciprocal overflows.
    InvalidTickRate {
        /// The invalid value.
        value: f64,
    },
    /// `chamber_dwell_s` is NaN, infinite, zero, or negative.
    InvalidDwell {
        /// The invalid value.
        value: f64,
    },
    /// An initial chamber level lies outside `[0, 100]`.
    InvalidInitialLevel {
        /// The offending chamber.
        chamber: ChamberId,
        /// The out-of-range value.
        value: f64,
    },
    /// The reset level lies outside `[0, 100]`.
    InvalidResetLevel {
        /// The out-of-range value.
        value: f64,
    },
    /// The equalization dead-band is negative or not finite.
    InvalidDeadBand {
        /// The invalid value.
        value: f64,
    },
    /// A rate parameter is invalid for the stated reason.
    InvalidRate {
        /// Which parameter failed.
        what: &'static str,
        /// The invalid value.
        value: f64,
    },
    /// The low/critical thresholds are out of order or out of range.
    InvalidThresholds {
        /// The configured low-level threshold.
        low: f64,
        /// The configured critical-level threshold.
        critical: f64,
    },
    /// The history sampling probability lies outside `[0, 1]`.
    InvalidSampleProbability {
        /// The out-of-range value.
        value: f64,
    },
    /// The history ring capacity is below the minimum of 2.
    HistoryTooSmall {
        /// The configured capacity that was too small.
        configured: usize,
    },
    /// The snapshot publish ring is below the minimum of 2.
    RingBufferTooSmall {
        /// The configured size that was too small.
        configured: usize,
    },
    /// A background thread could not be spawned.
    ThreadSpawnFailed {
        /// Description of which thread failed.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTickPeriod { value } => {
                write!(f, "dt_s must be finite and positive, got {value}")
            }
            Self::InvalidTickRate { value } => {
                write!(f, "tick_rate_hz must be finite and positive, got {value}")
            }
            Self::InvalidDwell { value } => {
                write!(f, "chamber_dwell_s must be finite and positive, got {value}")
            }
            Self::InvalidInitialLevel { chamber, value } => {
                write!(
                    f,
                    "initial level for chamber {chamber} must be in [0, 100], got {value}"
                )
            }
            Self::InvalidResetLevel { value } => {
                write!(f, "reset_level must be in [0, 100], got {value}")
            }
            Self::InvalidDeadBand { value } => {
                write!(f, "dead_band must be finite and >= 0, got {value}")
            }
            Self::InvalidRate { what, value } => {
                write!(f, "{what} is invalid: {value}")
            }
            Self::InvalidThresholds { low, critical } => {
                write!(
                    f,
                    "thresholds must satisfy 0 <= low < critical <= 100, got low {low} / critical {critical}"
                )
            }
            Self::InvalidSampleProbability { value } => {
                write!(
                    f,
                    "history_sample_probability must be in [0, 1], got {value}"
                )
            }
            Self::HistoryTooSmall { configured } => {
                write!(f, "history_capacity {configured} is below minimum of 2")
            }
            Self::RingBufferTooSmall { configured } => {
                write!(f, "ring_buffer_size {configured} is below minimum of 2")
            }
            Self::ThreadSpawnFailed { reason } => {
                write!(f, "thread spawn failed: {reason}")
            }
        }
    }
}

impl Error for ConfigError {}

// ── EngineConfig ───────────────────────────────────────────────────

/// Complete configuration for constructing a simulation engine.
///
/// Defaults reproduce the dashboard's design values: a 500 ms tick,
/// initial levels `[20, 45, 60, 10]`, a 0.5 %-point equalization
/// dead-band, 1 %-point/tick maximum transfer, and a 100-sample history
/// ring sampled with probability 0.2 per tick.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Simulation timestep in seconds.
    pub dt_s: f64,
    /// RNG seed for deterministic replay of the stochastic physics.
    pub seed: u64,
    /// Initial fill level of each chamber, in percent.
    pub initial_levels: [f64; CHAMBER_COUNT],
    /// Equalization dead-band in %-points: level differences at or below
    /// this are left alone to prevent oscillation.
    pub dead_band: f64,
    /// Maximum %-points moved through one open valve per tick.
    pub max_transfer_rate: f64,
    /// Level at or above which a chamber is critical, in percent.
    pub critical_level: f64,
    /// Level below which a chamber reads as draining, in percent.
    pub low_level: f64,
    /// Upper bound on the per-chamber pump fill increment per tick.
    pub max_fill_rate: f64,
    /// Upper bound on the per-chamber transit drain decrement per tick.
    pub max_drain_rate: f64,
    /// Full span of the zero-mean ambient drift perturbation per tick.
    pub drift_span: f64,
    /// Level every chamber is set to by `RESET_CYCLE`, in percent.
    pub reset_level: f64,
    /// Seconds the boat dwells in each chamber during a transit.
    pub chamber_dwell_s: f64,
    /// Number of samples retained in the history ring. Minimum: 2.
    pub history_capacity: usize,
    /// Probability that any given tick appends a history sample.
    pub history_sample_probability: f64,
    /// Fill the history ring with synthetic pre-start samples at
    /// construction so trend charts start full.
    pub prewarm_history: bool,
    /// Number of snapshots retained in the realtime publish ring.
    /// Minimum: 2.
    pub ring_buffer_size: usize,
    /// Target tick rate for realtime mode. `None` paces at `1 / dt_s`.
    pub tick_rate_hz: Option<f64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dt_s: 0.5,
            seed: 0,
            initial_levels: [20.0, 45.0, 60.0, 10.0],
            dead_band: 0.5,
            max_transfer_rate: 1.0,
            critical_level: 90.0,
            low_level: 10.0,
            max_fill_rate: 2.0,
            max_drain_rate: 1.0,
            drift_span: 0.5,
            reset_level: 20.0,
            chamber_dwell_s: 5.0,
            history_capacity: 100,
            history_sample_probability: 0.2,
            prewarm_history: true,
            ring_buffer_size: 8,
            tick_rate_hz: None,
        }
    }
}

impl EngineConfig {
    /// Validate all structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.dt_s.is_finite() || self.dt_s <= 0.0 {
            return Err(ConfigError::InvalidTickPeriod { value: self.dt_s });
        }
        // Reject rates whose reciprocal is not finite (subnormals would
        // panic in Duration::from_secs_f64).
        if let Some(hz) = self.tick_rate_hz {
            if !hz.is_finite() || hz <= 0.0 || !(1.0 / hz).is_finite() {
                return Err(ConfigError::InvalidTickRate { value: hz });
            }
        }
        if !self.chamber_dwell_s.is_finite() || self.chamber_dwell_s <= 0.0 {
            return Err(ConfigError::InvalidDwell {
                value: self.chamber_dwell_s,
            });
        }
        for chamber in ChamberId::ALL {
            let value = self.initial_levels[chamber.index()];
            if !value.is_finite() || !(LEVEL_MIN..=LEVEL_MAX).contains(&value) {
                return Err(ConfigError::InvalidInitialLevel { chamber, value });
            }
        }
        if !self.reset_level.is_finite() || !(LEVEL_MIN..=LEVEL_MAX).contains(&self.reset_level) {
            return Err(ConfigError::InvalidResetLevel {
                value: self.reset_level,
            });
        }
        if !self.dead_band.is_finite() || self.dead_band < 0.0 {
            return Err(ConfigError::InvalidDeadBand {
                value: self.dead_band,
            });
        }
        if !self.max_transfer_rate.is_finite() || self.max_transfer_rate <= 0.0 {
            return Err(ConfigError::InvalidRate {
                what: "max_transfer_rate must be finite and positive",
                value: self.max_transfer_rate,
            });
        }
        for (what, value) in [
            ("max_fill_rate must be finite and >= 0", self.max_fill_rate),
            ("max_drain_rate must be finite and >= 0", self.max_drain_rate),
            ("drift_span must be finite and >= 0", self.drift_span),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidRate { what, value });
            }
        }
        if !self.low_level.is_finite()
            || !self.critical_level.is_finite()
            || self.low_level < LEVEL_MIN
            || self.low_level >= self.critical_level
            || self.critical_level > LEVEL_MAX
        {
            return Err(ConfigError::InvalidThresholds {
                low: self.low_level,
                critical: self.critical_level,
            });
        }
        if !self.history_sample_probability.is_finite()
            || !(0.0..=1.0).contains(&self.history_sample_probability)
        {
            return Err(ConfigError::InvalidSampleProbability {
                value: self.history_sample_probability,
            });
        }
        if self.history_capacity < 2 {
            return Err(ConfigError::HistoryTooSmall {
                configured: self.history_capacity,
            });
        }
        if self.ring_buffer_size < 2 {
            return Err(ConfigError::RingBufferTooSmall {
                configured: self.ring_buffer_size,
            });
        }
        Ok(())
    }

    /// Number of ticks the boat dwells in each chamber, at least 1.
    pub fn dwell_ticks(&self) -> u64 {
        ((self.chamber_dwell_s / self.dt_s).round() as u64).max(1)
    }

    /// The realtime pacing rate: configured `tick_rate_hz`, or `1 / dt_s`.
    pub fn resolved_tick_rate_hz(&self) -> f64 {
        self.tick_rate_hz.unwrap_or(1.0 / self.dt_s)
    }
}
