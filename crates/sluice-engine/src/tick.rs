//! Lockstep tick engine: the single-threaded simulation core.
//!
//! [`LockEngine`] owns all simulation state — chamber levels, actuator
//! booleans, operational state, transit schedule, history ring, and the
//! seeded RNG — and executes ticks synchronously. Commands and ticks
//! both take `&mut self`, so no tick can interleave mid-command.
//!
//! # Lockstep mode only
//!
//! This module is the callable-struct mode with no background threads.
//! [`RealtimeWorld`](crate::RealtimeWorld) wraps it in a paced tick
//! thread with a snapshot ring.

use std::time::{Instant, SystemTime};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use sluice_core::{
    BoatPosition, ChamberId, Command, OperationalState, Receipt, RejectReason, TickId,
    CHAMBER_COUNT, VALVE_COUNT,
};

use crate::config::{ConfigError, EngineConfig};
use crate::history::{HistoryRing, HistorySample};
use crate::metrics::TickMetrics;
use crate::physics;
use crate::sequencer::{TransitSchedule, TransitStep};
use crate::snapshot::{
    chamber_name, chamber_status, ChamberReading, InterlockEvent, StatusSnapshot, WorldSnapshot,
};

/// Upper bound on the random jitter added to pre-warm history samples,
/// in %-points.
const PREWARM_JITTER: f64 = 5.0;

// ── TickResult ───────────────────────────────────────────────────

/// Result of one [`LockEngine::execute_tick()`] call.
#[derive(Clone, Debug)]
pub struct TickResult {
    /// Metrics for this tick.
    pub metrics: TickMetrics,
    /// The interlock trip, if the pump was cut this tick.
    pub interlock: Option<InterlockEvent>,
}

// ── LockEngine ───────────────────────────────────────────────────

/// Single-threaded simulation engine for the lock chain.
///
/// Construct with [`new()`](LockEngine::new), mutate with
/// [`apply_command()`](LockEngine::apply_command) and
/// [`execute_tick()`](LockEngine::execute_tick), read through the
/// snapshot projections. All randomness comes from a seeded ChaCha8
/// generator: identical seeds and command sequences replay identical
/// trajectories.
pub struct LockEngine {
    config: EngineConfig,
    dwell_ticks: u64,
    levels: [f64; CHAMBER_COUNT],
    pump_active: bool,
    valves: [bool; VALVE_COUNT],
    state: OperationalState,
    boat_position: BoatPosition,
    schedule: TransitSchedule,
    history: HistoryRing,
    rng: ChaCha8Rng,
    current_tick: TickId,
    last_interlock: Option<InterlockEvent>,
    commands_applied: u64,
    commands_rejected: u64,
    interlock_cutoffs: u64,
    last_metrics: TickMetrics,
}

impl LockEngine {
    /// Construct a new engine from a validated configuration.
    ///
    /// Consumes the `EngineConfig`. When `prewarm_history` is set, the
    /// history ring is filled with synthetic pre-start samples (initial
    /// levels plus a small random offset) so trend charts start full.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let mut history = HistoryRing::new(config.history_capacity);

        if config.prewarm_history && config.history_sample_probability > 0.0 {
            let interval_s = config.dt_s / config.history_sample_probability;
            for i in 0..config.history_capacity {
                let age_s = (config.history_capacity - i) as f64 * interval_s;
                let mut levels = config.initial_levels;
                for level in levels.iter_mut() {
                    *level =
                        physics::clamp_level(*level + rng.random::<f64>() * PREWARM_JITTER);
                }
                history.push(HistorySample {
                    tick: TickId(0),
                    sim_time_s: -age_s,
                    levels,
                });
            }
        }

        Ok(Self {
            dwell_ticks: config.dwell_ticks(),
            levels: config.initial_levels,
            pump_active: false,
            valves: [false; VALVE_COUNT],
            state: OperationalState::Idle,
            boat_position: BoatPosition::OUTSIDE,
            schedule: TransitSchedule::new(),
            history,
            rng,
            current_tick: TickId(0),
            last_interlock: None,
            commands_applied: 0,
            commands_rejected: 0,
            interlock_cutoffs: 0,
            last_metrics: TickMetrics::default(),
            config,
        })
    }

    // ── Command processor ────────────────────────────────────────

    /// Validate and apply one operator command.
    ///
    /// Commands are atomic with respect to ticks: this method and
    /// [`execute_tick()`](LockEngine::execute_tick) both take
    /// `&mut self`. Rejections come back as refused receipts with the
    /// state unchanged; no command panics or aborts the engine.
    pub fn apply_command(&mut self, command: Command) -> Receipt {
        let tick = self.current_tick;
        let receipt = match command {
            Command::TogglePump => {
                if self.pump_active {
                    // Turning off is always allowed.
                    self.pump_active = false;
                    Receipt::applied(command, tick)
                } else if let Some((chamber, level)) =
                    physics::first_critical(&self.levels, self.config.critical_level)
                {
                    Receipt::rejected(command, RejectReason::PumpInterlocked { chamber, level })
                } else {
                    self.pump_active = true;
                    Receipt::applied(command, tick)
                }
            }
            Command::ToggleValve(valve) => {
                self.valves[valve.index()] = !self.valves[valve.index()];
                Receipt::applied(command, tick)
            }
            Command::StartTransit => {
                self.state = OperationalState::Transit;
                self.boat_position = BoatPosition::in_chamber(ChamberId::ALL[0]);
                self.schedule.start(tick, self.dwell_ticks);
                Receipt::applied(command, tick)
            }
            Command::StopEmergency => {
                self.state = OperationalState::Emergency;
                self.pump_active = false;
                self.valves = [false; VALVE_COUNT];
                self.schedule.cancel();
                Receipt::applied(command, tick)
            }
            Command::ResetCycle => {
                self.state = OperationalState::Idle;
                self.boat_position = BoatPosition::OUTSIDE;
                self.pump_active = false;
                self.valves = [false; VALVE_COUNT];
                self.levels = [self.config.reset_level; CHAMBER_COUNT];
                self.schedule.cancel();
                Receipt::applied(command, tick)
            }
        };
        if receipt.accepted {
            self.commands_applied += 1;
        } else {
            self.commands_rejected += 1;
        }
        receipt
    }

    // ── Tick execution ───────────────────────────────────────────

    /// Execute one tick: fire due sequencer transitions, run the physics
    /// sub-steps in their fixed order, and maybe append a history sample.
    pub fn execute_tick(&mut self) -> TickResult {
        let tick_start = Instant::now();
        let next = TickId(self.current_tick.0 + 1);
        self.current_tick = next;

        // 1. Fire due transit transitions. The schedule is empty unless
        // a transit is underway, and state-overriding commands cancel it.
        let mut sequencer_steps = 0u32;
        for step in self.schedule.due(next) {
            sequencer_steps += 1;
            match step {
                TransitStep::Advance(position) => self.boat_position = position,
                TransitStep::Complete => {
                    self.state = OperationalState::Idle;
                    self.boat_position = BoatPosition::OUTSIDE;
                }
            }
        }

        // 2. Physics sub-steps, fixed order.
        let physics_start = Instant::now();

        // 2a. Critical-level interlock.
        let interlock = physics::interlock(
            &self.levels,
            &mut self.pump_active,
            self.config.critical_level,
            next,
        );
        if let Some(event) = interlock {
            self.last_interlock = Some(event);
            self.interlock_cutoffs += 1;
        }

        // 2b. Valve-driven equalization, valves 0..2 sequentially.
        physics::equalize(
            &mut self.levels,
            &self.valves,
            self.config.dead_band,
            self.config.max_transfer_rate,
        );

        // 2c. Pump effect. The interlock above already dropped the pump
        // on a critical tick, so fill never runs in the same tick as a
        // cutoff.
        if self.pump_active
            && physics::first_critical(&self.levels, self.config.critical_level).is_none()
        {
            physics::pump_fill(&mut self.levels, self.config.max_fill_rate, &mut self.rng);
        }

        // 2d. Transit drain.
        if self.state == OperationalState::Transit && !self.pump_active {
            physics::transit_drain(&mut self.levels, self.config.max_drain_rate, &mut self.rng);
        }

        // 2e. Ambient drift, only when nothing else governs the dynamics.
        if !self.pump_active
            && !self.valves.iter().any(|&open| open)
            && self.state != OperationalState::Transit
        {
            physics::ambient_drift(&mut self.levels, self.config.drift_span, &mut self.rng);
        }

        let physics_us = physics_start.elapsed().as_micros() as u64;

        // 3. Probabilistic history sampling.
        let history_sampled =
            self.rng.random::<f64>() < self.config.history_sample_probability;
        if history_sampled {
            self.history.push(HistorySample {
                tick: next,
                sim_time_s: next.0 as f64 * self.config.dt_s,
                levels: self.levels,
            });
        }

        // 4. Metrics.
        let metrics = TickMetrics {
            total_us: tick_start.elapsed().as_micros() as u64,
            physics_us,
            sequencer_steps,
            history_sampled,
            interlock_tripped: interlock.is_some(),
            commands_applied_total: self.commands_applied,
            commands_rejected_total: self.commands_rejected,
            interlock_cutoffs_total: self.interlock_cutoffs,
        };
        self.last_metrics = metrics.clone();

        TickResult { metrics, interlock }
    }

    // ── Accessors ────────────────────────────────────────────────

    /// Current tick ID.
    pub fn current_tick(&self) -> TickId {
        self.current_tick
    }

    /// Simulation time in seconds (`tick * dt`).
    pub fn sim_time_s(&self) -> f64 {
        self.current_tick.0 as f64 * self.config.dt_s
    }

    /// Current operational state.
    pub fn state(&self) -> OperationalState {
        self.state
    }

    /// Current boat position.
    pub fn boat_position(&self) -> BoatPosition {
        self.boat_position
    }

    /// Whether the shared feed pump is running.
    pub fn pump_active(&self) -> bool {
        self.pump_active
    }

    /// Open/closed state of the three valves, chain order.
    pub fn valves(&self) -> [bool; VALVE_COUNT] {
        self.valves
    }

    /// Raw chamber levels in percent, chain order.
    pub fn levels(&self) -> [f64; CHAMBER_COUNT] {
        self.levels
    }

    /// The RNG seed this engine was constructed with.
    pub fn seed(&self) -> u64 {
        self.config.seed
    }

    /// Metrics from the most recent tick.
    pub fn last_metrics(&self) -> &TickMetrics {
        &self.last_metrics
    }

    // ── Snapshot projections ─────────────────────────────────────

    /// Control-state snapshot: state, boat, actuators, last interlock.
    pub fn status(&self) -> StatusSnapshot {
        StatusSnapshot {
            state: self.state,
            boat_position: self.boat_position,
            pump_active: self.pump_active,
            valves: self.valves,
            tick: self.current_tick,
            last_updated: SystemTime::now(),
            last_interlock: self.last_interlock,
        }
    }

    /// Per-chamber readings with the display status derived on read.
    pub fn readings(&self) -> [ChamberReading; CHAMBER_COUNT] {
        ChamberId::ALL.map(|id| {
            let level = self.levels[id.index()];
            ChamberReading {
                id,
                name: chamber_name(id),
                level,
                status: chamber_status(
                    level,
                    self.pump_active,
                    self.config.critical_level,
                    self.config.low_level,
                ),
            }
        })
    }

    /// History ring contents, oldest first.
    pub fn history(&self) -> Vec<HistorySample> {
        self.history.oldest_first()
    }

    /// Complete owned snapshot for publication to readers.
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            status: self.status(),
            chambers: self.readings(),
            history: self.history(),
        }
    }
}
