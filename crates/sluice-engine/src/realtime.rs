//! User-facing realtime world and its shutdown state machine.
//!
//! The primary mode behind the dashboard: the tick engine runs on a
//! dedicated background thread at the configured rate, publishing an
//! owned snapshot per tick, while any number of reader threads poll the
//! snapshot ring without ever blocking a mutation.
//!
//! # Architecture
//!
//! ```text
//! User Thread(s)              Tick Thread
//!     |                           |
//!     |--submit_command()-------->| cmd_rx.try_recv()
//!     |   [cmd_tx: bounded(64)]   | engine.apply_command()
//!     |<--receipt via reply_tx----| engine.execute_tick()
//!     |                           | ring.push(snapshot)
//!     |                           | park_timeout(budget - elapsed)
//!     |                           |
//!     |--latest()/status()---> ring.latest()   (never blocks the tick)
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use sluice_core::{Command, Receipt};

use crate::config::{ConfigError, EngineConfig};
use crate::history::HistorySample;
use crate::ring::SnapshotRing;
use crate::snapshot::{ChamberReading, StatusSnapshot, WorldSnapshot};
use crate::tick::LockEngine;
use crate::tick_thread::{CommandRequest, TickThreadState};

/// Capacity of the bounded command channel into the tick thread.
const COMMAND_CHANNEL_CAPACITY: usize = 64;

// ── Error types ──────────────────────────────────────────────────

/// Error submitting a command to the tick thread.
#[derive(Debug, PartialEq, Eq)]
pub enum SubmitError {
    /// The tick thread has shut down.
    Shutdown,
    /// The command channel is full (back-pressure).
    ChannelFull,
}

impl std::fmt::Display for SubmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Shutdown => write!(f, "tick thread has shut down"),
            Self::ChannelFull => write!(f, "command channel full"),
        }
    }
}

impl std::error::Error for SubmitError {}

// ── ShutdownReport ───────────────────────────────────────────────

/// Report from the shutdown state machine.
#[derive(Debug)]
pub struct ShutdownReport {
    /// Total time spent in the shutdown sequence.
    pub total_ms: u64,
    /// Time spent waiting for the tick thread to acknowledge.
    pub drain_ms: u64,
    /// Whether the tick thread was joined successfully.
    pub tick_joined: bool,
}

// ── ShutdownState ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShutdownState {
    Running,
    Dropped,
}

// ── RealtimeWorld ────────────────────────────────────────────────

/// Realtime simulation world.
///
/// Runs the tick engine on a background thread and publishes one
/// [`WorldSnapshot`] per tick. Commands are submitted over a bounded
/// channel and applied atomically between ticks; the submitting thread
/// blocks only until the receipt comes back (at most one tick period).
pub struct RealtimeWorld {
    ring: Arc<SnapshotRing>,
    cmd_tx: Option<crossbeam_channel::Sender<CommandRequest>>,
    shutdown_flag: Arc<AtomicBool>,
    tick_stopped: Arc<AtomicBool>,
    tick_thread: Option<JoinHandle<LockEngine>>,
    state: ShutdownState,
}

impl RealtimeWorld {
    /// Create a new realtime world and spawn the tick thread.
    ///
    /// The `EngineConfig` is consumed: the [`LockEngine`] is moved into
    /// the tick thread.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let tick_rate_hz = config.resolved_tick_rate_hz();
        let ring_size = config.ring_buffer_size;

        let engine = LockEngine::new(config)?;

        let ring = Arc::new(SnapshotRing::new(ring_size));
        let shutdown_flag = Arc::new(AtomicBool::new(false));
        let tick_stopped = Arc::new(AtomicBool::new(false));

        let (cmd_tx, cmd_rx) = crossbeam_channel::bounded(COMMAND_CHANNEL_CAPACITY);

        let tick_ring = Arc::clone(&ring);
        let tick_shutdown = Arc::clone(&shutdown_flag);
        let tick_stopped_flag = Arc::clone(&tick_stopped);
        let tick_thread = thread::Builder::new()
            .name("sluice-tick".into())
            .spawn(move || {
                let state = TickThreadState::new(
                    engine,
                    tick_ring,
                    cmd_rx,
                    tick_shutdown,
                    tick_stopped_flag,
                    tick_rate_hz,
                );
                state.run()
            })
            .map_err(|e| ConfigError::ThreadSpawnFailed {
                reason: format!("tick thread: {e}"),
            })?;

        Ok(Self {
            ring,
            cmd_tx: Some(cmd_tx),
            shutdown_flag,
            tick_stopped,
            tick_thread: Some(tick_thread),
            state: ShutdownState::Running,
        })
    }

    /// Submit one command to be applied before the next tick.
    ///
    /// Blocks until the tick thread returns the receipt, which arrives
    /// within one tick period. The receipt's `accepted` flag carries
    /// validation rejections (for example pump-on while critical).
    pub fn submit_command(&self, command: Command) -> Result<Receipt, SubmitError> {
        let cmd_tx = self.cmd_tx.as_ref().ok_or(SubmitError::Shutdown)?;

        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        let request = CommandRequest {
            command,
            reply: reply_tx,
        };

        cmd_tx.try_send(request).map_err(|e| match e {
            crossbeam_channel::TrySendError::Full(_) => SubmitError::ChannelFull,
            crossbeam_channel::TrySendError::Disconnected(_) => SubmitError::Shutdown,
        })?;

        // Wake the tick thread out of its budget sleep so the command
        // applies promptly instead of waiting out the full period.
        if let Some(handle) = &self.tick_thread {
            handle.thread().unpark();
        }

        reply_rx.recv().map_err(|_| SubmitError::Shutdown)
    }

    /// Get the latest published snapshot directly from the ring.
    pub fn latest(&self) -> Option<Arc<WorldSnapshot>> {
        self.ring.latest()
    }

    /// Control-state portion of the latest snapshot.
    pub fn status(&self) -> Option<StatusSnapshot> {
        self.latest().map(|snap| snap.status.clone())
    }

    /// Chamber readings from the latest snapshot.
    pub fn levels(&self) -> Option<[ChamberReading; sluice_core::CHAMBER_COUNT]> {
        self.latest().map(|snap| snap.chambers.clone())
    }

    /// History contents from the latest snapshot, oldest first.
    pub fn history(&self) -> Option<Vec<HistorySample>> {
        self.latest().map(|snap| snap.history.clone())
    }

    /// Shutdown the world.
    ///
    /// 1. Set the shutdown flag and unpark the tick thread — it wakes
    ///    from any budget sleep immediately.
    /// 2. Wait (bounded) for the tick thread to acknowledge.
    /// 3. Drop the command channel and join the thread.
    pub fn shutdown(&mut self) -> ShutdownReport {
        if self.state == ShutdownState::Dropped {
            return ShutdownReport {
                total_ms: 0,
                drain_ms: 0,
                tick_joined: true,
            };
        }

        let start = Instant::now();
        self.shutdown_flag.store(true, Ordering::Release);

        if let Some(handle) = &self.tick_thread {
            handle.thread().unpark();
        }

        let drain_deadline = Instant::now() + Duration::from_millis(100);
        while !self.tick_stopped.load(Ordering::Acquire) {
            if Instant::now() > drain_deadline {
                break;
            }
            thread::yield_now();
        }
        let drain_ms = start.elapsed().as_millis() as u64;

        // Dropping the sender disconnects any submitter still waiting.
        self.cmd_tx.take();

        self.state = ShutdownState::Dropped;
        let tick_joined = match self.tick_thread.take() {
            Some(handle) => handle.join().is_ok(),
            None => true,
        };

        ShutdownReport {
            total_ms: start.elapsed().as_millis() as u64,
            drain_ms,
            tick_joined,
        }
    }
}

impl Drop for RealtimeWorld {
    fn drop(&mut self) {
        if self.state != ShutdownState::Dropped {
            self.shutdown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sluice_core::OperationalState;

    fn test_config() -> EngineConfig {
        // Fast ticks so tests don't wait out 500 ms periods.
        EngineConfig {
            tick_rate_hz: Some(200.0),
            prewarm_history: false,
            ..EngineConfig::default()
        }
    }

    fn wait_for_snapshot(world: &RealtimeWorld) -> Arc<WorldSnapshot> {
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            if let Some(snap) = world.latest() {
                return snap;
            }
            if Instant::now() > deadline {
                panic!("no snapshot produced within 2s");
            }
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn lifecycle_start_and_shutdown() {
        let mut world = RealtimeWorld::new(test_config()).unwrap();
        let snap = wait_for_snapshot(&world);
        assert!(snap.status.tick.0 >= 1);

        let report = world.shutdown();
        assert!(report.tick_joined);
    }

    #[test]
    fn submit_command_round_trips() {
        let mut world = RealtimeWorld::new(test_config()).unwrap();
        wait_for_snapshot(&world);

        let receipt = world.submit_command(Command::StartTransit).unwrap();
        assert!(receipt.accepted);

        // The next published snapshot must reflect the command.
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            let snap = wait_for_snapshot(&world);
            if snap.status.state == OperationalState::Transit {
                assert_eq!(snap.status.boat_position.value(), 1);
                break;
            }
            if Instant::now() > deadline {
                panic!("transit state never published");
            }
            thread::sleep(Duration::from_millis(5));
        }

        world.shutdown();
    }

    #[test]
    fn submit_after_shutdown_reports_shutdown() {
        let mut world = RealtimeWorld::new(test_config()).unwrap();
        world.shutdown();
        assert_eq!(
            world.submit_command(Command::TogglePump),
            Err(SubmitError::Shutdown)
        );
    }

    #[test]
    fn drop_triggers_shutdown() {
        let world = RealtimeWorld::new(test_config()).unwrap();
        thread::sleep(Duration::from_millis(20));
        drop(world);
        // If this doesn't hang, shutdown worked.
    }

    #[test]
    fn shutdown_budget() {
        let mut world = RealtimeWorld::new(test_config()).unwrap();
        thread::sleep(Duration::from_millis(50));

        let report = world.shutdown();
        assert!(
            report.total_ms < 2000,
            "shutdown took too long: {}ms",
            report.total_ms
        );
    }

    /// With a very slow tick rate, shutdown must still complete within
    /// the documented budget: the budget sleep uses `park_timeout`, so
    /// the shutdown unpark interrupts it instead of waiting out the
    /// full period.
    #[test]
    fn shutdown_fast_with_slow_tick_rate() {
        let config = EngineConfig {
            tick_rate_hz: Some(0.5), // 2-second tick budget
            ..test_config()
        };
        let mut world = RealtimeWorld::new(config).unwrap();
        wait_for_snapshot(&world);

        // Give the tick thread time to enter its budget sleep.
        thread::sleep(Duration::from_millis(50));

        let start = Instant::now();
        let report = world.shutdown();
        let wall_ms = start.elapsed().as_millis();
        assert!(
            wall_ms < 500,
            "shutdown took {wall_ms}ms with 0.5Hz tick rate \
             (report: total={}ms, drain={}ms)",
            report.total_ms,
            report.drain_ms
        );
        assert!(report.tick_joined);
    }

    #[test]
    fn concurrent_readers_never_block() {
        let world = Arc::new(RealtimeWorld::new(test_config()).unwrap());
        wait_for_snapshot(&world);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let w = Arc::clone(&world);
                thread::spawn(move || {
                    for _ in 0..50 {
                        if let Some(snap) = w.latest() {
                            assert_eq!(snap.chambers.len(), 4);
                        }
                        thread::yield_now();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        drop(world);
    }
}
