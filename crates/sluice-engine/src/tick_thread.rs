//! Tick loop and command channel draining for realtime mode.
//!
//! The tick thread owns [`LockEngine`] exclusively (moved in via
//! `thread::spawn`). No locks on the hot path — commands arrive via a
//! bounded crossbeam channel and receipts go back via per-request
//! oneshot channels, so command application stays serialized with tick
//! execution on a single thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;

use sluice_core::{Command, Receipt};

use crate::ring::SnapshotRing;
use crate::tick::LockEngine;

/// A command submitted by a user thread, paired with a reply channel
/// for the resulting receipt.
pub(crate) struct CommandRequest {
    pub command: Command,
    pub reply: crossbeam_channel::Sender<Receipt>,
}

/// State held by the tick thread's main loop.
pub(crate) struct TickThreadState {
    engine: LockEngine,
    ring: Arc<SnapshotRing>,
    cmd_rx: Receiver<CommandRequest>,
    shutdown_flag: Arc<AtomicBool>,
    tick_stopped: Arc<AtomicBool>,
    tick_budget: Duration,
}

impl TickThreadState {
    /// Create a new tick thread state.
    pub fn new(
        engine: LockEngine,
        ring: Arc<SnapshotRing>,
        cmd_rx: Receiver<CommandRequest>,
        shutdown_flag: Arc<AtomicBool>,
        tick_stopped: Arc<AtomicBool>,
        tick_rate_hz: f64,
    ) -> Self {
        Self {
            engine,
            ring,
            cmd_rx,
            shutdown_flag,
            tick_stopped,
            tick_budget: Duration::from_secs_f64(1.0 / tick_rate_hz),
        }
    }

    /// Main tick loop. Runs until `shutdown_flag` is set.
    ///
    /// Consumes self and returns the [`LockEngine`] so the caller can
    /// inspect final state after a join.
    pub fn run(mut self) -> LockEngine {
        loop {
            if self.shutdown_flag.load(Ordering::Acquire) {
                break;
            }

            let tick_start = Instant::now();

            // 1. Drain pending commands. Each applies atomically before
            // the tick; the receipt unblocks the submitting thread.
            self.drain_command_channel();

            // 2. Execute the tick and publish the snapshot.
            self.engine.execute_tick();
            self.ring.push(self.engine.snapshot());

            // 3. Sleep for the remaining budget. park_timeout instead of
            // thread::sleep so shutdown's unpark() wakes us immediately
            // even at slow tick rates.
            let elapsed = tick_start.elapsed();
            if let Some(remaining) = self.tick_budget.checked_sub(elapsed) {
                std::thread::park_timeout(remaining);
            }
        }

        // Drain once more so submitters blocked on a receipt are not
        // stranded by shutdown.
        self.drain_command_channel();

        self.tick_stopped.store(true, Ordering::Release);
        self.engine
    }

    /// Drain all pending command requests from the channel.
    fn drain_command_channel(&mut self) {
        while let Ok(request) = self.cmd_rx.try_recv() {
            let receipt = self.engine.apply_command(request.command);
            // Best-effort reply — the caller may have dropped its receiver.
            let _ = request.reply.send(receipt);
        }
    }
}
