//! Simulation engine driving the Sluice lock-control process model.
//!
//! Provides the lockstep [`LockEngine`] (a callable struct: one
//! `execute_tick()` per call, commands applied synchronously between
//! ticks) and the [`RealtimeWorld`] wrapper (a background tick thread
//! paced at the configured rate, publishing owned snapshots to a
//! multi-consumer ring).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod history;
pub mod metrics;
mod physics;
pub mod realtime;
pub mod ring;
mod sequencer;
pub mod snapshot;
pub mod tick;
mod tick_thread;

pub use config::{ConfigError, EngineConfig, LEVEL_MAX, LEVEL_MIN};
pub use history::{HistoryRing, HistorySample};
pub use metrics::TickMetrics;
pub use realtime::{RealtimeWorld, ShutdownReport, SubmitError};
pub use ring::SnapshotRing;
pub use snapshot::{ChamberReading, InterlockEvent, StatusSnapshot, WorldSnapshot};
pub use tick::{LockEngine, TickResult};
