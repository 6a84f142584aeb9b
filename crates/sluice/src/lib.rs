//! Sluice: the simulation engine behind a canal-lock control dashboard.
//!
//! This is the top-level facade crate that re-exports the public API
//! from the Sluice sub-crates. For most users, adding `sluice` as a
//! single dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use sluice::prelude::*;
//!
//! // Build a deterministic engine: the seed fixes every stochastic
//! // physics step, so this trajectory replays bit-for-bit.
//! let config = EngineConfig {
//!     seed: 42,
//!     ..EngineConfig::default()
//! };
//! let mut engine = LockEngine::new(config).unwrap();
//!
//! // Open the valve between chambers 1 and 2 and let them equalize.
//! let valve = ValveId::new(0).unwrap();
//! let receipt = engine.apply_command(Command::ToggleValve(valve));
//! assert!(receipt.accepted);
//!
//! engine.execute_tick();
//! let levels = engine.levels();
//! assert_eq!(levels[0], 21.0); // moved toward chamber 2 by the capped flow
//! assert_eq!(levels[1], 44.0);
//!
//! // Read-only projections for the dashboard.
//! let status = engine.status();
//! assert_eq!(status.state, OperationalState::Idle);
//! let readings = engine.readings();
//! assert_eq!(readings[0].name, "Chamber 1 (Entry)");
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in
//! the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `sluice-core` | IDs, commands, receipts, state enums |
//! | [`engine`] | `sluice-engine` | Engines (lockstep and realtime), config, snapshots, history |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, commands, and IDs (`sluice-core`).
///
/// Contains the chamber/valve/tick identifiers, the operator command
/// vocabulary with receipts, rejection reasons, and the state enums.
pub use sluice_core as types;

/// Simulation engines (`sluice-engine`).
///
/// [`engine::LockEngine`] for synchronous stepping (tests, tools),
/// [`engine::RealtimeWorld`] for autonomous background ticking behind
/// a dashboard.
pub use sluice_engine as engine;

/// Common imports for typical Sluice usage.
///
/// ```rust
/// use sluice::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use sluice_core::{
        BoatPosition, ChamberId, ChamberStatus, Command, OperationalState, Receipt, RejectReason,
        TickId, ValveId, CHAMBER_COUNT, VALVE_COUNT,
    };

    // Engine
    pub use sluice_engine::{
        ChamberReading, ConfigError, EngineConfig, HistorySample, InterlockEvent, LockEngine,
        RealtimeWorld, StatusSnapshot, SubmitError, TickMetrics, TickResult, WorldSnapshot,
    };
}
