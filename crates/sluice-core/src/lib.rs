//! Core types for the Sluice lock-control simulation.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental vocabulary shared across the workspace: strongly-typed
//! identifiers, the operator command set with receipts, rejection reasons,
//! and the operational/chamber state enums.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod command;
pub mod error;
pub mod id;
pub mod state;

pub use command::{Command, Receipt};
pub use error::RejectReason;
pub use id::{BoatPosition, ChamberId, TickId, ValveId, CHAMBER_COUNT, VALVE_COUNT};
pub use state::{ChamberStatus, OperationalState};
