//! Deterministic simulation harness for the Babel call coordinator.
//!
//! [`SimDriver`] implements [`babel_app::Driver`] with a virtual clock,
//! scripted media failures, and recorded outputs, so the production
//! [`babel_app::Runtime`] runs unchanged under test.
//!
//! # Model-Based Testing
//!
//! The `model` module provides arbitrary [`Operation`]s and a [`SimWorld`]
//! that applies them to a runtime backed by a `SimDriver`.
//!
//! # Invariant Testing
//!
//! The `invariants` module checks behavioral properties against a
//! [`CoordinatorSnapshot`] after every step. Use
//! [`InvariantRegistry::standard()`] for the full set.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod invariants;
pub mod model;
pub mod sim_driver;

pub use invariants::{
    ButtonInSync, CoordinatorSnapshot, DriverSnapshot, Invariant, InvariantRegistry, InvariantResult,
    MediaOwnership, OfflineMeansIdle, RosterPaneAlignment, SelfSlotPreserved, SessionSnapshot,
    SingleActiveCall, Violation,
};
pub use model::{Operation, SimWorld};
pub use sim_driver::{SimDriver, SimDriverError, SimInstant};
