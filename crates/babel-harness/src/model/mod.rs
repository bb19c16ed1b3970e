//! Model-based testing support.
//!
//! [`Operation`]s are generated by proptest or the fuzzer and applied to a
//! [`SimWorld`], which runs the production runtime over a [`crate::SimDriver`]
//! and checks invariants after every step.

mod operation;
mod world;

pub use operation::{ModelPeer, Operation, PEER_SPACE, contact};
pub use world::SimWorld;
