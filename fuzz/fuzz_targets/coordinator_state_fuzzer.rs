//! Fuzz target for the call coordinator state machine
//!
//! # Strategy
//!
//! - Connect, list a few contacts, then apply an arbitrary operation sequence
//!   through the production runtime over the simulated driver
//! - Operations mix user intents, signaling events, scripted media failures
//!   and clock advances, so reconnect timers and stale media results fire
//!
//! # Invariants
//!
//! - Every standard invariant holds after every operation
//! - At most one stream runs, and only for the active session
//! - The driver never fails (the simulated channel is never closed)

#![no_main]

use babel_harness::{InvariantRegistry, Operation, SimWorld};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|ops: Vec<Operation>| {
    let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
    let invariants = InvariantRegistry::standard();

    runtime.block_on(async {
        let mut world = SimWorld::new();
        world.connect_with(&[1, 2, 3, 4, 5]).await.unwrap();

        for op in &ops {
            world.apply(op).await.unwrap();
            invariants.assert_all(&world.snapshot(), &format!("after {op:?}"));
        }
    });
});
