//! Property-based tests for the call coordinator.
//!
//! Random operation sequences run through the production runtime over a
//! simulated driver. Invariants are checked after every operation.

use babel_client::{SignalingCommand, UserIntent};
use babel_core::SessionId;
use babel_harness::{InvariantRegistry, Operation, SimWorld};
use proptest::prelude::*;

const CONTACTS: [u32; 5] = [1, 2, 3, 4, 5];

fn peer() -> impl Strategy<Value = u8> {
    0u8..8
}

fn status() -> impl Strategy<Value = u8> {
    0u8..4
}

/// Weighted towards call traffic so sessions actually reach media.
fn operation_strategy() -> impl Strategy<Value = Operation> {
    prop_oneof![
        4 => peer().prop_map(|peer| Operation::PlaceCall { peer }),
        2 => peer().prop_map(|peer| Operation::AcceptCall { peer }),
        1 => peer().prop_map(|peer| Operation::DeclineCall { peer }),
        2 => Just(Operation::HangUp),
        1 => any::<u8>().prop_map(|session| Operation::EndCall { session }),
        2 => Just(Operation::ClickCallButton),
        2 => peer().prop_map(|peer| Operation::SelectContact { peer }),
        1 => (peer(), any::<u8>()).prop_map(|(peer, index)| Operation::ReorderContact { peer, index }),
        1 => peer().prop_map(|peer| Operation::AddContact { peer }),
        1 => peer().prop_map(|peer| Operation::RemoveContact { peer }),
        1 => peer().prop_map(|peer| Operation::SendMessage { peer }),
        1 => status().prop_map(|status| Operation::SetOwnStatus { status }),
        4 => peer().prop_map(|peer| Operation::IncomingCall { peer }),
        3 => peer().prop_map(|peer| Operation::CallAccepted { peer }),
        1 => peer().prop_map(|peer| Operation::CallDeclined { peer }),
        2 => peer().prop_map(|peer| Operation::CallEnded { peer }),
        4 => peer().prop_map(|peer| Operation::MediaEndpoint { peer }),
        1 => (peer(), status()).prop_map(|(peer, status)| Operation::PresenceChanged { peer, status }),
        1 => (peer(), status()).prop_map(|(peer, status)| Operation::ContactInfo { peer, status }),
        1 => any::<bool>().prop_map(|success| Operation::ContactAddResult { success }),
        1 => peer().prop_map(|peer| Operation::MessageReceived { peer }),
        1 => any::<bool>().prop_map(|success| Operation::Connected { success }),
        1 => Just(Operation::Disconnected),
        1 => Just(Operation::FailNextStream),
        1 => (0u8..20).prop_map(|secs| Operation::AdvanceTime { secs }),
    ]
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(future)
}

/// Apply `ops` to a connected world, returning the first violation found.
async fn run_checked(ops: &[Operation]) -> Result<SimWorld, String> {
    let mut world = SimWorld::new();
    world.connect_with(&CONTACTS).await.map_err(|e| e.to_string())?;
    let invariants = InvariantRegistry::standard();

    for op in ops {
        world.apply(op).await.map_err(|e| e.to_string())?;
        if let Err(violations) = invariants.check_all(&world.snapshot()) {
            return Err(format!("after {op:?}: {violations:?}"));
        }
    }
    Ok(world)
}

proptest! {
    /// Coordinator invariants hold under arbitrary operation sequences.
    #[test]
    fn prop_invariants_hold(ops in prop::collection::vec(operation_strategy(), 0..80)) {
        let result = block_on(run_checked(&ops));
        prop_assert!(result.is_ok(), "{}", result.err().unwrap_or_default());
    }

    /// Ending the same session twice produces nothing the second time.
    #[test]
    fn prop_end_call_idempotent(ops in prop::collection::vec(operation_strategy(), 0..40)) {
        let outcome = block_on(async {
            let mut world = run_checked(&ops).await?;
            let session_id = world.coordinator().session().map_or(SessionId(1), |s| s.id());

            world.submit(UserIntent::EndCall { session_id }).await.map_err(|e| e.to_string())?;
            let stopped = world.driver().stopped_streams().len();
            world.driver().take_commands();
            world.driver().take_notifications();

            world.submit(UserIntent::EndCall { session_id }).await.map_err(|e| e.to_string())?;
            Ok::<_, String>((
                world.driver().take_commands(),
                world.driver().take_notifications(),
                world.driver().stopped_streams().len() - stopped,
                world.coordinator().session().is_some_and(|s| s.id() == session_id),
            ))
        });

        let (commands, notifications, stopped_again, still_live) =
            outcome.map_err(TestCaseError::fail)?;
        prop_assert!(commands.is_empty(), "second end sent {:?}", commands);
        prop_assert!(notifications.is_empty(), "second end notified {:?}", notifications);
        prop_assert_eq!(stopped_again, 0);
        prop_assert!(!still_live);
    }

    /// End-of-call only ever names the peer of the latest call, once.
    #[test]
    fn prop_end_call_names_current_peer(ops in prop::collection::vec(operation_strategy(), 0..60)) {
        let outcome = block_on(async {
            let mut world = SimWorld::new();
            world.connect_with(&CONTACTS).await.map_err(|e| e.to_string())?;
            let mut commands = Vec::new();
            for op in &ops {
                world.apply(op).await.map_err(|e| e.to_string())?;
                commands.extend(world.driver().take_commands());
            }
            Ok::<_, String>(commands)
        });
        let commands = outcome.map_err(TestCaseError::fail)?;

        let mut current = None;
        for command in &commands {
            match *command {
                SignalingCommand::SendCallRequest { peer_id } | SignalingCommand::SendAccept { peer_id } => {
                    current = Some(peer_id);
                },
                SignalingCommand::SendEndCall { peer_id } => {
                    prop_assert_eq!(current.take(), Some(peer_id));
                },
                _ => {},
            }
        }
    }
}
