//! End-to-end call scenarios through the runtime and simulated driver.

use babel_client::{
    CallButton, CallState, SignalingCommand, SignalingEvent, UiNotification, UserIntent,
};
use babel_core::{MediaError, Presence};
use babel_harness::{InvariantRegistry, SimWorld};

async fn connected(peers: &[u32]) -> SimWorld {
    let mut world = SimWorld::new();
    world.connect_with(peers).await.unwrap();
    world.driver().take_commands();
    world.driver().take_notifications();
    world
}

fn assert_invariants(world: &SimWorld, context: &str) {
    InvariantRegistry::standard().assert_all(&world.snapshot(), context);
}

#[tokio::test]
async fn accepting_incoming_call_shows_stop_button() {
    let mut world = connected(&[7]).await;

    world.submit(SignalingEvent::IncomingCall { peer_id: 7 }).await.unwrap();
    assert_eq!(world.coordinator().state(), CallState::RingingIncoming { peer_id: 7 });
    assert!(
        world
            .driver()
            .take_notifications()
            .contains(&UiNotification::IncomingCallPrompt { peer_id: 7 })
    );

    world.submit(UserIntent::AcceptCall { peer_id: 7 }).await.unwrap();

    assert_eq!(world.coordinator().state(), CallState::InCall { peer_id: 7 });
    assert_eq!(world.driver().take_commands(), vec![SignalingCommand::SendAccept { peer_id: 7 }]);
    assert_eq!(world.driver().last_button(), Some(CallButton::STOP));
    assert_invariants(&world, "after accept");
}

#[tokio::test]
async fn second_caller_declined_while_ringing_out() {
    let mut world = connected(&[3, 9]).await;

    world.submit(UserIntent::PlaceCall { peer_id: 3 }).await.unwrap();
    assert_eq!(
        world.driver().take_commands(),
        vec![SignalingCommand::SendCallRequest { peer_id: 3 }]
    );

    world.submit(SignalingEvent::IncomingCall { peer_id: 9 }).await.unwrap();

    assert_eq!(world.driver().take_commands(), vec![SignalingCommand::SendDecline { peer_id: 9 }]);
    assert_eq!(world.coordinator().state(), CallState::RingingOutgoing { peer_id: 3 });
    assert_invariants(&world, "after second caller");
}

#[tokio::test]
async fn disconnect_in_call_stops_stream_once() {
    let mut world = connected(&[5, 6]).await;
    world.establish_call(5).await.unwrap();
    assert_eq!(world.driver().active_streams().len(), 1);

    world.submit(SignalingEvent::Disconnected).await.unwrap();

    assert_eq!(world.driver().stopped_streams().len(), 1);
    assert!(world.driver().active_streams().is_empty());
    assert_eq!(world.coordinator().state(), CallState::NoCall);
    assert!(world.coordinator().session().is_none());

    let roster = world.coordinator().roster();
    assert!(roster.contacts().iter().skip(1).all(|c| c.presence == Presence::Offline));

    // The lost peer is not told: the connection is gone.
    assert!(
        !world
            .driver()
            .take_commands()
            .iter()
            .any(|c| matches!(c, SignalingCommand::SendEndCall { .. }))
    );

    world.submit(SignalingEvent::Disconnected).await.unwrap();
    assert_eq!(world.driver().stopped_streams().len(), 1);
    assert!(world.runtime().reconnect_at().is_some());
    assert_invariants(&world, "after disconnect");
}

#[tokio::test]
async fn stream_failure_resets_to_start() {
    let mut world = connected(&[3]).await;
    world.driver().fail_next_stream(MediaError::Bind { port: 4243, reason: "in use".into() });

    world.establish_call(3).await.unwrap();

    assert_eq!(world.coordinator().state(), CallState::NoCall);
    assert!(world.coordinator().session().is_none());
    assert_eq!(world.driver().last_button(), Some(CallButton::START));
    let notifications = world.driver().take_notifications();
    assert!(notifications.iter().any(|n| matches!(
        n,
        UiNotification::ErrorToast { title, .. } if title == "Call failed"
    )));
    assert!(world.driver().active_streams().is_empty());
    assert_invariants(&world, "after media failure");
}

#[tokio::test]
async fn peer_hang_up_releases_media() {
    let mut world = connected(&[4]).await;
    world.establish_call(4).await.unwrap();

    world.submit(SignalingEvent::CallEnded { peer_id: 4 }).await.unwrap();

    assert_eq!(world.coordinator().state(), CallState::NoCall);
    assert_eq!(world.driver().stopped_streams().len(), 1);
    assert_eq!(world.driver().last_button(), Some(CallButton::START));
    assert_invariants(&world, "after peer hang up");
}

#[tokio::test]
async fn call_button_toggles_call() {
    let mut world = connected(&[2]).await;
    world.submit(UserIntent::SelectContact { peer_id: 2 }).await.unwrap();
    assert_eq!(world.driver().last_button(), Some(CallButton::START));

    world.submit(UserIntent::CallButtonClicked).await.unwrap();
    assert_eq!(world.coordinator().state(), CallState::RingingOutgoing { peer_id: 2 });
    assert_eq!(world.driver().last_button(), Some(CallButton::STOP));

    world.submit(UserIntent::CallButtonClicked).await.unwrap();
    assert_eq!(world.coordinator().state(), CallState::NoCall);
    assert_eq!(
        world.driver().take_commands(),
        vec![
            SignalingCommand::SendCallRequest { peer_id: 2 },
            SignalingCommand::SendEndCall { peer_id: 2 },
        ]
    );
    assert_invariants(&world, "after toggle");
}
