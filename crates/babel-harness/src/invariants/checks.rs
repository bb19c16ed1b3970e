//! Standard invariant checks.
//!
//! These invariants capture behavioral properties that must always hold.
//! They verify WHAT must be true, not specific test scenarios.

use std::collections::HashSet;

use babel_client::{CallButton, CallState, ConnectionState};
use babel_core::{Direction, Phase};

use super::{CoordinatorSnapshot, Invariant, InvariantResult, Violation};

/// The call state must agree with the single session slot.
///
/// Ringing outgoing and in-call states are backed by exactly one session
/// for the same peer; idle and prompting states have none. A terminated
/// session never lingers in the slot.
pub struct SingleActiveCall;

impl Invariant for SingleActiveCall {
    fn name(&self) -> &'static str {
        "single_active_call"
    }

    fn check(&self, state: &CoordinatorSnapshot) -> InvariantResult {
        let fail = |message: String| -> InvariantResult {
            Err(Violation { invariant: self.name(), message })
        };

        match (state.state, state.session) {
            (CallState::NoCall | CallState::RingingIncoming { .. }, None) => Ok(()),
            (CallState::NoCall | CallState::RingingIncoming { .. }, Some(session)) => {
                fail(format!("state {} but {} still in slot", state.state, session.id))
            },
            (CallState::RingingOutgoing { peer_id } | CallState::InCall { peer_id }, None) => {
                fail(format!("state {} without a session for {peer_id}", state.state))
            },
            (CallState::RingingOutgoing { peer_id } | CallState::InCall { peer_id }, Some(session)) => {
                if session.peer_id != peer_id {
                    return fail(format!(
                        "state {} but session {} is with {}",
                        state.state, session.id, session.peer_id
                    ));
                }
                if session.phase == Phase::Idle {
                    return fail(format!("terminated {} left in slot", session.id));
                }
                if matches!(state.state, CallState::RingingOutgoing { .. })
                    && session.direction != Direction::Outgoing
                {
                    return fail(format!("incoming {} reported as ringing outgoing", session.id));
                }
                Ok(())
            },
        }
    }
}

/// Contacts and chat panes must stay index-aligned.
///
/// Pane `i` belongs to contact `i`, `order_index` equals the position, and
/// no contact appears twice.
pub struct RosterPaneAlignment;

impl Invariant for RosterPaneAlignment {
    fn name(&self) -> &'static str {
        "roster_pane_alignment"
    }

    fn check(&self, state: &CoordinatorSnapshot) -> InvariantResult {
        if state.contact_ids != state.pane_ids {
            return Err(Violation {
                invariant: self.name(),
                message: format!("contacts {:?} vs panes {:?}", state.contact_ids, state.pane_ids),
            });
        }

        if let Some((position, index)) =
            state.order_indices.iter().enumerate().find(|(position, index)| position != *index)
        {
            return Err(Violation {
                invariant: self.name(),
                message: format!("contact at {position} has order_index {index}"),
            });
        }

        let unique: HashSet<_> = state.contact_ids.iter().collect();
        if unique.len() != state.contact_ids.len() {
            return Err(Violation {
                invariant: self.name(),
                message: format!("duplicate contact in {:?}", state.contact_ids),
            });
        }
        Ok(())
    }
}

/// Slot 0 always holds the local account.
pub struct SelfSlotPreserved;

impl Invariant for SelfSlotPreserved {
    fn name(&self) -> &'static str {
        "self_slot_preserved"
    }

    fn check(&self, state: &CoordinatorSnapshot) -> InvariantResult {
        match state.contact_ids.first() {
            Some(&id) if id == state.expected_self_id => Ok(()),
            first => Err(Violation {
                invariant: self.name(),
                message: format!("slot 0 is {first:?}, expected {}", state.expected_self_id),
            }),
        }
    }
}

/// Running streams must match the session's media handle.
///
/// A handle is only attached to an active call. With driver observations,
/// exactly the attached handle is running and no handle was stopped twice.
pub struct MediaOwnership;

impl Invariant for MediaOwnership {
    fn name(&self) -> &'static str {
        "media_ownership"
    }

    fn check(&self, state: &CoordinatorSnapshot) -> InvariantResult {
        let has_media = state.session.is_some_and(|s| s.has_media);

        if let Some(session) = state.session
            && session.has_media
            && session.phase != Phase::Active
        {
            return Err(Violation {
                invariant: self.name(),
                message: format!("{} holds media in phase {:?}", session.id, session.phase),
            });
        }

        let Some(driver) = &state.driver else {
            return Ok(());
        };

        if driver.active_streams.len() != usize::from(has_media) {
            return Err(Violation {
                invariant: self.name(),
                message: format!(
                    "{} streams running, session holds media: {has_media}",
                    driver.active_streams.len()
                ),
            });
        }

        let mut seen = HashSet::new();
        if let Some(id) = driver.stopped_streams.iter().find(|id| !seen.insert(**id)) {
            return Err(Violation {
                invariant: self.name(),
                message: format!("stream {id} stopped twice"),
            });
        }
        Ok(())
    }
}

/// The UI shows the button state the coordinator computes.
///
/// Also checks the button semantics: the stop icon appears exactly when the
/// selected contact is the session peer.
pub struct ButtonInSync;

impl Invariant for ButtonInSync {
    fn name(&self) -> &'static str {
        "button_in_sync"
    }

    fn check(&self, state: &CoordinatorSnapshot) -> InvariantResult {
        let peer_selected = state
            .session
            .is_some_and(|session| Some(session.peer_id) == state.selected);
        if (state.button == CallButton::STOP) != peer_selected {
            return Err(Violation {
                invariant: self.name(),
                message: format!(
                    "button {:?} with selected {:?} and session {:?}",
                    state.button, state.selected, state.session
                ),
            });
        }

        if let Some(driver) = &state.driver {
            let shown = driver.shown_button.unwrap_or(CallButton::DISABLED);
            if shown != state.button {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!("UI shows {shown:?}, coordinator has {:?}", state.button),
                });
            }
        }
        Ok(())
    }
}

/// No call or prompt exists unless the client is online.
pub struct OfflineMeansIdle;

impl Invariant for OfflineMeansIdle {
    fn name(&self) -> &'static str {
        "offline_means_idle"
    }

    fn check(&self, state: &CoordinatorSnapshot) -> InvariantResult {
        if state.connection != ConnectionState::Online && state.state != CallState::NoCall {
            return Err(Violation {
                invariant: self.name(),
                message: format!("{} while {:?}", state.state, state.connection),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use babel_client::{CallCoordinator, CoordinatorConfig, SignalingEvent};
    use babel_core::{Presence, SessionId};

    use super::*;
    use crate::{DriverSnapshot, SessionSnapshot};

    fn snapshot() -> CoordinatorSnapshot {
        let mut coordinator = CallCoordinator::new(CoordinatorConfig::default());
        coordinator.set_own_status(Presence::Available);
        coordinator.handle(SignalingEvent::Connected { success: true });
        coordinator.handle(SignalingEvent::ContactInfo {
            peer_id: 3,
            display_name: "bob".into(),
            presence: Presence::Available,
        });
        CoordinatorSnapshot::capture(&coordinator)
    }

    fn session(peer_id: u32) -> SessionSnapshot {
        SessionSnapshot {
            id: SessionId(1),
            peer_id,
            direction: Direction::Outgoing,
            phase: Phase::Ringing,
            has_media: false,
            media_pending: false,
        }
    }

    #[test]
    fn single_active_call_detects_orphan_session() {
        let mut state = snapshot();
        state.session = Some(session(3));
        assert!(SingleActiveCall.check(&state).is_err());

        state.state = CallState::RingingOutgoing { peer_id: 3 };
        assert!(SingleActiveCall.check(&state).is_ok());

        state.state = CallState::RingingOutgoing { peer_id: 4 };
        assert!(SingleActiveCall.check(&state).is_err());
    }

    #[test]
    fn alignment_detects_diverged_panes() {
        let mut state = snapshot();
        assert!(RosterPaneAlignment.check(&state).is_ok());

        state.pane_ids.reverse();
        assert!(RosterPaneAlignment.check(&state).is_err());
    }

    #[test]
    fn self_slot_detects_moved_account() {
        let mut state = snapshot();
        state.contact_ids.swap(0, 1);
        assert!(SelfSlotPreserved.check(&state).is_err());
    }

    #[test]
    fn media_ownership_detects_leaked_stream() {
        let state = snapshot().with_driver(DriverSnapshot {
            active_streams: vec![1],
            stopped_streams: Vec::new(),
            shown_button: None,
        });
        assert!(MediaOwnership.check(&state).is_err());
    }

    #[test]
    fn media_ownership_detects_double_stop() {
        let state = snapshot().with_driver(DriverSnapshot {
            active_streams: Vec::new(),
            stopped_streams: vec![1, 2, 1],
            shown_button: None,
        });
        assert!(MediaOwnership.check(&state).is_err());
    }

    #[test]
    fn button_in_sync_detects_stale_ui() {
        let state = snapshot().with_driver(DriverSnapshot {
            shown_button: Some(CallButton::STOP),
            ..DriverSnapshot::default()
        });
        assert!(ButtonInSync.check(&state).is_err());
    }

    #[test]
    fn offline_means_idle_detects_call_while_offline() {
        let mut state = snapshot();
        state.connection = ConnectionState::Offline;
        state.state = CallState::RingingIncoming { peer_id: 3 };
        assert!(OfflineMeansIdle.check(&state).is_err());
    }
}
