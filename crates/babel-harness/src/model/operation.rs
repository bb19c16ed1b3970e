//! Operations for model-based testing.
//!
//! Operations cover every input the coordinator can see: user intents,
//! signaling events, media failures and the passage of time. Peers are small
//! integers folded into a handful of contact ids so random sequences keep
//! hitting the same contacts.

use std::time::Duration;

use arbitrary::Arbitrary;
use babel_client::{CallInput, SignalingEvent, UserIntent};
use babel_core::{ContactId, MediaEndpoint, Presence, SessionId};

/// Peer identifier as generated (folded with [`PEER_SPACE`]).
pub type ModelPeer = u8;

/// Number of distinct contact ids operations address. Id 0 is the local
/// account.
pub const PEER_SPACE: u8 = 8;

/// Operations that can be applied to a [`crate::SimWorld`].
#[derive(Debug, Clone, Arbitrary)]
pub enum Operation {
    /// User calls a contact.
    PlaceCall {
        /// Callee.
        peer: ModelPeer,
    },
    /// User accepts a prompt.
    AcceptCall {
        /// Caller.
        peer: ModelPeer,
    },
    /// User declines a prompt.
    DeclineCall {
        /// Caller.
        peer: ModelPeer,
    },
    /// User hangs up.
    HangUp,
    /// User ends a session by id.
    EndCall {
        /// Session id (small, so it sometimes hits the live session).
        session: u8,
    },
    /// User clicks the call button.
    ClickCallButton,
    /// User selects a contact.
    SelectContact {
        /// Contact.
        peer: ModelPeer,
    },
    /// User drags a contact.
    ReorderContact {
        /// Contact.
        peer: ModelPeer,
        /// Target position.
        index: u8,
    },
    /// User adds a contact by name.
    AddContact {
        /// Contact whose generated name is used.
        peer: ModelPeer,
    },
    /// User deletes a contact.
    RemoveContact {
        /// Contact.
        peer: ModelPeer,
    },
    /// User sends a chat message.
    SendMessage {
        /// Recipient.
        peer: ModelPeer,
    },
    /// User changes own status.
    SetOwnStatus {
        /// Presence wire code.
        status: u8,
    },
    /// Peer calls us.
    IncomingCall {
        /// Caller.
        peer: ModelPeer,
    },
    /// Peer answered our call.
    CallAccepted {
        /// Callee.
        peer: ModelPeer,
    },
    /// Peer refused our call.
    CallDeclined {
        /// Callee.
        peer: ModelPeer,
    },
    /// Peer hung up.
    CallEnded {
        /// Peer.
        peer: ModelPeer,
    },
    /// Peer announced its RTP endpoint.
    MediaEndpoint {
        /// Peer.
        peer: ModelPeer,
    },
    /// Presence push.
    PresenceChanged {
        /// Contact.
        peer: ModelPeer,
        /// Presence wire code.
        status: u8,
    },
    /// Contact listing entry.
    ContactInfo {
        /// Contact.
        peer: ModelPeer,
        /// Presence wire code.
        status: u8,
    },
    /// Add-contact result.
    ContactAddResult {
        /// Whether the server accepted.
        success: bool,
    },
    /// Incoming chat message.
    MessageReceived {
        /// Sender.
        peer: ModelPeer,
    },
    /// Connect result.
    Connected {
        /// Whether login succeeded.
        success: bool,
    },
    /// Server dropped the connection.
    Disconnected,
    /// The next stream start fails.
    FailNextStream,
    /// Advance the virtual clock.
    AdvanceTime {
        /// Seconds to advance.
        secs: u8,
    },
}

/// Contact id for a generated peer.
pub fn contact(peer: ModelPeer) -> ContactId {
    ContactId::from(peer % PEER_SPACE)
}

/// Presence for a generated status code.
pub fn presence(status: u8) -> Presence {
    Presence::from_code(u32::from(status % 4))
}

/// Generated username for a peer.
pub fn username(peer: ModelPeer) -> String {
    format!("user{}", contact(peer))
}

/// RTP endpoint a generated peer announces.
pub fn endpoint(peer: ModelPeer) -> MediaEndpoint {
    MediaEndpoint::new([10, 0, 0, peer % PEER_SPACE].into(), 5000 + u16::from(peer % PEER_SPACE))
}

impl Operation {
    /// Coordinator input for this operation.
    ///
    /// Returns `None` for operations that act on the simulation itself
    /// ([`Operation::FailNextStream`], [`Operation::AdvanceTime`]).
    pub fn to_input(&self) -> Option<CallInput> {
        let input = match *self {
            Self::PlaceCall { peer } => UserIntent::PlaceCall { peer_id: contact(peer) }.into(),
            Self::AcceptCall { peer } => UserIntent::AcceptCall { peer_id: contact(peer) }.into(),
            Self::DeclineCall { peer } => UserIntent::DeclineCall { peer_id: contact(peer) }.into(),
            Self::HangUp => UserIntent::HangUp.into(),
            Self::EndCall { session } => {
                UserIntent::EndCall { session_id: SessionId(u64::from(session % 8)) }.into()
            },
            Self::ClickCallButton => UserIntent::CallButtonClicked.into(),
            Self::SelectContact { peer } => UserIntent::SelectContact { peer_id: contact(peer) }.into(),
            Self::ReorderContact { peer, index } => {
                UserIntent::ReorderContact { peer_id: contact(peer), index: usize::from(index % 10) }
                    .into()
            },
            Self::AddContact { peer } => UserIntent::AddContact { username: username(peer) }.into(),
            Self::RemoveContact { peer } => UserIntent::RemoveContact { peer_id: contact(peer) }.into(),
            Self::SendMessage { peer } => UserIntent::SendMessage {
                peer_id: contact(peer),
                text: "hello\tthere".to_string(),
                timestamp: 0,
            }
            .into(),
            Self::SetOwnStatus { status } => UserIntent::SetOwnStatus { presence: presence(status) }.into(),
            Self::IncomingCall { peer } => SignalingEvent::IncomingCall { peer_id: contact(peer) }.into(),
            Self::CallAccepted { peer } => SignalingEvent::CallAccepted { peer_id: contact(peer) }.into(),
            Self::CallDeclined { peer } => SignalingEvent::CallDeclined { peer_id: contact(peer) }.into(),
            Self::CallEnded { peer } => SignalingEvent::CallEnded { peer_id: contact(peer) }.into(),
            Self::MediaEndpoint { peer } => {
                SignalingEvent::PeerMediaEndpoint { peer_id: contact(peer), endpoint: endpoint(peer) }
                    .into()
            },
            Self::PresenceChanged { peer, status } => {
                SignalingEvent::PresenceChanged { peer_id: contact(peer), presence: presence(status) }
                    .into()
            },
            Self::ContactInfo { peer, status } => SignalingEvent::ContactInfo {
                peer_id: contact(peer),
                display_name: username(peer),
                presence: presence(status),
            }
            .into(),
            Self::ContactAddResult { success } => SignalingEvent::ContactAddResult { success }.into(),
            Self::MessageReceived { peer } => SignalingEvent::MessageReceived {
                peer_id: contact(peer),
                text: "hi".to_string(),
                timestamp: 0,
            }
            .into(),
            Self::Connected { success } => SignalingEvent::Connected { success }.into(),
            Self::Disconnected => SignalingEvent::Disconnected.into(),
            Self::FailNextStream | Self::AdvanceTime { .. } => return None,
        };
        Some(input)
    }

    /// Clock advance for [`Operation::AdvanceTime`].
    pub fn time_advance(&self) -> Option<Duration> {
        match *self {
            Self::AdvanceTime { secs } => Some(Duration::from_secs(u64::from(secs))),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peers_fold_into_small_space() {
        assert_eq!(contact(0), 0);
        assert_eq!(contact(PEER_SPACE + 3), 3);
        assert_eq!(contact(u8::MAX), ContactId::from(u8::MAX % PEER_SPACE));
    }

    #[test]
    fn simulation_operations_have_no_input() {
        assert!(Operation::FailNextStream.to_input().is_none());
        assert!(Operation::AdvanceTime { secs: 10 }.to_input().is_none());
        assert_eq!(
            Operation::AdvanceTime { secs: 10 }.time_advance(),
            Some(Duration::from_secs(10))
        );
    }

    #[test]
    fn incoming_call_maps_to_signaling() {
        assert_eq!(
            Operation::IncomingCall { peer: 7 }.to_input(),
            Some(CallInput::Signaling(SignalingEvent::IncomingCall { peer_id: 7 }))
        );
    }
}
