//! Coordinator inputs.
//!
//! Inputs come from three sources, all serialized into one dispatch queue:
//! - [`SignalingEvent`]: control-plane notifications from the signaling adapter.
//! - [`UserIntent`]: clicks and selections from the UI.
//! - [`MediaEvent`]: results of stream starts requested earlier by the
//!   coordinator.

use babel_core::{ContactId, MediaEndpoint, MediaError, MediaHandle, Presence, SessionId};

/// Events reported by the signaling adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalingEvent {
    /// A peer wants to call us.
    IncomingCall {
        /// Caller.
        peer_id: ContactId,
    },

    /// The peer answered our call request.
    CallAccepted {
        /// Callee.
        peer_id: ContactId,
    },

    /// The peer refused our call request.
    CallDeclined {
        /// Callee.
        peer_id: ContactId,
    },

    /// The peer hung up.
    CallEnded {
        /// Peer that ended the call.
        peer_id: ContactId,
    },

    /// The peer announced where to send RTP.
    PeerMediaEndpoint {
        /// Announcing peer.
        peer_id: ContactId,
        /// Peer's RTP endpoint.
        endpoint: MediaEndpoint,
    },

    /// A contact's presence changed.
    PresenceChanged {
        /// Contact.
        peer_id: ContactId,
        /// New presence.
        presence: Presence,
    },

    /// A contact entry from a contact listing.
    ContactInfo {
        /// Contact.
        peer_id: ContactId,
        /// Username.
        display_name: String,
        /// Current presence.
        presence: Presence,
    },

    /// Result of an add-contact request.
    ContactAddResult {
        /// Whether the server accepted the request.
        success: bool,
    },

    /// A chat message arrived.
    MessageReceived {
        /// Sender.
        peer_id: ContactId,
        /// Message text.
        text: String,
        /// Unix timestamp (seconds).
        timestamp: u64,
    },

    /// Result of a connect request.
    Connected {
        /// Whether the connection and login succeeded.
        success: bool,
    },

    /// The control channel dropped.
    Disconnected,
}

/// Actions taken by the local user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserIntent {
    /// Call a contact.
    PlaceCall {
        /// Callee.
        peer_id: ContactId,
    },

    /// Accept the pending incoming call.
    AcceptCall {
        /// Caller.
        peer_id: ContactId,
    },

    /// Decline the pending incoming call.
    DeclineCall {
        /// Caller.
        peer_id: ContactId,
    },

    /// Hang up whatever call is running or ringing.
    HangUp,

    /// Hang up a specific session. No-op if it already ended.
    EndCall {
        /// Session to end.
        session_id: SessionId,
    },

    /// The call button of the selected contact was clicked.
    CallButtonClicked,

    /// A contact was selected in the contact list.
    SelectContact {
        /// Selected contact.
        peer_id: ContactId,
    },

    /// A contact was dragged to a new position.
    ReorderContact {
        /// Moved contact.
        peer_id: ContactId,
        /// Requested position.
        index: usize,
    },

    /// Request a new contact by username.
    AddContact {
        /// Username to add.
        username: String,
    },

    /// Delete a contact.
    RemoveContact {
        /// Contact to delete.
        peer_id: ContactId,
    },

    /// Send a chat message.
    SendMessage {
        /// Recipient.
        peer_id: ContactId,
        /// Message text.
        text: String,
        /// Unix timestamp (seconds) of sending.
        timestamp: u64,
    },

    /// Change the local user's status.
    SetOwnStatus {
        /// Desired status.
        presence: Presence,
    },
}

/// Results of stream starts requested via [`crate::CallAction::StartStream`].
#[derive(Debug, PartialEq, Eq)]
pub enum MediaEvent {
    /// The stream is running.
    Started {
        /// Session the stream was started for.
        session_id: SessionId,
        /// Ownership of the stream.
        handle: MediaHandle,
    },

    /// The stream could not be established.
    Failed {
        /// Session the stream was started for.
        session_id: SessionId,
        /// Failure reason.
        error: MediaError,
    },
}

/// Any input the coordinator can process.
#[derive(Debug, PartialEq, Eq)]
pub enum CallInput {
    /// Local user action.
    User(UserIntent),
    /// Signaling adapter event.
    Signaling(SignalingEvent),
    /// Media adapter result.
    Media(MediaEvent),
    /// The delay scheduled by [`crate::CallAction::ScheduleReconnect`] elapsed.
    ReconnectDue,
}

impl From<UserIntent> for CallInput {
    fn from(intent: UserIntent) -> Self {
        Self::User(intent)
    }
}

impl From<SignalingEvent> for CallInput {
    fn from(event: SignalingEvent) -> Self {
        Self::Signaling(event)
    }
}

impl From<MediaEvent> for CallInput {
    fn from(event: MediaEvent) -> Self {
        Self::Media(event)
    }
}
