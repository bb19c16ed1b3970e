//! Coordinator outputs.
//!
//! [`CallAction`]s are instructions for the runtime. None of them is awaited
//! by the coordinator; results come back later as separate inputs.

use std::time::Duration;

use babel_core::{ContactId, LineOrigin, MediaEndpoint, MediaHandle, Presence, SessionId};

use crate::{CallButton, ConnectionState};

/// Commands for the signaling adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalingCommand {
    /// Ask a peer for a call.
    SendCallRequest {
        /// Callee.
        peer_id: ContactId,
    },
    /// Accept a peer's call request.
    SendAccept {
        /// Caller.
        peer_id: ContactId,
    },
    /// Refuse a peer's call request.
    SendDecline {
        /// Caller.
        peer_id: ContactId,
    },
    /// Tell a peer the call is over.
    SendEndCall {
        /// Peer.
        peer_id: ContactId,
    },
    /// Publish our own status.
    SetOwnStatus {
        /// Status to publish.
        presence: Presence,
    },
    /// Open the control channel and log in.
    Connect,
    /// Close the control channel.
    Disconnect,
    /// Request a new contact by username.
    AddContact {
        /// Username.
        username: String,
    },
    /// Delete a contact server-side.
    DeleteContact {
        /// Contact.
        peer_id: ContactId,
    },
    /// Ask the server for the full contact list.
    ListContacts,
    /// Send a chat message.
    SendMessage {
        /// Recipient.
        peer_id: ContactId,
        /// Message text.
        text: String,
    },
}

/// Notifications for the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiNotification {
    /// A contact was appended to the list.
    ContactAdded {
        /// New contact.
        peer_id: ContactId,
        /// Position in the list.
        index: usize,
    },
    /// A contact was removed from the list.
    ContactRemoved {
        /// Removed contact.
        peer_id: ContactId,
    },
    /// A contact (and its chat pane) moved.
    ContactReordered {
        /// Moved contact.
        peer_id: ContactId,
        /// Previous position.
        from: usize,
        /// New position.
        to: usize,
    },
    /// The selected contact changed.
    ContactSelected {
        /// Newly selected contact.
        peer_id: ContactId,
    },
    /// A contact's presence icon must be redrawn.
    PresenceIconChanged {
        /// Contact.
        peer_id: ContactId,
        /// Presence to show.
        presence: Presence,
    },
    /// Our own status changed.
    OwnStatusChanged {
        /// Status to show in the selector.
        presence: Presence,
    },
    /// The signaling connection state changed.
    ConnectionChanged {
        /// New state.
        state: ConnectionState,
    },
    /// The call button must be redrawn.
    CallButtonState(CallButton),
    /// Ask the user whether to accept a call. The decision comes back as
    /// [`crate::UserIntent::AcceptCall`] or [`crate::UserIntent::DeclineCall`].
    IncomingCallPrompt {
        /// Caller.
        peer_id: ContactId,
    },
    /// A prompt shown earlier is no longer valid.
    IncomingCallWithdrawn {
        /// Caller.
        peer_id: ContactId,
    },
    /// A chat pane got a new line.
    MessageAppended {
        /// Contact whose pane changed.
        peer_id: ContactId,
        /// Author side.
        origin: LineOrigin,
    },
    /// Show a transient error.
    ErrorToast {
        /// Short title.
        title: String,
        /// Message body.
        message: String,
    },
}

/// Actions produced by the coordinator for the runtime to execute.
#[derive(Debug, PartialEq, Eq)]
pub enum CallAction {
    /// Forward a command to the signaling adapter.
    Signal(SignalingCommand),

    /// Start an RTP stream. The runtime reports the outcome as a
    /// [`crate::MediaEvent`] for `session_id`.
    StartStream {
        /// Session the stream belongs to.
        session_id: SessionId,
        /// Peer endpoint.
        endpoint: MediaEndpoint,
    },

    /// Stop an RTP stream, releasing its handle.
    StopStream {
        /// Handle of the stream.
        handle: MediaHandle,
    },

    /// Forward a notification to the UI.
    Notify(UiNotification),

    /// Feed [`crate::CallInput::ReconnectDue`] back after `delay`.
    ScheduleReconnect {
        /// Delay before the reconnect attempt.
        delay: Duration,
    },
}

impl CallAction {
    /// Signaling command carried by this action, if any.
    pub fn as_signal(&self) -> Option<&SignalingCommand> {
        match self {
            Self::Signal(command) => Some(command),
            _ => None,
        }
    }

    /// UI notification carried by this action, if any.
    pub fn as_notification(&self) -> Option<&UiNotification> {
        match self {
            Self::Notify(notification) => Some(notification),
            _ => None,
        }
    }
}
