//! Error types for the call coordinator.
//!
//! Every error here is handled inside the coordinator and turned into a UI
//! notification or a silent no-op. None of them is fatal to the client.

use thiserror::Error;

use crate::{ContactId, MediaEndpoint, SessionId};

/// Errors raised while starting or running an RTP stream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    /// Local RTP port could not be bound.
    #[error("cannot bind RTP port {port}: {reason}")]
    Bind {
        /// Local port that was requested.
        port: u16,
        /// Underlying failure.
        reason: String,
    },

    /// Remote endpoint could not be reached.
    #[error("cannot connect media to {endpoint}: {reason}")]
    Connect {
        /// Peer endpoint.
        endpoint: MediaEndpoint,
        /// Underlying failure.
        reason: String,
    },

    /// The stream was already stopped.
    #[error("media stream already stopped")]
    Stopped,
}

/// Errors produced by coordinator operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    /// Operation referenced an id that is not in the roster.
    #[error("unknown contact {peer_id}")]
    UnknownContact {
        /// Id that was looked up.
        peer_id: ContactId,
    },

    /// A call request arrived while the session slot is occupied.
    #[error("call from {requested} refused: {active} already occupies the call slot")]
    SessionConflict {
        /// Session currently holding the slot, if one exists.
        active: SlotOwner,
        /// Peer whose request was refused.
        requested: ContactId,
    },

    /// RTP transport failed to establish.
    #[error("media failed: {0}")]
    MediaStart(#[from] MediaError),

    /// Control channel to the signaling server was lost.
    #[error("disconnected from signaling server")]
    SignalingDisconnected,

    /// Operation is not valid in the current state.
    #[error("cannot {operation} while {state}")]
    InvalidTransition {
        /// Human-readable state description.
        state: String,
        /// Operation that was attempted.
        operation: &'static str,
    },
}

/// What occupies the call slot when a request is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotOwner {
    /// An established or ringing session.
    Session {
        /// Session id.
        id: SessionId,
        /// Peer of the session.
        peer_id: ContactId,
    },
    /// An incoming call prompt waiting for the user.
    Prompt {
        /// Caller.
        peer_id: ContactId,
    },
}

impl std::fmt::Display for SlotOwner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Session { id, peer_id } => write!(f, "{id} with {peer_id}"),
            Self::Prompt { peer_id } => write!(f, "pending call from {peer_id}"),
        }
    }
}

impl CallError {
    /// Whether the error is shown to the user as a toast.
    ///
    /// Unknown contacts and session conflicts are resolved silently (a no-op
    /// or an automatic decline).
    pub fn is_user_visible(&self) -> bool {
        matches!(self, Self::MediaStart(_) | Self::SignalingDisconnected)
    }
}
