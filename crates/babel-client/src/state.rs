//! Observable coordinator state.

use std::fmt;

use babel_core::ContactId;

/// Global call state of a coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    /// No session and no pending prompt.
    NoCall,
    /// Call request sent, waiting for the peer.
    RingingOutgoing {
        /// Callee.
        peer_id: ContactId,
    },
    /// Incoming request waiting for the local user's decision.
    RingingIncoming {
        /// Caller.
        peer_id: ContactId,
    },
    /// Call established.
    InCall {
        /// Peer of the call.
        peer_id: ContactId,
    },
}

impl CallState {
    /// Peer involved in the current call state, if any.
    pub fn peer_id(self) -> Option<ContactId> {
        match self {
            Self::NoCall => None,
            Self::RingingOutgoing { peer_id }
            | Self::RingingIncoming { peer_id }
            | Self::InCall { peer_id } => Some(peer_id),
        }
    }
}

impl fmt::Display for CallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCall => f.write_str("idle"),
            Self::RingingOutgoing { peer_id } => write!(f, "calling {peer_id}"),
            Self::RingingIncoming { peer_id } => write!(f, "prompting for call from {peer_id}"),
            Self::InCall { peer_id } => write!(f, "in call with {peer_id}"),
        }
    }
}

/// Signaling connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected.
    Offline,
    /// Connect requested, waiting for the result.
    Connecting,
    /// Connected to the signaling server.
    Online,
}

/// Icon shown on the call button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallIcon {
    /// Start a call.
    Start,
    /// Stop the running call.
    Stop,
}

/// State of the single call button bound to the selected contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallButton {
    /// Whether the button is clickable.
    pub enabled: bool,
    /// Icon to show.
    pub icon: CallIcon,
}

impl CallButton {
    /// Clickable "start call" button.
    pub const START: Self = Self { enabled: true, icon: CallIcon::Start };
    /// Clickable "hang up" button.
    pub const STOP: Self = Self { enabled: true, icon: CallIcon::Stop };
    /// Greyed-out button.
    pub const DISABLED: Self = Self { enabled: false, icon: CallIcon::Start };
}
