//! Inputs produced by a driver.

use babel_client::{CallInput, SignalingEvent, UserIntent};

/// Events a [`crate::Driver`] hands to the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Local user action.
    User(UserIntent),
    /// Event from the signaling adapter.
    Signaling(SignalingEvent),
    /// Shut the client down.
    Quit,
}

impl Input {
    /// Coordinator input, or `None` for [`Input::Quit`].
    pub fn into_call_input(self) -> Option<CallInput> {
        match self {
            Self::User(intent) => Some(CallInput::User(intent)),
            Self::Signaling(event) => Some(CallInput::Signaling(event)),
            Self::Quit => None,
        }
    }
}

impl From<UserIntent> for Input {
    fn from(intent: UserIntent) -> Self {
        Self::User(intent)
    }
}

impl From<SignalingEvent> for Input {
    fn from(event: SignalingEvent) -> Self {
        Self::Signaling(event)
    }
}
