//! Babel client
//!
//! Action-based call coordinator for the Babel VOIP client.
//!
//! The [`CallCoordinator`] is a pure state machine: it consumes
//! [`SignalingEvent`]s, [`UserIntent`]s and [`MediaEvent`]s and returns
//! [`CallAction`]s. It performs no I/O and never waits; signaling requests and
//! stream starts are fire-and-forget, with their outcomes arriving later as new
//! inputs. The runtime in `babel-app` executes the actions against real (or
//! simulated) adapters.
//!
//! # Example
//!
//! ```
//! use babel_client::{CallAction, CallCoordinator, CoordinatorConfig, SignalingCommand, SignalingEvent};
//! use babel_core::Presence;
//!
//! let mut coordinator = CallCoordinator::new(CoordinatorConfig::default());
//! coordinator.set_own_status(Presence::Available);
//! coordinator.handle(SignalingEvent::Connected { success: true });
//! coordinator.handle(SignalingEvent::ContactInfo {
//!     peer_id: 7,
//!     display_name: "alice".into(),
//!     presence: Presence::Available,
//! });
//!
//! coordinator.handle(SignalingEvent::IncomingCall { peer_id: 7 });
//! let actions = coordinator.accept_call(7);
//! assert_eq!(actions[0], CallAction::Signal(SignalingCommand::SendAccept { peer_id: 7 }));
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod coordinator;
mod event;
mod state;

pub use action::{CallAction, SignalingCommand, UiNotification};
pub use coordinator::{CallCoordinator, CoordinatorConfig, DEFAULT_RECONNECT_DELAY};
pub use event::{CallInput, MediaEvent, SignalingEvent, UserIntent};
pub use state::{CallButton, CallIcon, CallState, ConnectionState};
