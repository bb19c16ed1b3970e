//! Babel core
//!
//! Data model shared by every layer of the Babel VOIP client: the ordered
//! [`Roster`] of contacts with their chat panes, the [`CallSession`] record and
//! the exclusive [`MediaHandle`] it owns, and the [`CallError`] taxonomy.
//!
//! This crate performs no I/O. The call coordinator state machine lives in
//! `babel-client`; platform I/O lives behind the driver in `babel-app`.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod error;
mod presence;
mod roster;
mod session;

pub use error::{CallError, MediaError, SlotOwner};
pub use presence::Presence;
pub use roster::{ChatLine, ChatPane, Contact, LineOrigin, Roster, Upsert};
pub use session::{CallSession, Direction, MediaEndpoint, MediaHandle, Phase, SessionId};

/// Stable contact identifier assigned by the signaling backend.
pub type ContactId = u32;
