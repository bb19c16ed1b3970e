//! Call session record.
//!
//! A [`CallSession`] is the coordinator's record of one call with one peer.
//! It owns the [`MediaHandle`] of the RTP stream once media is running, and
//! releases it exactly once through [`CallSession::terminate`].
//!
//! # Lifecycle
//!
//! ```text
//!  outgoing:  Ringing ──endpoint──> Active ──terminate──> Idle
//!  incoming:            (accept)    Active ──terminate──> Idle
//! ```
//!
//! `Idle` is terminal: a terminated session never holds media again.

use std::{fmt, net::IpAddr};

use crate::ContactId;

/// Identifier of a call session, unique per coordinator instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// Who initiated the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Local user placed the call.
    Outgoing,
    /// Peer placed the call and the local user accepted it.
    Incoming,
}

/// Progress of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Terminated. Media released.
    Idle,
    /// Outgoing request sent, waiting for the peer.
    Ringing,
    /// Call established.
    Active,
}

/// Remote RTP endpoint announced by the peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MediaEndpoint {
    /// Peer's IP address.
    pub address: IpAddr,
    /// Peer's RTP port.
    pub port: u16,
}

impl MediaEndpoint {
    /// Create an endpoint.
    pub fn new(address: IpAddr, port: u16) -> Self {
        Self { address, port }
    }
}

impl fmt::Display for MediaEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.address {
            IpAddr::V4(ip) => write!(f, "{ip}:{}", self.port),
            IpAddr::V6(ip) => write!(f, "[{ip}]:{}", self.port),
        }
    }
}

/// Exclusive ownership of a running RTP stream.
///
/// Neither `Clone` nor `Copy`. The only way to release a stream is
/// to move the handle into the media adapter's stop call.
#[derive(Debug, PartialEq, Eq)]
pub struct MediaHandle {
    id: u64,
    endpoint: MediaEndpoint,
}

impl MediaHandle {
    /// Create a handle. Called by media adapters when a stream starts.
    pub fn new(id: u64, endpoint: MediaEndpoint) -> Self {
        Self { id, endpoint }
    }

    /// Adapter-assigned stream identifier.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Remote endpoint of the stream.
    pub fn endpoint(&self) -> MediaEndpoint {
        self.endpoint
    }
}

/// State of a single in-progress call.
#[derive(Debug)]
pub struct CallSession {
    id: SessionId,
    peer_id: ContactId,
    direction: Direction,
    phase: Phase,
    accepted: bool,
    media_pending: bool,
    media: Option<MediaHandle>,
}

impl CallSession {
    /// Outgoing call waiting for the peer to answer.
    pub fn outgoing(id: SessionId, peer_id: ContactId) -> Self {
        Self {
            id,
            peer_id,
            direction: Direction::Outgoing,
            phase: Phase::Ringing,
            accepted: false,
            media_pending: false,
            media: None,
        }
    }

    /// Incoming call the local user has accepted.
    pub fn incoming(id: SessionId, peer_id: ContactId) -> Self {
        Self {
            id,
            peer_id,
            direction: Direction::Incoming,
            phase: Phase::Active,
            accepted: true,
            media_pending: false,
            media: None,
        }
    }

    /// Session identifier.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Contact this call is with.
    pub fn peer_id(&self) -> ContactId {
        self.peer_id
    }

    /// Who initiated the call.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether the peer has answered (always true for incoming calls).
    pub fn is_accepted(&self) -> bool {
        self.accepted
    }

    /// Record that the peer answered an outgoing call.
    pub fn mark_accepted(&mut self) {
        self.accepted = true;
    }

    /// Whether a stream is running for this session.
    pub fn has_media(&self) -> bool {
        self.media.is_some()
    }

    /// Whether a stream start has been requested but not yet reported back.
    pub fn is_media_pending(&self) -> bool {
        self.media_pending
    }

    /// Whether a media endpoint would start a stream now.
    pub fn wants_media(&self) -> bool {
        self.phase != Phase::Idle && !self.media_pending && self.media.is_none()
    }

    /// Move to [`Phase::Active`] and mark the stream start as in flight.
    ///
    /// Returns `false` if the session cannot take media now.
    pub fn begin_media(&mut self) -> bool {
        if !self.wants_media() {
            return false;
        }
        self.phase = Phase::Active;
        self.accepted = true;
        self.media_pending = true;
        true
    }

    /// Attach the handle of a started stream.
    ///
    /// Hands the handle back if the session is not waiting for one, so the
    /// caller can release it.
    pub fn attach_media(&mut self, handle: MediaHandle) -> Result<(), MediaHandle> {
        if self.phase == Phase::Idle || !self.media_pending || self.media.is_some() {
            return Err(handle);
        }
        self.media_pending = false;
        self.media = Some(handle);
        Ok(())
    }

    /// Whether [`CallSession::terminate`] has run.
    pub fn is_terminated(&self) -> bool {
        self.phase == Phase::Idle
    }

    /// Terminate the session and release its media handle.
    ///
    /// Idempotent: only the first call can return a handle.
    pub fn terminate(&mut self) -> Option<MediaHandle> {
        self.phase = Phase::Idle;
        self.media_pending = false;
        self.media.take()
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;

    fn endpoint() -> MediaEndpoint {
        MediaEndpoint::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 4243)
    }

    #[test]
    fn outgoing_session_activates_on_media() {
        let mut session = CallSession::outgoing(SessionId(1), 3);
        assert_eq!(session.phase(), Phase::Ringing);
        assert!(!session.is_accepted());

        assert!(session.begin_media());
        assert_eq!(session.phase(), Phase::Active);
        assert!(session.is_media_pending());

        // Second endpoint while the first start is in flight is refused
        assert!(!session.begin_media());

        assert!(session.attach_media(MediaHandle::new(9, endpoint())).is_ok());
        assert!(session.has_media());
        assert!(!session.is_media_pending());
    }

    #[test]
    fn terminate_releases_handle_once() {
        let mut session = CallSession::incoming(SessionId(2), 7);
        assert!(session.begin_media());
        assert!(session.attach_media(MediaHandle::new(1, endpoint())).is_ok());

        let first = session.terminate();
        let second = session.terminate();

        assert_eq!(first.map(|h| h.id()), Some(1));
        assert!(second.is_none());
        assert!(session.is_terminated());
    }

    #[test]
    fn attach_after_terminate_hands_handle_back() {
        let mut session = CallSession::outgoing(SessionId(3), 3);
        assert!(session.begin_media());
        let _ = session.terminate();

        let rejected = session.attach_media(MediaHandle::new(5, endpoint()));
        assert_eq!(rejected.map_err(|h| h.id()), Err(5));
    }

    #[test]
    fn endpoint_display_brackets_ipv6() {
        let v6 = MediaEndpoint::new("::1".parse().unwrap(), 10);
        assert_eq!(v6.to_string(), "[::1]:10");
        assert_eq!(endpoint().to_string(), "127.0.0.1:4243");
    }
}
