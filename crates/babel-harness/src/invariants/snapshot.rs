//! Observable state snapshots for invariant checking.
//!
//! Snapshots capture the observable state of the coordinator at a point in
//! time. Invariants operate on snapshots rather than live state, so every
//! check in one pass sees the same consistent view.

use babel_client::{CallButton, CallCoordinator, CallState, ConnectionState};
use babel_core::{ContactId, Direction, Phase, Presence, SessionId};

use crate::SimDriver;

/// Snapshot of one coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorSnapshot {
    /// Global call state.
    pub state: CallState,
    /// The session in the call slot, if any.
    pub session: Option<SessionSnapshot>,
    /// Contact ids in roster order.
    pub contact_ids: Vec<ContactId>,
    /// Chat pane owners in display order.
    pub pane_ids: Vec<ContactId>,
    /// `order_index` of each contact, in roster order.
    pub order_indices: Vec<usize>,
    /// Contact configured as the local account.
    pub expected_self_id: ContactId,
    /// Currently viewed contact.
    pub selected: Option<ContactId>,
    /// Call button state computed by the coordinator.
    pub button: CallButton,
    /// Signaling connection state.
    pub connection: ConnectionState,
    /// Status shown for the local account.
    pub own_status: Presence,
    /// Driver-side observations. `None` when checking a bare coordinator.
    pub driver: Option<DriverSnapshot>,
}

impl CoordinatorSnapshot {
    /// Capture a coordinator's observable state.
    pub fn capture(coordinator: &CallCoordinator) -> Self {
        let roster = coordinator.roster();
        Self {
            state: coordinator.state(),
            session: coordinator.session().map(|session| SessionSnapshot {
                id: session.id(),
                peer_id: session.peer_id(),
                direction: session.direction(),
                phase: session.phase(),
                has_media: session.has_media(),
                media_pending: session.is_media_pending(),
            }),
            contact_ids: roster.contacts().iter().map(|c| c.id).collect(),
            pane_ids: roster.panes().iter().map(|p| p.contact_id()).collect(),
            order_indices: roster.contacts().iter().map(|c| c.order_index).collect(),
            expected_self_id: coordinator.config().self_id,
            selected: coordinator.selected(),
            button: coordinator.call_button(),
            connection: coordinator.connection(),
            own_status: coordinator.own_status(),
            driver: None,
        }
    }

    /// Attach driver-side observations.
    #[must_use]
    pub fn with_driver(mut self, driver: DriverSnapshot) -> Self {
        self.driver = Some(driver);
        self
    }
}

/// Snapshot of the session in the call slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Session id.
    pub id: SessionId,
    /// Peer.
    pub peer_id: ContactId,
    /// Who initiated the call.
    pub direction: Direction,
    /// Current phase.
    pub phase: Phase,
    /// Whether a media handle is attached.
    pub has_media: bool,
    /// Whether a stream start is in flight.
    pub media_pending: bool,
}

/// What the simulated adapters observed.
#[derive(Debug, Clone, Default)]
pub struct DriverSnapshot {
    /// Stream handles still running.
    pub active_streams: Vec<u64>,
    /// Stream handles stopped so far, duplicates included.
    pub stopped_streams: Vec<u64>,
    /// Last call button state delivered to the UI.
    pub shown_button: Option<CallButton>,
}

impl DriverSnapshot {
    /// Capture a simulation driver's observations.
    pub fn capture(driver: &SimDriver) -> Self {
        Self {
            active_streams: driver.active_streams(),
            stopped_streams: driver.stopped_streams(),
            shown_button: driver.last_button(),
        }
    }
}
