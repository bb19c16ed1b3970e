//! Call coordinator state machine.
//!
//! The coordinator owns the roster, the single call slot, the selected
//! contact and the connection state. It is pure: every method takes one input
//! and returns the [`CallAction`]s the runtime must execute.
//!
//! # Call slot
//!
//! ```text
//!                 incoming call                 accept
//!   ┌────────┐ ─────────────────► ┌───────────┐ ────────► ┌─────────────┐
//!   │ Empty  │                    │ Prompting │           │ Busy(in)    │
//!   └────────┘ ◄───────────────── └───────────┘           └─────────────┘
//!     │   ▲     decline / second caller / ended                 │
//!     │   │                                                     │
//!     │   └──── hang up / ended / declined / media failed ──────┤
//!     │                                                         │
//!     │ place call   ┌────────────────┐   media endpoint   ┌─────────────┐
//!     └────────────► │ Busy(ringing)  │ ─────────────────► │ Busy(active)│
//!                    └────────────────┘                    └─────────────┘
//! ```
//!
//! Disconnects empty the slot from any state. A busy slot refuses every other
//! caller with an automatic decline.

use std::{mem, time::Duration};

use babel_core::{
    CallError, CallSession, ChatLine, ContactId, Direction, LineOrigin, MediaEndpoint, Phase,
    Presence, Roster, SessionId, SlotOwner, Upsert,
};

use crate::{
    CallAction, CallButton, CallInput, CallState, ConnectionState, MediaEvent, SignalingCommand,
    SignalingEvent, UiNotification, UserIntent,
};

/// Default delay before the single reconnect attempt after a disconnect.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(10);

/// Coordinator settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Contact id of the local account (roster slot 0).
    pub self_id: ContactId,
    /// Display name of the local account.
    pub username: String,
    /// Status published once connected.
    pub initial_status: Presence,
    /// Delay before reconnecting after the server dropped us.
    pub reconnect_delay: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            self_id: 0,
            username: "me".to_string(),
            initial_status: Presence::Available,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
        }
    }
}

#[derive(Debug)]
enum CallSlot {
    Empty,
    Prompting { peer_id: ContactId },
    Busy(CallSession),
}

/// Single-call coordinator for one running client.
#[derive(Debug)]
pub struct CallCoordinator {
    config: CoordinatorConfig,
    roster: Roster,
    slot: CallSlot,
    next_session: u64,
    selected: Option<ContactId>,
    connection: ConnectionState,
    own_status: Presence,
    desired_status: Presence,
    reconnect_pending: bool,
    reconnecting: bool,
    button: CallButton,
}

impl CallCoordinator {
    /// Create an offline coordinator whose roster holds only the local
    /// account.
    pub fn new(config: CoordinatorConfig) -> Self {
        let mut roster = Roster::new();
        roster.upsert(config.self_id, &config.username, Presence::Offline);

        Self {
            desired_status: config.initial_status,
            config,
            roster,
            slot: CallSlot::Empty,
            next_session: 1,
            selected: None,
            connection: ConnectionState::Offline,
            own_status: Presence::Offline,
            reconnect_pending: false,
            reconnecting: false,
            button: CallButton::DISABLED,
        }
    }

    /// Process any input.
    pub fn dispatch(&mut self, input: CallInput) -> Vec<CallAction> {
        match input {
            CallInput::User(intent) => self.handle_intent(intent),
            CallInput::Signaling(event) => self.handle(event),
            CallInput::Media(event) => self.handle_media(event),
            CallInput::ReconnectDue => self.reconnect_due(),
        }
    }

    /// Process a user intent.
    pub fn handle_intent(&mut self, intent: UserIntent) -> Vec<CallAction> {
        match intent {
            UserIntent::PlaceCall { peer_id } => self.place_call(peer_id),
            UserIntent::AcceptCall { peer_id } => self.accept_call(peer_id),
            UserIntent::DeclineCall { peer_id } => self.decline_call(peer_id),
            UserIntent::HangUp => self.hang_up(),
            UserIntent::EndCall { session_id } => self.end_call(session_id),
            UserIntent::CallButtonClicked => self.call_button_clicked(),
            UserIntent::SelectContact { peer_id } => self.select_contact(peer_id),
            UserIntent::ReorderContact { peer_id, index } => self.reorder_contact(peer_id, index),
            UserIntent::AddContact { username } => self.add_contact(&username),
            UserIntent::RemoveContact { peer_id } => self.remove_contact(peer_id),
            UserIntent::SendMessage { peer_id, text, timestamp } => {
                self.send_message(peer_id, &text, timestamp)
            },
            UserIntent::SetOwnStatus { presence } => self.set_own_status(presence),
        }
    }

    /// Process a signaling event.
    pub fn handle(&mut self, event: SignalingEvent) -> Vec<CallAction> {
        let result = match event {
            SignalingEvent::IncomingCall { peer_id } => Ok(self.on_incoming_call(peer_id)),
            SignalingEvent::CallAccepted { peer_id } => Ok(self.on_call_accepted(peer_id)),
            SignalingEvent::CallDeclined { peer_id } => Ok(self.on_call_declined(peer_id)),
            SignalingEvent::CallEnded { peer_id } => Ok(self.on_call_ended(peer_id)),
            SignalingEvent::PeerMediaEndpoint { peer_id, endpoint } => {
                Ok(self.on_media_endpoint(peer_id, endpoint))
            },
            SignalingEvent::PresenceChanged { peer_id, presence } => {
                Ok(self.upsert_contact(peer_id, "", presence, false))
            },
            SignalingEvent::ContactInfo { peer_id, display_name, presence } => {
                Ok(self.upsert_contact(peer_id, &display_name, presence, true))
            },
            SignalingEvent::ContactAddResult { success } => Ok(Self::on_contact_add_result(success)),
            SignalingEvent::MessageReceived { peer_id, text, timestamp } => {
                self.append_line(peer_id, LineOrigin::Remote, text, timestamp)
            },
            SignalingEvent::Connected { success } => Ok(self.on_connected(success)),
            SignalingEvent::Disconnected => Ok(self.on_disconnected()),
        };
        self.settle(result)
    }

    /// Process the outcome of a stream start.
    pub fn handle_media(&mut self, event: MediaEvent) -> Vec<CallAction> {
        let result = match event {
            MediaEvent::Started { session_id, handle } => match &mut self.slot {
                CallSlot::Busy(session) if session.id() == session_id => {
                    match session.attach_media(handle) {
                        Ok(()) => {
                            tracing::info!(%session_id, "media stream running");
                            Ok(Vec::new())
                        },
                        Err(handle) => {
                            tracing::warn!(%session_id, "unexpected media handle, releasing");
                            Ok(vec![CallAction::StopStream { handle }])
                        },
                    }
                },
                _ => {
                    tracing::debug!(%session_id, "media started for ended session, releasing");
                    Ok(vec![CallAction::StopStream { handle }])
                },
            },
            MediaEvent::Failed { session_id, error } => {
                Ok(self.on_media_failed(session_id, error.into()))
            },
        };
        self.settle(result)
    }

    /// Call a contact.
    ///
    /// Requires no call in progress, a live connection, and a known contact
    /// that is not offline.
    pub fn place_call(&mut self, peer_id: ContactId) -> Vec<CallAction> {
        let result = self.try_place_call(peer_id);
        self.settle(result)
    }

    /// Accept the pending incoming call from `peer_id`.
    pub fn accept_call(&mut self, peer_id: ContactId) -> Vec<CallAction> {
        let result = self.try_accept_call(peer_id);
        self.settle(result)
    }

    /// Decline the pending incoming call from `peer_id`.
    pub fn decline_call(&mut self, peer_id: ContactId) -> Vec<CallAction> {
        let result = self.try_decline_call(peer_id);
        self.settle(result)
    }

    /// Hang up the current call, ringing or established. A pending prompt is
    /// declined.
    pub fn hang_up(&mut self) -> Vec<CallAction> {
        let result = self.try_hang_up();
        self.settle(result)
    }

    /// Hang up session `session_id`.
    ///
    /// Idempotent: ending a session that is already gone produces nothing.
    pub fn end_call(&mut self, session_id: SessionId) -> Vec<CallAction> {
        let mut actions = Vec::new();
        match &self.slot {
            CallSlot::Busy(session) if session.id() == session_id => {
                self.teardown(true, &mut actions);
            },
            _ => tracing::debug!(%session_id, "session already ended"),
        }
        self.settle(Ok(actions))
    }

    /// Click on the call button of the selected contact.
    pub fn call_button_clicked(&mut self) -> Vec<CallAction> {
        let idle = matches!(self.slot, CallSlot::Empty);
        let in_call = matches!(self.slot, CallSlot::Busy(_));
        let result = match self.selected {
            Some(selected) if idle => self.try_place_call(selected),
            Some(selected) if in_call && self.slot_peer() == Some(selected) => self.try_hang_up(),
            _ => Err(self.invalid("use the call button")),
        };
        self.settle(result)
    }

    /// Change the viewed contact. Sessions are unaffected.
    pub fn select_contact(&mut self, peer_id: ContactId) -> Vec<CallAction> {
        let result = if self.roster.find(peer_id).is_some() {
            let mut actions = Vec::new();
            self.select(peer_id, &mut actions);
            Ok(actions)
        } else {
            Err(CallError::UnknownContact { peer_id })
        };
        self.settle(result)
    }

    /// Move a contact and its chat pane to `index`.
    pub fn reorder_contact(&mut self, peer_id: ContactId, index: usize) -> Vec<CallAction> {
        let result = if self.roster.find(peer_id).is_none() {
            Err(CallError::UnknownContact { peer_id })
        } else if let Some((from, to)) = self.roster.reorder(peer_id, index) {
            Ok(vec![CallAction::Notify(UiNotification::ContactReordered { peer_id, from, to })])
        } else {
            Ok(Vec::new())
        };
        self.settle(result)
    }

    /// Ask the server to add a contact by username.
    ///
    /// Empty names and names already in the roster are skipped.
    pub fn add_contact(&mut self, username: &str) -> Vec<CallAction> {
        let username = username.trim();
        let result = if username.is_empty() {
            Ok(Vec::new())
        } else if self.roster.find_by_name(username).is_some() {
            tracing::debug!(username, "contact already in roster");
            Ok(Vec::new())
        } else if self.connection != ConnectionState::Online {
            Err(self.offline("add a contact"))
        } else {
            Ok(vec![CallAction::Signal(SignalingCommand::AddContact {
                username: username.to_string(),
            })])
        };
        self.settle(result)
    }

    /// Delete a contact, ending any call or prompt involving it first.
    pub fn remove_contact(&mut self, peer_id: ContactId) -> Vec<CallAction> {
        let result = self.try_remove_contact(peer_id);
        self.settle(result)
    }

    /// Send a chat message. Tabs are expanded to four spaces.
    pub fn send_message(&mut self, peer_id: ContactId, text: &str, timestamp: u64) -> Vec<CallAction> {
        let result = if text.trim().is_empty() {
            Ok(Vec::new())
        } else if self.connection != ConnectionState::Online {
            Err(self.offline("send a message"))
        } else {
            let text = text.replace('\t', "    ");
            self.append_line(peer_id, LineOrigin::Local, text.clone(), timestamp).map(|mut actions| {
                actions.insert(0, CallAction::Signal(SignalingCommand::SendMessage { peer_id, text }));
                actions
            })
        };
        self.settle(result)
    }

    /// Change the local user's status.
    ///
    /// Going [`Presence::Offline`] ends any call, clears presence and closes
    /// the connection without scheduling a reconnect. Any other status
    /// connects first when offline.
    pub fn set_own_status(&mut self, presence: Presence) -> Vec<CallAction> {
        let mut actions = Vec::new();

        if presence == Presence::Offline {
            self.desired_status = Presence::Offline;
            self.reconnect_pending = false;
            self.reconnecting = false;

            let online = self.connection == ConnectionState::Online;
            self.teardown(online, &mut actions);
            self.reset_presence(&mut actions);
            if self.connection != ConnectionState::Offline {
                actions.push(CallAction::Signal(SignalingCommand::Disconnect));
            }
            self.set_connection(ConnectionState::Offline, &mut actions);
            self.apply_own_status(Presence::Offline, &mut actions);
            return self.settle(Ok(actions));
        }

        self.desired_status = presence;
        match self.connection {
            ConnectionState::Online => {
                actions.push(CallAction::Signal(SignalingCommand::SetOwnStatus { presence }));
                self.apply_own_status(presence, &mut actions);
            },
            ConnectionState::Offline => {
                self.reconnect_pending = false;
                self.reconnecting = false;
                self.set_connection(ConnectionState::Connecting, &mut actions);
                actions.push(CallAction::Signal(SignalingCommand::Connect));
            },
            ConnectionState::Connecting => {
                tracing::debug!(%presence, "status recorded until connected");
            },
        }
        self.settle(Ok(actions))
    }

    /// The reconnect delay elapsed.
    ///
    /// Connects only if a reconnect is still pending, the client is still
    /// offline, and the user still wants to be online. If this attempt is
    /// lost again the client stays offline.
    pub fn reconnect_due(&mut self) -> Vec<CallAction> {
        let mut actions = Vec::new();
        if !mem::take(&mut self.reconnect_pending) {
            tracing::debug!("no reconnect pending");
        } else if self.connection != ConnectionState::Offline || !self.desired_status.is_online() {
            tracing::debug!(connection = ?self.connection, "reconnect no longer needed");
        } else {
            tracing::info!("reconnecting to signaling server");
            self.reconnecting = true;
            self.set_connection(ConnectionState::Connecting, &mut actions);
            actions.push(CallAction::Signal(SignalingCommand::Connect));
        }
        self.settle(Ok(actions))
    }

    /// Current call state.
    pub fn state(&self) -> CallState {
        match &self.slot {
            CallSlot::Empty => CallState::NoCall,
            CallSlot::Prompting { peer_id } => CallState::RingingIncoming { peer_id: *peer_id },
            CallSlot::Busy(session) => match session.phase() {
                Phase::Ringing => CallState::RingingOutgoing { peer_id: session.peer_id() },
                Phase::Active | Phase::Idle => CallState::InCall { peer_id: session.peer_id() },
            },
        }
    }

    /// The active or ringing session, if any.
    pub fn session(&self) -> Option<&CallSession> {
        match &self.slot {
            CallSlot::Busy(session) => Some(session),
            _ => None,
        }
    }

    /// Contact list and chat panes.
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Currently viewed contact.
    pub fn selected(&self) -> Option<ContactId> {
        self.selected
    }

    /// Signaling connection state.
    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    /// Status currently shown for the local account.
    pub fn own_status(&self) -> Presence {
        self.own_status
    }

    /// Status the user asked for.
    pub fn desired_status(&self) -> Presence {
        self.desired_status
    }

    /// Whether a reconnect attempt is scheduled.
    pub fn is_reconnect_pending(&self) -> bool {
        self.reconnect_pending
    }

    /// Settings this coordinator was built with.
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Call button state for the selected contact.
    pub fn call_button(&self) -> CallButton {
        let Some(selected) = self.selected else {
            return CallButton::DISABLED;
        };
        if Some(selected) == self.roster.self_id() {
            return CallButton::DISABLED;
        }
        match &self.slot {
            CallSlot::Empty => CallButton::START,
            CallSlot::Busy(session) if session.peer_id() == selected => CallButton::STOP,
            _ => CallButton::DISABLED,
        }
    }

    fn try_place_call(&mut self, peer_id: ContactId) -> Result<Vec<CallAction>, CallError> {
        if self.connection != ConnectionState::Online {
            return Err(self.offline("place a call"));
        }
        if !matches!(self.slot, CallSlot::Empty) {
            return Err(self.invalid("place a call"));
        }
        if Some(peer_id) == self.roster.self_id() {
            return Err(self.invalid("call yourself"));
        }
        let contact = self.roster.find(peer_id).ok_or(CallError::UnknownContact { peer_id })?;
        if !contact.presence.is_online() {
            return Err(CallError::InvalidTransition {
                state: format!("contact {peer_id} is offline"),
                operation: "place a call",
            });
        }

        let session = CallSession::outgoing(self.allocate_session_id(), peer_id);
        tracing::info!(session_id = %session.id(), peer_id, "placing call");
        self.slot = CallSlot::Busy(session);

        let mut actions = vec![CallAction::Signal(SignalingCommand::SendCallRequest { peer_id })];
        self.select(peer_id, &mut actions);
        Ok(actions)
    }

    fn try_accept_call(&mut self, peer_id: ContactId) -> Result<Vec<CallAction>, CallError> {
        if !matches!(self.slot, CallSlot::Prompting { peer_id: pending } if pending == peer_id) {
            return Err(self.invalid("accept a call"));
        }

        let session = CallSession::incoming(self.allocate_session_id(), peer_id);
        tracing::info!(session_id = %session.id(), peer_id, "accepted incoming call");
        self.slot = CallSlot::Busy(session);

        let mut actions = vec![CallAction::Signal(SignalingCommand::SendAccept { peer_id })];
        self.select(peer_id, &mut actions);
        Ok(actions)
    }

    fn try_decline_call(&mut self, peer_id: ContactId) -> Result<Vec<CallAction>, CallError> {
        if !matches!(self.slot, CallSlot::Prompting { peer_id: pending } if pending == peer_id) {
            return Err(self.invalid("decline a call"));
        }
        tracing::info!(peer_id, "declined incoming call");
        self.slot = CallSlot::Empty;
        Ok(vec![CallAction::Signal(SignalingCommand::SendDecline { peer_id })])
    }

    fn try_hang_up(&mut self) -> Result<Vec<CallAction>, CallError> {
        match self.slot {
            CallSlot::Empty => Err(self.invalid("hang up")),
            CallSlot::Prompting { peer_id } => self.try_decline_call(peer_id),
            CallSlot::Busy(_) => {
                let mut actions = Vec::new();
                self.teardown(true, &mut actions);
                Ok(actions)
            },
        }
    }

    fn try_remove_contact(&mut self, peer_id: ContactId) -> Result<Vec<CallAction>, CallError> {
        if Some(peer_id) == self.roster.self_id() {
            return Err(self.invalid("remove your own entry"));
        }
        if self.roster.find(peer_id).is_none() {
            return Err(CallError::UnknownContact { peer_id });
        }

        let mut actions = Vec::new();
        if self.slot_peer() == Some(peer_id) {
            self.teardown(true, &mut actions);
        }
        self.roster.remove(peer_id);
        if self.selected == Some(peer_id) {
            self.selected = None;
        }
        actions.push(CallAction::Signal(SignalingCommand::DeleteContact { peer_id }));
        actions.push(CallAction::Notify(UiNotification::ContactRemoved { peer_id }));
        Ok(actions)
    }

    fn on_incoming_call(&mut self, peer_id: ContactId) -> Vec<CallAction> {
        if self.connection != ConnectionState::Online {
            tracing::debug!(peer_id, connection = ?self.connection, "call request while not online ignored");
            return Vec::new();
        }
        if Some(peer_id) == self.roster.self_id() {
            tracing::warn!(peer_id, "call request from own account ignored");
            return Vec::new();
        }
        if self.roster.find(peer_id).is_none() {
            let error = CallError::UnknownContact { peer_id };
            tracing::warn!(%error, "declining call from stranger");
            return vec![decline(peer_id)];
        }

        match &self.slot {
            CallSlot::Empty => {
                tracing::info!(peer_id, "incoming call");
                self.slot = CallSlot::Prompting { peer_id };
                let mut actions = Vec::new();
                self.select(peer_id, &mut actions);
                actions.push(CallAction::Notify(UiNotification::IncomingCallPrompt { peer_id }));
                actions
            },
            CallSlot::Prompting { peer_id: pending } if *pending == peer_id => {
                tracing::debug!(peer_id, "duplicate call request");
                Vec::new()
            },
            CallSlot::Prompting { peer_id: pending } => {
                let error = CallError::SessionConflict {
                    active: SlotOwner::Prompt { peer_id: *pending },
                    requested: peer_id,
                };
                tracing::warn!(%error, "declining both callers");
                let mut actions = vec![decline(peer_id)];
                self.teardown(true, &mut actions);
                actions
            },
            CallSlot::Busy(session) if session.peer_id() == peer_id => {
                tracing::debug!(peer_id, "call request from current peer ignored");
                Vec::new()
            },
            CallSlot::Busy(session) => {
                let error = CallError::SessionConflict {
                    active: SlotOwner::Session { id: session.id(), peer_id: session.peer_id() },
                    requested: peer_id,
                };
                tracing::warn!(%error, "auto-declining");
                vec![decline(peer_id)]
            },
        }
    }

    fn on_call_accepted(&mut self, peer_id: ContactId) -> Vec<CallAction> {
        match &mut self.slot {
            CallSlot::Busy(session)
                if session.peer_id() == peer_id && session.direction() == Direction::Outgoing =>
            {
                tracing::info!(session_id = %session.id(), peer_id, "call accepted by peer");
                session.mark_accepted();
            },
            _ => tracing::debug!(peer_id, "accept for unknown call ignored"),
        }
        Vec::new()
    }

    fn on_call_declined(&mut self, peer_id: ContactId) -> Vec<CallAction> {
        let mut actions = Vec::new();
        match &self.slot {
            CallSlot::Busy(session)
                if session.peer_id() == peer_id
                    && session.direction() == Direction::Outgoing
                    && session.phase() == Phase::Ringing =>
            {
                tracing::info!(session_id = %session.id(), peer_id, "call declined by peer");
                self.teardown(false, &mut actions);
            },
            _ => tracing::debug!(peer_id, "decline for unknown call ignored"),
        }
        actions
    }

    fn on_call_ended(&mut self, peer_id: ContactId) -> Vec<CallAction> {
        let mut actions = Vec::new();
        if self.slot_peer() == Some(peer_id) {
            tracing::info!(peer_id, "call ended by peer");
            self.teardown(false, &mut actions);
        } else {
            tracing::debug!(peer_id, "end for unknown call ignored");
        }
        actions
    }

    fn on_media_endpoint(&mut self, peer_id: ContactId, endpoint: MediaEndpoint) -> Vec<CallAction> {
        if let CallSlot::Busy(session) = &mut self.slot {
            if session.peer_id() == peer_id && session.begin_media() {
                let session_id = session.id();
                tracing::info!(%session_id, %endpoint, "starting media stream");
                return vec![CallAction::StartStream { session_id, endpoint }];
            }
        }
        tracing::debug!(peer_id, %endpoint, "media endpoint ignored");
        Vec::new()
    }

    fn on_media_failed(&mut self, session_id: SessionId, error: CallError) -> Vec<CallAction> {
        if !matches!(&self.slot, CallSlot::Busy(session) if session.id() == session_id) {
            tracing::debug!(%session_id, %error, "media failure for ended session");
            return Vec::new();
        }

        tracing::warn!(%session_id, %error, "media start failed");
        let mut actions = Vec::new();
        self.teardown(true, &mut actions);
        actions.push(error_toast("Call failed", error.to_string()));
        actions
    }

    fn on_contact_add_result(success: bool) -> Vec<CallAction> {
        if success {
            vec![CallAction::Signal(SignalingCommand::ListContacts)]
        } else {
            vec![error_toast("Add contact", "The server refused the contact request")]
        }
    }

    fn on_connected(&mut self, success: bool) -> Vec<CallAction> {
        let mut actions = Vec::new();

        if !success {
            tracing::warn!("connection to signaling server failed");
            self.desired_status = Presence::Offline;
            self.reconnecting = false;
            self.teardown(false, &mut actions);
            self.set_connection(ConnectionState::Offline, &mut actions);
            self.apply_own_status(Presence::Offline, &mut actions);
            return actions;
        }

        if !self.desired_status.is_online() {
            tracing::debug!("connected after going offline, disconnecting");
            actions.push(CallAction::Signal(SignalingCommand::Disconnect));
            return actions;
        }

        let presence = self.desired_status;
        tracing::info!(%presence, "connected to signaling server");
        self.reconnect_pending = false;
        self.reconnecting = false;
        self.set_connection(ConnectionState::Online, &mut actions);
        actions.push(CallAction::Signal(SignalingCommand::SetOwnStatus { presence }));
        self.apply_own_status(presence, &mut actions);
        actions
    }

    fn on_disconnected(&mut self) -> Vec<CallAction> {
        let mut actions = Vec::new();

        if !self.desired_status.is_online() {
            tracing::debug!("disconnected while offline by choice");
            self.teardown(false, &mut actions);
            self.set_connection(ConnectionState::Offline, &mut actions);
            return actions;
        }

        let error = CallError::SignalingDisconnected;
        tracing::warn!(%error, "lost signaling connection");
        self.teardown(false, &mut actions);
        self.set_connection(ConnectionState::Offline, &mut actions);
        self.reset_presence(&mut actions);

        if mem::take(&mut self.reconnecting) {
            tracing::warn!("reconnect attempt lost, staying offline");
            self.desired_status = Presence::Offline;
            self.reconnect_pending = false;
            self.apply_own_status(Presence::Offline, &mut actions);
            return actions;
        }

        if self.reconnect_pending {
            tracing::debug!("reconnect already scheduled");
        } else {
            self.reconnect_pending = true;
            actions.push(error_toast("Disconnected", "You've been disconnected!"));
            actions.push(CallAction::ScheduleReconnect { delay: self.config.reconnect_delay });
        }
        actions
    }

    fn upsert_contact(
        &mut self,
        peer_id: ContactId,
        display_name: &str,
        presence: Presence,
        always_notify: bool,
    ) -> Vec<CallAction> {
        let mut actions = Vec::new();
        let icon = CallAction::Notify(UiNotification::PresenceIconChanged { peer_id, presence });

        match self.roster.upsert(peer_id, display_name, presence) {
            Upsert::Inserted { index } => {
                tracing::debug!(peer_id, index, %presence, "contact added");
                actions.push(CallAction::Notify(UiNotification::ContactAdded { peer_id, index }));
                actions.push(icon);
            },
            Upsert::Updated { presence_changed } => {
                if presence_changed || always_notify {
                    actions.push(icon);
                }
            },
        }
        actions
    }

    fn append_line(
        &mut self,
        peer_id: ContactId,
        origin: LineOrigin,
        text: String,
        timestamp: u64,
    ) -> Result<Vec<CallAction>, CallError> {
        let pane = self.roster.pane_mut(peer_id).ok_or(CallError::UnknownContact { peer_id })?;
        pane.push(ChatLine { origin, text, timestamp });
        Ok(vec![CallAction::Notify(UiNotification::MessageAppended { peer_id, origin })])
    }

    /// Empty the call slot.
    ///
    /// A session releases its media handle; a prompt is withdrawn. With
    /// `notify_peer` the peer gets `SendEndCall` (session) or `SendDecline`
    /// (prompt).
    fn teardown(&mut self, notify_peer: bool, actions: &mut Vec<CallAction>) {
        match mem::replace(&mut self.slot, CallSlot::Empty) {
            CallSlot::Empty => {},
            CallSlot::Prompting { peer_id } => {
                if notify_peer {
                    actions.push(decline(peer_id));
                }
                actions.push(CallAction::Notify(UiNotification::IncomingCallWithdrawn { peer_id }));
            },
            CallSlot::Busy(mut session) => {
                debug_assert!(!session.is_terminated(), "{} torn down twice", session.id());
                let peer_id = session.peer_id();
                if let Some(handle) = session.terminate() {
                    actions.push(CallAction::StopStream { handle });
                }
                if notify_peer {
                    actions.push(CallAction::Signal(SignalingCommand::SendEndCall { peer_id }));
                }
                tracing::info!(session_id = %session.id(), peer_id, "call ended");
            },
        }
    }

    /// Convert an operation result into actions and redraw the call button
    /// if it changed.
    fn settle(&mut self, result: Result<Vec<CallAction>, CallError>) -> Vec<CallAction> {
        let mut actions = match result {
            Ok(actions) => actions,
            Err(error) if error.is_user_visible() => {
                tracing::warn!(%error, "operation failed");
                vec![error_toast("Error", error.to_string())]
            },
            Err(error) => {
                tracing::debug!(%error, "operation ignored");
                Vec::new()
            },
        };

        let button = self.call_button();
        if button != self.button {
            self.button = button;
            actions.push(CallAction::Notify(UiNotification::CallButtonState(button)));
        }
        actions
    }

    fn select(&mut self, peer_id: ContactId, actions: &mut Vec<CallAction>) {
        if self.selected != Some(peer_id) {
            self.selected = Some(peer_id);
            actions.push(CallAction::Notify(UiNotification::ContactSelected { peer_id }));
        }
    }

    fn set_connection(&mut self, state: ConnectionState, actions: &mut Vec<CallAction>) {
        if self.connection != state {
            self.connection = state;
            actions.push(CallAction::Notify(UiNotification::ConnectionChanged { state }));
        }
    }

    fn apply_own_status(&mut self, presence: Presence, actions: &mut Vec<CallAction>) {
        if self.own_status == presence {
            return;
        }
        self.own_status = presence;
        actions.push(CallAction::Notify(UiNotification::OwnStatusChanged { presence }));
        if let Some(peer_id) = self.roster.set_self_presence(presence) {
            actions.push(CallAction::Notify(UiNotification::PresenceIconChanged { peer_id, presence }));
        }
    }

    fn reset_presence(&mut self, actions: &mut Vec<CallAction>) {
        for peer_id in self.roster.reset_all_but_first() {
            actions.push(CallAction::Notify(UiNotification::PresenceIconChanged {
                peer_id,
                presence: Presence::Offline,
            }));
        }
    }

    fn slot_peer(&self) -> Option<ContactId> {
        match &self.slot {
            CallSlot::Empty => None,
            CallSlot::Prompting { peer_id } => Some(*peer_id),
            CallSlot::Busy(session) => Some(session.peer_id()),
        }
    }

    fn allocate_session_id(&mut self) -> SessionId {
        let id = SessionId(self.next_session);
        self.next_session += 1;
        id
    }

    fn invalid(&self, operation: &'static str) -> CallError {
        CallError::InvalidTransition { state: self.state().to_string(), operation }
    }

    fn offline(&self, operation: &'static str) -> CallError {
        CallError::InvalidTransition { state: format!("{:?}", self.connection).to_lowercase(), operation }
    }
}

fn decline(peer_id: ContactId) -> CallAction {
    CallAction::Signal(SignalingCommand::SendDecline { peer_id })
}

fn error_toast(title: &str, message: impl Into<String>) -> CallAction {
    CallAction::Notify(UiNotification::ErrorToast { title: title.to_string(), message: message.into() })
}
