//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` provides the same interface as the console driver but for
//! deterministic testing. It implements [`Driver`] so the same
//! [`babel_app::Runtime`] orchestration code runs in both production and
//! simulation.
//!
//! Time is virtual: [`SimDriver::advance`] moves the clock, nothing else does.
//! Stream starts succeed unless a failure was scripted with
//! [`SimDriver::fail_next_stream`].

use std::{
    collections::{BTreeSet, VecDeque},
    ops::{Add, Sub},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use babel_app::{Driver, Input};
use babel_client::{CallButton, SignalingCommand, SignalingEvent, UiNotification, UserIntent};
use babel_core::{MediaEndpoint, MediaError, MediaHandle};

/// Error type for simulation driver.
#[derive(Debug, Clone)]
pub struct SimDriverError(pub String);

impl std::fmt::Display for SimDriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SimDriverError: {}", self.0)
    }
}

impl std::error::Error for SimDriverError {}

/// Virtual time instant, measured from the start of the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct SimInstant(pub Duration);

impl Sub for SimInstant {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Duration {
        self.0.saturating_sub(rhs.0)
    }
}

impl Add<Duration> for SimInstant {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self {
        Self(self.0 + rhs)
    }
}

/// Shared state for input injection and output inspection.
///
/// Clones of a [`SimDriver`] share this, so a test can keep a handle while
/// the runtime owns the driver.
#[derive(Default)]
struct SharedState {
    pending_inputs: VecDeque<Input>,
    commands: Vec<SignalingCommand>,
    notifications: Vec<UiNotification>,
    last_button: Option<CallButton>,
    scripted_failures: VecDeque<MediaError>,
    started: Vec<MediaEndpoint>,
    active_streams: BTreeSet<u64>,
    stopped: Vec<u64>,
    next_handle: u64,
    clock: Duration,
    closed: bool,
    stop_called: bool,
}

/// Simulation driver for deterministic testing.
#[derive(Clone, Default)]
pub struct SimDriver {
    state: Arc<Mutex<SharedState>>,
}

impl SimDriver {
    /// Create a new simulation driver.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SharedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue an input for [`Driver::poll_input`].
    pub fn inject(&self, input: Input) {
        self.lock().pending_inputs.push_back(input);
    }

    /// Queue a signaling event.
    pub fn inject_signaling(&self, event: SignalingEvent) {
        self.inject(Input::Signaling(event));
    }

    /// Queue a user intent.
    pub fn inject_intent(&self, intent: UserIntent) {
        self.inject(Input::User(intent));
    }

    /// Make the next stream start fail with `error`.
    pub fn fail_next_stream(&self, error: MediaError) {
        self.lock().scripted_failures.push_back(error);
    }

    /// Move the virtual clock forward.
    pub fn advance(&self, by: Duration) {
        self.lock().clock += by;
    }

    /// Make every later [`Driver::send_command`] fail.
    pub fn close(&self) {
        self.lock().closed = true;
    }

    /// Take all captured signaling commands.
    pub fn take_commands(&self) -> Vec<SignalingCommand> {
        std::mem::take(&mut self.lock().commands)
    }

    /// Take all captured UI notifications.
    pub fn take_notifications(&self) -> Vec<UiNotification> {
        std::mem::take(&mut self.lock().notifications)
    }

    /// Check if there are pending inputs to process.
    pub fn has_pending(&self) -> bool {
        !self.lock().pending_inputs.is_empty()
    }

    /// Endpoints of every stream started so far.
    pub fn started_streams(&self) -> Vec<MediaEndpoint> {
        self.lock().started.clone()
    }

    /// Handle ids currently running.
    pub fn active_streams(&self) -> Vec<u64> {
        self.lock().active_streams.iter().copied().collect()
    }

    /// Handle ids in the order they were stopped, duplicates included.
    pub fn stopped_streams(&self) -> Vec<u64> {
        self.lock().stopped.clone()
    }

    /// Last call button state shown to the UI.
    pub fn last_button(&self) -> Option<CallButton> {
        self.lock().last_button
    }

    /// Whether [`Driver::stop`] has run.
    pub fn is_stopped(&self) -> bool {
        self.lock().stop_called
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;
    type Instant = SimInstant;

    async fn poll_input(&mut self) -> Result<Option<Input>, Self::Error> {
        Ok(self.lock().pending_inputs.pop_front())
    }

    async fn send_command(&mut self, command: SignalingCommand) -> Result<(), Self::Error> {
        let mut state = self.lock();
        if state.closed {
            return Err(SimDriverError(format!("control channel closed, dropped {command:?}")));
        }
        state.commands.push(command);
        Ok(())
    }

    async fn start_stream(&mut self, endpoint: MediaEndpoint) -> Result<MediaHandle, MediaError> {
        let mut state = self.lock();
        if let Some(error) = state.scripted_failures.pop_front() {
            tracing::debug!(%endpoint, %error, "scripted stream failure");
            return Err(error);
        }
        state.next_handle += 1;
        let id = state.next_handle;
        state.started.push(endpoint);
        state.active_streams.insert(id);
        Ok(MediaHandle::new(id, endpoint))
    }

    fn stop_stream(&mut self, handle: MediaHandle) {
        let mut state = self.lock();
        if !state.active_streams.remove(&handle.id()) {
            tracing::warn!(id = handle.id(), "stopping a stream that is not running");
        }
        state.stopped.push(handle.id());
    }

    fn notify(&mut self, notification: UiNotification) -> Result<(), Self::Error> {
        let mut state = self.lock();
        if let UiNotification::CallButtonState(button) = notification {
            state.last_button = Some(button);
        }
        state.notifications.push(notification);
        Ok(())
    }

    fn now(&self) -> Self::Instant {
        SimInstant(self.lock().clock)
    }

    fn stop(&mut self) {
        self.lock().stop_called = true;
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use super::*;

    fn endpoint() -> MediaEndpoint {
        MediaEndpoint::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 5004)
    }

    #[test]
    fn inject_queues_input() {
        let driver = SimDriver::new();
        driver.inject_signaling(SignalingEvent::Disconnected);

        assert!(driver.has_pending());
    }

    #[test]
    fn clones_share_state() {
        let driver = SimDriver::new();
        let handle = driver.clone();
        handle.advance(Duration::from_secs(3));

        assert_eq!(driver.now(), SimInstant(Duration::from_secs(3)));
    }

    #[test]
    fn instant_arithmetic() {
        let start = SimInstant::default();
        let later = start + Duration::from_secs(10);
        assert_eq!(later - start, Duration::from_secs(10));
        assert_eq!(start - later, Duration::ZERO);
        assert!(later > start);
    }

    #[tokio::test]
    async fn poll_input_drains_in_order() {
        let mut driver = SimDriver::new();
        driver.inject_signaling(SignalingEvent::Connected { success: true });
        driver.inject(Input::Quit);

        assert_eq!(
            driver.poll_input().await.unwrap(),
            Some(Input::Signaling(SignalingEvent::Connected { success: true }))
        );
        assert_eq!(driver.poll_input().await.unwrap(), Some(Input::Quit));
        assert_eq!(driver.poll_input().await.unwrap(), None);
    }

    #[tokio::test]
    async fn scripted_failure_applies_once() {
        let mut driver = SimDriver::new();
        driver.fail_next_stream(MediaError::Stopped);

        assert_eq!(driver.start_stream(endpoint()).await, Err(MediaError::Stopped));
        let handle = driver.start_stream(endpoint()).await.unwrap();
        assert_eq!(driver.active_streams(), vec![handle.id()]);

        driver.stop_stream(handle);
        assert!(driver.active_streams().is_empty());
        assert_eq!(driver.stopped_streams().len(), 1);
    }

    #[tokio::test]
    async fn closed_driver_rejects_commands() {
        let mut driver = SimDriver::new();
        driver.close();

        assert!(driver.send_command(SignalingCommand::Connect).await.is_err());
        assert!(driver.take_commands().is_empty());
    }

    #[tokio::test]
    async fn last_button_tracks_notifications() {
        let mut driver = SimDriver::new();
        assert_eq!(driver.last_button(), None);

        driver.notify(UiNotification::CallButtonState(CallButton::START)).unwrap();
        driver.notify(UiNotification::CallButtonState(CallButton::STOP)).unwrap();
        assert_eq!(driver.last_button(), Some(CallButton::STOP));
    }
}
