//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the runtime from the signaling transport,
//! the RTP stack and the UI. Each frontend implements it, while the generic
//! [`crate::Runtime`] handles all orchestration.

use std::{
    future::Future,
    ops::{Add, Sub},
    time::Duration,
};

use babel_client::{SignalingCommand, UiNotification};
use babel_core::{MediaEndpoint, MediaError, MediaHandle};

use crate::Input;

/// Abstracts I/O operations for the runtime.
///
/// One driver covers the three adapter contracts the coordinator talks to:
///
/// - **Signaling**: [`poll_input`](Driver::poll_input) yields signaling events
///   and [`send_command`](Driver::send_command) carries commands out
/// - **Media**: [`start_stream`](Driver::start_stream) and
///   [`stop_stream`](Driver::stop_stream)
/// - **UI**: user intents arrive through `poll_input`, notifications leave
///   through [`notify`](Driver::notify)
///
/// # Implementations
///
/// - **Console**: stdin line commands, UDP socket for media
/// - **Simulation**: scripted inputs, virtual clock, recorded outputs
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Time instant type. Enables virtual time in simulation.
    type Instant: Copy
        + Ord
        + Send
        + Sync
        + Sub<Output = Duration>
        + Add<Duration, Output = Self::Instant>;

    /// Poll for the next input.
    ///
    /// Returns `None` if nothing is ready, so the runtime can check timers.
    fn poll_input(&mut self) -> impl Future<Output = Result<Option<Input>, Self::Error>> + Send;

    /// Send a command to the signaling server.
    ///
    /// # Errors
    ///
    /// Returns an error if the control channel is unusable.
    fn send_command(
        &mut self,
        command: SignalingCommand,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Start an RTP stream towards `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`MediaError`] if the transport cannot bind or connect.
    fn start_stream(
        &mut self,
        endpoint: MediaEndpoint,
    ) -> impl Future<Output = Result<MediaHandle, MediaError>> + Send;

    /// Stop a stream. Stopping an already stopped stream is a no-op.
    fn stop_stream(&mut self, handle: MediaHandle);

    /// Deliver a notification to the UI.
    ///
    /// # Errors
    ///
    /// Returns an error if the UI cannot be updated.
    fn notify(&mut self, notification: UiNotification) -> Result<(), Self::Error>;

    /// Current time instant.
    fn now(&self) -> Self::Instant;

    /// Stop the driver and clean up resources.
    fn stop(&mut self);
}
