//! Generic runtime for call orchestration.
//!
//! The Runtime owns the [`CallCoordinator`] and a [`Driver`], and serializes
//! every input into a single dispatch queue:
//! - driver inputs (user intents, signaling events)
//! - media results fed back after a [`CallAction::StartStream`]
//! - the reconnect timer armed by [`CallAction::ScheduleReconnect`]
//!
//! Each input is dispatched to completion, and its actions executed, before
//! the next one is taken from the queue.

use std::collections::VecDeque;

use babel_client::{
    CallAction, CallCoordinator, CallInput, CallState, CoordinatorConfig, MediaEvent, UserIntent,
};

use crate::Driver;

/// Generic runtime that orchestrates the coordinator and a driver.
pub struct Runtime<D: Driver> {
    driver: D,
    coordinator: CallCoordinator,
    queue: VecDeque<CallInput>,
    reconnect_at: Option<D::Instant>,
}

impl<D: Driver> Runtime<D> {
    /// Create a runtime with a fresh coordinator.
    pub fn new(driver: D, config: CoordinatorConfig) -> Self {
        Self {
            driver,
            coordinator: CallCoordinator::new(config),
            queue: VecDeque::new(),
            reconnect_at: None,
        }
    }

    /// Run the main event loop until the driver yields [`crate::Input::Quit`].
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn run(mut self) -> Result<(), D::Error> {
        self.start().await?;

        loop {
            let should_quit = self.step().await?;
            if should_quit {
                break;
            }
        }

        self.shutdown().await
    }

    /// Request the configured initial status, which connects the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn start(&mut self) -> Result<(), D::Error> {
        let presence = self.coordinator.config().initial_status;
        self.submit(UserIntent::SetOwnStatus { presence }).await
    }

    /// Process one cycle: fire due timers, poll one input, drain the queue.
    ///
    /// Returns `true` if the client should quit.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn step(&mut self) -> Result<bool, D::Error> {
        if let Some(at) = self.reconnect_at
            && self.driver.now() >= at
        {
            self.reconnect_at = None;
            self.queue.push_back(CallInput::ReconnectDue);
        }

        if let Some(input) = self.driver.poll_input().await? {
            match input.into_call_input() {
                Some(input) => self.queue.push_back(input),
                None => return Ok(true),
            }
        }

        self.drain().await?;
        Ok(false)
    }

    /// Enqueue an input and process the queue to completion.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn submit(&mut self, input: impl Into<CallInput>) -> Result<(), D::Error> {
        self.queue.push_back(input.into());
        self.drain().await
    }

    /// End any call in progress and stop the driver.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn shutdown(mut self) -> Result<(), D::Error> {
        if self.coordinator.state() != CallState::NoCall {
            tracing::info!(state = %self.coordinator.state(), "ending call on shutdown");
            let actions = self.coordinator.hang_up();
            self.execute(actions).await?;
        }
        self.driver.stop();
        Ok(())
    }

    /// The coordinator.
    pub fn coordinator(&self) -> &CallCoordinator {
        &self.coordinator
    }

    /// The driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Mutable access to the driver.
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// When the scheduled reconnect fires, if one is armed.
    pub fn reconnect_at(&self) -> Option<D::Instant> {
        self.reconnect_at
    }

    async fn drain(&mut self) -> Result<(), D::Error> {
        while let Some(input) = self.queue.pop_front() {
            let actions = self.coordinator.dispatch(input);
            self.execute(actions).await?;
        }
        Ok(())
    }

    async fn execute(&mut self, actions: Vec<CallAction>) -> Result<(), D::Error> {
        for action in actions {
            match action {
                CallAction::Signal(command) => self.driver.send_command(command).await?,
                CallAction::StartStream { session_id, endpoint } => {
                    let event = match self.driver.start_stream(endpoint).await {
                        Ok(handle) => MediaEvent::Started { session_id, handle },
                        Err(error) => MediaEvent::Failed { session_id, error },
                    };
                    self.queue.push_back(CallInput::Media(event));
                },
                CallAction::StopStream { handle } => self.driver.stop_stream(handle),
                CallAction::Notify(notification) => self.driver.notify(notification)?,
                CallAction::ScheduleReconnect { delay } => {
                    if self.reconnect_at.is_none() {
                        self.reconnect_at = Some(self.driver.now() + delay);
                    }
                },
            }
        }
        Ok(())
    }
}
