//! Simulation world.
//!
//! Wraps the production [`Runtime`] over a [`SimDriver`] and keeps a second
//! handle to the driver for scripting and observation.

use babel_app::Runtime;
use babel_client::{CallCoordinator, CallInput, CoordinatorConfig, SignalingEvent, UserIntent};
use babel_core::{ContactId, MediaError, Presence};

use super::operation::{Operation, endpoint};
use crate::{CoordinatorSnapshot, DriverSnapshot, SimDriver, SimDriverError};

/// A runtime, its simulated driver, and helpers to drive both.
pub struct SimWorld {
    runtime: Runtime<SimDriver>,
    driver: SimDriver,
}

impl SimWorld {
    /// World with the default coordinator configuration.
    pub fn new() -> Self {
        Self::with_config(CoordinatorConfig::default())
    }

    /// World with a custom coordinator configuration.
    pub fn with_config(config: CoordinatorConfig) -> Self {
        let driver = SimDriver::new();
        let runtime = Runtime::new(driver.clone(), config);
        Self { runtime, driver }
    }

    /// Request the configured initial status.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver was closed.
    pub async fn start(&mut self) -> Result<(), SimDriverError> {
        self.runtime.start().await
    }

    /// Start, complete the login, and list `peers` as available contacts.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver was closed.
    pub async fn connect_with(&mut self, peers: &[ContactId]) -> Result<(), SimDriverError> {
        self.start().await?;
        self.submit(SignalingEvent::Connected { success: true }).await?;
        for &peer_id in peers {
            self.submit(SignalingEvent::ContactInfo {
                peer_id,
                display_name: format!("user{peer_id}"),
                presence: Presence::Available,
            })
            .await?;
        }
        Ok(())
    }

    /// Drive `peer_id` from ringing to an active call with running media.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver was closed.
    pub async fn establish_call(&mut self, peer_id: ContactId) -> Result<(), SimDriverError> {
        let peer = u8::try_from(peer_id).unwrap_or(u8::MAX);
        self.submit(UserIntent::PlaceCall { peer_id }).await?;
        self.submit(SignalingEvent::CallAccepted { peer_id }).await?;
        self.submit(SignalingEvent::PeerMediaEndpoint { peer_id, endpoint: endpoint(peer) }).await
    }

    /// Apply one generated operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver was closed.
    pub async fn apply(&mut self, op: &Operation) -> Result<(), SimDriverError> {
        tracing::trace!(?op, "apply");
        if let Some(by) = op.time_advance() {
            self.driver.advance(by);
            self.runtime.step().await?;
            return Ok(());
        }
        if matches!(op, Operation::FailNextStream) {
            self.driver.fail_next_stream(MediaError::Stopped);
            return Ok(());
        }
        if let Some(input) = op.to_input() {
            self.submit(input).await?;
        }
        Ok(())
    }

    /// Submit an input directly.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver was closed.
    pub async fn submit(&mut self, input: impl Into<CallInput>) -> Result<(), SimDriverError> {
        self.runtime.submit(input).await
    }

    /// Coordinator state plus driver observations.
    pub fn snapshot(&self) -> CoordinatorSnapshot {
        CoordinatorSnapshot::capture(self.runtime.coordinator())
            .with_driver(DriverSnapshot::capture(&self.driver))
    }

    /// The coordinator.
    pub fn coordinator(&self) -> &CallCoordinator {
        self.runtime.coordinator()
    }

    /// The runtime.
    pub fn runtime(&self) -> &Runtime<SimDriver> {
        &self.runtime
    }

    /// Mutable access to the runtime.
    pub fn runtime_mut(&mut self) -> &mut Runtime<SimDriver> {
        &mut self.runtime
    }

    /// Handle to the simulated driver.
    pub fn driver(&self) -> &SimDriver {
        &self.driver
    }

    /// Consume the world, yielding the runtime.
    pub fn into_runtime(self) -> Runtime<SimDriver> {
        self.runtime
    }
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new()
    }
}
