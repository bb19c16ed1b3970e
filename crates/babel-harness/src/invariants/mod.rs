//! Invariant checking for deterministic simulation testing.
//!
//! Invariants are properties that must always hold after the runtime has
//! drained its dispatch queue. Unlike example-based tests that check specific
//! scenarios, invariants verify behavioral properties across all possible
//! input orderings.
//!
//! # Architecture
//!
//! Observable state is extracted from the coordinator (and optionally the
//! simulated media layer) into a [`CoordinatorSnapshot`], then every
//! registered [`Invariant`] runs against it.
//!
//! # Usage
//!
//! ```ignore
//! let registry = InvariantRegistry::standard();
//! let snapshot = CoordinatorSnapshot::capture(runtime.coordinator());
//! registry.check_all(&snapshot)?;
//! ```

mod checks;
mod snapshot;

pub use checks::{
    ButtonInSync, MediaOwnership, OfflineMeansIdle, RosterPaneAlignment, SelfSlotPreserved,
    SingleActiveCall,
};
pub use snapshot::{CoordinatorSnapshot, DriverSnapshot, SessionSnapshot};

/// Invariant check result.
pub type InvariantResult = Result<(), Violation>;

/// Invariant violation with context.
#[derive(Debug, Clone)]
pub struct Violation {
    /// Name of the violated invariant.
    pub invariant: &'static str,
    /// Description of what went wrong.
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.invariant, self.message)
    }
}

impl std::error::Error for Violation {}

/// An invariant that can be checked against coordinator state.
pub trait Invariant: Send + Sync {
    /// Invariant name for error reporting.
    fn name(&self) -> &'static str;

    /// Check the invariant against a snapshot.
    ///
    /// Returns `Ok(())` if the invariant holds, or a [`Violation`]
    /// describing what went wrong.
    fn check(&self, state: &CoordinatorSnapshot) -> InvariantResult;
}

/// Registry of invariants to check.
pub struct InvariantRegistry {
    invariants: Vec<Box<dyn Invariant>>,
}

impl Default for InvariantRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InvariantRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { invariants: Vec::new() }
    }

    /// Create a registry with every standard invariant.
    ///
    /// Includes:
    /// - [`SingleActiveCall`]: call state agrees with the single session slot
    /// - [`RosterPaneAlignment`]: contacts and chat panes stay index-aligned
    /// - [`SelfSlotPreserved`]: slot 0 always holds the local account
    /// - [`MediaOwnership`]: running streams match the session's handle
    /// - [`ButtonInSync`]: the UI shows the coordinator's button state
    /// - [`OfflineMeansIdle`]: no call survives a lost connection
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.add(SingleActiveCall);
        registry.add(RosterPaneAlignment);
        registry.add(SelfSlotPreserved);
        registry.add(MediaOwnership);
        registry.add(ButtonInSync);
        registry.add(OfflineMeansIdle);
        registry
    }

    /// Add an invariant to the registry.
    pub fn add<I: Invariant + 'static>(&mut self, invariant: I) {
        self.invariants.push(Box::new(invariant));
    }

    /// Check all invariants against the given state.
    ///
    /// Returns `Ok(())` if all invariants hold, or all violations found.
    pub fn check_all(&self, state: &CoordinatorSnapshot) -> Result<(), Vec<Violation>> {
        let violations: Vec<_> =
            self.invariants.iter().filter_map(|inv| inv.check(state).err()).collect();

        if violations.is_empty() { Ok(()) } else { Err(violations) }
    }

    /// Check all invariants, panicking with every violation found.
    ///
    /// Use this in tests where you want immediate failure with context.
    #[allow(clippy::panic, reason = "test helper that reports violations by panicking")]
    pub fn assert_all(&self, state: &CoordinatorSnapshot, context: &str) {
        if let Err(violations) = self.check_all(state) {
            let messages: Vec<_> = violations.iter().map(ToString::to_string).collect();
            panic!("Invariant violation {context}:\n  {}", messages.join("\n  "));
        }
    }

    /// Number of registered invariants.
    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use babel_client::{CallCoordinator, CoordinatorConfig};

    use super::*;

    #[test]
    fn standard_registry_has_invariants() {
        let registry = InvariantRegistry::standard();
        assert!(!registry.is_empty());
        assert_eq!(registry.len(), 6);
    }

    #[test]
    fn fresh_coordinator_passes_invariants() {
        let registry = InvariantRegistry::standard();
        let coordinator = CallCoordinator::new(CoordinatorConfig::default());
        let snapshot = CoordinatorSnapshot::capture(&coordinator);
        assert!(registry.check_all(&snapshot).is_ok());
    }
}
