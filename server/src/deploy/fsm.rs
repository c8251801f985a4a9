//! Finite State Machine for build and launch

use serde::{Deserialize, Serialize};

/// Build/launch state of one deployment attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchState {
    /// Initial state, profile selected but nothing run
    Idle,

    /// Build command running (frameworks with a build step only)
    Building,

    /// Build command exited non-zero (terminal)
    BuildFailed,

    /// Serve process being spawned
    Launching,

    /// Serve process spawned, readiness probes in flight
    Verifying,

    /// Service answered a readiness probe (terminal, success)
    Ready,

    /// Serve process could not be spawned (terminal)
    LaunchFailed,

    /// Probes exhausted without an answer (terminal)
    Unverified,
}

impl LaunchState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LaunchState::BuildFailed
                | LaunchState::Ready
                | LaunchState::LaunchFailed
                | LaunchState::Unverified
        )
    }
}

/// Build/launch event
#[derive(Debug, Clone)]
pub enum LaunchEvent {
    /// Build command started
    BuildStarted,

    /// Build command exited zero
    BuildSucceeded,

    /// Build command exited non-zero
    BuildFailed(String),

    /// Serve process spawn requested
    LaunchStarted,

    /// Serve process spawned, begin verification
    Spawned,

    /// Serve process could not be spawned
    SpawnFailed(String),

    /// A readiness probe was answered
    Confirmed,

    /// All readiness probes exhausted
    ProbesExhausted(String),
}

/// Launch FSM for one deployment attempt
#[derive(Debug, Clone)]
pub struct LaunchFsm {
    state: LaunchState,
    error: Option<String>,
}

impl LaunchFsm {
    /// Create a new FSM in the idle state
    pub fn new() -> Self {
        Self {
            state: LaunchState::Idle,
            error: None,
        }
    }

    /// Get current state
    pub fn state(&self) -> &LaunchState {
        &self.state
    }

    /// Get error message if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Process an event and transition state
    pub fn process(&mut self, event: LaunchEvent) -> Result<(), String> {
        let new_state = match (&self.state, &event) {
            // From Idle: frameworks without a build step launch directly
            (LaunchState::Idle, LaunchEvent::BuildStarted) => LaunchState::Building,
            (LaunchState::Idle, LaunchEvent::LaunchStarted) => LaunchState::Launching,

            // From Building
            (LaunchState::Building, LaunchEvent::BuildSucceeded) => LaunchState::Launching,
            (LaunchState::Building, LaunchEvent::BuildFailed(err)) => {
                self.error = Some(err.clone());
                LaunchState::BuildFailed
            }

            // From Launching
            (LaunchState::Launching, LaunchEvent::Spawned) => LaunchState::Verifying,
            (LaunchState::Launching, LaunchEvent::SpawnFailed(err)) => {
                self.error = Some(err.clone());
                LaunchState::LaunchFailed
            }

            // From Verifying
            (LaunchState::Verifying, LaunchEvent::Confirmed) => LaunchState::Ready,
            (LaunchState::Verifying, LaunchEvent::ProbesExhausted(err)) => {
                self.error = Some(err.clone());
                LaunchState::Unverified
            }

            // Invalid transitions
            (state, event) => {
                return Err(format!("Invalid transition: {:?} -> {:?}", state, event));
            }
        };

        self.state = new_state;
        Ok(())
    }
}

impl Default for LaunchFsm {
    fn default() -> Self {
        Self::new()
    }
}
