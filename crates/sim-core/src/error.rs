//! Error types for the simulation core.

use thiserror::Error;

use crate::components::agent::AgentId;

/// Errors raised while building or stepping a simulation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// Invalid construction parameters; the simulation never starts
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A behaviour referenced an agent removed earlier in the same tick
    #[error("Agent {0} is no longer present")]
    TransientReference(AgentId),
}

impl SimError {
    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Whether the scheduler may skip this error and continue the tick.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::TransientReference(_))
    }
}

pub type SimResult<T> = Result<T, SimError>;
