//! Error types for activities, backends and orchestration hosts

use thiserror::Error;

/// Failure reported by an activity backend
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// Backend is temporarily unreachable or overloaded; safe to retry
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    /// Backend rejected the operation
    #[error("{0}")]
    Failed(String),
}

/// Failure of a single activity invocation
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ActivityError {
    /// The host may retry the invocation
    #[error("transient failure: {0}")]
    Transient(String),
    /// Propagated to the orchestrator as a failure of the step
    #[error("{0}")]
    Terminal(String),
}

impl ActivityError {
    pub fn is_transient(&self) -> bool {
        matches!(self, ActivityError::Transient(_))
    }
}

impl From<BackendError> for ActivityError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Unavailable(msg) => ActivityError::Transient(msg),
            BackendError::Failed(msg) => ActivityError::Terminal(msg),
        }
    }
}

/// Failure talking to an orchestration host
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HostError {
    #[error("orchestrator '{0}' is not registered")]
    UnknownOrchestrator(String),
    #[error("orchestration instance '{0}' not found")]
    InstanceNotFound(String),
    #[error("invalid orchestration input: {0}")]
    InvalidInput(String),
    #[error("orchestration host error: {0}")]
    Backend(String),
}
