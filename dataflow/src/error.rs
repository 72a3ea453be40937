//! Error types shared across the dataflow layers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure reported by the external fetch interface.
///
/// Carries at least a human-readable message; richer detail belongs to
/// whatever transport implements [`crate::fetch::EntityFetch`].
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct FetchError {
    pub message: String,
}

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors recorded on context fields and action state.
///
/// These are the absorbed failure kinds: they flow into reactive error
/// signals and never interrupt the owning state container. Programmer
/// errors (misusing the write API) panic instead.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum StateError {
    /// The fetch interface reported a failure.
    #[error("fetch failed: {0}")]
    Fetch(FetchError),
    /// A registered payload transform rejected the dispatched value.
    #[error("transform failed: {0}")]
    Transform(String),
}

impl StateError {
    /// The underlying message, without the taxonomy prefix.
    pub fn message(&self) -> &str {
        match self {
            StateError::Fetch(err) => &err.message,
            StateError::Transform(message) => message,
        }
    }
}

impl From<FetchError> for StateError {
    fn from(err: FetchError) -> Self {
        StateError::Fetch(err)
    }
}
