use thiserror::Error;

use crate::verb::Verb;

/// Failure reported by a storage engine, forwarded to callers untouched.
pub type EngineError = Box<dyn std::error::Error + Send + Sync>;

/// Error type for sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// No handler exists for the requested verb.
    #[error("unsupported verb: {0}")]
    UnsupportedVerb(String),

    /// The verb exists but cannot be applied to this kind of target.
    #[error("{verb} is not supported for a {target} target")]
    UnsupportedTarget { verb: Verb, target: &'static str },

    /// `findItem` resolved with a falsy payload.
    #[error("not-found")]
    NotFound,

    /// The storage engine rejected the request.
    #[error(transparent)]
    Engine(EngineError),

    /// The engine answered with a payload of the wrong shape for the operation.
    #[error("unexpected payload from {operation}: {message}")]
    UnexpectedPayload {
        operation: &'static str,
        message: String,
    },

    /// A payload could not be converted to or from a model.
    #[error("payload serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl SyncError {
    /// True for the adapter's own `not-found` signal, false for anything the engine raised.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SyncError::NotFound)
    }

    /// The engine's error, if this failure came from the storage layer.
    pub fn engine_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            SyncError::Engine(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}
