//! Error types for the daybook core.

use thiserror::Error;

use crate::records::EntityKind;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Mutation verbs surfaced in failure reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOp {
    Create,
    Update,
    Delete,
}

impl std::fmt::Display for MutationOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let verb = match self {
            MutationOp::Create => "create",
            MutationOp::Update => "update",
            MutationOp::Delete => "delete",
        };
        f.write_str(verb)
    }
}

/// Errors that can occur during sync and aggregation operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No authenticated principal; mutation rejected before any optimistic apply.
    #[error("not authenticated")]
    NotAuthenticated,

    /// A cross-referenced local entity vanished before resolution.
    #[error("{kind} reference '{id}' no longer exists locally")]
    ReferenceNotFound { kind: EntityKind, id: String },

    /// Store-side validation/policy failure. Not retried.
    #[error("remote store rejected the write: {0}")]
    RemoteRejected(String),

    /// Network failure or timeout. Retried once via the fallback path.
    #[error("remote store unreachable: {0}")]
    RemoteUnreachable(String),

    /// Optimistic apply succeeded but every remote attempt failed; the
    /// local state has already been rolled back when this surfaces.
    #[error("failed to {operation} {kind}: {cause}")]
    PartialFailure {
        operation: MutationOp,
        kind: EntityKind,
        cause: String,
    },

    /// Row payload could not be decoded at the store boundary.
    #[error("row decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Durable mirror read/write failure.
    #[error("durable mirror error: {0}")]
    Mirror(String),
}

impl CoreError {
    /// Create a rejected-write error.
    pub fn remote_rejected(message: impl Into<String>) -> Self {
        Self::RemoteRejected(message.into())
    }

    /// Create an unreachable-store error.
    pub fn remote_unreachable(message: impl Into<String>) -> Self {
        Self::RemoteUnreachable(message.into())
    }

    /// Create a mirror error.
    pub fn mirror(message: impl Into<String>) -> Self {
        Self::Mirror(message.into())
    }

    pub fn reference_not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::ReferenceNotFound {
            kind,
            id: id.into(),
        }
    }

    /// Whether the fallback commit path should be attempted after this error.
    pub fn retryable(&self) -> bool {
        matches!(self, Self::RemoteUnreachable(_))
    }
}
