//! Error kinds surfaced to callers of the engine.

use uuid::Uuid;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the engine API.
///
/// Every variant maps to one of the error kinds named by the component
/// design: `validation_failed`, `not_found`, `constraint_violated`,
/// `io_failed`, and `conflict`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Bad embedding dimension, out-of-range weight, or unknown enum value.
    #[error("validation failed: {0}")]
    ValidationFailed(String),

    /// Identity does not exist, or exists only as a tombstone.
    #[error("not found: {0}")]
    NotFound(Uuid),

    /// A uniqueness or invariant check failed; signals a bug, not caller error.
    #[error("constraint violated: {0}")]
    ConstraintViolated(String),

    /// The store is unavailable or a durability write failed.
    #[error("storage unavailable: {0}")]
    IoFailed(String),

    /// A concurrent write could not be serialized in time.
    #[error("write conflict: {0}")]
    Conflict(String),

    /// Serialization/deserialization of a persisted record failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Whether the caller can reasonably retry the operation.
    ///
    /// `Conflict` and `IoFailed` are transient; everything else indicates a
    /// caller or data error that will not resolve itself on retry.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Conflict(_) | Error::IoFailed(_))
    }

    /// Shorthand for constructing a [`Error::ValidationFailed`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::ValidationFailed(msg.into())
    }

    /// Shorthand for constructing a [`Error::ConstraintViolated`].
    pub fn constraint(msg: impl Into<String>) -> Self {
        Error::ConstraintViolated(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_and_io_are_recoverable() {
        assert!(Error::Conflict("busy".into()).is_recoverable());
        assert!(Error::IoFailed("disk".into()).is_recoverable());
    }

    #[test]
    fn validation_and_constraint_are_not_recoverable() {
        assert!(!Error::ValidationFailed("bad dim".into()).is_recoverable());
        assert!(!Error::ConstraintViolated("dup edge".into()).is_recoverable());
        assert!(!Error::NotFound(Uuid::nil()).is_recoverable());
    }
}
