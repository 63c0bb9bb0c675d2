//! Error types for resource, reaction, and comment operations.

use thiserror::Error;

/// Result type alias for resource operations.
pub type Result<T> = std::result::Result<T, ResourceError>;

/// Error taxonomy for the resource domain.
///
/// Absent identity is deliberately NOT an error: reaction and bookmark
/// operations are silent no-ops for anonymous visitors, so reducers handle
/// that case before any provider is called.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResourceError {
    /// Any failure from the persistence platform during a read or write.
    ///
    /// Recovered locally by reverting optimistic state to its pre-operation
    /// value; logged, never retried.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Requested resource not found.
    #[error("Resource not found")]
    NotFound,

    /// A reaction commit updated the shared counter but failed to persist
    /// the per-user record, and the compensating counter write failed too.
    ///
    /// The counter has drifted by the pressed delta. Surfaced so callers can
    /// log it; the next full reload shows whatever the platform holds.
    #[error("Partial commit: counter updated but reaction record write failed")]
    PartialCommit,

    /// A submission failed validation before reaching the platform.
    #[error("Invalid submission: {reason}")]
    InvalidSubmission {
        /// Why the submission was rejected.
        reason: String,
    },

    /// Internal error (should not be exposed to users).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResourceError {
    /// Returns `true` if this error is due to invalid user input.
    ///
    /// # Examples
    ///
    /// ```
    /// # use optimal_resources::ResourceError;
    /// let err = ResourceError::InvalidSubmission { reason: "no tags".into() };
    /// assert!(err.is_user_error());
    /// assert!(!ResourceError::NotFound.is_user_error());
    /// ```
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(self, Self::InvalidSubmission { .. })
    }
}
