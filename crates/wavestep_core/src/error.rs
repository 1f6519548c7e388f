//! Shared error types for WAVESTEP.

/// Core result type
pub type CoreResult<T> = Result<T, CoreError>;

/// Core error type
///
/// Only conditions that genuinely abort an operation live here. Replay
/// boundaries (end of trace, no trace loaded, unknown breakpoint) are
/// reported as status values by the stepping engine, never as errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// A trace file could not be read at all
    #[error("cannot read trace {path}: {reason}")]
    TraceUnreadable {
        /// Path that failed to open or read
        path: String,
        /// Underlying cause, stringified
        reason: String,
    },

    /// A field failed validation
    #[error("validation failed for {field}: {reason}")]
    Validation {
        /// Field that failed
        field: String,
        /// Why it failed
        reason: String,
    },

    /// Something was looked up and not found
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Kind of entity
        kind: String,
        /// Identifier that missed
        id: String,
    },
}
