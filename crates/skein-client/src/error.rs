//! Error types for the session layer.

use skein_driver::DriverError;
use thiserror::Error;

/// Client error type.
///
/// Driver-originated errors are wrapped with their server message intact.
/// Structural errors (`BindArity`, `IndexOutOfRange`) are raised before any
/// driver call is made.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// A driver-level failure, surfaced verbatim.
    #[error("driver error: {0}")]
    Driver(#[from] DriverError),

    /// Parameter count does not match the statement's placeholders.
    #[error("bind arity mismatch: statement has {expected} placeholders, got {got} parameters")]
    BindArity {
        /// Number of `?` placeholders in the statement.
        expected: usize,
        /// Number of parameters supplied.
        got: usize,
    },

    /// The statement was never successfully prepared.
    #[error("statement was never prepared")]
    NotPrepared,

    /// No pending handle became ready within the timeout. Pending handles
    /// stay pending and may be drained later.
    #[error("poll timed out after {0}ms")]
    PollTimeout(u64),

    /// Positional lookup outside the container.
    #[error("index {index} out of range for collection of length {len}")]
    IndexOutOfRange {
        /// The index as supplied (negative means distance from the end).
        index: i64,
        /// Length of the container at lookup time.
        len: usize,
    },

    /// A batch submission was attempted while an async wave is in flight.
    #[error("an async wave is already in flight")]
    WaveInFlight,

    /// `data` was called with no statement pending, no async wave in
    /// flight, and an empty result buffer.
    #[error("no result available")]
    NoResult,
}

/// Result type for session operations.
pub type ClientResult<T> = Result<T, ClientError>;
