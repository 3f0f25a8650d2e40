//! Error types for the driver seam.

use thiserror::Error;

use crate::driver::{AsyncHandle, StatementId};

/// Driver error type.
///
/// Driver-originated failures carry the underlying server message verbatim
/// so callers can surface it unchanged.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DriverError {
    /// Connection establishment failed.
    #[error("connect failed: {0}")]
    Connect(String),

    /// The server rejected a statement at prepare time.
    #[error("prepare failed: {0}")]
    Prepare(String),

    /// Synchronous execution failed server-side.
    #[error("execution failed: {0}")]
    Execution(String),

    /// A non-blocking submission was rejected.
    #[error("submission failed: {0}")]
    Submission(String),

    /// An asynchronously executed statement failed.
    #[error("async execution failed: {0}")]
    AsyncExecution(String),

    /// The handle does not correspond to an in-flight operation.
    #[error("unknown async handle {0}")]
    UnknownHandle(AsyncHandle),

    /// The statement id does not correspond to a prepared statement.
    #[error("unknown prepared statement {0}")]
    UnknownStatement(StatementId),

    /// The connection has been closed.
    #[error("connection closed")]
    Closed,
}

/// Result type for driver operations.
pub type DriverResult<T> = Result<T, DriverError>;
