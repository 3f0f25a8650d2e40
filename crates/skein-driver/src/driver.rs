//! The driver trait and opaque operation handles.
//!
//! A [`Driver`] is the session layer's only window onto the database: it
//! performs the actual I/O for one logical connection. The session layer
//! never parses SQL or touches the wire itself; it sequences calls against
//! this trait and correlates results through the opaque handles returned
//! here.

use std::fmt;
use std::time::Duration;

use crate::error::DriverResult;
use crate::outcome::ExecOutcome;
use crate::value::Value;

/// Opaque token correlating a non-blocking submission to its eventual result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AsyncHandle(u64);

impl AsyncHandle {
    /// Creates a handle from a raw id.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for AsyncHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "async_{}", self.0)
    }
}

/// Opaque token identifying a server-side prepared statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatementId(u64);

impl StatementId {
    /// Creates a statement id from a raw id.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for StatementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stmt_{}", self.0)
    }
}

/// One logical database connection.
///
/// All methods take `&mut self`: a connection serves exactly one caller and
/// multiplexing happens above this trait, not inside it. Concurrency on a
/// driver means *interleaved* work — submissions are non-blocking and
/// completion is observed through [`poll`](Driver::poll) — not parallel
/// statement execution.
#[allow(async_fn_in_trait)]
pub trait Driver {
    /// Executes a single statement synchronously.
    async fn execute(&mut self, sql: &str) -> DriverResult<ExecOutcome>;

    /// Executes a semicolon-separated batch synchronously, returning one
    /// outcome per constituent statement in execution order.
    async fn execute_batch(&mut self, sql: &str) -> DriverResult<Vec<ExecOutcome>>;

    /// Prepares a statement server-side, returning its id.
    async fn prepare(&mut self, sql: &str) -> DriverResult<StatementId>;

    /// Executes a previously prepared statement with positional parameters.
    async fn execute_prepared(
        &mut self,
        id: StatementId,
        params: &[Value],
    ) -> DriverResult<ExecOutcome>;

    /// Submits a statement for non-blocking execution.
    ///
    /// Returns immediately with a handle; the result is observed later via
    /// [`poll`](Driver::poll) and [`reap`](Driver::reap).
    async fn submit(&mut self, sql: &str) -> DriverResult<AsyncHandle>;

    /// Returns the subset of `pending` whose results are ready, waiting up
    /// to `timeout` for at least one to become so.
    ///
    /// An empty return means the timeout elapsed first; the handles stay
    /// pending and may be polled again.
    async fn poll(
        &mut self,
        pending: &[AsyncHandle],
        timeout: Duration,
    ) -> DriverResult<Vec<AsyncHandle>>;

    /// Consumes a completed handle, materializing its result and releasing
    /// the driver-side resources tied to it.
    ///
    /// Blocks until the handle's statement has finished if it has not yet.
    /// A server-side failure is reported here, as
    /// [`DriverError::AsyncExecution`](crate::error::DriverError); the
    /// handle is consumed either way.
    async fn reap(&mut self, handle: AsyncHandle) -> DriverResult<ExecOutcome>;

    /// Closes the connection. Pending operations are abandoned.
    async fn close(&mut self) -> DriverResult<()>;
}
