//! The asynchronous execution engine.
//!
//! The engine submits statements without blocking, tracks the outstanding
//! handles of the current *wave*, polls the driver until some of them
//! complete, and drains completed handles into materialized outcomes.
//!
//! One wave at a time: a batch submission against a non-idle engine is
//! rejected, while single submissions join the wave in flight. Handles
//! within a wave are independent — one statement failing neither aborts nor
//! taints its siblings. Draining follows *ready order*, which the driver is
//! free to report differently from submission order.

use std::fmt;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use skein_driver::{AsyncHandle, Driver, DriverError, ExecOutcome};

use crate::error::{ClientError, ClientResult};

/// Engine execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No wave in flight.
    Idle,
    /// At least one submitted handle awaits draining.
    InFlight,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineState::Idle => write!(f, "idle"),
            EngineState::InFlight => write!(f, "in_flight"),
        }
    }
}

/// One outstanding submission.
#[derive(Debug, Clone)]
struct PendingOp {
    name: String,
    handle: AsyncHandle,
}

/// The result of draining one handle.
///
/// The outcome is per-handle: a failed statement reports its error here
/// without affecting sibling entries.
#[derive(Debug, Clone)]
pub struct Drained {
    /// The name the statement was submitted under.
    pub name: String,
    /// The drained handle.
    pub handle: AsyncHandle,
    /// The statement's outcome, failure included.
    pub outcome: Result<ExecOutcome, DriverError>,
}

/// Submits, polls, and drains non-blocking statements over one connection.
#[derive(Debug)]
pub struct AsyncEngine {
    pending: Vec<PendingOp>,
    poll_interval: Duration,
}

impl AsyncEngine {
    /// Creates an engine polling at the given granularity.
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            pending: Vec::new(),
            poll_interval,
        }
    }

    /// Returns the engine state.
    pub fn state(&self) -> EngineState {
        if self.pending.is_empty() {
            EngineState::Idle
        } else {
            EngineState::InFlight
        }
    }

    /// Returns true if no wave is in flight.
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    /// Returns the number of outstanding handles.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Submits one statement without blocking.
    ///
    /// Joins the wave in flight if there is one; repeated single
    /// submissions accumulate into a single wave drained together.
    pub async fn submit_one<D: Driver>(
        &mut self,
        driver: &mut D,
        name: impl Into<String>,
        sql: &str,
    ) -> ClientResult<AsyncHandle> {
        let name = name.into();
        let handle = driver.submit(sql).await?;
        debug!(target: "skein::engine", %handle, name = %name, "submitted");
        self.pending.push(PendingOp { name, handle });
        Ok(handle)
    }

    /// Submits a named batch for interleaved execution.
    ///
    /// Every statement is submitted and its handle recorded before any
    /// polling begins, preserving the caller's ordering and name
    /// association. Fails with [`ClientError::WaveInFlight`] if a wave is
    /// already pending; statements submitted before a mid-batch submission
    /// failure stay pending and drain normally.
    pub async fn submit_batch<D: Driver>(
        &mut self,
        driver: &mut D,
        queries: Vec<(String, String)>,
    ) -> ClientResult<Vec<AsyncHandle>> {
        if !self.is_idle() {
            return Err(ClientError::WaveInFlight);
        }
        let mut handles = Vec::with_capacity(queries.len());
        for (name, sql) in queries {
            let handle = driver.submit(&sql).await?;
            debug!(target: "skein::engine", %handle, name = %name, "submitted in batch");
            self.pending.push(PendingOp { name, handle });
            handles.push(handle);
        }
        Ok(handles)
    }

    /// Polls the driver until at least one pending handle is ready.
    ///
    /// Returns the ready subset in the driver's ready order. Sleeps for the
    /// poll interval between rounds; if `timeout` elapses with nothing
    /// ready, fails with [`ClientError::PollTimeout`], leaving every handle
    /// pending and retrievable by a later drain.
    pub async fn poll_until_ready<D: Driver>(
        &mut self,
        driver: &mut D,
        timeout: Duration,
    ) -> ClientResult<Vec<AsyncHandle>> {
        if self.pending.is_empty() {
            return Ok(Vec::new());
        }
        let handles: Vec<AsyncHandle> = self.pending.iter().map(|op| op.handle).collect();
        let deadline = Instant::now() + timeout;
        loop {
            let ready = driver.poll(&handles, self.poll_interval).await?;
            if !ready.is_empty() {
                trace!(target: "skein::engine", ready = ready.len(), "poll round ready");
                return Ok(ready);
            }
            if Instant::now() >= deadline {
                return Err(ClientError::PollTimeout(timeout.as_millis() as u64));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Drains one handle: materializes its result eagerly and releases the
    /// driver-side resources.
    ///
    /// The handle leaves the wave whether it succeeded or failed; a failure
    /// is returned as [`DriverError::AsyncExecution`] without touching
    /// sibling handles.
    pub async fn drain<D: Driver>(
        &mut self,
        driver: &mut D,
        handle: AsyncHandle,
    ) -> ClientResult<ExecOutcome> {
        let position = self
            .pending
            .iter()
            .position(|op| op.handle == handle)
            .ok_or(ClientError::Driver(DriverError::UnknownHandle(handle)))?;
        self.pending.remove(position);
        let outcome = driver.reap(handle).await?;
        debug!(target: "skein::engine", %handle, "drained");
        Ok(outcome)
    }

    /// Drains the whole wave in ready order.
    ///
    /// Polls and reaps until no handle remains or `timeout` elapses. If the
    /// timeout hits after some handles already drained, the drained entries
    /// are returned and the rest stay pending (the engine remains in
    /// flight); a timeout with nothing drained at all is a
    /// [`ClientError::PollTimeout`].
    pub async fn drain_all<D: Driver>(
        &mut self,
        driver: &mut D,
        timeout: Duration,
    ) -> ClientResult<Vec<Drained>> {
        let deadline = Instant::now() + timeout;
        let mut drained = Vec::new();
        while !self.pending.is_empty() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let ready = match self.poll_until_ready(driver, remaining).await {
                Ok(ready) => ready,
                Err(ClientError::PollTimeout(ms)) => {
                    if drained.is_empty() {
                        return Err(ClientError::PollTimeout(ms));
                    }
                    debug!(
                        target: "skein::engine",
                        drained = drained.len(),
                        pending = self.pending.len(),
                        "drain timed out with handles still pending"
                    );
                    return Ok(drained);
                }
                Err(other) => return Err(other),
            };
            for handle in ready {
                let Some(position) = self.pending.iter().position(|op| op.handle == handle) else {
                    continue;
                };
                let op = self.pending.remove(position);
                let outcome = driver.reap(handle).await;
                drained.push(Drained {
                    name: op.name,
                    handle,
                    outcome,
                });
            }
        }
        debug!(target: "skein::engine", drained = drained.len(), "wave drained");
        Ok(drained)
    }
}
