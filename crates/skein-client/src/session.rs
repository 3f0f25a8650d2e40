//! The session façade.
//!
//! A [`Session`] owns one driver connection and unifies the execution
//! modes: synchronous single statements, synchronous multi-statement
//! batches, polled-async waves, and prepared statements. Every completed
//! operation is archived into the session history as a named
//! [`Collection`], so results stay addressable — positionally, by exact
//! name, or by fuzzy name — long after they were produced.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use skein_driver::{AsyncHandle, Driver, ExecOutcome, Value};

use crate::collection::{Collection, Item};
use crate::engine::{AsyncEngine, Drained, EngineState};
use crate::error::{ClientError, ClientResult};
use crate::result::{HistoryKey, ResultSet};
use crate::statement::Statement;

/// Session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Granularity of completion polling.
    pub poll_interval: Duration,
    /// How long a drain may wait for the first completion.
    pub drain_timeout: Duration,
    /// Prefix for auto-derived history entry names.
    pub auto_name_prefix: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(1),
            drain_timeout: Duration::from_secs(5),
            auto_name_prefix: "entry".to_string(),
        }
    }
}

impl SessionConfig {
    /// Creates a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the poll interval.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the drain timeout.
    pub fn drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    /// Sets the auto-name prefix.
    pub fn auto_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.auto_name_prefix = prefix.into();
        self
    }
}

/// Counters of session activity.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionStats {
    /// Statements handed to `query`.
    pub queries_executed: u64,
    /// Statements executed synchronously.
    pub sync_queries: u64,
    /// Statements submitted to the async path.
    pub async_submissions: u64,
    /// Handles drained.
    pub drains: u64,
    /// Statements successfully prepared.
    pub statements_prepared: u64,
    /// Entries archived into history.
    pub history_entries: u64,
}

/// A database session over one exclusively owned driver connection.
pub struct Session<D: Driver> {
    driver: D,
    config: SessionConfig,
    history: Collection,
    statement: Option<Statement>,
    buffer: Option<ResultSet>,
    engine: AsyncEngine,
    stats: SessionStats,
    entry_counter: u64,
}

impl<D: Driver> Session<D> {
    /// Creates a session with default configuration.
    pub fn new(driver: D) -> Self {
        Self::with_config(driver, SessionConfig::default())
    }

    /// Creates a session with the given configuration.
    pub fn with_config(driver: D, config: SessionConfig) -> Self {
        let engine = AsyncEngine::new(config.poll_interval);
        Self {
            driver,
            config,
            history: Collection::new("history"),
            statement: None,
            buffer: None,
            engine,
            stats: SessionStats::default(),
            entry_counter: 0,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Returns session statistics.
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Returns true while an async wave is in flight.
    pub fn is_async(&self) -> bool {
        !self.engine.is_idle()
    }

    /// Returns the engine state.
    pub fn engine_state(&self) -> EngineState {
        self.engine.state()
    }

    /// Returns the number of archived history entries.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Returns the root history collection.
    pub fn history_root(&self) -> &Collection {
        &self.history
    }

    // =========================================================================
    // Execution
    // =========================================================================

    /// Executes a statement, classifying it by its leading keyword.
    ///
    /// A statement beginning with `INSERT` routes to the async path and its
    /// id surfaces on the next [`data`](Session::data) call. This inspects
    /// only the leading keyword — an insert nested inside a compound
    /// statement is not detected. Everything else executes synchronously
    /// and fills the result buffer immediately.
    pub async fn query(&mut self, sql: &str) -> ClientResult<()> {
        self.stats.queries_executed += 1;
        if leading_keyword_is_insert(sql) {
            let name = self.next_entry_name();
            debug!(target: "skein::session", name = %name, "routing insert to async path");
            self.engine.submit_one(&mut self.driver, name, sql).await?;
            self.stats.async_submissions += 1;
            return Ok(());
        }
        let outcome = self.driver.execute(sql).await?;
        self.stats.sync_queries += 1;
        self.buffer = Some(ResultSet::from_outcome(outcome));
        Ok(())
    }

    /// Submits a statement to the async path regardless of its kind.
    ///
    /// Joins the wave in flight if there is one.
    pub async fn submit(&mut self, sql: &str) -> ClientResult<AsyncHandle> {
        let name = self.next_entry_name();
        let handle = self.engine.submit_one(&mut self.driver, name, sql).await?;
        self.stats.async_submissions += 1;
        Ok(handle)
    }

    /// Submits a named batch for interleaved async execution.
    ///
    /// All statements are submitted before any polling; results become
    /// addressable in history under the supplied names once drained. Fails
    /// with [`ClientError::WaveInFlight`] if a wave is already pending.
    pub async fn submit_batch(
        &mut self,
        queries: Vec<(String, String)>,
    ) -> ClientResult<Vec<AsyncHandle>> {
        let handles = self.engine.submit_batch(&mut self.driver, queries).await?;
        self.stats.async_submissions += handles.len() as u64;
        Ok(handles)
    }

    /// Executes a list of statements as one synchronous batch.
    ///
    /// Resets session state first (archiving any pending async work), then
    /// accumulates one row group per statement, in execution order, into
    /// the result buffer.
    pub async fn multi(&mut self, queries: &[&str]) -> ClientResult<()> {
        self.multi_sql(&queries.join(";")).await
    }

    /// Executes a semicolon-joined multi-statement string synchronously.
    pub async fn multi_sql(&mut self, sql: &str) -> ClientResult<()> {
        self.reset().await?;
        self.stats.queries_executed += 1;
        let outcomes = self.driver.execute_batch(sql).await?;
        self.stats.sync_queries += 1;
        // Mutations contribute an empty group so positions track statement
        // order.
        let groups: Vec<_> = outcomes
            .into_iter()
            .map(|outcome| outcome.into_rows().unwrap_or_default())
            .collect();
        self.buffer = Some(ResultSet::RowGroups(groups));
        Ok(())
    }

    /// Prepares and binds a parameterized statement as the session's
    /// pending statement, replacing any prior one.
    ///
    /// With no parameters and no placeholder in the statement this is plain
    /// [`query`](Session::query). If the driver rejects the statement at
    /// prepare time the error is returned and the unprepared statement
    /// stays pending: a later [`data`](Session::data) reports
    /// [`ClientError::NotPrepared`] instead of silently returning stale
    /// results.
    pub async fn bind(&mut self, sql: &str, params: Vec<Value>) -> ClientResult<()> {
        if params.is_empty() && !sql.contains('?') {
            return self.query(sql).await;
        }
        self.statement = None;
        let mut statement = Statement::new(sql);
        match statement.prepare(&mut self.driver).await {
            Ok(()) => {
                statement.bind(params)?;
                self.stats.statements_prepared += 1;
                self.statement = Some(statement);
                Ok(())
            }
            Err(e) => {
                self.statement = Some(statement);
                Err(e)
            }
        }
    }

    // =========================================================================
    // Results
    // =========================================================================

    /// The universal result accessor.
    ///
    /// In priority order: executes the pending prepared statement, drains
    /// the in-flight async wave, or reads the synchronous result buffer.
    /// The result is archived into history as a collection named `name`
    /// (auto-named when absent) and returned.
    ///
    /// Shapes: [`ResultSet::Rows`] for a single statement,
    /// [`ResultSet::RowGroups`] for a batch, [`ResultSet::InsertId`] for a
    /// mutation.
    pub async fn data(&mut self, name: Option<&str>) -> ClientResult<ResultSet> {
        let result = if let Some(statement) = self.statement.take() {
            let outcome = statement.execute(&mut self.driver).await?;
            ResultSet::from_outcome(outcome)
        } else if !self.engine.is_idle() {
            self.drain_wave().await?
        } else {
            self.buffer.clone().ok_or(ClientError::NoResult)?
        };

        self.buffer = Some(result.clone());
        let entry_name = match name {
            Some(n) => n.to_string(),
            None => self.next_entry_name(),
        };
        self.archive(entry_name, Item::Result(result.clone()));
        Ok(result)
    }

    /// Looks up a past result.
    ///
    /// A numeric key is positional (negative means distance from the end);
    /// a non-empty string key is an exact name lookup. Anything else, or a
    /// miss, is `None` — history misses are not errors.
    pub fn history<K: Into<HistoryKey>>(&self, key: K) -> Option<&Collection> {
        match key.into() {
            HistoryKey::Index(index) => self.history.seek(index).ok().and_then(Item::as_collection),
            HistoryKey::Name(name) if !name.is_empty() => self.history.get_queue(&name),
            HistoryKey::Name(_) => None,
        }
    }

    /// Fuzzy history lookup: returns the entry whose name is closest in
    /// edit distance to `name`.
    pub fn history_like(&self, name: &str) -> Option<&Collection> {
        self.history.get_queue_like(name)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Clears the pending statement, the result buffer, and any in-flight
    /// async wave.
    ///
    /// Pending async results are drained and archived into history under
    /// their submission names, not discarded.
    pub async fn reset(&mut self) -> ClientResult<()> {
        if !self.engine.is_idle() {
            let drained = self
                .engine
                .drain_all(&mut self.driver, self.config.drain_timeout)
                .await?;
            self.stats.drains += drained.len() as u64;
            self.archive_drained(&drained);
        }
        self.statement = None;
        self.buffer = None;
        Ok(())
    }

    /// Drains outstanding work, then closes the driver connection.
    pub async fn close(mut self) -> ClientResult<()> {
        if let Err(e) = self.reset().await {
            warn!(target: "skein::session", error = %e, "pending async work abandoned at close");
        }
        self.driver.close().await?;
        Ok(())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Drains the in-flight wave and merges its outcomes.
    ///
    /// Each drained outcome — failures included — is archived under its
    /// submission name first. The merged value is the single outcome's own
    /// shape, row groups when every outcome bears rows, or the last drained
    /// outcome for a mixed wave (the per-name entries in history keep the
    /// rest addressable).
    async fn drain_wave(&mut self) -> ClientResult<ResultSet> {
        let drained = self
            .engine
            .drain_all(&mut self.driver, self.config.drain_timeout)
            .await?;
        self.stats.drains += drained.len() as u64;
        self.archive_drained(&drained);

        let successes: Vec<ExecOutcome> = drained
            .iter()
            .filter_map(|d| d.outcome.as_ref().ok().cloned())
            .collect();
        if successes.is_empty() {
            let first_failure = drained
                .iter()
                .find_map(|d| d.outcome.as_ref().err().cloned());
            return Err(first_failure
                .map(ClientError::Driver)
                .unwrap_or(ClientError::NoResult));
        }
        merge_outcomes(successes).ok_or(ClientError::NoResult)
    }

    /// Archives drained outcomes under their submission names.
    fn archive_drained(&mut self, drained: &[Drained]) {
        for d in drained {
            let item = match &d.outcome {
                Ok(outcome) => Item::Result(ResultSet::from_outcome(outcome.clone())),
                Err(e) => Item::Scalar(Value::String(e.to_string())),
            };
            self.archive(d.name.clone(), item);
        }
    }

    /// Wraps a payload into a named collection and appends it to history.
    fn archive(&mut self, name: String, item: Item) {
        let mut entry = Collection::new(name);
        entry.push(item);
        self.history.push(entry);
        self.stats.history_entries += 1;
    }

    fn next_entry_name(&mut self) -> String {
        self.entry_counter += 1;
        format!("{}_{}", self.config.auto_name_prefix, self.entry_counter)
    }
}

/// Merges the successful outcomes of one wave. `None` only for empty input.
fn merge_outcomes(outcomes: Vec<ExecOutcome>) -> Option<ResultSet> {
    match outcomes.len() {
        0 => None,
        1 => outcomes.into_iter().next().map(ResultSet::from_outcome),
        _ if outcomes.iter().all(ExecOutcome::is_rows) => Some(ResultSet::RowGroups(
            outcomes
                .into_iter()
                .filter_map(ExecOutcome::into_rows)
                .collect(),
        )),
        _ => outcomes.into_iter().next_back().map(ResultSet::from_outcome),
    }
}

/// True when the statement's leading keyword is `INSERT`.
fn leading_keyword_is_insert(sql: &str) -> bool {
    let keyword: String = sql
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    keyword.eq_ignore_ascii_case("insert")
}
