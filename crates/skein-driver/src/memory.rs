//! In-memory reference driver.
//!
//! [`MemoryDriver`] implements [`Driver`] against a shared in-process
//! [`MemoryServer`], so the session layer can be exercised end to end
//! without a network. It evaluates a deliberately small statement
//! vocabulary — `CREATE TABLE`, `INSERT INTO ... VALUES`, `SELECT`
//! (literals, or `FROM` with a single equality `WHERE`), and `DELETE` —
//! which is what the session scenarios and tests need.
//!
//! Asynchronously submitted statements complete after the configured
//! latency ([`DriverConfig::async_latency`]); polling observes completion
//! time, so ready order follows completion order, not submission order.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::config::DriverConfig;
use crate::driver::{AsyncHandle, Driver, StatementId};
use crate::error::{DriverError, DriverResult};
use crate::outcome::ExecOutcome;
use crate::value::{Record, Value};

/// Cap on concurrently pending async submissions per connection.
const MAX_PENDING: usize = 32;

/// A stored table: named columns and row tuples.
#[derive(Debug, Clone, Default)]
struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Shared server state.
#[derive(Debug, Default)]
struct ServerState {
    tables: HashMap<String, Table>,
    next_insert_id: u64,
    last_insert_id: u64,
}

impl ServerState {
    fn new() -> Self {
        Self {
            tables: HashMap::new(),
            next_insert_id: 1,
            last_insert_id: 0,
        }
    }
}

/// An in-process database shared by any number of [`MemoryDriver`]
/// connections.
#[derive(Debug, Clone)]
pub struct MemoryServer {
    inner: Arc<RwLock<ServerState>>,
}

impl MemoryServer {
    /// Creates an empty server.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(ServerState::new())),
        }
    }

    /// Returns the names of all tables, sorted.
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.read().tables.keys().cloned().collect();
        names.sort();
        names
    }

    /// Returns the number of rows stored in a table.
    pub fn row_count(&self, table: &str) -> Option<usize> {
        self.inner.read().tables.get(table).map(|t| t.rows.len())
    }
}

impl Default for MemoryServer {
    fn default() -> Self {
        Self::new()
    }
}

/// A submitted, not-yet-reaped statement.
#[derive(Debug, Clone)]
struct PendingOp {
    sql: String,
    ready_at: Instant,
}

/// One connection to a [`MemoryServer`].
#[derive(Debug)]
pub struct MemoryDriver {
    server: Arc<RwLock<ServerState>>,
    config: DriverConfig,
    statements: HashMap<u64, String>,
    pending: HashMap<u64, PendingOp>,
    next_statement: u64,
    next_handle: u64,
    closed: bool,
}

impl MemoryDriver {
    /// Connects to a server.
    pub fn connect(config: &DriverConfig, server: &MemoryServer) -> DriverResult<Self> {
        if config.database.is_empty() {
            return Err(DriverError::Connect("no database selected".to_string()));
        }
        info!(
            target: "skein::driver",
            host = %config.host,
            database = %config.database,
            "memory driver connected"
        );
        Ok(Self {
            server: Arc::clone(&server.inner),
            config: config.clone(),
            statements: HashMap::new(),
            pending: HashMap::new(),
            next_statement: 1,
            next_handle: 1,
            closed: false,
        })
    }

    /// Returns the configuration this connection was opened with.
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    fn ensure_open(&self) -> DriverResult<()> {
        if self.closed {
            Err(DriverError::Closed)
        } else {
            Ok(())
        }
    }

    fn run(&self, sql: &str) -> DriverResult<ExecOutcome> {
        let mut state = self.server.write();
        run_statement(&mut state, sql)
    }
}

impl Driver for MemoryDriver {
    async fn execute(&mut self, sql: &str) -> DriverResult<ExecOutcome> {
        self.ensure_open()?;
        self.run(sql)
    }

    async fn execute_batch(&mut self, sql: &str) -> DriverResult<Vec<ExecOutcome>> {
        self.ensure_open()?;
        let mut outcomes = Vec::new();
        for statement in split_statements(sql) {
            outcomes.push(self.run(statement)?);
        }
        Ok(outcomes)
    }

    async fn prepare(&mut self, sql: &str) -> DriverResult<StatementId> {
        self.ensure_open()?;
        let keyword = leading_keyword(sql);
        if !matches!(keyword.as_str(), "create" | "insert" | "select" | "delete") {
            return Err(DriverError::Prepare(format!(
                "unsupported statement near '{}'",
                sql.trim().chars().take(16).collect::<String>()
            )));
        }
        let id = StatementId::new(self.next_statement);
        self.next_statement += 1;
        self.statements.insert(id.as_u64(), sql.to_string());
        Ok(id)
    }

    async fn execute_prepared(
        &mut self,
        id: StatementId,
        params: &[Value],
    ) -> DriverResult<ExecOutcome> {
        self.ensure_open()?;
        let sql = self
            .statements
            .get(&id.as_u64())
            .ok_or(DriverError::UnknownStatement(id))?
            .clone();
        let bound = substitute_placeholders(&sql, params)?;
        self.run(&bound)
    }

    async fn submit(&mut self, sql: &str) -> DriverResult<AsyncHandle> {
        self.ensure_open()?;
        if self.pending.len() >= MAX_PENDING {
            return Err(DriverError::Submission(format!(
                "async channel saturated ({} in flight)",
                MAX_PENDING
            )));
        }
        let handle = AsyncHandle::new(self.next_handle);
        self.next_handle += 1;
        self.pending.insert(
            handle.as_u64(),
            PendingOp {
                sql: sql.to_string(),
                ready_at: Instant::now() + self.config.async_latency,
            },
        );
        debug!(target: "skein::driver", %handle, "submitted async statement");
        Ok(handle)
    }

    async fn poll(
        &mut self,
        pending: &[AsyncHandle],
        timeout: Duration,
    ) -> DriverResult<Vec<AsyncHandle>> {
        self.ensure_open()?;
        if pending.is_empty() {
            return Ok(Vec::new());
        }
        for handle in pending {
            if !self.pending.contains_key(&handle.as_u64()) {
                return Err(DriverError::UnknownHandle(*handle));
            }
        }
        let deadline = Instant::now() + timeout;
        loop {
            let now = Instant::now();
            let mut ready: Vec<(Instant, AsyncHandle)> = pending
                .iter()
                .filter_map(|handle| {
                    let op = self.pending.get(&handle.as_u64())?;
                    (op.ready_at <= now).then_some((op.ready_at, *handle))
                })
                .collect();
            if !ready.is_empty() {
                // Completion order, ties broken by handle id.
                ready.sort_by_key(|(at, handle)| (*at, handle.as_u64()));
                return Ok(ready.into_iter().map(|(_, handle)| handle).collect());
            }
            if now >= deadline {
                return Ok(Vec::new());
            }
            let earliest = pending
                .iter()
                .filter_map(|handle| self.pending.get(&handle.as_u64()))
                .map(|op| op.ready_at)
                .min();
            let wake = match earliest {
                Some(at) if at < deadline => at,
                _ => deadline,
            };
            tokio::time::sleep(wake.saturating_duration_since(now)).await;
        }
    }

    async fn reap(&mut self, handle: AsyncHandle) -> DriverResult<ExecOutcome> {
        self.ensure_open()?;
        let op = self
            .pending
            .remove(&handle.as_u64())
            .ok_or(DriverError::UnknownHandle(handle))?;
        let now = Instant::now();
        if op.ready_at > now {
            tokio::time::sleep(op.ready_at.saturating_duration_since(now)).await;
        }
        debug!(target: "skein::driver", %handle, "reaping async statement");
        self.run(&op.sql).map_err(|e| match e {
            DriverError::Execution(msg) => DriverError::AsyncExecution(msg),
            other => other,
        })
    }

    async fn close(&mut self) -> DriverResult<()> {
        self.closed = true;
        self.pending.clear();
        self.statements.clear();
        Ok(())
    }
}

// =============================================================================
// Statement evaluation
// =============================================================================

fn run_statement(state: &mut ServerState, sql: &str) -> DriverResult<ExecOutcome> {
    let sql = sql.trim();
    match leading_keyword(sql).as_str() {
        "create" => run_create(state, sql),
        "insert" => run_insert(state, sql),
        "select" => run_select(state, sql),
        "delete" => run_delete(state, sql),
        _ => Err(DriverError::Execution(format!(
            "unsupported statement near '{}'",
            sql.chars().take(16).collect::<String>()
        ))),
    }
}

fn run_create(state: &mut ServerState, sql: &str) -> DriverResult<ExecOutcome> {
    let rest = strip_keywords(sql, &["create", "table"])
        .ok_or_else(|| DriverError::Execution("malformed CREATE TABLE".to_string()))?;
    let open = rest
        .find('(')
        .ok_or_else(|| DriverError::Execution("CREATE TABLE missing column list".to_string()))?;
    let close = rest
        .rfind(')')
        .ok_or_else(|| DriverError::Execution("CREATE TABLE missing column list".to_string()))?;
    let name = rest[..open].trim().to_string();
    if name.is_empty() {
        return Err(DriverError::Execution("CREATE TABLE missing name".to_string()));
    }
    if state.tables.contains_key(&name) {
        return Err(DriverError::Execution(format!("table already exists: {}", name)));
    }

    let mut columns = Vec::new();
    for segment in split_csv(&rest[open + 1..close]) {
        let first = segment.split_whitespace().next().unwrap_or("");
        // Skip table-level constraint clauses.
        if matches!(
            first.to_ascii_uppercase().as_str(),
            "PRIMARY" | "UNIQUE" | "KEY" | "CONSTRAINT" | "FOREIGN" | "CHECK"
        ) {
            continue;
        }
        if !first.is_empty() {
            columns.push(first.to_string());
        }
    }
    if columns.is_empty() {
        return Err(DriverError::Execution(format!("table {} has no columns", name)));
    }

    state.tables.insert(
        name,
        Table {
            columns,
            rows: Vec::new(),
        },
    );
    Ok(ExecOutcome::Mutation {
        rows_affected: 0,
        last_insert_id: state.last_insert_id,
    })
}

fn run_insert(state: &mut ServerState, sql: &str) -> DriverResult<ExecOutcome> {
    let rest = strip_keywords(sql, &["insert", "into"])
        .ok_or_else(|| DriverError::Execution("malformed INSERT".to_string()))?;
    let values_at = find_keyword(rest, "values")
        .ok_or_else(|| DriverError::Execution("INSERT missing VALUES".to_string()))?;
    let head = rest[..values_at].trim();
    let tuples_text = &rest[values_at + "values".len()..];

    // Optional explicit column list after the table name.
    let (name, listed_columns) = match head.find('(') {
        Some(open) => {
            let close = head
                .rfind(')')
                .ok_or_else(|| DriverError::Execution("unterminated column list".to_string()))?;
            let cols: Vec<String> = split_csv(&head[open + 1..close])
                .into_iter()
                .map(|c| c.trim().to_string())
                .collect();
            (head[..open].trim().to_string(), Some(cols))
        }
        None => (head.to_string(), None),
    };

    let table = state
        .tables
        .get_mut(&name)
        .ok_or_else(|| DriverError::Execution(format!("unknown table: {}", name)))?;

    let column_order: Vec<usize> = match &listed_columns {
        Some(cols) => cols
            .iter()
            .map(|c| {
                table
                    .column_index(c)
                    .ok_or_else(|| DriverError::Execution(format!("unknown column: {}", c)))
            })
            .collect::<DriverResult<Vec<_>>>()?,
        None => (0..table.columns.len()).collect(),
    };

    let mut inserted = 0u64;
    for tuple in parse_tuples(tuples_text)? {
        let literals = split_csv(&tuple);
        if literals.len() != column_order.len() {
            return Err(DriverError::Execution(format!(
                "column count mismatch for table {}: expected {}, got {}",
                name,
                column_order.len(),
                literals.len()
            )));
        }
        let mut row = vec![Value::Null; table.columns.len()];
        for (slot, literal) in column_order.iter().zip(literals) {
            row[*slot] = parse_literal(literal.trim());
        }
        table.rows.push(row);
        state.last_insert_id = state.next_insert_id;
        state.next_insert_id += 1;
        inserted += 1;
    }
    if inserted == 0 {
        return Err(DriverError::Execution("INSERT with no value tuples".to_string()));
    }
    Ok(ExecOutcome::Mutation {
        rows_affected: inserted,
        last_insert_id: state.last_insert_id,
    })
}

fn run_select(state: &mut ServerState, sql: &str) -> DriverResult<ExecOutcome> {
    let rest = strip_keywords(sql, &["select"])
        .ok_or_else(|| DriverError::Execution("malformed SELECT".to_string()))?;

    let Some(from_at) = find_keyword(rest, "from") else {
        // Literal projection: one synthetic row, columns named by the
        // projected expressions' text.
        let mut record = Record::new();
        for item in split_csv(rest) {
            let item = item.trim();
            record.push(item, parse_literal(item));
        }
        return Ok(ExecOutcome::Rows(vec![record]));
    };

    let projection = rest[..from_at].trim();
    let tail = rest[from_at + "from".len()..].trim();
    let (name, predicate) = match find_keyword(tail, "where") {
        Some(at) => (
            tail[..at].trim(),
            Some(parse_where(&tail[at + "where".len()..])?),
        ),
        None => (tail, None),
    };

    let table = state
        .tables
        .get(name)
        .ok_or_else(|| DriverError::Execution(format!("unknown table: {}", name)))?;

    let selected: Vec<usize> = if projection == "*" {
        (0..table.columns.len()).collect()
    } else {
        split_csv(projection)
            .into_iter()
            .map(|c| {
                let c = c.trim();
                table
                    .column_index(c)
                    .ok_or_else(|| DriverError::Execution(format!("unknown column: {}", c)))
            })
            .collect::<DriverResult<Vec<_>>>()?
    };

    let filter = match &predicate {
        Some((column, value)) => {
            let idx = table
                .column_index(column)
                .ok_or_else(|| DriverError::Execution(format!("unknown column: {}", column)))?;
            Some((idx, value.clone()))
        }
        None => None,
    };

    let mut records = Vec::new();
    for row in &table.rows {
        if let Some((idx, value)) = &filter {
            if row[*idx] != *value {
                continue;
            }
        }
        let mut record = Record::new();
        for &slot in &selected {
            record.push(table.columns[slot].clone(), row[slot].clone());
        }
        records.push(record);
    }
    Ok(ExecOutcome::Rows(records))
}

fn run_delete(state: &mut ServerState, sql: &str) -> DriverResult<ExecOutcome> {
    let rest = strip_keywords(sql, &["delete", "from"])
        .ok_or_else(|| DriverError::Execution("malformed DELETE".to_string()))?;
    let (name, predicate) = match find_keyword(rest, "where") {
        Some(at) => (
            rest[..at].trim(),
            Some(parse_where(&rest[at + "where".len()..])?),
        ),
        None => (rest.trim(), None),
    };

    let last_insert_id = state.last_insert_id;
    let table = state
        .tables
        .get_mut(name)
        .ok_or_else(|| DriverError::Execution(format!("unknown table: {}", name)))?;

    let before = table.rows.len();
    match predicate {
        Some((column, value)) => {
            let idx = table
                .column_index(&column)
                .ok_or_else(|| DriverError::Execution(format!("unknown column: {}", column)))?;
            table.rows.retain(|row| row[idx] != value);
        }
        None => table.rows.clear(),
    }
    Ok(ExecOutcome::Mutation {
        rows_affected: (before - table.rows.len()) as u64,
        last_insert_id,
    })
}

// =============================================================================
// Text helpers
// =============================================================================

/// Returns the first keyword of a statement, lowercased.
fn leading_keyword(sql: &str) -> String {
    sql.trim_start()
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Strips a sequence of leading keywords, case-insensitively.
fn strip_keywords<'a>(sql: &'a str, keywords: &[&str]) -> Option<&'a str> {
    let mut rest = sql.trim_start();
    for keyword in keywords {
        if rest.len() < keyword.len() || !rest[..keyword.len()].eq_ignore_ascii_case(keyword) {
            return None;
        }
        rest = rest[keyword.len()..].trim_start();
    }
    Some(rest)
}

/// Finds a keyword's byte offset outside quoted regions, case-insensitively,
/// requiring word boundaries on both sides.
fn find_keyword(text: &str, keyword: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let lower: Vec<u8> = text.to_ascii_lowercase().into_bytes();
    let needle = keyword.as_bytes();
    let mut quote: Option<u8> = None;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) => {
                if b == q {
                    quote = None;
                }
            }
            None => {
                if b == b'\'' || b == b'"' {
                    quote = Some(b);
                } else if lower[i..].starts_with(needle) {
                    let before_ok = i == 0 || !bytes[i - 1].is_ascii_alphanumeric();
                    let after = i + needle.len();
                    let after_ok = after >= bytes.len() || !bytes[after].is_ascii_alphanumeric();
                    if before_ok && after_ok {
                        return Some(i);
                    }
                }
            }
        }
        i += 1;
    }
    None
}

/// Splits on commas outside quotes and parentheses.
fn split_csv(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut depth = 0usize;
    for c in text.chars() {
        match quote {
            Some(q) => {
                current.push(c);
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' => {
                    quote = Some(c);
                    current.push(c);
                }
                '(' => {
                    depth += 1;
                    current.push(c);
                }
                ')' => {
                    depth = depth.saturating_sub(1);
                    current.push(c);
                }
                ',' if depth == 0 => {
                    parts.push(current.trim().to_string());
                    current = String::new();
                }
                _ => current.push(c),
            },
        }
    }
    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }
    parts
}

/// Splits a multi-statement string on semicolons outside quotes.
fn split_statements(sql: &str) -> Vec<&str> {
    let bytes = sql.as_bytes();
    let mut parts = Vec::new();
    let mut quote: Option<u8> = None;
    let mut start = 0;
    for (i, &b) in bytes.iter().enumerate() {
        match quote {
            Some(q) => {
                if b == q {
                    quote = None;
                }
            }
            None => {
                if b == b'\'' || b == b'"' {
                    quote = Some(b);
                } else if b == b';' {
                    let piece = sql[start..i].trim();
                    if !piece.is_empty() {
                        parts.push(piece);
                    }
                    start = i + 1;
                }
            }
        }
    }
    let piece = sql[start..].trim();
    if !piece.is_empty() {
        parts.push(piece);
    }
    parts
}

/// Extracts the parenthesized tuples of a VALUES clause.
fn parse_tuples(text: &str) -> DriverResult<Vec<String>> {
    let mut tuples = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut depth = 0usize;
    for c in text.chars() {
        match quote {
            Some(q) => {
                current.push(c);
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' if depth > 0 => {
                    quote = Some(c);
                    current.push(c);
                }
                '(' => {
                    depth += 1;
                    if depth > 1 {
                        current.push(c);
                    }
                }
                ')' => {
                    if depth == 0 {
                        return Err(DriverError::Execution("unbalanced VALUES tuple".to_string()));
                    }
                    depth -= 1;
                    if depth == 0 {
                        tuples.push(std::mem::take(&mut current));
                    } else {
                        current.push(c);
                    }
                }
                _ => {
                    if depth > 0 {
                        current.push(c);
                    }
                }
            },
        }
    }
    if depth != 0 || quote.is_some() {
        return Err(DriverError::Execution("unterminated VALUES tuple".to_string()));
    }
    Ok(tuples)
}

/// Parses a single `column = literal` predicate.
fn parse_where(clause: &str) -> DriverResult<(String, Value)> {
    let eq = clause
        .find('=')
        .ok_or_else(|| DriverError::Execution("unsupported WHERE clause".to_string()))?;
    let column = clause[..eq].trim();
    let literal = clause[eq + 1..].trim();
    if column.is_empty() || literal.is_empty() {
        return Err(DriverError::Execution("unsupported WHERE clause".to_string()));
    }
    Ok((column.to_string(), parse_literal(literal)))
}

/// Parses one SQL literal into a value.
fn parse_literal(text: &str) -> Value {
    let text = text.trim();
    if text.eq_ignore_ascii_case("null") {
        return Value::Null;
    }
    if text.eq_ignore_ascii_case("true") {
        return Value::Boolean(true);
    }
    if text.eq_ignore_ascii_case("false") {
        return Value::Boolean(false);
    }
    if (text.starts_with('\'') && text.ends_with('\'') && text.len() >= 2)
        || (text.starts_with('"') && text.ends_with('"') && text.len() >= 2)
    {
        let inner = &text[1..text.len() - 1];
        return Value::String(inner.replace("''", "'"));
    }
    if let Ok(i) = text.parse::<i64>() {
        return Value::Integer(i);
    }
    if let Ok(f) = text.parse::<f64>() {
        return Value::Float(f);
    }
    Value::String(text.to_string())
}

/// Formats a value as a SQL literal.
fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Boolean(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::String(s) => format!("'{}'", s.replace('\'', "''")),
        Value::Bytes(b) => format!(
            "'{}'",
            b.iter().map(|byte| format!("{:02x}", byte)).collect::<String>()
        ),
    }
}

/// Replaces `?` placeholders outside quotes with formatted parameters.
fn substitute_placeholders(sql: &str, params: &[Value]) -> DriverResult<String> {
    let mut bound = String::with_capacity(sql.len());
    let mut quote: Option<char> = None;
    let mut used = 0usize;
    for c in sql.chars() {
        match quote {
            Some(q) => {
                bound.push(c);
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' => {
                    quote = Some(c);
                    bound.push(c);
                }
                '?' => {
                    let param = params.get(used).ok_or_else(|| {
                        DriverError::Execution(format!(
                            "bound parameter count mismatch: statement needs more than {} parameters",
                            params.len()
                        ))
                    })?;
                    bound.push_str(&format_value(param));
                    used += 1;
                }
                _ => bound.push(c),
            },
        }
    }
    if used != params.len() {
        return Err(DriverError::Execution(format!(
            "bound parameter count mismatch: statement has {} placeholders, got {}",
            used,
            params.len()
        )));
    }
    Ok(bound)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connect() -> MemoryDriver {
        MemoryDriver::connect(&DriverConfig::for_testing(), &MemoryServer::new()).unwrap()
    }

    #[tokio::test]
    async fn test_create_insert_select() {
        let mut driver = connect();

        driver.execute("CREATE TABLE users (id, name)").await.unwrap();
        let outcome = driver
            .execute("INSERT INTO users VALUES (1, 'Alice'), (2, 'Bob')")
            .await
            .unwrap();
        assert_eq!(outcome.rows_affected(), Some(2));
        assert_eq!(outcome.last_insert_id(), Some(2));

        let outcome = driver.execute("SELECT * FROM users").await.unwrap();
        let rows = outcome.rows().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("name"), Some(&Value::String("Alice".to_string())));
    }

    #[tokio::test]
    async fn test_select_where_and_projection() {
        let mut driver = connect();
        driver.execute("CREATE TABLE users (id, name)").await.unwrap();
        driver
            .execute("INSERT INTO users VALUES (1, 'Alice'), (2, 'Bob')")
            .await
            .unwrap();

        let outcome = driver
            .execute("SELECT name FROM users WHERE id = 2")
            .await
            .unwrap();
        let rows = outcome.rows().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 1);
        assert_eq!(rows[0].get("name"), Some(&Value::String("Bob".to_string())));
    }

    #[tokio::test]
    async fn test_select_literals() {
        let mut driver = connect();
        let outcome = driver.execute("SELECT 1, 'x'").await.unwrap();
        let rows = outcome.rows().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("1"), Some(&Value::Integer(1)));
        assert_eq!(rows[0].get("'x'"), Some(&Value::String("x".to_string())));
    }

    #[tokio::test]
    async fn test_insert_with_column_list() {
        let mut driver = connect();
        driver.execute("CREATE TABLE users (id, name, email)").await.unwrap();
        driver
            .execute("INSERT INTO users (name, id) VALUES ('Alice', 1)")
            .await
            .unwrap();

        let outcome = driver.execute("SELECT * FROM users").await.unwrap();
        let rows = outcome.rows().unwrap();
        assert_eq!(rows[0].get("id"), Some(&Value::Integer(1)));
        assert_eq!(rows[0].get("email"), Some(&Value::Null));
    }

    #[tokio::test]
    async fn test_delete() {
        let mut driver = connect();
        driver.execute("CREATE TABLE users (id, name)").await.unwrap();
        driver
            .execute("INSERT INTO users VALUES (1, 'Alice'), (2, 'Bob')")
            .await
            .unwrap();

        let outcome = driver.execute("DELETE FROM users WHERE id = 1").await.unwrap();
        assert_eq!(outcome.rows_affected(), Some(1));

        let outcome = driver.execute("SELECT * FROM users").await.unwrap();
        assert_eq!(outcome.rows().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_execute_batch() {
        let mut driver = connect();
        let outcomes = driver
            .execute_batch("SELECT 1; SELECT 2")
            .await
            .unwrap();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[1].rows().unwrap()[0].get("2"), Some(&Value::Integer(2)));
    }

    #[tokio::test]
    async fn test_prepared_roundtrip() {
        let mut driver = connect();
        driver.execute("CREATE TABLE users (id, name)").await.unwrap();
        driver
            .execute("INSERT INTO users VALUES (5, 'Eve')")
            .await
            .unwrap();

        let id = driver
            .prepare("SELECT * FROM users WHERE id = ?")
            .await
            .unwrap();
        let outcome = driver
            .execute_prepared(id, &[Value::Integer(5)])
            .await
            .unwrap();
        assert_eq!(outcome.rows().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_prepare_rejects_garbage() {
        let mut driver = connect();
        let err = driver.prepare("SELEKT * FROM users").await.unwrap_err();
        assert!(matches!(err, DriverError::Prepare(_)));
    }

    #[tokio::test]
    async fn test_prepared_arity_mismatch() {
        let mut driver = connect();
        driver.execute("CREATE TABLE users (id, name)").await.unwrap();
        let id = driver
            .prepare("SELECT * FROM users WHERE id = ?")
            .await
            .unwrap();
        let err = driver.execute_prepared(id, &[]).await.unwrap_err();
        assert!(matches!(err, DriverError::Execution(_)));
    }

    #[tokio::test]
    async fn test_async_submit_poll_reap() {
        let mut driver = connect();
        driver.execute("CREATE TABLE t (id)").await.unwrap();

        let handle = driver.submit("INSERT INTO t VALUES (1)").await.unwrap();
        let ready = driver
            .poll(&[handle], Duration::from_millis(100))
            .await
            .unwrap();
        assert_eq!(ready, vec![handle]);

        let outcome = driver.reap(handle).await.unwrap();
        assert_eq!(outcome.last_insert_id(), Some(1));
        assert_eq!(driver.pending.len(), 0);
    }

    #[tokio::test]
    async fn test_poll_timeout_leaves_pending() {
        let config = DriverConfig::default().async_latency(Duration::from_secs(5));
        let mut driver = MemoryDriver::connect(&config, &MemoryServer::new()).unwrap();

        let handle = driver.submit("SELECT 1").await.unwrap();
        let ready = driver
            .poll(&[handle], Duration::from_millis(5))
            .await
            .unwrap();
        assert!(ready.is_empty());
        assert!(driver.pending.contains_key(&handle.as_u64()));
    }

    #[tokio::test]
    async fn test_reap_failure_is_async_execution() {
        let mut driver = connect();
        let handle = driver.submit("INSERT INTO missing VALUES (1)").await.unwrap();
        let err = driver.reap(handle).await.unwrap_err();
        assert!(matches!(err, DriverError::AsyncExecution(_)));
    }

    #[tokio::test]
    async fn test_reap_unknown_handle() {
        let mut driver = connect();
        let err = driver.reap(AsyncHandle::new(99)).await.unwrap_err();
        assert_eq!(err, DriverError::UnknownHandle(AsyncHandle::new(99)));
    }

    #[tokio::test]
    async fn test_submission_saturation() {
        let config = DriverConfig::default().async_latency(Duration::from_secs(60));
        let mut driver = MemoryDriver::connect(&config, &MemoryServer::new()).unwrap();
        for _ in 0..MAX_PENDING {
            driver.submit("SELECT 1").await.unwrap();
        }
        let err = driver.submit("SELECT 1").await.unwrap_err();
        assert!(matches!(err, DriverError::Submission(_)));
    }

    #[tokio::test]
    async fn test_closed_connection() {
        let mut driver = connect();
        driver.close().await.unwrap();
        let err = driver.execute("SELECT 1").await.unwrap_err();
        assert_eq!(err, DriverError::Closed);
    }

    #[tokio::test]
    async fn test_shared_server_visibility() {
        let server = MemoryServer::new();
        let config = DriverConfig::for_testing();
        let mut a = MemoryDriver::connect(&config, &server).unwrap();
        let mut b = MemoryDriver::connect(&config, &server).unwrap();

        a.execute("CREATE TABLE t (id)").await.unwrap();
        a.execute("INSERT INTO t VALUES (1)").await.unwrap();

        let outcome = b.execute("SELECT * FROM t").await.unwrap();
        assert_eq!(outcome.rows().unwrap().len(), 1);
        assert_eq!(server.row_count("t"), Some(1));
    }

    #[test]
    fn test_split_statements_respects_quotes() {
        let parts = split_statements("SELECT 'a;b'; SELECT 2;");
        assert_eq!(parts, vec!["SELECT 'a;b'", "SELECT 2"]);
    }

    #[test]
    fn test_parse_literal() {
        assert_eq!(parse_literal("42"), Value::Integer(42));
        assert_eq!(parse_literal("2.5"), Value::Float(2.5));
        assert_eq!(parse_literal("'it''s'"), Value::String("it's".to_string()));
        assert_eq!(parse_literal("NULL"), Value::Null);
        assert_eq!(parse_literal("TRUE"), Value::Boolean(true));
    }

    #[test]
    fn test_substitute_placeholders_skips_quoted() {
        let bound =
            substitute_placeholders("SELECT * FROM t WHERE a = '?' AND b = ?", &[Value::Integer(1)])
                .unwrap();
        assert_eq!(bound, "SELECT * FROM t WHERE a = '?' AND b = 1");
    }
}
