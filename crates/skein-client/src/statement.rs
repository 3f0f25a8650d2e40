//! Prepared statements.
//!
//! A [`Statement`] wraps one parameterized query: it is prepared through
//! the driver, binds positional parameters with inferred type tags, and
//! executes exactly once. Sessions keep at most one pending statement; a
//! new bind discards the previous one.

use skein_driver::{Driver, ExecOutcome, StatementId, Value};

use crate::error::{ClientError, ClientResult};

/// A parameterized statement.
#[derive(Debug, Clone)]
pub struct Statement {
    raw_sql: String,
    id: Option<StatementId>,
    type_codes: String,
    params: Vec<Value>,
}

impl Statement {
    /// Creates an unprepared statement from raw SQL.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            raw_sql: sql.into(),
            id: None,
            type_codes: String::new(),
            params: Vec::new(),
        }
    }

    /// Returns the raw SQL.
    pub fn sql(&self) -> &str {
        &self.raw_sql
    }

    /// Returns true once the driver has accepted the statement.
    pub fn is_prepared(&self) -> bool {
        self.id.is_some()
    }

    /// Returns the inferred type tag sequence, one tag per bound parameter:
    /// `i` for numeric parameters, `s` otherwise.
    pub fn type_codes(&self) -> &str {
        &self.type_codes
    }

    /// Asks the driver to prepare the statement.
    ///
    /// On rejection the statement stays unprepared: a later
    /// [`bind`](Statement::bind) is a no-op and
    /// [`execute`](Statement::execute) fails with
    /// [`ClientError::NotPrepared`].
    pub async fn prepare<D: Driver>(&mut self, driver: &mut D) -> ClientResult<()> {
        let id = driver.prepare(&self.raw_sql).await?;
        self.id = Some(id);
        Ok(())
    }

    /// Binds positional parameters, inferring one type tag per parameter.
    ///
    /// The parameter count must equal the number of `?` placeholders in the
    /// statement; a mismatch is raised here, before any driver call.
    pub fn bind(&mut self, params: Vec<Value>) -> ClientResult<()> {
        if self.id.is_none() {
            return Ok(());
        }
        let expected = count_placeholders(&self.raw_sql);
        if params.len() != expected {
            return Err(ClientError::BindArity {
                expected,
                got: params.len(),
            });
        }
        self.type_codes = params.iter().map(type_code).collect();
        self.params = params;
        Ok(())
    }

    /// Executes the prepared statement once with its bound parameters.
    pub async fn execute<D: Driver>(&self, driver: &mut D) -> ClientResult<ExecOutcome> {
        let id = self.id.ok_or(ClientError::NotPrepared)?;
        let outcome = driver.execute_prepared(id, &self.params).await?;
        Ok(outcome)
    }
}

/// Infers the driver-level type tag for one parameter.
fn type_code(param: &Value) -> char {
    if param.is_numeric() {
        'i'
    } else {
        's'
    }
}

/// Counts `?` placeholders outside quoted regions.
fn count_placeholders(sql: &str) -> usize {
    let mut count = 0;
    let mut quote: Option<char> = None;
    for c in sql.chars() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' => quote = Some(c),
                '?' => count += 1,
                _ => {}
            },
        }
    }
    count
}
