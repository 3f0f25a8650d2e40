//! Session result shapes and history keys.

use std::fmt;

use skein_driver::{ExecOutcome, Record};

/// The tagged result of a session operation.
///
/// Distinguishes the three shapes the session can produce, so callers never
/// have to probe the structure of an untyped buffer: a single statement's
/// rows, one row group per statement of a batch, or the inserted-row id of
/// a mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultSet {
    /// Rows of a single statement.
    Rows(Vec<Record>),
    /// One row group per statement, in execution order.
    RowGroups(Vec<Vec<Record>>),
    /// Server-assigned id of the last inserted row.
    InsertId(u64),
}

impl ResultSet {
    /// Converts a driver outcome into the corresponding result shape.
    pub fn from_outcome(outcome: ExecOutcome) -> Self {
        match outcome {
            ExecOutcome::Rows(rows) => ResultSet::Rows(rows),
            ExecOutcome::Mutation { last_insert_id, .. } => ResultSet::InsertId(last_insert_id),
        }
    }

    /// Returns the rows if this is a single-statement result.
    pub fn rows(&self) -> Option<&[Record]> {
        match self {
            ResultSet::Rows(rows) => Some(rows),
            _ => None,
        }
    }

    /// Returns the row groups if this is a batch result.
    pub fn groups(&self) -> Option<&[Vec<Record>]> {
        match self {
            ResultSet::RowGroups(groups) => Some(groups),
            _ => None,
        }
    }

    /// Returns the inserted-row id if this is a mutation result.
    pub fn insert_id(&self) -> Option<u64> {
        match self {
            ResultSet::InsertId(id) => Some(*id),
            _ => None,
        }
    }

    /// Returns the total number of rows across all shapes.
    pub fn row_count(&self) -> usize {
        match self {
            ResultSet::Rows(rows) => rows.len(),
            ResultSet::RowGroups(groups) => groups.iter().map(Vec::len).sum(),
            ResultSet::InsertId(_) => 0,
        }
    }
}

impl fmt::Display for ResultSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultSet::Rows(rows) => {
                for (i, record) in rows.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", record)?;
                }
                Ok(())
            }
            ResultSet::RowGroups(groups) => {
                for (i, group) in groups.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "[")?;
                    for (j, record) in group.iter().enumerate() {
                        if j > 0 {
                            write!(f, " ")?;
                        }
                        write!(f, "{}", record)?;
                    }
                    write!(f, "]")?;
                }
                Ok(())
            }
            ResultSet::InsertId(id) => write!(f, "insert_id {}", id),
        }
    }
}

/// Key for history lookup: positional or by name.
///
/// Built via `From` impls so `history(0)` and `history("users")` both work.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryKey {
    /// Positional index; negative means distance from the end.
    Index(i64),
    /// Exact entry name.
    Name(String),
}

impl From<i64> for HistoryKey {
    fn from(index: i64) -> Self {
        HistoryKey::Index(index)
    }
}

impl From<i32> for HistoryKey {
    fn from(index: i32) -> Self {
        HistoryKey::Index(index as i64)
    }
}

impl From<&str> for HistoryKey {
    fn from(name: &str) -> Self {
        HistoryKey::Name(name.to_string())
    }
}

impl From<String> for HistoryKey {
    fn from(name: String) -> Self {
        HistoryKey::Name(name)
    }
}
