//! Statement execution outcomes.

use crate::value::Record;

/// Result of executing one statement.
///
/// A statement either produces rows or mutates; the wire never returns
/// both. Rows are always materialized eagerly — there is no partial or
/// lazy row delivery through this type.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecOutcome {
    /// A row-bearing result, fully materialized.
    Rows(Vec<Record>),
    /// A mutation (insert/update/delete) with no row result.
    Mutation {
        /// Number of rows the statement affected.
        rows_affected: u64,
        /// Server-assigned identifier of the last inserted row, or 0 if the
        /// statement inserted nothing.
        last_insert_id: u64,
    },
}

impl ExecOutcome {
    /// Creates an empty row-bearing outcome.
    pub fn empty_rows() -> Self {
        ExecOutcome::Rows(Vec::new())
    }

    /// Returns true if this outcome bears rows.
    pub fn is_rows(&self) -> bool {
        matches!(self, ExecOutcome::Rows(_))
    }

    /// Returns true if this outcome is a mutation.
    pub fn is_mutation(&self) -> bool {
        matches!(self, ExecOutcome::Mutation { .. })
    }

    /// Returns the rows if this outcome bears rows.
    pub fn rows(&self) -> Option<&[Record]> {
        match self {
            ExecOutcome::Rows(rows) => Some(rows),
            _ => None,
        }
    }

    /// Consumes the outcome, returning its rows if any.
    pub fn into_rows(self) -> Option<Vec<Record>> {
        match self {
            ExecOutcome::Rows(rows) => Some(rows),
            _ => None,
        }
    }

    /// Returns the number of rows affected, if this is a mutation.
    pub fn rows_affected(&self) -> Option<u64> {
        match self {
            ExecOutcome::Mutation { rows_affected, .. } => Some(*rows_affected),
            _ => None,
        }
    }

    /// Returns the last inserted row id, if this is a mutation.
    pub fn last_insert_id(&self) -> Option<u64> {
        match self {
            ExecOutcome::Mutation { last_insert_id, .. } => Some(*last_insert_id),
            _ => None,
        }
    }
}
