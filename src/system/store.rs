use std::collections::HashSet;
use std::sync::Arc;

use super::descriptor::{KeyKind, SystemTableDescriptor};
use super::row::{InsertOutcome, Row};
use crate::error::{InfoSchemaError, Result};
use crate::types::Value;

/// Rows of one system table as materialized for one session.
///
/// `stamp` is the schema change counter the rows were built at; `None`
/// means never built or invalidated.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    rows: Arc<Vec<Row>>,
    keys: HashSet<Vec<Value>>,
    stamp: Option<u64>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops all rows. Snapshots handed out earlier keep their rows.
    pub fn clear(&mut self) {
        self.rows = Arc::new(Vec::new());
        self.keys.clear();
    }

    pub fn stamp(&self) -> Option<u64> {
        self.stamp
    }

    pub fn set_stamp(&mut self, stamp: Option<u64>) {
        self.stamp = stamp;
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn snapshot(&self) -> Arc<Vec<Row>> {
        Arc::clone(&self.rows)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Validates `row` against the descriptor and inserts it unless its key
    /// collides with a row already present
    pub fn insert(&mut self, descriptor: &SystemTableDescriptor, row: Row) -> Result<InsertOutcome> {
        let table = descriptor.id.name();
        if let Some(index) = row.out_of_range() {
            return Err(InfoSchemaError::RowWidth {
                table: table.to_string(),
                expected: descriptor.column_count(),
                actual: index + 1,
            });
        }
        if row.len() != descriptor.column_count() {
            return Err(InfoSchemaError::RowWidth {
                table: table.to_string(),
                expected: descriptor.column_count(),
                actual: row.len(),
            });
        }
        for (column, value) in descriptor.columns.iter().zip(row.values()) {
            if !column.column_type.accepts(value) {
                return Err(InfoSchemaError::TypeMismatch {
                    table: table.to_string(),
                    column: column.name.to_string(),
                    value: format!("{value:?}"),
                });
            }
        }

        let key: Vec<Value> = descriptor
            .key
            .columns
            .iter()
            .map(|&i| row[i].clone())
            .collect();
        let enforced = match descriptor.key.kind {
            KeyKind::Primary => true,
            KeyKind::OrderOnly => key.iter().all(|v| !v.is_null()),
        };
        if enforced && !self.keys.insert(key) {
            return Ok(InsertOutcome::DuplicateDiscarded);
        }

        Arc::make_mut(&mut self.rows).push(row);
        Ok(InsertOutcome::Committed)
    }
}
