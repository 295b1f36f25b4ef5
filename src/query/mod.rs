// SELECT support over the materialized system tables
pub mod interceptor;
pub mod where_evaluator;

use crate::error::Result;
use crate::session::Session;
use crate::system::InformationSchema;
use crate::types::Value;

pub use interceptor::SystemTableInterceptor;
pub use where_evaluator::WhereEvaluator;

/// Projected rows of one system table query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl QueryResult {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cells of the named column, top to bottom
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let index = self.columns.iter().position(|c| c.eq_ignore_ascii_case(name))?;
        Some(self.rows.iter().map(|row| &row[index]).collect())
    }

    /// Rows as JSON objects keyed by column name
    pub fn to_json(&self) -> serde_json::Value {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let object = self
                    .columns
                    .iter()
                    .zip(row)
                    .map(|(column, value)| (column.clone(), value.to_json()))
                    .collect();
                serde_json::Value::Object(object)
            })
            .collect();
        serde_json::Value::Array(rows)
    }
}

pub fn execute(engine: &InformationSchema, session: &mut Session, sql: &str) -> Result<Option<QueryResult>> {
    SystemTableInterceptor::intercept_query(engine, session, sql)
}
