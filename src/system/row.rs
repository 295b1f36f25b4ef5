use std::ops::Index;

use crate::types::Value;

/// Fixed-width tuple addressed by column position
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Row {
    values: Vec<Value>,
    out_of_range: Option<usize>,
}

impl Row {
    /// All-null row of `width` cells
    pub fn new(width: usize) -> Self {
        Self {
            values: vec![Value::Null; width],
            out_of_range: None,
        }
    }

    pub fn from_values(values: Vec<Value>) -> Self {
        Self {
            values,
            out_of_range: None,
        }
    }

    /// Assigns a cell. An index past the row width is remembered and
    /// rejected when the row is committed.
    pub fn set(&mut self, index: usize, value: impl Into<Value>) {
        match self.values.get_mut(index) {
            Some(cell) => *cell = value.into(),
            None => {
                self.out_of_range.get_or_insert(index);
            }
        }
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn text(&self, index: usize) -> Option<&str> {
        self.values.get(index).and_then(Value::as_str)
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub(crate) fn out_of_range(&self) -> Option<usize> {
        self.out_of_range
    }
}

impl Index<usize> for Row {
    type Output = Value;

    fn index(&self, index: usize) -> &Value {
        &self.values[index]
    }
}

/// Result of submitting a row to a system table store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Committed,
    DuplicateDiscarded,
}
