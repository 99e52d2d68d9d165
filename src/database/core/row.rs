//! Row sets and mutation summaries returned by the DAL

use anyhow::{anyhow, Result};
use rusqlite::types::{FromSql, Value, ValueRef};
use serde::Serialize;
use std::sync::Arc;

/// Build a positional parameter list from anything convertible into [`Value`]
///
/// ```rust,ignore
/// dal.query("SELECT * FROM Books WHERE Quantity > ?1", &sql_params![0]).await?;
/// ```
#[macro_export]
macro_rules! sql_params {
    () => {
        Vec::<$crate::database::Value>::new()
    };
    ($($param:expr),+ $(,)?) => {
        vec![$($crate::database::Value::from($param)),+]
    };
}

/// One row of a query result
///
/// Column names are shared between all rows of the same result set.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    pub(crate) fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
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

    /// Position of a column, matched case-insensitively
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c == column)
            .or_else(|| {
                self.columns
                    .iter()
                    .position(|c| c.eq_ignore_ascii_case(column))
            })
    }

    /// Get a typed value by column name
    pub fn get<T: FromSql>(&self, column: &str) -> Result<T> {
        let idx = self
            .column_index(column)
            .ok_or_else(|| anyhow!("No column named '{}' in row", column))?;
        self.get_index(idx)
            .map_err(|e| anyhow!("Invalid value in column '{}': {}", column, e))
    }

    /// Get a typed value by position
    pub fn get_index<T: FromSql>(&self, idx: usize) -> Result<T> {
        let value = self
            .values
            .get(idx)
            .ok_or_else(|| anyhow!("Column index {} out of range", idx))?;
        T::column_result(ValueRef::from(value)).map_err(|e| anyhow!("{}", e))
    }

    /// Render the row as a JSON object keyed by column name
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .columns
            .iter()
            .zip(&self.values)
            .map(|(column, value)| (column.clone(), value_to_json(value)))
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(map)
    }
}

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Integer(i) => serde_json::Value::from(*i),
        Value::Real(f) => serde_json::Value::from(*f),
        Value::Text(s) => serde_json::Value::from(s.as_str()),
        Value::Blob(b) => serde_json::Value::from(b.clone()),
    }
}

/// Outcome of a mutating statement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExecuteSummary {
    /// Number of rows inserted, updated or deleted
    pub rows_affected: usize,
    /// Engine-assigned key of the last row inserted by the statement
    pub inserted_id: Option<i64>,
}
