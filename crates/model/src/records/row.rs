use crate::core::{data_type::CqlType, value::Value};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub data_type: CqlType,
}

impl ColumnSpec {
    pub fn new(name: &str, data_type: CqlType) -> Self {
        ColumnSpec {
            name: name.to_string(),
            data_type,
        }
    }
}

/// One materialized result row. Column metadata is shared by every row of a
/// result page.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[ColumnSpec]>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(columns: Arc<[ColumnSpec]>, values: Vec<Value>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Row { columns, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn get_by_name(&self, column: &str) -> Option<&Value> {
        self.index_of(column).and_then(|idx| self.values.get(idx))
    }

    pub fn index_of(&self, column: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(column))
    }

    /// Value of `column`, or `Value::Null` when the column is absent.
    pub fn get_value(&self, column: &str) -> Value {
        self.get_by_name(column).cloned().unwrap_or(Value::Null)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ColumnSpec, &Value)> {
        self.columns.iter().zip(self.values.iter())
    }
}

impl std::ops::Index<usize> for Row {
    type Output = Value;

    fn index(&self, index: usize) -> &Self::Output {
        &self.values[index]
    }
}
