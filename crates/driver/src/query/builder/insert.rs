use crate::query::ast::{common::TableRef, insert::Insert};
use model::core::value::Value;

#[derive(Debug, Clone)]
pub struct InsertBuilder {
    ast: Insert,
}

impl InsertBuilder {
    pub fn new(table: impl Into<TableRef>) -> Self {
        Self {
            ast: Insert {
                table: table.into(),
                ..Default::default()
            },
        }
    }

    pub fn value(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.ast.columns.push(column.to_string());
        self.ast.values.push(value.into());
        self
    }

    pub fn if_not_exists(mut self) -> Self {
        self.ast.if_not_exists = true;
        self
    }

    pub fn build(self) -> Insert {
        self.ast
    }
}
