use crate::query::ast::{
    common::{Condition, Operator, TableRef},
    select::{Projection, Select},
};
use model::core::value::Value;

#[derive(Debug, Clone)]
pub struct SelectBuilder {
    ast: Select,
}

impl SelectBuilder {
    pub fn new(table: impl Into<TableRef>) -> Self {
        Self {
            ast: Select {
                table: table.into(),
                ..Default::default()
            },
        }
    }

    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.ast.projection = Projection::Columns(columns.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn count(mut self) -> Self {
        self.ast.projection = Projection::Count;
        self
    }

    pub fn where_op(mut self, column: &str, op: Operator, value: impl Into<Value>) -> Self {
        self.ast.conditions.push(Condition {
            column: column.to_string(),
            op,
            value: value.into(),
        });
        self
    }

    pub fn where_eq(self, column: &str, value: impl Into<Value>) -> Self {
        self.where_op(column, Operator::Eq, value)
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.ast.limit = Some(limit);
        self
    }

    pub fn allow_filtering(mut self) -> Self {
        self.ast.allow_filtering = true;
        self
    }

    pub fn build(self) -> Select {
        self.ast
    }
}
