use crate::query::ast::{
    common::{Condition, Operator, TableRef},
    delete::Delete,
};
use model::core::value::Value;

#[derive(Debug, Clone)]
pub struct DeleteBuilder {
    ast: Delete,
}

impl DeleteBuilder {
    pub fn new(table: impl Into<TableRef>) -> Self {
        Self {
            ast: Delete {
                table: table.into(),
                conditions: Vec::new(),
            },
        }
    }

    pub fn where_eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.ast.conditions.push(Condition {
            column: column.to_string(),
            op: Operator::Eq,
            value: value.into(),
        });
        self
    }

    pub fn build(self) -> Delete {
        self.ast
    }
}

#[cfg(test)]
mod tests {
    use super::DeleteBuilder;
    use crate::query::renderer::Render;

    #[test]
    fn test_delete_builder() {
        let (cql, params) = DeleteBuilder::new("t").where_eq("k", 3).build().to_cql();
        assert_eq!(cql, "DELETE FROM t WHERE k = ?");
        assert_eq!(params.len(), 1);
    }
}
