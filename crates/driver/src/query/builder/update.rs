use crate::query::ast::{
    common::{Condition, Operator, TableRef},
    update::{Assignment, CounterOp, Update},
};
use model::core::value::Value;

#[derive(Debug, Clone)]
pub struct UpdateBuilder {
    ast: Update,
}

impl UpdateBuilder {
    pub fn new(table: impl Into<TableRef>) -> Self {
        Self {
            ast: Update {
                table: table.into(),
                ..Default::default()
            },
        }
    }

    pub fn set(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.ast.assignments.push(Assignment::Set {
            column: column.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn increment(self, column: &str, amount: i64) -> Self {
        self.counter(column, CounterOp::Add, amount)
    }

    pub fn decrement(self, column: &str, amount: i64) -> Self {
        self.counter(column, CounterOp::Subtract, amount)
    }

    fn counter(mut self, column: &str, op: CounterOp, amount: i64) -> Self {
        self.ast.assignments.push(Assignment::Counter {
            column: column.to_string(),
            op,
            amount: Value::Counter(amount),
        });
        self
    }

    pub fn where_eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.ast.conditions.push(Condition {
            column: column.to_string(),
            op: Operator::Eq,
            value: value.into(),
        });
        self
    }

    pub fn build(self) -> Update {
        self.ast
    }
}

#[cfg(test)]
mod tests {
    use super::UpdateBuilder;
    use crate::query::renderer::Render;
    use model::core::value::Value;

    #[test]
    fn test_update_builder() {
        let (cql, params) = UpdateBuilder::new("counters")
            .increment("hits", 3)
            .where_eq("id", 1)
            .build()
            .to_cql();

        assert_eq!(cql, "UPDATE counters SET hits = hits + ? WHERE id = ?");
        assert_eq!(params, vec![Value::Counter(3), Value::Int(1)]);
    }
}
