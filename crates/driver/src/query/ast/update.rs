use crate::query::ast::common::{Condition, TableRef};
use model::core::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterOp {
    Add,
    Subtract,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Assignment {
    /// `column = ?`
    Set { column: String, value: Value },
    /// `column = column + ?` or `column = column - ?`, for counters.
    Counter {
        column: String,
        op: CounterOp,
        amount: Value,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    pub table: TableRef,
    pub assignments: Vec<Assignment>,
    pub conditions: Vec<Condition>,
}
