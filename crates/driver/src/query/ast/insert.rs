use crate::query::ast::common::TableRef;
use model::core::value::Value;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Insert {
    pub table: TableRef,
    pub columns: Vec<String>,
    /// One value per column, in column order.
    pub values: Vec<Value>,
    pub if_not_exists: bool,
}
