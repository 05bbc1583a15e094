use crate::query::ast::common::{Condition, TableRef};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Delete {
    pub table: TableRef,
    pub conditions: Vec<Condition>,
}
