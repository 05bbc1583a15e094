use crate::query::ast::common::{Condition, TableRef};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Projection {
    #[default]
    All,
    Columns(Vec<String>),
    Count,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Select {
    pub table: TableRef,
    pub projection: Projection,
    pub conditions: Vec<Condition>,
    pub limit: Option<usize>,
    pub allow_filtering: bool,
}
