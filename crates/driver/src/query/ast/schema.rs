//! Schema statements.

use crate::query::ast::common::TableRef;
use model::core::data_type::CqlType;

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: CqlType,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateTable {
    pub table: TableRef,
    pub columns: Vec<ColumnDef>,
    /// Defaults to the first column when empty.
    pub partition_key: Vec<String>,
    pub clustering_key: Vec<String>,
    pub if_not_exists: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DropTable {
    pub table: TableRef,
    pub if_exists: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateIndex {
    pub name: Option<String>,
    pub table: TableRef,
    pub column: String,
    pub if_not_exists: bool,
}
