use crate::query::ast::{
    common::TableRef,
    schema::{ColumnDef, CreateIndex, CreateTable, DropTable},
};
use model::core::data_type::CqlType;

#[derive(Debug, Clone)]
pub struct CreateTableBuilder {
    ast: CreateTable,
}

impl CreateTableBuilder {
    pub fn new(table: impl Into<TableRef>) -> Self {
        Self {
            ast: CreateTable {
                table: table.into(),
                ..Default::default()
            },
        }
    }

    pub fn column(mut self, name: &str, data_type: CqlType) -> Self {
        self.ast.columns.push(ColumnDef {
            name: name.to_string(),
            data_type,
        });
        self
    }

    pub fn partition_key(mut self, columns: &[&str]) -> Self {
        self.ast.partition_key = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn clustering_key(mut self, columns: &[&str]) -> Self {
        self.ast.clustering_key = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn if_not_exists(mut self) -> Self {
        self.ast.if_not_exists = true;
        self
    }

    pub fn build(self) -> CreateTable {
        self.ast
    }
}

#[derive(Debug, Clone)]
pub struct DropTableBuilder {
    ast: DropTable,
}

impl DropTableBuilder {
    pub fn new(table: impl Into<TableRef>) -> Self {
        Self {
            ast: DropTable {
                table: table.into(),
                if_exists: false,
            },
        }
    }

    pub fn if_exists(mut self) -> Self {
        self.ast.if_exists = true;
        self
    }

    pub fn build(self) -> DropTable {
        self.ast
    }
}

#[derive(Debug, Clone)]
pub struct CreateIndexBuilder {
    ast: CreateIndex,
}

impl CreateIndexBuilder {
    pub fn new(table: impl Into<TableRef>, column: &str) -> Self {
        Self {
            ast: CreateIndex {
                name: None,
                table: table.into(),
                column: column.to_string(),
                if_not_exists: false,
            },
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.ast.name = Some(name.to_string());
        self
    }

    pub fn if_not_exists(mut self) -> Self {
        self.ast.if_not_exists = true;
        self
    }

    pub fn build(self) -> CreateIndex {
        self.ast
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::renderer::Render;

    #[test]
    fn test_create_table_builder() {
        let ast = CreateTableBuilder::new("test")
            .column("k", CqlType::Int)
            .column("v", CqlType::Double)
            .build();

        assert_eq!(ast.columns.len(), 2);
        assert_eq!(
            ast.to_cql().0,
            "CREATE TABLE test (k int, v double, PRIMARY KEY (k))"
        );
    }

    #[test]
    fn test_drop_table_builder() {
        let ast = DropTableBuilder::new("tester.users").if_exists().build();
        assert!(ast.if_exists);
        assert_eq!(ast.table.keyspace.as_deref(), Some("tester"));
    }

    #[test]
    fn test_create_index_builder() {
        let ast = CreateIndexBuilder::new("users", "name").name("users_name").build();
        assert_eq!(ast.to_cql().0, "CREATE INDEX users_name ON users (name)");
    }
}
