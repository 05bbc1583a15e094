use crate::query::{
    ast::schema::{CreateIndex, CreateTable, DropTable},
    renderer::{Render, Renderer},
};

impl Render for CreateTable {
    fn render(&self, r: &mut Renderer) {
        r.cql.push_str("CREATE TABLE ");
        if self.if_not_exists {
            r.cql.push_str("IF NOT EXISTS ");
        }
        r.render_table_ref(&self.table);
        r.cql.push_str(" (");
        for column in &self.columns {
            r.push_identifier(&column.name);
            r.cql.push(' ');
            r.cql.push_str(column.data_type.cql_name());
            r.cql.push_str(", ");
        }

        let partition_key = if self.partition_key.is_empty() {
            self.columns.iter().take(1).map(|c| c.name.clone()).collect()
        } else {
            self.partition_key.clone()
        };

        r.cql.push_str("PRIMARY KEY (");
        if partition_key.len() > 1 {
            r.cql.push('(');
            r.push_identifiers(&partition_key);
            r.cql.push(')');
        } else {
            r.push_identifiers(&partition_key);
        }
        if !self.clustering_key.is_empty() {
            r.cql.push_str(", ");
            r.push_identifiers(&self.clustering_key);
        }
        r.cql.push_str("))");
    }
}

impl Render for DropTable {
    fn render(&self, r: &mut Renderer) {
        r.cql.push_str("DROP TABLE ");
        if self.if_exists {
            r.cql.push_str("IF EXISTS ");
        }
        r.render_table_ref(&self.table);
    }
}

impl Render for CreateIndex {
    fn render(&self, r: &mut Renderer) {
        r.cql.push_str("CREATE INDEX ");
        if self.if_not_exists {
            r.cql.push_str("IF NOT EXISTS ");
        }
        if let Some(name) = &self.name {
            r.push_identifier(name);
            r.cql.push(' ');
        }
        r.cql.push_str("ON ");
        r.render_table_ref(&self.table);
        r.cql.push_str(" (");
        r.push_identifier(&self.column);
        r.cql.push(')');
    }
}

#[cfg(test)]
mod tests {
    use crate::query::{
        ast::{
            common::TableRef,
            schema::{ColumnDef, CreateIndex, CreateTable, DropTable},
        },
        renderer::Render,
    };
    use model::core::data_type::CqlType;

    #[test]
    fn test_render_create_table() {
        let ast = CreateTable {
            table: TableRef::new("tweets"),
            columns: vec![
                ColumnDef {
                    name: "tweet_id".into(),
                    data_type: CqlType::Uuid,
                },
                ColumnDef {
                    name: "author".into(),
                    data_type: CqlType::Text,
                },
            ],
            partition_key: vec![],
            clustering_key: vec![],
            if_not_exists: true,
        };

        let (cql, params) = ast.to_cql();
        assert_eq!(
            cql,
            "CREATE TABLE IF NOT EXISTS tweets (tweet_id uuid, author text, PRIMARY KEY (tweet_id))"
        );
        assert!(params.is_empty());
    }

    #[test]
    fn test_render_composite_key() {
        let ast = CreateTable {
            table: TableRef::new("events"),
            columns: vec![
                ColumnDef {
                    name: "day".into(),
                    data_type: CqlType::Text,
                },
                ColumnDef {
                    name: "bucket".into(),
                    data_type: CqlType::Int,
                },
                ColumnDef {
                    name: "ts".into(),
                    data_type: CqlType::Timestamp,
                },
            ],
            partition_key: vec!["day".into(), "bucket".into()],
            clustering_key: vec!["ts".into()],
            if_not_exists: false,
        };

        assert_eq!(
            ast.to_cql().0,
            "CREATE TABLE events (day text, bucket int, ts timestamp, PRIMARY KEY ((day, bucket), ts))"
        );
    }

    #[test]
    fn test_render_drop_and_index() {
        let drop = DropTable {
            table: TableRef::new("users"),
            if_exists: true,
        };
        assert_eq!(drop.to_cql().0, "DROP TABLE IF EXISTS users");

        let index = CreateIndex {
            name: None,
            table: TableRef::new("users"),
            column: "name".into(),
            if_not_exists: false,
        };
        assert_eq!(index.to_cql().0, "CREATE INDEX ON users (name)");
    }
}
