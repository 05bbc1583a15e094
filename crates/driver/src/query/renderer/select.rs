use crate::query::{
    ast::select::{Projection, Select},
    renderer::{Render, Renderer},
};

impl Render for Select {
    fn render(&self, r: &mut Renderer) {
        r.cql.push_str("SELECT ");
        match &self.projection {
            Projection::All => r.cql.push('*'),
            Projection::Columns(columns) => r.push_identifiers(columns),
            Projection::Count => r.cql.push_str("COUNT(*)"),
        }
        r.cql.push_str(" FROM ");
        r.render_table_ref(&self.table);
        r.render_where(&self.conditions);

        if let Some(limit) = self.limit {
            r.cql.push_str(&format!(" LIMIT {limit}"));
        }
        if self.allow_filtering {
            r.cql.push_str(" ALLOW FILTERING");
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::query::{
        ast::{
            common::{Condition, Operator, TableRef},
            select::{Projection, Select},
        },
        renderer::Render,
    };
    use model::core::value::Value;

    #[test]
    fn test_render_select_all() {
        let ast = Select {
            table: TableRef::new("tweets"),
            ..Default::default()
        };
        let (cql, params) = ast.to_cql();
        assert_eq!(cql, "SELECT * FROM tweets");
        assert!(params.is_empty());
    }

    #[test]
    fn test_render_select_filtered() {
        let ast = Select {
            table: TableRef::new("users"),
            projection: Projection::Columns(vec!["name".into(), "surname".into()]),
            conditions: vec![
                Condition {
                    column: "name".into(),
                    op: Operator::Eq,
                    value: Value::Text("Adam".into()),
                },
                Condition {
                    column: "age".into(),
                    op: Operator::Gte,
                    value: Value::Int(18),
                },
            ],
            limit: Some(10),
            allow_filtering: true,
        };

        let (cql, params) = ast.to_cql();
        assert_eq!(
            cql,
            "SELECT name, surname FROM users WHERE name = ? AND age >= ? LIMIT 10 ALLOW FILTERING"
        );
        assert_eq!(params, vec![Value::Text("Adam".into()), Value::Int(18)]);
    }

    #[test]
    fn test_render_count() {
        let ast = Select {
            table: TableRef::new("t"),
            projection: Projection::Count,
            ..Default::default()
        };
        assert_eq!(ast.to_cql().0, "SELECT COUNT(*) FROM t");
    }
}
