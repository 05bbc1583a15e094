use crate::query::{
    ast::batch::{Batch, BatchEntry, BatchKind},
    renderer::{Render, Renderer},
};

impl Render for Batch {
    fn render(&self, r: &mut Renderer) {
        r.cql.push_str(match self.kind {
            BatchKind::Logged => "BEGIN BATCH",
            BatchKind::Unlogged => "BEGIN UNLOGGED BATCH",
            BatchKind::Counter => "BEGIN COUNTER BATCH",
        });
        for entry in &self.entries {
            r.cql.push(' ');
            match entry {
                BatchEntry::Insert(insert) => insert.render(r),
                BatchEntry::Update(update) => update.render(r),
                BatchEntry::Delete(delete) => delete.render(r),
            }
            r.cql.push(';');
        }
        r.cql.push_str(" APPLY BATCH");
    }
}

#[cfg(test)]
mod tests {
    use crate::query::{
        ast::{
            batch::{Batch, BatchKind},
            common::TableRef,
            insert::Insert,
        },
        renderer::Render,
    };
    use model::core::value::Value;

    #[test]
    fn test_render_batch_keeps_param_order() {
        let entries = (0..2)
            .map(|i| {
                Insert {
                    table: TableRef::new("t"),
                    columns: vec!["k".into(), "v".into()],
                    values: vec![Value::Int(i), Value::Text(format!("v{i}"))],
                    if_not_exists: false,
                }
                .into()
            })
            .collect();
        let ast = Batch {
            kind: BatchKind::Unlogged,
            entries,
        };

        let (cql, params) = ast.to_cql();
        assert_eq!(
            cql,
            "BEGIN UNLOGGED BATCH INSERT INTO t (k, v) VALUES (?, ?); INSERT INTO t (k, v) VALUES (?, ?); APPLY BATCH"
        );
        assert_eq!(
            params,
            vec![
                Value::Int(0),
                Value::Text("v0".into()),
                Value::Int(1),
                Value::Text("v1".into())
            ]
        );
    }
}
