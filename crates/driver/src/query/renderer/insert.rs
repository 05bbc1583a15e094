use crate::query::{
    ast::insert::Insert,
    renderer::{Render, Renderer},
};

impl Render for Insert {
    fn render(&self, r: &mut Renderer) {
        r.cql.push_str("INSERT INTO ");
        r.render_table_ref(&self.table);
        r.cql.push_str(" (");
        r.push_identifiers(&self.columns);
        r.cql.push_str(") VALUES (");
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                r.cql.push_str(", ");
            }
            r.add_param(value.clone());
        }
        r.cql.push(')');
        if self.if_not_exists {
            r.cql.push_str(" IF NOT EXISTS");
        }
    }
}
