use crate::query::{
    ast::delete::Delete,
    renderer::{Render, Renderer},
};

impl Render for Delete {
    fn render(&self, r: &mut Renderer) {
        r.cql.push_str("DELETE FROM ");
        r.render_table_ref(&self.table);
        r.render_where(&self.conditions);
    }
}
