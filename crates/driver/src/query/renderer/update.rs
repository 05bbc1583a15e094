use crate::query::{
    ast::update::{Assignment, CounterOp, Update},
    renderer::{Render, Renderer},
};

impl Render for Update {
    fn render(&self, r: &mut Renderer) {
        r.cql.push_str("UPDATE ");
        r.render_table_ref(&self.table);
        r.cql.push_str(" SET ");
        for (i, assignment) in self.assignments.iter().enumerate() {
            if i > 0 {
                r.cql.push_str(", ");
            }
            match assignment {
                Assignment::Set { column, value } => {
                    r.push_identifier(column);
                    r.cql.push_str(" = ");
                    r.add_param(value.clone());
                }
                Assignment::Counter { column, op, amount } => {
                    r.push_identifier(column);
                    r.cql.push_str(" = ");
                    r.push_identifier(column);
                    r.cql.push_str(match op {
                        CounterOp::Add => " + ",
                        CounterOp::Subtract => " - ",
                    });
                    r.add_param(amount.clone());
                }
            }
        }
        r.render_where(&self.conditions);
    }
}
