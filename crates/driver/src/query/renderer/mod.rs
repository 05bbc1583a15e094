//! Rendering of statement ASTs into CQL text plus bound values.

use crate::{
    query::ast::common::{Condition, TableRef},
    statement::SimpleStatement,
};
use lazy_static::lazy_static;
use model::core::value::Value;
use std::collections::HashSet;

pub mod batch;
pub mod delete;
pub mod insert;
pub mod schema;
pub mod select;
pub mod update;

lazy_static! {
    static ref RESERVED: HashSet<&'static str> = [
        "add", "allow", "alter", "and", "apply", "asc", "authorize", "batch", "begin", "by",
        "columnfamily", "create", "delete", "desc", "describe", "drop", "entries", "execute",
        "from", "full", "grant", "if", "in", "index", "infinity", "insert", "into", "keyspace",
        "limit", "modify", "nan", "norecursive", "not", "null", "of", "on", "or", "order",
        "primary", "rename", "replace", "revoke", "schema", "select", "set", "table", "to",
        "token", "truncate", "unlogged", "update", "use", "using", "where", "with",
    ]
    .into_iter()
    .collect();
}

/// Quotes `ident` unless it is a plain lowercase identifier that is not a
/// reserved word.
pub fn quote_identifier(ident: &str) -> String {
    let plain = ident
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_lowercase())
        && ident
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        && !RESERVED.contains(ident);

    if plain {
        ident.to_string()
    } else {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }
}

/// Any AST node that can be rendered into CQL.
pub trait Render {
    fn render(&self, renderer: &mut Renderer);

    fn to_cql(&self) -> (String, Vec<Value>) {
        let mut renderer = Renderer::new();
        self.render(&mut renderer);
        renderer.finish()
    }

    fn to_statement(&self) -> SimpleStatement {
        let (cql, params) = self.to_cql();
        SimpleStatement::new(cql).bind(params)
    }
}

/// Accumulates CQL text and the values for its `?` markers.
#[derive(Debug, Default)]
pub struct Renderer {
    pub cql: String,
    pub params: Vec<Value>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(self) -> (String, Vec<Value>) {
        (self.cql, self.params)
    }

    pub fn add_param(&mut self, value: Value) {
        self.params.push(value);
        self.cql.push('?');
    }

    pub fn push_identifier(&mut self, ident: &str) {
        self.cql.push_str(&quote_identifier(ident));
    }

    pub fn push_identifiers(&mut self, idents: &[String]) {
        let quoted: Vec<String> = idents.iter().map(|c| quote_identifier(c)).collect();
        self.cql.push_str(&quoted.join(", "));
    }

    pub fn render_table_ref(&mut self, table: &TableRef) {
        if let Some(keyspace) = &table.keyspace {
            self.push_identifier(keyspace);
            self.cql.push('.');
        }
        self.push_identifier(&table.name);
    }

    pub fn render_where(&mut self, conditions: &[Condition]) {
        for (i, condition) in conditions.iter().enumerate() {
            self.cql.push_str(if i == 0 { " WHERE " } else { " AND " });
            self.push_identifier(&condition.column);
            self.cql.push(' ');
            self.cql.push_str(condition.op.as_str());
            self.cql.push(' ');
            self.add_param(condition.value.clone());
        }
    }
}
