use model::core::value::Value;

/// A table, optionally qualified by its keyspace.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableRef {
    pub keyspace: Option<String>,
    pub name: String,
}

impl TableRef {
    pub fn new(name: &str) -> Self {
        TableRef {
            keyspace: None,
            name: name.to_string(),
        }
    }

    pub fn qualified(keyspace: &str, name: &str) -> Self {
        TableRef {
            keyspace: Some(keyspace.to_string()),
            name: name.to_string(),
        }
    }
}

impl From<&str> for TableRef {
    fn from(value: &str) -> Self {
        match value.split_once('.') {
            Some((keyspace, name)) => TableRef::qualified(keyspace, name),
            None => TableRef::new(value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
        }
    }
}

/// `column <op> ?` in a WHERE clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub op: Operator,
    pub value: Value,
}
