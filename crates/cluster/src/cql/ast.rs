//! Parsed form of the CQL subset the node understands.

use model::core::data_type::CqlType;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    CreateKeyspace {
        name: String,
        if_not_exists: bool,
        replication_factor: usize,
    },
    DropKeyspace {
        name: String,
        if_exists: bool,
    },
    Use(String),
    CreateTable(CreateTable),
    DropTable {
        table: TableName,
        if_exists: bool,
    },
    Truncate(TableName),
    CreateIndex {
        name: Option<String>,
        table: TableName,
        column: String,
        if_not_exists: bool,
    },
    Insert(Insert),
    Update(Update),
    Delete(Delete),
    Select(Select),
    Batch(Batch),
}

impl Statement {
    pub fn is_schema_change(&self) -> bool {
        matches!(
            self,
            Statement::CreateKeyspace { .. }
                | Statement::DropKeyspace { .. }
                | Statement::CreateTable(_)
                | Statement::DropTable { .. }
                | Statement::CreateIndex { .. }
        )
    }

    /// Table the statement reads or writes, the first one for batches.
    pub fn table(&self) -> Option<&TableName> {
        match self {
            Statement::CreateTable(def) => Some(&def.table),
            Statement::DropTable { table, .. }
            | Statement::Truncate(table)
            | Statement::CreateIndex { table, .. } => Some(table),
            Statement::Insert(insert) => Some(&insert.table),
            Statement::Update(update) => Some(&update.table),
            Statement::Delete(delete) => Some(&delete.table),
            Statement::Select(select) => Some(&select.table),
            Statement::Batch(batch) => batch.statements.first().and_then(Statement::table),
            Statement::CreateKeyspace { .. } | Statement::DropKeyspace { .. } | Statement::Use(_) => {
                None
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableName {
    pub keyspace: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: CqlType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTable {
    pub table: TableName,
    pub if_not_exists: bool,
    pub columns: Vec<ColumnDef>,
    pub partition_key: Vec<String>,
    pub clustering_key: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    /// Numeric text including its sign, `NaN` and `Infinity` included.
    Number(String),
    Str(String),
    Blob(Vec<u8>),
    Uuid(Uuid),
    /// Position of a `?` marker among all markers of the statement.
    Marker(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    pub table: TableName,
    pub columns: Vec<String>,
    pub values: Vec<Literal>,
    pub if_not_exists: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Set(Literal),
    /// `c = c + n`
    Add(Literal),
    /// `c = c - n`
    Subtract(Literal),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: String,
    pub operation: Operation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelOp {
    Eq,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl RelOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelOp::Eq => "=",
            RelOp::Lt => "<",
            RelOp::Lte => "<=",
            RelOp::Gt => ">",
            RelOp::Gte => ">=",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    pub column: String,
    pub op: RelOp,
    pub value: Literal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub table: TableName,
    pub assignments: Vec<Assignment>,
    pub relations: Vec<Relation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    pub table: TableName,
    pub relations: Vec<Relation>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    All,
    Columns(Vec<String>),
    Count,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub table: TableName,
    pub selection: Selection,
    pub relations: Vec<Relation>,
    pub limit: Option<usize>,
    pub allow_filtering: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchKind {
    Logged,
    Unlogged,
    Counter,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub kind: BatchKind,
    /// Only inserts, updates and deletes.
    pub statements: Vec<Statement>,
}

/// A parsed statement with the number of `?` markers it contains.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedStatement {
    pub statement: Statement,
    pub markers: usize,
}
