use crate::{error::QueryError, request::QueryRequest};
use async_trait::async_trait;
use model::pagination::page::ResultPage;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Transport to a cluster. Everything the session does goes through this
/// seam, so any node implementation (network or in-process) can back it.
#[async_trait]
pub trait Connection: Send + Sync {
    async fn query(&self, request: QueryRequest) -> Result<QueryResponse, QueryError>;

    async fn prepare(&self, cql: &str) -> Result<Prepared, QueryError>;

    /// Schema version reported by every reachable node.
    async fn schema_versions(&self) -> Result<Vec<Uuid>, QueryError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PreparedId(pub Uuid);

impl fmt::Display for PreparedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Server-side handle of a prepared statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Prepared {
    pub id: PreparedId,
    pub cql: String,
    pub bind_markers: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    Created,
    Updated,
    Dropped,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Created => write!(f, "CREATED"),
            ChangeKind::Updated => write!(f, "UPDATED"),
            ChangeKind::Dropped => write!(f, "DROPPED"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaChange {
    pub change: ChangeKind,
    pub keyspace: String,
    /// `None` for keyspace-level changes.
    pub table: Option<String>,
    /// Version the coordinator moved to after applying the change.
    pub schema_version: Uuid,
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryResponse {
    Void,
    Rows(ResultPage),
    SetKeyspace(String),
    SchemaChange(SchemaChange),
}
