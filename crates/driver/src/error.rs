use model::core::error::ValueError;
use thiserror::Error;

/// All errors reported by the server or the request layer.
#[derive(Debug, Clone, Error)]
pub enum QueryError {
    /// The statement is well formed but cannot be executed.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// A keyspace or table with this name already exists.
    #[error("{}", already_exists_message(.keyspace, .table))]
    AlreadyExists { keyspace: String, table: String },

    /// The statement could not be parsed.
    #[error("Syntax error: {0}")]
    Syntax(String),

    /// Not enough replicas are alive to satisfy the consistency level.
    #[error("Unavailable: {0}")]
    Unavailable(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Coordinator overloaded: {0}")]
    Overloaded(String),

    /// The server answered with something the request did not expect.
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Value error: {0}")]
    Value(#[from] ValueError),
}

fn already_exists_message(keyspace: &str, table: &str) -> String {
    if table.is_empty() {
        format!("Keyspace {keyspace} already exists")
    } else {
        format!("Table {keyspace}.{table} already exists")
    }
}

impl QueryError {
    /// Transient failures may succeed when the same request is sent again.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            QueryError::Unavailable(_) | QueryError::Timeout(_) | QueryError::Overloaded(_)
        )
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, QueryError::AlreadyExists { .. })
    }
}

/// A page fetch triggered by iteration failed. Rows buffered before the
/// failure are kept, so iteration can resume from the same position.
#[derive(Debug, Clone, Error)]
#[error("Failed to retrieve page {page}: {source}")]
pub struct RetrievalError {
    /// 1-based number of the page that could not be fetched.
    pub page: usize,
    #[source]
    pub source: QueryError,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidVar { key: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(QueryError::Timeout("t".into()).is_transient());
        assert!(QueryError::Unavailable("u".into()).is_transient());
        assert!(!QueryError::InvalidQuery("bad".into()).is_transient());
        assert!(!QueryError::Syntax("bad".into()).is_transient());
    }

    #[test]
    fn test_already_exists_message() {
        let err = QueryError::AlreadyExists {
            keyspace: "ks".into(),
            table: "t".into(),
        };
        assert_eq!(err.to_string(), "Table ks.t already exists");
        assert!(err.is_already_exists());

        let err = QueryError::AlreadyExists {
            keyspace: "ks".into(),
            table: String::new(),
        };
        assert_eq!(err.to_string(), "Keyspace ks already exists");
    }
}
