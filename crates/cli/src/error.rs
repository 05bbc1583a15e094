use driver::error::{ConfigError, QueryError, RetrievalError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to load the driver configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid environment file: {0}")]
    EnvFile(String),

    #[error("Statement {index} failed: {source}")]
    Statement {
        index: usize,
        #[source]
        source: QueryError,
    },

    #[error("Failed while reading rows: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),
}
