pub mod config;
pub mod connection;
pub mod consistency;
pub mod error;
mod executor;
pub mod metrics;
pub mod query;
pub mod request;
pub mod retry;
pub mod row_set;
pub mod session;
pub mod statement;

#[cfg(test)]
mod testing;

pub use config::DriverConfig;
pub use connection::{Connection, QueryResponse};
pub use consistency::ConsistencyLevel;
pub use error::{QueryError, RetrievalError};
pub use row_set::RowSet;
pub use session::Session;
pub use statement::{BoundStatement, PreparedStatement, SimpleStatement, Statement};
