//! In-process cluster that speaks the CQL subset used by the driver tests
//! and the command line tool.

pub mod cql;
pub mod execute;
pub mod literal;
pub mod node;
pub mod paging;
pub mod schema;
pub mod storage;

pub use node::{ClusterOptions, MemoryCluster, MemoryConnection};
