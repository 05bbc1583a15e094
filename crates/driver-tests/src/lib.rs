#![allow(dead_code)]

use cluster::MemoryCluster;
use driver::{Connection, DriverConfig, Session};
use std::sync::Arc;

pub mod paging;
pub mod utils;

/// Keyspace every fixture creates and selects.
pub const KEYSPACE: &str = "tester";

/// Nodes in the simulated cluster.
const NODES: usize = 3;

/// A cluster with the test keyspace created and a session bound to it.
pub struct TestCluster {
    pub cluster: MemoryCluster,
    pub session: Session,
}

impl TestCluster {
    pub async fn setup() -> Self {
        Self::setup_with(DriverConfig::default()).await
    }

    pub async fn setup_with(config: DriverConfig) -> Self {
        let cluster = MemoryCluster::new(NODES);
        let admin = cluster.session(config.clone());
        admin
            .execute(format!(
                "CREATE KEYSPACE IF NOT EXISTS {KEYSPACE} WITH replication = \
                 {{'class': 'SimpleStrategy', 'replication_factor': {NODES}}}"
            ))
            .await
            .expect("create keyspace");

        let session = cluster
            .connect_with(KEYSPACE, config)
            .await
            .expect("use keyspace");
        TestCluster { cluster, session }
    }

    /// A second session on the same cluster that talks through `wrap`
    /// applied to a fresh connection.
    pub async fn session_through<F>(&self, config: DriverConfig, wrap: F) -> Session
    where
        F: FnOnce(Arc<dyn Connection>) -> Arc<dyn Connection>,
    {
        let session = Session::new(wrap(Arc::new(self.cluster.connection())), config);
        session.use_keyspace(KEYSPACE).await.expect("use keyspace");
        session
    }

    pub async fn teardown(self) {
        self.session
            .execute(format!("DROP KEYSPACE {KEYSPACE}"))
            .await
            .expect("drop keyspace");
    }
}
