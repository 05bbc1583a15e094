use crate::{
    cql::{ast::ParsedStatement, parse},
    execute::{ExecutionContext, check_bound_values, execute_read, execute_write, is_read},
    schema::Catalog,
};
use async_trait::async_trait;
use driver::{
    config::DriverConfig,
    connection::{Connection, Prepared, PreparedId, QueryResponse},
    consistency::ConsistencyLevel,
    error::QueryError,
    request::{QueryRequest, QueryTarget},
    session::Session,
};
use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
    },
    time::Duration,
};
use tokio::{sync::RwLock, time::sleep};
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ClusterOptions {
    pub nodes: usize,
    /// How long a schema change takes to reach the nodes other than the
    /// coordinator.
    pub schema_propagation: Duration,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        ClusterOptions {
            nodes: 1,
            schema_propagation: Duration::ZERO,
        }
    }
}

struct Node {
    up: AtomicBool,
    /// Schema version tagged with the epoch of the change that produced it.
    schema_version: RwLock<(u64, Uuid)>,
}

impl Node {
    /// Applies a schema version unless the node already holds a newer one.
    async fn observe_schema(&self, epoch: u64, version: Uuid) {
        let mut current = self.schema_version.write().await;
        if epoch > current.0 {
            *current = (epoch, version);
        }
    }
}

struct ClusterState {
    nodes: Vec<Arc<Node>>,
    catalog: RwLock<Catalog>,
    prepared: RwLock<HashMap<PreparedId, Arc<ParsedStatement>>>,
    schema_propagation: Duration,
    schema_epoch: AtomicU64,
    next_coordinator: AtomicUsize,
}

impl ClusterState {
    /// Picks the next live node, round robin.
    fn coordinator(&self) -> Result<usize, QueryError> {
        let start = self.next_coordinator.fetch_add(1, Ordering::Relaxed);
        (0..self.nodes.len())
            .map(|offset| (start + offset) % self.nodes.len())
            .find(|&i| self.nodes[i].up.load(Ordering::SeqCst))
            .ok_or_else(|| QueryError::Unavailable("No live node to coordinate the request".into()))
    }

    fn live_nodes(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| node.up.load(Ordering::SeqCst))
            .count()
    }

    async fn check_consistency(
        &self,
        consistency: ConsistencyLevel,
        keyspace: Option<&str>,
    ) -> Result<(), QueryError> {
        let replication_factor = match keyspace {
            Some(name) => self
                .catalog
                .read()
                .await
                .keyspace(name)
                .map(|ks| ks.replication_factor)
                .unwrap_or(1),
            None => 1,
        };
        let replicas = replication_factor.min(self.nodes.len());
        let required = consistency.required_replicas(replicas);
        let alive = self.live_nodes().min(replicas);

        if alive < required {
            return Err(QueryError::Unavailable(format!(
                "Cannot achieve consistency level {consistency} (required {required}, alive {alive})"
            )));
        }
        Ok(())
    }

    /// Hands the new version to the coordinator at once and to the other
    /// nodes after `schema_propagation`. Late deliveries of an older change
    /// never replace a newer version.
    async fn propagate_schema(&self, coordinator: usize, version: Uuid) {
        let epoch = self.schema_epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.nodes[coordinator]
            .observe_schema(epoch, version)
            .await;

        for (i, node) in self.nodes.iter().enumerate() {
            if i == coordinator {
                continue;
            }
            if self.schema_propagation.is_zero() {
                node.observe_schema(epoch, version).await;
            } else {
                let node = node.clone();
                let delay = self.schema_propagation;
                tokio::spawn(async move {
                    sleep(delay).await;
                    node.observe_schema(epoch, version).await;
                });
            }
        }
    }
}

/// An in-process cluster: every node shares one catalog, while schema
/// versions and liveness are tracked per node.
#[derive(Clone)]
pub struct MemoryCluster {
    state: Arc<ClusterState>,
}

impl MemoryCluster {
    pub fn new(nodes: usize) -> Self {
        Self::with_options(ClusterOptions {
            nodes,
            ..ClusterOptions::default()
        })
    }

    pub fn with_options(options: ClusterOptions) -> Self {
        let version = Uuid::new_v4();
        let nodes = (0..options.nodes.max(1))
            .map(|_| {
                Arc::new(Node {
                    up: AtomicBool::new(true),
                    schema_version: RwLock::new((0, version)),
                })
            })
            .collect();

        MemoryCluster {
            state: Arc::new(ClusterState {
                nodes,
                catalog: RwLock::new(Catalog::new()),
                prepared: RwLock::new(HashMap::new()),
                schema_propagation: options.schema_propagation,
                schema_epoch: AtomicU64::new(0),
                next_coordinator: AtomicUsize::new(0),
            }),
        }
    }

    pub fn node_count(&self) -> usize {
        self.state.nodes.len()
    }

    pub fn set_node_down(&self, node: usize) {
        if let Some(n) = self.state.nodes.get(node) {
            n.up.store(false, Ordering::SeqCst);
            info!(node, "Node marked down");
        }
    }

    pub fn set_node_up(&self, node: usize) {
        if let Some(n) = self.state.nodes.get(node) {
            n.up.store(true, Ordering::SeqCst);
            info!(node, "Node marked up");
        }
    }

    /// A fresh connection with no keyspace selected.
    pub fn connection(&self) -> MemoryConnection {
        MemoryConnection {
            state: self.state.clone(),
            keyspace: RwLock::new(None),
        }
    }

    pub fn session(&self, config: DriverConfig) -> Session {
        Session::new(Arc::new(self.connection()), config)
    }

    /// Opens a session with `keyspace` already selected.
    pub async fn connect(&self, keyspace: &str) -> Result<Session, QueryError> {
        self.connect_with(keyspace, DriverConfig::default()).await
    }

    pub async fn connect_with(
        &self,
        keyspace: &str,
        config: DriverConfig,
    ) -> Result<Session, QueryError> {
        let session = self.session(config);
        session.use_keyspace(keyspace).await?;
        Ok(session)
    }
}

/// Connection to a [`MemoryCluster`]. Tracks the keyspace chosen by `USE`.
pub struct MemoryConnection {
    state: Arc<ClusterState>,
    keyspace: RwLock<Option<String>>,
}

impl MemoryConnection {
    async fn resolve(&self, target: &QueryTarget) -> Result<Arc<ParsedStatement>, QueryError> {
        match target {
            QueryTarget::Cql(cql) => Ok(Arc::new(parse(cql)?)),
            QueryTarget::Prepared(id) => {
                self.state.prepared.read().await.get(id).cloned().ok_or_else(|| {
                    QueryError::InvalidQuery(format!("Prepared query with ID {id} not found"))
                })
            }
        }
    }
}

#[async_trait]
impl Connection for MemoryConnection {
    async fn query(&self, request: QueryRequest) -> Result<QueryResponse, QueryError> {
        let parsed = self.resolve(&request.target).await?;
        check_bound_values(&parsed, &request.values)?;

        let coordinator = self.state.coordinator()?;
        let session_keyspace = self.keyspace.read().await.clone();
        let target_keyspace = parsed
            .statement
            .table()
            .and_then(|t| t.keyspace.clone())
            .or_else(|| session_keyspace.clone());
        self.state
            .check_consistency(request.consistency, target_keyspace.as_deref())
            .await?;

        debug!(
            node = coordinator,
            query = %request.describe(),
            page_size = %request.page_size,
            resumed = request.paging_state.is_some(),
            "Coordinating request"
        );

        let ctx = ExecutionContext {
            keyspace: session_keyspace.as_deref(),
            values: &request.values,
            page_size: request.page_size,
            paging_state: request.paging_state.as_ref(),
        };
        let response = if is_read(&parsed.statement) {
            let catalog = self.state.catalog.read().await;
            execute_read(&catalog, &parsed.statement, &ctx)?
        } else {
            let mut catalog = self.state.catalog.write().await;
            execute_write(&mut catalog, &parsed.statement, &ctx)?
        };

        match &response {
            QueryResponse::SetKeyspace(keyspace) => {
                *self.keyspace.write().await = Some(keyspace.clone());
            }
            QueryResponse::SchemaChange(change) => {
                debug!(node = coordinator, version = %change.schema_version, "Schema version changed");
                self.state
                    .propagate_schema(coordinator, change.schema_version)
                    .await;
            }
            _ => {}
        }

        Ok(response)
    }

    async fn prepare(&self, cql: &str) -> Result<Prepared, QueryError> {
        let parsed = parse(cql)?;
        let id = PreparedId(Uuid::new_v4());
        let bind_markers = parsed.markers;
        self.state
            .prepared
            .write()
            .await
            .insert(id, Arc::new(parsed));

        Ok(Prepared {
            id,
            cql: cql.to_string(),
            bind_markers,
        })
    }

    async fn schema_versions(&self) -> Result<Vec<Uuid>, QueryError> {
        let mut versions = Vec::with_capacity(self.state.nodes.len());
        for node in &self.state.nodes {
            if node.up.load(Ordering::SeqCst) {
                versions.push(node.schema_version.read().await.1);
            }
        }
        Ok(versions)
    }
}
