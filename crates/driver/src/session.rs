use crate::{
    config::DriverConfig,
    connection::{Connection, QueryResponse},
    error::QueryError,
    executor::RequestExecutor,
    metrics::{Metrics, MetricsSnapshot},
    query::renderer::quote_identifier,
    row_set::{PageSource, ResultKind, RowSet},
    statement::{PreparedStatement, SimpleStatement, Statement},
};
use model::core::value::Value;
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::RwLock,
    time::{Instant, sleep},
};
use tracing::{debug, info, warn};

const SCHEMA_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Entry point for running statements against a cluster.
pub struct Session {
    executor: RequestExecutor,
    config: DriverConfig,
    metrics: Metrics,
    keyspace: RwLock<Option<String>>,
}

impl Session {
    pub fn new(connection: Arc<dyn Connection>, config: DriverConfig) -> Self {
        let metrics = Metrics::new();
        let executor = RequestExecutor::new(
            connection,
            config.retry.policy(),
            config.request_timeout(),
            metrics.clone(),
        );

        Session {
            executor,
            config,
            metrics,
            keyspace: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Keyspace selected by the last successful `USE`.
    pub async fn keyspace(&self) -> Option<String> {
        self.keyspace.read().await.clone()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Runs a statement and returns a cursor positioned before the first row.
    /// The first page has already been fetched when this returns.
    pub async fn execute(&self, statement: impl Into<Statement>) -> Result<RowSet, QueryError> {
        let request = statement.into().into_request(&self.config.query);
        self.metrics.increment_queries(1);
        debug!(query = %request.describe(), page_size = %request.page_size, "Executing");

        match self.executor.send(&request).await? {
            QueryResponse::Rows(page) => Ok(RowSet::from_first_page(
                page,
                PageSource::new(self.executor.clone(), request),
            )),
            QueryResponse::Void => Ok(RowSet::from_kind(ResultKind::Void)),
            QueryResponse::SetKeyspace(keyspace) => {
                *self.keyspace.write().await = Some(keyspace.clone());
                Ok(RowSet::from_kind(ResultKind::SetKeyspace(keyspace)))
            }
            QueryResponse::SchemaChange(change) => {
                info!(
                    change = %change.change,
                    keyspace = %change.keyspace,
                    table = change.table.as_deref().unwrap_or(""),
                    "Schema changed"
                );
                Ok(RowSet::from_kind(ResultKind::SchemaChange(change)))
            }
        }
    }

    pub async fn execute_paged(&self, cql: &str, page_size: i32) -> Result<RowSet, QueryError> {
        let mut statement = SimpleStatement::new(cql);
        statement.set_page_size(page_size);
        self.execute(statement).await
    }

    /// Runs `cql` with positional values for its `?` markers.
    pub async fn execute_with(&self, cql: &str, values: Vec<Value>) -> Result<RowSet, QueryError> {
        self.execute(SimpleStatement::new(cql).bind(values)).await
    }

    pub async fn prepare(&self, cql: &str) -> Result<PreparedStatement, QueryError> {
        let prepared = self.executor.prepare(cql).await?;
        debug!(id = %prepared.id, markers = prepared.bind_markers, "Prepared statement");
        Ok(PreparedStatement::new(prepared))
    }

    pub async fn use_keyspace(&self, keyspace: &str) -> Result<(), QueryError> {
        self.execute(format!("USE {}", quote_identifier(keyspace)))
            .await
            .map(|_| ())
    }

    /// True when every node reports the same schema version.
    pub async fn check_schema_agreement(&self) -> Result<bool, QueryError> {
        let versions = self.executor.connection().schema_versions().await?;
        Ok(versions
            .first()
            .is_some_and(|first| versions.iter().all(|v| v == first)))
    }

    /// Waits until the nodes agree on the schema after `result`, a schema
    /// change. Returns `false` if they still disagree when the configured
    /// timeout elapses. Results that did not change the schema return
    /// `true` right away.
    pub async fn wait_for_schema_agreement(&self, result: &RowSet) -> Result<bool, QueryError> {
        let Some(change) = result.schema_change() else {
            return Ok(true);
        };

        let timeout = self.config.schema_agreement_timeout();
        let deadline = Instant::now() + timeout;
        loop {
            if self.check_schema_agreement().await? {
                debug!(version = %change.schema_version, "Schema agreement reached");
                return Ok(true);
            }
            if Instant::now() >= deadline {
                warn!(
                    timeout_ms = timeout.as_millis() as u64,
                    "Nodes did not agree on the schema in time"
                );
                return Ok(false);
            }
            sleep(SCHEMA_POLL_INTERVAL).await;
        }
    }
}
