use crate::{
    connection::{Connection, Prepared, QueryResponse},
    error::QueryError,
    metrics::Metrics,
    request::QueryRequest,
    retry::RetryPolicy,
};
use std::{sync::Arc, time::Duration};
use tokio::time::timeout;
use tracing::warn;

/// Sends requests over a connection with the session's timeout and retry
/// policy applied. Shared by the session and the cursors it creates.
#[derive(Clone)]
pub(crate) struct RequestExecutor {
    connection: Arc<dyn Connection>,
    retry: RetryPolicy,
    request_timeout: Duration,
    metrics: Metrics,
}

impl RequestExecutor {
    pub fn new(
        connection: Arc<dyn Connection>,
        retry: RetryPolicy,
        request_timeout: Duration,
        metrics: Metrics,
    ) -> Self {
        RequestExecutor {
            connection,
            retry,
            request_timeout,
            metrics,
        }
    }

    pub fn connection(&self) -> &Arc<dyn Connection> {
        &self.connection
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub async fn send(&self, request: &QueryRequest) -> Result<QueryResponse, QueryError> {
        let executor = self;
        self.retry
            .run(move |attempt| {
                if attempt > 0 {
                    executor.metrics.increment_retries(1);
                    warn!(attempt, query = %request.describe(), "Retrying request");
                }
                let request = request.clone();
                async move { executor.attempt(request).await }
            })
            .await
            .inspect_err(|_| self.metrics.increment_failures(1))
    }

    pub async fn prepare(&self, cql: &str) -> Result<Prepared, QueryError> {
        let executor = self;
        self.retry
            .run(move |attempt| {
                if attempt > 0 {
                    executor.metrics.increment_retries(1);
                    warn!(attempt, query = %cql, "Retrying prepare");
                }
                async move {
                    timeout(executor.request_timeout, executor.connection.prepare(cql))
                        .await
                        .unwrap_or_else(|_| Err(executor.timed_out()))
                }
            })
            .await
            .inspect_err(|_| self.metrics.increment_failures(1))
    }

    async fn attempt(&self, request: QueryRequest) -> Result<QueryResponse, QueryError> {
        timeout(self.request_timeout, self.connection.query(request))
            .await
            .unwrap_or_else(|_| Err(self.timed_out()))
    }

    fn timed_out(&self) -> QueryError {
        QueryError::Timeout(format!(
            "no response within {} ms",
            self.request_timeout.as_millis()
        ))
    }
}
