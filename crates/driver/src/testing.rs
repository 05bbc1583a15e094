//! Scripted connection for the unit tests of this crate.

use crate::{
    connection::{ChangeKind, Connection, Prepared, PreparedId, QueryResponse, SchemaChange},
    error::QueryError,
    request::{QueryRequest, QueryTarget},
};
use async_trait::async_trait;
use model::{
    core::{data_type::CqlType, value::Value},
    pagination::{page::ResultPage, paging_state::PagingState},
    records::row::ColumnSpec,
};
use std::{
    collections::HashSet,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tokio::time::sleep;
use uuid::Uuid;

pub fn numbered_rows(count: i32) -> Vec<Vec<Value>> {
    (0..count).map(|i| vec![Value::Int(i)]).collect()
}

/// Serves a fixed table for any `SELECT`, acknowledges `USE` and `CREATE`.
/// Paging state is the offset of the next row.
pub struct MockConnection {
    columns: Arc<[ColumnSpec]>,
    rows: Vec<Vec<Value>>,
    failing_pages: Mutex<HashSet<usize>>,
    disagreeing: AtomicBool,
    latency: Duration,
}

impl MockConnection {
    pub fn new(rows: Vec<Vec<Value>>) -> Self {
        MockConnection {
            columns: Arc::from(vec![ColumnSpec::new("id", CqlType::Int)]),
            rows,
            failing_pages: Mutex::new(HashSet::new()),
            disagreeing: AtomicBool::new(false),
            latency: Duration::ZERO,
        }
    }

    /// Every `SELECT` waits this long before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// The first request for the 1-based page `page` fails with a timeout.
    pub fn fail_page(self, page: usize) -> Self {
        self.failing_pages.lock().unwrap().insert(page);
        self
    }

    pub fn set_disagreeing(&self, value: bool) {
        self.disagreeing.store(value, Ordering::SeqCst);
    }

    fn select(&self, request: &QueryRequest) -> Result<QueryResponse, QueryError> {
        let offset = match &request.paging_state {
            Some(state) => {
                let raw: [u8; 8] = state.as_bytes().try_into().unwrap();
                u64::from_be_bytes(raw) as usize
            }
            None => 0,
        };

        let take = request.page_size.take(self.rows.len() - offset);
        let page_no = match request.page_size.limit() {
            Some(limit) => offset / limit + 1,
            None => 1,
        };
        if self.failing_pages.lock().unwrap().remove(&page_no) {
            return Err(QueryError::Timeout(format!("page {page_no}")));
        }

        let end = offset + take;
        let paging_state = (end < self.rows.len())
            .then(|| PagingState::new((end as u64).to_be_bytes().to_vec()));
        Ok(QueryResponse::Rows(ResultPage::new(
            self.columns.clone(),
            self.rows[offset..end].to_vec(),
            paging_state,
        )))
    }
}

#[async_trait]
impl Connection for MockConnection {
    async fn query(&self, request: QueryRequest) -> Result<QueryResponse, QueryError> {
        let cql = match &request.target {
            QueryTarget::Cql(cql) => cql.to_ascii_uppercase(),
            QueryTarget::Prepared(_) => "SELECT".to_string(),
        };

        if cql.starts_with("SELECT") {
            sleep(self.latency).await;
            self.select(&request)
        } else if let Some(keyspace) = cql.strip_prefix("USE ") {
            Ok(QueryResponse::SetKeyspace(keyspace.trim().to_ascii_lowercase()))
        } else if cql.starts_with("CREATE") {
            Ok(QueryResponse::SchemaChange(SchemaChange {
                change: ChangeKind::Created,
                keyspace: "tester".into(),
                table: Some("t".into()),
                schema_version: Uuid::new_v4(),
            }))
        } else {
            Ok(QueryResponse::Void)
        }
    }

    async fn prepare(&self, cql: &str) -> Result<Prepared, QueryError> {
        Ok(Prepared {
            id: PreparedId(Uuid::new_v4()),
            cql: cql.to_string(),
            bind_markers: cql.matches('?').count(),
        })
    }

    async fn schema_versions(&self) -> Result<Vec<Uuid>, QueryError> {
        let version = Uuid::new_v4();
        if self.disagreeing.load(Ordering::SeqCst) {
            Ok(vec![version, Uuid::new_v4()])
        } else {
            Ok(vec![version; 3])
        }
    }
}
