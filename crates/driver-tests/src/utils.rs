#![allow(dead_code)]

use async_trait::async_trait;
use driver::{
    Connection, DriverConfig, QueryError, QueryResponse, RowSet, Session, config::RetryConfig,
    connection::Prepared, request::QueryRequest,
};
use futures::future::join_all;
use model::core::value::Value;
use std::{
    collections::HashSet,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};
use uuid::Uuid;

/// DDL of the single-column table most paging tests read from.
pub const NUMBERS_TABLE_DDL: &str = "CREATE TABLE numbers (id int PRIMARY KEY)";

/// Config whose requests fail on the first error instead of retrying.
pub fn no_retry_config() -> DriverConfig {
    DriverConfig::default().with_retry(RetryConfig {
        max_attempts: 1,
        ..RetryConfig::default()
    })
}

/// Creates `numbers` and fills it with `0..count`, batched like a bulk load.
pub async fn seed_numbers(session: &Session, count: i32) {
    session.execute(NUMBERS_TABLE_DDL).await.expect("create numbers");

    let ids: Vec<i32> = (0..count).collect();
    for chunk in ids.chunks(100) {
        let inserts: Vec<String> = chunk
            .iter()
            .map(|id| format!("INSERT INTO numbers (id) VALUES ({id});"))
            .collect();
        session
            .execute(format!(
                "BEGIN UNLOGGED BATCH {} APPLY BATCH",
                inserts.join(" ")
            ))
            .await
            .expect("insert numbers");
    }
}

/// Drains `rows` with `consumers` concurrent tasks and returns every id
/// handed out, in no particular order.
pub async fn drain_concurrently(rows: &RowSet, consumers: usize) -> Vec<i64> {
    let tasks = (0..consumers).map(|_| {
        let rows = rows.clone();
        tokio::spawn(async move {
            let mut seen = Vec::new();
            while let Some(row) = rows.next_row().await.expect("next row") {
                seen.push(row[0].as_i64().expect("integer id"));
            }
            seen
        })
    });

    join_all(tasks)
        .await
        .into_iter()
        .flat_map(|task| task.expect("consumer task"))
        .collect()
}

/// Ids of every remaining row of `rows`, drained sequentially.
pub async fn collect_ids(rows: &RowSet) -> Vec<i64> {
    rows.collect_rows()
        .await
        .expect("collect rows")
        .iter()
        .map(|row| row[0].as_i64().expect("integer id"))
        .collect()
}

pub fn assert_unique_and_complete(mut ids: Vec<i64>, total: i64) {
    ids.sort_unstable();
    assert_eq!(ids.len() as i64, total, "row count");
    assert_eq!(ids, (0..total).collect::<Vec<_>>(), "every row exactly once");
}

/// Writes `value` into a fresh single-value table of `cql_type` and reads it back.
pub async fn round_trip(session: &Session, cql_type: &str, value: Value) -> Value {
    let table = format!("value_{}", Uuid::new_v4().simple());
    session
        .execute(format!(
            "CREATE TABLE {table} (id int PRIMARY KEY, value {cql_type})"
        ))
        .await
        .expect("create value table");
    session
        .execute_with(
            &format!("INSERT INTO {table} (id, value) VALUES (1, ?)"),
            vec![value],
        )
        .await
        .expect("insert value");

    let rows = session
        .execute(format!("SELECT value FROM {table} WHERE id = 1"))
        .await
        .expect("select value")
        .collect_rows()
        .await
        .expect("collect value");
    rows[0].get_value("value")
}

/// Passes requests through to `inner`, except that chosen page fetches
/// fail once with a timeout.
///
/// Page numbers are 1-based: the request without paging state is page 1,
/// each request that carries one counts as the next page.
pub struct FlakyConnection {
    inner: Arc<dyn Connection>,
    page_requests: AtomicUsize,
    failing_pages: Mutex<HashSet<usize>>,
}

impl FlakyConnection {
    pub fn new(inner: Arc<dyn Connection>) -> Self {
        FlakyConnection {
            inner,
            page_requests: AtomicUsize::new(0),
            failing_pages: Mutex::new(HashSet::new()),
        }
    }

    pub fn fail_page(self, page: usize) -> Self {
        self.failing_pages.lock().unwrap().insert(page);
        self
    }
}

#[async_trait]
impl Connection for FlakyConnection {
    async fn query(&self, request: QueryRequest) -> Result<QueryResponse, QueryError> {
        if request.paging_state.is_some() {
            let page = self.page_requests.fetch_add(1, Ordering::SeqCst) + 2;
            if self.failing_pages.lock().unwrap().remove(&page) {
                return Err(QueryError::Timeout(format!("injected failure on page {page}")));
            }
        }
        self.inner.query(request).await
    }

    async fn prepare(&self, cql: &str) -> Result<Prepared, QueryError> {
        self.inner.prepare(cql).await
    }

    async fn schema_versions(&self) -> Result<Vec<Uuid>, QueryError> {
        self.inner.schema_versions().await
    }
}
