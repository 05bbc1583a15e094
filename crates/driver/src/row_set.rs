use crate::{
    connection::{QueryResponse, SchemaChange},
    error::{QueryError, RetrievalError},
    executor::RequestExecutor,
    request::QueryRequest,
};
use futures::{Stream, TryStreamExt, stream};
use model::{
    pagination::{page::ResultPage, paging_state::PagingState},
    records::row::{ColumnSpec, Row},
};
use std::{collections::VecDeque, fmt, sync::Arc};
use tokio::sync::Mutex;
use tracing::debug;

/// What kind of result a statement produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultKind {
    Rows,
    Void,
    SetKeyspace(String),
    SchemaChange(SchemaChange),
}

/// Paged cursor over the result of one statement.
///
/// Only the current page is held in memory. When the buffer runs dry the
/// consumer that asked for the next row fetches the following page. Clones
/// share the same cursor, so several tasks can drain one result together:
/// every row is handed to exactly one of them.
#[derive(Clone)]
pub struct RowSet {
    shared: Arc<Shared>,
}

struct Shared {
    kind: ResultKind,
    columns: Arc<[ColumnSpec]>,
    source: Option<PageSource>,
    state: Mutex<CursorState>,
}

/// The request that produced the first page, replayed with each new
/// paging state.
pub(crate) struct PageSource {
    executor: RequestExecutor,
    request: QueryRequest,
}

impl PageSource {
    pub fn new(executor: RequestExecutor, request: QueryRequest) -> Self {
        PageSource { executor, request }
    }

    async fn fetch(&self, paging_state: PagingState) -> Result<ResultPage, QueryError> {
        let request = self.request.with_paging_state(Some(paging_state));
        match self.executor.send(&request).await? {
            QueryResponse::Rows(page) => {
                let metrics = self.executor.metrics();
                metrics.increment_pages(1);
                metrics.increment_rows(page.row_count() as u64);
                Ok(page)
            }
            other => Err(QueryError::Protocol(format!(
                "expected a rows result for a page fetch, got {other:?}"
            ))),
        }
    }
}

struct CursorState {
    buffer: VecDeque<Row>,
    paging_state: Option<PagingState>,
    pages_fetched: usize,
}

impl RowSet {
    pub(crate) fn from_first_page(page: ResultPage, source: PageSource) -> Self {
        let metrics = source.executor.metrics();
        metrics.increment_pages(1);
        metrics.increment_rows(page.row_count() as u64);

        RowSet::build(ResultKind::Rows, page, Some(source))
    }

    pub(crate) fn from_kind(kind: ResultKind) -> Self {
        RowSet::build(kind, ResultPage::empty(Arc::from(Vec::new())), None)
    }

    fn build(kind: ResultKind, page: ResultPage, source: Option<PageSource>) -> Self {
        let pages_fetched = usize::from(source.is_some());
        RowSet {
            shared: Arc::new(Shared {
                kind,
                columns: page.columns,
                source,
                state: Mutex::new(CursorState {
                    buffer: page.rows.into(),
                    paging_state: page.paging_state,
                    pages_fetched,
                }),
            }),
        }
    }

    pub fn kind(&self) -> &ResultKind {
        &self.shared.kind
    }

    pub fn schema_change(&self) -> Option<&SchemaChange> {
        match &self.shared.kind {
            ResultKind::SchemaChange(change) => Some(change),
            _ => None,
        }
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.shared.columns
    }

    /// Number of rows currently buffered and not yet handed out.
    ///
    /// Shares the cursor lock with page fetches, so a call made while
    /// another consumer is fetching waits for that round trip and then
    /// reports the refilled buffer.
    pub async fn inner_queue_count(&self) -> usize {
        self.shared.state.lock().await.buffer.len()
    }

    /// Token the next fetch would send, usable to resume the result later
    /// with `SimpleStatement::with_paging_state`.
    pub async fn paging_state(&self) -> Option<PagingState> {
        self.shared.state.lock().await.paging_state.clone()
    }

    pub async fn pages_fetched(&self) -> usize {
        self.shared.state.lock().await.pages_fetched
    }

    /// True once every row has been handed out and no page remains.
    pub async fn is_exhausted(&self) -> bool {
        let state = self.shared.state.lock().await;
        state.buffer.is_empty() && state.paging_state.is_none()
    }

    /// Hands out the next row, fetching the following page when the buffer
    /// is empty. Returns `Ok(None)` once the result is exhausted.
    ///
    /// A failed fetch leaves the cursor where it was, so a later call
    /// retries the same page.
    pub async fn next_row(&self) -> Result<Option<Row>, RetrievalError> {
        let mut state = self.shared.state.lock().await;

        loop {
            if let Some(row) = state.buffer.pop_front() {
                return Ok(Some(row));
            }

            let (Some(paging_state), Some(source)) =
                (state.paging_state.clone(), self.shared.source.as_ref())
            else {
                return Ok(None);
            };

            let page_no = state.pages_fetched + 1;
            let page = source
                .fetch(paging_state)
                .await
                .map_err(|err| RetrievalError {
                    page: page_no,
                    source: err,
                })?;

            debug!(
                page = page_no,
                rows = page.row_count(),
                last = !page.has_more_pages(),
                "Fetched page"
            );

            state.pages_fetched = page_no;
            state.paging_state = page.paging_state;
            state.buffer.extend(page.rows);
        }
    }

    /// The rows of this cursor as a stream. The stream ends after the last
    /// row or after the first retrieval error.
    pub fn stream(&self) -> impl Stream<Item = Result<Row, RetrievalError>> + Send + 'static {
        stream::try_unfold(self.clone(), |rows| async move {
            let next = rows.next_row().await?;
            Ok::<_, RetrievalError>(next.map(|row| (row, rows)))
        })
    }

    /// Drains the remaining rows into memory.
    pub async fn collect_rows(&self) -> Result<Vec<Row>, RetrievalError> {
        self.stream().try_collect().await
    }
}

impl fmt::Debug for RowSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowSet")
            .field("kind", &self.shared.kind)
            .field("columns", &self.shared.columns)
            .finish_non_exhaustive()
    }
}
