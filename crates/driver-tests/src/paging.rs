#[cfg(test)]
mod tests {
    use crate::{
        TestCluster,
        utils::{
            FlakyConnection, assert_unique_and_complete, collect_ids, drain_concurrently,
            no_retry_config, seed_numbers,
        },
    };
    use driver::{DriverConfig, QueryError, SimpleStatement};
    use futures::StreamExt;
    use std::sync::Arc;
    use tracing_test::traced_test;

    const SELECT_NUMBERS: &str = "SELECT * FROM numbers";

    // Scenario: 1003 rows, page size 10.
    // Expected Outcome:
    // - Right after execution exactly one page (10 rows) is buffered.
    // - Draining the cursor yields all 1003 rows.
    #[traced_test]
    #[tokio::test]
    async fn first_page_is_buffered_when_rows_exceed_page_size() {
        let fixture = TestCluster::setup().await;
        seed_numbers(&fixture.session, 1003).await;

        let rows = fixture
            .session
            .execute_paged(SELECT_NUMBERS, 10)
            .await
            .expect("execute");
        assert_eq!(rows.inner_queue_count().await, 10);
        assert!(!rows.is_exhausted().await);

        assert_unique_and_complete(collect_ids(&rows).await, 1003);
        assert_eq!(rows.inner_queue_count().await, 0);
        assert!(rows.is_exhausted().await);

        fixture.teardown().await;
    }

    // Scenario: 1003 rows, page size i32::MAX (paging disabled).
    // Expected Outcome: the whole result is buffered on execution.
    #[traced_test]
    #[tokio::test]
    async fn unbounded_page_buffers_everything() {
        let fixture = TestCluster::setup().await;
        seed_numbers(&fixture.session, 1003).await;

        let rows = fixture
            .session
            .execute_paged(SELECT_NUMBERS, i32::MAX)
            .await
            .expect("execute");
        assert_eq!(rows.inner_queue_count().await, 1003);
        assert_eq!(rows.pages_fetched().await, 1);
        assert_unique_and_complete(collect_ids(&rows).await, 1003);

        fixture.teardown().await;
    }

    // Scenario: fewer rows than the page size.
    // Expected Outcome: every row is buffered and no further page exists.
    #[traced_test]
    #[tokio::test]
    async fn small_result_fits_first_page() {
        let fixture = TestCluster::setup().await;
        seed_numbers(&fixture.session, 7).await;

        let rows = fixture
            .session
            .execute_paged(SELECT_NUMBERS, 10)
            .await
            .expect("execute");
        assert_eq!(rows.inner_queue_count().await, 7);
        assert!(rows.paging_state().await.is_none());
        assert_unique_and_complete(collect_ids(&rows).await, 7);

        fixture.teardown().await;
    }

    // Scenario: an empty table.
    // Expected Outcome: nothing is buffered and iteration ends immediately.
    #[traced_test]
    #[tokio::test]
    async fn empty_result() {
        let fixture = TestCluster::setup().await;
        seed_numbers(&fixture.session, 0).await;

        let rows = fixture
            .session
            .execute_paged(SELECT_NUMBERS, 10)
            .await
            .expect("execute");
        assert_eq!(rows.inner_queue_count().await, 0);
        assert!(rows.next_row().await.expect("next row").is_none());

        fixture.teardown().await;
    }

    // Scenario: 250 rows read with a range of page sizes, including ones that
    // divide the row count exactly.
    // Expected Outcome: every page size yields each row exactly once.
    #[traced_test]
    #[tokio::test]
    async fn full_iteration_for_any_page_size() {
        let fixture = TestCluster::setup().await;
        seed_numbers(&fixture.session, 250).await;

        for page_size in [1, 3, 10, 25, 249, 250, 251, 5000, i32::MAX, 0] {
            let rows = fixture
                .session
                .execute_paged(SELECT_NUMBERS, page_size)
                .await
                .expect("execute");
            let ids = collect_ids(&rows).await;
            assert_eq!(ids.len(), 250, "page size {page_size}");
            assert_unique_and_complete(ids, 250);
        }

        fixture.teardown().await;
    }

    // Scenario: 300 rows, page size 25, four consumers sharing one cursor.
    // Expected Outcome: the consumers together see 300 rows, none twice.
    #[traced_test]
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_consumers_share_one_cursor() {
        let fixture = TestCluster::setup().await;
        seed_numbers(&fixture.session, 300).await;

        let rows = fixture
            .session
            .execute_paged(SELECT_NUMBERS, 25)
            .await
            .expect("execute");
        assert_eq!(rows.inner_queue_count().await, 25);

        let ids = drain_concurrently(&rows, 4).await;
        assert_unique_and_complete(ids, 300);
        assert_eq!(rows.pages_fetched().await, 12);

        fixture.teardown().await;
    }

    // Scenario: more consumers than pages, small odd page size.
    // Expected Outcome: exactly-once delivery still holds.
    #[traced_test]
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn many_consumers_small_pages() {
        let fixture = TestCluster::setup().await;
        seed_numbers(&fixture.session, 1003).await;

        let rows = fixture
            .session
            .execute_paged(SELECT_NUMBERS, 7)
            .await
            .expect("execute");
        let ids = drain_concurrently(&rows, 16).await;
        assert_unique_and_complete(ids, 1003);

        fixture.teardown().await;
    }

    // Scenario: the page size is set on the statement, and separately taken
    // from the session configuration.
    // Expected Outcome: the first buffered page matches the size in effect.
    #[traced_test]
    #[tokio::test]
    async fn page_size_from_statement_and_config() {
        let fixture = TestCluster::setup_with(DriverConfig::default().with_page_size(40)).await;
        seed_numbers(&fixture.session, 100).await;

        let mut statement = SimpleStatement::new(SELECT_NUMBERS);
        statement.set_page_size(15);
        let rows = fixture.session.execute(statement).await.expect("execute");
        assert_eq!(rows.inner_queue_count().await, 15);

        let rows = fixture.session.execute(SELECT_NUMBERS).await.expect("execute");
        assert_eq!(rows.inner_queue_count().await, 40);
        assert_unique_and_complete(collect_ids(&rows).await, 100);

        fixture.teardown().await;
    }

    // Scenario: the cursor is consumed as a stream.
    // Expected Outcome: the stream yields every row, then ends.
    #[traced_test]
    #[tokio::test]
    async fn stream_yields_every_row() {
        let fixture = TestCluster::setup().await;
        seed_numbers(&fixture.session, 64).await;

        let rows = fixture
            .session
            .execute_paged(SELECT_NUMBERS, 10)
            .await
            .expect("execute");
        let streamed = rows.stream().collect::<Vec<_>>().await;
        assert_eq!(streamed.len(), 64);
        assert!(streamed.iter().all(|row| row.is_ok()));

        fixture.teardown().await;
    }

    // Scenario: fetching page 3 fails once and retries are disabled.
    // Expected Outcome:
    // - The consumer that triggered the fetch gets a retrieval error naming page 3.
    // - No row is lost: the next call fetches page 3 again and iteration completes.
    #[traced_test]
    #[tokio::test]
    async fn failed_fetch_resumes_without_loss() {
        let fixture = TestCluster::setup().await;
        seed_numbers(&fixture.session, 100).await;

        let session = fixture
            .session_through(no_retry_config(), |inner| {
                Arc::new(FlakyConnection::new(inner).fail_page(3))
            })
            .await;
        let rows = session
            .execute_paged(SELECT_NUMBERS, 10)
            .await
            .expect("execute");

        let mut ids = Vec::new();
        for _ in 0..20 {
            let row = rows.next_row().await.expect("first two pages").expect("row");
            ids.push(row[0].as_i64().expect("integer id"));
        }

        let err = rows.next_row().await.expect_err("page 3 fails");
        assert_eq!(err.page, 3);
        assert!(matches!(err.source, QueryError::Timeout(_)));
        assert_eq!(rows.pages_fetched().await, 2);

        ids.extend(collect_ids(&rows).await);
        assert_unique_and_complete(ids, 100);
        assert_eq!(session.metrics().failure_count, 1);

        fixture.teardown().await;
    }

    // Scenario: fetching page 2 fails once with a transient error while the
    // default retry policy is active.
    // Expected Outcome: the retry hides the failure from the consumer.
    #[traced_test]
    #[tokio::test]
    async fn transient_fetch_failure_is_retried() {
        let fixture = TestCluster::setup().await;
        seed_numbers(&fixture.session, 50).await;

        let session = fixture
            .session_through(DriverConfig::default(), |inner| {
                Arc::new(FlakyConnection::new(inner).fail_page(2))
            })
            .await;
        let rows = session
            .execute_paged(SELECT_NUMBERS, 10)
            .await
            .expect("execute");

        assert_unique_and_complete(collect_ids(&rows).await, 50);
        let metrics = session.metrics();
        assert_eq!(metrics.retry_count, 1);
        assert_eq!(metrics.failure_count, 0);

        fixture.teardown().await;
    }

    // Scenario: rows are written behind and ahead of a cursor between pages.
    // Expected Outcome: no row already handed out is returned again.
    #[traced_test]
    #[tokio::test]
    async fn writes_between_pages_never_duplicate_rows() {
        let fixture = TestCluster::setup().await;
        seed_numbers(&fixture.session, 40).await;

        let rows = fixture
            .session
            .execute_paged(SELECT_NUMBERS, 10)
            .await
            .expect("execute");
        let mut ids = Vec::new();
        for _ in 0..10 {
            let row = rows.next_row().await.expect("next row").expect("row");
            ids.push(row[0].as_i64().expect("integer id"));
        }

        for id in 40..60 {
            fixture
                .session
                .execute(format!("INSERT INTO numbers (id) VALUES ({id})"))
                .await
                .expect("insert");
        }
        ids.extend(collect_ids(&rows).await);

        let mut unique = ids.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), ids.len(), "no duplicates");
        assert!((0..40).all(|id| ids.contains(&id)), "original rows all seen");

        fixture.teardown().await;
    }
}
