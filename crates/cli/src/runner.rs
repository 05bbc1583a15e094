use crate::{error::CliError, output::Printer};
use cluster::cql::split_statements;
use driver::{Session, SimpleStatement, row_set::ResultKind};
use futures_util::StreamExt;
use std::io::Write;
use tracing::{info, warn};

/// What a script run did, for the final log line.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub statements: usize,
    pub rows: usize,
    pub pages: usize,
    pub skipped: usize,
}

/// Runs every statement of `script` in order and prints each result page
/// by page. `CREATE` statements that hit an existing object are reported
/// and skipped; any other failure stops the run.
pub async fn run_script<W: Write>(
    session: &Session,
    script: &str,
    page_size: Option<i32>,
    printer: &mut Printer<W>,
) -> Result<RunSummary, CliError> {
    let mut summary = RunSummary::default();

    for (index, cql) in split_statements(script).into_iter().enumerate() {
        let mut statement = SimpleStatement::new(cql);
        if let Some(page_size) = page_size {
            statement.set_page_size(page_size);
        }

        let rows = match session.execute(statement).await {
            Ok(rows) => rows,
            Err(err) if err.is_already_exists() => {
                warn!(statement = index + 1, error = %err, "Skipping statement");
                printer.message(&err.to_string())?;
                summary.skipped += 1;
                continue;
            }
            Err(source) => {
                return Err(CliError::Statement {
                    index: index + 1,
                    source,
                });
            }
        };
        summary.statements += 1;

        match rows.kind() {
            ResultKind::Rows => {
                let (count, pages) = print_rows(&rows, printer).await?;
                summary.rows += count;
                summary.pages += pages;
            }
            ResultKind::Void => printer.message("OK")?,
            ResultKind::SetKeyspace(keyspace) => {
                printer.message(&format!("USE {keyspace}"))?
            }
            ResultKind::SchemaChange(change) => {
                if !session.wait_for_schema_agreement(&rows).await? {
                    warn!(statement = index + 1, "Schema agreement not reached");
                }
                printer.schema_change(change)?;
            }
        }
    }

    info!(
        statements = summary.statements,
        rows = summary.rows,
        pages = summary.pages,
        skipped = summary.skipped,
        "Script finished"
    );
    Ok(summary)
}

async fn print_rows<W: Write>(
    rows: &driver::RowSet,
    printer: &mut Printer<W>,
) -> Result<(usize, usize), CliError> {
    let mut stream = std::pin::pin!(rows.stream());
    let mut page = 0;
    let mut count = 0;

    while let Some(row) = stream.next().await {
        let row = row?;
        let fetched = rows.pages_fetched().await;
        if fetched != page {
            page = fetched;
            let buffered = rows.inner_queue_count().await + 1;
            printer.page_header(page, buffered, rows.columns())?;
        }
        printer.row(page, &row)?;
        count += 1;
    }

    printer.summary(count, page.max(1))?;
    Ok((count, page.max(1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cluster::MemoryCluster;
    use driver::{DriverConfig, QueryError};

    const SCRIPT: &str = r#"
        CREATE KEYSPACE demo WITH replication = {'class': 'SimpleStrategy', 'replication_factor': 1};
        USE demo;
        CREATE TABLE items (id int PRIMARY KEY, label text);
        -- the same table again is skipped
        CREATE TABLE items (id int PRIMARY KEY, label text);
        BEGIN BATCH
            INSERT INTO items (id, label) VALUES (1, 'one; with a semicolon');
            INSERT INTO items (id, label) VALUES (2, 'two');
            INSERT INTO items (id, label) VALUES (3, 'three');
        APPLY BATCH;
        SELECT id, label FROM items;
    "#;

    fn run_output(printer: Printer<Vec<u8>>) -> String {
        String::from_utf8(printer.into_inner()).unwrap()
    }

    #[tokio::test]
    async fn test_script_prints_pages() {
        let session = MemoryCluster::new(1).session(DriverConfig::default());
        let mut printer = Printer::new(Vec::new(), false);

        let summary = run_script(&session, SCRIPT, Some(2), &mut printer)
            .await
            .unwrap();
        assert_eq!(summary.rows, 3);
        assert_eq!(summary.pages, 2);
        assert_eq!(summary.skipped, 1);

        let out = run_output(printer);
        assert!(out.contains("-- page 1 (2 rows)"));
        assert!(out.contains("-- page 2 (1 rows)"));
        assert!(out.contains("'one; with a semicolon'"));
        assert!(out.contains("Table demo.items already exists"));
        assert!(out.contains("(3 rows, 2 pages)"));
    }

    #[tokio::test]
    async fn test_script_json_lines() {
        let session = MemoryCluster::new(1).session(DriverConfig::default());
        let mut printer = Printer::new(Vec::new(), true);

        run_script(&session, SCRIPT, None, &mut printer)
            .await
            .unwrap();

        let out = run_output(printer);
        let rows: Vec<serde_json::Value> = out
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .filter(|line: &serde_json::Value| line.get("row").is_some())
            .collect();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|line| line["page"] == 1));
    }

    #[tokio::test]
    async fn test_script_stops_on_error() {
        let session = MemoryCluster::new(1).session(DriverConfig::default());
        let mut printer = Printer::new(Vec::new(), false);

        let err = run_script(&session, "SELECT * FROM nowhere.nothing;", None, &mut printer)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CliError::Statement {
                index: 1,
                source: QueryError::InvalidQuery(_)
            }
        ));
    }
}
