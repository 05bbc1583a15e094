use crate::{
    config::QueryConfig,
    connection::Prepared,
    consistency::ConsistencyLevel,
    error::QueryError,
    request::{QueryRequest, QueryRequestBuilder, QueryTarget},
};
use model::{
    core::value::Value,
    pagination::{page_size::PageSize, paging_state::PagingState},
};
use std::sync::Arc;

/// Options a statement may override; unset fields fall back to the
/// session's `QueryConfig`.
#[derive(Debug, Clone, Default, PartialEq)]
struct StatementOptions {
    page_size: Option<PageSize>,
    consistency: Option<ConsistencyLevel>,
    paging_state: Option<PagingState>,
}

impl StatementOptions {
    fn request(&self, target: QueryTarget, values: Vec<Value>, defaults: &QueryConfig) -> QueryRequest {
        QueryRequestBuilder::new(target)
            .values(values)
            .page_size(self.page_size.unwrap_or_else(|| defaults.page_size()))
            .consistency(self.consistency.unwrap_or(defaults.consistency))
            .paging_state(self.paging_state.clone())
            .build()
    }
}

/// CQL text with optional positional values for its `?` markers.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleStatement {
    cql: String,
    values: Vec<Value>,
    options: StatementOptions,
}

impl SimpleStatement {
    pub fn new(cql: impl Into<String>) -> Self {
        SimpleStatement {
            cql: cql.into(),
            values: Vec::new(),
            options: StatementOptions::default(),
        }
    }

    pub fn cql(&self) -> &str {
        &self.cql
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn page_size(&self) -> Option<PageSize> {
        self.options.page_size
    }

    pub fn bind(mut self, values: Vec<Value>) -> Self {
        self.values = values;
        self
    }

    pub fn with_page_size(mut self, page_size: PageSize) -> Self {
        self.options.page_size = Some(page_size);
        self
    }

    /// Sets the page size the way callers usually pass it: `i32::MAX` or a
    /// non-positive value fetches everything in one page.
    pub fn set_page_size(&mut self, page_size: i32) -> &mut Self {
        self.options.page_size = Some(PageSize::from_i32(page_size));
        self
    }

    pub fn with_consistency(mut self, consistency: ConsistencyLevel) -> Self {
        self.options.consistency = Some(consistency);
        self
    }

    /// Resumes a previous result from the page after `paging_state`.
    pub fn with_paging_state(mut self, paging_state: PagingState) -> Self {
        self.options.paging_state = Some(paging_state);
        self
    }
}

/// A statement prepared on the server, ready to be bound.
#[derive(Debug, Clone)]
pub struct PreparedStatement {
    prepared: Arc<Prepared>,
}

impl PreparedStatement {
    pub(crate) fn new(prepared: Prepared) -> Self {
        PreparedStatement {
            prepared: Arc::new(prepared),
        }
    }

    pub fn cql(&self) -> &str {
        &self.prepared.cql
    }

    pub fn bind_markers(&self) -> usize {
        self.prepared.bind_markers
    }

    pub fn bind(&self, values: Vec<Value>) -> Result<BoundStatement, QueryError> {
        if values.len() != self.prepared.bind_markers {
            return Err(QueryError::InvalidQuery(format!(
                "Expected {} bound values but got {}",
                self.prepared.bind_markers,
                values.len()
            )));
        }

        Ok(BoundStatement {
            prepared: self.prepared.clone(),
            values,
            options: StatementOptions::default(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct BoundStatement {
    prepared: Arc<Prepared>,
    values: Vec<Value>,
    options: StatementOptions,
}

impl BoundStatement {
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn with_page_size(mut self, page_size: PageSize) -> Self {
        self.options.page_size = Some(page_size);
        self
    }

    pub fn set_page_size(&mut self, page_size: i32) -> &mut Self {
        self.options.page_size = Some(PageSize::from_i32(page_size));
        self
    }

    pub fn with_consistency(mut self, consistency: ConsistencyLevel) -> Self {
        self.options.consistency = Some(consistency);
        self
    }

    pub fn with_paging_state(mut self, paging_state: PagingState) -> Self {
        self.options.paging_state = Some(paging_state);
        self
    }
}

#[derive(Debug, Clone)]
pub enum Statement {
    Simple(SimpleStatement),
    Bound(BoundStatement),
}

impl Statement {
    pub(crate) fn into_request(self, defaults: &QueryConfig) -> QueryRequest {
        match self {
            Statement::Simple(stmt) => {
                stmt.options
                    .request(QueryTarget::Cql(stmt.cql), stmt.values, defaults)
            }
            Statement::Bound(stmt) => stmt.options.request(
                QueryTarget::Prepared(stmt.prepared.id),
                stmt.values,
                defaults,
            ),
        }
    }
}

impl From<&str> for Statement {
    fn from(cql: &str) -> Self {
        Statement::Simple(SimpleStatement::new(cql))
    }
}

impl From<String> for Statement {
    fn from(cql: String) -> Self {
        Statement::Simple(SimpleStatement::new(cql))
    }
}

impl From<SimpleStatement> for Statement {
    fn from(stmt: SimpleStatement) -> Self {
        Statement::Simple(stmt)
    }
}

impl From<&SimpleStatement> for Statement {
    fn from(stmt: &SimpleStatement) -> Self {
        Statement::Simple(stmt.clone())
    }
}

impl From<BoundStatement> for Statement {
    fn from(stmt: BoundStatement) -> Self {
        Statement::Bound(stmt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::PreparedId;
    use uuid::Uuid;

    #[test]
    fn test_set_page_size_overrides_default() {
        let mut stmt = SimpleStatement::new("SELECT * FROM t");
        stmt.set_page_size(25);

        let request = Statement::from(stmt).into_request(&QueryConfig::default());
        assert_eq!(request.page_size.limit(), Some(25));
        assert_eq!(request.consistency, ConsistencyLevel::One);
        assert_eq!(request.target, QueryTarget::Cql("SELECT * FROM t".into()));
    }

    #[test]
    fn test_unset_options_use_defaults() {
        let request = Statement::from("SELECT * FROM t").into_request(&QueryConfig {
            page_size: i32::MAX,
            consistency: ConsistencyLevel::Quorum,
        });
        assert!(request.page_size.is_unbounded());
        assert_eq!(request.consistency, ConsistencyLevel::Quorum);
        assert!(request.paging_state.is_none());
    }

    #[test]
    fn test_bind_checks_marker_count() {
        let prepared = PreparedStatement::new(Prepared {
            id: PreparedId(Uuid::new_v4()),
            cql: "INSERT INTO t (k, v) VALUES (?, ?)".into(),
            bind_markers: 2,
        });

        assert!(prepared.bind(vec![Value::Int(1)]).is_err());
        let bound = prepared.bind(vec![Value::Int(1), Value::Text("a".into())]).unwrap();
        let request = Statement::from(bound).into_request(&QueryConfig::default());
        assert!(matches!(request.target, QueryTarget::Prepared(_)));
        assert_eq!(request.values.len(), 2);
    }
}
