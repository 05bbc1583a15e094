use crate::{connection::PreparedId, consistency::ConsistencyLevel};
use model::{
    core::value::Value,
    pagination::{page_size::PageSize, paging_state::PagingState},
};

/// What the server should execute.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryTarget {
    Cql(String),
    Prepared(PreparedId),
}

/// A single request as it is sent over a connection. Page fetches reuse the
/// request of the first page with a different paging state.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub target: QueryTarget,
    pub values: Vec<Value>,
    pub page_size: PageSize,
    pub paging_state: Option<PagingState>,
    pub consistency: ConsistencyLevel,
}

impl QueryRequest {
    pub fn with_paging_state(&self, paging_state: Option<PagingState>) -> Self {
        QueryRequest {
            paging_state,
            ..self.clone()
        }
    }

    pub fn describe(&self) -> String {
        match &self.target {
            QueryTarget::Cql(cql) => cql.clone(),
            QueryTarget::Prepared(id) => format!("prepared {id}"),
        }
    }
}

pub struct QueryRequestBuilder {
    target: QueryTarget,
    values: Vec<Value>,
    page_size: PageSize,
    paging_state: Option<PagingState>,
    consistency: ConsistencyLevel,
}

impl QueryRequestBuilder {
    pub fn new(target: QueryTarget) -> Self {
        QueryRequestBuilder {
            target,
            values: Vec::new(),
            page_size: PageSize::Unbounded,
            paging_state: None,
            consistency: ConsistencyLevel::default(),
        }
    }

    pub fn cql(cql: &str) -> Self {
        Self::new(QueryTarget::Cql(cql.to_string()))
    }

    pub fn values(mut self, values: Vec<Value>) -> Self {
        self.values = values;
        self
    }

    pub fn page_size(mut self, page_size: PageSize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn paging_state(mut self, paging_state: Option<PagingState>) -> Self {
        self.paging_state = paging_state;
        self
    }

    pub fn consistency(mut self, consistency: ConsistencyLevel) -> Self {
        self.consistency = consistency;
        self
    }

    pub fn build(self) -> QueryRequest {
        QueryRequest {
            target: self.target,
            values: self.values,
            page_size: self.page_size,
            paging_state: self.paging_state,
            consistency: self.consistency,
        }
    }
}
