use crate::{
    core::value::Value,
    pagination::paging_state::PagingState,
    records::row::{ColumnSpec, Row},
};
use std::sync::Arc;

/// One page of a result set as returned by a single request.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultPage {
    pub columns: Arc<[ColumnSpec]>,
    pub rows: Vec<Row>,
    /// `None` on the final page.
    pub paging_state: Option<PagingState>,
}

impl ResultPage {
    pub fn new(
        columns: Arc<[ColumnSpec]>,
        rows: Vec<Vec<Value>>,
        paging_state: Option<PagingState>,
    ) -> Self {
        let rows = rows
            .into_iter()
            .map(|values| Row::new(columns.clone(), values))
            .collect();
        ResultPage {
            columns,
            rows,
            paging_state,
        }
    }

    pub fn empty(columns: Arc<[ColumnSpec]>) -> Self {
        ResultPage {
            columns,
            rows: Vec::new(),
            paging_state: None,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn has_more_pages(&self) -> bool {
        self.paging_state.is_some()
    }
}
