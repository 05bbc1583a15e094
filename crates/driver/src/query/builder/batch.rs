use crate::query::ast::batch::{Batch, BatchEntry, BatchKind};

#[derive(Debug, Clone, Default)]
pub struct BatchBuilder {
    ast: Batch,
}

impl BatchBuilder {
    pub fn new(kind: BatchKind) -> Self {
        Self {
            ast: Batch {
                kind,
                entries: Vec::new(),
            },
        }
    }

    pub fn add(mut self, entry: impl Into<BatchEntry>) -> Self {
        self.ast.entries.push(entry.into());
        self
    }

    pub fn len(&self) -> usize {
        self.ast.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ast.entries.is_empty()
    }

    pub fn build(self) -> Batch {
        self.ast
    }
}
