use crate::query::ast::{delete::Delete, insert::Insert, update::Update};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BatchKind {
    #[default]
    Logged,
    Unlogged,
    Counter,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BatchEntry {
    Insert(Insert),
    Update(Update),
    Delete(Delete),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    pub kind: BatchKind,
    pub entries: Vec<BatchEntry>,
}

impl From<Insert> for BatchEntry {
    fn from(value: Insert) -> Self {
        BatchEntry::Insert(value)
    }
}

impl From<Update> for BatchEntry {
    fn from(value: Update) -> Self {
        BatchEntry::Update(value)
    }
}

impl From<Delete> for BatchEntry {
    fn from(value: Delete) -> Self {
        BatchEntry::Delete(value)
    }
}
