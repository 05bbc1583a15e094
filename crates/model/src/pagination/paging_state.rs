use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque continuation token handed back by the server with every page that
/// is not the last one. Clients only store it and send it back.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PagingState(Bytes);

impl PagingState {
    pub fn new(raw: impl Into<Bytes>) -> Self {
        PagingState(raw.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Bytes {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for PagingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PagingState({} bytes)", self.0.len())
    }
}

impl From<Vec<u8>> for PagingState {
    fn from(raw: Vec<u8>) -> Self {
        PagingState(Bytes::from(raw))
    }
}
