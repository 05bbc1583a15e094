use crate::storage::RowKey;
use driver::error::QueryError;
use model::pagination::paging_state::PagingState;
use serde::{Deserialize, Serialize};

/// Continuation point handed to the client between pages.
///
/// Resuming strictly after `last_key` means rows inserted behind the
/// cursor are skipped and rows ahead of it are picked up, but no row is
/// returned twice. `emitted` carries the rows already counted against a
/// `LIMIT`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageToken {
    pub last_key: RowKey,
    pub emitted: usize,
}

impl PageToken {
    pub fn encode(&self) -> Result<PagingState, QueryError> {
        serde_json::to_vec(self)
            .map(PagingState::from)
            .map_err(|err| QueryError::Protocol(format!("cannot encode paging state: {err}")))
    }

    pub fn decode(state: &PagingState) -> Result<Self, QueryError> {
        serde_json::from_slice(state.as_bytes())
            .map_err(|err| QueryError::Protocol(format!("invalid paging state: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::core::value::Value;

    #[test]
    fn test_token_survives_encoding() {
        let token = PageToken {
            last_key: RowKey::new(&[Value::Text("p".into())], &[Value::Int(-3)]),
            emitted: 40,
        };
        let state = token.encode().unwrap();
        assert_eq!(PageToken::decode(&state).unwrap(), token);
    }

    #[test]
    fn test_garbage_state_is_a_protocol_error() {
        let state = PagingState::from(vec![0xde, 0xad]);
        assert!(matches!(
            PageToken::decode(&state),
            Err(QueryError::Protocol(_))
        ));
    }
}
