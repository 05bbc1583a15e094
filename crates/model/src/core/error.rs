use crate::core::data_type::CqlType;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValueError {
    /// The value does not fit the fixed-width storage type.
    #[error("value {value} is out of range for type {target}")]
    OutOfRange { value: String, target: CqlType },

    /// No implicit conversion exists between the two types.
    #[error("cannot store a {from} value in a {target} column")]
    Incompatible { from: String, target: CqlType },

    /// A textual literal could not be parsed as the target type.
    #[error("invalid {target} literal: {literal}")]
    InvalidLiteral { literal: String, target: CqlType },

    /// ASCII columns only accept 7-bit characters.
    #[error("invalid ascii string: {0}")]
    NonAscii(String),
}
