use crate::cql::ast::Literal;
use bigdecimal::BigDecimal;
use driver::error::QueryError;
use model::core::{
    data_type::CqlType,
    error::ValueError,
    value::{Value, parse_timestamp},
};
use num_bigint::BigInt;
use std::str::FromStr;

/// Turns a literal written in a statement into the value stored for a
/// column of type `target`. `?` markers take the matching bound value.
pub fn resolve(literal: &Literal, target: CqlType, bound: &[Value]) -> Result<Value, QueryError> {
    let value = match literal {
        Literal::Null => Value::Null,
        Literal::Marker(index) => bound.get(*index).cloned().ok_or_else(|| {
            QueryError::InvalidQuery(format!("No value bound for marker {}", index + 1))
        })?,
        Literal::Number(text) => number(text, target)?,
        Literal::Str(text) => string(text, target)?,
        Literal::Bool(v) => Value::Boolean(*v),
        Literal::Blob(bytes) => Value::Blob(bytes.clone()),
        Literal::Uuid(id) if target == CqlType::Timeuuid => Value::Timeuuid(*id),
        Literal::Uuid(id) => Value::Uuid(*id),
    };

    value.coerce_to(&target).map_err(invalid)
}

fn invalid(err: ValueError) -> QueryError {
    QueryError::InvalidQuery(err.to_string())
}

fn number(text: &str, target: CqlType) -> Result<Value, QueryError> {
    let invalid_literal = || {
        invalid(ValueError::InvalidLiteral {
            literal: text.to_string(),
            target,
        })
    };

    match target {
        _ if target.is_integer() || target == CqlType::Varint || target == CqlType::Timestamp => {
            // Parse arbitrarily wide so overflow reports the range, not the syntax.
            BigInt::from_str(text)
                .map(Value::Varint)
                .map_err(|_| invalid_literal())
        }
        // Narrowing a literal beyond f32 range yields an infinity.
        CqlType::Float => text
            .parse::<f32>()
            .map(Value::Float)
            .map_err(|_| invalid_literal()),
        CqlType::Double => text
            .parse::<f64>()
            .map(Value::Double)
            .map_err(|_| invalid_literal()),
        CqlType::Decimal => BigDecimal::from_str(text)
            .map(Value::Decimal)
            .map_err(|_| invalid_literal()),
        _ => Err(invalid(ValueError::Incompatible {
            from: "number".to_string(),
            target,
        })),
    }
}

fn string(text: &str, target: CqlType) -> Result<Value, QueryError> {
    match target {
        CqlType::Timestamp => parse_timestamp(text).map(Value::Timestamp).map_err(invalid),
        CqlType::Ascii => Ok(Value::Ascii(text.to_string())),
        _ => Ok(Value::Text(text.to_string())),
    }
}
