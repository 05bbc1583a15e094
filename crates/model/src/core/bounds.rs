use crate::core::{data_type::CqlType, value::Value};

/// Smallest and largest representable values of a fixed-width type.
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds {
    pub min: Value,
    pub max: Value,
}

impl Bounds {
    fn new(min: impl Into<Value>, max: impl Into<Value>) -> Self {
        Self {
            min: min.into(),
            max: max.into(),
        }
    }
}

/// Boundary values per column type. Types without a fixed range
/// (text, blob, varint, decimal, ...) have none.
pub fn bounds_of(cql_type: CqlType) -> Option<Bounds> {
    match cql_type {
        CqlType::Tinyint => Some(Bounds::new(i8::MIN, i8::MAX)),
        CqlType::Smallint => Some(Bounds::new(i16::MIN, i16::MAX)),
        CqlType::Int => Some(Bounds::new(i32::MIN, i32::MAX)),
        CqlType::Bigint => Some(Bounds::new(i64::MIN, i64::MAX)),
        CqlType::Counter => Some(Bounds {
            min: Value::Counter(i64::MIN),
            max: Value::Counter(i64::MAX),
        }),
        CqlType::Float => Some(Bounds::new(f32::MIN, f32::MAX)),
        CqlType::Double => Some(Bounds::new(f64::MIN, f64::MAX)),
        CqlType::Ascii
        | CqlType::Blob
        | CqlType::Boolean
        | CqlType::Decimal
        | CqlType::Text
        | CqlType::Timestamp
        | CqlType::Uuid
        | CqlType::Timeuuid
        | CqlType::Varint => None,
    }
}

/// Every type that has boundary values, in a stable order.
pub fn bounded_types() -> [CqlType; 7] {
    [
        CqlType::Tinyint,
        CqlType::Smallint,
        CqlType::Int,
        CqlType::Bigint,
        CqlType::Counter,
        CqlType::Float,
        CqlType::Double,
    ]
}
