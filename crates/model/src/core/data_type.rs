use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt};

/// Column types understood by the driver and the in-memory cluster.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CqlType {
    Ascii,
    Bigint,
    Blob,
    Boolean,
    Counter,
    Decimal,
    Double,
    Float,
    Int,
    Smallint,
    Tinyint,
    Text,
    Timestamp,
    Uuid,
    Timeuuid,
    Varint,
}

lazy_static! {
    static ref CQL_TYPE_MAP: HashMap<&'static str, CqlType> = build_cql_type_map();
}

impl CqlType {
    pub fn from_cql_name(type_name: &str) -> Result<Self, String> {
        let normalized = type_name.trim().to_lowercase();
        CQL_TYPE_MAP
            .get(normalized.as_str())
            .copied()
            .ok_or_else(|| format!("Unknown CQL type: {type_name}"))
    }

    pub fn cql_name(&self) -> &'static str {
        match self {
            CqlType::Ascii => "ascii",
            CqlType::Bigint => "bigint",
            CqlType::Blob => "blob",
            CqlType::Boolean => "boolean",
            CqlType::Counter => "counter",
            CqlType::Decimal => "decimal",
            CqlType::Double => "double",
            CqlType::Float => "float",
            CqlType::Int => "int",
            CqlType::Smallint => "smallint",
            CqlType::Tinyint => "tinyint",
            CqlType::Text => "text",
            CqlType::Timestamp => "timestamp",
            CqlType::Uuid => "uuid",
            CqlType::Timeuuid => "timeuuid",
            CqlType::Varint => "varint",
        }
    }

    /// Fixed-width integer types; values outside their range are rejected on write.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            CqlType::Tinyint
                | CqlType::Smallint
                | CqlType::Int
                | CqlType::Bigint
                | CqlType::Counter
        )
    }

    pub fn is_floating_point(&self) -> bool {
        matches!(self, CqlType::Float | CqlType::Double)
    }

    pub fn is_textual(&self) -> bool {
        matches!(self, CqlType::Ascii | CqlType::Text)
    }

    /// Whether a value of `other` may be stored in a column of this type
    /// without an explicit cast.
    pub fn is_compatible(&self, other: &CqlType) -> bool {
        match (self, other) {
            (CqlType::Text, CqlType::Ascii) => true,
            (CqlType::Uuid, CqlType::Timeuuid) => true,
            (CqlType::Counter, CqlType::Bigint) | (CqlType::Bigint, CqlType::Counter) => true,
            _ => self == other,
        }
    }
}

impl TryFrom<&str> for CqlType {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        CqlType::from_cql_name(s)
    }
}

impl fmt::Display for CqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cql_name())
    }
}

fn build_cql_type_map() -> HashMap<&'static str, CqlType> {
    use CqlType::*;

    let entries = [
        ("ascii", Ascii),
        ("bigint", Bigint),
        ("blob", Blob),
        ("boolean", Boolean),
        ("counter", Counter),
        ("decimal", Decimal),
        ("double", Double),
        ("float", Float),
        ("int", Int),
        ("smallint", Smallint),
        ("tinyint", Tinyint),
        ("text", Text),
        ("varchar", Text),
        ("timestamp", Timestamp),
        ("uuid", Uuid),
        ("timeuuid", Timeuuid),
        ("varint", Varint),
    ];

    let mut map = HashMap::new();
    for (name, cql_type) in entries {
        map.insert(name, cql_type);
    }
    map
}
