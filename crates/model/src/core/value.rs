use crate::core::{data_type::CqlType, error::ValueError};
use bigdecimal::{BigDecimal, FromPrimitive, ToPrimitive};
use chrono::{DateTime, NaiveDate, Utc};
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt, hash::Hash, str::FromStr};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Tinyint(i8),
    Smallint(i16),
    Int(i32),
    Bigint(i64),
    Counter(i64),
    Float(f32),
    Double(f64),
    Decimal(BigDecimal),
    Varint(BigInt),
    Ascii(String),
    Text(String),
    Blob(Vec<u8>),
    Uuid(Uuid),
    Timeuuid(Uuid),
    Timestamp(DateTime<Utc>),
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        use Value::*;
        std::mem::discriminant(self).hash(state);
        match self {
            Null => {}
            Boolean(v) => v.hash(state),
            Tinyint(v) => v.hash(state),
            Smallint(v) => v.hash(state),
            Int(v) => v.hash(state),
            Bigint(v) | Counter(v) => v.hash(state),
            // Hash the bits so NaN and -0.0 hash consistently
            Float(v) => v.to_bits().hash(state),
            Double(v) => v.to_bits().hash(state),
            Decimal(v) => v.hash(state),
            Varint(v) => v.hash(state),
            Ascii(v) | Text(v) => v.hash(state),
            Blob(v) => v.hash(state),
            Uuid(v) | Timeuuid(v) => v.hash(state),
            Timestamp(v) => v.hash(state),
        }
    }
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn data_type(&self) -> Option<CqlType> {
        match self {
            Value::Null => None,
            Value::Boolean(_) => Some(CqlType::Boolean),
            Value::Tinyint(_) => Some(CqlType::Tinyint),
            Value::Smallint(_) => Some(CqlType::Smallint),
            Value::Int(_) => Some(CqlType::Int),
            Value::Bigint(_) => Some(CqlType::Bigint),
            Value::Counter(_) => Some(CqlType::Counter),
            Value::Float(_) => Some(CqlType::Float),
            Value::Double(_) => Some(CqlType::Double),
            Value::Decimal(_) => Some(CqlType::Decimal),
            Value::Varint(_) => Some(CqlType::Varint),
            Value::Ascii(_) => Some(CqlType::Ascii),
            Value::Text(_) => Some(CqlType::Text),
            Value::Blob(_) => Some(CqlType::Blob),
            Value::Uuid(_) => Some(CqlType::Uuid),
            Value::Timeuuid(_) => Some(CqlType::Timeuuid),
            Value::Timestamp(_) => Some(CqlType::Timestamp),
        }
    }

    fn type_label(&self) -> String {
        self.data_type()
            .map(|t| t.to_string())
            .unwrap_or_else(|| "null".to_string())
    }

    /// Exact integer view of any integral value.
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Value::Tinyint(v) => Some(*v as i128),
            Value::Smallint(v) => Some(*v as i128),
            Value::Int(v) => Some(*v as i128),
            Value::Bigint(v) | Value::Counter(v) => Some(*v as i128),
            Value::Varint(v) => v.to_i128(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_i128().and_then(|v| i64::try_from(v).ok())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v as f64),
            Value::Double(v) => Some(*v),
            Value::Decimal(v) => v.to_f64(),
            other => other.as_i128().map(|v| v as f64),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Ascii(v) | Value::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            Value::Uuid(v) | Value::Timeuuid(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Blob(v) => Some(v),
            _ => None,
        }
    }

    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        use Value::*;
        match (self, other) {
            (Null, Null) => Some(Ordering::Equal),
            (Boolean(a), Boolean(b)) => Some(a.cmp(b)),
            (Float(a), Float(b)) => a.partial_cmp(b),
            (Double(a), Double(b)) => a.partial_cmp(b),
            (Decimal(a), Decimal(b)) => Some(a.cmp(b)),
            (Varint(a), Varint(b)) => Some(a.cmp(b)),
            (Ascii(a) | Text(a), Ascii(b) | Text(b)) => Some(a.cmp(b)),
            (Blob(a), Blob(b)) => Some(a.cmp(b)),
            (Uuid(a) | Timeuuid(a), Uuid(b) | Timeuuid(b)) => Some(a.cmp(b)),
            (Timestamp(a), Timestamp(b)) => Some(a.cmp(b)),
            (a, b) => match (a.as_i128(), b.as_i128()) {
                (Some(x), Some(y)) => Some(x.cmp(&y)),
                _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
            },
        }
    }

    pub fn equal(&self, other: &Value) -> bool {
        self.compare(other) == Some(Ordering::Equal)
    }

    /// Converts the value into the representation stored for a column of
    /// type `target`.
    ///
    /// Integer targets reject values outside their range. Float targets narrow
    /// doubles following IEEE 754, so out-of-range magnitudes become infinities.
    pub fn coerce_to(&self, target: &CqlType) -> Result<Value, ValueError> {
        if self.is_null() {
            return Ok(Value::Null);
        }

        match target {
            CqlType::Tinyint => {
                self.coerce_integer(target, |v| i8::try_from(v).ok().map(Value::Tinyint))
            }
            CqlType::Smallint => {
                self.coerce_integer(target, |v| i16::try_from(v).ok().map(Value::Smallint))
            }
            CqlType::Int => {
                self.coerce_integer(target, |v| i32::try_from(v).ok().map(Value::Int))
            }
            CqlType::Bigint => {
                self.coerce_integer(target, |v| i64::try_from(v).ok().map(Value::Bigint))
            }
            CqlType::Counter => {
                self.coerce_integer(target, |v| i64::try_from(v).ok().map(Value::Counter))
            }
            CqlType::Varint => match self {
                Value::Varint(v) => Ok(Value::Varint(v.clone())),
                other => other
                    .as_i128()
                    .map(|v| Value::Varint(BigInt::from(v)))
                    .ok_or_else(|| self.incompatible(target)),
            },
            CqlType::Float => match self {
                Value::Float(v) => Ok(Value::Float(*v)),
                Value::Double(v) => Ok(Value::Float(*v as f32)),
                Value::Decimal(_) => Err(self.incompatible(target)),
                other => other
                    .as_i128()
                    .map(|v| Value::Float(v as f32))
                    .ok_or_else(|| self.incompatible(target)),
            },
            CqlType::Double => match self {
                Value::Float(v) => Ok(Value::Double(*v as f64)),
                Value::Double(v) => Ok(Value::Double(*v)),
                Value::Decimal(_) => Err(self.incompatible(target)),
                other => other
                    .as_i128()
                    .map(|v| Value::Double(v as f64))
                    .ok_or_else(|| self.incompatible(target)),
            },
            CqlType::Decimal => match self {
                Value::Decimal(v) => Ok(Value::Decimal(v.clone())),
                Value::Float(v) => BigDecimal::from_f32(*v)
                    .map(Value::Decimal)
                    .ok_or_else(|| self.out_of_range(target)),
                Value::Double(v) => BigDecimal::from_f64(*v)
                    .map(Value::Decimal)
                    .ok_or_else(|| self.out_of_range(target)),
                Value::Varint(v) => Ok(Value::Decimal(BigDecimal::new(v.clone(), 0))),
                other => other
                    .as_i128()
                    .and_then(BigDecimal::from_i128)
                    .map(Value::Decimal)
                    .ok_or_else(|| self.incompatible(target)),
            },
            CqlType::Boolean => match self {
                Value::Boolean(v) => Ok(Value::Boolean(*v)),
                _ => Err(self.incompatible(target)),
            },
            CqlType::Text => match self {
                Value::Ascii(v) | Value::Text(v) => Ok(Value::Text(v.clone())),
                _ => Err(self.incompatible(target)),
            },
            CqlType::Ascii => match self {
                Value::Ascii(v) | Value::Text(v) if v.is_ascii() => Ok(Value::Ascii(v.clone())),
                Value::Ascii(v) | Value::Text(v) => Err(ValueError::NonAscii(v.clone())),
                _ => Err(self.incompatible(target)),
            },
            CqlType::Blob => match self {
                Value::Blob(v) => Ok(Value::Blob(v.clone())),
                _ => Err(self.incompatible(target)),
            },
            CqlType::Uuid => match self {
                Value::Uuid(v) | Value::Timeuuid(v) => Ok(Value::Uuid(*v)),
                _ => Err(self.incompatible(target)),
            },
            CqlType::Timeuuid => match self {
                Value::Timeuuid(v) => Ok(Value::Timeuuid(*v)),
                Value::Uuid(v) if v.get_version_num() == 1 => Ok(Value::Timeuuid(*v)),
                Value::Uuid(v) => Err(ValueError::InvalidLiteral {
                    literal: v.to_string(),
                    target: *target,
                }),
                _ => Err(self.incompatible(target)),
            },
            CqlType::Timestamp => match self {
                Value::Timestamp(v) => Ok(Value::Timestamp(*v)),
                Value::Ascii(v) | Value::Text(v) => parse_timestamp(v).map(Value::Timestamp),
                other => other
                    .as_i64()
                    .and_then(DateTime::from_timestamp_millis)
                    .map(Value::Timestamp)
                    .ok_or_else(|| self.incompatible(target)),
            },
        }
    }

    fn coerce_integer<F>(&self, target: &CqlType, narrow: F) -> Result<Value, ValueError>
    where
        F: Fn(i128) -> Option<Value>,
    {
        match self {
            Value::Varint(v) => match v.to_i128() {
                Some(wide) => narrow(wide).ok_or_else(|| self.out_of_range(target)),
                None => Err(self.out_of_range(target)),
            },
            other => match other.as_i128() {
                Some(wide) => narrow(wide).ok_or_else(|| self.out_of_range(target)),
                None => Err(self.incompatible(target)),
            },
        }
    }

    fn out_of_range(&self, target: &CqlType) -> ValueError {
        ValueError::OutOfRange {
            value: self.to_string(),
            target: *target,
        }
    }

    fn incompatible(&self, target: &CqlType) -> ValueError {
        ValueError::Incompatible {
            from: self.type_label(),
            target: *target,
        }
    }
}

/// Parses the timestamp formats accepted in CQL string literals, plus
/// integer milliseconds since the epoch.
pub fn parse_timestamp(input: &str) -> Result<DateTime<Utc>, ValueError> {
    let trimmed = input.trim();
    let invalid = || ValueError::InvalidLiteral {
        literal: input.to_string(),
        target: CqlType::Timestamp,
    };

    if let Ok(millis) = trimmed.parse::<i64>() {
        return DateTime::from_timestamp_millis(millis).ok_or_else(invalid);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    const ZONED_FORMATS: [&str; 6] = [
        "%Y-%m-%d %H:%M%z",
        "%Y-%m-%d %H:%M:%S%z",
        "%Y-%m-%d %H:%M:%S%.f%z",
        "%Y-%m-%dT%H:%M%z",
        "%Y-%m-%dT%H:%M:%S%z",
        "%Y-%m-%dT%H:%M:%S%.f%z",
    ];
    for format in ZONED_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(trimmed, format) {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|naive| naive.and_utc())
            .ok_or_else(invalid);
    }

    Err(invalid())
}

fn fmt_float(f: &mut fmt::Formatter<'_>, v: f64, shortest: String) -> fmt::Result {
    if v.is_nan() {
        write!(f, "NaN")
    } else if v.is_infinite() {
        write!(f, "{}Infinity", if v < 0.0 { "-" } else { "" })
    } else {
        write!(f, "{shortest}")
    }
}

/// Renders the value as a CQL literal.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Tinyint(v) => write!(f, "{v}"),
            Value::Smallint(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Bigint(v) | Value::Counter(v) => write!(f, "{v}"),
            Value::Float(v) => fmt_float(f, *v as f64, format!("{v:e}")),
            Value::Double(v) => fmt_float(f, *v, format!("{v:e}")),
            Value::Decimal(v) => write!(f, "{v}"),
            Value::Varint(v) => write!(f, "{v}"),
            Value::Ascii(v) | Value::Text(v) => write!(f, "'{}'", v.replace('\'', "''")),
            Value::Blob(v) => {
                let hex = v
                    .iter()
                    .fold(String::new(), |acc, byte: &u8| acc + &format!("{byte:02x}"));
                write!(f, "0x{hex}")
            }
            Value::Uuid(v) | Value::Timeuuid(v) => write!(f, "{v}"),
            Value::Timestamp(v) => write!(f, "'{}'", v.format("%Y-%m-%dT%H:%M:%S%.3fZ")),
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_from!(
    bool => Boolean,
    i8 => Tinyint,
    i16 => Smallint,
    i32 => Int,
    i64 => Bigint,
    f32 => Float,
    f64 => Double,
    BigDecimal => Decimal,
    BigInt => Varint,
    String => Text,
    Vec<u8> => Blob,
    Uuid => Uuid,
    DateTime<Utc> => Timestamp,
);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl FromStr for Value {
    type Err = ValueError;

    /// Parses an untyped numeric literal, preferring the narrowest exact representation.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(v) = trimmed.parse::<i64>() {
            return Ok(Value::Bigint(v));
        }
        if let Ok(v) = BigInt::from_str(trimmed) {
            return Ok(Value::Varint(v));
        }
        trimmed
            .parse::<f64>()
            .map(Value::Double)
            .map_err(|_| ValueError::InvalidLiteral {
                literal: s.to_string(),
                target: CqlType::Double,
            })
    }
}
