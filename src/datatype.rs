// used for temporal values
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
// used for decimal numbers
use bigdecimal::BigDecimal;

// used to render values for JSON output
use serde::ser::{Serialize, Serializer};

// used to print out readable forms of a data type
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::record::Schema;

// ------------- Field Type --------------

/// The declared type of a schema field.
///
/// Scalar categories drive conversion. `Array`, `Map` and `Record` are
/// complex types whose values are carried as opaque text.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    String,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Byte,
    Char,
    Short,
    Decimal,
    Date,
    Time,
    Timestamp,
    Array(Box<FieldType>),
    Map(Box<FieldType>),
    Record(Arc<Schema>),
}

impl FieldType {
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::String => "STRING",
            FieldType::Boolean => "BOOLEAN",
            FieldType::Int => "INT",
            FieldType::Long => "LONG",
            FieldType::Float => "FLOAT",
            FieldType::Double => "DOUBLE",
            FieldType::Byte => "BYTE",
            FieldType::Char => "CHAR",
            FieldType::Short => "SHORT",
            FieldType::Decimal => "DECIMAL",
            FieldType::Date => "DATE",
            FieldType::Time => "TIME",
            FieldType::Timestamp => "TIMESTAMP",
            FieldType::Array(_) => "ARRAY",
            FieldType::Map(_) => "MAP",
            FieldType::Record(_) => "RECORD",
        }
    }
    pub fn is_complex(&self) -> bool {
        matches!(self, FieldType::Array(_) | FieldType::Map(_) | FieldType::Record(_))
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FieldType::Array(element) => write!(f, "ARRAY[{}]", element),
            FieldType::Map(value) => write!(f, "MAP[{}]", value),
            other => write!(f, "{}", other.name()),
        }
    }
}

// Type names as they appear in schema files. Complex types nest with
// brackets, e.g. "array[int]" or "map[string]". Nested record schemas
// cannot be spelled this way and are built in code.
impl FromStr for FieldType {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        let lower = s.to_ascii_lowercase();
        if let Some(inner) = lower.strip_prefix("array[").and_then(|r| r.strip_suffix(']')) {
            return Ok(FieldType::Array(Box::new(inner.parse()?)));
        }
        if let Some(inner) = lower.strip_prefix("map[").and_then(|r| r.strip_suffix(']')) {
            return Ok(FieldType::Map(Box::new(inner.parse()?)));
        }
        match lower.as_str() {
            "string" => Ok(FieldType::String),
            "boolean" => Ok(FieldType::Boolean),
            "int" => Ok(FieldType::Int),
            "long" => Ok(FieldType::Long),
            "float" => Ok(FieldType::Float),
            "double" => Ok(FieldType::Double),
            "byte" => Ok(FieldType::Byte),
            "char" => Ok(FieldType::Char),
            "short" => Ok(FieldType::Short),
            "decimal" => Ok(FieldType::Decimal),
            "date" => Ok(FieldType::Date),
            "time" => Ok(FieldType::Time),
            "timestamp" => Ok(FieldType::Timestamp),
            _ => Err(format!("unknown field type '{}'", s)),
        }
    }
}

// ------------- Value --------------

/// A converted field value.
///
/// `Null` is "no value": what an empty (or emptied by quote stripping) raw
/// text converts to. It is distinct from `String(String::new())`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    String(String),
    Boolean(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Byte(i8),
    Char(char),
    Short(i16),
    Decimal(BigDecimal),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
    /// Whether this value is a legal representation of `field_type`.
    /// Complex types are carried as text, so a string conforms to them.
    pub fn conforms_to(&self, field_type: &FieldType) -> bool {
        match (self, field_type) {
            (Value::Null, _) => true,
            (Value::String(_), FieldType::String) => true,
            (Value::String(_), t) if t.is_complex() => true,
            (Value::Boolean(_), FieldType::Boolean) => true,
            (Value::Int(_), FieldType::Int) => true,
            (Value::Long(_), FieldType::Long) => true,
            (Value::Float(_), FieldType::Float) => true,
            (Value::Double(_), FieldType::Double) => true,
            (Value::Byte(_), FieldType::Byte) => true,
            (Value::Char(_), FieldType::Char) => true,
            (Value::Short(_), FieldType::Short) => true,
            (Value::Decimal(_), FieldType::Decimal) => true,
            (Value::Date(_), FieldType::Date) => true,
            (Value::Time(_), FieldType::Time) => true,
            (Value::Timestamp(_), FieldType::Timestamp) => true,
            _ => false,
        }
    }
}

// spelled the way floating point literals are accepted on input
fn write_infinity(f: &mut fmt::Formatter, negative: bool) -> fmt::Result {
    if negative { write!(f, "-Infinity") } else { write!(f, "Infinity") }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::String(s) => write!(f, "{}", s),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Long(l) => write!(f, "{}", l),
            Value::Float(x) if x.is_infinite() => write_infinity(f, x.is_sign_negative()),
            Value::Double(x) if x.is_infinite() => write_infinity(f, x.is_sign_negative()),
            Value::Float(x) => write!(f, "{}", x),
            Value::Double(x) => write!(f, "{}", x),
            Value::Byte(b) => write!(f, "{}", b),
            Value::Char(c) => write!(f, "{}", c),
            Value::Short(s) => write!(f, "{}", s),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::Date(d) => write!(f, "{}", d),
            Value::Time(t) => write!(f, "{}", t),
            Value::Timestamp(ts) => write!(f, "{}", ts),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::String(s) => serializer.serialize_str(s),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i32(*i),
            Value::Long(l) => serializer.serialize_i64(*l),
            Value::Float(x) => serializer.serialize_f32(*x),
            Value::Double(x) => serializer.serialize_f64(*x),
            Value::Byte(b) => serializer.serialize_i8(*b),
            Value::Char(c) => serializer.serialize_char(*c),
            Value::Short(s) => serializer.serialize_i16(*s),
            // temporal and decimal values keep their canonical text form
            other => serializer.collect_str(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_type_names_parse() {
        assert_eq!("INT".parse::<FieldType>().unwrap(), FieldType::Int);
        assert_eq!(" timestamp ".parse::<FieldType>().unwrap(), FieldType::Timestamp);
        assert_eq!(
            "array[map[string]]".parse::<FieldType>().unwrap(),
            FieldType::Array(Box::new(FieldType::Map(Box::new(FieldType::String))))
        );
        assert!("integer".parse::<FieldType>().is_err());
    }

    #[test]
    fn strings_conform_to_complex_types() {
        let text = Value::String("[1 2 3]".into());
        assert!(text.conforms_to(&FieldType::Array(Box::new(FieldType::Int))));
        assert!(!text.conforms_to(&FieldType::Int));
        assert!(Value::Null.conforms_to(&FieldType::Date));
        assert!(!Value::Long(3).conforms_to(&FieldType::Int));
    }

    #[test]
    fn infinities_print_as_input_literals() {
        assert_eq!(Value::Float(f32::INFINITY).to_string(), "Infinity");
        assert_eq!(Value::Double(f64::NEG_INFINITY).to_string(), "-Infinity");
        assert_eq!(Value::Double(-0.25).to_string(), "-0.25");
        let time = NaiveTime::from_hms_milli_opt(0, 0, 1, 500).unwrap();
        assert_eq!(Value::Time(time).to_string(), "00:00:01.500");
    }

    #[test]
    fn values_serialize_as_json() {
        let date = Value::Date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(serde_json::to_string(&date).unwrap(), "\"2024-01-15\"");
        assert_eq!(serde_json::to_string(&Value::Int(30)).unwrap(), "30");
        assert_eq!(serde_json::to_string(&Value::Null).unwrap(), "null");
        assert_eq!(serde_json::to_string(&Value::Char('x')).unwrap(), "\"x\"");
    }
}
