//! Type coercion of raw record text into declared field types.
//!
//! [`ValueConverter`] has two modes that share one preprocessing step
//! (quote stripping, empty text becomes [`Value::Null`]) and one coercion
//! routine:
//! * [`ValueConverter::convert`] coerces unconditionally and fails when the
//!   text cannot represent the target type.
//! * [`ValueConverter::convert_if_compatible`] only coerces scalar categories
//!   whose compatibility check passes, and otherwise hands back the original
//!   text untouched. It never fails.
//!
//! Both modes apply the same syntax checks, so they agree on every literal
//! that is valid for its type.

use bigdecimal::BigDecimal;
use lazy_static::lazy_static;
use regex::Regex;
use std::str::FromStr;

use crate::datatype::{FieldType, Value};
use crate::error::{EdnReaderError, Result};
use crate::format::{from_epoch_millis, LazyFormat, TemporalKind};
use crate::settings::FormatSettings;

lazy_static! {
    static ref INTEGRAL: Regex = Regex::new(r"^[+-]?[0-9]+$").unwrap();
    static ref FLOATING: Regex =
        Regex::new(r"^[+-]?(NaN|Infinity|([0-9]+\.?[0-9]*|\.[0-9]+)([eE][+-]?[0-9]+)?)$").unwrap();
}

/// Strips one pair of enclosing double quotes, if the text is longer than
/// one character and both ends are quotes.
pub fn trim_quotes(value: &str) -> &str {
    if value.len() > 1 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

fn parse_integral<T: FromStr>(text: &str) -> Option<T> {
    if INTEGRAL.is_match(text) {
        text.parse::<T>().ok()
    } else {
        None
    }
}

fn parse_floating<T: FromStr>(text: &str) -> Option<T> {
    if FLOATING.is_match(text) {
        text.parse::<T>().ok()
    } else {
        None
    }
}

fn parse_boolean(text: &str) -> Option<bool> {
    if text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn parse_char(text: &str) -> Option<char> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

#[derive(Debug)]
pub struct ValueConverter {
    date_format: LazyFormat,
    time_format: LazyFormat,
    timestamp_format: LazyFormat,
}

impl ValueConverter {
    pub fn new(formats: &FormatSettings) -> Self {
        Self {
            date_format: LazyFormat::new(TemporalKind::Date, formats.date_format()),
            time_format: LazyFormat::new(TemporalKind::Time, formats.time_format()),
            timestamp_format: LazyFormat::new(TemporalKind::Timestamp, formats.timestamp_format()),
        }
    }
    pub fn format(&self, kind: TemporalKind) -> &LazyFormat {
        match kind {
            TemporalKind::Date => &self.date_format,
            TemporalKind::Time => &self.time_format,
            TemporalKind::Timestamp => &self.timestamp_format,
        }
    }

    /// Unconditional coercion of `raw_value` into `target_type`.
    ///
    /// An absent value converts to `Null` and an absent type leaves the text
    /// as a string.
    pub fn convert(
        &self,
        raw_value: Option<&str>,
        target_type: Option<&FieldType>,
        field_name: &str,
    ) -> Result<Value> {
        let (value, target) = match (raw_value, target_type) {
            (None, _) => return Ok(Value::Null),
            (Some(value), None) => return Ok(Value::String(value.to_string())),
            (Some(value), Some(target)) => (value, target),
        };
        let trimmed = trim_quotes(value);
        if trimmed.is_empty() {
            return Ok(Value::Null);
        }
        self.coerce(trimmed, target, field_name)
    }

    /// Best-effort coercion: returns the original, unstripped text whenever
    /// the target is a string, a complex type, or the compatibility check
    /// for the target category fails.
    pub fn convert_if_compatible(
        &self,
        raw_value: Option<&str>,
        target_type: Option<&FieldType>,
        field_name: &str,
    ) -> Value {
        let (value, target) = match (raw_value, target_type) {
            (None, _) => return Value::Null,
            (Some(value), None) => return Value::String(value.to_string()),
            (Some(value), Some(target)) => (value, target),
        };
        let trimmed = trim_quotes(value);
        if trimmed.is_empty() {
            return Value::Null;
        }
        let coerced = match target {
            FieldType::String => None,
            FieldType::Boolean
            | FieldType::Int
            | FieldType::Long
            | FieldType::Float
            | FieldType::Double
            | FieldType::Byte
            | FieldType::Char
            | FieldType::Short
            | FieldType::Date
            | FieldType::Time
            | FieldType::Timestamp
                if self.is_compatible(trimmed, target) =>
            {
                self.coerce(trimmed, target, field_name).ok()
            }
            _ => None,
        };
        coerced.unwrap_or_else(|| Value::String(value.to_string()))
    }

    /// Whether `text` (already quote-stripped) can be coerced into `target`.
    pub fn is_compatible(&self, text: &str, target: &FieldType) -> bool {
        match target {
            FieldType::String => true,
            FieldType::Boolean => parse_boolean(text).is_some(),
            FieldType::Int => parse_integral::<i32>(text).is_some(),
            FieldType::Long => parse_integral::<i64>(text).is_some(),
            FieldType::Byte => parse_integral::<i8>(text).is_some(),
            FieldType::Short => parse_integral::<i16>(text).is_some(),
            FieldType::Float => parse_floating::<f32>(text).is_some(),
            FieldType::Double => parse_floating::<f64>(text).is_some(),
            FieldType::Char => parse_char(text).is_some(),
            FieldType::Decimal => BigDecimal::from_str(text).is_ok(),
            FieldType::Date => self.coerce_temporal(text, TemporalKind::Date, target, "").is_ok(),
            FieldType::Time => self.coerce_temporal(text, TemporalKind::Time, target, "").is_ok(),
            FieldType::Timestamp => {
                self.coerce_temporal(text, TemporalKind::Timestamp, target, "").is_ok()
            }
            FieldType::Array(_) | FieldType::Map(_) | FieldType::Record(_) => true,
        }
    }

    fn coerce(&self, text: &str, target: &FieldType, field_name: &str) -> Result<Value> {
        let failure = |reason: &str| EdnReaderError::Conversion {
            field: field_name.to_string(),
            value: text.to_string(),
            target: target.to_string(),
            reason: reason.to_string(),
        };
        match target {
            FieldType::String => Ok(Value::String(text.to_string())),
            FieldType::Boolean => parse_boolean(text)
                .map(Value::Boolean)
                .ok_or_else(|| failure("expected true or false")),
            FieldType::Int => parse_integral(text)
                .map(Value::Int)
                .ok_or_else(|| failure("not a 32-bit integer")),
            FieldType::Long => parse_integral(text)
                .map(Value::Long)
                .ok_or_else(|| failure("not a 64-bit integer")),
            FieldType::Byte => parse_integral(text)
                .map(Value::Byte)
                .ok_or_else(|| failure("not an 8-bit integer")),
            FieldType::Short => parse_integral(text)
                .map(Value::Short)
                .ok_or_else(|| failure("not a 16-bit integer")),
            FieldType::Float => parse_floating(text)
                .map(Value::Float)
                .ok_or_else(|| failure("not a floating point number")),
            FieldType::Double => parse_floating(text)
                .map(Value::Double)
                .ok_or_else(|| failure("not a floating point number")),
            FieldType::Char => parse_char(text)
                .map(Value::Char)
                .ok_or_else(|| failure("expected exactly one character")),
            FieldType::Decimal => BigDecimal::from_str(text)
                .map(Value::Decimal)
                .map_err(|e| failure(&e.to_string())),
            FieldType::Date => self.coerce_temporal(text, TemporalKind::Date, target, field_name),
            FieldType::Time => self.coerce_temporal(text, TemporalKind::Time, target, field_name),
            FieldType::Timestamp => {
                self.coerce_temporal(text, TemporalKind::Timestamp, target, field_name)
            }
            // complex values stay opaque
            FieldType::Array(_) | FieldType::Map(_) | FieldType::Record(_) => {
                Ok(Value::String(text.to_string()))
            }
        }
    }

    // Integer text is read as epoch milliseconds, anything else goes
    // through the configured pattern for the kind. Without a configured
    // pattern, epoch milliseconds are not the only accepted form: the
    // kind's default pattern applies as well.
    fn coerce_temporal(
        &self,
        text: &str,
        kind: TemporalKind,
        target: &FieldType,
        field_name: &str,
    ) -> Result<Value> {
        let failure = |reason: String| EdnReaderError::Conversion {
            field: field_name.to_string(),
            value: text.to_string(),
            target: target.to_string(),
            reason,
        };
        if INTEGRAL.is_match(text) {
            let moment = from_epoch_millis(text)
                .ok_or_else(|| failure("epoch milliseconds out of range".to_string()))?;
            return Ok(match kind {
                TemporalKind::Date => Value::Date(moment.date()),
                TemporalKind::Time => Value::Time(moment.time()),
                TemporalKind::Timestamp => Value::Timestamp(moment),
            });
        }
        let lazy = self.format(kind);
        let format = lazy.get().map_err(|e| failure(e.to_string()))?;
        let parsed = match kind {
            TemporalKind::Date => format.parse_date(text).map(Value::Date),
            TemporalKind::Time => format.parse_time(text).map(Value::Time),
            TemporalKind::Timestamp => format.parse_timestamp(text).map(Value::Timestamp),
        };
        parsed.map_err(|e| failure(format!("does not match format '{}': {}", format.pattern(), e)))
    }
}
