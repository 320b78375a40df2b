//! Temporal formats for DATE, TIME and TIMESTAMP conversion.
//!
//! A pattern is a chrono strftime string. Compiling one into format items is
//! the expensive step, so a [`LazyFormat`] captures the pattern when a reader
//! opens and compiles it at most once, on first use.

use chrono::format::{parse, Item, Parsed, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use std::cell::OnceCell;
use std::fmt;

use crate::error::{EdnReaderError, Result};

pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";
// `%.f` also matches no fraction at all
pub const DEFAULT_TIME_FORMAT: &str = "%H:%M:%S%.f";
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalKind {
    Date,
    Time,
    Timestamp,
}

impl TemporalKind {
    pub fn default_pattern(&self) -> &'static str {
        match self {
            TemporalKind::Date => DEFAULT_DATE_FORMAT,
            TemporalKind::Time => DEFAULT_TIME_FORMAT,
            TemporalKind::Timestamp => DEFAULT_TIMESTAMP_FORMAT,
        }
    }
}

impl fmt::Display for TemporalKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TemporalKind::Date => write!(f, "DATE"),
            TemporalKind::Time => write!(f, "TIME"),
            TemporalKind::Timestamp => write!(f, "TIMESTAMP"),
        }
    }
}

/// A compiled strftime pattern.
#[derive(Debug, Clone)]
pub struct DateTimeFormat {
    pattern: String,
    items: Vec<Item<'static>>,
}

impl DateTimeFormat {
    pub fn compile(pattern: &str) -> Result<Self> {
        let items = StrftimeItems::new(pattern)
            .parse_to_owned()
            .map_err(|e| EdnReaderError::Config(format!("invalid format pattern '{}': {}", pattern, e)))?;
        Ok(Self {
            pattern: pattern.to_string(),
            items,
        })
    }
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
    fn parsed(&self, text: &str) -> chrono::ParseResult<Parsed> {
        let mut parsed = Parsed::new();
        parse(&mut parsed, text, self.items.iter())?;
        Ok(parsed)
    }
    pub fn parse_date(&self, text: &str) -> chrono::ParseResult<NaiveDate> {
        self.parsed(text)?.to_naive_date()
    }
    pub fn parse_time(&self, text: &str) -> chrono::ParseResult<NaiveTime> {
        self.parsed(text)?.to_naive_time()
    }
    pub fn parse_timestamp(&self, text: &str) -> chrono::ParseResult<NaiveDateTime> {
        self.parsed(text)?.to_naive_datetime_with_offset(0)
    }
}

/// A pattern for one temporal kind, compiled on first use and then reused.
///
/// An absent pattern falls back to the kind's default pattern.
#[derive(Debug)]
pub struct LazyFormat {
    kind: TemporalKind,
    pattern: Option<String>,
    compiled: OnceCell<DateTimeFormat>,
}

impl LazyFormat {
    /// Empty patterns are treated as absent.
    pub fn new(kind: TemporalKind, pattern: Option<&str>) -> Self {
        Self {
            kind,
            pattern: pattern.filter(|p| !p.is_empty()).map(str::to_string),
            compiled: OnceCell::new(),
        }
    }
    /// The pattern that will actually be used.
    pub fn effective_pattern(&self) -> &str {
        self.pattern.as_deref().unwrap_or(self.kind.default_pattern())
    }
    pub fn is_compiled(&self) -> bool {
        self.compiled.get().is_some()
    }
    /// Compiles on first call. A pattern that fails to compile is not cached.
    pub fn get(&self) -> Result<&DateTimeFormat> {
        if let Some(format) = self.compiled.get() {
            return Ok(format);
        }
        let format = DateTimeFormat::compile(self.effective_pattern())?;
        Ok(self.compiled.get_or_init(|| format))
    }
}

/// Interprets integer text as milliseconds since the Unix epoch (UTC).
pub(crate) fn from_epoch_millis(text: &str) -> Option<NaiveDateTime> {
    let millis = text.parse::<i64>().ok()?;
    DateTime::<Utc>::from_timestamp_millis(millis).map(|dt| dt.naive_utc())
}
