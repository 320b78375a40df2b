//! The EDN record reader.
//!
//! Pulls one record unit per call from a [`LineScanner`], parses it with
//! [`edn::parse_record`](crate::edn::parse_record), resolves every key against
//! the schema and converts every value with a [`ValueConverter`].
//!
//! ```text
//! ┌────────┐  unit  ┌───────────┐ entries ┌──────────────┐ values ┌────────┐
//! │Scanner │───────>│ EdnParser │────────>│ValueConverter│───────>│ Record │
//! └────────┘        └───────────┘         └──────────────┘        └────────┘
//! ```

use std::io::BufRead;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::convert::ValueConverter;
use crate::datatype::Value;
use crate::edn::{parse_record, RawValue};
use crate::error::{EdnReaderError, Result};
use crate::record::{Record, Schema};
use crate::scanner::LineScanner;
use crate::settings::{FormatSettings, ReaderSettings};

/// Text substituted for a `nil` value before conversion.
pub const NIL: &str = "NIL";

/// Removes the one-character sigil (`:` for keywords) from a map key.
pub fn strip_sigil(key: &str) -> &str {
    let mut chars = key.chars();
    chars.next();
    chars.as_str()
}

pub struct EdnRecordReader<R: BufRead> {
    schema: Arc<Schema>,
    converter: ValueConverter,
    scanner: LineScanner<R>,
    units_read: u64,
}

impl<R: BufRead> EdnRecordReader<R> {
    pub fn open(input: R, schema: Arc<Schema>, formats: &FormatSettings) -> Self {
        Self::with_scanner(LineScanner::new(input), schema, formats)
    }
    pub fn from_settings(input: R, schema: Arc<Schema>, settings: &ReaderSettings) -> Result<Self> {
        settings.validate()?;
        let scanner = LineScanner::with_separator(input, settings.separator_byte()?);
        Ok(Self::with_scanner(scanner, schema, &settings.formats()))
    }
    fn with_scanner(scanner: LineScanner<R>, schema: Arc<Schema>, formats: &FormatSettings) -> Self {
        debug!(fields = schema.len(), ?formats, "opened EDN record reader");
        Self {
            schema,
            converter: ValueConverter::new(formats),
            scanner,
            units_read: 0,
        }
    }
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }
    pub fn converter(&self) -> &ValueConverter {
        &self.converter
    }
    /// Number of record units pulled from the stream so far.
    pub fn units_read(&self) -> u64 {
        self.units_read
    }

    /// Reads the next record unit and builds one record from it.
    ///
    /// Returns `Ok(None)` at end of stream. Every failure, whether in the
    /// stream, the parser, key resolution or conversion, comes back as
    /// [`EdnReaderError::MalformedRecord`] wrapping the cause.
    pub fn next_record(&mut self, coerce_types: bool, drop_unknown_fields: bool) -> Result<Option<Record>> {
        let unit = match self.scanner.has_next() {
            Ok(false) => return Ok(None),
            Ok(true) => self.scanner.next(),
            Err(e) => Err(e),
        }
        .map_err(|e| EdnReaderError::malformed("Could not read EDN record unit", e))?;
        self.units_read += 1;
        info!(unit = %unit, "processing EDN record unit");
        match self.build_record(&unit, coerce_types, drop_unknown_fields) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                warn!(unit_number = self.units_read, error = %e, "malformed EDN record");
                Err(EdnReaderError::malformed("Error occurred while processing the record", e))
            }
        }
    }

    fn build_record(&self, unit: &str, coerce_types: bool, drop_unknown_fields: bool) -> Result<Record> {
        let entries = parse_record(unit)?;
        let mut values = Vec::with_capacity(entries.len());
        for entry in entries {
            let (key, raw) = entry.into_parts();
            let field = self.schema.field(strip_sigil(&key)).ok_or_else(|| EdnReaderError::FieldNotFound {
                field: strip_sigil(&key).to_string(),
            })?;
            let raw_text = match raw {
                RawValue::Null => {
                    debug!(field = field.name(), "got nil value while parsing EDN record");
                    NIL.to_string()
                }
                RawValue::Text(text) | RawValue::Nested(text) => text,
            };
            let value: Value = if coerce_types {
                self.converter.convert(Some(&raw_text), Some(field.field_type()), field.name())?
            } else {
                self.converter.convert_if_compatible(Some(&raw_text), Some(field.field_type()), field.name())
            };
            values.push((field.name().to_string(), value));
        }
        Record::new(Arc::clone(&self.schema), values, coerce_types, drop_unknown_fields)
    }

    /// Iterates records until end of stream.
    pub fn records(&mut self, coerce_types: bool, drop_unknown_fields: bool) -> Records<'_, R> {
        Records {
            reader: self,
            coerce_types,
            drop_unknown_fields,
            finished: false,
        }
    }

    /// Releases the input stream. Safe to call more than once.
    pub fn close(&mut self) {
        if !self.scanner.is_closed() {
            debug!(units_read = self.units_read, "closing EDN record reader");
        }
        self.scanner.close();
    }
    pub fn is_closed(&self) -> bool {
        self.scanner.is_closed()
    }
}

impl<R: BufRead> Drop for EdnRecordReader<R> {
    fn drop(&mut self) {
        self.close();
    }
}

pub struct Records<'a, R: BufRead> {
    reader: &'a mut EdnRecordReader<R>,
    coerce_types: bool,
    drop_unknown_fields: bool,
    finished: bool,
}

impl<R: BufRead> Iterator for Records<'_, R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.reader.next_record(self.coerce_types, self.drop_unknown_fields) {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                // a broken or closed stream will not recover
                if matches!(e.root_cause(), EdnReaderError::Stream(_) | EdnReaderError::Closed) {
                    self.finished = true;
                }
                Some(Err(e))
            }
        }
    }
}
