//! Ednreader – reads line-delimited EDN maps into typed records.
//!
//! Every line of input holds one EDN map literal whose keys are keywords
//! naming fields of a caller-supplied schema:
//!
//! ```text
//! {:name "Alice" :age 30 :born "1994-03-01"}
//! {:name "Bob" :age nil}
//! ```
//!
//! Each line becomes one [`record::Record`] whose values have been converted
//! to the declared [`datatype::FieldType`] of their field.
//!
//! ## Modules
//! * [`reader`] – The [`reader::EdnRecordReader`], pulling one record per call.
//! * [`scanner`] – Splits the input stream into record units.
//! * [`edn`] – Pest based parser turning one unit into raw key/value entries.
//!   Grammar details live in `edn.pest`.
//! * [`convert`] – The [`convert::ValueConverter`] and its compatibility checks.
//! * [`format`] – Lazily compiled date, time and timestamp patterns.
//! * [`datatype`] – Declared field types and converted values.
//! * [`record`] – Fields, schemas and output records.
//! * [`settings`] – Reader settings loaded through the `config` crate.
//!
//! ## Strict and lenient reading
//! `next_record(coerce_types, drop_unknown_fields)` converts every value
//! unconditionally when `coerce_types` is true, and fails the record when a
//! value cannot be represented. With `coerce_types` false, values are only
//! converted when they are compatible with their field type and are left as
//! their original text otherwise.
//!
//! A `nil` value is converted as the text `NIL`. A key that names no field of
//! the schema always fails the record.
//!
//! ## Quick Start
//! ```
//! use std::io::Cursor;
//! use std::sync::Arc;
//! use ednreader::datatype::{FieldType, Value};
//! use ednreader::reader::EdnRecordReader;
//! use ednreader::record::{Field, Schema};
//! use ednreader::settings::FormatSettings;
//!
//! let schema = Schema::new(vec![
//!     Field::new("name", FieldType::String),
//!     Field::new("age", FieldType::Int),
//! ]).unwrap();
//! let input = Cursor::new("{:name \"Alice\" :age 30}\n");
//! let mut reader = EdnRecordReader::open(input, Arc::new(schema), &FormatSettings::default());
//! let record = reader.next_record(true, true).unwrap().unwrap();
//! assert_eq!(record.get("age"), Some(&Value::Int(30)));
//! assert!(reader.next_record(true, true).unwrap().is_none());
//! reader.close();
//! ```
//!
//! ## Logging
//! Diagnostics are emitted through `tracing`: each record unit at `info`,
//! `nil` substitutions and reader lifecycle at `debug`, malformed records at
//! `warn`. Install a subscriber to see them.

pub mod convert;
pub mod datatype;
pub mod edn;
pub mod error;
pub mod format;
pub mod reader;
pub mod record;
pub mod scanner;
pub mod settings;

pub use error::{EdnReaderError, Result};
