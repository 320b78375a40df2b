// config lets you read a separate config file
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::error::{EdnReaderError, Result};
use crate::format::DateTimeFormat;

pub const ENVIRONMENT_PREFIX: &str = "EDNREADER";

// ------------- Formats -------------

/// Date, time and timestamp patterns. Empty patterns are normalized to
/// absent, meaning default resolution for that kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatSettings {
    date_format: Option<String>,
    time_format: Option<String>,
    timestamp_format: Option<String>,
}

fn normalize(pattern: Option<&str>) -> Option<String> {
    pattern.filter(|p| !p.is_empty()).map(str::to_string)
}

impl FormatSettings {
    pub fn new(date_format: Option<&str>, time_format: Option<&str>, timestamp_format: Option<&str>) -> Self {
        Self {
            date_format: normalize(date_format),
            time_format: normalize(time_format),
            timestamp_format: normalize(timestamp_format),
        }
    }
    pub fn date_format(&self) -> Option<&str> {
        self.date_format.as_deref()
    }
    pub fn time_format(&self) -> Option<&str> {
        self.time_format.as_deref()
    }
    pub fn timestamp_format(&self) -> Option<&str> {
        self.timestamp_format.as_deref()
    }
    /// Compiles every configured pattern once, so a bad pattern is reported
    /// at load time rather than on the first record that needs it.
    pub fn validate(&self) -> Result<()> {
        for pattern in [self.date_format(), self.time_format(), self.timestamp_format()]
            .into_iter()
            .flatten()
        {
            DateTimeFormat::compile(pattern)?;
        }
        Ok(())
    }
}

// ------------- Reader -------------

fn default_separator() -> String {
    "\n".to_string()
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReaderSettings {
    #[serde(default)]
    date_format: Option<String>,
    #[serde(default)]
    time_format: Option<String>,
    #[serde(default)]
    timestamp_format: Option<String>,
    #[serde(default = "default_separator")]
    record_separator: String,
    #[serde(default = "default_true")]
    coerce_types: bool,
    #[serde(default = "default_true")]
    drop_unknown_fields: bool,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            date_format: None,
            time_format: None,
            timestamp_format: None,
            record_separator: default_separator(),
            coerce_types: true,
            drop_unknown_fields: true,
        }
    }
}

impl ReaderSettings {
    /// Layers defaults, then the settings file (if given), then environment
    /// variables prefixed with `EDNREADER_`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("record_separator", default_separator())?
            .set_default("coerce_types", true)?
            .set_default("drop_unknown_fields", true)?;
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        let settings = builder
            .add_source(Environment::with_prefix(ENVIRONMENT_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize::<ReaderSettings>()?;
        settings.validate()?;
        Ok(settings)
    }
    pub fn validate(&self) -> Result<()> {
        self.separator_byte()?;
        self.formats().validate()
    }
    pub fn formats(&self) -> FormatSettings {
        FormatSettings::new(
            self.date_format.as_deref(),
            self.time_format.as_deref(),
            self.timestamp_format.as_deref(),
        )
    }
    /// The record separator, which must be a single ASCII character.
    pub fn separator_byte(&self) -> Result<u8> {
        match self.record_separator.as_bytes() {
            [b] if b.is_ascii() => Ok(*b),
            _ => Err(EdnReaderError::Config(format!(
                "record_separator must be a single ASCII character, got {:?}",
                self.record_separator
            ))),
        }
    }
    pub fn coerce_types(&self) -> bool {
        self.coerce_types
    }
    pub fn drop_unknown_fields(&self) -> bool {
        self.drop_unknown_fields
    }
    pub fn with_formats(mut self, formats: FormatSettings) -> Self {
        self.date_format = formats.date_format;
        self.time_format = formats.time_format;
        self.timestamp_format = formats.timestamp_format;
        self
    }
    pub fn with_record_separator(mut self, separator: char) -> Self {
        self.record_separator = separator.to_string();
        self
    }
    pub fn with_coerce_types(mut self, coerce_types: bool) -> Self {
        self.coerce_types = coerce_types;
        self
    }
    pub fn with_drop_unknown_fields(mut self, drop_unknown_fields: bool) -> Self {
        self.drop_unknown_fields = drop_unknown_fields;
        self
    }
}
