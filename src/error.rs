use thiserror::Error;

#[derive(Error, Debug)]
pub enum EdnReaderError {
    #[error("Parse error: {message}")]
    Parse { message: String, line: Option<usize>, col: Option<usize> },
    #[error("Field not found in schema: {field}")]
    FieldNotFound { field: String },
    #[error("Cannot convert value [{value}] to {target} for field {field}: {reason}")]
    Conversion { field: String, value: String, target: String, reason: String },
    #[error("Stream error: {0}")]
    Stream(#[from] std::io::Error),
    #[error("Schema validation failed for field {field}: {message}")]
    SchemaValidation { field: String, message: String },
    #[error("Config error: {0}")]
    Config(String),
    #[error("Reader is closed")]
    Closed,
    #[error("No further record unit in stream")]
    Exhausted,
    #[error("{message}: {cause}")]
    MalformedRecord { message: String, #[source] cause: Box<EdnReaderError> },
}

impl EdnReaderError {
    pub fn malformed(message: impl Into<String>, cause: EdnReaderError) -> Self {
        Self::MalformedRecord { message: message.into(), cause: Box::new(cause) }
    }
    /// Innermost error, unwrapping any `MalformedRecord` layers.
    pub fn root_cause(&self) -> &EdnReaderError {
        match self {
            Self::MalformedRecord { cause, .. } => cause.root_cause(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, EdnReaderError>;

// Helper conversions
impl From<config::ConfigError> for EdnReaderError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}
impl From<pest::error::Error<crate::edn::Rule>> for EdnReaderError {
    fn from(e: pest::error::Error<crate::edn::Rule>) -> Self {
        let (line, col) = match e.line_col {
            pest::error::LineColLocation::Pos((l, c)) => (l, c),
            pest::error::LineColLocation::Span((l, c), _) => (l, c),
        };
        Self::Parse { message: e.variant.message().to_string(), line: Some(line), col: Some(col) }
    }
}
