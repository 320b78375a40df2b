//! Reads line-delimited EDN maps and writes them as JSON lines.
//!
//! ```text
//! ednreader --schema person.json [--config ednreader.json] [input.edn]
//! ```
//!
//! The schema file is a JSON array of fields, e.g.
//! `[{"name": "name", "type": "string"}, {"name": "age", "type": "int", "nullable": false}]`.
//! Without an input path, records are read from stdin.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ednreader::datatype::FieldType;
use ednreader::reader::EdnRecordReader;
use ednreader::record::{Field, Schema};
use ednreader::settings::ReaderSettings;
use ednreader::{EdnReaderError, Result};

const USAGE: &str = "usage: ednreader --schema <schema.json> [--config <settings>] [input]";

#[derive(Deserialize)]
struct FieldSpec {
    name: String,
    #[serde(rename = "type")]
    field_type: String,
    #[serde(default = "nullable_by_default")]
    nullable: bool,
}
fn nullable_by_default() -> bool {
    true
}

#[derive(Debug, Default)]
struct Arguments {
    schema: Option<PathBuf>,
    config: Option<PathBuf>,
    input: Option<PathBuf>,
}

fn parse_arguments(mut args: impl Iterator<Item = String>) -> std::result::Result<Arguments, String> {
    let mut arguments = Arguments::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--schema" => arguments.schema = Some(args.next().ok_or("--schema needs a path")?.into()),
            "--config" => arguments.config = Some(args.next().ok_or("--config needs a path")?.into()),
            "-h" | "--help" => return Err(USAGE.to_string()),
            other if other.starts_with("--") => return Err(format!("unknown option {}\n{}", other, USAGE)),
            other if arguments.input.is_none() => arguments.input = Some(other.into()),
            other => return Err(format!("unexpected argument {}\n{}", other, USAGE)),
        }
    }
    if arguments.schema.is_none() {
        return Err(USAGE.to_string());
    }
    Ok(arguments)
}

fn load_schema(path: &Path) -> Result<Schema> {
    let file = File::open(path)?;
    let specs: Vec<FieldSpec> = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| EdnReaderError::Config(format!("invalid schema file {}: {}", path.display(), e)))?;
    let fields = specs
        .into_iter()
        .map(|spec| {
            let field_type = spec
                .field_type
                .parse::<FieldType>()
                .map_err(|e| EdnReaderError::Config(format!("field {}: {}", spec.name, e)))?;
            Ok(if spec.nullable {
                Field::new(spec.name, field_type)
            } else {
                Field::required(spec.name, field_type)
            })
        })
        .collect::<Result<Vec<Field>>>()?;
    Schema::new(fields)
}

fn run(arguments: Arguments) -> Result<u64> {
    let settings = ReaderSettings::load(arguments.config.as_deref())?;
    let schema_path = arguments
        .schema
        .ok_or_else(|| EdnReaderError::Config("no schema given".into()))?;
    let schema = Arc::new(load_schema(&schema_path)?);
    let input: Box<dyn BufRead> = match &arguments.input {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(io::stdin().lock()),
    };
    let mut reader = EdnRecordReader::from_settings(input, schema, &settings)?;
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let mut written = 0;
    for record in reader.records(settings.coerce_types(), settings.drop_unknown_fields()) {
        let record = record?;
        serde_json::to_writer(&mut out, &record).map_err(io::Error::from)?;
        out.write_all(b"\n")?;
        written += 1;
    }
    out.flush()?;
    reader.close();
    Ok(written)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let arguments = match parse_arguments(std::env::args().skip(1)) {
        Ok(arguments) => arguments,
        Err(message) => {
            eprintln!("{}", message);
            process::exit(2);
        }
    };
    match run(arguments) {
        Ok(written) => info!(records = written, "done"),
        Err(e) => {
            error!(error = %e, "ednreader failed");
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn arguments_need_a_schema() {
        assert!(parse_arguments(args(&["input.edn"])).is_err());
        let parsed = parse_arguments(args(&["--schema", "s.json", "in.edn", "--config", "c.toml"])).unwrap();
        assert_eq!(parsed.schema, Some(PathBuf::from("s.json")));
        assert_eq!(parsed.config, Some(PathBuf::from("c.toml")));
        assert_eq!(parsed.input, Some(PathBuf::from("in.edn")));
        assert!(parse_arguments(args(&["--schema", "s.json", "a", "b"])).is_err());
        assert!(parse_arguments(args(&["--schema"])).is_err());
    }
}
