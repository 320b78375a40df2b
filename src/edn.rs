//! Structural parsing of one EDN record unit.
//!
//! A record unit must hold exactly one map literal. Its entries come back in
//! source order as [`RawEntry`] values whose keys are the key's text (sigil
//! included) and whose values are a closed [`RawValue`] variant. Scalars are
//! rendered to their plain text, collections and tagged elements keep their
//! source text and are otherwise opaque.

use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser;
use std::collections::HashSet;

use crate::error::{EdnReaderError, Result};
use crate::record::NameHasher;

#[derive(Parser)]
#[grammar = "edn.pest"]
pub struct EdnParser;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    /// `nil`
    Null,
    /// A scalar rendered as text.
    Text(String),
    /// A collection or tagged element, as written.
    Nested(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    key: String,
    value: RawValue,
}

impl RawEntry {
    pub fn into_parts(self) -> (String, RawValue) {
        (self.key, self.value)
    }
}

fn parse_error(pair: &Pair<Rule>, message: String) -> EdnReaderError {
    let (line, col) = pair.line_col();
    EdnReaderError::Parse { message, line: Some(line), col: Some(col) }
}

/// Parses `unit` as a single map literal.
pub fn parse_record(unit: &str) -> Result<Vec<RawEntry>> {
    let record = EdnParser::parse(Rule::record, unit)?
        .next()
        .ok_or_else(|| EdnReaderError::Parse { message: "empty record unit".into(), line: None, col: None })?;
    let map = record
        .into_inner()
        .find(|pair| pair.as_rule() == Rule::map)
        .ok_or_else(|| EdnReaderError::Parse { message: "expected a map literal".into(), line: None, col: None })?;

    let mut seen = HashSet::<String, NameHasher>::default();
    let mut entries = Vec::new();
    for entry in map.into_inner() {
        let mut parts = entry.into_inner();
        let (key, value) = match (parts.next(), parts.next()) {
            (Some(key), Some(value)) => (key, value),
            _ => return Err(EdnReaderError::Parse { message: "incomplete map entry".into(), line: None, col: None }),
        };
        if !seen.insert(key.as_str().to_string()) {
            return Err(parse_error(&key, format!("duplicate map key {}", key.as_str())));
        }
        let key_text = match render(&key)? {
            RawValue::Null => return Err(parse_error(&key, "map key must not be nil".into())),
            RawValue::Text(text) | RawValue::Nested(text) => text,
        };
        entries.push(RawEntry { key: key_text, value: render(&value)? });
    }
    Ok(entries)
}

fn render(pair: &Pair<Rule>) -> Result<RawValue> {
    let source = pair.as_str();
    let value = match pair.as_rule() {
        Rule::nil => RawValue::Null,
        Rule::boolean | Rule::keyword | Rule::symbol => RawValue::Text(source.to_string()),
        Rule::integer => RawValue::Text(plain_number(source, 'N')),
        Rule::float => RawValue::Text(plain_number(source, 'M')),
        Rule::string => {
            let inner = pair.clone().into_inner().next().map(|p| p.as_str()).unwrap_or("");
            RawValue::Text(unescape(inner).map_err(|message| parse_error(pair, message))?)
        }
        Rule::character => RawValue::Text(character(source).map_err(|message| parse_error(pair, message))?.to_string()),
        Rule::map | Rule::list | Rule::vector | Rule::set | Rule::tagged => RawValue::Nested(source.to_string()),
        other => return Err(parse_error(pair, format!("unexpected {:?}", other))),
    };
    Ok(value)
}

// drops a leading plus sign and the arbitrary precision suffix
fn plain_number(source: &str, suffix: char) -> String {
    let unsigned = source.strip_prefix('+').unwrap_or(source);
    unsigned.strip_suffix(suffix).unwrap_or(unsigned).to_string()
}

fn unicode_escape(hex: &str) -> std::result::Result<char, String> {
    u32::from_str_radix(hex, 16)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| format!("invalid unicode escape \\u{}", hex))
}

fn unescape(inner: &str) -> std::result::Result<String, String> {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                out.push(unicode_escape(&hex)?);
            }
            Some(other) => return Err(format!("invalid escape \\{} in string", other)),
            None => return Err("dangling escape at end of string".into()),
        }
    }
    Ok(out)
}

fn character(source: &str) -> std::result::Result<char, String> {
    let name = source.strip_prefix('\\').unwrap_or(source);
    match name {
        "newline" => Ok('\n'),
        "return" => Ok('\r'),
        "space" => Ok(' '),
        "tab" => Ok('\t'),
        _ if name.len() == 5 && name.starts_with('u') => unicode_escape(&name[1..]),
        _ => {
            let mut chars = name.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(c),
                _ => Err(format!("invalid character literal {}", source)),
            }
        }
    }
}
