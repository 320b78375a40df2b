use std::io::BufRead;

use crate::error::{EdnReaderError, Result};

const BYTE_ORDER_MARK: &str = "\u{feff}";

/// Splits a character stream into record units on a one-byte separator.
///
/// At most one unit is read ahead. The separator is not part of the unit, and
/// a separator that ends the stream does not produce a trailing empty unit.
/// A byte-order mark opening the stream is dropped.
pub struct LineScanner<R: BufRead> {
    input: Option<R>,
    separator: u8,
    peeked: Option<String>,
    at_start: bool,
}

impl<R: BufRead> LineScanner<R> {
    pub fn new(input: R) -> Self {
        Self::with_separator(input, b'\n')
    }
    pub fn with_separator(input: R, separator: u8) -> Self {
        Self {
            input: Some(input),
            separator,
            peeked: None,
            at_start: true,
        }
    }
    pub fn has_next(&mut self) -> Result<bool> {
        if self.peeked.is_some() {
            return Ok(true);
        }
        let input = self.input.as_mut().ok_or(EdnReaderError::Closed)?;
        let mut buffer = Vec::new();
        if input.read_until(self.separator, &mut buffer)? == 0 {
            return Ok(false);
        }
        if buffer.last() == Some(&self.separator) {
            buffer.pop();
        }
        let mut unit = String::from_utf8(buffer)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        if self.at_start {
            self.at_start = false;
            if let Some(rest) = unit.strip_prefix(BYTE_ORDER_MARK) {
                unit = rest.to_string();
            }
        }
        self.peeked = Some(unit);
        Ok(true)
    }
    pub fn next(&mut self) -> Result<String> {
        if !self.has_next()? {
            return Err(EdnReaderError::Exhausted);
        }
        self.peeked.take().ok_or(EdnReaderError::Exhausted)
    }
    /// Releases the underlying stream. Closing twice is a no-op.
    pub fn close(&mut self) {
        self.input = None;
        self.peeked = None;
    }
    pub fn is_closed(&self) -> bool {
        self.input.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn units(input: &str) -> Vec<String> {
        let mut scanner = LineScanner::new(Cursor::new(input.as_bytes().to_vec()));
        let mut out = Vec::new();
        while scanner.has_next().unwrap() {
            out.push(scanner.next().unwrap());
        }
        out
    }

    #[test]
    fn splits_on_line_feed() {
        assert_eq!(units("{:a 1}\n{:a 2}"), vec!["{:a 1}", "{:a 2}"]);
        assert_eq!(units("{:a 1}\n{:a 2}\n"), vec!["{:a 1}", "{:a 2}"]);
        assert_eq!(units("a\n\nb"), vec!["a", "", "b"]);
        assert!(units("").is_empty());
    }

    #[test]
    fn has_next_does_not_consume() {
        let mut scanner = LineScanner::new(Cursor::new(b"x\ny".to_vec()));
        assert!(scanner.has_next().unwrap());
        assert!(scanner.has_next().unwrap());
        assert_eq!(scanner.next().unwrap(), "x");
        assert_eq!(scanner.next().unwrap(), "y");
        assert!(matches!(scanner.next(), Err(EdnReaderError::Exhausted)));
    }

    #[test]
    fn custom_separator_and_bom() {
        let mut scanner = LineScanner::with_separator(Cursor::new("\u{feff}{:a 1}|{:a 2}".as_bytes().to_vec()), b'|');
        assert_eq!(scanner.next().unwrap(), "{:a 1}");
        assert_eq!(scanner.next().unwrap(), "{:a 2}");
    }

    #[test]
    fn invalid_utf8_is_a_stream_error() {
        let mut scanner = LineScanner::new(Cursor::new(vec![0xff, 0xfe, b'\n']));
        assert!(matches!(scanner.has_next(), Err(EdnReaderError::Stream(_))));
    }

    #[test]
    fn close_is_idempotent() {
        let mut scanner = LineScanner::new(Cursor::new(b"x".to_vec()));
        scanner.close();
        scanner.close();
        assert!(scanner.is_closed());
        assert!(matches!(scanner.has_next(), Err(EdnReaderError::Closed)));
    }
}
