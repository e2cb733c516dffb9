//! CSV parser service
//!
//! Turns a semicolon-delimited upload into header-keyed rows.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

/// Field delimiter of accepted uploads
pub const CSV_DELIMITER: u8 = b';';

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// One data row: header -> value, in header order
pub type ParsedRow = Map<String, Value>;

#[derive(Debug, Error)]
pub enum CsvParseError {
    #[error("File is not valid UTF-8")]
    InvalidEncoding,

    #[error("Unclosed quote in CSV input")]
    UnclosedQuote,

    #[error("Invalid CSV: {0}")]
    Malformed(#[from] csv::Error),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CsvParserService;

impl CsvParserService {
    pub fn new() -> Self {
        Self
    }

    /// Parse raw upload bytes.
    ///
    /// The first record is the header. Empty lines are skipped and a
    /// leading BOM is ignored. Every data row must have as many fields as
    /// the header.
    pub fn parse(&self, bytes: &[u8]) -> Result<Vec<ParsedRow>, CsvParseError> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        let text = std::str::from_utf8(bytes).map_err(|_| CsvParseError::InvalidEncoding)?;

        if has_unclosed_quote(text) {
            return Err(CsvParseError::UnclosedQuote);
        }

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(CSV_DELIMITER)
            .has_headers(true)
            .flexible(false)
            .from_reader(text.as_bytes());

        let headers = reader.headers()?.clone();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let row: ParsedRow = headers
                .iter()
                .zip(record.iter())
                .map(|(h, v)| (h.to_string(), Value::String(v.to_string())))
                .collect();
            rows.push(row);
        }

        debug!(rows = rows.len(), columns = headers.len(), "CSV parsed");
        Ok(rows)
    }
}

/// Whether the input ends inside a quoted field.
///
/// A quote only opens a quoted field at the start of a field. Inside one,
/// `""` is an escaped quote.
fn has_unclosed_quote(text: &str) -> bool {
    let mut in_quotes = false;
    let mut at_field_start = true;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            continue;
        }
        match c {
            '"' if at_field_start => {
                in_quotes = true;
                at_field_start = false;
            }
            ';' | '\n' | '\r' => at_field_start = true,
            _ => at_field_start = false,
        }
    }

    in_quotes
}
