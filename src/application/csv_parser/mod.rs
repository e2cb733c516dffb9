pub mod service;

pub use service::{CsvParseError, CsvParserService, ParsedRow};
