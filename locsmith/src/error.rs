//! All error types for the locsmith crate.
//!
//! These are returned from all fallible operations (parsing, flattening,
//! chunk translation, merging, serialization).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("unknown format `{0}`")]
    UnknownFormat(String),

    /// Parse input is not a supported top-level shape (object/mapping).
    /// Fatal for the file; other files in the run continue.
    #[error("invalid structure: {0}")]
    InvalidStructure(String),

    /// A leaf value of an unsupported kind was found during flattening.
    #[error("invalid translation value at \"{path}\": expected string or object, got {found}")]
    InvalidValue { path: String, found: &'static str },

    /// Codec encode/decode mismatch. Internal-invariant violation, not
    /// user-recoverable.
    #[error("key encoding error: {0}")]
    Encoding(String),

    /// A key received no translation after the single retry. Per-key;
    /// reported, does not fail the chunk.
    #[error("no translation produced for key `{key}` in {source_file}")]
    Unresolved { key: String, source_file: String },

    /// A chunk exhausted its external call retry budget. Other chunks and
    /// locales proceed; previously translated content for the affected keys
    /// is kept.
    #[error("chunk {chunk_index} for {source_file} ({locale}) failed after {attempts} attempt(s): {message}")]
    ChunkFailed {
        locale: String,
        source_file: String,
        chunk_index: usize,
        attempts: u32,
        message: String,
    },

    #[error("translation backend error: {message}")]
    Backend {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("CSV parse error: {0}")]
    CsvParse(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates a new backend error with optional source error
    pub fn backend_error(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Error::Backend {
            message: message.into(),
            source,
        }
    }

    /// Creates a new invalid-structure error
    pub fn invalid_structure(message: impl Into<String>) -> Self {
        Error::InvalidStructure(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_unknown_format_error() {
        let error = Error::UnknownFormat("ini".to_string());
        assert_eq!(error.to_string(), "unknown format `ini`");
    }

    #[test]
    fn test_invalid_value_error_names_path() {
        let error = Error::InvalidValue {
            path: "menu.items[2]".to_string(),
            found: "number",
        };
        let display = error.to_string();
        assert!(display.contains("menu.items[2]"));
        assert!(display.contains("number"));
    }

    #[test]
    fn test_chunk_failed_error() {
        let error = Error::ChunkFailed {
            locale: "fr".to_string(),
            source_file: "locales/en.json".to_string(),
            chunk_index: 3,
            attempts: 4,
            message: "connection reset".to_string(),
        };
        let display = error.to_string();
        assert!(display.contains("chunk 3"));
        assert!(display.contains("fr"));
        assert!(display.contains("connection reset"));
    }

    #[test]
    fn test_backend_error_with_source() {
        let source = Box::new(io::Error::new(io::ErrorKind::TimedOut, "timed out"));
        let error = Error::backend_error("request failed", Some(source));
        assert!(error.to_string().contains("request failed"));
    }

    #[test]
    fn test_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = Error::Io(io_error);
        assert!(error.to_string().contains("I/O error"));
    }

    #[test]
    fn test_error_display_is_nonempty() {
        let errors = vec![
            Error::UnknownFormat("test".to_string()),
            Error::InvalidStructure("test".to_string()),
            Error::Encoding("test".to_string()),
            Error::Config("test".to_string()),
        ];

        for error in errors {
            let display = format!("{}", error);
            assert!(!display.is_empty());
            assert!(display.contains("test"));
        }
    }
}
