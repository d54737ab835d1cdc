//! Support for key,value CSV tables.
//!
//! Two columns, no header row. Quoting and embedded commas are handled by
//! the csv crate on both sides of the round trip.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::flatten::FlatMap;
use crate::traits::FormatParser;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
struct CsvRecord {
    key: String,
    value: String,
}

pub struct CsvParser;

impl FormatParser for CsvParser {
    fn parse(&self, input: &str) -> Result<FlatMap, Error> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(false)
            .from_reader(input.as_bytes());

        let mut flat = FlatMap::new();
        for result in reader.deserialize() {
            let record: CsvRecord = result?;
            flat.insert(record.key, record.value);
        }
        Ok(flat)
    }

    fn serialize(
        &self,
        _locale: &str,
        data: &FlatMap,
        _original: Option<&str>,
    ) -> Result<String, Error> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        for (key, value) in data {
            writer.serialize(CsvRecord {
                key: key.clone(),
                value: value.clone(),
            })?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| Error::invalid_structure(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| Error::invalid_structure(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_table() {
        let flat = CsvParser.parse("hello,world\ntest,value\n").unwrap();
        assert_eq!(flat.get("hello").unwrap(), "world");
        assert_eq!(flat.get("test").unwrap(), "value");
    }

    #[test]
    fn test_parse_quoted_values() {
        let flat = CsvParser
            .parse("greeting,\"Hello, friend\"\n")
            .unwrap();
        assert_eq!(flat.get("greeting").unwrap(), "Hello, friend");
    }

    #[test]
    fn test_serialize_preserves_order() {
        let mut data = FlatMap::new();
        data.insert("b".to_string(), "2".to_string());
        data.insert("a".to_string(), "1".to_string());
        let out = CsvParser.serialize("en", &data, None).unwrap();
        assert_eq!(out, "b,2\na,1\n");
    }

    #[test]
    fn test_roundtrip_fidelity() {
        let mut data = FlatMap::new();
        data.insert("plain".to_string(), "text".to_string());
        data.insert("comma".to_string(), "a, b".to_string());
        data.insert("quote".to_string(), "say \"hi\"".to_string());

        let out = CsvParser.serialize("en", &data, None).unwrap();
        let reparsed = CsvParser.parse(&out).unwrap();
        assert_eq!(data, reparsed);
    }

    #[test]
    fn test_empty_input() {
        assert!(CsvParser.parse("").unwrap().is_empty());
    }
}
