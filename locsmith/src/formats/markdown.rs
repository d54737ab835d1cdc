//! Support for document formats (Markdown, MDX).
//!
//! Document formats are never flattened into keys: the whole file is one
//! translation unit, kept together so the model sees the full context. The
//! single unit lives under [`CONTENT_KEY`].

use crate::error::Error;
use crate::flatten::FlatMap;
use crate::traits::FormatParser;

/// The key the whole document is filed under.
pub const CONTENT_KEY: &str = "content";

pub struct DocumentParser;

impl FormatParser for DocumentParser {
    fn parse(&self, input: &str) -> Result<FlatMap, Error> {
        let mut flat = FlatMap::new();
        flat.insert(CONTENT_KEY.to_string(), input.to_string());
        Ok(flat)
    }

    fn serialize(
        &self,
        _locale: &str,
        data: &FlatMap,
        _original: Option<&str>,
    ) -> Result<String, Error> {
        Ok(data.get(CONTENT_KEY).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_document_is_one_unit() {
        let doc = "# Title\n\nSome *prose* with [links](https://example.com).\n";
        let flat = DocumentParser.parse(doc).unwrap();
        assert_eq!(flat.len(), 1);
        assert_eq!(flat.get(CONTENT_KEY).unwrap(), doc);
    }

    #[test]
    fn test_serialize_returns_content_verbatim() {
        let doc = "## Heading\n\ntext\n";
        let flat = DocumentParser.parse(doc).unwrap();
        assert_eq!(DocumentParser.serialize("ja", &flat, None).unwrap(), doc);
    }

    #[test]
    fn test_missing_content_serializes_empty() {
        assert_eq!(
            DocumentParser.serialize("ja", &FlatMap::new(), None).unwrap(),
            ""
        );
    }
}
