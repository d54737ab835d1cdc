//! The format-agnostic parse/serialize contract every registered format
//! implements.

use crate::error::Error;
use crate::flatten::FlatMap;

/// A parser/serializer pair for one localization file format.
///
/// The contract is: `parse(serialize(locale, m, _)) == m` for any flat map
/// `m` holding supported value kinds, and `serialize` reproduces the
/// untranslated structural elements of `original` (headers, comments) when
/// one is supplied and only a subset of keys changed.
///
/// # Example
///
/// ```rust
/// use locsmith::formats::FormatType;
///
/// let parser = FormatType::Json.parser().unwrap();
/// let flat = parser.parse(r#"{"a": {"b": "hello"}}"#)?;
/// assert_eq!(flat.get("a.b").unwrap(), "hello");
/// # Ok::<(), locsmith::Error>(())
/// ```
pub trait FormatParser: Send + Sync {
    /// Parse document text into the flat key→text representation.
    fn parse(&self, input: &str) -> Result<FlatMap, Error>;

    /// Serialize a flat map back into document text for `locale`.
    ///
    /// `original` is the previously serialized target document, if one
    /// exists; catalog formats mine it for headers and comments.
    fn serialize(&self, locale: &str, data: &FlatMap, original: Option<&str>)
    -> Result<String, Error>;
}
