//! All supported localization file formats.
//!
//! This module provides the [`FormatType`] registry enum used to select a
//! parser, the translation strategy attached to each format family, and the
//! per-format parser/serializer implementations.

pub mod android;
pub mod csv;
pub mod json;
pub mod markdown;
pub mod po;
pub mod source;
pub mod stringsdict;
pub mod yaml;

use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

pub use source::{LiteralScanner, StringMatch};

use crate::Error;
use crate::traits::FormatParser;

/// Represents all supported localization file formats for generic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatType {
    /// Nested-object JSON translation files.
    Json,
    /// Flutter ARB files (JSON wire syntax).
    Arb,
    /// YAML translation files.
    Yaml,
    /// Android `strings.xml` resources.
    AndroidStrings,
    /// Apple `.stringsdict` property lists.
    Stringsdict,
    /// gettext `.po` catalogs.
    Po,
    /// Key,value CSV tables.
    Csv,
    /// Markdown documents, translated as one unit.
    Markdown,
    /// MDX documents, translated as one unit.
    Mdx,
    /// JavaScript sources with embedded string literals.
    Javascript,
    /// TypeScript sources with embedded string literals.
    Typescript,
}

/// How the orchestrator drives translation for a format family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationStrategy {
    /// Batch key/value translation over the flat map.
    KeyValue,
    /// The whole file is a single translation unit.
    Document,
    /// In-place substitution of scanned string literals.
    SourceCode,
}

impl Display for FormatType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatType::Json => write!(f, "json"),
            FormatType::Arb => write!(f, "arb"),
            FormatType::Yaml => write!(f, "yaml"),
            FormatType::AndroidStrings => write!(f, "android"),
            FormatType::Stringsdict => write!(f, "stringsdict"),
            FormatType::Po => write!(f, "po"),
            FormatType::Csv => write!(f, "csv"),
            FormatType::Markdown => write!(f, "md"),
            FormatType::Mdx => write!(f, "mdx"),
            FormatType::Javascript => write!(f, "js"),
            FormatType::Typescript => write!(f, "ts"),
        }
    }
}

/// Accepts the common identifiers and file extensions, case-insensitively.
///
/// # Example
/// ```rust
/// use locsmith::formats::FormatType;
/// use std::str::FromStr;
/// assert_eq!(FormatType::from_str("json").unwrap(), FormatType::Json);
/// assert_eq!(FormatType::from_str("yml").unwrap(), FormatType::Yaml);
/// assert_eq!(FormatType::from_str("xml").unwrap(), FormatType::AndroidStrings);
/// assert!(FormatType::from_str("foobar").is_err());
/// ```
impl FromStr for FormatType {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "json" => Ok(FormatType::Json),
            "arb" => Ok(FormatType::Arb),
            "yaml" | "yml" => Ok(FormatType::Yaml),
            "android" | "xml" => Ok(FormatType::AndroidStrings),
            "stringsdict" => Ok(FormatType::Stringsdict),
            "po" | "pot" => Ok(FormatType::Po),
            "csv" => Ok(FormatType::Csv),
            "md" | "markdown" => Ok(FormatType::Markdown),
            "mdx" => Ok(FormatType::Mdx),
            "js" | "jsx" => Ok(FormatType::Javascript),
            "ts" | "tsx" => Ok(FormatType::Typescript),
            other => Err(Error::UnknownFormat(other.to_string())),
        }
    }
}

impl FormatType {
    /// Returns the typical file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            FormatType::Json => "json",
            FormatType::Arb => "arb",
            FormatType::Yaml => "yml",
            FormatType::AndroidStrings => "xml",
            FormatType::Stringsdict => "stringsdict",
            FormatType::Po => "po",
            FormatType::Csv => "csv",
            FormatType::Markdown => "md",
            FormatType::Mdx => "mdx",
            FormatType::Javascript => "js",
            FormatType::Typescript => "ts",
        }
    }

    /// The translation strategy for this format family.
    pub fn strategy(&self) -> TranslationStrategy {
        match self {
            FormatType::Json
            | FormatType::Arb
            | FormatType::Yaml
            | FormatType::AndroidStrings
            | FormatType::Stringsdict
            | FormatType::Po
            | FormatType::Csv => TranslationStrategy::KeyValue,
            FormatType::Markdown | FormatType::Mdx => TranslationStrategy::Document,
            FormatType::Javascript | FormatType::Typescript => TranslationStrategy::SourceCode,
        }
    }

    /// Returns the parser/serializer for this format, or `None` for
    /// source-code formats, which go through [`LiteralScanner`] text surgery
    /// instead of the flat-map contract.
    pub fn parser(&self) -> Option<Box<dyn FormatParser>> {
        match self {
            FormatType::Json | FormatType::Arb => Some(Box::new(json::JsonParser)),
            FormatType::Yaml => Some(Box::new(yaml::YamlParser)),
            FormatType::AndroidStrings => Some(Box::new(android::AndroidStringsParser)),
            FormatType::Stringsdict => Some(Box::new(stringsdict::StringsdictParser)),
            FormatType::Po => Some(Box::new(po::PoParser)),
            FormatType::Csv => Some(Box::new(csv::CsvParser)),
            FormatType::Markdown | FormatType::Mdx => Some(Box::new(markdown::DocumentParser)),
            FormatType::Javascript | FormatType::Typescript => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_type_display() {
        assert_eq!(FormatType::Json.to_string(), "json");
        assert_eq!(FormatType::AndroidStrings.to_string(), "android");
        assert_eq!(FormatType::Po.to_string(), "po");
        assert_eq!(FormatType::Markdown.to_string(), "md");
        assert_eq!(FormatType::Typescript.to_string(), "ts");
    }

    #[test]
    fn test_format_type_from_str() {
        assert_eq!(FormatType::from_str("JSON").unwrap(), FormatType::Json);
        assert_eq!(FormatType::from_str("yml").unwrap(), FormatType::Yaml);
        assert_eq!(FormatType::from_str("yaml").unwrap(), FormatType::Yaml);
        assert_eq!(
            FormatType::from_str("android").unwrap(),
            FormatType::AndroidStrings
        );
        assert_eq!(FormatType::from_str("pot").unwrap(), FormatType::Po);
        assert_eq!(FormatType::from_str("tsx").unwrap(), FormatType::Typescript);
        assert_eq!(FormatType::from_str("  md  ").unwrap(), FormatType::Markdown);
    }

    #[test]
    fn test_format_type_from_str_invalid() {
        assert!(FormatType::from_str("invalid").is_err());
        assert!(FormatType::from_str("").is_err());
    }

    #[test]
    fn test_strategy_assignment() {
        assert_eq!(FormatType::Json.strategy(), TranslationStrategy::KeyValue);
        assert_eq!(FormatType::Po.strategy(), TranslationStrategy::KeyValue);
        assert_eq!(FormatType::Markdown.strategy(), TranslationStrategy::Document);
        assert_eq!(FormatType::Mdx.strategy(), TranslationStrategy::Document);
        assert_eq!(
            FormatType::Javascript.strategy(),
            TranslationStrategy::SourceCode
        );
    }

    #[test]
    fn test_parser_availability() {
        assert!(FormatType::Json.parser().is_some());
        assert!(FormatType::Stringsdict.parser().is_some());
        assert!(FormatType::Markdown.parser().is_some());
        assert!(FormatType::Javascript.parser().is_none());
    }

    #[test]
    fn test_arb_shares_json_parser() {
        let parser = FormatType::Arb.parser().unwrap();
        let flat = parser.parse(r#"{"title": "Hello"}"#).unwrap();
        assert_eq!(flat.get("title").unwrap(), "Hello");
    }
}
