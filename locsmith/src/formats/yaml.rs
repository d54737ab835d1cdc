//! Support for YAML translation files.
//!
//! Mappings and sequences delegate to the flatten engine; the top level
//! must be a mapping.

use crate::error::Error;
use crate::flatten::{self, FlatMap, Node};
use crate::traits::FormatParser;

pub struct YamlParser;

impl FormatParser for YamlParser {
    fn parse(&self, input: &str) -> Result<FlatMap, Error> {
        if input.trim().is_empty() {
            return Ok(FlatMap::new());
        }

        let value: serde_yaml::Value = serde_yaml::from_str(input)?;
        if !value.is_mapping() {
            return Err(Error::invalid_structure(
                "translation file must contain a YAML mapping at the top level",
            ));
        }

        Ok(flatten::flatten(&Node::from_yaml(&value)?))
    }

    fn serialize(
        &self,
        _locale: &str,
        data: &FlatMap,
        _original: Option<&str>,
    ) -> Result<String, Error> {
        if data.is_empty() {
            return Ok("{}\n".to_string());
        }
        let node = flatten::unflatten(data)?;
        Ok(serde_yaml::to_string(&node.to_yaml())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_mapping() {
        let input = "app:\n  title: My App\n  menu:\n    open: Open\n";
        let flat = YamlParser.parse(input).unwrap();
        assert_eq!(flat.get("app.title").unwrap(), "My App");
        assert_eq!(flat.get("app.menu.open").unwrap(), "Open");
    }

    #[test]
    fn test_parse_sequences() {
        let input = "steps:\n  - First\n  - Second\n";
        let flat = YamlParser.parse(input).unwrap();
        assert_eq!(flat.get("steps[0]").unwrap(), "First");
        assert_eq!(flat.get("steps[1]").unwrap(), "Second");
    }

    #[test]
    fn test_parse_rejects_scalar_top_level() {
        assert!(matches!(
            YamlParser.parse("just text"),
            Err(Error::InvalidStructure(_))
        ));
    }

    #[test]
    fn test_parse_rejects_numeric_leaf() {
        let err = YamlParser.parse("count: 3\n").unwrap_err();
        assert!(matches!(err, Error::InvalidValue { .. }));
    }

    #[test]
    fn test_roundtrip_fidelity() {
        let input = "app:\n  title: Demo\n  tags:\n    - one\n    - two\nplain: text\n";
        let first = YamlParser.parse(input).unwrap();
        let text = YamlParser.serialize("de", &first, None).unwrap();
        let second = YamlParser.parse(&text).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_input() {
        assert!(YamlParser.parse("").unwrap().is_empty());
        assert_eq!(
            YamlParser.serialize("en", &FlatMap::new(), None).unwrap(),
            "{}\n"
        );
    }
}
