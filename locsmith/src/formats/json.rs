//! Support for nested-object JSON translation files (and ARB, which shares
//! the wire syntax).
//!
//! Parsing delegates to the flatten engine; serialization rebuilds the
//! nested document with arrays expressed natively and escaped key segments
//! restored to their original spelling. Malformed input goes through a
//! best-effort repair pass (single quotes, unquoted keys, trailing commas)
//! before being rejected.

use crate::error::Error;
use crate::flatten::{self, FlatMap, Node};
use crate::traits::FormatParser;

pub struct JsonParser;

impl FormatParser for JsonParser {
    fn parse(&self, input: &str) -> Result<FlatMap, Error> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(FlatMap::new());
        }

        let value: serde_json::Value = match serde_json::from_str(trimmed) {
            Ok(v) => v,
            Err(_) => serde_json::from_str(&repair(trimmed))?,
        };

        if !value.is_object() {
            return Err(Error::invalid_structure(
                "translation file must contain a JSON object at the top level",
            ));
        }

        Ok(flatten::flatten(&Node::from_json(&value)?))
    }

    fn serialize(
        &self,
        _locale: &str,
        data: &FlatMap,
        _original: Option<&str>,
    ) -> Result<String, Error> {
        let node = flatten::unflatten(data)?;
        let mut text = serde_json::to_string_pretty(&node.to_json())?;
        text.push('\n');
        Ok(text)
    }
}

/// Best-effort repair of common hand-edited JSON damage: single-quoted
/// strings, unquoted object keys, trailing commas. Operates outside string
/// context only, so valid content is never rewritten.
fn repair(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 16);
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut string_delim = '"';
    let mut escaped = false;

    while let Some(c) = chars.next() {
        if in_string {
            if escaped {
                escaped = false;
                // `\'` is not a legal JSON escape once the delimiter is
                // normalized to double quotes.
                if c == '\'' {
                    out.push('\'');
                } else {
                    out.push('\\');
                    out.push(c);
                }
                continue;
            }
            match c {
                '\\' => {
                    escaped = true;
                }
                _ if c == string_delim => {
                    in_string = false;
                    out.push('"');
                }
                // A double quote inside a single-quoted string needs escaping
                // once the delimiter is normalized.
                '"' => out.push_str("\\\""),
                _ => out.push(c),
            }
            continue;
        }

        match c {
            '"' | '\'' => {
                in_string = true;
                string_delim = c;
                out.push('"');
            }
            ',' => {
                // Drop the comma if the next non-whitespace closes a scope.
                let mut lookahead = chars.clone();
                let next = loop {
                    match lookahead.next() {
                        Some(ws) if ws.is_whitespace() => continue,
                        other => break other,
                    }
                };
                match next {
                    Some('}') | Some(']') => {}
                    _ => out.push(','),
                }
            }
            _ if c.is_alphanumeric() || c == '_' || c == '$' => {
                // Possible bare key: collect the identifier and quote it if
                // it is followed by a colon.
                let mut ident = String::new();
                ident.push(c);
                while let Some(&next) = chars.peek() {
                    if next.is_alphanumeric() || next == '_' || next == '$' {
                        ident.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let mut lookahead = chars.clone();
                let follows_colon = loop {
                    match lookahead.next() {
                        Some(ws) if ws.is_whitespace() => continue,
                        Some(':') => break true,
                        _ => break false,
                    }
                };
                if follows_colon {
                    out.push('"');
                    out.push_str(&ident);
                    out.push('"');
                } else {
                    out.push_str(&ident);
                }
            }
            _ => out.push(c),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_pairs() {
        let flat = JsonParser
            .parse(r#"{"hello": "world", "test": "value"}"#)
            .unwrap();
        assert_eq!(flat.get("hello").unwrap(), "world");
        assert_eq!(flat.get("test").unwrap(), "value");
    }

    #[test]
    fn test_parse_nested_objects() {
        let flat = JsonParser
            .parse(r#"{"nested": {"key": "value", "another": {"deep": "test"}}}"#)
            .unwrap();
        assert_eq!(flat.get("nested.key").unwrap(), "value");
        assert_eq!(flat.get("nested.another.deep").unwrap(), "test");
    }

    #[test]
    fn test_parse_repairs_malformed_json() {
        let input = r#"{
            hello: "world",
            'test': 'value',
        }"#;
        let flat = JsonParser.parse(input).unwrap();
        assert_eq!(flat.get("hello").unwrap(), "world");
        assert_eq!(flat.get("test").unwrap(), "value");
    }

    #[test]
    fn test_parse_rejects_non_object_top_level() {
        let err = JsonParser.parse(r#""just a string""#).unwrap_err();
        assert!(matches!(err, Error::InvalidStructure(_)));
    }

    #[test]
    fn test_parse_empty_object() {
        assert!(JsonParser.parse("{}").unwrap().is_empty());
    }

    #[test]
    fn test_serialize_restores_structure() {
        let input = r#"{
            "chat": {
                "poll": {
                    "allow-multiple": "Allow Multiple Answers?",
                    "create-poll.title": "Create Poll"
                }
            }
        }"#;
        let flat = JsonParser.parse(input).unwrap();
        let text = JsonParser.serialize("en", &flat, None).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(
            value["chat"]["poll"]["allow-multiple"],
            "Allow Multiple Answers?"
        );
        assert_eq!(value["chat"]["poll"]["create-poll.title"], "Create Poll");
    }

    #[test]
    fn test_serialize_emits_native_arrays() {
        let input = r#"{"items": [{"t": "a"}, {"t": "b"}], "tags": ["x", "y"]}"#;
        let flat = JsonParser.parse(input).unwrap();
        let text = JsonParser.serialize("en", &flat, None).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert!(value["items"].is_array());
        assert_eq!(value["items"][1]["t"], "b");
        assert_eq!(value["tags"], serde_json::json!(["x", "y"]));
    }

    #[test]
    fn test_serialize_ends_with_newline() {
        let mut flat = FlatMap::new();
        flat.insert("key".to_string(), "value".to_string());
        let text = JsonParser.serialize("en", &flat, None).unwrap();
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_roundtrip_fidelity() {
        let input = r#"{
            "a": {"b": "hello", "c": "world"},
            "items": [{"title": "x"}, {"title": "y"}]
        }"#;
        let first = JsonParser.parse(input).unwrap();
        let text = JsonParser.serialize("fr", &first, None).unwrap();
        let second = JsonParser.parse(&text).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_repair_preserves_quotes_inside_strings() {
        let input = r#"{'say': 'he said "hi"'}"#;
        let flat = JsonParser.parse(input).unwrap();
        assert_eq!(flat.get("say").unwrap(), r#"he said "hi""#);
    }

    #[test]
    fn test_repair_escaped_single_quote() {
        let flat = JsonParser.parse(r#"{'msg': 'it\'s fine'}"#).unwrap();
        assert_eq!(flat.get("msg").unwrap(), "it's fine");
    }
}
