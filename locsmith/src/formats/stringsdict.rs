//! Support for Apple `.stringsdict` property lists.
//!
//! The plist `<dict>/<array>/<string>` tree maps directly onto the flatten
//! engine's value kinds, so plural-rule dictionaries survive as nested
//! objects and format-spec keys (`NSStringFormatSpecTypeKey` etc.) ride
//! along as ordinary string leaves.

use indexmap::IndexMap;
use indoc::indoc;
use quick_xml::escape::escape;
use quick_xml::{Reader, events::Event};

use crate::error::Error;
use crate::flatten::{self, FlatMap, Node};
use crate::traits::FormatParser;

pub struct StringsdictParser;

const PLIST_HEADER: &str = indoc! {r#"
    <?xml version="1.0" encoding="UTF-8"?>
    <!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
    <plist version="1.0">
"#};

impl FormatParser for StringsdictParser {
    fn parse(&self, input: &str) -> Result<FlatMap, Error> {
        // No text trimming: whitespace inside <key>/<string> is content;
        // indentation between elements is ignored by the event loops.
        let mut reader = Reader::from_str(input);

        let root = loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) if e.name().as_ref() == b"dict" => {
                    break parse_dict(&mut reader)?;
                }
                Ok(Event::Empty(ref e)) if e.name().as_ref() == b"dict" => {
                    break Node::Object(IndexMap::new());
                }
                Ok(Event::Eof) => {
                    return Err(Error::invalid_structure(
                        "stringsdict must contain a top-level <dict>",
                    ));
                }
                Ok(_) => {}
                Err(e) => return Err(Error::XmlParse(e)),
            }
        };

        Ok(flatten::flatten(&root))
    }

    fn serialize(
        &self,
        _locale: &str,
        data: &FlatMap,
        _original: Option<&str>,
    ) -> Result<String, Error> {
        let node = flatten::unflatten(data)?;

        let mut out = String::from(PLIST_HEADER);
        write_node(&node, 0, &mut out)?;
        out.push_str("</plist>\n");
        Ok(out)
    }
}

fn parse_dict(reader: &mut Reader<&[u8]>) -> Result<Node, Error> {
    let mut map = IndexMap::new();
    let mut pending_key: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"key" => pending_key = Some(read_text(reader, b"key")?),
                b"string" => {
                    let key = take_key(&mut pending_key)?;
                    map.insert(key, Node::Text(read_text(reader, b"string")?));
                }
                b"dict" => {
                    let key = take_key(&mut pending_key)?;
                    map.insert(key, parse_dict(reader)?);
                }
                b"array" => {
                    let key = take_key(&mut pending_key)?;
                    map.insert(key, parse_array(reader)?);
                }
                other => {
                    return Err(Error::invalid_structure(format!(
                        "unsupported plist element <{}>",
                        String::from_utf8_lossy(other)
                    )));
                }
            },
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"string" => {
                    let key = take_key(&mut pending_key)?;
                    map.insert(key, Node::Text(String::new()));
                }
                b"dict" => {
                    let key = take_key(&mut pending_key)?;
                    map.insert(key, Node::Object(IndexMap::new()));
                }
                b"array" => {
                    let key = take_key(&mut pending_key)?;
                    map.insert(key, Node::Array(Vec::new()));
                }
                _ => {}
            },
            Ok(Event::End(ref e)) if e.name().as_ref() == b"dict" => break,
            Ok(Event::Eof) => {
                return Err(Error::invalid_structure("unterminated <dict>".to_string()));
            }
            Ok(_) => {}
            Err(e) => return Err(Error::XmlParse(e)),
        }
    }

    Ok(Node::Object(map))
}

fn parse_array(reader: &mut Reader<&[u8]>) -> Result<Node, Error> {
    let mut items = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"string" => items.push(Node::Text(read_text(reader, b"string")?)),
                b"dict" => items.push(parse_dict(reader)?),
                other => {
                    return Err(Error::invalid_structure(format!(
                        "unsupported array element <{}>",
                        String::from_utf8_lossy(other)
                    )));
                }
            },
            Ok(Event::Empty(ref e)) if e.name().as_ref() == b"string" => {
                items.push(Node::Text(String::new()));
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"array" => break,
            Ok(Event::Eof) => {
                return Err(Error::invalid_structure("unterminated <array>".to_string()));
            }
            Ok(_) => {}
            Err(e) => return Err(Error::XmlParse(e)),
        }
    }

    Ok(Node::Array(items))
}

fn take_key(pending: &mut Option<String>) -> Result<String, Error> {
    pending
        .take()
        .ok_or_else(|| Error::invalid_structure("plist value without preceding <key>".to_string()))
}

fn read_text(reader: &mut Reader<&[u8]>, closing: &[u8]) -> Result<String, Error> {
    let mut value = String::new();
    loop {
        match reader.read_event() {
            Ok(Event::Text(t)) => value.push_str(&t.unescape().map_err(Error::XmlParse)?),
            Ok(Event::End(ref e)) if e.name().as_ref() == closing => break,
            Ok(Event::Eof) => {
                return Err(Error::invalid_structure("unexpected end of file".to_string()));
            }
            Ok(_) => {}
            Err(e) => return Err(Error::XmlParse(e)),
        }
    }
    Ok(value)
}

fn write_node(node: &Node, depth: usize, out: &mut String) -> Result<(), Error> {
    let pad = "    ".repeat(depth);
    match node {
        Node::Text(s) => {
            out.push_str(&format!("{}<string>{}</string>\n", pad, escape(s.as_str())));
        }
        Node::Object(map) => {
            if map.is_empty() {
                out.push_str(&format!("{}<dict/>\n", pad));
                return Ok(());
            }
            out.push_str(&format!("{}<dict>\n", pad));
            for (k, v) in map {
                out.push_str(&format!(
                    "{}    <key>{}</key>\n",
                    pad,
                    escape(k.as_str())
                ));
                write_node(v, depth + 1, out)?;
            }
            out.push_str(&format!("{}</dict>\n", pad));
        }
        Node::Array(items) => {
            if items.is_empty() {
                out.push_str(&format!("{}<array/>\n", pad));
                return Ok(());
            }
            out.push_str(&format!("{}<array>\n", pad));
            for item in items {
                write_node(item, depth + 1, out)?;
            }
            out.push_str(&format!("{}</array>\n", pad));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>apples_count</key>
    <dict>
        <key>NSStringLocalizedFormatKey</key>
        <string>%#@apples@</string>
        <key>apples</key>
        <dict>
            <key>NSStringFormatSpecTypeKey</key>
            <string>NSStringPluralRuleType</string>
            <key>NSStringFormatValueTypeKey</key>
            <string>d</string>
            <key>one</key>
            <string>1 apple</string>
            <key>other</key>
            <string>%d apples</string>
        </dict>
    </dict>
</dict>
</plist>
"#;

    #[test]
    fn test_parse_plural_dict() {
        let flat = StringsdictParser.parse(SAMPLE).unwrap();
        assert_eq!(
            flat.get("apples_count.NSStringLocalizedFormatKey").unwrap(),
            "%#@apples@"
        );
        assert_eq!(flat.get("apples_count.apples.one").unwrap(), "1 apple");
        assert_eq!(flat.get("apples_count.apples.other").unwrap(), "%d apples");
    }

    #[test]
    fn test_parse_requires_dict_root() {
        let input = r#"<plist version="1.0"><string>x</string></plist>"#;
        assert!(StringsdictParser.parse(input).is_err());
    }

    #[test]
    fn test_serialize_emits_plist_skeleton() {
        let mut flat = FlatMap::new();
        flat.insert("greeting".to_string(), "Hello".to_string());
        let text = StringsdictParser.serialize("en", &flat, None).unwrap();
        assert!(text.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(text.contains("<!DOCTYPE plist"));
        assert!(text.contains("<key>greeting</key>"));
        assert!(text.ends_with("</plist>\n"));
    }

    #[test]
    fn test_roundtrip_fidelity() {
        let first = StringsdictParser.parse(SAMPLE).unwrap();
        let text = StringsdictParser.serialize("pl", &first, None).unwrap();
        let second = StringsdictParser.parse(&text).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_format_specifiers_survive() {
        let first = StringsdictParser.parse(SAMPLE).unwrap();
        let text = StringsdictParser.serialize("ru", &first, None).unwrap();
        assert!(text.contains("%#@apples@"));
        assert!(text.contains("%d apples"));
    }

    #[test]
    fn test_empty_dict() {
        let input = r#"<plist version="1.0"><dict/></plist>"#;
        let flat = StringsdictParser.parse(input).unwrap();
        assert!(flat.is_empty());
    }
}
