//! Support for Android `strings.xml` resources.
//!
//! `<string>` elements map to plain keys and `<string-array>` elements to
//! indexed composite keys, so arrays survive the flat representation and
//! are re-emitted natively on serialize.

use indexmap::IndexMap;
use quick_xml::{
    Reader, Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};

use crate::error::Error;
use crate::flatten::FlatMap;
use crate::key;
use crate::traits::FormatParser;

pub struct AndroidStringsParser;

impl FormatParser for AndroidStringsParser {
    fn parse(&self, input: &str) -> Result<FlatMap, Error> {
        // No text trimming: leading/trailing whitespace inside a value is
        // content and must survive the round trip. Whitespace between
        // elements arrives as text events and is ignored below.
        let mut reader = Reader::from_str(input);

        let mut flat = FlatMap::new();
        let mut saw_resources = false;

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) if e.name().as_ref() == b"resources" => {
                    saw_resources = true;
                }
                Ok(Event::Start(ref e)) if e.name().as_ref() == b"string" => {
                    let name = name_attribute(e)?;
                    let value = read_text(&mut reader, b"string")?;
                    flat.insert(key::encode(&name), value);
                }
                Ok(Event::Start(ref e)) if e.name().as_ref() == b"string-array" => {
                    let name = name_attribute(e)?;
                    parse_string_array(&mut reader, &key::encode(&name), &mut flat)?;
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => return Err(Error::XmlParse(e)),
            }
        }

        if !saw_resources {
            return Err(Error::invalid_structure(
                "strings.xml must contain a <resources> root element",
            ));
        }

        Ok(flat)
    }

    fn serialize(
        &self,
        _locale: &str,
        data: &FlatMap,
        _original: Option<&str>,
    ) -> Result<String, Error> {
        // Regroup indexed keys into arrays, preserving first-appearance order.
        enum Item {
            Single(String),
            Array(Vec<String>),
        }
        let mut items: IndexMap<String, Item> = IndexMap::new();

        for (composite, value) in data {
            match split_array_key(composite) {
                Some((base, index)) => {
                    let entry = items
                        .entry(base.to_string())
                        .or_insert_with(|| Item::Array(Vec::new()));
                    let Item::Array(values) = entry else {
                        return Err(Error::invalid_structure(format!(
                            "key `{}` is both a string and a string-array",
                            composite
                        )));
                    };
                    if index >= values.len() {
                        values.resize(index + 1, String::new());
                    }
                    values[index] = value.clone();
                }
                None => {
                    items.insert(composite.clone(), Item::Single(value.clone()));
                }
            }
        }

        let mut out = Vec::new();
        let mut writer = Writer::new(&mut out);

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        writer.write_event(Event::Text(BytesText::new("\n")))?;
        writer.write_event(Event::Start(BytesStart::new("resources")))?;
        writer.write_event(Event::Text(BytesText::new("\n")))?;

        for (composite, item) in &items {
            let name = key::decode(composite)?;
            match item {
                Item::Single(value) => {
                    writer.write_event(Event::Text(BytesText::new("    ")))?;
                    let mut elem = BytesStart::new("string");
                    elem.push_attribute(("name", name.as_str()));
                    writer.write_event(Event::Start(elem))?;
                    writer.write_event(Event::Text(BytesText::new(value)))?;
                    writer.write_event(Event::End(BytesEnd::new("string")))?;
                    writer.write_event(Event::Text(BytesText::new("\n")))?;
                }
                Item::Array(values) => {
                    writer.write_event(Event::Text(BytesText::new("    ")))?;
                    let mut elem = BytesStart::new("string-array");
                    elem.push_attribute(("name", name.as_str()));
                    writer.write_event(Event::Start(elem))?;
                    writer.write_event(Event::Text(BytesText::new("\n")))?;
                    for value in values {
                        writer.write_event(Event::Text(BytesText::new("        ")))?;
                        writer.write_event(Event::Start(BytesStart::new("item")))?;
                        writer.write_event(Event::Text(BytesText::new(value)))?;
                        writer.write_event(Event::End(BytesEnd::new("item")))?;
                        writer.write_event(Event::Text(BytesText::new("\n")))?;
                    }
                    writer.write_event(Event::Text(BytesText::new("    ")))?;
                    writer.write_event(Event::End(BytesEnd::new("string-array")))?;
                    writer.write_event(Event::Text(BytesText::new("\n")))?;
                }
            }
        }

        writer.write_event(Event::End(BytesEnd::new("resources")))?;
        writer.write_event(Event::Text(BytesText::new("\n")))?;

        String::from_utf8(out)
            .map_err(|e| Error::invalid_structure(format!("non-UTF-8 XML output: {}", e)))
    }
}

fn name_attribute(e: &BytesStart) -> Result<String, Error> {
    for attr in e.attributes().with_checks(false) {
        let attr = attr.map_err(|e| Error::invalid_structure(e.to_string()))?;
        if attr.key.as_ref() == b"name" {
            return Ok(attr
                .unescape_value()
                .map_err(|e| Error::invalid_structure(e.to_string()))?
                .to_string());
        }
    }
    Err(Error::invalid_structure(
        "element missing 'name' attribute".to_string(),
    ))
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

fn parse_string_array(
    reader: &mut Reader<&[u8]>,
    base: &str,
    flat: &mut FlatMap,
) -> Result<(), Error> {
    let mut index = 0usize;
    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"item" => {
                let value = read_text(reader, b"item")?;
                flat.insert(format!("{}[{}]", base, index), value);
                index += 1;
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"string-array" => break,
            Ok(Event::Eof) => {
                return Err(Error::invalid_structure("unexpected end of file".to_string()));
            }
            Ok(_) => {}
            Err(e) => return Err(Error::XmlParse(e)),
        }
    }
    Ok(())
}

// Splits `name[3]` into ("name", 3); returns None for plain keys.
fn split_array_key(composite: &str) -> Option<(&str, usize)> {
    let stripped = composite.strip_suffix(']')?;
    let open = stripped.rfind('[')?;
    let index = stripped[open + 1..].parse::<usize>().ok()?;
    Some((&stripped[..open], index))
}
