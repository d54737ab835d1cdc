//! Support for gettext `.po` catalogs.
//!
//! Catalog semantics differ from the structural formats: entries are an
//! ordered id/value list, the header block (the empty-msgid entry and
//! anything before it) is carried verbatim from the previous document, and
//! per-entry translator comments stick to their msgid across serializes.
//! Entries matching existing ids are updated in place, new ids are
//! appended, and ids absent from the new data are dropped.

use crate::error::Error;
use crate::flatten::FlatMap;
use crate::traits::FormatParser;

pub struct PoParser;

struct PoEntry {
    comments: Vec<String>,
    msgid: String,
    msgstr: String,
}

impl FormatParser for PoParser {
    fn parse(&self, input: &str) -> Result<FlatMap, Error> {
        let entries = parse_entries(input)?;
        let mut flat = FlatMap::new();
        for entry in entries {
            if !entry.msgid.is_empty() {
                flat.insert(entry.msgid, entry.msgstr);
            }
        }
        Ok(flat)
    }

    fn serialize(
        &self,
        _locale: &str,
        data: &FlatMap,
        original: Option<&str>,
    ) -> Result<String, Error> {
        let header = original
            .map(header_region)
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| "msgid \"\"\nmsgstr \"\"\n".to_string());

        let original_entries = match original {
            Some(text) => parse_entries(text)?,
            None => Vec::new(),
        };

        let mut out = header;
        for (msgid, msgstr) in data {
            out.push('\n');
            if let Some(entry) = original_entries
                .iter()
                .find(|e| !e.msgid.is_empty() && e.msgid == *msgid)
            {
                for comment in &entry.comments {
                    out.push_str(comment);
                    out.push('\n');
                }
            }
            out.push_str(&format!("msgid \"{}\"\n", escape(msgid)));
            out.push_str(&format!("msgstr \"{}\"\n", escape(msgstr)));
        }
        Ok(out)
    }
}

#[derive(PartialEq)]
enum Field {
    None,
    MsgId,
    MsgStr,
}

fn parse_entries(input: &str) -> Result<Vec<PoEntry>, Error> {
    let mut entries = Vec::new();
    let mut comments: Vec<String> = Vec::new();
    let mut msgid: Option<String> = None;
    let mut msgstr = String::new();
    let mut field = Field::None;

    let mut flush =
        |comments: &mut Vec<String>, msgid: &mut Option<String>, msgstr: &mut String| {
            if let Some(id) = msgid.take() {
                entries.push(PoEntry {
                    comments: std::mem::take(comments),
                    msgid: id,
                    msgstr: std::mem::take(msgstr),
                });
            } else {
                comments.clear();
                msgstr.clear();
            }
        };

    for line in input.lines() {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            flush(&mut comments, &mut msgid, &mut msgstr);
            field = Field::None;
        } else if trimmed.starts_with('#') {
            if msgid.is_some() {
                flush(&mut comments, &mut msgid, &mut msgstr);
                field = Field::None;
            }
            comments.push(trimmed.to_string());
        } else if let Some(rest) = trimmed.strip_prefix("msgid ") {
            if msgid.is_some() {
                flush(&mut comments, &mut msgid, &mut msgstr);
            }
            msgid = Some(unquote(rest)?);
            field = Field::MsgId;
        } else if let Some(rest) = trimmed.strip_prefix("msgstr ") {
            msgstr = unquote(rest)?;
            field = Field::MsgStr;
        } else if trimmed.starts_with('"') {
            // Continuation line for the current field; stray quoted lines
            // before any msgid belong to the header block and are skipped
            // here (the header region is carried verbatim on serialize).
            let piece = unquote(trimmed)?;
            match field {
                Field::MsgId => {
                    if let Some(id) = msgid.as_mut() {
                        id.push_str(&piece);
                    }
                }
                Field::MsgStr => msgstr.push_str(&piece),
                Field::None => {}
            }
        }
        // Anything else (msgid_plural, obsolete markers) is ignored.
    }
    flush(&mut comments, &mut msgid, &mut msgstr);

    Ok(entries)
}

/// Everything before the first entry with a non-empty msgid, minus the
/// comment block attached to that entry, re-emitted byte-for-byte.
fn header_region(input: &str) -> String {
    let lines: Vec<&str> = input.lines().collect();

    let mut first_entry = lines.len();
    for (i, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix("msgid ") {
            if unquote(rest).map(|id| !id.is_empty()).unwrap_or(false) {
                first_entry = i;
                break;
            }
        }
    }

    // Comments directly above the first entry belong to it, not the header.
    let mut end = first_entry;
    while end > 0 && lines[end - 1].trim().starts_with('#') {
        end -= 1;
    }
    while end > 0 && lines[end - 1].trim().is_empty() {
        end -= 1;
    }

    if end == 0 {
        return String::new();
    }

    let mut out = lines[..end].join("\n");
    out.push('\n');
    out
}

fn unquote(text: &str) -> Result<String, Error> {
    let trimmed = text.trim();
    if trimmed.len() < 2 || !trimmed.starts_with('"') || !trimmed.ends_with('"') {
        return Err(Error::invalid_structure(format!(
            "malformed PO string: {}",
            text
        )));
    }
    let inner = &trimmed[1..trimmed.len() - 1];

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('"') => out.push('"'),
                Some('\\') => out.push('\\'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    Ok(out)
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\t', "\\t")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_pairs() {
        let input = "\nmsgid \"hello\"\nmsgstr \"world\"\n\nmsgid \"test\"\nmsgstr \"value\"\n";
        let flat = PoParser.parse(input).unwrap();
        assert_eq!(flat.get("hello").unwrap(), "world");
        assert_eq!(flat.get("test").unwrap(), "value");
        assert_eq!(flat.len(), 2);
    }

    #[test]
    fn test_parse_ignores_comments_and_header() {
        let input = r#"
msgid ""
msgstr ""
"Language: ko\n"
"MIME-Version: 1.0\n"

# This is a comment
#: another comment
msgid "key"
msgstr "value"
"#;
        let flat = PoParser.parse(input).unwrap();
        assert_eq!(flat.len(), 1);
        assert_eq!(flat.get("key").unwrap(), "value");
    }

    #[test]
    fn test_parse_escaped_quotes() {
        let input = "msgid \"with_escaped\"\nmsgstr \"text with \\\"quotes\\\" inside\"\n";
        let flat = PoParser.parse(input).unwrap();
        assert_eq!(flat.get("with_escaped").unwrap(), "text with \"quotes\" inside");
    }

    #[test]
    fn test_parse_multiline_continuation() {
        let input = "msgid \"long\"\nmsgstr \"\"\n\"first \"\n\"second\"\n";
        let flat = PoParser.parse(input).unwrap();
        assert_eq!(flat.get("long").unwrap(), "first second");
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(PoParser.parse("").unwrap().is_empty());
    }

    #[test]
    fn test_serialize_simple_pairs() {
        let mut data = FlatMap::new();
        data.insert("hello".to_string(), "world".to_string());
        data.insert("test".to_string(), "value".to_string());
        let out = PoParser.serialize("en", &data, None).unwrap();
        assert_eq!(
            out,
            "msgid \"\"\nmsgstr \"\"\n\nmsgid \"hello\"\nmsgstr \"world\"\n\nmsgid \"test\"\nmsgstr \"value\"\n"
        );
    }

    #[test]
    fn test_serialize_empty_data() {
        let out = PoParser.serialize("en", &FlatMap::new(), None).unwrap();
        assert_eq!(out, "msgid \"\"\nmsgstr \"\"\n");
    }

    #[test]
    fn test_serialize_escapes_quotes() {
        let mut data = FlatMap::new();
        data.insert("q".to_string(), "say \"hi\"".to_string());
        let out = PoParser.serialize("en", &data, None).unwrap();
        assert!(out.contains("msgstr \"say \\\"hi\\\"\""));
    }

    #[test]
    fn test_header_block_preserved_verbatim() {
        let original = r#"# Translators: keep this file in sync
msgid ""
msgstr ""
"Language: fr\n"
"MIME-Version: 1.0\n"

msgid "greeting"
msgstr "bonjour"

msgid "farewell"
msgstr "au revoir"
"#;
        let mut data = PoParser.parse(original).unwrap();
        data.insert("greeting".to_string(), "salut".to_string());

        let out = PoParser.serialize("fr", &data, Some(original)).unwrap();
        assert!(out.starts_with(
            "# Translators: keep this file in sync\nmsgid \"\"\nmsgstr \"\"\n\"Language: fr\\n\"\n\"MIME-Version: 1.0\\n\"\n"
        ));
        assert!(out.contains("msgid \"greeting\"\nmsgstr \"salut\""));
        assert!(out.contains("msgid \"farewell\"\nmsgstr \"au revoir\""));
    }

    #[test]
    fn test_entry_comments_follow_their_msgid() {
        let original = "# greeting comment\nmsgid \"greeting\"\nmsgstr \"hello\"\n";
        let mut data = FlatMap::new();
        data.insert("greeting".to_string(), "bonjour".to_string());
        data.insert("new_key".to_string(), "neuf".to_string());

        let out = PoParser.serialize("fr", &data, Some(original)).unwrap();
        assert!(out.contains("# greeting comment\nmsgid \"greeting\"\nmsgstr \"bonjour\""));
        assert!(out.contains("msgid \"new_key\"\nmsgstr \"neuf\""));
    }

    #[test]
    fn test_dropped_ids_are_removed() {
        let original = "msgid \"keep\"\nmsgstr \"k\"\n\nmsgid \"drop\"\nmsgstr \"d\"\n";
        let mut data = FlatMap::new();
        data.insert("keep".to_string(), "k2".to_string());

        let out = PoParser.serialize("en", &data, Some(original)).unwrap();
        assert!(out.contains("msgid \"keep\""));
        assert!(!out.contains("msgid \"drop\""));
    }

    #[test]
    fn test_roundtrip_fidelity() {
        let mut data = FlatMap::new();
        data.insert("a".to_string(), "first\nsecond".to_string());
        data.insert("b".to_string(), "tab\there".to_string());

        let out = PoParser.serialize("en", &data, None).unwrap();
        let reparsed = PoParser.parse(&out).unwrap();
        assert_eq!(data, reparsed);
    }
}
