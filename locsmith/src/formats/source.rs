//! Support for source-code formats (JavaScript/TypeScript).
//!
//! Translatable content is located by scanning for quoted string literals
//! over the raw text. Replacement is index-aligned surgery on the immutable
//! original buffer: untouched ranges are recombined byte-identically, only
//! the content between quotes changes, and the original quote style is
//! kept.

use lazy_static::lazy_static;
use regex::Regex;

use crate::debug::debug;

/// One located string literal, quotes included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringMatch {
    /// Byte offset of the opening quote in the source buffer.
    pub start: usize,
    /// The literal as written, including quotes.
    pub content: String,
}

impl StringMatch {
    /// The literal's content without its surrounding quotes.
    pub fn inner(&self) -> &str {
        let len = self.content.len();
        if len >= 2 { &self.content[1..len - 1] } else { "" }
    }

    /// The quote character this literal uses.
    pub fn quote(&self) -> char {
        self.content.chars().next().unwrap_or('"')
    }

    fn end(&self) -> usize {
        self.start + self.content.len()
    }
}

fn quote_pattern(quote: char, multiline: bool) -> String {
    let newline = if multiline { "" } else { "\\n" };
    format!(
        "{q}(?:\\\\.|[^{q}\\\\{nl}])*{q}",
        q = quote,
        nl = newline
    )
}

lazy_static! {
    static ref QUOTED_LITERAL: Regex = Regex::new(&format!(
        "{}|{}|{}",
        quote_pattern('"', false),
        quote_pattern('\'', false),
        quote_pattern('`', true),
    ))
    .unwrap();
}

type SkipPredicate = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// Heuristic default: literals containing a dot or hash are lookup keys or
/// selectors, not display text.
fn default_skip(content: &str) -> bool {
    content.contains('.') || content.contains('#')
}

/// Locates translatable string literals in program text.
///
/// The skip heuristic over- and under-matches by nature, so it stays a
/// replaceable predicate rather than a fixed rule.
pub struct LiteralScanner {
    skip: SkipPredicate,
}

impl Default for LiteralScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl LiteralScanner {
    pub fn new() -> Self {
        LiteralScanner {
            skip: Box::new(default_skip),
        }
    }

    /// Replace the skip predicate. The predicate receives the full literal,
    /// quotes included, and returns true to exclude it from translation.
    pub fn with_skip_predicate(
        skip: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> Self {
        LiteralScanner {
            skip: Box::new(skip),
        }
    }

    /// Scan program text for translatable string literals, in source order.
    pub fn scan(&self, code: &str) -> Vec<StringMatch> {
        let matches: Vec<StringMatch> = QUOTED_LITERAL
            .find_iter(code)
            .filter(|m| !(self.skip)(m.as_str()))
            .map(|m| StringMatch {
                start: m.start(),
                content: m.as_str().to_string(),
            })
            .collect();
        debug(format!("scanned {} translatable literals", matches.len()));
        matches
    }

    /// Rebuild the source with `replacements[i]` substituted for
    /// `matches[i]`. A missing replacement keeps the original literal;
    /// everything outside the matched ranges is copied byte-for-byte.
    pub fn replace(
        &self,
        code: &str,
        matches: &[StringMatch],
        replacements: &[Option<String>],
    ) -> String {
        let mut out = String::with_capacity(code.len());
        let mut cursor = 0usize;

        for (i, m) in matches.iter().enumerate() {
            out.push_str(&code[cursor..m.start]);
            match replacements.get(i).and_then(|r| r.as_ref()) {
                Some(replacement) => {
                    let quote = m.quote();
                    if replacement.starts_with(quote) {
                        out.push_str(replacement);
                    } else {
                        out.push(quote);
                        out.push_str(replacement);
                        out.push(quote);
                    }
                }
                None => out.push_str(&m.content),
            }
            cursor = m.end();
        }
        out.push_str(&code[cursor..]);
        out
    }
}
