//! Change detection between the previous source snapshot and the current
//! source.
//!
//! Structural and catalog formats diff their flat maps directly. Source-code
//! formats diff the raw text line by line and intersect the inserted ranges
//! with the positions of located string literals.

use similar::{DiffTag, TextDiff};

use crate::flatten::FlatMap;
use crate::formats::StringMatch;

/// Keys that are new or whose source text changed, in current-source order.
/// With no previous snapshot every key is pending.
pub fn changed_keys(previous: Option<&FlatMap>, current: &FlatMap) -> Vec<String> {
    match previous {
        None => current.keys().cloned().collect(),
        Some(prev) => current
            .iter()
            .filter(|(key, value)| prev.get(*key) != Some(*value))
            .map(|(key, _)| key.clone())
            .collect(),
    }
}

/// Indices (into `matches`) of string literals that sit inside lines added
/// or rewritten between `previous` and `current`.
pub fn changed_literals(previous: &str, current: &str, matches: &[StringMatch]) -> Vec<usize> {
    let diff = TextDiff::from_lines(previous, current);

    // Byte offset of each line start in the current text.
    let mut line_offsets = Vec::new();
    let mut offset = 0usize;
    for line in current.split_inclusive('\n') {
        line_offsets.push(offset);
        offset += line.len();
    }
    line_offsets.push(offset);

    let mut changed = Vec::new();
    for op in diff.ops() {
        if !matches!(op.tag(), DiffTag::Insert | DiffTag::Replace) {
            continue;
        }
        let range = op.new_range();
        let lo = line_offsets[range.start.min(line_offsets.len() - 1)];
        let hi = line_offsets[range.end.min(line_offsets.len() - 1)];

        for (i, m) in matches.iter().enumerate() {
            if m.start >= lo && m.start < hi {
                changed.push(i);
            }
        }
    }

    changed.sort_unstable();
    changed.dedup();
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::LiteralScanner;

    fn flat(pairs: &[(&str, &str)]) -> FlatMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_changed_keys_detects_additions() {
        let previous = flat(&[("a.b", "hello")]);
        let current = flat(&[("a.b", "hello"), ("a.c", "world")]);
        assert_eq!(changed_keys(Some(&previous), &current), ["a.c"]);
    }

    #[test]
    fn test_changed_keys_detects_modifications() {
        let previous = flat(&[("a", "old"), ("b", "same")]);
        let current = flat(&[("a", "new"), ("b", "same")]);
        assert_eq!(changed_keys(Some(&previous), &current), ["a"]);
    }

    #[test]
    fn test_changed_keys_ignores_removals() {
        let previous = flat(&[("a", "1"), ("b", "2")]);
        let current = flat(&[("a", "1")]);
        assert!(changed_keys(Some(&previous), &current).is_empty());
    }

    #[test]
    fn test_changed_keys_without_previous_selects_all() {
        let current = flat(&[("a", "1"), ("b", "2")]);
        assert_eq!(changed_keys(None, &current), ["a", "b"]);
    }

    #[test]
    fn test_changed_keys_preserves_current_order() {
        let previous = flat(&[]);
        let current = flat(&[("z", "1"), ("a", "2"), ("m", "3")]);
        assert_eq!(changed_keys(Some(&previous), &current), ["z", "a", "m"]);
    }

    #[test]
    fn test_changed_literals_only_in_added_lines() {
        let previous = "const a = \"Hello\";\nconst b = \"World\";\n";
        let current = "const a = \"Hello\";\nconst b = \"World\";\nconst c = \"Fresh\";\n";
        let matches = LiteralScanner::new().scan(current);
        assert_eq!(matches.len(), 3);

        let changed = changed_literals(previous, current, &matches);
        assert_eq!(changed.len(), 1);
        assert_eq!(matches[changed[0]].inner(), "Fresh");
    }

    #[test]
    fn test_changed_literals_rewritten_line() {
        let previous = "greet(\"Hello\");\nbye(\"Later\");\n";
        let current = "greet(\"Hello there\");\nbye(\"Later\");\n";
        let matches = LiteralScanner::new().scan(current);

        let changed = changed_literals(previous, current, &matches);
        assert_eq!(changed.len(), 1);
        assert_eq!(matches[changed[0]].inner(), "Hello there");
    }

    #[test]
    fn test_changed_literals_unchanged_source() {
        let text = "a(\"one\");\nb(\"two\");\n";
        let matches = LiteralScanner::new().scan(text);
        assert!(changed_literals(text, text, &matches).is_empty());
    }
}
