//! Deterministic batching of pending translation units.
//!
//! Chunking is a pure function of (content, budget): identical input always
//! yields identical chunk boundaries, so reruns and tests are reproducible.
//! Packing is greedy and order-preserving, which makes every chunk a
//! contiguous range over the pending-unit list; together the ranges cover
//! the list exactly once.

use std::ops::Range;

use unic_langid::LanguageIdentifier;

use crate::types::TranslationUnit;

/// Default content budget per chunk, in bytes of key + source text.
pub const BASE_CHUNK_BYTES: usize = 4_000;

// Target languages whose scripts or grammar tend to need noticeably more
// output tokens per input byte; their chunks are kept smaller.
const EXPANSIVE_LANGUAGES: &[&str] = &["ja", "zh", "ko", "th", "ar", "he", "el", "ru"];

/// Content budget for one (target locale) chunk. Locales that expand on
/// output get half the base budget.
pub fn chunk_budget(target_locale: &str) -> usize {
    let language = target_locale
        .parse::<LanguageIdentifier>()
        .map(|id| id.language.as_str().to_string())
        .unwrap_or_else(|_| target_locale.to_ascii_lowercase());

    if EXPANSIVE_LANGUAGES.contains(&language.as_str()) {
        BASE_CHUNK_BYTES / 2
    } else {
        BASE_CHUNK_BYTES
    }
}

/// Pack units into ordered chunks whose content size stays under `budget`.
/// A single unit larger than the budget still gets a chunk of its own; an
/// empty unit list yields no chunks.
pub fn plan_chunks(units: &[TranslationUnit], budget: usize) -> Vec<Range<usize>> {
    assert!(budget > 0, "chunk budget must be positive");

    let mut chunks = Vec::new();
    let mut start = 0usize;
    let mut size = 0usize;

    for (i, unit) in units.iter().enumerate() {
        let unit_size = unit.size();
        if i > start && size + unit_size > budget {
            chunks.push(start..i);
            start = i;
            size = 0;
        }
        size += unit_size;
    }
    if start < units.len() {
        chunks.push(start..units.len());
    }

    chunks
}
