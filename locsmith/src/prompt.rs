//! Prompt assembly for the translation backend.
//!
//! Batch calls carry the keys alongside the source texts and demand an
//! index-aligned JSON answer, so responses map back to units by position
//! and a key the model skipped shows up as an explicit null.

use indoc::indoc;

use crate::backend::{BatchRequest, DocumentRequest};

pub const BASE_REQUIREMENTS: &str = indoc! {"
    - Preserve the meaning and tone of the source text
    - Keep placeholders, format specifiers (%@, %d, {name}, {{count}}), and HTML tags exactly as written and in the same order
    - Keep line breaks and surrounding whitespace
    - Do not translate product names, URLs, or code identifiers
"};

/// Prompt for a batched key/value chunk. The answer contract is a JSON
/// object `{\"items\": [...]}` with one string (or null) per input, in
/// input order.
pub fn batch_prompt(request: &BatchRequest<'_>) -> String {
    let mut prompt = format!(
        "You are a professional translator working with {} localization files.\n\n\
         Translate the texts below from {} to {}.\n\n{}",
        request.format, request.source_locale, request.target_locale, BASE_REQUIREMENTS
    );

    if let Some(instructions) = request.instructions {
        prompt.push('\n');
        prompt.push_str(instructions);
        prompt.push('\n');
    }

    prompt.push_str(indoc! {"

        Return a JSON object of the form {\"items\": [...]} with exactly one
        translated string per input, in the same order. Use null for any text
        you cannot translate. Do not return anything else.

        Texts to translate:
    "});

    for (index, (key, text)) in request.items.iter().enumerate() {
        prompt.push_str(&format!("{}. [{}]\n{}\n\n", index + 1, key, text));
    }

    prompt
}

/// Prompt for a whole-document translation. The answer is the translated
/// document only, no JSON wrapper.
pub fn document_prompt(request: &DocumentRequest<'_>) -> String {
    let mut prompt = format!(
        "You are a professional translator working with {} documents.\n\n\
         Translate the document below from {} to {}.\n\n{}",
        request.format, request.source_locale, request.target_locale, BASE_REQUIREMENTS
    );

    if let Some(instructions) = request.instructions {
        prompt.push('\n');
        prompt.push_str(instructions);
        prompt.push('\n');
    }

    prompt.push_str(
        "\nReturn only the translated document, preserving all markup and structure.\n\n",
    );
    prompt.push_str(request.content);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::FormatType;

    #[test]
    fn test_batch_prompt_lists_items_in_order() {
        let request = BatchRequest {
            source_locale: "en",
            target_locale: "fr",
            format: FormatType::Json,
            instructions: None,
            items: vec![("a.b", "hello"), ("a.c", "world")],
        };
        let prompt = batch_prompt(&request);
        let first = prompt.find("1. [a.b]").unwrap();
        let second = prompt.find("2. [a.c]").unwrap();
        assert!(first < second);
        assert!(prompt.contains("from en to fr"));
    }

    #[test]
    fn test_batch_prompt_includes_instructions() {
        let request = BatchRequest {
            source_locale: "en",
            target_locale: "de",
            format: FormatType::Yaml,
            instructions: Some("Use informal address (du, not Sie)."),
            items: vec![("k", "v")],
        };
        assert!(batch_prompt(&request).contains("informal address"));
    }

    #[test]
    fn test_document_prompt_embeds_content() {
        let request = DocumentRequest {
            source_locale: "en",
            target_locale: "ja",
            format: FormatType::Markdown,
            instructions: None,
            content: "# Hello\n\nBody text.",
        };
        let prompt = document_prompt(&request);
        assert!(prompt.contains("# Hello"));
        assert!(prompt.contains("from en to ja"));
    }
}
