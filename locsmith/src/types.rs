//! Core, format-agnostic types for the translation engine.

use serde::{Deserialize, Serialize};

/// One translatable unit extracted from a source file. Identity is
/// `(source_file, key)`; units are derived per run from the current source
/// and discarded afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TranslationUnit {
    pub key: String,
    pub source_text: String,
    pub source_file: String,
}

impl TranslationUnit {
    pub fn new(
        key: impl Into<String>,
        source_text: impl Into<String>,
        source_file: impl Into<String>,
    ) -> Self {
        TranslationUnit {
            key: key.into(),
            source_text: source_text.into(),
            source_file: source_file.into(),
        }
    }

    /// The unit's contribution to a chunk's content volume.
    pub fn size(&self) -> usize {
        self.key.len() + self.source_text.len()
    }
}

/// The outcome of translating one unit. `None` marks a key the model failed
/// to return, eligible for the single retry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TranslationResult {
    pub key: String,
    pub translated_text: Option<String>,
}

/// Source-provider metadata carried on a run and forwarded to the storage
/// collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Provenance {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub branch: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub commit: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub commit_message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub commit_link: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub source_provider: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub user_id: Option<String>,
}
