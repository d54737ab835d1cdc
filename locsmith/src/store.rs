//! Storage collaborator interface.
//!
//! The engine reports finished work to an external store (a database, an
//! API, a log). The trait is narrow on purpose: one call per translated
//! chunk batch, one per translated document, both carrying provenance.

use async_trait::async_trait;

use crate::error::Error;
use crate::formats::FormatType;
use crate::types::Provenance;

/// One persisted key translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRecord {
    pub key: String,
    pub source_text: String,
    pub translated_text: Option<String>,
    pub source_file: String,
}

/// A batch of key translations for one (project, locale pair).
#[derive(Debug, Clone)]
pub struct TranslationBatch<'a> {
    pub project_id: &'a str,
    pub organization_id: &'a str,
    pub source_format: FormatType,
    pub source_locale: &'a str,
    pub target_locale: &'a str,
    pub provenance: &'a Provenance,
    pub translations: Vec<TranslationRecord>,
}

/// A translated document for one (project, locale pair).
#[derive(Debug, Clone)]
pub struct DocumentRecord<'a> {
    pub project_id: &'a str,
    pub organization_id: &'a str,
    pub source_format: FormatType,
    pub source_locale: &'a str,
    pub target_locale: &'a str,
    pub provenance: &'a Provenance,
    pub source_file: &'a str,
    pub source_text: &'a str,
    pub translated_text: &'a str,
}

#[async_trait]
pub trait TranslationStore: Send + Sync {
    async fn create_translations(&self, batch: TranslationBatch<'_>) -> Result<(), Error>;
    async fn create_document(&self, record: DocumentRecord<'_>) -> Result<(), Error>;
}
