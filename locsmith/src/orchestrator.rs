//! Per-(locale, chunk) translation orchestration.
//!
//! The chunk lifecycle is `Pending → Requested → {Complete |
//! PartiallyComplete → RetryRequested → Complete | Failed}`. The
//! at-most-one-retry contract is held as data on the report
//! ([`ChunkAttempts`]) rather than buried in control flow: `calls` counts
//! backend attempts for the initial request, `retry_requested` records
//! whether the single unresolved-keys retry went out.

use crate::backend::{BatchRequest, DocumentRequest, RetryPolicy, TranslationBackend};
use crate::debug::debug;
use crate::error::Error;
use crate::flatten::FlatMap;
use crate::formats::{FormatType, LiteralScanner, StringMatch};
use crate::types::{TranslationResult, TranslationUnit};

/// Shared per-call context: locale pair, format, optional custom
/// instructions, and the external retry budget for backend errors.
#[derive(Debug, Clone, Copy)]
pub struct ChunkContext<'a> {
    pub source_locale: &'a str,
    pub target_locale: &'a str,
    pub format: FormatType,
    pub instructions: Option<&'a str>,
    pub retry: RetryPolicy,
}

/// Terminal state of one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkState {
    /// Every key resolved.
    Complete,
    /// Some keys stayed unresolved after the single retry; resolved keys
    /// are still merged.
    PartiallyComplete,
    /// The backend call budget was exhausted; nothing from this chunk is
    /// merged.
    Failed,
}

/// Attempt accounting, kept as data so the retry contract is inspectable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkAttempts {
    /// Backend calls made for the initial request (1 unless the backend
    /// errored and was retried under the external budget).
    pub calls: u32,
    /// Whether the single unresolved-keys retry request was issued.
    pub retry_requested: bool,
}

/// Outcome of translating one chunk for one locale.
#[derive(Debug, Clone)]
pub struct ChunkReport {
    pub chunk_index: usize,
    pub state: ChunkState,
    pub attempts: ChunkAttempts,
    /// Resolved translations, in chunk order.
    pub results: Vec<TranslationResult>,
    /// Keys that received no result after the single retry.
    pub unresolved: Vec<String>,
    /// Failure message when `state` is [`ChunkState::Failed`].
    pub error: Option<String>,
}

impl ChunkReport {
    fn failed(chunk_index: usize, attempts: ChunkAttempts, error: Error) -> Self {
        ChunkReport {
            chunk_index,
            state: ChunkState::Failed,
            attempts,
            results: Vec::new(),
            unresolved: Vec::new(),
            error: Some(error.to_string()),
        }
    }
}

/// Translate one chunk of units: a single batched call, then at most one
/// retry carrying only the keys the model did not answer.
pub async fn translate_chunk(
    backend: &dyn TranslationBackend,
    units: &[TranslationUnit],
    chunk_index: usize,
    ctx: &ChunkContext<'_>,
) -> ChunkReport {
    let mut attempts = ChunkAttempts::default();

    let request = BatchRequest {
        source_locale: ctx.source_locale,
        target_locale: ctx.target_locale,
        format: ctx.format,
        instructions: ctx.instructions,
        items: units
            .iter()
            .map(|u| (u.key.as_str(), u.source_text.as_str()))
            .collect(),
    };

    let mut answers = match call_batch(backend, &request, ctx.retry, &mut attempts.calls).await {
        Ok(answers) => answers,
        Err(error) => return ChunkReport::failed(chunk_index, attempts, error),
    };
    answers.resize(units.len(), None);

    // Exactly one retry for whatever came back null.
    let pending: Vec<usize> = (0..units.len()).filter(|&i| answers[i].is_none()).collect();
    if !pending.is_empty() {
        attempts.retry_requested = true;
        debug(format!(
            "chunk {}: retrying {} unresolved keys",
            chunk_index,
            pending.len()
        ));

        let retry_request = BatchRequest {
            items: pending
                .iter()
                .map(|&i| (units[i].key.as_str(), units[i].source_text.as_str()))
                .collect(),
            ..request
        };

        let mut retry_calls = 0;
        if let Ok(retried) =
            call_batch(backend, &retry_request, ctx.retry, &mut retry_calls).await
        {
            for (slot, answer) in pending.iter().zip(retried) {
                answers[*slot] = answer;
            }
        }
        // A failed retry leaves its keys unresolved; the chunk itself
        // already progressed.
    }

    let mut results = Vec::new();
    let mut unresolved = Vec::new();
    for (unit, answer) in units.iter().zip(answers) {
        match answer {
            Some(text) => results.push(TranslationResult {
                key: unit.key.clone(),
                translated_text: Some(text),
            }),
            None => unresolved.push(unit.key.clone()),
        }
    }

    let state = if unresolved.is_empty() {
        ChunkState::Complete
    } else {
        ChunkState::PartiallyComplete
    };

    ChunkReport {
        chunk_index,
        state,
        attempts,
        results,
        unresolved,
        error: None,
    }
}

async fn call_batch(
    backend: &dyn TranslationBackend,
    request: &BatchRequest<'_>,
    retry: RetryPolicy,
    calls: &mut u32,
) -> Result<Vec<Option<String>>, Error> {
    let mut last_error = None;
    for _ in 0..retry.max_attempts.max(1) {
        *calls += 1;
        match backend.translate_batch(request).await {
            Ok(answers) => return Ok(answers),
            Err(error) => last_error = Some(error),
        }
    }
    Err(last_error.unwrap_or_else(|| Error::backend_error("no attempts made", None)))
}

/// Translate a whole document. A missing result means "no content
/// produced": the caller merges nothing.
pub async fn translate_document(
    backend: &dyn TranslationBackend,
    content: &str,
    ctx: &ChunkContext<'_>,
) -> Result<Option<String>, Error> {
    let request = DocumentRequest {
        source_locale: ctx.source_locale,
        target_locale: ctx.target_locale,
        format: ctx.format,
        instructions: ctx.instructions,
        content,
    };

    let mut last_error = None;
    for _ in 0..ctx.retry.max_attempts.max(1) {
        match backend.translate_document(&request).await {
            Ok(result) => return Ok(result),
            Err(error) => last_error = Some(error),
        }
    }
    Err(last_error.unwrap_or_else(|| Error::backend_error("no attempts made", None)))
}

/// Outcome of a source-code translation pass.
#[derive(Debug, Clone)]
pub struct SourceReport {
    /// The rebuilt source text for the target locale.
    pub content: String,
    /// How many literals were sent for translation.
    pub translated: usize,
    /// Literal contents that stayed unresolved (kept in source language).
    pub unresolved: Vec<String>,
}

/// Translate the changed string literals of a source-code file as one
/// batched list call, rebuild the file by position, and keep unchanged
/// positions stable by reusing the previous translation's literal at the
/// same scan index.
pub async fn translate_source(
    backend: &dyn TranslationBackend,
    scanner: &LiteralScanner,
    current_source: &str,
    changed: &[usize],
    previous_translation: Option<&str>,
    ctx: &ChunkContext<'_>,
) -> Result<SourceReport, Error> {
    let matches = scanner.scan(current_source);
    let previous_matches: Vec<StringMatch> = previous_translation
        .map(|text| scanner.scan(text))
        .unwrap_or_default();

    let units: Vec<TranslationUnit> = changed
        .iter()
        .filter(|&&i| i < matches.len())
        .map(|&i| TranslationUnit::new(i.to_string(), matches[i].inner(), ""))
        .collect();

    let mut replacements: Vec<Option<String>> = Vec::with_capacity(matches.len());
    for (i, m) in matches.iter().enumerate() {
        if changed.contains(&i) {
            replacements.push(None); // filled from the batch below
        } else if let Some(previous) = previous_matches.get(i) {
            replacements.push(Some(previous.inner().to_string()));
        } else {
            replacements.push(Some(m.inner().to_string()));
        }
    }

    let mut unresolved = Vec::new();
    if !units.is_empty() {
        let report = translate_chunk(backend, &units, 0, ctx).await;
        if let ChunkState::Failed = report.state {
            return Err(Error::backend_error(
                report
                    .error
                    .unwrap_or_else(|| "source batch failed".to_string()),
                None,
            ));
        }
        for result in report.results {
            let index: usize = result.key.parse().map_err(|_| {
                Error::Encoding(format!("unexpected literal key `{}`", result.key))
            })?;
            replacements[index] = result.translated_text;
        }
        for key in report.unresolved {
            let index: usize = key
                .parse()
                .map_err(|_| Error::Encoding(format!("unexpected literal key `{}`", key)))?;
            unresolved.push(matches[index].inner().to_string());
            // Unresolved changed literals keep their source content.
            replacements[index] = Some(matches[index].inner().to_string());
        }
    }

    Ok(SourceReport {
        content: scanner.replace(current_source, &matches, &replacements),
        translated: units.len(),
        unresolved,
    })
}

/// Collect resolved chunk results into a flat map for merging.
pub fn results_to_flat_map(reports: &[ChunkReport]) -> FlatMap {
    let mut flat = FlatMap::new();
    for report in reports {
        for result in &report.results {
            if let Some(text) = &result.translated_text {
                flat.insert(result.key.clone(), text.clone());
            }
        }
    }
    flat
}
