//! Run-level orchestration.
//!
//! Two entry points share the same chunk machinery:
//!
//! - [`Engine::translate_run`] serves scheduler callers: units are already
//!   extracted, results go back as a report plus storage calls.
//! - [`Engine::translate_project`] serves the CLI: it walks the configured
//!   file patterns, detects changes against the snapshot store, translates,
//!   merges, and writes target files.
//!
//! All chunks across all (locale × pattern) combinations are dispatched
//! concurrently; each (file, locale) pair is owned by exactly one task, so
//! nothing in a run contends on writes. Failure isolation boundary is one
//! chunk of one locale.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::join_all;

use crate::backend::{RetryPolicy, TranslationBackend};
use crate::chunk::{chunk_budget, plan_chunks};
use crate::config::{Config, substitute_locale};
use crate::debug::debug;
use crate::diff::{changed_keys, changed_literals};
use crate::error::Error;
use crate::flatten::FlatMap;
use crate::formats::{FormatType, LiteralScanner, TranslationStrategy, markdown};
use crate::merge::merge_flat_maps;
use crate::orchestrator::{
    ChunkContext, ChunkReport, ChunkState, results_to_flat_map, translate_chunk,
    translate_document, translate_source,
};
use crate::snapshot::SnapshotStore;
use crate::store::{DocumentRecord, TranslationBatch, TranslationRecord, TranslationStore};
use crate::types::{Provenance, TranslationResult, TranslationUnit};

/// Post-serialization formatting hook, applied to the final text before it
/// is persisted.
pub type AfterTranslateHook = Arc<dyn Fn(String, &Path) -> Result<String, Error> + Send + Sync>;

pub struct EngineOptions {
    pub retry: RetryPolicy,
    pub instructions: Option<String>,
    pub after_translate: Option<AfterTranslateHook>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            retry: RetryPolicy::default(),
            instructions: None,
            after_translate: None,
        }
    }
}

pub struct Engine {
    backend: Arc<dyn TranslationBackend>,
    store: Option<Arc<dyn TranslationStore>>,
    scanner: LiteralScanner,
    options: EngineOptions,
}

/// Input for a scheduler-driven run: identifiers, locale fan-out, and the
/// units already extracted from the current source.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub project_id: String,
    pub organization_id: String,
    pub source_format: FormatType,
    pub source_locale: String,
    pub target_locales: Vec<String>,
    pub provenance: Provenance,
    pub units: Vec<TranslationUnit>,
}

/// One failed chunk, with enough detail to retry just that unit of work.
#[derive(Debug, Clone)]
pub struct ChunkFailure {
    pub locale: String,
    pub source_file: String,
    pub chunk_index: usize,
    pub attempts: u32,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct LocaleReport {
    pub target_locale: String,
    pub translations: Vec<TranslationResult>,
    pub unresolved: Vec<String>,
    pub failures: Vec<ChunkFailure>,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub locales: Vec<LocaleReport>,
}

impl RunReport {
    /// A run succeeds as a whole if at least one chunk progressed.
    pub fn progressed(&self) -> bool {
        self.locales
            .iter()
            .any(|l| !l.translations.is_empty() || l.failures.is_empty())
    }
}

/// CLI-level options for a project run.
#[derive(Debug, Clone, Default)]
pub struct TranslateOptions {
    /// Bypass change detection and select every key.
    pub force: bool,
    /// Restrict the run to one target locale.
    pub locale_filter: Option<String>,
}

/// Result of processing one (file pattern, locale) pair.
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub locale: String,
    pub source_path: String,
    pub target_path: String,
    pub translated_keys: usize,
    pub unresolved: Vec<String>,
    pub failures: Vec<ChunkFailure>,
    pub no_changes: bool,
}

/// A file-level failure; the run continues for other files.
#[derive(Debug, Clone)]
pub struct FileError {
    pub source_path: String,
    pub locale: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct ProjectReport {
    pub outcomes: Vec<FileOutcome>,
    pub errors: Vec<FileError>,
}

impl ProjectReport {
    pub fn changed(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|o| !o.no_changes)
    }
}

impl Engine {
    pub fn new(backend: Arc<dyn TranslationBackend>) -> Self {
        Engine {
            backend,
            store: None,
            scanner: LiteralScanner::new(),
            options: EngineOptions::default(),
        }
    }

    pub fn with_store(mut self, store: Arc<dyn TranslationStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_scanner(mut self, scanner: LiteralScanner) -> Self {
        self.scanner = scanner;
        self
    }

    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    fn chunk_context<'a>(&'a self, request_locale: &'a str, target: &'a str, format: FormatType) -> ChunkContext<'a> {
        ChunkContext {
            source_locale: request_locale,
            target_locale: target,
            format,
            instructions: self.options.instructions.as_deref(),
            retry: self.options.retry,
        }
    }

    /// Translate pre-extracted units into every target locale of the
    /// request. Document formats send the whole first unit; everything else
    /// is chunked and fanned out concurrently.
    pub async fn translate_run(&self, request: &RunRequest) -> Result<RunReport, Error> {
        match request.source_format.strategy() {
            TranslationStrategy::Document => self.run_document(request).await,
            _ => self.run_keyed(request).await,
        }
    }

    async fn run_document(&self, request: &RunRequest) -> Result<RunReport, Error> {
        let document = request.units.first();

        let tasks = request.target_locales.iter().map(|locale| async move {
            let Some(unit) = document else {
                return LocaleReport {
                    target_locale: locale.clone(),
                    translations: Vec::new(),
                    unresolved: Vec::new(),
                    failures: Vec::new(),
                };
            };

            let ctx = self.chunk_context(&request.source_locale, locale, request.source_format);
            match translate_document(self.backend.as_ref(), &unit.source_text, &ctx).await {
                Ok(Some(translated)) => LocaleReport {
                    target_locale: locale.clone(),
                    translations: vec![TranslationResult {
                        key: markdown::CONTENT_KEY.to_string(),
                        translated_text: Some(translated),
                    }],
                    unresolved: Vec::new(),
                    failures: Vec::new(),
                },
                // "No content produced": nothing to merge, not a failure.
                Ok(None) => LocaleReport {
                    target_locale: locale.clone(),
                    translations: Vec::new(),
                    unresolved: vec![markdown::CONTENT_KEY.to_string()],
                    failures: Vec::new(),
                },
                Err(error) => LocaleReport {
                    target_locale: locale.clone(),
                    translations: Vec::new(),
                    unresolved: Vec::new(),
                    failures: vec![ChunkFailure {
                        locale: locale.clone(),
                        source_file: unit.source_file.clone(),
                        chunk_index: 0,
                        attempts: self.options.retry.max_attempts,
                        message: error.to_string(),
                    }],
                },
            }
        });

        let locales = join_all(tasks).await;

        if let (Some(store), Some(unit)) = (&self.store, document) {
            for report in &locales {
                if let Some(translated) = report
                    .translations
                    .first()
                    .and_then(|t| t.translated_text.as_deref())
                {
                    store
                        .create_document(DocumentRecord {
                            project_id: &request.project_id,
                            organization_id: &request.organization_id,
                            source_format: request.source_format,
                            source_locale: &request.source_locale,
                            target_locale: &report.target_locale,
                            provenance: &request.provenance,
                            source_file: &unit.source_file,
                            source_text: &unit.source_text,
                            translated_text: translated,
                        })
                        .await?;
                }
            }
        }

        Ok(RunReport { locales })
    }

    async fn run_keyed(&self, request: &RunRequest) -> Result<RunReport, Error> {
        let mut tasks = Vec::new();
        for locale in &request.target_locales {
            let ranges = plan_chunks(&request.units, chunk_budget(locale));
            for (index, range) in ranges.into_iter().enumerate() {
                tasks.push(async move {
                    let ctx =
                        self.chunk_context(&request.source_locale, locale, request.source_format);
                    let units = &request.units[range];
                    let report =
                        translate_chunk(self.backend.as_ref(), units, index, &ctx).await;
                    (locale.as_str(), units, report)
                });
            }
        }

        debug(format!(
            "dispatching {} chunks across {} locales",
            tasks.len(),
            request.target_locales.len()
        ));
        let outcomes = join_all(tasks).await;

        if let Some(store) = &self.store {
            for (locale, units, report) in &outcomes {
                if report.state == ChunkState::Failed {
                    continue;
                }
                let translations = units
                    .iter()
                    .map(|unit| TranslationRecord {
                        key: unit.key.clone(),
                        source_text: unit.source_text.clone(),
                        translated_text: report
                            .results
                            .iter()
                            .find(|r| r.key == unit.key)
                            .and_then(|r| r.translated_text.clone()),
                        source_file: unit.source_file.clone(),
                    })
                    .collect();
                store
                    .create_translations(TranslationBatch {
                        project_id: &request.project_id,
                        organization_id: &request.organization_id,
                        source_format: request.source_format,
                        source_locale: &request.source_locale,
                        target_locale: *locale,
                        provenance: &request.provenance,
                        translations,
                    })
                    .await?;
            }
        }

        let locales = request
            .target_locales
            .iter()
            .map(|locale| {
                let mut report = LocaleReport {
                    target_locale: locale.clone(),
                    translations: Vec::new(),
                    unresolved: Vec::new(),
                    failures: Vec::new(),
                };
                for (chunk_locale, units, chunk) in &outcomes {
                    if *chunk_locale != locale.as_str() {
                        continue;
                    }
                    report.translations.extend(chunk.results.iter().cloned());
                    report.unresolved.extend(chunk.unresolved.iter().cloned());
                    if chunk.state == ChunkState::Failed {
                        report.failures.push(ChunkFailure {
                            locale: locale.clone(),
                            source_file: units
                                .first()
                                .map(|u| u.source_file.clone())
                                .unwrap_or_default(),
                            chunk_index: chunk.chunk_index,
                            attempts: chunk.attempts.calls,
                            message: chunk.error.clone().unwrap_or_default(),
                        });
                    }
                }
                report
            })
            .collect();

        Ok(RunReport { locales })
    }

    /// Walk the configured file patterns, translate what changed, and write
    /// target files. Snapshots advance only for source files whose every
    /// locale completed cleanly, so failed work stays pending for the next
    /// run.
    pub async fn translate_project(
        &self,
        config: &Config,
        root: &Path,
        options: &TranslateOptions,
    ) -> Result<ProjectReport, Error> {
        config.validate()?;
        let locales = config.target_locales(options.locale_filter.as_deref())?;
        let snapshots = SnapshotStore::new(root.join(".locsmith").join("snapshots"));

        let mut work = Vec::new();
        for (format_id, group) in &config.files {
            let format: FormatType = format_id.parse()?;
            for pattern in &group.include {
                for locale in &locales {
                    work.push((format, pattern.as_str(), locale.as_str()));
                }
            }
        }

        let tasks = work.iter().map(|(format, pattern, locale)| {
            self.translate_file(
                *format,
                pattern,
                &config.locale.source,
                locale,
                root,
                &snapshots,
                options.force,
            )
        });

        let mut outcomes = Vec::new();
        let mut errors = Vec::new();
        for result in join_all(tasks).await {
            match result {
                Ok(outcome) => outcomes.push(outcome),
                Err(error) => errors.push(error),
            }
        }

        // Advance snapshots for source files with no failed work.
        let mut clean: Vec<&str> = Vec::new();
        for outcome in &outcomes {
            let source_path = outcome.source_path.as_str();
            let failed_elsewhere = outcomes
                .iter()
                .any(|o| o.source_path == source_path && !o.failures.is_empty())
                || errors.iter().any(|e| e.source_path == source_path);
            if !failed_elsewhere && !clean.contains(&source_path) {
                clean.push(source_path);
            }
        }
        for source_path in clean {
            match tokio::fs::read_to_string(root.join(source_path)).await {
                Ok(content) => snapshots.save(source_path, &content)?,
                Err(_) => {}
            }
        }

        Ok(ProjectReport { outcomes, errors })
    }

    #[allow(clippy::too_many_arguments)]
    async fn translate_file(
        &self,
        format: FormatType,
        pattern: &str,
        source_locale: &str,
        locale: &str,
        root: &Path,
        snapshots: &SnapshotStore,
        force: bool,
    ) -> Result<FileOutcome, FileError> {
        let source_path = substitute_locale(pattern, source_locale);
        let target_path = substitute_locale(pattern, locale);

        let fail = |message: String| FileError {
            source_path: source_path.clone(),
            locale: locale.to_string(),
            message,
        };

        let current = tokio::fs::read_to_string(root.join(&source_path))
            .await
            .map_err(|e| fail(format!("cannot read source: {}", e)))?;
        let previous = snapshots
            .load(&source_path)
            .map_err(|e| fail(e.to_string()))?;
        let previous_target = match tokio::fs::read_to_string(root.join(&target_path)).await {
            Ok(text) => Some(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(fail(format!("cannot read target: {}", e))),
        };

        let outcome = |translated, unresolved, failures, no_changes| FileOutcome {
            locale: locale.to_string(),
            source_path: source_path.clone(),
            target_path: target_path.clone(),
            translated_keys: translated,
            unresolved,
            failures,
            no_changes,
        };

        let ctx = self.chunk_context(source_locale, locale, format);

        match format.strategy() {
            TranslationStrategy::Document => {
                if !force
                    && previous.as_deref() == Some(current.as_str())
                    && previous_target.is_some()
                {
                    return Ok(outcome(0, Vec::new(), Vec::new(), true));
                }

                match translate_document(self.backend.as_ref(), &current, &ctx).await {
                    Ok(Some(translated)) => {
                        self.write_target(root, &target_path, translated)
                            .await
                            .map_err(|e| fail(e.to_string()))?;
                        Ok(outcome(1, Vec::new(), Vec::new(), false))
                    }
                    Ok(None) => Ok(outcome(
                        0,
                        vec![markdown::CONTENT_KEY.to_string()],
                        Vec::new(),
                        false,
                    )),
                    Err(error) => Ok(outcome(
                        0,
                        Vec::new(),
                        vec![ChunkFailure {
                            locale: locale.to_string(),
                            source_file: source_path.clone(),
                            chunk_index: 0,
                            attempts: self.options.retry.max_attempts,
                            message: error.to_string(),
                        }],
                        false,
                    )),
                }
            }

            TranslationStrategy::SourceCode => {
                let matches = self.scanner.scan(&current);
                let changed: Vec<usize> = if force || previous_target.is_none() {
                    (0..matches.len()).collect()
                } else {
                    changed_literals(previous.as_deref().unwrap_or(""), &current, &matches)
                };

                if changed.is_empty() && previous_target.is_some() {
                    return Ok(outcome(0, Vec::new(), Vec::new(), true));
                }

                match translate_source(
                    self.backend.as_ref(),
                    &self.scanner,
                    &current,
                    &changed,
                    previous_target.as_deref(),
                    &ctx,
                )
                .await
                {
                    Ok(report) => {
                        self.write_target(root, &target_path, report.content)
                            .await
                            .map_err(|e| fail(e.to_string()))?;
                        Ok(outcome(report.translated, report.unresolved, Vec::new(), false))
                    }
                    Err(error) => Ok(outcome(
                        0,
                        Vec::new(),
                        vec![ChunkFailure {
                            locale: locale.to_string(),
                            source_file: source_path.clone(),
                            chunk_index: 0,
                            attempts: self.options.retry.max_attempts,
                            message: error.to_string(),
                        }],
                        false,
                    )),
                }
            }

            TranslationStrategy::KeyValue => {
                let parser = format
                    .parser()
                    .expect("key-value formats always have a parser");

                let source_map = parser.parse(&current).map_err(|e| fail(e.to_string()))?;
                let previous_map: Option<FlatMap> =
                    previous.as_deref().and_then(|text| parser.parse(text).ok());
                let previous_target_map: Option<FlatMap> = previous_target
                    .as_deref()
                    .and_then(|text| parser.parse(text).ok());

                let pending: Vec<String> = if force || previous_target.is_none() {
                    source_map.keys().cloned().collect()
                } else {
                    changed_keys(previous_map.as_ref(), &source_map)
                };

                if pending.is_empty() {
                    return Ok(outcome(0, Vec::new(), Vec::new(), true));
                }

                let units: Vec<TranslationUnit> = pending
                    .iter()
                    .map(|key| {
                        TranslationUnit::new(
                            key.clone(),
                            source_map.get(key).cloned().unwrap_or_default(),
                            source_path.clone(),
                        )
                    })
                    .collect();

                let ranges = plan_chunks(&units, chunk_budget(locale));
                let reports: Vec<ChunkReport> = join_all(
                    ranges
                        .into_iter()
                        .enumerate()
                        .map(|(i, range)| translate_chunk(self.backend.as_ref(), &units[range], i, &ctx)),
                )
                .await;

                let fresh = results_to_flat_map(&reports);
                let mut unresolved = Vec::new();
                let mut failures = Vec::new();
                for report in &reports {
                    unresolved.extend(report.unresolved.iter().cloned());
                    if report.state == ChunkState::Failed {
                        failures.push(ChunkFailure {
                            locale: locale.to_string(),
                            source_file: source_path.clone(),
                            chunk_index: report.chunk_index,
                            attempts: report.attempts.calls,
                            message: report.error.clone().unwrap_or_default(),
                        });
                    }
                }

                // Nothing translated and nothing to preserve: leave the
                // target alone rather than writing an empty shell.
                if fresh.is_empty() && previous_target.is_none() {
                    return Ok(outcome(0, unresolved, failures, false));
                }

                let merged = merge_flat_maps(&source_map, previous_target_map.as_ref(), &fresh);
                let serialized = parser
                    .serialize(locale, &merged, previous_target.as_deref())
                    .map_err(|e| fail(e.to_string()))?;
                self.write_target(root, &target_path, serialized)
                    .await
                    .map_err(|e| fail(e.to_string()))?;

                Ok(outcome(fresh.len(), unresolved, failures, false))
            }
        }
    }

    async fn write_target(
        &self,
        root: &Path,
        target_path: &str,
        content: String,
    ) -> Result<(), Error> {
        let content = match &self.options.after_translate {
            Some(hook) => hook(content, Path::new(target_path))?,
            None => content,
        };

        let absolute: PathBuf = root.join(target_path);
        if let Some(parent) = absolute.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(absolute, content).await?;
        Ok(())
    }
}
