#![forbid(unsafe_code)]
//! Incremental, diff-aware localization engine.
//!
//! locsmith extracts translatable strings from a project's source-of-truth
//! files, sends only what changed to a language-model backend, and writes
//! the results back into the same file formats without disturbing
//! structure, comments, or untouched translations.
//!
//! # Quick Start
//!
//! ```rust
//! use locsmith::formats::FormatType;
//!
//! // Every format round-trips through the flat key→text representation.
//! let parser = FormatType::Json.parser().unwrap();
//! let flat = parser.parse(r#"{"a": {"b": "hello"}}"#)?;
//! assert_eq!(flat.get("a.b").unwrap(), "hello");
//!
//! let text = parser.serialize("fr", &flat, None)?;
//! assert_eq!(parser.parse(&text)?, flat);
//! # Ok::<(), locsmith::Error>(())
//! ```
//!
//! # Pipeline
//!
//! source file → change detection (vs. the previous-source snapshot) →
//! chunk planning → batched translation with one unresolved-keys retry →
//! merge over the previous target → format serialization → target file.
//!
//! # Guarantees
//!
//! - Structural fidelity: `unflatten(flatten(x)) == x`, and every format's
//!   `parse(serialize(m)) == m` for supported value kinds.
//! - Idempotence: untouched keys keep their previous translated text
//!   byte-for-byte across reruns.
//! - Failure isolation: one failed chunk of one locale never corrupts other
//!   chunks, other locales, or previously translated content.

pub mod backend;
pub mod chunk;
pub mod config;
pub mod debug;
pub mod diff;
pub mod engine;
pub mod error;
pub mod flatten;
pub mod formats;
pub mod key;
pub mod merge;
pub mod orchestrator;
pub mod prompt;
pub mod snapshot;
pub mod store;
pub mod traits;
pub mod types;

// Re-export most used types for easy consumption
pub use crate::{
    backend::{BatchRequest, DocumentRequest, OpenAiBackend, RetryPolicy, TranslationBackend},
    config::{Config, FileGroup, LocaleConfig, ModelConfig},
    engine::{
        Engine, EngineOptions, FileOutcome, ProjectReport, RunReport, RunRequest,
        TranslateOptions,
    },
    error::Error,
    flatten::{FlatMap, Node, flatten, unflatten},
    formats::{FormatType, LiteralScanner, TranslationStrategy},
    traits::FormatParser,
    types::{Provenance, TranslationResult, TranslationUnit},
};
