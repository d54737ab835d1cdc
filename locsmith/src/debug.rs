//! Env-gated debug logging to stderr.
//!
//! Enabled by setting `LOCSMITH_DEBUG=1` (or any non-empty value other than
//! `0`). Kept deliberately small: the engine reports through run reports,
//! this is only for tracing orchestration decisions during development.

use std::sync::OnceLock;

static ENABLED: OnceLock<bool> = OnceLock::new();

/// Whether debug output is enabled for this process.
pub fn enabled() -> bool {
    *ENABLED.get_or_init(|| {
        std::env::var("LOCSMITH_DEBUG")
            .map(|v| !v.is_empty() && v != "0")
            .unwrap_or(false)
    })
}

/// Print a debug line to stderr when `LOCSMITH_DEBUG` is set.
pub fn debug(message: impl AsRef<str>) {
    if enabled() {
        eprintln!("[locsmith] {}", message.as_ref());
    }
}
