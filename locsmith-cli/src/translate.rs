use std::path::Path;
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use locsmith::engine::{Engine, EngineOptions, TranslateOptions};
use locsmith::{Config, OpenAiBackend, RetryPolicy};

use crate::init::CONFIG_FILE;

/// Read and validate `locsmith.toml` from the current directory.
pub fn load_config() -> Result<Config, String> {
    let text = std::fs::read_to_string(CONFIG_FILE)
        .map_err(|_| format!("{} not found. Run `locsmith init` first.", CONFIG_FILE))?;
    let config: Config =
        toml::from_str(&text).map_err(|e| format!("invalid {}: {}", CONFIG_FILE, e))?;
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

fn build_backend(config: &Config) -> Result<OpenAiBackend, String> {
    let (default_url, needs_key) = match config.model.provider.as_str() {
        "ollama" => ("http://localhost:11434/v1", false),
        _ => ("https://api.openai.com/v1", true),
    };
    let base_url = config
        .model
        .api_url
        .clone()
        .unwrap_or_else(|| default_url.to_string());

    let api_key = match std::env::var("OPENAI_API_KEY") {
        Ok(key) => key,
        Err(_) if !needs_key => String::new(),
        Err(_) => {
            return Err(
                "OPENAI_API_KEY is not set. Export it or switch model.provider to ollama."
                    .to_string(),
            );
        }
    };

    Ok(OpenAiBackend::new(base_url, api_key, config.model.model.clone())
        .with_temperature(config.model.temperature))
}

/// Run the translate command against the current directory.
pub async fn run(locale: Option<String>, force: bool) -> i32 {
    let config = match load_config() {
        Ok(config) => config,
        Err(message) => {
            eprintln!("Error: {}", message);
            return 1;
        }
    };

    let backend = match build_backend(&config) {
        Ok(backend) => backend,
        Err(message) => {
            eprintln!("Error: {}", message);
            return 1;
        }
    };

    let engine = Engine::new(Arc::new(backend)).with_options(EngineOptions {
        retry: RetryPolicy::default(),
        instructions: config.instructions.clone(),
        after_translate: None,
    });

    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {wide_msg}")
            .unwrap(),
    );
    progress.set_message("Checking for changes and translating to target locales...");

    let options = TranslateOptions {
        force,
        locale_filter: locale,
    };
    let report = match engine
        .translate_project(&config, Path::new("."), &options)
        .await
    {
        Ok(report) => report,
        Err(e) => {
            progress.finish_with_message("❌ Translation failed");
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    progress.finish_with_message("Translation completed");

    let mut changed = 0;
    for outcome in report.changed() {
        changed += 1;
        println!(
            "✓ Translated {} {} key(s) for {} -> {}",
            outcome.translated_keys,
            if force { "total" } else { "new" },
            outcome.locale,
            outcome.target_path,
        );
        for key in &outcome.unresolved {
            eprintln!("  ⚠ no translation produced for `{}`", key);
        }
        for failure in &outcome.failures {
            eprintln!(
                "  ✗ chunk {} failed after {} attempt(s): {}",
                failure.chunk_index, failure.attempts, failure.message
            );
        }
    }
    if changed == 0 {
        println!("No {}keys to translate", if force { "" } else { "new " });
    }

    for error in &report.errors {
        eprintln!(
            "Error translating {} to {}: {}",
            error.source_path, error.locale, error.message
        );
    }

    let failed = !report.errors.is_empty()
        || report.outcomes.iter().any(|o| !o.failures.is_empty());
    if failed { 1 } else { 0 }
}
