use std::path::Path;

use locsmith::config::substitute_locale;
use locsmith::diff::{changed_keys, changed_literals};
use locsmith::formats::{FormatType, LiteralScanner, TranslationStrategy};
use locsmith::snapshot::SnapshotStore;

use crate::translate::load_config;

/// Run the status command: report pending work per (file, locale) without
/// touching the translation backend.
pub fn run() -> i32 {
    let config = match load_config() {
        Ok(config) => config,
        Err(message) => {
            eprintln!("Error: {}", message);
            return 1;
        }
    };

    let snapshots = SnapshotStore::new(Path::new(".locsmith").join("snapshots"));
    let scanner = LiteralScanner::new();
    let mut pending_total = 0usize;
    let mut had_errors = false;

    for (format_id, group) in &config.files {
        let format: FormatType = match format_id.parse() {
            Ok(format) => format,
            Err(e) => {
                eprintln!("Error: {}", e);
                had_errors = true;
                continue;
            }
        };

        for pattern in &group.include {
            let source_path = substitute_locale(pattern, &config.locale.source);
            let current = match std::fs::read_to_string(&source_path) {
                Ok(text) => text,
                Err(e) => {
                    eprintln!("Error reading {}: {}", source_path, e);
                    had_errors = true;
                    continue;
                }
            };
            let previous = snapshots.load(&source_path).ok().flatten();

            let pending = match format.strategy() {
                TranslationStrategy::Document => {
                    usize::from(previous.as_deref() != Some(current.as_str()))
                }
                TranslationStrategy::SourceCode => {
                    let matches = scanner.scan(&current);
                    match &previous {
                        None => matches.len(),
                        Some(previous) => {
                            changed_literals(previous, &current, &matches).len()
                        }
                    }
                }
                TranslationStrategy::KeyValue => {
                    let parser = format.parser().expect("key-value format");
                    match parser.parse(&current) {
                        Ok(source_map) => {
                            let previous_map =
                                previous.as_deref().and_then(|text| parser.parse(text).ok());
                            changed_keys(previous_map.as_ref(), &source_map).len()
                        }
                        Err(e) => {
                            eprintln!("Error parsing {}: {}", source_path, e);
                            had_errors = true;
                            continue;
                        }
                    }
                }
            };

            pending_total += pending * config.locale.targets.len();
            println!(
                "{}: {} pending key(s) × {} locale(s)",
                source_path,
                pending,
                config.locale.targets.len()
            );
        }
    }

    if pending_total == 0 && !had_errors {
        println!("Everything up to date.");
    }

    if had_errors { 1 } else { 0 }
}
