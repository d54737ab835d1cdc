//! Project configuration surface.
//!
//! The on-disk form is TOML (the CLI reads `locsmith.toml`), but the
//! structure itself is plain serde so service callers can feed it from
//! anywhere. File patterns contain a `[locale]` placeholder substituted per
//! target locale.

use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use unic_langid::LanguageIdentifier;

use crate::error::Error;
use crate::formats::FormatType;

/// Placeholder replaced with the concrete locale in include patterns.
pub const LOCALE_PLACEHOLDER: &str = "[locale]";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    pub locale: LocaleConfig,

    /// Per-format file groups, keyed by format identifier (`json`, `po`,
    /// `md`, ...).
    pub files: IndexMap<String, FileGroup>,

    #[serde(default)]
    pub model: ModelConfig,

    /// Extra instructions appended to every translation prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LocaleConfig {
    /// The locale the source files are written in.
    pub source: String,
    /// Locales to translate into.
    pub targets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FileGroup {
    /// Paths with a `[locale]` placeholder, e.g. `locales/[locale].json`.
    pub include: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ModelConfig {
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default)]
    pub temperature: f32,

    /// Override for the provider base URL (self-hosted or proxy setups).
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub api_url: Option<String>,
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            provider: default_provider(),
            model: default_model(),
            temperature: 0.0,
            api_url: None,
        }
    }
}

impl Config {
    /// Check locales, formats, and patterns before a run starts, so
    /// misconfiguration fails fast instead of mid-fan-out.
    pub fn validate(&self) -> Result<(), Error> {
        if self.locale.targets.is_empty() {
            return Err(Error::Config("locale.targets must not be empty".to_string()));
        }

        for locale in std::iter::once(&self.locale.source).chain(&self.locale.targets) {
            locale.parse::<LanguageIdentifier>().map_err(|_| {
                Error::Config(format!("`{}` is not a valid locale identifier", locale))
            })?;
        }

        if self.files.is_empty() {
            return Err(Error::Config("no file groups configured".to_string()));
        }

        for (format_id, group) in &self.files {
            FormatType::from_str(format_id)
                .map_err(|_| Error::Config(format!("unknown format `{}`", format_id)))?;

            for pattern in &group.include {
                if !pattern.contains(LOCALE_PLACEHOLDER) {
                    return Err(Error::Config(format!(
                        "pattern `{}` is missing the {} placeholder",
                        pattern, LOCALE_PLACEHOLDER
                    )));
                }
            }
        }

        Ok(())
    }

    /// The target locales a run should cover, optionally narrowed to one.
    pub fn target_locales(&self, filter: Option<&str>) -> Result<Vec<String>, Error> {
        match filter {
            None => Ok(self.locale.targets.clone()),
            Some(locale) => {
                if self.locale.targets.iter().any(|t| t == locale) {
                    Ok(vec![locale.to_string()])
                } else {
                    Err(Error::Config(format!(
                        "invalid target locale: {}. Available locales: {}",
                        locale,
                        self.locale.targets.join(", ")
                    )))
                }
            }
        }
    }
}

/// Substitute the `[locale]` placeholder in a file pattern.
pub fn substitute_locale(pattern: &str, locale: &str) -> String {
    pattern.replace(LOCALE_PLACEHOLDER, locale)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        Config {
            locale: LocaleConfig {
                source: "en".to_string(),
                targets: vec!["fr".to_string(), "de".to_string()],
            },
            files: IndexMap::from([(
                "json".to_string(),
                FileGroup {
                    include: vec!["locales/[locale].json".to_string()],
                },
            )]),
            model: ModelConfig::default(),
            instructions: None,
        }
    }

    #[test]
    fn test_valid_config_passes() {
        sample().validate().unwrap();
    }

    #[test]
    fn test_empty_targets_rejected() {
        let mut config = sample();
        config.locale.targets.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_locale_rejected() {
        let mut config = sample();
        config.locale.targets.push("not a locale".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_format_rejected() {
        let mut config = sample();
        config.files.insert(
            "ini".to_string(),
            FileGroup {
                include: vec!["x/[locale].ini".to_string()],
            },
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_pattern_without_placeholder_rejected() {
        let mut config = sample();
        config.files.get_mut("json").unwrap().include = vec!["locales/en.json".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_target_locale_filter() {
        let config = sample();
        assert_eq!(config.target_locales(Some("fr")).unwrap(), ["fr"]);
        assert_eq!(config.target_locales(None).unwrap(), ["fr", "de"]);
        assert!(config.target_locales(Some("ja")).is_err());
    }

    #[test]
    fn test_substitute_locale() {
        assert_eq!(
            substitute_locale("locales/[locale].json", "pt-BR"),
            "locales/pt-BR.json"
        );
    }

    #[test]
    fn test_roundtrips_through_serde() {
        let config = sample();
        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
