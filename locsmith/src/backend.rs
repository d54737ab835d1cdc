//! The translation backend seam and the OpenAI-compatible HTTP
//! implementation.
//!
//! The orchestrator only ever talks to [`TranslationBackend`]; tests swap in
//! scripted implementations, production wires [`OpenAiBackend`] at an
//! OpenAI-compatible `chat/completions` endpoint.

use async_trait::async_trait;
use serde_json::json;

use crate::debug::debug;
use crate::error::Error;
use crate::formats::FormatType;
use crate::prompt;

/// A batched key/value translation request. `items` are `(key, source
/// text)` pairs; responses are index-aligned with them.
#[derive(Debug, Clone)]
pub struct BatchRequest<'a> {
    pub source_locale: &'a str,
    pub target_locale: &'a str,
    pub format: FormatType,
    pub instructions: Option<&'a str>,
    pub items: Vec<(&'a str, &'a str)>,
}

/// A whole-document translation request.
#[derive(Debug, Clone)]
pub struct DocumentRequest<'a> {
    pub source_locale: &'a str,
    pub target_locale: &'a str,
    pub format: FormatType,
    pub instructions: Option<&'a str>,
    pub content: &'a str,
}

/// External retry budget for backend calls. Counts total attempts, so
/// `max_attempts: 1` means no retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy { max_attempts: 4 }
    }
}

/// A translation provider.
///
/// `translate_batch` must return one entry per input item, in input order;
/// `None` marks a text the provider produced no translation for.
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    async fn translate_batch(
        &self,
        request: &BatchRequest<'_>,
    ) -> Result<Vec<Option<String>>, Error>;

    async fn translate_document(
        &self,
        request: &DocumentRequest<'_>,
    ) -> Result<Option<String>, Error>;
}

/// Backend speaking the OpenAI-compatible `chat/completions` protocol.
/// Works against OpenAI itself and any compatible server (Ollama, vLLM,
/// gateway proxies) by pointing `base_url` elsewhere.
pub struct OpenAiBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl OpenAiBackend {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        OpenAiBackend {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            temperature: 0.0,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    async fn complete(&self, prompt: String) -> Result<String, Error> {
        let body = json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": [
                {"role": "user", "content": prompt}
            ],
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::backend_error("request failed", Some(Box::new(e))))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::backend_error(
                format!("backend returned {}: {}", status, text),
                None,
            ));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::backend_error("invalid response body", Some(Box::new(e))))?;

        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| Error::backend_error("response missing message content", None))
    }
}

#[async_trait]
impl TranslationBackend for OpenAiBackend {
    async fn translate_batch(
        &self,
        request: &BatchRequest<'_>,
    ) -> Result<Vec<Option<String>>, Error> {
        if request.items.is_empty() {
            return Ok(Vec::new());
        }

        debug(format!(
            "translating {} items to {}",
            request.items.len(),
            request.target_locale
        ));

        let content = self.complete(prompt::batch_prompt(request)).await?;
        Ok(parse_batch_response(&content, request.items.len()))
    }

    async fn translate_document(
        &self,
        request: &DocumentRequest<'_>,
    ) -> Result<Option<String>, Error> {
        let content = self.complete(prompt::document_prompt(request)).await?;
        let trimmed = content.trim();
        if trimmed.is_empty() {
            Ok(None)
        } else {
            Ok(Some(content))
        }
    }
}

/// Decode a batch answer into index-aligned options. Accepts `{"items":
/// [...]}` or a bare array (some compatible servers drop the wrapper);
/// anything unparseable counts as no answer for every item.
fn parse_batch_response(content: &str, expected: usize) -> Vec<Option<String>> {
    let value: serde_json::Value = match serde_json::from_str(content.trim()) {
        Ok(v) => v,
        Err(_) => return vec![None; expected],
    };

    let items = match &value {
        serde_json::Value::Array(items) => items.as_slice(),
        serde_json::Value::Object(map) => match map.get("items").and_then(|v| v.as_array()) {
            Some(items) => items.as_slice(),
            None => return vec![None; expected],
        },
        _ => return vec![None; expected],
    };

    (0..expected)
        .map(|i| items.get(i).and_then(|v| v.as_str()).map(|s| s.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_batch_response_wrapped() {
        let parsed = parse_batch_response(r#"{"items": ["un", "deux"]}"#, 2);
        assert_eq!(parsed, vec![Some("un".to_string()), Some("deux".to_string())]);
    }

    #[test]
    fn test_parse_batch_response_bare_array() {
        let parsed = parse_batch_response(r#"["a"]"#, 1);
        assert_eq!(parsed, vec![Some("a".to_string())]);
    }

    #[test]
    fn test_parse_batch_response_nulls_and_short_answers() {
        let parsed = parse_batch_response(r#"{"items": ["x", null]}"#, 3);
        assert_eq!(parsed, vec![Some("x".to_string()), None, None]);
    }

    #[test]
    fn test_parse_batch_response_garbage() {
        let parsed = parse_batch_response("not json at all", 2);
        assert_eq!(parsed, vec![None, None]);
    }

    #[test]
    fn test_retry_policy_default() {
        assert_eq!(RetryPolicy::default().max_attempts, 4);
    }
}
