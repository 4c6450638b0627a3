use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tokio::time::sleep;
use tracing::warn;

use crate::config::GenerationSettings;

// Single fixed-delay retry; no backoff loop.
const RETRY_DELAY_MS: u64 = 500;

/// Generated text at or below this length (after trimming) is unusable and
/// is replaced by the deterministic placeholder.
pub const MIN_USEFUL_CHARS: usize = 50;

const TEMPERATURE: f64 = 0.7;
const TOP_K: i64 = 40;
const TOP_P: f64 = 0.95;
const MAX_OUTPUT_TOKENS: i64 = 4096;

#[derive(Debug, Clone, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Clone, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Clone, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation not configured: {0}")]
    NotConfigured(&'static str),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("JSON decode failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("empty response")]
    EmptyCandidates,
}

#[derive(Clone)]
pub struct GenerationProvider {
    settings: GenerationSettings,
    client: reqwest::Client,
}

impl GenerationProvider {
    pub fn from_env() -> Self {
        Self::new(GenerationSettings::from_env())
    }

    pub fn new(settings: GenerationSettings) -> Self {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { settings, client }
    }

    pub fn is_available(&self) -> bool {
        self.settings
            .api_key
            .as_deref()
            .is_some_and(|v| !v.trim().is_empty())
    }

    /// One prompt-completion call against the generateContent endpoint.
    pub async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .ok_or(GenerationError::NotConfigured("GEMINI_API_KEY"))?;

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.settings.api_endpoint, self.settings.model, api_key
        );
        let payload = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": TEMPERATURE,
                "topK": TOP_K,
                "topP": TOP_P,
                "maxOutputTokens": MAX_OUTPUT_TOKENS,
            },
        });

        let response = self.post_with_retry(&url, &payload).await?;
        response
            .first_text()
            .map(|s| s.to_string())
            .ok_or(GenerationError::EmptyCandidates)
    }

    /// Best-effort generation for a concept description: any failure or
    /// unusably short output is logged and replaced with the deterministic
    /// placeholder, never surfaced to the caller as an error.
    pub async fn describe_concept(&self, concept_name: &str, prompt: &str) -> String {
        if !self.is_available() {
            return placeholder(concept_name);
        }

        match self.generate(prompt).await {
            Ok(text) => match usable(&text) {
                Some(useful) => useful.to_string(),
                None => {
                    warn!(concept = concept_name, "generation output too short");
                    placeholder(concept_name)
                }
            },
            Err(err) => {
                warn!(concept = concept_name, error = %err, "generation failed");
                placeholder(concept_name)
            }
        }
    }

    async fn post_with_retry(
        &self,
        url: &str,
        payload: &serde_json::Value,
    ) -> Result<GenerateContentResponse, GenerationError> {
        let mut retried = false;

        loop {
            match self.client.post(url).json(payload).send().await {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        let bytes = resp.bytes().await?;
                        return serde_json::from_slice(&bytes).map_err(|e| {
                            let body = String::from_utf8_lossy(&bytes);
                            tracing::error!(error = %e, %body, "generation response parse failed");
                            GenerationError::Json(e)
                        });
                    }
                    let body = resp.text().await.unwrap_or_default();
                    let err = GenerationError::HttpStatus { status, body };
                    if !retried && is_retryable(status) {
                        warn!(?status, "generation request failed, retrying once");
                        sleep(Duration::from_millis(RETRY_DELAY_MS)).await;
                        retried = true;
                        continue;
                    }
                    return Err(err);
                }
                Err(e) => {
                    if !retried {
                        warn!(error = %e, "generation request error, retrying once");
                        sleep(Duration::from_millis(RETRY_DELAY_MS)).await;
                        retried = true;
                        continue;
                    }
                    return Err(GenerationError::Request(e));
                }
            }
        }
    }
}

/// Returns the trimmed text when it clears the usefulness threshold.
pub fn usable(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    (trimmed.len() > MIN_USEFUL_CHARS).then_some(trimmed)
}

/// Deterministic substitute description; always references the concept name.
pub fn placeholder(concept_name: &str) -> String {
    format!("Comprehensive guide to {concept_name}. Click to view detailed explanation.")
}

fn is_retryable(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::TOO_MANY_REQUESTS
        || status == reqwest::StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_unusable() {
        assert!(usable("short answer").is_none());
        assert!(usable("   ").is_none());
        assert!(usable(&"x".repeat(MIN_USEFUL_CHARS)).is_none());
    }

    #[test]
    fn test_long_text_is_usable_and_trimmed() {
        let text = format!("  {}  ", "a".repeat(MIN_USEFUL_CHARS + 1));
        assert_eq!(usable(&text), Some("a".repeat(MIN_USEFUL_CHARS + 1).as_str()));
    }

    #[test]
    fn test_placeholder_references_concept() {
        let text = placeholder("Linked Lists");
        assert!(text.contains("Linked Lists"));
        assert!(!text.is_empty());
    }

    #[test]
    fn test_response_text_extraction() {
        let raw = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "generated body"}]}}
            ]
        }"#;
        let parsed: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.first_text(), Some("generated body"));
    }

    #[test]
    fn test_empty_response_has_no_text() {
        let parsed: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.first_text(), None);
    }
}
