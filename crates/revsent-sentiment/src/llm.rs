//! Language-model seam and the Gemini `generateContent` client behind it.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SentimentError;
use crate::retry::retry_with_backoff;

/// A model that turns a prompt into raw (expected JSON) text.
#[async_trait]
pub trait SentimentModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, SentimentError>;
}

/// Settings for [`GeminiClient`].
#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
    /// Extra attempts on transient failures. `0` disables retrying.
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

/// Google Gemini HTTP client requesting `application/json` output.
pub struct GeminiClient {
    client: reqwest::Client,
    url: String,
    api_key: String,
    max_retries: u32,
    retry_backoff_ms: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GeminiClient {
    /// Build a client for `settings.model`.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Http`] if the HTTP client cannot be built.
    pub fn new(settings: &GeminiSettings) -> Result<Self, SentimentError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            settings.base_url.trim_end_matches('/'),
            settings.model
        );
        Ok(Self {
            client,
            url,
            api_key: settings.api_key.clone(),
            max_retries: settings.max_retries,
            retry_backoff_ms: settings.retry_backoff_ms,
        })
    }

    async fn generate_once(&self, prompt: &str) -> Result<String, SentimentError> {
        let body = GenerateRequest {
            contents: [Content {
                role: "user",
                parts: [RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
        };

        let resp = self
            .client
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(SentimentError::ModelInvocation {
                status: Some(status.as_u16()),
                message: format!("Gemini returned status {status}: {detail}"),
            });
        }

        let parsed: GenerateResponse = resp.json().await?;
        extract_text(parsed)
    }
}

#[async_trait]
impl SentimentModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, SentimentError> {
        retry_with_backoff(self.max_retries, self.retry_backoff_ms, || {
            self.generate_once(prompt)
        })
        .await
    }
}

/// Concatenate the text parts of the first candidate.
fn extract_text(response: GenerateResponse) -> Result<String, SentimentError> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "no candidates returned".to_string());
        return Err(SentimentError::ModelInvocation {
            status: None,
            message: format!("Gemini produced no answer: {reason}"),
        });
    };

    let text: String = candidate
        .content
        .map(|c| c.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|p| p.text)
        .collect();

    if text.trim().is_empty() {
        return Err(SentimentError::ModelInvocation {
            status: None,
            message: "Gemini returned an empty answer".to_string(),
        });
    }

    Ok(text)
}
