//! TEI (Text Embeddings Inference) client for vector generation.

use std::time::Duration;

use serde::Serialize;

use crate::error::SentimentError;

/// Maximum number of texts per /embed call.
pub const BATCH_SIZE: usize = 64;

/// TEI HTTP client.
pub struct TeiClient {
    client: reqwest::Client,
    url: String,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    inputs: &'a [&'a str],
    truncate: bool,
}

impl TeiClient {
    /// Create a new `TeiClient` for the server at `tei_url`.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Http`] if the HTTP client cannot be built.
    pub fn new(tei_url: &str, timeout_secs: u64) -> Result<Self, SentimentError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            url: format!("{}/embed", tei_url.trim_end_matches('/')),
        })
    }

    /// Generate embeddings for a batch of texts.
    ///
    /// Texts are batched into groups of [`BATCH_SIZE`] per request and sent
    /// sequentially. Returns one embedding vector per input text, in the same
    /// order. Inputs longer than the model window are truncated server-side.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Tei`] if the request fails or the response
    /// cannot be parsed.
    pub async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, SentimentError> {
        let mut all_embeddings = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(BATCH_SIZE) {
            let request = EmbedRequest {
                inputs: chunk,
                truncate: true,
            };
            let response = self
                .client
                .post(&self.url)
                .json(&request)
                .send()
                .await
                .map_err(|e| SentimentError::Tei(format!("TEI request failed: {e}")))?;

            if !response.status().is_success() {
                return Err(SentimentError::Tei(format!(
                    "TEI returned status {}",
                    response.status()
                )));
            }

            let embeddings: Vec<Vec<f32>> = response
                .json()
                .await
                .map_err(|e| SentimentError::Tei(format!("TEI response parse error: {e}")))?;

            if embeddings.len() != chunk.len() {
                return Err(SentimentError::Tei(format!(
                    "TEI returned {} embeddings for {} inputs",
                    embeddings.len(),
                    chunk.len()
                )));
            }

            all_embeddings.extend(embeddings);
        }

        Ok(all_embeddings)
    }
}
