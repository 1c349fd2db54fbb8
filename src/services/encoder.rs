/// Query encoder abstraction
///
/// Maps free text into the semantic embedding space. The production encoder
/// is a remote sentence-embedding service; tests inject deterministic stubs.
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Trait for text encoders sharing the coordinate space of the semantic matrix
///
/// Calls are made with no implicit timeout and are never retried; a failure
/// propagates to the caller as `AppError::Encoding`.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait QueryEncoder: Send + Sync {
    /// Encode a single piece of text
    async fn encode(&self, text: &str) -> AppResult<Vec<f32>>;

    /// Encode a batch of texts, one output row per input, in order
    ///
    /// Default implementation encodes each text sequentially.
    async fn encode_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        let mut rows = Vec::with_capacity(texts.len());
        for text in texts {
            rows.push(self.encode(text).await?);
        }
        Ok(rows)
    }

    /// Encoder name for logging and debugging
    fn name(&self) -> &'static str;
}

#[derive(Serialize)]
struct EncodeRequest<'a> {
    inputs: &'a [String],
}

#[derive(Deserialize)]
struct EncodeResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Encoder backed by an HTTP sentence-embedding service
///
/// Sends `{"inputs": [...]}` and expects `{"embeddings": [[...], ...]}`.
#[derive(Clone)]
pub struct HttpEncoder {
    http_client: HttpClient,
    url: String,
}

impl HttpEncoder {
    pub fn new(url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            url,
        }
    }
}

#[async_trait::async_trait]
impl QueryEncoder for HttpEncoder {
    async fn encode(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut rows = self.encode_batch(&[text.to_string()]).await?;
        if rows.len() != 1 {
            return Err(AppError::Encoding(format!(
                "expected 1 embedding, encoder returned {}",
                rows.len()
            )));
        }
        Ok(rows.remove(0))
    }

    #[tracing::instrument(skip(self, texts), fields(encoder = self.name(), count = texts.len()))]
    async fn encode_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        let response = self
            .http_client
            .post(&self.url)
            .json(&EncodeRequest { inputs: texts })
            .send()
            .await
            .map_err(|e| AppError::Encoding(format!("encoder request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Encoding(format!(
                "encoder returned status {}: {}",
                status, body
            )));
        }

        let body: EncodeResponse = response
            .json()
            .await
            .map_err(|e| AppError::Encoding(format!("malformed encoder response: {}", e)))?;

        if body.embeddings.len() != texts.len() {
            return Err(AppError::Encoding(format!(
                "sent {} texts, encoder returned {} embeddings",
                texts.len(),
                body.embeddings.len()
            )));
        }

        Ok(body.embeddings)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
