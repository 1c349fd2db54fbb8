/// Collaborative-filtering model abstraction
///
/// Training happens outside this crate; the factorizer only has to honour the
/// output contract: one row of latent factors per catalog item, in id order.
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::Interaction,
    store::EmbeddingMatrix,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait InteractionFactorizer: Send + Sync {
    /// Fit item factors from the interaction table
    async fn fit(&self, interactions: &[Interaction], num_items: usize)
        -> AppResult<EmbeddingMatrix>;

    fn name(&self) -> &'static str;
}

#[derive(Serialize)]
struct FitRequest<'a> {
    num_items: usize,
    factors: usize,
    interactions: &'a [Interaction],
}

#[derive(Deserialize)]
struct FitResponse {
    item_factors: Vec<Vec<f32>>,
}

/// Factorizer backed by an HTTP matrix-factorization service
#[derive(Clone)]
pub struct HttpFactorizer {
    http_client: HttpClient,
    url: String,
    factors: usize,
}

impl HttpFactorizer {
    pub fn new(url: String, factors: usize) -> Self {
        Self {
            http_client: HttpClient::new(),
            url,
            factors,
        }
    }
}

#[async_trait::async_trait]
impl InteractionFactorizer for HttpFactorizer {
    async fn fit(
        &self,
        interactions: &[Interaction],
        num_items: usize,
    ) -> AppResult<EmbeddingMatrix> {
        tracing::info!(
            factorizer = self.name(),
            interactions = interactions.len(),
            num_items,
            factors = self.factors,
            "Requesting item factors"
        );

        let response = self
            .http_client
            .post(&self.url)
            .json(&FitRequest {
                num_items,
                factors: self.factors,
                interactions,
            })
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("factorizer request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Internal(format!(
                "factorizer returned status {}: {}",
                status, body
            )));
        }

        let body: FitResponse = response
            .json()
            .await
            .map_err(|e| AppError::Internal(format!("malformed factorizer response: {}", e)))?;

        EmbeddingMatrix::from_rows(body.item_factors)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
