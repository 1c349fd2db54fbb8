use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A catalog row. `id` indexes directly into both embedding matrices.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub id: usize,
    pub title: String,
}

/// A single user-item interaction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Interaction {
    pub user: u64,
    pub item: usize,
    pub interaction: f32,
}

/// Tuning knobs for a single `recommend` call
///
/// The buffer multipliers over-fetch before the interaction filter and the
/// deduplication step. They are a heuristic: when they are too small the
/// result is silently shorter than requested, never an error.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RecommendParams {
    /// Semantic seed items kept after interaction filtering
    #[serde(alias = "K_use")]
    pub k_use: usize,
    /// Collaborative neighbors drawn per seed
    #[serde(alias = "K_mf")]
    pub k_mf: usize,
    /// Hard cap on the final result length
    pub n_to_recommend: usize,
    pub use_buffer_multiplier: usize,
    pub mf_buffer_multiplier: usize,
}

impl Default for RecommendParams {
    fn default() -> Self {
        Self {
            k_use: 2,
            k_mf: 5,
            n_to_recommend: 5,
            use_buffer_multiplier: 10,
            mf_buffer_multiplier: 10,
        }
    }
}

impl RecommendParams {
    /// Number of semantic candidates fetched before interaction filtering
    pub fn semantic_fetch(&self) -> usize {
        self.k_use.saturating_mul(self.use_buffer_multiplier)
    }

    /// Number of collaborative neighbors fetched per seed before deduplication
    pub fn collaborative_fetch(&self) -> usize {
        self.k_mf.saturating_mul(self.mf_buffer_multiplier)
    }
}

/// Request body for the recommendations endpoint
#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub query: String,
    #[serde(flatten)]
    pub params: RecommendParams,
}

/// Ordered recommendation titles for a query
#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub query: String,
    pub titles: Vec<String>,
}

/// Summary of the loaded catalog and embedding spaces
#[derive(Debug, Serialize, Deserialize)]
pub struct CatalogStats {
    pub items: usize,
    pub interacted_items: usize,
    pub semantic_dim: usize,
    pub collaborative_dim: usize,
    pub loaded_at: DateTime<Utc>,
}
