use axum::{extract::State, http::StatusCode, Extension, Json};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{CatalogStats, RecommendationRequest, RecommendationResponse},
};

use super::AppState;

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Recommend catalog titles for a free-text query
///
/// Body: `query` plus any of `k_use` (alias `K_use`), `k_mf` (alias `K_mf`),
/// `n_to_recommend`, `use_buffer_multiplier`, `mf_buffer_multiplier`. Omitted
/// knobs take their defaults.
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    if request.query.trim().is_empty() {
        return Err(AppError::InvalidInput("query must not be empty".to_string()));
    }

    tracing::info!(
        request_id = %request_id,
        k_use = request.params.k_use,
        k_mf = request.params.k_mf,
        n_to_recommend = request.params.n_to_recommend,
        "Processing recommendation request"
    );

    let titles = state
        .recommender
        .recommend(&request.query, &request.params)
        .await?;

    tracing::info!(
        request_id = %request_id,
        returned = titles.len(),
        "Recommendation completed"
    );

    Ok(Json(RecommendationResponse {
        query: request.query,
        titles,
    }))
}

/// Describe the loaded catalog and embedding spaces
pub async fn catalog_stats(State(state): State<AppState>) -> Json<CatalogStats> {
    let recommender = &state.recommender;
    Json(CatalogStats {
        items: recommender.catalog().len(),
        interacted_items: recommender.interacted().len(),
        semantic_dim: recommender.semantic_dim(),
        collaborative_dim: recommender.collaborative_dim(),
        loaded_at: state.loaded_at,
    })
}
