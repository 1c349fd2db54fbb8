use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::RecommendParams,
    services::{encoder::QueryEncoder, neighbors::find_nearest},
    store::{
        Catalog, EmbeddingMatrix, InteractedSet, COLLABORATIVE_EMBEDDINGS_FILE,
        SEMANTIC_EMBEDDINGS_FILE,
    },
};

/// Ordered, duplicate-free run of recommended item ids for a single call
#[derive(Debug, Default, Clone)]
pub struct Accumulator {
    order: Vec<usize>,
    seen: HashSet<usize>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends up to `limit` ids from `candidates` that are not already present
    ///
    /// Candidate order is preserved. Returns how many ids were appended.
    pub fn extend_unique(&mut self, candidates: &[usize], limit: usize) -> usize {
        let mut added = 0;
        for &id in candidates {
            if added == limit {
                break;
            }
            if self.seen.insert(id) {
                self.order.push(id);
                added += 1;
            }
        }
        added
    }

    pub fn contains(&self, id: usize) -> bool {
        self.seen.contains(&id)
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.order
    }

    /// Consumes the accumulator, keeping the first `n` ids
    pub fn into_truncated(mut self, n: usize) -> Vec<usize> {
        self.order.truncate(n);
        self.order
    }
}

/// Keeps candidates with interaction history, in order, up to `k_use`
pub fn select_seeds(candidates: &[usize], interacted: &InteractedSet, k_use: usize) -> Vec<usize> {
    candidates
        .iter()
        .copied()
        .filter(|&id| interacted.contains(id))
        .take(k_use)
        .collect()
}

/// Seeds from the semantic candidates, then expands each seed into its
/// collaborative neighbors and deduplicates into at most `n_to_recommend` ids
///
/// `neighbors_of(seed, k)` must return the seed's `k` nearest collaborative
/// neighbors, nearest first. Seeds are processed in order because each
/// expansion is deduplicated against everything chosen before it.
pub fn rank_candidates<F>(
    semantic_candidates: &[usize],
    interacted: &InteractedSet,
    params: &RecommendParams,
    mut neighbors_of: F,
) -> Vec<usize>
where
    F: FnMut(usize, usize) -> Vec<usize>,
{
    let seeds = select_seeds(semantic_candidates, interacted, params.k_use);
    tracing::debug!(
        candidates = semantic_candidates.len(),
        seeds = seeds.len(),
        k_use = params.k_use,
        "Selected seed items"
    );

    let mut accumulator = Accumulator::new();
    for seed in seeds {
        let neighbors = neighbors_of(seed, params.collaborative_fetch());
        let added = accumulator.extend_unique(&neighbors, params.k_mf);
        tracing::debug!(seed, fetched = neighbors.len(), added, "Expanded seed");
    }

    accumulator.into_truncated(params.n_to_recommend)
}

/// Hybrid semantic + collaborative recommender
///
/// Holds both embedding spaces, the catalog and the interacted set. All of it
/// is read-only after construction, so a single instance can serve concurrent
/// calls behind an `Arc`.
pub struct Recommender {
    encoder: Arc<dyn QueryEncoder>,
    semantic: EmbeddingMatrix,
    collaborative: EmbeddingMatrix,
    catalog: Catalog,
    interacted: InteractedSet,
}

impl Recommender {
    /// Assembles a recommender, validating that every part is row-aligned to the catalog
    pub fn from_parts(
        encoder: Arc<dyn QueryEncoder>,
        semantic: EmbeddingMatrix,
        collaborative: EmbeddingMatrix,
        catalog: Catalog,
        interacted: InteractedSet,
    ) -> AppResult<Self> {
        for (name, matrix) in [("semantic", &semantic), ("collaborative", &collaborative)] {
            if matrix.rows() != catalog.len() {
                return Err(AppError::Schema(format!(
                    "{} embeddings have {} rows but the catalog has {} items",
                    name,
                    matrix.rows(),
                    catalog.len()
                )));
            }
        }

        if let Some(max_id) = interacted.max_id() {
            if max_id >= catalog.len() {
                return Err(AppError::Schema(format!(
                    "interactions reference item {} but the catalog has {} items",
                    max_id,
                    catalog.len()
                )));
            }
        }

        Ok(Self {
            encoder,
            semantic,
            collaborative,
            catalog,
            interacted,
        })
    }

    /// Loads the tables and serialised matrices from disk
    pub fn load(
        items_path: &Path,
        interactions_path: &Path,
        serialised_dir: &Path,
        encoder: Arc<dyn QueryEncoder>,
    ) -> AppResult<Self> {
        let catalog = Catalog::load(items_path)?;
        let interacted = InteractedSet::load(interactions_path)?;
        let semantic = EmbeddingMatrix::load(&serialised_dir.join(SEMANTIC_EMBEDDINGS_FILE))?;
        let collaborative =
            EmbeddingMatrix::load(&serialised_dir.join(COLLABORATIVE_EMBEDDINGS_FILE))?;

        Self::from_parts(encoder, semantic, collaborative, catalog, interacted)
    }

    /// Recommends item titles for a free-text query
    ///
    /// The result holds at most `params.n_to_recommend` titles with no repeated
    /// item. It may be shorter, or empty, when too few candidates survive the
    /// interaction filter or deduplication; that is not an error.
    #[tracing::instrument(skip(self, params), fields(encoder = self.encoder.name()))]
    pub async fn recommend(&self, query: &str, params: &RecommendParams) -> AppResult<Vec<String>> {
        let encoded = self.encoder.encode(query).await?;
        let ids = self.recommend_ids(&encoded, params)?;

        if ids.len() < params.n_to_recommend {
            tracing::warn!(
                produced = ids.len(),
                requested = params.n_to_recommend,
                "Recommendation list under-filled"
            );
        }

        self.resolve_titles(&ids)
    }

    /// Runs the retrieval pipeline for an already-encoded query
    pub fn recommend_ids(&self, encoded: &[f32], params: &RecommendParams) -> AppResult<Vec<usize>> {
        if !self.semantic.is_empty() && encoded.len() != self.semantic.dim() {
            return Err(AppError::Encoding(format!(
                "query embedding has {} dimensions, semantic space has {}",
                encoded.len(),
                self.semantic.dim()
            )));
        }

        let candidates = find_nearest(encoded, &self.semantic, params.semantic_fetch());

        Ok(rank_candidates(
            &candidates,
            &self.interacted,
            params,
            |seed, k| match self.collaborative.row(seed) {
                Some(row) => find_nearest(row, &self.collaborative, k),
                None => Vec::new(),
            },
        ))
    }

    fn resolve_titles(&self, ids: &[usize]) -> AppResult<Vec<String>> {
        ids.iter()
            .map(|&id| {
                self.catalog
                    .title(id)
                    .map(str::to_string)
                    .ok_or_else(|| AppError::Internal(format!("item {} has no title", id)))
            })
            .collect()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn interacted(&self) -> &InteractedSet {
        &self.interacted
    }

    pub fn semantic_dim(&self) -> usize {
        self.semantic.dim()
    }

    pub fn collaborative_dim(&self) -> usize {
        self.collaborative.dim()
    }
}
