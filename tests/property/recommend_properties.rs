use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;

use qrec_api::{
    error::AppResult,
    models::{Item, RecommendParams},
    services::{
        neighbors::{euclidean_distance, find_nearest},
        recommender::select_seeds,
        QueryEncoder, Recommender,
    },
    store::{Catalog, EmbeddingMatrix, InteractedSet},
};

/// `recommend_ids` takes pre-encoded queries, so the encoder is never called
struct UnusedEncoder;

#[async_trait::async_trait]
impl QueryEncoder for UnusedEncoder {
    async fn encode(&self, _text: &str) -> AppResult<Vec<f32>> {
        Ok(Vec::new())
    }

    fn name(&self) -> &'static str {
        "unused"
    }
}

#[derive(Debug, Clone)]
struct Scenario {
    semantic: Vec<Vec<f32>>,
    collaborative: Vec<Vec<f32>>,
    interacted: Vec<bool>,
    query: Vec<f32>,
}

impl Scenario {
    fn interacted_set(&self) -> InteractedSet {
        self.interacted
            .iter()
            .enumerate()
            .filter(|(_, &flag)| flag)
            .map(|(id, _)| id)
            .collect()
    }

    fn recommender(&self) -> Recommender {
        let catalog = Catalog::from_items(
            (0..self.semantic.len())
                .map(|id| Item {
                    id,
                    title: format!("item {}", id),
                })
                .collect(),
        )
        .unwrap();

        Recommender::from_parts(
            Arc::new(UnusedEncoder),
            EmbeddingMatrix::from_rows(self.semantic.clone()).unwrap(),
            EmbeddingMatrix::from_rows(self.collaborative.clone()).unwrap(),
            catalog,
            self.interacted_set(),
        )
        .unwrap()
    }
}

fn scenario() -> impl Strategy<Value = Scenario> {
    (0usize..12, 1usize..4, 1usize..4).prop_flat_map(|(n, semantic_dim, mf_dim)| {
        (
            prop::collection::vec(prop::collection::vec(-10.0f32..10.0, semantic_dim), n),
            prop::collection::vec(prop::collection::vec(-10.0f32..10.0, mf_dim), n),
            prop::collection::vec(any::<bool>(), n),
            prop::collection::vec(-10.0f32..10.0, semantic_dim),
        )
            .prop_map(|(semantic, collaborative, interacted, query)| Scenario {
                semantic,
                collaborative,
                interacted,
                query,
            })
    })
}

fn params() -> impl Strategy<Value = RecommendParams> {
    (0usize..5, 0usize..5, 0usize..10, 1usize..5, 1usize..5).prop_map(
        |(k_use, k_mf, n_to_recommend, use_buffer_multiplier, mf_buffer_multiplier)| {
            RecommendParams {
                k_use,
                k_mf,
                n_to_recommend,
                use_buffer_multiplier,
                mf_buffer_multiplier,
            }
        },
    )
}

/// Nearest-first indices by sorting every row on (distance, index)
fn sorted_by_distance(query: &[f32], rows: &[Vec<f32>]) -> Vec<usize> {
    let mut scored: Vec<(f32, usize)> = rows
        .iter()
        .enumerate()
        .map(|(id, row)| (euclidean_distance(query, row), id))
        .collect();
    scored.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    scored.into_iter().map(|(_, id)| id).collect()
}

/// Straight-line rendition of the pipeline using plain vectors
fn reference_pipeline(scenario: &Scenario, params: &RecommendParams) -> Vec<usize> {
    let seeds: Vec<usize> = sorted_by_distance(&scenario.query, &scenario.semantic)
        .into_iter()
        .take(params.k_use * params.use_buffer_multiplier)
        .filter(|&id| scenario.interacted[id])
        .take(params.k_use)
        .collect();

    let mut recs: Vec<usize> = Vec::new();
    for seed in seeds {
        let fresh: Vec<usize> =
            sorted_by_distance(&scenario.collaborative[seed], &scenario.collaborative)
                .into_iter()
                .take(params.k_mf * params.mf_buffer_multiplier)
                .filter(|id| !recs.contains(id))
                .take(params.k_mf)
                .collect();
        recs.extend(fresh);
    }
    recs.truncate(params.n_to_recommend);
    recs
}

proptest! {
    #[test]
    fn result_is_bounded_and_unique(scenario in scenario(), params in params()) {
        let ids = scenario.recommender().recommend_ids(&scenario.query, &params).unwrap();

        prop_assert!(ids.len() <= params.n_to_recommend);
        let unique: HashSet<usize> = ids.iter().copied().collect();
        prop_assert_eq!(unique.len(), ids.len());
        prop_assert!(ids.iter().all(|&id| id < scenario.semantic.len()));
    }

    #[test]
    fn matches_reference_pipeline(scenario in scenario(), params in params()) {
        let ids = scenario.recommender().recommend_ids(&scenario.query, &params).unwrap();
        prop_assert_eq!(ids, reference_pipeline(&scenario, &params));
    }

    #[test]
    fn identical_inputs_give_identical_output(scenario in scenario(), params in params()) {
        let recommender = scenario.recommender();
        let first = recommender.recommend_ids(&scenario.query, &params).unwrap();
        let second = recommender.recommend_ids(&scenario.query, &params).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn seeds_are_interacted_and_grow_with_buffer(scenario in scenario(), k_use in 0usize..6) {
        let semantic = EmbeddingMatrix::from_rows(scenario.semantic.clone()).unwrap();
        let interacted = scenario.interacted_set();

        let mut previous = 0;
        for use_buffer_multiplier in 1..=8 {
            let params = RecommendParams { k_use, use_buffer_multiplier, ..Default::default() };
            let candidates = find_nearest(&scenario.query, &semantic, params.semantic_fetch());
            let seeds = select_seeds(&candidates, &interacted, params.k_use);

            prop_assert!(seeds.len() <= k_use);
            prop_assert!(seeds.iter().all(|&id| interacted.contains(id)));
            prop_assert!(seeds.len() >= previous);
            previous = seeds.len();
        }
    }

    #[test]
    fn neighbors_sorted_by_true_distance(scenario in scenario(), k in 0usize..16) {
        let matrix = EmbeddingMatrix::from_rows(scenario.semantic.clone()).unwrap();
        let result = find_nearest(&scenario.query, &matrix, k);

        prop_assert_eq!(result.len(), k.min(matrix.rows()));
        let distances: Vec<f32> = result
            .iter()
            .map(|&id| euclidean_distance(&scenario.query, matrix.row(id).unwrap()))
            .collect();
        prop_assert!(distances.windows(2).all(|w| w[0] <= w[1]));
        for pair in result.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let (da, db) = (
                euclidean_distance(&scenario.query, matrix.row(a).unwrap()),
                euclidean_distance(&scenario.query, matrix.row(b).unwrap()),
            );
            prop_assert!(da < db || a < b, "tie between {} and {} not in index order", a, b);
        }
    }

    #[test]
    fn oversized_k_returns_every_row(scenario in scenario()) {
        let matrix = EmbeddingMatrix::from_rows(scenario.semantic.clone()).unwrap();
        let result = find_nearest(&scenario.query, &matrix, matrix.rows() + 5);

        let mut sorted = result.clone();
        sorted.sort_unstable();
        prop_assert_eq!(sorted, (0..matrix.rows()).collect::<Vec<_>>());
        prop_assert_eq!(result, sorted_by_distance(&scenario.query, &scenario.semantic));
    }
}
