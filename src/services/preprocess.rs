use std::fs;
use std::path::{Path, PathBuf};

use crate::{
    error::{AppError, AppResult},
    models::{Interaction, Item},
    services::{encoder::QueryEncoder, factorizer::InteractionFactorizer},
    store::{
        read_table, tables::INTERACTION_COLUMNS, tables::ITEM_COLUMNS, Catalog, EmbeddingMatrix,
        COLLABORATIVE_EMBEDDINGS_FILE, SEMANTIC_EMBEDDINGS_FILE,
    },
};

/// Titles sent to the encoder per request
pub const TITLE_BATCH_SIZE: usize = 32;

/// Input tables and output directory for an offline run
#[derive(Debug, Clone)]
pub struct PreprocessPaths {
    pub items: PathBuf,
    pub interactions: PathBuf,
    pub serialised_dir: PathBuf,
}

/// Shapes of the matrices written by a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreprocessSummary {
    pub items: usize,
    pub interactions: usize,
    pub semantic_dim: usize,
    pub collaborative_dim: usize,
}

/// Splits `items` into consecutive chunks of at most `batch_size`
pub fn batch<T: Clone>(items: &[T], batch_size: usize) -> Vec<Vec<T>> {
    if batch_size == 0 {
        return Vec::new();
    }
    items.chunks(batch_size).map(<[T]>::to_vec).collect()
}

/// Validates the input tables, produces both embedding matrices and serialises them
///
/// Missing input files fail before any model call. The serialised directory
/// is created when absent.
pub async fn preprocess(
    paths: &PreprocessPaths,
    encoder: &dyn QueryEncoder,
    factorizer: &dyn InteractionFactorizer,
) -> AppResult<PreprocessSummary> {
    ensure_exists(&paths.interactions, "interactions")?;
    ensure_exists(&paths.items, "items")?;
    if !paths.serialised_dir.exists() {
        fs::create_dir_all(&paths.serialised_dir)?;
    }

    let interactions: Vec<Interaction> =
        read_table(&paths.interactions, "interactions", INTERACTION_COLUMNS)?;
    let items: Vec<Item> = read_table(&paths.items, "items", ITEM_COLUMNS)?;
    let catalog = Catalog::from_items(items)?;

    tracing::info!(
        items = catalog.len(),
        interactions = interactions.len(),
        "Preprocessing tables"
    );

    let semantic = encode_titles(catalog.titles(), encoder).await?;

    let collaborative = factorizer.fit(&interactions, catalog.len()).await?;
    if collaborative.rows() != catalog.len() {
        return Err(AppError::Schema(format!(
            "factorizer returned {} rows for {} items",
            collaborative.rows(),
            catalog.len()
        )));
    }

    semantic.save(&paths.serialised_dir.join(SEMANTIC_EMBEDDINGS_FILE))?;
    collaborative.save(&paths.serialised_dir.join(COLLABORATIVE_EMBEDDINGS_FILE))?;

    let summary = PreprocessSummary {
        items: catalog.len(),
        interactions: interactions.len(),
        semantic_dim: semantic.dim(),
        collaborative_dim: collaborative.dim(),
    };
    tracing::info!(?summary, dir = %paths.serialised_dir.display(), "Embeddings serialised");
    Ok(summary)
}

/// Encodes titles batch by batch and stacks the results in id order
async fn encode_titles(titles: &[String], encoder: &dyn QueryEncoder) -> AppResult<EmbeddingMatrix> {
    let mut parts = Vec::new();
    for chunk in batch(titles, TITLE_BATCH_SIZE) {
        let rows = encoder.encode_batch(&chunk).await?;
        if rows.len() != chunk.len() {
            return Err(AppError::Encoding(format!(
                "encoder returned {} embeddings for {} titles",
                rows.len(),
                chunk.len()
            )));
        }
        parts.push(
            EmbeddingMatrix::from_rows(rows)
                .map_err(|e| AppError::Encoding(format!("ragged title embeddings: {}", e)))?,
        );
    }

    EmbeddingMatrix::vstack(parts)
        .map_err(|e| AppError::Encoding(format!("title embeddings disagree on dimension: {}", e)))
}

fn ensure_exists(path: &Path, table: &str) -> AppResult<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(AppError::MissingInput(format!(
            "specify a file for {}: {} does not exist",
            table,
            path.display()
        )))
    }
}
