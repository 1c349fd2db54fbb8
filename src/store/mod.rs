pub mod matrix;
pub mod tables;

pub use matrix::EmbeddingMatrix;
pub use tables::{read_table, Catalog, InteractedSet};

/// File name of the serialised semantic (title) embeddings
pub const SEMANTIC_EMBEDDINGS_FILE: &str = "embeds_use.json";

/// File name of the serialised collaborative-filtering item factors
pub const COLLABORATIVE_EMBEDDINGS_FILE: &str = "embeds_mf.json";
