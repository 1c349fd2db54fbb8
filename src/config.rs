use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Catalog table (`id`, `title`)
    #[serde(default = "default_items_path")]
    pub items_path: PathBuf,

    /// Interaction table (`user`, `item`, `interaction`)
    #[serde(default = "default_interactions_path")]
    pub interactions_path: PathBuf,

    /// Directory holding the serialised embedding matrices
    #[serde(default = "default_serialised_dir")]
    pub serialised_dir: PathBuf,

    /// Sentence encoder service endpoint
    #[serde(default = "default_encoder_url")]
    pub encoder_url: String,

    /// Matrix factorization service endpoint, used by `preprocess`
    #[serde(default = "default_factorizer_url")]
    pub factorizer_url: String,

    /// Number of latent factors requested from the factorizer
    #[serde(default = "default_factors")]
    pub factors: usize,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_items_path() -> PathBuf {
    PathBuf::from("items.json")
}

fn default_interactions_path() -> PathBuf {
    PathBuf::from("interactions.json")
}

fn default_serialised_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_encoder_url() -> String {
    "http://localhost:8501/v1/encode".to_string()
}

fn default_factorizer_url() -> String {
    "http://localhost:8502/v1/fit".to_string()
}

fn default_factors() -> usize {
    8
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Socket address the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
