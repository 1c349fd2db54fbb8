use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::services::Recommender;

/// Shared application state
///
/// The recommender is immutable after load, so handlers share it without locking.
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
    pub loaded_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(recommender: Recommender) -> Self {
        Self {
            recommender: Arc::new(recommender),
            loaded_at: Utc::now(),
        }
    }
}
