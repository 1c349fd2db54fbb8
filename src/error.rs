use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// A required table or embedding artifact is absent
    #[error("Missing input: {0}")]
    MissingInput(String),

    /// A loaded table or matrix does not have the expected columns or shape
    #[error("Schema error: {0}")]
    Schema(String),

    /// The query encoder failed or returned a malformed vector
    #[error("Encoding failure: {0}")]
    Encoding(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Encoding(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
            AppError::MissingInput(_)
            | AppError::Schema(_)
            | AppError::Io(_)
            | AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
