use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Auth(String),

    #[error("{0}")]
    Validation(String),

    #[error("Daily generation limit of {limit} reached")]
    QuotaExceeded { count: i64, limit: i64 },

    #[error("Image provider error: {0}")]
    Provider(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong!".to_string())
            }
            AppError::Auth(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::QuotaExceeded { count, limit } => {
                tracing::debug!(count, limit, "generation denied by daily quota");
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    format!("Daily generation limit of {} reached", limit),
                )
            }
            AppError::Provider(ref msg) => {
                tracing::warn!("Provider error: {}", msg);
                (StatusCode::BAD_GATEWAY, "Image generation failed".to_string())
            }
            AppError::Internal(ref e) => {
                tracing::error!("Internal error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong!".to_string())
            }
        };

        let body = Json(json!({ "message": message }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
