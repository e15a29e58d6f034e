use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::services::GenerationError;
use crate::validation::Issue;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{message}: {source}")]
    Store {
        message: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("Task not found")]
    NotFound,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation failed")]
    Validation(Vec<Issue>),

    #[error("OpenAI API key not configured")]
    NotConfigured,

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),
}

impl AppError {
    /// Wraps a store failure with the fixed message the client gets back.
    pub fn store(message: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
        move |source| AppError::Store { message, source }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues: Option<Vec<Issue>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, issues) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "Task not found".to_string(), None),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::Validation(issues) => (
                StatusCode::BAD_REQUEST,
                "Validation failed".to_string(),
                Some(issues),
            ),
            AppError::Database(e) => {
                error!("database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error occurred".to_string(),
                    None,
                )
            }
            AppError::Store { message, source } => {
                error!("{}: {}", message, source);
                (StatusCode::INTERNAL_SERVER_ERROR, message.to_string(), None)
            }
            AppError::NotConfigured => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "OpenAI API key not configured".to_string(),
                None,
            ),
            AppError::Generation(e) => {
                error!("Error in generate-description endpoint: {}", e);
                let message = match e {
                    GenerationError::QuotaExceeded => e.to_string(),
                    _ => "Failed to generate description".to_string(),
                };
                (StatusCode::INTERNAL_SERVER_ERROR, message, None)
            }
        };

        let body = Json(ErrorResponse {
            error: error_message,
            issues,
        });

        (status, body).into_response()
    }
}
