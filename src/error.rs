use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::views;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("There's no such product")]
    NotFound,

    #[error("Missing required field `{0}`")]
    MissingField(&'static str),

    #[error("Invalid value for field `{0}`")]
    InvalidField(&'static str),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Malformed form submission")]
    Multipart(#[from] MultipartError),

    #[error("Database error")]
    Database(#[from] mongodb::error::Error),

    #[error("Template error")]
    Template(#[from] handlebars::RenderError),

    #[error("I/O error")]
    Io(#[from] std::io::Error),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::MissingField(_) | AppError::InvalidField(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            AppError::Upload(_) | AppError::Multipart(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            AppError::Database(_)
            | AppError::Template(_)
            | AppError::Io(_)
            | AppError::Internal(_) => {
                tracing::error!(error = ?self, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong".to_string(),
                )
            }
        };

        (status, Html(views::render_fallback(&message))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
