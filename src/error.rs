use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::model::SpoolId;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Spool not found: {0}")]
    SpoolNotFound(SpoolId),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Remote server returned {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for TrackerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            TrackerError::SpoolNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            TrackerError::Validation(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            TrackerError::Decode(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            TrackerError::Database(_)
            | TrackerError::Transport(_)
            | TrackerError::Remote { .. }
            | TrackerError::Io(_) => {
                tracing::error!("Request failed: {}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        (status, message).into_response()
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
