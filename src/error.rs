use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Failures reported by a [`crate::repository::MovieStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid movie id: {0:?}")]
    InvalidId(String),
    #[error("movie not found")]
    NotFound,
    #[error(transparent)]
    Db(#[from] sea_orm::DbErr),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid Movie ID")]
    InvalidMovieId,
    #[error("Invalid request payload")]
    InvalidPayload,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidMovieId | AppError::InvalidPayload => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidId(_) | StoreError::NotFound => AppError::InvalidMovieId,
            StoreError::Db(err) => AppError::Internal(anyhow::Error::new(err)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
