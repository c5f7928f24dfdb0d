use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use gridshare_repo::RepoError;
use gridshare_types::ValidationError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("bad request: {0}")]
    BadRequest(#[from] ValidationError),

    #[error("grid not found")]
    NotFound,

    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Repo(RepoError::Validation(_)) => StatusCode::BAD_REQUEST,
            Self::NotFound | Self::Repo(RepoError::NoPublicGrids) => StatusCode::NOT_FOUND,
            Self::Timeout(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Repo(_) | Self::Io(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub type ServerResult<T> = Result<T, ServerError>;
