use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::response::{Json, Redirect};
use serde_json::{json, Value};
use tracing::info;

use gridshare_repo::{GridRepository, RepoResult, ServerConfig};
use gridshare_types::{GridData, GridDocument, GridSubmission, GridView, Visibility};

use crate::error::{ServerError, ServerResult};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    repo: Arc<GridRepository>,
    base_url: Arc<str>,
    timeout: Duration,
}

impl AppState {
    pub fn new(repo: Arc<GridRepository>, config: &ServerConfig) -> Self {
        Self {
            repo,
            base_url: config.public_base_url.trim_end_matches('/').into(),
            timeout: config.request_timeout(),
        }
    }

    /// Run a repository call on the blocking pool, bounded by the request timeout.
    async fn run<T, F>(&self, call: F) -> ServerResult<T>
    where
        F: FnOnce(&GridRepository) -> RepoResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let repo = Arc::clone(&self.repo);
        let task = tokio::task::spawn_blocking(move || call(&repo));
        match tokio::time::timeout(self.timeout, task).await {
            Err(_) => Err(ServerError::Timeout(self.timeout)),
            Ok(Err(e)) => Err(ServerError::Internal(e.to_string())),
            Ok(Ok(result)) => Ok(result?),
        }
    }

    async fn lookup(&self, token: String, visibility: Visibility) -> ServerResult<GridDocument> {
        self.run(move |repo| repo.fetch(&token, visibility))
            .await?
            .ok_or(ServerError::NotFound)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Link handed back to the poster of a grid.
pub fn share_url(base_url: &str, visibility: Visibility, token: &str) -> String {
    let base = base_url.trim_end_matches('/');
    match visibility {
        Visibility::Public => format!("{base}/{token}"),
        Visibility::Secret => format!("{base}/secret/{token}"),
    }
}

/// Health check handler.
pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Accept a grid submission and return its share URL.
pub async fn post_handler(State(state): State<AppState>, body: Bytes) -> ServerResult<Json<Value>> {
    let submission = GridSubmission::from_json(&body)?;
    let (visibility, token) = state
        .run(move |repo| repo.store_submission(submission))
        .await?;
    let url = share_url(&state.base_url, visibility, token.as_str());
    info!(%visibility, %token, "grid posted");
    Ok(Json(json!({ "url": url })))
}

pub async fn get_public_handler(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> ServerResult<Json<GridData>> {
    let doc = state.lookup(token, Visibility::Public).await?;
    Ok(Json(doc.grid_data))
}

pub async fn get_secret_handler(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> ServerResult<Json<GridData>> {
    let doc = state.lookup(token, Visibility::Secret).await?;
    Ok(Json(doc.grid_data))
}

pub async fn grid_public_handler(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> ServerResult<Json<GridView>> {
    let doc = state.lookup(token, Visibility::Public).await?;
    Ok(Json(doc.to_view()))
}

pub async fn grid_secret_handler(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> ServerResult<Json<GridView>> {
    let doc = state.lookup(token, Visibility::Secret).await?;
    Ok(Json(doc.to_view()))
}

/// Redirect to a random public grid.
pub async fn random_handler(State(state): State<AppState>) -> ServerResult<Redirect> {
    let (token, _) = state.run(|repo| repo.fetch_random_public()).await?;
    info!(%token, "redirecting to random grid");
    Ok(Redirect::to(&format!("/grid/{token}")))
}
