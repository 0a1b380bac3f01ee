//! Lookup-and-download endpoint

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::AppState;

/// Query parameters for GET /download
#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    /// Gloss term to look up
    #[serde(default)]
    pub q: Option<String>,
}

/// Success body for GET /download
#[derive(Debug, Serialize)]
pub struct DownloadResponse {
    pub message: String,
    pub nzsl_id: u64,
    /// Local path of the video
    pub file: String,
    /// True if the file was already on disk
    pub skipped: bool,
}

/// GET /download?q=<term>
///
/// Resolves the term to a sign, scrapes its page for the video and stores
/// the video under the configured video directory.
pub async fn download_video(
    State(state): State<AppState>,
    Query(query): Query<DownloadQuery>,
) -> ApiResult<Json<DownloadResponse>> {
    let term = query.q.as_deref().unwrap_or_default();
    let asset = state.pipeline.fetch_by_query(term).await?;

    Ok(Json(DownloadResponse {
        message: format!("Video downloaded successfully for ID: {}", asset.nzsl_id),
        nzsl_id: asset.nzsl_id,
        file: asset.local_path.display().to_string(),
        skipped: asset.outcome.is_skipped(),
    }))
}
