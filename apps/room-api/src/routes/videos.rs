use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::error::ApiError;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/videos", get(list_videos))
}

#[derive(Debug, Serialize)]
pub struct VideoListResponse {
    pub videos: Vec<String>,
}

/// The playable files under the media root, as catalog-relative paths.
async fn list_videos(State(state): State<AppState>) -> Result<Json<VideoListResponse>, ApiError> {
    let videos = state.catalog.list().await?;
    Ok(Json(VideoListResponse { videos }))
}
