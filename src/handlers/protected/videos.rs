// handlers/protected/videos.rs - creator uploads and edits, viewer interactions

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::auth::{authorize, AuthUser, OwnedResource};
use crate::database::{apply_update, fetch_all_json};
use crate::error::ApiError;
use crate::filter::CreatorContentFilter;
use crate::handlers::form::{discard, filter_params, Submission};
use crate::handlers::utils::update_reply;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::catalog::NewVideo;
use crate::storage::Folder;
use crate::update::{Float, Int, Patch, VideoPatch, VideoStatusPatch};

const MEDIA_FOLDERS: &[(&str, Folder)] = &[("video", Folder::Videos), ("thumbnail", Folder::Thumbnails)];

/// GET /api/videos/my-content
pub async fn my_content(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Value> {
    let sql = CreatorContentFilter::from_params(&filter_params(query)).to_sql(user.id)?;
    Ok(ApiResponse::success(Value::Array(fetch_all_json(&state.pool, &sql).await?)))
}

/// POST /api/videos - multipart with `video`/`thumbnail` files, or JSON
/// naming `video_url`
pub async fn upload(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    mut submission: Submission,
) -> ApiResult<Value> {
    let mut video: NewVideo = submission.parse()?;
    let has_url = video.video_url.as_deref().map_or(false, |u| !u.trim().is_empty());
    if !submission.has_file("video") && !has_url {
        return Err(ApiError::bad_request("Video file or URL is required"));
    }

    let assets = submission
        .store_files(state.storage.as_ref(), MEDIA_FOLDERS, state.config.storage.max_upload_bytes)
        .await?;
    if let Some(asset) = assets.get("video") {
        video.video_url = Some(asset.url.clone());
        video.file_size = Some(Int(asset.size as i64));
    }
    if let Some(asset) = assets.get("thumbnail") {
        video.thumbnail_url = Some(asset.url.clone());
    }

    let id = match state.catalog().create_video(user.id, &video, &state.config.seo).await {
        Ok(id) => id,
        Err(e) => {
            discard(state.storage.as_ref(), assets.into_values()).await;
            return Err(e.into());
        }
    };

    Ok(ApiResponse::created(json!({
        "message": "Video uploaded successfully",
        "id": id,
        "video_url": video.video_url,
        "thumbnail_url": video.thumbnail_url,
    })))
}

/// PATCH /api/videos/:id - JSON or multipart with replacement media
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    mut submission: Submission,
) -> ApiResult<Value> {
    authorize(&state.pool, OwnedResource::Video, id, &user).await?;
    let mut patch: VideoPatch = submission.parse()?;

    let assets = submission
        .store_files(state.storage.as_ref(), MEDIA_FOLDERS, state.config.storage.max_upload_bytes)
        .await?;
    if let Some(asset) = assets.get("video") {
        patch.video_url = Patch::Value(asset.url.clone());
        patch.file_size = Patch::Value(Int(asset.size as i64));
    }
    if let Some(asset) = assets.get("thumbnail") {
        patch.thumbnail_url = Patch::Value(asset.url.clone());
    }

    match apply_update(&state.pool, &patch, id).await {
        Ok(outcome) => update_reply(outcome, "Video"),
        Err(e) => {
            discard(state.storage.as_ref(), assets.into_values()).await;
            Err(e.into())
        }
    }
}

/// PATCH /api/videos/:id/status
pub async fn update_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(patch): Json<VideoStatusPatch>,
) -> ApiResult<Value> {
    authorize(&state.pool, OwnedResource::Video, id, &user).await?;
    update_reply(apply_update(&state.pool, &patch, id).await?, "Video")
}

/// DELETE /api/videos/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<Value> {
    authorize(&state.pool, OwnedResource::Video, id, &user).await?;
    state.catalog().delete_video(id).await?;
    Ok(ApiResponse::message("Video deleted successfully"))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProgressRequest {
    pub position: Option<Float>,
}

/// POST /api/videos/:id/progress
pub async fn progress(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(body): Json<ProgressRequest>,
) -> ApiResult<Value> {
    let position = body
        .position
        .ok_or_else(|| ApiError::bad_request("Position is required"))?;
    state.interactions().save_progress(user.id, id, position.0).await?;
    Ok(ApiResponse::success(json!({ "message": "Progress saved", "position": position.0 })))
}

/// POST /api/videos/:id/like
pub async fn like(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<Value> {
    let toggle = state.interactions().like_video(user.id, id).await?;
    Ok(ApiResponse::success(json!({ "liked": true, "changed": toggle.changed, "likes_count": toggle.count })))
}

/// DELETE /api/videos/:id/like
pub async fn unlike(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<Value> {
    let toggle = state.interactions().unlike_video(user.id, id).await?;
    Ok(ApiResponse::success(json!({ "liked": false, "changed": toggle.changed, "likes_count": toggle.count })))
}

/// POST /api/videos/:id/share
pub async fn share(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Value> {
    let shares = state.interactions().share_video(id).await?;
    Ok(ApiResponse::success(json!({ "shares_count": shares })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CommentRequest {
    #[serde(alias = "comment")]
    pub text: Option<String>,
    #[serde(alias = "parentId")]
    pub parent_id: Option<Int>,
}

/// POST /api/videos/:id/comments and POST /api/comments/:id
pub async fn add_comment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(body): Json<CommentRequest>,
) -> ApiResult<Value> {
    let text = body.text.as_deref().unwrap_or_default();
    let comment = state
        .interactions()
        .add_comment(user.id, id, text, body.parent_id.map(|p| p.0))
        .await?;
    Ok(ApiResponse::created(comment))
}

/// DELETE /api/videos/comments/:id and DELETE /api/comments/:id
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<Value> {
    authorize(&state.pool, OwnedResource::Comment, id, &user).await?;
    let removed = state.interactions().delete_comment(id).await?;
    Ok(ApiResponse::success(json!({ "message": "Comment deleted", "removed": removed })))
}
