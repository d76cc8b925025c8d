// handlers/protected/users.rs - profile, preferences, history, follows, watchlist

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::auth::AuthUser;
use crate::database::fetch_one_json;
use crate::database::models::User;
use crate::error::ApiError;
use crate::filter::{Pagination, SqlResult};
use crate::handlers::form::filter_params;
use crate::handlers::utils::update_reply;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::library::Added;
use crate::update::{Int, PreferencesPatch};

const LIBRARY_DEFAULT_LIMIT: i64 = 20;

fn profile_counts_sql(user_id: i64) -> SqlResult {
    SqlResult::new(
        "SELECT (SELECT COUNT(*) FROM follows WHERE following_id = $1) AS followers, \
         (SELECT COUNT(*) FROM follows WHERE follower_id = $1) AS following, \
         (SELECT COUNT(*) FROM videos WHERE creator_id = $1) AS videos",
        vec![json!(user_id)],
    )
}

/// GET /api/users/profile
pub async fn profile(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<Value> {
    let account = User::find_by_id(&state.pool, user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let preferences = state.preferences().get(user.id).await?;
    let creator_profile = state.creators().profile(user.id).await?;
    let playlists = state.library().playlists_of(user.id).await?;
    let counts = fetch_one_json(&state.pool, &profile_counts_sql(user.id), "User").await?;

    let mut document =
        serde_json::to_value(&account).map_err(|e| ApiError::internal_with_detail("Server Error", e))?;
    if let Some(fields) = document.as_object_mut() {
        fields.insert("preferences".into(), preferences);
        fields.insert("creatorProfile".into(), creator_profile.unwrap_or(Value::Null));
        fields.insert("playlists".into(), Value::Array(playlists));
        fields.insert("_count".into(), counts);
    }
    Ok(ApiResponse::success(document))
}

/// PUT /api/users/preferences
pub async fn update_preferences(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(patch): Json<PreferencesPatch>,
) -> ApiResult<Value> {
    let outcome = state.preferences().update(user.id, &patch).await?;
    update_reply(outcome, "Preferences")
}

/// GET /api/users/history
pub async fn history(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Value> {
    let page = Pagination::from_params(&filter_params(query), LIBRARY_DEFAULT_LIMIT, state.config.filter.max_limit);
    let (rows, total) = state.library().history(user.id, &page).await?;
    Ok(ApiResponse::success(json!({
        "history": rows,
        "total": total,
        "page": page.page,
        "pages": page.pages(total),
    })))
}

/// DELETE /api/users/history/:id
pub async fn delete_history(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<Value> {
    state.library().delete_history(user.id, id).await?;
    Ok(ApiResponse::message("Removed from history"))
}

/// POST /api/users/:id/follow
pub async fn follow(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<Value> {
    state.social().follow(user.id, id).await?;
    Ok(ApiResponse::success(json!({ "message": "Followed successfully", "following": true })))
}

/// DELETE /api/users/:id/follow
pub async fn unfollow(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<Value> {
    let removed = state.social().unfollow(user.id, id).await?;
    Ok(ApiResponse::success(json!({
        "message": "Unfollowed successfully",
        "following": false,
        "removed": removed,
    })))
}

/// GET /api/users/watchlist
pub async fn watchlist(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Value> {
    let page = Pagination::from_params(&filter_params(query), LIBRARY_DEFAULT_LIMIT, state.config.filter.max_limit);
    Ok(ApiResponse::success(Value::Array(state.library().watchlist(user.id, &page).await?)))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WatchlistRequest {
    #[serde(rename = "videoId", alias = "video_id")]
    pub video_id: Option<Int>,
}

/// POST /api/users/watchlist - 201 when added, 200 when already present
pub async fn add_to_watchlist(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<WatchlistRequest>,
) -> ApiResult<Value> {
    let video_id = body
        .video_id
        .ok_or_else(|| ApiError::bad_request("videoId is required"))?;

    match state.library().add_to_watchlist(user.id, video_id.0).await? {
        Added::New => Ok(ApiResponse::with_status(
            json!({ "message": "Added to watchlist", "added": true }),
            StatusCode::CREATED,
        )),
        Added::AlreadyPresent => Ok(ApiResponse::success(json!({
            "message": "Already in watchlist",
            "added": false,
        }))),
    }
}

/// DELETE /api/users/watchlist/:id
pub async fn remove_from_watchlist(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<Value> {
    let removed = state.library().remove_from_watchlist(user.id, id).await?;
    Ok(ApiResponse::success(json!({ "message": "Removed from watchlist", "removed": removed })))
}
