// handlers/public/users.rs - follower graph reads

use axum::extract::{Path, State};
use serde_json::Value;

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /api/users/:id/followers
pub async fn followers(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Value> {
    Ok(ApiResponse::success(Value::Array(state.social().followers(id).await?)))
}

/// GET /api/users/:id/following
pub async fn following(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Value> {
    Ok(ApiResponse::success(Value::Array(state.social().following(id).await?)))
}
