// handlers/elevated/admin/videos.rs - catalog moderation

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::database::{apply_update, fetch_all_json, fetch_one_json};
use crate::filter::{AdminVideoFilter, SqlResult};
use crate::handlers::form::filter_params;
use crate::handlers::utils::update_reply;
use crate::middleware::{ApiResponse, ApiResult};
use crate::update::VideoStatusPatch;

/// GET /api/admin/videos?type= - active and inactive, one type
pub async fn list(State(state): State<AppState>, Query(query): Query<HashMap<String, String>>) -> ApiResult<Value> {
    let sql = AdminVideoFilter::from_params(&filter_params(query)).to_sql()?;
    Ok(ApiResponse::success(Value::Array(fetch_all_json(&state.pool, &sql).await?)))
}

pub async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Value> {
    let sql = SqlResult::new("SELECT * FROM videos WHERE id = $1", vec![json!(id)]);
    Ok(ApiResponse::success(fetch_one_json(&state.pool, &sql, "Video").await?))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Value> {
    state.catalog().delete_video(id).await?;
    Ok(ApiResponse::message("Video deleted"))
}

pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<VideoStatusPatch>,
) -> ApiResult<Value> {
    update_reply(apply_update(&state.pool, &patch, id).await?, "Video")
}
