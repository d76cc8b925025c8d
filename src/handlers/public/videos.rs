// handlers/public/videos.rs - catalog reads, view counting and comment listing

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    Extension,
};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::database::fetch_all_json;
use crate::filter::{Pagination, SqlResult, VideoFilter};
use crate::handlers::form::filter_params;
use crate::middleware::{ApiResponse, ApiResult, MaybeUser};
use crate::services::interactions::comments_for_video_sql;
use crate::types::VideoType;

const TRENDING_LIMIT: i64 = 20;

/// GET /api/videos
///
/// Without an explicit category, genre, search or flag filter, an identified
/// caller's content-language preference narrows the listing.
pub async fn list(
    State(state): State<AppState>,
    Extension(viewer): Extension<MaybeUser>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Value> {
    let params = filter_params(query);
    let filter = VideoFilter::from_params(&params);
    let page = Pagination::from_params(&params, state.config.filter.default_limit, state.config.filter.max_limit);

    let preference = match viewer.id() {
        Some(user_id) if filter.uses_language_preference() => {
            state.preferences().content_language(user_id).await?
        }
        _ => None,
    };

    let sql = filter.to_sql(viewer.id(), preference.as_deref(), &page)?;
    let videos = fetch_all_json(&state.pool, &sql).await?;
    Ok(ApiResponse::success(Value::Array(videos)))
}

/// GET /api/videos/categories
pub async fn categories(State(state): State<AppState>) -> ApiResult<Value> {
    let sql = SqlResult::new("SELECT * FROM video_categories WHERE is_active = 1 ORDER BY name", vec![]);
    Ok(ApiResponse::success(Value::Array(fetch_all_json(&state.pool, &sql).await?)))
}

/// GET /api/videos/trending
pub async fn trending(State(state): State<AppState>, Query(query): Query<HashMap<String, String>>) -> ApiResult<Value> {
    let params = filter_params(query);
    let video_type = params.text("type").and_then(VideoType::parse).unwrap_or_default();
    let sql = SqlResult::new(
        format!(
            "SELECT v.*, u.full_name AS creator_name FROM videos v \
             LEFT JOIN users u ON v.creator_id = u.id \
             WHERE v.is_active = 1 AND v.is_trending = 1 AND v.type = $1 \
             ORDER BY v.views_count DESC, v.created_at DESC LIMIT {}",
            TRENDING_LIMIT
        ),
        vec![json!(video_type.as_str())],
    );
    Ok(ApiResponse::success(Value::Array(fetch_all_json(&state.pool, &sql).await?)))
}

/// GET /api/videos/:id
pub async fn show(
    State(state): State<AppState>,
    Extension(viewer): Extension<MaybeUser>,
    Path(id): Path<i64>,
) -> ApiResult<Value> {
    let video = state.catalog().video_detail(id, viewer.id()).await?;
    Ok(ApiResponse::success(video))
}

/// GET /api/videos/:id/seo
pub async fn seo(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Value> {
    let document = state.catalog().video_seo(id, &state.config.seo).await?;
    Ok(ApiResponse::success(document))
}

/// POST /api/videos/:id/view
pub async fn view(
    State(state): State<AppState>,
    Extension(viewer): Extension<MaybeUser>,
    Path(id): Path<i64>,
) -> ApiResult<Value> {
    let views = state.interactions().record_view(viewer.id(), id).await?;
    Ok(ApiResponse::success(json!({ "views_count": views })))
}

/// GET /api/videos/:id/comments and GET /api/comments/:id
pub async fn comments(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Value> {
    let comments = fetch_all_json(&state.pool, &comments_for_video_sql(id)).await?;
    Ok(ApiResponse::success(Value::Array(comments)))
}
