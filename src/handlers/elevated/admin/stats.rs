// handlers/elevated/admin/stats.rs - GET /api/admin/stats

use axum::extract::State;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::database::{fetch_all_json, fetch_one_json};
use crate::filter::SqlResult;
use crate::middleware::{ApiResponse, ApiResult};

const RECENT_LIMIT: i64 = 5;

fn totals_sql() -> SqlResult {
    SqlResult::new(
        "SELECT (SELECT COUNT(*) FROM users) AS \"userCount\", \
         (SELECT COUNT(*) FROM videos) AS \"videoCount\", \
         (SELECT COUNT(*) FROM songs) AS \"songCount\", \
         (SELECT COUNT(*) FROM creator_profiles) AS \"creatorCount\", \
         (SELECT COALESCE(SUM(views_count), 0) FROM videos) AS \"totalViews\", \
         (SELECT COALESCE(SUM(total_earnings), 0) FROM creator_profiles) AS \"totalEarnings\"",
        vec![],
    )
}

fn recent_users_sql() -> SqlResult {
    SqlResult::new(
        "SELECT id, full_name, email, profile_image, is_creator, is_verified, created_at \
         FROM users ORDER BY created_at DESC LIMIT $1",
        vec![json!(RECENT_LIMIT)],
    )
}

fn recent_videos_sql() -> SqlResult {
    SqlResult::new(
        "SELECT v.id, v.title, v.thumbnail_url, u.full_name AS creator_name \
         FROM videos v JOIN users u ON v.creator_id = u.id \
         ORDER BY v.created_at DESC LIMIT $1",
        vec![json!(RECENT_LIMIT)],
    )
}

pub async fn show(State(state): State<AppState>) -> ApiResult<Value> {
    let mut stats = fetch_one_json(&state.pool, &totals_sql(), "Stats").await?;
    let recent_users = fetch_all_json(&state.pool, &recent_users_sql()).await?;
    let recent_videos = fetch_all_json(&state.pool, &recent_videos_sql()).await?;

    if let Some(fields) = stats.as_object_mut() {
        fields.insert("recentUsers".into(), Value::Array(recent_users));
        fields.insert("recentVideos".into(), Value::Array(recent_videos));
    }
    Ok(ApiResponse::success(stats))
}
