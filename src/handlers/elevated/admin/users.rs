// handlers/elevated/admin/users.rs - user directory and account status

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::database::{apply_update, count, fetch_all_json, fetch_one_json, fetch_optional_json, UpdateOutcome};
use crate::filter::{Pagination, SqlResult, UserSearch};
use crate::handlers::form::filter_params;
use crate::handlers::utils::update_reply;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::CreatorService;
use crate::update::UserStatusPatch;

const DIRECTORY_DEFAULT_LIMIT: i64 = 10;
const DETAIL_VIDEO_LIMIT: i64 = 20;

fn account_sql(user_id: i64) -> SqlResult {
    SqlResult::new(
        "SELECT id, mobile_number, email, full_name, profile_image, role, is_creator, is_verified, \
         created_at, updated_at FROM users WHERE id = $1",
        vec![json!(user_id)],
    )
}

fn detail_counts_sql(user_id: i64) -> SqlResult {
    SqlResult::new(
        "SELECT (SELECT COUNT(*) FROM playlists WHERE user_id = $1) AS playlists, \
         (SELECT COUNT(*) FROM videos WHERE creator_id = $1) AS videos, \
         (SELECT COUNT(*) FROM song_likes WHERE user_id = $1) AS \"songLikes\", \
         (SELECT COUNT(*) FROM video_likes WHERE user_id = $1) AS \"videoLikes\"",
        vec![json!(user_id)],
    )
}

/// GET /api/admin/users?search=&page=&limit=
pub async fn list(State(state): State<AppState>, Query(query): Query<HashMap<String, String>>) -> ApiResult<Value> {
    let params = filter_params(query);
    let page = Pagination::from_params(&params, DIRECTORY_DEFAULT_LIMIT, state.config.filter.max_limit);
    let search = UserSearch::from_params(&params);

    let users = fetch_all_json(&state.pool, &search.to_sql(&page)?).await?;
    let total = count(&state.pool, &search.to_count_sql()?).await?;

    Ok(ApiResponse::success(json!({
        "users": users,
        "total": total,
        "page": page.page,
        "pages": page.pages(total),
    })))
}

/// GET /api/admin/users/:id - account, creator profile, latest videos, counts
pub async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Value> {
    let mut user = fetch_one_json(&state.pool, &account_sql(id), "User").await?;

    let profile_sql = SqlResult::new("SELECT * FROM creator_profiles WHERE user_id = $1", vec![json!(id)]);
    let profile = fetch_optional_json(&state.pool, &profile_sql).await?;

    let videos_sql = SqlResult::new(
        "SELECT * FROM videos WHERE creator_id = $1 ORDER BY created_at DESC LIMIT $2",
        vec![json!(id), json!(DETAIL_VIDEO_LIMIT)],
    );
    let videos = fetch_all_json(&state.pool, &videos_sql).await?;
    let counts = fetch_one_json(&state.pool, &detail_counts_sql(id), "User").await?;

    if let Some(fields) = user.as_object_mut() {
        fields.insert("creatorProfile".into(), profile.unwrap_or(Value::Null));
        fields.insert("videos".into(), Value::Array(videos));
        fields.insert("_count".into(), counts);
    }
    Ok(ApiResponse::success(user))
}

/// DELETE /api/admin/users/:id - owned rows cascade
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Value> {
    super::delete_row(&state.pool, "users", id, "User").await?;
    Ok(ApiResponse::message("User deleted"))
}

/// PATCH /api/admin/users/:id/status - promotion to creator also ensures a
/// creator profile, in the same transaction
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<UserStatusPatch>,
) -> ApiResult<Value> {
    let mut tx = state.pool.begin().await?;

    let outcome = apply_update(&mut *tx, &patch, id).await?;
    if outcome == UpdateOutcome::Updated(0) {
        return update_reply(outcome, "User");
    }
    let profile_created = if patch.grants_creator() {
        CreatorService::ensure_default_profile(&mut *tx, id).await?
    } else {
        false
    };

    tx.commit().await?;

    let mut reply = update_reply(outcome, "User")?;
    if let Some(fields) = reply.data.as_object_mut() {
        fields.insert("creator_profile_created".into(), json!(profile_created));
    }
    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_never_selects_password_hash() {
        assert!(!account_sql(1).query.contains("password_hash"));
    }

    #[test]
    fn detail_counts_bind_the_user_once() {
        let sql = detail_counts_sql(12);
        assert_eq!(sql.params, vec![json!(12)]);
        assert!(sql.query.contains("AS \"videoLikes\""));
    }
}
