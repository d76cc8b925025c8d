// handlers/elevated/admin/creators.rs - creator roster and monetization

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::app::AppState;
use crate::database::{apply_update, fetch_all_json};
use crate::filter::SqlResult;
use crate::handlers::utils::update_reply;
use crate::middleware::{ApiResponse, ApiResult};
use crate::update::MonetizationPatch;

pub async fn list(State(state): State<AppState>) -> ApiResult<Value> {
    let sql = SqlResult::new(
        "SELECT c.id, c.user_id, c.popular_name, c.bio, c.total_earnings, c.monetization_percentage, \
         c.is_monetization_enabled, c.created_at, \
         u.full_name, u.email, u.profile_image, u.is_verified \
         FROM creator_profiles c JOIN users u ON c.user_id = u.id \
         ORDER BY c.created_at DESC",
        vec![],
    );
    Ok(ApiResponse::success(Value::Array(fetch_all_json(&state.pool, &sql).await?)))
}

/// PATCH /api/admin/creators/:id/monetization - `:id` is the profile id
pub async fn update_monetization(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<MonetizationPatch>,
) -> ApiResult<Value> {
    update_reply(apply_update(&state.pool, &patch, id).await?, "Creator profile")
}
