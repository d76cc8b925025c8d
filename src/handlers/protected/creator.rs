// handlers/protected/creator.rs - creator profile and monetization

use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use serde_json::Value;

use crate::app::AppState;
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::handlers::utils::update_reply;
use crate::middleware::{ApiResponse, ApiResult};
use crate::update::CreatorProfilePatch;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreatorProfileRequest {
    #[serde(alias = "popularName")]
    pub popular_name: Option<String>,
    pub bio: Option<String>,
}

/// POST /api/creator/profile - also marks the caller as a creator
pub async fn create_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<CreatorProfileRequest>,
) -> ApiResult<Value> {
    let profile = state
        .creators()
        .create_profile(user.id, body.popular_name.as_deref().unwrap_or_default(), body.bio.as_deref())
        .await?;
    Ok(ApiResponse::created(profile))
}

/// PATCH /api/creator/profile
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(patch): Json<CreatorProfilePatch>,
) -> ApiResult<Value> {
    let outcome = state.creators().update_profile(user.id, &patch).await?;
    update_reply(outcome, "Creator profile")
}

/// GET /api/creator/monetization
pub async fn monetization(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<Value> {
    let profile = state
        .creators()
        .profile(user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Creator profile not found"))?;
    Ok(ApiResponse::success(profile))
}
