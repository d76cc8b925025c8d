// handlers/protected/series.rs - POST /api/series, PATCH/DELETE /api/series/:id

use axum::{
    extract::{Path, State},
    Extension,
};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::auth::{authorize, AuthUser, OwnedResource};
use crate::database::apply_update;
use crate::handlers::form::{discard, Submission};
use crate::handlers::utils::update_reply;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::series::NewSeries;
use crate::storage::Folder;
use crate::update::{Patch, SeriesPatch};

const ARTWORK_FOLDERS: &[(&str, Folder)] = &[("thumbnail", Folder::Thumbnails), ("coverImage", Folder::Covers)];

/// Creator is the caller unless an admin names another user
fn creator_for(user: &AuthUser, body: &NewSeries) -> i64 {
    match body.creator_id {
        Some(creator) if user.is_admin => creator.0,
        _ => user.id,
    }
}

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    mut submission: Submission,
) -> ApiResult<Value> {
    let mut body: NewSeries = submission.parse()?;
    let assets = submission
        .store_files(state.storage.as_ref(), ARTWORK_FOLDERS, state.config.storage.max_upload_bytes)
        .await?;
    if let Some(asset) = assets.get("thumbnail") {
        body.thumbnail_url = Some(asset.url.clone());
    }
    if let Some(asset) = assets.get("coverImage") {
        body.cover_image_url = Some(asset.url.clone());
    }

    let id = match state.series().create(creator_for(&user, &body), &body).await {
        Ok(id) => id,
        Err(e) => {
            discard(state.storage.as_ref(), assets.into_values()).await;
            return Err(e.into());
        }
    };
    Ok(ApiResponse::created(json!({ "message": "Series created successfully", "id": id })))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    mut submission: Submission,
) -> ApiResult<Value> {
    authorize(&state.pool, OwnedResource::Series, id, &user).await?;
    let mut patch: SeriesPatch = submission.parse()?;

    let assets = submission
        .store_files(state.storage.as_ref(), ARTWORK_FOLDERS, state.config.storage.max_upload_bytes)
        .await?;
    if let Some(asset) = assets.get("thumbnail") {
        patch.thumbnail_url = Patch::Value(asset.url.clone());
    }
    if let Some(asset) = assets.get("coverImage") {
        patch.cover_image_url = Patch::Value(asset.url.clone());
    }

    match apply_update(&state.pool, &patch, id).await {
        Ok(outcome) => update_reply(outcome, "Series"),
        Err(e) => {
            discard(state.storage.as_ref(), assets.into_values()).await;
            Err(e.into())
        }
    }
}

/// Member videos are unlinked, never deleted
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<Value> {
    authorize(&state.pool, OwnedResource::Series, id, &user).await?;
    let unlinked = state.series().delete(id).await?;
    Ok(ApiResponse::success(json!({
        "message": "Series deleted successfully",
        "videos_unlinked": unlinked,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;
    use crate::update::Int;

    fn caller(id: i64, is_admin: bool) -> AuthUser {
        AuthUser {
            id,
            full_name: "Caller".into(),
            email: None,
            role: if is_admin { Role::Admin } else { Role::User },
            is_admin,
        }
    }

    #[test]
    fn only_admins_may_create_for_someone_else() {
        let body = NewSeries {
            creator_id: Some(Int(9)),
            ..Default::default()
        };
        assert_eq!(creator_for(&caller(3, false), &body), 3);
        assert_eq!(creator_for(&caller(1, true), &body), 9);
        assert_eq!(creator_for(&caller(1, true), &NewSeries::default()), 1);
    }
}
