//! Owner-or-admin gate for mutations.
//!
//! Absence is checked before ownership: a missing resource is 404 for
//! everyone, admins included. Only an existing resource can be 403.

use serde_json::json;
use sqlx::PgPool;

use super::AuthUser;
use crate::database::{fetch_scalar, DatabaseError};
use crate::error::ApiError;
use crate::filter::SqlResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Deny,
}

/// Pure decision given a resolved owner. A row without an owner can only be
/// touched by an admin.
pub fn check(caller: &AuthUser, owner_id: Option<i64>) -> Access {
    if caller.is_admin || owner_id == Some(caller.id) {
        Access::Allow
    } else {
        Access::Deny
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnedResource {
    Video,
    Series,
    Comment,
    Playlist,
}

impl OwnedResource {
    fn table(&self) -> &'static str {
        match self {
            OwnedResource::Video => "videos",
            OwnedResource::Series => "series",
            OwnedResource::Comment => "comments",
            OwnedResource::Playlist => "playlists",
        }
    }

    fn owner_column(&self) -> &'static str {
        match self {
            OwnedResource::Video | OwnedResource::Series => "creator_id",
            OwnedResource::Comment | OwnedResource::Playlist => "user_id",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OwnedResource::Video => "Video",
            OwnedResource::Series => "Series",
            OwnedResource::Comment => "Comment",
            OwnedResource::Playlist => "Playlist",
        }
    }

    pub fn owner_sql(&self, id: i64) -> SqlResult {
        SqlResult::new(
            format!("SELECT \"{}\" FROM \"{}\" WHERE id = $1", self.owner_column(), self.table()),
            vec![json!(id)],
        )
    }
}

/// Outer `None`: no such row. Inner `None`: row without an owner.
pub async fn find_owner(pool: &PgPool, resource: OwnedResource, id: i64) -> Result<Option<Option<i64>>, DatabaseError> {
    fetch_scalar::<_, Option<i64>>(pool, &resource.owner_sql(id)).await
}

/// 404 when absent, 403 when present but not the caller's (and not admin)
pub async fn authorize(pool: &PgPool, resource: OwnedResource, id: i64, caller: &AuthUser) -> Result<(), ApiError> {
    let owner = find_owner(pool, resource, id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("{} not found", resource.label())))?;

    match check(caller, owner) {
        Access::Allow => Ok(()),
        Access::Deny => {
            tracing::warn!(
                "User {} denied access to {} {} owned by {:?}",
                caller.id,
                resource.label(),
                id,
                owner
            );
            Err(ApiError::forbidden("Not authorized"))
        }
    }
}
