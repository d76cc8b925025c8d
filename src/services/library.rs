//! A user's personal collections: watchlist, watch history and playlists.

use serde_json::{json, Value};
use sqlx::PgPool;

use super::ServiceError;
use crate::auth::AuthUser;
use crate::database::{count, execute, fetch_all_json, fetch_scalar};
use crate::filter::{Pagination, SqlResult};

/// Whether a watchlist add created a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Added {
    New,
    AlreadyPresent,
}

fn history_sql(user_id: i64, page: &Pagination) -> SqlResult {
    SqlResult::new(
        format!(
            "SELECT vv.id AS view_id, v.*, u.full_name AS creator_name, \
             vv.updated_at AS viewed_at, vv.last_position \
             FROM video_views vv \
             JOIN videos v ON vv.video_id = v.id \
             LEFT JOIN users u ON v.creator_id = u.id \
             WHERE vv.user_id = $1 ORDER BY vv.updated_at DESC {}",
            page.to_sql()
        ),
        vec![json!(user_id)],
    )
}

fn watchlist_sql(user_id: i64, page: &Pagination) -> SqlResult {
    SqlResult::new(
        format!(
            "SELECT v.*, u.full_name AS creator_name, w.created_at AS added_at \
             FROM watchlist w \
             JOIN videos v ON w.video_id = v.id \
             LEFT JOIN users u ON v.creator_id = u.id \
             WHERE w.user_id = $1 ORDER BY w.created_at DESC {}",
            page.to_sql()
        ),
        vec![json!(user_id)],
    )
}

pub struct LibraryService {
    pool: PgPool,
}

impl LibraryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn add_to_watchlist(&self, user_id: i64, video_id: i64) -> Result<Added, ServiceError> {
        let video = SqlResult::new("SELECT id FROM videos WHERE id = $1", vec![json!(video_id)]);
        if fetch_scalar::<_, i64>(&self.pool, &video).await?.is_none() {
            return Err(ServiceError::NotFound("Video not found".to_string()));
        }

        let insert = SqlResult::new(
            "INSERT INTO watchlist (user_id, video_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            vec![json!(user_id), json!(video_id)],
        );
        Ok(match execute(&self.pool, &insert).await? {
            0 => Added::AlreadyPresent,
            _ => Added::New,
        })
    }

    pub async fn remove_from_watchlist(&self, user_id: i64, video_id: i64) -> Result<bool, ServiceError> {
        let delete = SqlResult::new(
            "DELETE FROM watchlist WHERE user_id = $1 AND video_id = $2",
            vec![json!(user_id), json!(video_id)],
        );
        Ok(execute(&self.pool, &delete).await? > 0)
    }

    pub async fn watchlist(&self, user_id: i64, page: &Pagination) -> Result<Vec<Value>, ServiceError> {
        Ok(fetch_all_json(&self.pool, &watchlist_sql(user_id, page)).await?)
    }

    /// Page of history rows plus the total row count
    pub async fn history(&self, user_id: i64, page: &Pagination) -> Result<(Vec<Value>, i64), ServiceError> {
        let rows = fetch_all_json(&self.pool, &history_sql(user_id, page)).await?;
        let total = SqlResult::new("SELECT COUNT(*) FROM video_views WHERE user_id = $1", vec![json!(user_id)]);
        Ok((rows, count(&self.pool, &total).await?))
    }

    /// Only the caller's own history rows can be removed
    pub async fn delete_history(&self, user_id: i64, view_id: i64) -> Result<(), ServiceError> {
        let delete = SqlResult::new(
            "DELETE FROM video_views WHERE id = $1 AND user_id = $2",
            vec![json!(view_id), json!(user_id)],
        );
        match execute(&self.pool, &delete).await? {
            0 => Err(ServiceError::NotFound("History item not found".to_string())),
            _ => Ok(()),
        }
    }

    pub async fn create_playlist(
        &self,
        user_id: i64,
        name: &str,
        description: Option<&str>,
        is_public: bool,
    ) -> Result<i64, ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::Invalid("Playlist name is required".to_string()));
        }

        let insert = SqlResult::new(
            "INSERT INTO playlists (user_id, name, description, is_public) VALUES ($1, $2, $3, $4) RETURNING id",
            vec![
                json!(user_id),
                json!(name),
                json!(description.unwrap_or("")),
                json!(if is_public { 1 } else { 0 }),
            ],
        );
        fetch_scalar::<_, i64>(&self.pool, &insert)
            .await?
            .ok_or_else(|| ServiceError::Invalid("Playlist was not created".to_string()))
    }

    /// Caller's playlists with their song counts
    pub async fn playlists_of(&self, user_id: i64) -> Result<Vec<Value>, ServiceError> {
        let sql = SqlResult::new(
            "SELECT p.*, (SELECT COUNT(*) FROM playlist_songs ps WHERE ps.playlist_id = p.id) AS song_count \
             FROM playlists p WHERE p.user_id = $1 ORDER BY p.created_at DESC",
            vec![json!(user_id)],
        );
        Ok(fetch_all_json(&self.pool, &sql).await?)
    }

    /// Songs may only be added to or removed from playlists the caller owns
    async fn authorize_playlist(&self, caller: &AuthUser, playlist_id: i64) -> Result<(), ServiceError> {
        let owner = SqlResult::new("SELECT user_id FROM playlists WHERE id = $1", vec![json!(playlist_id)]);
        let owner = fetch_scalar::<_, i64>(&self.pool, &owner)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Playlist not found".to_string()))?;

        // Playlist contents are owner-only, admins included
        if owner != caller.id {
            tracing::warn!("User {} denied access to playlist {} owned by {}", caller.id, playlist_id, owner);
            return Err(ServiceError::Forbidden("Not authorized to modify this playlist".to_string()));
        }
        Ok(())
    }

    /// Insert-if-absent; returns whether the song was newly added
    pub async fn add_song(&self, caller: &AuthUser, playlist_id: i64, song_id: i64) -> Result<bool, ServiceError> {
        self.authorize_playlist(caller, playlist_id).await?;

        let song = SqlResult::new("SELECT id FROM songs WHERE id = $1", vec![json!(song_id)]);
        if fetch_scalar::<_, i64>(&self.pool, &song).await?.is_none() {
            return Err(ServiceError::NotFound("Song not found".to_string()));
        }

        let insert = SqlResult::new(
            "INSERT INTO playlist_songs (playlist_id, song_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            vec![json!(playlist_id), json!(song_id)],
        );
        Ok(execute(&self.pool, &insert).await? > 0)
    }

    pub async fn remove_song(&self, caller: &AuthUser, playlist_id: i64, song_id: i64) -> Result<bool, ServiceError> {
        self.authorize_playlist(caller, playlist_id).await?;

        let delete = SqlResult::new(
            "DELETE FROM playlist_songs WHERE playlist_id = $1 AND song_id = $2",
            vec![json!(playlist_id), json!(song_id)],
        );
        Ok(execute(&self.pool, &delete).await? > 0)
    }
}
