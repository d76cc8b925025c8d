// handlers/elevated/admin/music.rs - song moderation and playlist overview

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::database::{apply_update, fetch_all_json, fetch_one_json};
use crate::filter::SqlResult;
use crate::handlers::utils::update_reply;
use crate::middleware::{ApiResponse, ApiResult};
use crate::update::SongStatusPatch;

fn songs_sql() -> SqlResult {
    SqlResult::new(
        "SELECT s.id, s.title, s.artist, s.album, s.audio_url, s.cover_image_url, \
         s.is_active, s.is_trending, s.is_featured, s.created_at, g.name AS genre_name \
         FROM songs s LEFT JOIN music_genres g ON s.genre_id = g.id \
         ORDER BY s.created_at DESC",
        vec![],
    )
}

fn playlists_sql() -> SqlResult {
    SqlResult::new(
        "SELECT p.id, p.name, p.description, p.cover_image_url, p.is_public, p.created_at, \
         u.full_name AS creator_name, u.profile_image AS creator_image, \
         (SELECT COUNT(*) FROM playlist_songs ps WHERE ps.playlist_id = p.id) AS song_count \
         FROM playlists p JOIN users u ON p.user_id = u.id \
         ORDER BY p.created_at DESC",
        vec![],
    )
}

/// GET /api/admin/songs - includes inactive songs
pub async fn songs(State(state): State<AppState>) -> ApiResult<Value> {
    Ok(ApiResponse::success(Value::Array(fetch_all_json(&state.pool, &songs_sql()).await?)))
}

pub async fn song(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Value> {
    let sql = SqlResult::new("SELECT * FROM songs WHERE id = $1", vec![json!(id)]);
    Ok(ApiResponse::success(fetch_one_json(&state.pool, &sql, "Song").await?))
}

pub async fn delete_song(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Value> {
    super::delete_row(&state.pool, "songs", id, "Song").await?;
    Ok(ApiResponse::message("Song deleted"))
}

pub async fn update_song_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<SongStatusPatch>,
) -> ApiResult<Value> {
    update_reply(apply_update(&state.pool, &patch, id).await?, "Song")
}

/// GET /api/admin/playlists - every playlist, public or not
pub async fn playlists(State(state): State<AppState>) -> ApiResult<Value> {
    Ok(ApiResponse::success(Value::Array(fetch_all_json(&state.pool, &playlists_sql()).await?)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_song_list_has_no_active_filter() {
        assert!(!songs_sql().query.contains("WHERE"));
    }

    #[test]
    fn playlists_carry_song_count() {
        assert!(playlists_sql().query.contains("AS song_count"));
    }
}
