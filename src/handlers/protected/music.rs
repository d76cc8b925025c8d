// handlers/protected/music.rs - song likes and playlist management

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::auth::{authorize, AuthUser, OwnedResource};
use crate::database::apply_update;
use crate::error::ApiError;
use crate::handlers::utils::update_reply;
use crate::middleware::{ApiResponse, ApiResult};
use crate::update::{Flag, Int, PlaylistPatch};

/// POST /api/music/songs/:id/like
pub async fn like(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<Value> {
    let toggle = state.interactions().like_song(user.id, id).await?;
    Ok(ApiResponse::success(json!({ "liked": true, "changed": toggle.changed, "likes_count": toggle.count })))
}

/// DELETE /api/music/songs/:id/like
pub async fn unlike(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<Value> {
    let toggle = state.interactions().unlike_song(user.id, id).await?;
    Ok(ApiResponse::success(json!({ "liked": false, "changed": toggle.changed, "likes_count": toggle.count })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NewPlaylist {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(alias = "isPublic")]
    pub is_public: Option<Flag>,
}

/// POST /api/music/playlists
pub async fn create_playlist(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<NewPlaylist>,
) -> ApiResult<Value> {
    let name = body.name.as_deref().unwrap_or_default();
    let is_public = body.is_public.map_or(true, |f| f.0);
    let id = state
        .library()
        .create_playlist(user.id, name, body.description.as_deref(), is_public)
        .await?;
    Ok(ApiResponse::created(json!({ "message": "Playlist created", "id": id })))
}

/// GET /api/music/my-playlists
pub async fn my_playlists(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<Value> {
    Ok(ApiResponse::success(Value::Array(state.library().playlists_of(user.id).await?)))
}

/// PATCH /api/music/playlists/:id
pub async fn update_playlist(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(patch): Json<PlaylistPatch>,
) -> ApiResult<Value> {
    authorize(&state.pool, OwnedResource::Playlist, id, &user).await?;
    update_reply(apply_update(&state.pool, &patch, id).await?, "Playlist")
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PlaylistEntry {
    #[serde(alias = "playlist_id")]
    #[serde(rename = "playlistId")]
    pub playlist_id: Option<Int>,
    #[serde(alias = "song_id")]
    #[serde(rename = "songId")]
    pub song_id: Option<Int>,
}

/// POST /api/music/playlists/add
pub async fn add_song(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<PlaylistEntry>,
) -> ApiResult<Value> {
    let (Some(playlist), Some(song)) = (body.playlist_id, body.song_id) else {
        return Err(ApiError::bad_request("playlistId and songId are required"));
    };
    let added = state.library().add_song(&user, playlist.0, song.0).await?;
    let message = if added { "Song added to playlist" } else { "Song already in playlist" };
    Ok(ApiResponse::success(json!({ "message": message, "added": added })))
}

/// DELETE /api/music/playlists/:id/songs/:song_id
pub async fn remove_song(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((playlist_id, song_id)): Path<(i64, i64)>,
) -> ApiResult<Value> {
    let removed = state.library().remove_song(&user, playlist_id, song_id).await?;
    Ok(ApiResponse::success(json!({ "message": "Song removed from playlist", "removed": removed })))
}
