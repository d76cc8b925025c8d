// handlers/public/music.rs - song catalog, genres, public playlists, play counting

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::database::fetch_all_json;
use crate::filter::{Pagination, PlaylistFilter, SongFilter, SqlResult};
use crate::handlers::form::filter_params;
use crate::middleware::{ApiResponse, ApiResult};

const SONGS_DEFAULT_LIMIT: i64 = 50;

/// GET /api/music/songs
pub async fn songs(State(state): State<AppState>, Query(query): Query<HashMap<String, String>>) -> ApiResult<Value> {
    let params = filter_params(query);
    let page = Pagination::from_params(&params, SONGS_DEFAULT_LIMIT, state.config.filter.max_limit);
    let sql = SongFilter::from_params(&params).to_sql(&page)?;
    Ok(ApiResponse::success(Value::Array(fetch_all_json(&state.pool, &sql).await?)))
}

/// GET /api/music/genres
pub async fn genres(State(state): State<AppState>) -> ApiResult<Value> {
    let sql = SqlResult::new("SELECT * FROM music_genres WHERE is_active = 1 ORDER BY name", vec![]);
    Ok(ApiResponse::success(Value::Array(fetch_all_json(&state.pool, &sql).await?)))
}

/// GET /api/music/playlists?user_id=
pub async fn playlists(State(state): State<AppState>, Query(query): Query<HashMap<String, String>>) -> ApiResult<Value> {
    let sql = PlaylistFilter::from_params(&filter_params(query)).to_sql()?;
    Ok(ApiResponse::success(Value::Array(fetch_all_json(&state.pool, &sql).await?)))
}

/// POST /api/music/songs/:id/play - every call counts
pub async fn play(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Value> {
    let plays = state.interactions().play_song(id).await?;
    Ok(ApiResponse::success(json!({ "plays_count": plays })))
}
