// handlers/elevated/admin/taxonomy.rs - video categories and music genres

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::database::{fetch_all_json, fetch_scalar};
use crate::error::ApiError;
use crate::filter::SqlResult;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TaxonomyRequest {
    pub name: Option<String>,
    pub icon: Option<String>,
}

impl TaxonomyRequest {
    fn name(&self) -> Result<&str, ApiError> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ApiError::field("name", "is required"))
    }
}

async fn create(state: &AppState, sql: SqlResult, what: &str) -> ApiResult<Value> {
    let id = fetch_scalar::<_, i64>(&state.pool, &sql)
        .await?
        .ok_or_else(|| ApiError::internal_server_error(format!("{} was not created", what)))?;
    tracing::info!("Admin created {} {}", what.to_lowercase(), id);
    Ok(ApiResponse::created(json!({ "message": format!("{} created", what), "id": id })))
}

pub async fn categories(State(state): State<AppState>) -> ApiResult<Value> {
    let sql = SqlResult::new("SELECT * FROM video_categories ORDER BY id DESC", vec![]);
    Ok(ApiResponse::success(Value::Array(fetch_all_json(&state.pool, &sql).await?)))
}

pub async fn create_category(State(state): State<AppState>, Json(body): Json<TaxonomyRequest>) -> ApiResult<Value> {
    let sql = SqlResult::new(
        "INSERT INTO video_categories (name, icon) VALUES ($1, $2) RETURNING id",
        vec![json!(body.name()?), json!(body.icon)],
    );
    create(&state, sql, "Category").await
}

pub async fn delete_category(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Value> {
    super::delete_row(&state.pool, "video_categories", id, "Category").await?;
    Ok(ApiResponse::message("Category deleted"))
}

pub async fn genres(State(state): State<AppState>) -> ApiResult<Value> {
    let sql = SqlResult::new("SELECT * FROM music_genres ORDER BY id DESC", vec![]);
    Ok(ApiResponse::success(Value::Array(fetch_all_json(&state.pool, &sql).await?)))
}

pub async fn create_genre(State(state): State<AppState>, Json(body): Json<TaxonomyRequest>) -> ApiResult<Value> {
    let sql = SqlResult::new(
        "INSERT INTO music_genres (name) VALUES ($1) RETURNING id",
        vec![json!(body.name()?)],
    );
    create(&state, sql, "Genre").await
}

pub async fn delete_genre(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Value> {
    super::delete_row(&state.pool, "music_genres", id, "Genre").await?;
    Ok(ApiResponse::message("Genre deleted"))
}
