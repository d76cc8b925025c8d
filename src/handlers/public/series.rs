// handlers/public/series.rs - GET /api/series, GET /api/series/:id

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use serde_json::Value;

use crate::app::AppState;
use crate::database::fetch_all_json;
use crate::filter::{Pagination, SeriesFilter};
use crate::handlers::form::filter_params;
use crate::middleware::{ApiResponse, ApiResult};

pub async fn list(State(state): State<AppState>, Query(query): Query<HashMap<String, String>>) -> ApiResult<Value> {
    let params = filter_params(query);
    let page = Pagination::from_params(&params, state.config.filter.default_limit, state.config.filter.max_limit);
    let sql = SeriesFilter::from_params(&params).to_sql(&page)?;
    Ok(ApiResponse::success(Value::Array(fetch_all_json(&state.pool, &sql).await?)))
}

pub async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Value> {
    Ok(ApiResponse::success(state.series().get_with_episodes(id).await?))
}
