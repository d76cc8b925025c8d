// handlers/public/creator.rs - GET /api/creator/top

use axum::extract::State;
use serde_json::Value;

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};

const TOP_CREATORS: i64 = 10;

pub async fn top(State(state): State<AppState>) -> ApiResult<Value> {
    Ok(ApiResponse::success(Value::Array(state.creators().top(TOP_CREATORS).await?)))
}
