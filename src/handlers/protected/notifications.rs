// handlers/protected/notifications.rs - inbox and device token registration

use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::auth::AuthUser;
use crate::database::{execute, fetch_all_json};
use crate::error::ApiError;
use crate::filter::SqlResult;
use crate::middleware::{ApiResponse, ApiResult};

const INBOX_LIMIT: i64 = 50;

fn inbox_sql(user_id: i64) -> SqlResult {
    SqlResult::new(
        "SELECT * FROM notifications WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
        vec![json!(user_id), json!(INBOX_LIMIT)],
    )
}

/// GET /api/notifications
pub async fn list(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<Value> {
    Ok(ApiResponse::success(Value::Array(fetch_all_json(&state.pool, &inbox_sql(user.id)).await?)))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TokenRequest {
    #[serde(alias = "fcmToken", alias = "fcm_token")]
    pub token: Option<String>,
}

/// POST /api/notifications/register-token - stores the device token only
pub async fn register_token(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<TokenRequest>,
) -> ApiResult<Value> {
    let token = body
        .token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::bad_request("Token is required"))?;

    let update = SqlResult::new(
        "UPDATE users SET fcm_token = $1, updated_at = NOW() WHERE id = $2",
        vec![json!(token), json!(user.id)],
    );
    if execute(&state.pool, &update).await? == 0 {
        return Err(ApiError::not_found("User not found"));
    }
    tracing::debug!("Registered device token for user {}", user.id);
    Ok(ApiResponse::message("Token registered"))
}
