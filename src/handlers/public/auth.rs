// handlers/public/auth.rs - POST /api/auth/register, POST /api/auth/login

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::auth::generate_token;
use crate::auth::password::{hash_password, verify_password};
use crate::database::fetch_scalar;
use crate::database::models::User;
use crate::error::ApiError;
use crate::filter::SqlResult;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub mobile_or_email: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub mobile_or_email: Option<String>,
    pub password: Option<String>,
}

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, ApiError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::field(field, "is required"))
}

/// An identifier containing `@` is an email address, anything else a mobile number
fn split_identifier<'a>(identifier: &'a str, email: Option<&'a str>) -> (Option<&'a str>, Option<&'a str>) {
    if identifier.contains('@') {
        (None, Some(identifier))
    } else {
        (Some(identifier), email.map(str::trim).filter(|e| !e.is_empty()))
    }
}

/// POST /api/auth/register
pub async fn register(State(state): State<AppState>, Json(body): Json<RegisterRequest>) -> ApiResult<Value> {
    let identifier = required(&body.mobile_or_email, "mobile_or_email")?;
    let full_name = required(&body.full_name, "full_name")?;
    let password = required(&body.password, "password")?;

    let (mobile, email) = split_identifier(identifier, body.email.as_deref());
    if User::find_by_login(&state.pool, identifier, email.unwrap_or(identifier))
        .await?
        .is_some()
    {
        return Err(ApiError::conflict("User already exists. Please login."));
    }

    let password_hash = hash_password(password)?;
    let insert = SqlResult::new(
        "INSERT INTO users (mobile_number, email, full_name, password_hash) VALUES ($1, $2, $3, $4) RETURNING id",
        vec![json!(mobile), json!(email), json!(full_name), json!(password_hash)],
    );
    let id = fetch_scalar::<_, i64>(&state.pool, &insert)
        .await?
        .ok_or_else(|| ApiError::internal_server_error("User was not created"))?;

    let user = User::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::internal_server_error("User was not created"))?;
    let token = generate_token(user.id, &state.config.security)?;

    tracing::info!("Registered user {}", user.id);
    Ok(ApiResponse::created(json!({
        "message": "Registration successful",
        "token": token,
        "user": user,
    })))
}

/// POST /api/auth/login
pub async fn login(State(state): State<AppState>, Json(body): Json<LoginRequest>) -> ApiResult<Value> {
    let identifier = required(&body.mobile_or_email, "mobile_or_email")?;
    let password = body.password.as_deref().unwrap_or_default();

    let user = User::find_by_login(&state.pool, identifier, identifier)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    let matches = match user.password_hash.as_deref() {
        Some(hash) if !password.is_empty() => verify_password(password, hash)?,
        _ => false,
    };
    if !matches {
        tracing::warn!("Failed login for user {}", user.id);
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let token = generate_token(user.id, &state.config.security)?;
    Ok(ApiResponse::success(json!({
        "message": "Login successful",
        "token": token,
        "user": user,
    })))
}
