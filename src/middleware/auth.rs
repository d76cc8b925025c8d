use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::app::AppState;
use crate::auth::{verify_token, AuthUser};
use crate::database::models::User;
use crate::error::ApiError;

/// Identity for routes where a token is optional. Inserted on every request
/// that passes [`optional_auth_middleware`], `None` when anonymous.
#[derive(Clone, Debug, Default)]
pub struct MaybeUser(pub Option<AuthUser>);

impl MaybeUser {
    pub fn id(&self) -> Option<i64> {
        self.0.as_ref().map(|u| u.id)
    }
}

/// Requires a valid bearer token for an existing user; injects [`AuthUser`]
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Response {
    let user = match authenticate(&state, &headers).await {
        Ok(user) => user,
        Err(err) => return err.into_response(),
    };

    request.extensions_mut().insert(MaybeUser(Some(user.clone())));
    request.extensions_mut().insert(user);
    next.run(request).await
}

/// Resolves the caller when a token is present. A missing or bad token
/// continues anonymously.
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Response {
    let user = if headers.contains_key("authorization") {
        match authenticate(&state, &headers).await {
            Ok(user) => Some(user),
            Err(err) => {
                tracing::debug!("Continuing anonymously: {}", err);
                None
            }
        }
    } else {
        None
    };

    request.extensions_mut().insert(MaybeUser(user));
    next.run(request).await
}

/// Runs after [`jwt_auth_middleware`]; lets only admins through
pub async fn require_admin_middleware(request: Request, next: Next) -> Response {
    match request.extensions().get::<AuthUser>() {
        Some(user) if user.is_admin => next.run(request).await,
        Some(user) => {
            tracing::warn!("User {} denied admin access to {}", user.id, request.uri().path());
            ApiError::forbidden("Not authorized as an admin").into_response()
        }
        None => ApiError::unauthorized("Not authorized, no token").into_response(),
    }
}

async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<AuthUser, ApiError> {
    let token = extract_bearer_token(headers).map_err(ApiError::unauthorized)?;

    let claims = verify_token(&token, &state.config.security).map_err(|e| {
        tracing::debug!("Rejected token: {}", e);
        ApiError::unauthorized("Not authorized, token failed")
    })?;

    let user = User::find_by_id(&state.pool, claims.id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("User not found"))?;

    let is_admin = user.is_admin(state.config.security.admin_email.as_deref());
    Ok(AuthUser {
        id: user.id,
        role: user.role(),
        full_name: user.full_name,
        email: user.email,
        is_admin,
    })
}

/// Extract the token from an `Authorization: Bearer <token>` header
fn extract_bearer_token(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| "Not authorized, no token".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        Some(_) => Err("Not authorized, no token".to_string()),
        None => Err("Authorization header must use Bearer token format".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_token_is_extracted() {
        assert_eq!(extract_bearer_token(&headers("Bearer abc.def")).unwrap(), "abc.def");
    }

    #[test]
    fn missing_or_malformed_header_is_rejected() {
        assert!(extract_bearer_token(&HeaderMap::new()).is_err());
        assert!(extract_bearer_token(&headers("Basic dXNlcg==")).is_err());
        assert!(extract_bearer_token(&headers("Bearer   ")).is_err());
    }
}
