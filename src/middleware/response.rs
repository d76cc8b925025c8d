use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::config::Environment;
use crate::error::ErrorDetail;

/// Wrapper for API responses that automatically adds success envelope
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: Option<StatusCode>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with default 200 status
    pub fn success(data: T) -> Self {
        Self {
            data,
            status_code: None,
        }
    }

    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        Self {
            data,
            status_code: Some(status_code),
        }
    }

    /// Create a 201 Created response
    pub fn created(data: T) -> Self {
        Self::with_status(data, StatusCode::CREATED)
    }
}

impl ApiResponse<Value> {
    /// `{"message": ...}` payload for operations with nothing to return
    pub fn message(message: impl Into<String>) -> Self {
        Self::success(json!({ "message": message.into() }))
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);

        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "success": false,
                        "error": "Failed to serialize response data",
                        "code": "INTERNAL_SERVER_ERROR"
                    })),
                )
                    .into_response();
            }
        };

        let envelope = json!({
            "success": true,
            "data": data_value
        });

        (status, Json(envelope)).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;

/// Error bodies larger than this are passed through untouched
const MAX_ERROR_BODY: usize = 64 * 1024;

/// Adds the underlying failure as `detail` on 500 responses, in development
/// only. Other environments get the generic message.
pub async fn error_detail_middleware(
    State(environment): State<Environment>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let Some(ErrorDetail(detail)) = response.extensions_mut().remove::<ErrorDetail>() else {
        return response;
    };

    if !environment.is_development() {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, MAX_ERROR_BODY).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("Could not buffer error body: {}", e);
            return (parts.status, Json(json!({ "success": false, "error": "Server Error" }))).into_response();
        }
    };

    let body = match serde_json::from_slice::<Value>(&bytes) {
        Ok(mut value) => {
            value["detail"] = Value::String(detail);
            Body::from(value.to_string())
        }
        Err(_) => Body::from(bytes),
    };
    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use axum::{middleware::from_fn_with_state, routing::get, Router};
    use tower::ServiceExt;

    fn app(environment: Environment) -> Router {
        Router::new()
            .route(
                "/boom",
                get(|| async { ApiError::internal_with_detail("Server Error", "relation \"videos\" does not exist") }),
            )
            .route("/ok", get(|| async { ApiResponse::success(json!({ "id": 1 })) }))
            .layer(from_fn_with_state(environment, error_detail_middleware))
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn call(environment: Environment, uri: &str) -> Response {
        app(environment)
            .oneshot(axum::http::Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn development_errors_carry_detail() {
        let response = call(Environment::Development, "/boom").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Server Error");
        assert_eq!(body["detail"], "relation \"videos\" does not exist");
    }

    #[tokio::test]
    async fn production_errors_hide_detail() {
        let body = body_json(call(Environment::Production, "/boom").await).await;
        assert_eq!(body["error"], "Server Error");
        assert!(body.get("detail").is_none());
    }

    #[tokio::test]
    async fn success_envelope_is_untouched() {
        let response = call(Environment::Development, "/ok").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body, json!({ "success": true, "data": { "id": 1 } }));
    }
}
