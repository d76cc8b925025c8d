use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{from_fn, from_fn_with_state},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use sqlx::PgPool;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::database::health_check;
use crate::handlers;
use crate::middleware::{error_detail_middleware, jwt_auth_middleware, optional_auth_middleware, require_admin_middleware};
use crate::services::{
    CatalogService, CreatorService, InteractionService, LibraryService, PreferenceService, SeriesService, SocialService,
};
use crate::storage::ObjectStorage;

/// Everything a handler needs, injected once at startup
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub storage: Arc<dyn ObjectStorage>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(pool: PgPool, storage: Arc<dyn ObjectStorage>, config: AppConfig) -> Self {
        Self {
            pool,
            storage,
            config: Arc::new(config),
        }
    }

    pub fn catalog(&self) -> CatalogService {
        CatalogService::new(self.pool.clone())
    }

    pub fn interactions(&self) -> InteractionService {
        InteractionService::new(self.pool.clone())
    }

    pub fn social(&self) -> SocialService {
        SocialService::new(self.pool.clone())
    }

    pub fn series(&self) -> SeriesService {
        SeriesService::new(self.pool.clone())
    }

    pub fn creators(&self) -> CreatorService {
        CreatorService::new(self.pool.clone())
    }

    pub fn preferences(&self) -> PreferenceService {
        PreferenceService::new(self.pool.clone())
    }

    pub fn library(&self) -> LibraryService {
        LibraryService::new(self.pool.clone())
    }
}

/// Full application router. `uploads_dir` is served under `/uploads` when
/// the local storage backend is in use.
pub fn router(state: AppState, uploads_dir: Option<&str>) -> Router {
    let config = state.config.clone();

    // Tier 1: identity is optional
    let public = handlers::public::routes()
        .route_layer(from_fn_with_state(state.clone(), optional_auth_middleware));

    // Tier 2: bearer token required
    let protected = handlers::protected::routes()
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    // Tier 3: admin only; the token layer is outermost and runs first
    let elevated = handlers::elevated::routes()
        .route_layer(from_fn(require_admin_middleware))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    let mut app = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(public)
        .merge(protected)
        .merge(elevated);

    if let Some(dir) = uploads_dir {
        app = app.nest_service("/uploads", ServeDir::new(dir));
    }

    app.layer(DefaultBodyLimit::max(config.storage.max_upload_bytes))
        .layer(from_fn_with_state(config.environment, error_detail_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config))
        .with_state(state)
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if config.environment.is_development() || origins.is_empty() {
        layer.allow_origin(AllowOrigin::any())
    } else {
        layer.allow_origin(AllowOrigin::list(origins))
    }
}

async fn root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": format!("{} API", state.config.seo.site_name),
            "version": env!("CARGO_PKG_VERSION"),
            "environment": state.config.environment,
            "endpoints": {
                "auth": "/api/auth/register, /api/auth/login",
                "videos": "/api/videos[/:id]",
                "comments": "/api/comments/:video_id",
                "series": "/api/series[/:id]",
                "music": "/api/music/songs, /api/music/playlists",
                "users": "/api/users/profile, /api/users/:id/follow, /api/users/watchlist",
                "creator": "/api/creator/profile, /api/creator/monetization",
                "notifications": "/api/notifications",
                "admin": "/api/admin/* (admin only)"
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match health_check(&state.pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
